//! Core library entry for the `brokergen` CLI.
//!
//! Data flows strictly forward through the stages:
//! [`inventory`] → [`classify`] → [`resolve`] → [`synth`] → [`report`],
//! orchestrated by [`pipeline`].

pub mod adapters;
pub mod classify;
pub mod cli;
pub mod commands;
pub mod context;
pub mod error;
pub mod inventory;
pub mod pipeline;
pub mod ports;
pub mod report;
pub mod resolve;
pub mod synth;

use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = cli::Cli::try_parse_from(args).map_err(|err| err.to_string())?;
    commands::dispatch(&cli.command)
}

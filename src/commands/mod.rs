//! Command dispatch and handlers.

pub mod generate;
pub mod inspect;

use crate::cli::Command;
use crate::context::ServiceContext;

/// Dispatch a parsed command to its handler.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch(command: &Command) -> Result<(), String> {
    let ctx = ServiceContext::live();
    dispatch_with_context(command, &ctx)
}

/// Dispatch a command with the given service context.
fn dispatch_with_context(command: &Command, ctx: &ServiceContext) -> Result<(), String> {
    match command {
        Command::Generate { inventory, hints, out, jobs, diff } => {
            let out_dir = out.clone().unwrap_or_else(generate::default_out_dir);
            generate::run_with_context(ctx, inventory, hints, &out_dir, *jobs, *diff)
        }
        Command::Inspect { inventory } => inspect::run_with_context(ctx, inventory),
    }
}

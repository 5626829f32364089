//! Adapters implementing the port traits.
//!
//! `live` talks to the real system; `memory` keeps everything in process and
//! is deterministic, which is what the tests use.

pub mod live;
pub mod memory;

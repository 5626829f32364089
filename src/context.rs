//! Service context bundling all port trait objects.

use crate::adapters::live::clock::LiveClock;
use crate::adapters::live::filesystem::LiveFileSystem;
use crate::adapters::live::id_gen::LiveIdGenerator;
use crate::adapters::memory::{FixedClock, MemoryFileSystem, SequentialIdGenerator};
use crate::ports::clock::Clock;
use crate::ports::filesystem::FileSystem;
use crate::ports::id_gen::IdGenerator;

/// Timestamp used by in-memory contexts.
pub const FIXED_TIMESTAMP: &str = "2025-01-01T00:00:00Z";

/// Bundles all port trait objects into a single context.
///
/// Constructors wire up either live adapters or deterministic in-memory ones.
pub struct ServiceContext {
    /// Clock for report timestamps.
    pub clock: Box<dyn Clock>,
    /// Filesystem for input documents and generated output.
    pub fs: Box<dyn FileSystem>,
    /// Run identifier source.
    pub id_gen: Box<dyn IdGenerator>,
}

impl ServiceContext {
    /// Creates a live context backed by the system clock, disk, and UUIDs.
    #[must_use]
    pub fn live() -> Self {
        Self {
            clock: Box::new(LiveClock),
            fs: Box::new(LiveFileSystem),
            id_gen: Box::new(LiveIdGenerator),
        }
    }

    /// Creates a deterministic context over the given in-memory filesystem.
    #[must_use]
    pub fn in_memory(fs: MemoryFileSystem) -> Self {
        Self {
            clock: Box::new(FixedClock::at(FIXED_TIMESTAMP)),
            fs: Box::new(fs),
            id_gen: Box::new(SequentialIdGenerator::default()),
        }
    }
}

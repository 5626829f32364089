//! Clock port used to stamp migration reports.

use chrono::{DateTime, Utc};

/// Provides the current time.
///
/// Only the report's `generated_at` field reads the clock, so a fixed clock
/// makes a whole run reproducible in tests.
pub trait Clock: Send + Sync {
    /// Returns the current UTC time.
    fn now(&self) -> DateTime<Utc>;
}

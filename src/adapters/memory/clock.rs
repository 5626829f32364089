//! Clock adapter that always reports the same instant.

use chrono::{DateTime, Utc};

use crate::ports::clock::Clock;

/// Returns the instant it was built with, every time.
pub struct FixedClock {
    instant: DateTime<Utc>,
}

impl FixedClock {
    /// Parses an RFC 3339 timestamp, falling back to the Unix epoch.
    #[must_use]
    pub fn at(rfc3339: &str) -> Self {
        let instant = DateTime::parse_from_rfc3339(rfc3339)
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_default();
        Self { instant }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_never_moves() {
        let clock = FixedClock::at("2025-06-15T10:30:00Z");
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now().to_rfc3339(), "2025-06-15T10:30:00+00:00");
    }

    #[test]
    fn unparsable_timestamp_falls_back_to_epoch() {
        let clock = FixedClock::at("not a time");
        assert_eq!(clock.now().timestamp(), 0);
    }
}

//! Timestamp formatting in the configured timezone offset
//!
//! Every persisted and mirrored turn is stamped with the same human-readable
//! format, e.g. `2025.03.14 09:26:53 +0900`.

use crate::error::{JournalError, Result};
use chrono::{DateTime, FixedOffset, Offset, Utc};

/// Display format shared by the store and the markdown mirror
pub const TIMESTAMP_FORMAT: &str = "%Y.%m.%d %H:%M:%S %z";

/// Wall clock pinned to a fixed UTC offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    offset: FixedOffset,
}

impl Clock {
    /// Create a clock for a whole-hour offset from UTC
    ///
    /// # Errors
    ///
    /// Returns `JournalError::Config` if the offset is outside `-12..=14`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ollama_journal::clock::Clock;
    ///
    /// let clock = Clock::from_hours(9).unwrap();
    /// assert_eq!(clock.offset_hours(), 9);
    /// assert!(Clock::from_hours(20).is_err());
    /// ```
    pub fn from_hours(hours: i32) -> Result<Self> {
        if !(-12..=14).contains(&hours) {
            return Err(JournalError::Config(format!(
                "timezone offset must be between -12 and 14 hours, got {}",
                hours
            ))
            .into());
        }

        let offset = FixedOffset::east_opt(hours * 3600).ok_or_else(|| {
            JournalError::Config(format!("invalid timezone offset: {}", hours))
        })?;

        Ok(Self { offset })
    }

    /// A clock at UTC
    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }

    /// Configured offset in whole hours
    pub fn offset_hours(&self) -> i32 {
        self.offset.local_minus_utc() / 3600
    }

    /// Current time in the configured offset
    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }

    /// Format an instant in the configured offset
    pub fn format<Tz: chrono::TimeZone>(&self, instant: &DateTime<Tz>) -> String {
        instant
            .with_timezone(&self.offset)
            .format(TIMESTAMP_FORMAT)
            .to_string()
    }

    /// Current time, formatted
    pub fn timestamp(&self) -> String {
        self.format(&self.now())
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::utc()
    }
}

//! Active rental session records.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::pricing::GameType;

/// Whether a session runs open-ended or against a scheduled expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimeMode {
    /// No scheduled expiry; runs until explicitly ended.
    #[default]
    Open,
    /// Pre-committed duration with a scheduled expiry instant. Billing
    /// still follows actual elapsed time at end.
    Timed,
}

impl TimeMode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Timed => "timed",
        }
    }
}

impl std::fmt::Display for TimeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TimeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "timed" => Ok(Self::Timed),
            _ => Err(format!("invalid time mode: {s}")),
        }
    }
}

/// An active rental session on one device.
///
/// At most one exists per device; the engine keys its active set by
/// `device_id`. Ending a session destroys the record, leaving a
/// [`Report`](crate::report::Report) in its place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub device_id: String,
    pub time_mode: TimeMode,
    pub game_type: GameType,
    pub start_time: DateTime<Utc>,
    /// Scheduled expiry, Timed sessions only. Fixed at start (plus any
    /// extensions); never the billed end unless the session is left to
    /// expire exactly on schedule.
    pub end_time: Option<DateTime<Utc>>,
    /// One-shot latch for the time-up signal.
    #[serde(default)]
    pub time_up_notified: bool,
}

impl Session {
    /// Elapsed play time at `now`, in milliseconds. Never negative.
    #[must_use]
    pub fn elapsed_ms(&self, now: DateTime<Utc>) -> i64 {
        (now - self.start_time).num_milliseconds().max(0)
    }

    /// Whether a Timed session's scheduled expiry has been reached.
    ///
    /// A state comparison, not an event: an expiry that passed while
    /// the process was not running is still observed on the next call.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.end_time.is_some_and(|end| end <= now)
    }

    /// Remaining scheduled time at `now`, Timed sessions only.
    #[must_use]
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.end_time.map(|end| end - now)
    }
}

//! Error taxonomy for lounge operations.
//!
//! Every variant is synchronous and non-retryable: the caller must
//! correct the request and resubmit. There are no partial-failure
//! states because every transition is atomic.

use thiserror::Error;

use crate::device::DeviceType;
use crate::pricing::GameType;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoungeError {
    /// Malformed caller input (e.g. missing duration for a timed start).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A session start was requested on a device that is not Available.
    #[error("device {device_id} is not available ({status})")]
    DeviceUnavailable { device_id: String, status: String },

    /// Delete or status toggle requested while the device is Busy.
    #[error("device {0} has an active session")]
    DeviceBusy(String),

    /// Extend or end requested on a device with no active session.
    #[error("no active session on device {0}")]
    NoActiveSession(String),

    /// Price table has no rate for the requested tier. A missing tier
    /// is an administrative error, not a billing event, so it must
    /// never silently default to zero.
    #[error("no hourly rate configured for {device_type} {game_type}")]
    Configuration {
        device_type: DeviceType,
        game_type: GameType,
    },

    /// The named device does not exist.
    #[error("unknown device: {0}")]
    UnknownDevice(String),
}

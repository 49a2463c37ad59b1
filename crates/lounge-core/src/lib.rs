//! Core domain logic for the gaming lounge session manager.
//!
//! This crate contains the fundamental types and logic for:
//! - Devices: rentable consoles and their availability transitions
//! - Sessions: the per-device rental state machine (start, extend,
//!   time-up detection, end)
//! - Pricing: the hourly rate table and the pure cost calculation
//! - Reports: the append-only ledger of completed sessions
//!
//! Everything here is in-memory and clock-free: callers supply `now`
//! explicitly, and an external scheduler drives the periodic tick.

pub mod device;
mod error;
pub mod lounge;
pub mod pricing;
pub mod report;
pub mod session;

pub use device::{Device, DevicePatch, DeviceRegistry, DeviceStatus, DeviceType};
pub use error::LoungeError;
pub use lounge::{Lounge, LoungeEvent};
pub use pricing::{GameType, PriceRate, PriceTable, compute_cost, round_money};
pub use report::{Report, ReportLedger};
pub use session::{Session, TimeMode};

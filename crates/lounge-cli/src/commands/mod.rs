//! CLI subcommand implementations.
//!
//! Every command follows the same shape: load the stored state into a
//! [`lounge_core::Lounge`], run exactly one transition, persist the
//! rows that transition touched.

pub mod devices;
pub mod end;
pub mod extend;
pub mod prices;
pub mod report;
pub mod start;
pub mod status;
pub mod tick;
pub mod util;

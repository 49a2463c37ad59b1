//! Gaming lounge CLI library.
//!
//! This crate provides the operator-facing CLI for the lounge.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, DeviceAction, PricesAction, ReportAction};
pub use config::Config;

//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use lounge_core::{DeviceStatus, DeviceType, GameType};

/// Session and billing manager for a shared-console gaming lounge.
///
/// Tracks which consoles are rented, raises time-up notices for timed
/// sessions, bills actual elapsed play time against the configured
/// hourly rates, and keeps a daily revenue report.
#[derive(Debug, Parser)]
#[command(name = "lounge", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show all devices with their current sessions.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Start a session on an available device.
    Start {
        /// Device id (or unique prefix).
        device: String,

        /// Player-count mode (single, double, quad).
        #[arg(long)]
        game: GameType,

        /// Session length in minutes; omit for an open-ended session.
        #[arg(long)]
        minutes: Option<i64>,
    },

    /// Push a timed session's scheduled end further out.
    Extend {
        /// Device id (or unique prefix).
        device: String,

        /// Additional minutes.
        #[arg(long)]
        minutes: i64,
    },

    /// End the active session and print the bill.
    End {
        /// Device id (or unique prefix).
        device: String,
    },

    /// Run one expiry scan and print any time-up notices.
    Tick,

    /// Scan for expiries continuously until interrupted.
    Watch,

    /// Manage devices.
    Device {
        #[command(subcommand)]
        action: DeviceAction,
    },

    /// Manage hourly rates.
    Prices {
        #[command(subcommand)]
        action: PricesAction,
    },

    /// Show the daily report, or clear the ledger.
    Report {
        /// Day to report on (YYYY-MM-DD); defaults to today (UTC).
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,

        #[command(subcommand)]
        action: Option<ReportAction>,
    },
}

/// Device management actions.
#[derive(Debug, Subcommand)]
pub enum DeviceAction {
    /// Register a new device.
    Add {
        /// Display name (e.g. "Station 3").
        #[arg(long)]
        name: String,

        /// Console type (ps4, ps5).
        #[arg(long = "type")]
        device_type: DeviceType,
    },

    /// List all devices.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Set availability (available, maintenance). Busy is reached by
    /// starting a session, never directly.
    SetStatus {
        /// Device id (or unique prefix).
        device: String,
        status: DeviceStatus,
    },

    /// Change the console type.
    SetType {
        /// Device id (or unique prefix).
        device: String,
        device_type: DeviceType,
    },

    /// Rename a device.
    Rename {
        /// Device id (or unique prefix).
        device: String,
        name: String,
    },

    /// Delete a device. Fails while a session is active on it.
    Rm {
        /// Device id (or unique prefix).
        device: String,
    },
}

/// Price management actions.
#[derive(Debug, Subcommand)]
pub enum PricesAction {
    /// Show all configured hourly rates.
    Show {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Set the hourly rate for one tier.
    Set {
        /// Console type (ps4, ps5).
        #[arg(long = "type")]
        device_type: DeviceType,

        /// Player-count mode (single, double, quad).
        #[arg(long)]
        game: GameType,

        /// Hourly rate.
        #[arg(long)]
        rate: f64,
    },
}

/// Report ledger actions.
#[derive(Debug, Subcommand)]
pub enum ReportAction {
    /// Delete all reports. Irreversible; requires --yes.
    Clear {
        /// Confirm the wipe.
        #[arg(long)]
        yes: bool,
    },
}

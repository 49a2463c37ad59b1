use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use lounge_cli::commands::{devices, end, extend, prices, report, start, status, tick, util};
use lounge_cli::{Cli, Commands, Config};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(lounge_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = lounge_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let mut stdout = std::io::stdout().lock();
    match &cli.command {
        Some(Commands::Status { json }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            let lounge = util::load_lounge(&db)?;
            status::run(&mut stdout, &lounge, Utc::now(), *json)?;
        }
        Some(Commands::Start {
            device,
            game,
            minutes,
        }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            start::run(&mut stdout, &db, device, *game, *minutes, Utc::now())?;
        }
        Some(Commands::Extend { device, minutes }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            extend::run(&mut stdout, &db, device, *minutes, Utc::now())?;
        }
        Some(Commands::End { device }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            end::run(&mut stdout, &db, device, Utc::now())?;
        }
        Some(Commands::Tick) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            tick::run(&mut stdout, &db)?;
        }
        Some(Commands::Watch) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            tick::watch(&mut stdout, &db, config.tick_interval_ms)?;
        }
        Some(Commands::Device { action }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            devices::run(&mut stdout, &db, action)?;
        }
        Some(Commands::Prices { action }) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            prices::run(&mut stdout, &mut db, action)?;
        }
        Some(Commands::Report { date, json, action }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            report::run(&mut stdout, &db, *date, *json, action.as_ref(), Utc::now())?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            writeln!(stdout)?;
        }
    }

    Ok(())
}

//! Extend command: push a timed session's scheduled end out.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use lounge_db::Database;

use super::util::{load_lounge, resolve_device};

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    device: &str,
    minutes: i64,
    now: DateTime<Utc>,
) -> Result<()> {
    let mut lounge = load_lounge(db)?;
    let device_id = resolve_device(&lounge, device)?;

    let new_end = lounge
        .extend_session(&device_id, minutes, now)
        .context("failed to extend session")?;
    let session = lounge
        .session(&device_id)
        .context("session missing after extension")?;
    db.upsert_session(session)?;

    writeln!(
        writer,
        "Extended {name} by {minutes} minutes, now until {end}",
        name = lounge.device(&device_id)?.name,
        end = new_end.format("%H:%M:%S"),
    )?;
    Ok(())
}

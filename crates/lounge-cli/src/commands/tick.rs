//! Tick and watch commands: drive the expiry scan.
//!
//! The engine holds no timer (transitions take explicit `now` values),
//! so expiry detection happens here: `tick` runs one scan, `watch`
//! repeats it at the configured interval. State is reloaded from the
//! database on every scan so sessions started by other invocations are
//! picked up.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::Utc;
use lounge_db::Database;

use super::util::load_lounge;

/// Runs one expiry scan and persists the notification latches.
/// Returns the device ids that newly timed up.
pub fn run<W: Write>(writer: &mut W, db: &Database) -> Result<Vec<String>> {
    let mut lounge = load_lounge(db)?;
    let expired = lounge.tick(Utc::now());
    for device_id in &expired {
        let session = lounge
            .session(device_id)
            .context("expired session missing from engine")?;
        db.upsert_session(session)?;
        writeln!(
            writer,
            "TIME UP: {name} ({device_id})",
            name = lounge.device(device_id)?.name,
        )?;
    }
    Ok(expired)
}

/// Scans repeatedly until the process is interrupted.
pub fn watch<W: Write>(writer: &mut W, db: &Database, interval_ms: u64) -> Result<()> {
    let interval = std::time::Duration::from_millis(interval_ms.max(1));
    tracing::info!(?interval, "watching for session expiries");
    loop {
        run(writer, db)?;
        std::thread::sleep(interval);
    }
}

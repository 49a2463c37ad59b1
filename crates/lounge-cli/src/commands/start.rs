//! Start command: begin a session on an available device.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use lounge_core::{GameType, TimeMode};
use lounge_db::Database;

use super::util::{format_duration, load_lounge, resolve_device};

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    device: &str,
    game: GameType,
    minutes: Option<i64>,
    now: DateTime<Utc>,
) -> Result<()> {
    let mut lounge = load_lounge(db)?;
    let device_id = resolve_device(&lounge, device)?;
    let time_mode = if minutes.is_some() {
        TimeMode::Timed
    } else {
        TimeMode::Open
    };

    let session = lounge
        .start_session(&device_id, time_mode, game, minutes, now)
        .context("failed to start session")?;

    db.upsert_session(&session)?;
    db.upsert_device(lounge.device(&device_id)?)?;

    let name = &lounge.device(&device_id)?.name;
    match session.end_time {
        Some(end) => writeln!(
            writer,
            "Started {game} on {name}: {dur}, until {end}",
            dur = format_duration((end - now).num_milliseconds()),
            end = end.format("%H:%M:%S"),
        )?,
        None => writeln!(writer, "Started open-ended {game} on {name}")?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lounge_core::{DeviceStatus, DeviceType};

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn db_with_device() -> (Database, String) {
        let db = Database::open_in_memory().unwrap();
        let mut lounge = lounge_core::Lounge::new();
        let id = lounge.add_device("Station 1".to_string(), DeviceType::Ps4).id;
        db.upsert_device(lounge.device(&id).unwrap()).unwrap();
        (db, id)
    }

    #[test]
    fn test_start_timed_persists_session_and_busy_status() {
        let (db, id) = db_with_device();
        let mut out = Vec::new();
        run(
            &mut out,
            &db,
            &id,
            GameType::Single,
            Some(60),
            at("2026-08-25T10:00:00Z"),
        )
        .unwrap();

        let sessions = db.list_sessions().unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].end_time, Some(at("2026-08-25T11:00:00Z")));
        assert_eq!(db.list_devices().unwrap()[0].status, DeviceStatus::Busy);
        assert!(String::from_utf8(out).unwrap().contains("1h 0m"));
    }

    #[test]
    fn test_start_on_busy_device_fails_without_persisting() {
        let (db, id) = db_with_device();
        let mut out = Vec::new();
        run(
            &mut out,
            &db,
            &id,
            GameType::Single,
            None,
            at("2026-08-25T10:00:00Z"),
        )
        .unwrap();

        let err = run(
            &mut out,
            &db,
            &id,
            GameType::Single,
            None,
            at("2026-08-25T10:05:00Z"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("failed to start session"));
        assert_eq!(db.list_sessions().unwrap().len(), 1);
    }
}

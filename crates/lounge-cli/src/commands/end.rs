//! End command: close a session and print the bill.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use lounge_db::Database;

use super::util::{load_lounge, resolve_device};

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    device: &str,
    now: DateTime<Utc>,
) -> Result<()> {
    let mut lounge = load_lounge(db)?;
    let device_id = resolve_device(&lounge, device)?;

    let report = lounge
        .end_session(&device_id, now)
        .context("failed to end session")?;

    db.delete_session(&device_id)?;
    db.upsert_device(lounge.device(&device_id)?)?;
    db.append_report(&report)?;

    // end-of-session summary for the player
    writeln!(writer, "Session ended on {}", lounge.device(&device_id)?.name)?;
    writeln!(writer, "  Duration:  {} min", report.duration_minutes)?;
    writeln!(writer, "  Game type: {}", report.game_type)?;
    writeln!(writer, "  To pay:    {:.2}", report.cost)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lounge_core::{DeviceStatus, DeviceType, GameType, TimeMode};

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn seeded_db() -> (Database, String) {
        let mut db = Database::open_in_memory().unwrap();
        let mut lounge = lounge_core::Lounge::new();
        lounge.set_rate(DeviceType::Ps5, GameType::Double, 30.0);
        let id = lounge.add_device("Station 1".to_string(), DeviceType::Ps5).id;
        let session = lounge
            .start_session(
                &id,
                TimeMode::Open,
                GameType::Double,
                None,
                at("2026-08-25T10:00:00Z"),
            )
            .unwrap();
        db.upsert_device(lounge.device(&id).unwrap()).unwrap();
        db.upsert_session(&session).unwrap();
        db.replace_prices(lounge.prices()).unwrap();
        (db, id)
    }

    #[test]
    fn test_end_persists_report_and_frees_device() {
        let (db, id) = seeded_db();
        let mut out = Vec::new();
        run(&mut out, &db, &id, at("2026-08-25T10:45:00Z")).unwrap();

        assert!(db.list_sessions().unwrap().is_empty());
        assert_eq!(
            db.list_devices().unwrap()[0].status,
            DeviceStatus::Available
        );
        let reports = db.list_reports().unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].duration_minutes, 45);
        assert!((reports[0].cost - 22.5).abs() < f64::EPSILON);

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("45 min"));
        assert!(out.contains("22.50"));
    }

    #[test]
    fn test_end_twice_fails_with_one_report() {
        let (db, id) = seeded_db();
        let mut out = Vec::new();
        run(&mut out, &db, &id, at("2026-08-25T10:45:00Z")).unwrap();
        let err = run(&mut out, &db, &id, at("2026-08-25T11:00:00Z")).unwrap_err();
        assert!(err.to_string().contains("failed to end session"));
        assert_eq!(db.list_reports().unwrap().len(), 1);
    }
}

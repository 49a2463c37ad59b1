//! Storage layer for the gaming lounge session manager.
//!
//! Persists the four keyed collections the core works over — devices,
//! active sessions, prices and reports — using `rusqlite`. The
//! collections are independent tables; the only cross-reference is the
//! `device_id` value carried by sessions and reports.
//!
//! # Thread Safety
//!
//! [`Database`] wraps a `rusqlite::Connection`, which is `Send` but not
//! `Sync`. For multi-threaded access, serialize behind a `Mutex` or use
//! one instance per thread. The CLI runs one transition per process, so
//! no locking is needed there.
//!
//! # Schema
//!
//! Timestamps are stored as TEXT in RFC 3339 (e.g.
//! `2026-08-25T10:30:00.000Z`): lexicographic order matches
//! chronological order and values stay human-readable. Enum columns
//! (`device_type`, `status`, `time_mode`, `game_type`) store the
//! canonical lowercase strings from the core types; an unrecognized
//! stored value surfaces as a [`DbError`], never a panic.
//!
//! Only *active* sessions are stored; ending a session deletes its row
//! and inserts a report. Reports have no UPDATE path at all — insert,
//! date query, and bulk delete are the only statements that exist.

use std::path::Path;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{Connection, params};
use thiserror::Error;

use lounge_core::{
    Device, DeviceRegistry, PriceRate, PriceTable, Report, ReportLedger, Session,
};

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse a stored timestamp.
    #[error("invalid timestamp for {key}: {timestamp}")]
    TimestampParse {
        key: String,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// Failed to parse a stored date.
    #[error("invalid date for {key}: {date}")]
    DateParse {
        key: String,
        date: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored enum column holds an unrecognized value.
    #[error("invalid stored value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the
    /// connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the schema. Idempotent.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS devices (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                device_type TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'available'
            );

            -- Active sessions only; the row is deleted when the session
            -- ends. One row per device at most, by primary key.
            CREATE TABLE IF NOT EXISTS sessions (
                device_id TEXT PRIMARY KEY,
                time_mode TEXT NOT NULL,
                game_type TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT,
                time_up_notified INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS prices (
                device_type TEXT NOT NULL,
                game_type TEXT NOT NULL,
                rate_per_hour REAL NOT NULL,
                PRIMARY KEY (device_type, game_type)
            );

            CREATE TABLE IF NOT EXISTS reports (
                id TEXT PRIMARY KEY,
                device_id TEXT NOT NULL,
                date TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                duration_minutes INTEGER NOT NULL,
                game_type TEXT NOT NULL,
                cost REAL NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_reports_date ON reports(date);
            ",
        )?;
        Ok(())
    }

    // ===== Devices =====

    /// Inserts or updates a device record.
    pub fn upsert_device(&self, device: &Device) -> Result<(), DbError> {
        self.conn.execute(
            "
            INSERT INTO devices (id, name, device_type, status)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                device_type = excluded.device_type,
                status = excluded.status
            ",
            params![
                device.id,
                device.name,
                device.device_type.as_str(),
                device.status.as_str(),
            ],
        )?;
        Ok(())
    }

    pub fn delete_device(&self, device_id: &str) -> Result<(), DbError> {
        self.conn
            .execute("DELETE FROM devices WHERE id = ?", params![device_id])?;
        Ok(())
    }

    /// Lists all devices ordered by id.
    pub fn list_devices(&self) -> Result<Vec<Device>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, device_type, status FROM devices ORDER BY id ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;
        let mut devices = Vec::new();
        for row in rows {
            let (id, name, device_type, status) = row?;
            devices.push(Device {
                device_type: parse_value(&device_type, &id)?,
                status: parse_value(&status, &id)?,
                id,
                name,
            });
        }
        Ok(devices)
    }

    /// Loads the device registry.
    pub fn load_registry(&self) -> Result<DeviceRegistry, DbError> {
        Ok(DeviceRegistry::from_devices(self.list_devices()?))
    }

    // ===== Sessions =====

    /// Inserts or updates the active session for a device.
    pub fn upsert_session(&self, session: &Session) -> Result<(), DbError> {
        self.conn.execute(
            "
            INSERT INTO sessions (device_id, time_mode, game_type, start_time, end_time, time_up_notified)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(device_id) DO UPDATE SET
                time_mode = excluded.time_mode,
                game_type = excluded.game_type,
                start_time = excluded.start_time,
                end_time = excluded.end_time,
                time_up_notified = excluded.time_up_notified
            ",
            params![
                session.device_id,
                session.time_mode.as_str(),
                session.game_type.as_str(),
                format_timestamp(session.start_time),
                session.end_time.map(format_timestamp),
                i64::from(session.time_up_notified),
            ],
        )?;
        Ok(())
    }

    /// Removes the active session row for a device (session ended).
    pub fn delete_session(&self, device_id: &str) -> Result<(), DbError> {
        self.conn.execute(
            "DELETE FROM sessions WHERE device_id = ?",
            params![device_id],
        )?;
        Ok(())
    }

    /// Lists all active sessions ordered by device id.
    pub fn list_sessions(&self) -> Result<Vec<Session>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT device_id, time_mode, game_type, start_time, end_time, time_up_notified
            FROM sessions
            ORDER BY device_id ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, i64>(5)?,
            ))
        })?;
        let mut sessions = Vec::new();
        for row in rows {
            let (device_id, time_mode, game_type, start_time, end_time, notified) = row?;
            sessions.push(Session {
                time_mode: parse_value(&time_mode, &device_id)?,
                game_type: parse_value(&game_type, &device_id)?,
                start_time: parse_timestamp(&start_time, &device_id)?,
                end_time: end_time
                    .map(|e| parse_timestamp(&e, &device_id))
                    .transpose()?,
                time_up_notified: notified != 0,
                device_id,
            });
        }
        Ok(sessions)
    }

    // ===== Prices =====

    /// Replaces the whole stored price table (administrative update).
    pub fn replace_prices(&mut self, table: &PriceTable) -> Result<(), DbError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM prices", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO prices (device_type, game_type, rate_per_hour) VALUES (?, ?, ?)",
            )?;
            for rate in table.rates() {
                stmt.execute(params![
                    rate.device_type.as_str(),
                    rate.game_type.as_str(),
                    rate.rate_per_hour,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Loads the price table.
    pub fn load_prices(&self) -> Result<PriceTable, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT device_type, game_type, rate_per_hour FROM prices")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, f64>(2)?,
            ))
        })?;
        let mut rates = Vec::new();
        for row in rows {
            let (device_type, game_type, rate_per_hour) = row?;
            let key = format!("{device_type}/{game_type}");
            rates.push(PriceRate {
                device_type: parse_value(&device_type, &key)?,
                game_type: parse_value(&game_type, &key)?,
                rate_per_hour,
            });
        }
        Ok(PriceTable::from_rates(rates))
    }

    // ===== Reports =====

    /// Appends a completed-session report, ignoring duplicates by id.
    pub fn append_report(&self, report: &Report) -> Result<(), DbError> {
        self.conn.execute(
            "
            INSERT OR IGNORE INTO reports
            (id, device_id, date, start_time, end_time, duration_minutes, game_type, cost)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ",
            params![
                report.id,
                report.device_id,
                report.date.to_string(),
                format_timestamp(report.start_time),
                format_timestamp(report.end_time),
                report.duration_minutes,
                report.game_type.as_str(),
                report.cost,
            ],
        )?;
        Ok(())
    }

    /// Lists all reports ordered by start time.
    pub fn list_reports(&self) -> Result<Vec<Report>, DbError> {
        self.query_reports(
            "
            SELECT id, device_id, date, start_time, end_time, duration_minutes, game_type, cost
            FROM reports
            ORDER BY start_time ASC, id ASC
            ",
            params![],
        )
    }

    /// Reports for one calendar day, ordered by start time ascending.
    pub fn reports_on_date(&self, date: NaiveDate) -> Result<Vec<Report>, DbError> {
        self.query_reports(
            "
            SELECT id, device_id, date, start_time, end_time, duration_minutes, game_type, cost
            FROM reports
            WHERE date = ?
            ORDER BY start_time ASC, id ASC
            ",
            params![date.to_string()],
        )
    }

    fn query_reports(
        &self,
        sql: &str,
        query_params: impl rusqlite::Params,
    ) -> Result<Vec<Report>, DbError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(query_params, |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, i64>(5)?,
                row.get::<_, String>(6)?,
                row.get::<_, f64>(7)?,
            ))
        })?;
        let mut reports = Vec::new();
        for row in rows {
            let (id, device_id, date, start_time, end_time, duration_minutes, game_type, cost) =
                row?;
            reports.push(Report {
                device_id,
                date: parse_date(&date, &id)?,
                start_time: parse_timestamp(&start_time, &id)?,
                end_time: parse_timestamp(&end_time, &id)?,
                duration_minutes,
                game_type: parse_value(&game_type, &id)?,
                cost,
                id,
            });
        }
        Ok(reports)
    }

    /// Loads the report ledger.
    pub fn load_ledger(&self) -> Result<ReportLedger, DbError> {
        Ok(ReportLedger::from_reports(self.list_reports()?))
    }

    /// Deletes all reports (the bulk administrative wipe). Returns the
    /// number of rows removed.
    pub fn delete_all_reports(&self) -> Result<usize, DbError> {
        let removed = self.conn.execute("DELETE FROM reports", [])?;
        tracing::info!(removed, "reports table cleared");
        Ok(removed)
    }
}

fn parse_value<T>(value: &str, key: &str) -> Result<T, DbError>
where
    T: std::str::FromStr<Err = String>,
{
    value.parse().map_err(|message| DbError::InvalidValue {
        key: key.to_string(),
        message,
    })
}

fn parse_timestamp(timestamp: &str, key: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            key: key.to_string(),
            timestamp: timestamp.to_string(),
            source,
        })
}

fn parse_date(date: &str, key: &str) -> Result<NaiveDate, DbError> {
    date.parse().map_err(|source| DbError::DateParse {
        key: key.to_string(),
        date: date.to_string(),
        source,
    })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

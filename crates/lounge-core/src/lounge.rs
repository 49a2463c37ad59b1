//! The coordinating session engine.
//!
//! [`Lounge`] owns the device registry, the active session set, the
//! price table and the report ledger, and routes every mutation through
//! the transition methods below. Each transition is atomic: callers
//! hold `&mut Lounge` for its duration, so a tick scan can never
//! interleave with a start or an end at a finer grain than one full
//! transition.
//!
//! The engine holds no timer. An external scheduler invokes
//! [`Lounge::tick`] at its own interval (target 1 Hz) with an explicit
//! `now`, which keeps every transition deterministic under test.

use std::collections::HashMap;
use std::sync::mpsc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::device::{Device, DevicePatch, DeviceRegistry, DeviceStatus, DeviceType};
use crate::error::LoungeError;
use crate::pricing::{GameType, PriceTable, compute_cost};
use crate::report::{Report, ReportLedger};
use crate::session::{Session, TimeMode};

/// Notification published to subscribers on every state change.
#[derive(Debug, Clone, PartialEq)]
pub enum LoungeEvent {
    /// A timed session reached its scheduled expiry. Delivered exactly
    /// once per expiry; advisory only, billing keeps running.
    TimeUp { device_id: String },
    /// A session ended and produced this report, for transient display.
    SessionEnded(Report),
    /// Device/session/price/report state changed; readers should refresh.
    StateChanged,
}

/// Coordinating service owning all lounge state.
#[derive(Debug, Default)]
pub struct Lounge {
    registry: DeviceRegistry,
    /// Active sessions keyed by device id. The key is the invariant:
    /// at most one active session per device.
    sessions: HashMap<String, Session>,
    prices: PriceTable,
    ledger: ReportLedger,
    subscribers: Vec<mpsc::Sender<LoungeEvent>>,
}

impl Lounge {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the engine from stored state (e.g. on process start).
    ///
    /// Sessions without a matching device are dropped with a warning
    /// rather than resurrected against a deleted device.
    #[must_use]
    pub fn from_state(
        registry: DeviceRegistry,
        sessions: impl IntoIterator<Item = Session>,
        prices: PriceTable,
        ledger: ReportLedger,
    ) -> Self {
        let mut lounge = Self {
            registry,
            prices,
            ledger,
            ..Self::default()
        };
        for session in sessions {
            if lounge.registry.get(&session.device_id).is_err() {
                tracing::warn!(device = %session.device_id, "dropping session for unknown device");
                continue;
            }
            lounge.sessions.insert(session.device_id.clone(), session);
        }
        lounge
    }

    /// Registers a subscriber for state-change notifications.
    ///
    /// Disconnected receivers are pruned on the next publish.
    pub fn subscribe(&mut self) -> mpsc::Receiver<LoungeEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    fn publish(&mut self, event: &LoungeEvent) {
        self.subscribers
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn publish_state_changed(&mut self) {
        self.publish(&LoungeEvent::StateChanged);
    }

    // ===== Devices =====

    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.registry.iter()
    }

    pub fn device(&self, device_id: &str) -> Result<&Device, LoungeError> {
        self.registry.get(device_id)
    }

    pub fn add_device(&mut self, name: String, device_type: DeviceType) -> Device {
        let device = self.registry.add(name, device_type).clone();
        self.publish_state_changed();
        device
    }

    pub fn update_device(
        &mut self,
        device_id: &str,
        patch: DevicePatch,
    ) -> Result<Device, LoungeError> {
        let device = self.registry.update_device(device_id, patch)?.clone();
        self.publish_state_changed();
        Ok(device)
    }

    /// Deletes a device. Fails with [`LoungeError::DeviceBusy`] while a
    /// session is active on it; there is no cancel-and-delete shortcut.
    pub fn delete_device(&mut self, device_id: &str) -> Result<Device, LoungeError> {
        let device = self.registry.delete(device_id)?;
        self.publish_state_changed();
        Ok(device)
    }

    /// Administrative Available ⇄ Maintenance toggle.
    pub fn set_device_status(
        &mut self,
        device_id: &str,
        status: DeviceStatus,
    ) -> Result<(), LoungeError> {
        self.registry.set_status(device_id, status)?;
        self.publish_state_changed();
        Ok(())
    }

    // ===== Prices =====

    #[must_use]
    pub const fn prices(&self) -> &PriceTable {
        &self.prices
    }

    /// Replaces the whole price table (administrative update).
    pub fn update_prices(&mut self, table: PriceTable) {
        self.prices = table;
        self.publish_state_changed();
    }

    pub fn set_rate(&mut self, device_type: DeviceType, game_type: GameType, rate_per_hour: f64) {
        self.prices.set_rate(device_type, game_type, rate_per_hour);
        self.publish_state_changed();
    }

    // ===== Sessions =====

    #[must_use]
    pub fn session(&self, device_id: &str) -> Option<&Session> {
        self.sessions.get(device_id)
    }

    pub fn sessions(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    /// Starts a session on an Available device and marks it Busy.
    ///
    /// Timed mode requires a positive `duration_minutes`; Open mode
    /// must not carry one. The scheduled expiry of a Timed session is
    /// fixed here (`now + duration`) and only ever moves via
    /// [`Lounge::extend_session`].
    pub fn start_session(
        &mut self,
        device_id: &str,
        time_mode: TimeMode,
        game_type: GameType,
        duration_minutes: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<Session, LoungeError> {
        let device = self.registry.get(device_id)?;
        let end_time = match (time_mode, duration_minutes) {
            (TimeMode::Timed, Some(minutes)) if minutes > 0 => {
                Some(now + Duration::minutes(minutes))
            }
            (TimeMode::Timed, _) => {
                return Err(LoungeError::InvalidRequest(
                    "timed sessions need a positive duration in minutes".to_string(),
                ));
            }
            (TimeMode::Open, Some(_)) => {
                return Err(LoungeError::InvalidRequest(
                    "open sessions do not take a duration".to_string(),
                ));
            }
            (TimeMode::Open, None) => None,
        };
        if self.sessions.contains_key(device_id) {
            // status should already be Busy in this case; report it the same way
            return Err(LoungeError::DeviceUnavailable {
                device_id: device_id.to_string(),
                status: device.status.to_string(),
            });
        }

        self.registry.mark_busy(device_id)?;
        let session = Session {
            device_id: device_id.to_string(),
            time_mode,
            game_type,
            start_time: now,
            end_time,
            time_up_notified: false,
        };
        self.sessions.insert(device_id.to_string(), session.clone());
        tracing::info!(device = %device_id, mode = %time_mode, game = %game_type, "session started");
        self.publish_state_changed();
        Ok(session)
    }

    /// Scans active timed sessions for expiry and raises the time-up
    /// signal for each newly expired one.
    ///
    /// Level-triggered: expiry is the state comparison `end_time <=
    /// now`, so a session that expired while no tick was running still
    /// fires on the next call, and the `time_up_notified` latch keeps
    /// it to exactly one signal per expiry.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<String> {
        let mut expired: Vec<String> = Vec::new();
        for session in self.sessions.values_mut() {
            if !session.time_up_notified && session.is_expired(now) {
                session.time_up_notified = true;
                expired.push(session.device_id.clone());
            }
        }
        expired.sort_unstable();
        for device_id in &expired {
            tracing::info!(device = %device_id, "session time up");
            self.publish(&LoungeEvent::TimeUp {
                device_id: device_id.clone(),
            });
        }
        if !expired.is_empty() {
            self.publish_state_changed();
        }
        expired
    }

    /// Pushes a Timed session's scheduled expiry out by `additional_minutes`.
    ///
    /// Re-arms the time-up signal when the new expiry lands back in the
    /// future.
    pub fn extend_session(
        &mut self,
        device_id: &str,
        additional_minutes: i64,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, LoungeError> {
        self.registry.get(device_id)?;
        if additional_minutes <= 0 {
            return Err(LoungeError::InvalidRequest(
                "extension must be a positive number of minutes".to_string(),
            ));
        }
        let session = self
            .sessions
            .get_mut(device_id)
            .ok_or_else(|| LoungeError::NoActiveSession(device_id.to_string()))?;
        let Some(end_time) = session.end_time else {
            return Err(LoungeError::InvalidRequest(
                "only timed sessions can be extended".to_string(),
            ));
        };
        let new_end = end_time + Duration::minutes(additional_minutes);
        session.end_time = Some(new_end);
        if new_end > now {
            session.time_up_notified = false;
        }
        tracing::info!(device = %device_id, end = %new_end, "session extended");
        self.publish_state_changed();
        Ok(new_end)
    }

    /// Ends the active session on a device: the single commit point.
    ///
    /// Bills actual elapsed wall time from start to `now` — never the
    /// originally scheduled duration — so early termination, extension
    /// and overrun past the scheduled expiry are all reflected. On
    /// success the session record is gone, the device is Available
    /// again and exactly one report has been appended.
    pub fn end_session(
        &mut self,
        device_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Report, LoungeError> {
        let device = self.registry.get(device_id)?;
        let session = self
            .sessions
            .get(device_id)
            .ok_or_else(|| LoungeError::NoActiveSession(device_id.to_string()))?;

        // Compute the bill before touching any state so a price-table
        // miss leaves the session running.
        let elapsed_ms = session.elapsed_ms(now);
        let cost = compute_cost(
            &self.prices,
            device.device_type,
            session.game_type,
            elapsed_ms,
        )?;
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
        let duration_minutes = (elapsed_ms as f64 / 60_000.0).round() as i64;

        let session = self
            .sessions
            .remove(device_id)
            .expect("checked present above");
        let report = Report {
            id: Uuid::new_v4().to_string(),
            device_id: device_id.to_string(),
            date: now.date_naive(),
            start_time: session.start_time,
            end_time: now,
            duration_minutes,
            game_type: session.game_type,
            cost,
        };
        self.registry.mark_available(device_id)?;
        self.ledger.append(report.clone());
        tracing::info!(device = %device_id, minutes = duration_minutes, cost, "session ended");
        self.publish(&LoungeEvent::SessionEnded(report.clone()));
        self.publish_state_changed();
        Ok(report)
    }

    // ===== Reports =====

    #[must_use]
    pub const fn reports(&self) -> &ReportLedger {
        &self.ledger
    }

    #[must_use]
    pub fn reports_on(&self, date: chrono::NaiveDate) -> Vec<Report> {
        self.ledger.query_by_date(date)
    }

    pub fn delete_all_reports(&mut self) -> usize {
        let removed = self.ledger.delete_all();
        self.publish_state_changed();
        removed
    }
}

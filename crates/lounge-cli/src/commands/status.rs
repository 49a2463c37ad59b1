//! Status command: the operator's dashboard view.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use lounge_core::{DeviceStatus, Lounge, compute_cost};
use serde::Serialize;

use super::util::format_duration;

/// One device row in the status view.
#[derive(Debug, Serialize)]
struct DeviceView {
    id: String,
    name: String,
    device_type: String,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    session: Option<SessionView>,
}

#[derive(Debug, Serialize)]
struct SessionView {
    time_mode: String,
    game_type: String,
    start_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scheduled_end: Option<DateTime<Utc>>,
    elapsed_minutes: i64,
    /// Cost if the session ended right now; absent when no rate is
    /// configured for the tier.
    #[serde(skip_serializing_if = "Option::is_none")]
    running_cost: Option<f64>,
}

fn device_views(lounge: &Lounge, now: DateTime<Utc>) -> Vec<DeviceView> {
    lounge
        .devices()
        .map(|device| {
            let session = lounge.session(&device.id).map(|session| {
                let elapsed_ms = session.elapsed_ms(now);
                SessionView {
                    time_mode: session.time_mode.to_string(),
                    game_type: session.game_type.to_string(),
                    start_time: session.start_time,
                    scheduled_end: session.end_time,
                    elapsed_minutes: elapsed_ms / 60_000,
                    running_cost: compute_cost(
                        lounge.prices(),
                        device.device_type,
                        session.game_type,
                        elapsed_ms,
                    )
                    .ok(),
                }
            });
            DeviceView {
                id: device.id.clone(),
                name: device.name.clone(),
                device_type: device.device_type.to_string(),
                status: device.status.to_string(),
                session,
            }
        })
        .collect()
}

pub fn run<W: Write>(
    writer: &mut W,
    lounge: &Lounge,
    now: DateTime<Utc>,
    json: bool,
) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *writer, &device_views(lounge, now))?;
        writeln!(writer)?;
        return Ok(());
    }

    if lounge.devices().next().is_none() {
        writeln!(writer, "No devices registered. Add one with: lounge device add")?;
        return Ok(());
    }

    for device in lounge.devices() {
        let short_id = &device.id[..device.id.len().min(8)];
        match lounge.session(&device.id) {
            Some(session) => {
                let elapsed_ms = session.elapsed_ms(now);
                let due = compute_cost(
                    lounge.prices(),
                    device.device_type,
                    session.game_type,
                    elapsed_ms,
                )
                .map_or_else(|_| "rate not set".to_string(), |c| format!("{c:.2} due"));
                let schedule = session.end_time.map_or_else(
                    || "open".to_string(),
                    |end| {
                        if end <= now {
                            format!("over by {}", format_duration((now - end).num_milliseconds()))
                        } else {
                            format!("{} left", format_duration((end - now).num_milliseconds()))
                        }
                    },
                );
                writeln!(
                    writer,
                    "{short_id}  {name} [{device_type}]  busy: {game} / {schedule}, {elapsed} elapsed, {due}",
                    name = device.name,
                    device_type = device.device_type,
                    game = session.game_type,
                    elapsed = format_duration(elapsed_ms),
                )?;
            }
            None => {
                let status = match device.status {
                    DeviceStatus::Available => "available",
                    DeviceStatus::Maintenance => "maintenance",
                    // busy without a session cannot happen through the engine
                    DeviceStatus::Busy => "busy",
                };
                writeln!(
                    writer,
                    "{short_id}  {name} [{device_type}]  {status}",
                    name = device.name,
                    device_type = device.device_type,
                )?;
            }
        }
    }
    Ok(())
}

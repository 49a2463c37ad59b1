//! Device management commands.

use std::io::Write;

use anyhow::{Context, Result};
use lounge_core::DevicePatch;
use lounge_db::Database;

use crate::DeviceAction;

use super::util::{load_lounge, resolve_device};

pub fn run<W: Write>(writer: &mut W, db: &Database, action: &DeviceAction) -> Result<()> {
    let mut lounge = load_lounge(db)?;
    match action {
        DeviceAction::Add { name, device_type } => {
            let device = lounge.add_device(name.clone(), *device_type);
            db.upsert_device(&device)?;
            writeln!(writer, "Added {} [{}] as {}", device.name, device.device_type, device.id)?;
        }
        DeviceAction::List { json } => {
            let devices: Vec<_> = lounge.devices().collect();
            if *json {
                serde_json::to_writer_pretty(&mut *writer, &devices)?;
                writeln!(writer)?;
            } else if devices.is_empty() {
                writeln!(writer, "No devices registered.")?;
            } else {
                for device in devices {
                    writeln!(
                        writer,
                        "{}  {} [{}]  {}",
                        device.id, device.name, device.device_type, device.status
                    )?;
                }
            }
        }
        DeviceAction::SetStatus { device, status } => {
            let device_id = resolve_device(&lounge, device)?;
            lounge
                .set_device_status(&device_id, *status)
                .context("failed to change device status")?;
            db.upsert_device(lounge.device(&device_id)?)?;
            writeln!(writer, "{} is now {status}", lounge.device(&device_id)?.name)?;
        }
        DeviceAction::SetType {
            device,
            device_type,
        } => {
            let device_id = resolve_device(&lounge, device)?;
            let device = lounge.update_device(
                &device_id,
                DevicePatch {
                    device_type: Some(*device_type),
                    ..DevicePatch::default()
                },
            )?;
            db.upsert_device(&device)?;
            writeln!(writer, "{} is now a {}", device.name, device.device_type)?;
        }
        DeviceAction::Rename { device, name } => {
            let device_id = resolve_device(&lounge, device)?;
            let device = lounge.update_device(
                &device_id,
                DevicePatch {
                    name: Some(name.clone()),
                    ..DevicePatch::default()
                },
            )?;
            db.upsert_device(&device)?;
            writeln!(writer, "Renamed {} to {}", device_id, device.name)?;
        }
        DeviceAction::Rm { device } => {
            let device_id = resolve_device(&lounge, device)?;
            let removed = lounge
                .delete_device(&device_id)
                .context("failed to delete device")?;
            db.delete_device(&device_id)?;
            writeln!(writer, "Deleted {} ({})", removed.name, removed.id)?;
        }
    }
    Ok(())
}

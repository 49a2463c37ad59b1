//! Device records and the registry that owns them.
//!
//! The registry enforces the status transition rules: `Busy` is only
//! reachable through the session engine, administrative calls may
//! toggle Available ⇄ Maintenance, and a Busy device can be neither
//! deleted nor re-statused.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LoungeError;

/// Console hardware generation. Selects the price-table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Ps4,
    Ps5,
}

impl DeviceType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ps4 => "ps4",
            Self::Ps5 => "ps5",
        }
    }
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DeviceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ps4" => Ok(Self::Ps4),
            "ps5" => Ok(Self::Ps5),
            _ => Err(format!("invalid device type: {s}")),
        }
    }
}

/// Availability state of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeviceStatus {
    #[default]
    Available,
    Busy,
    Maintenance,
}

impl DeviceStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Busy => "busy",
            Self::Maintenance => "maintenance",
        }
    }
}

impl std::fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DeviceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "busy" => Ok(Self::Busy),
            "maintenance" => Ok(Self::Maintenance),
            _ => Err(format!("invalid device status: {s}")),
        }
    }
}

/// A rentable console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub name: String,
    pub device_type: DeviceType,
    #[serde(default)]
    pub status: DeviceStatus,
}

/// Administrative patch for [`DeviceRegistry::update_device`].
///
/// Absent fields are left unchanged. Status is deliberately not
/// patchable here; it goes through [`DeviceRegistry::set_status`].
#[derive(Debug, Clone, Default)]
pub struct DevicePatch {
    pub name: Option<String>,
    pub device_type: Option<DeviceType>,
}

/// Owns all device records, keyed by id.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: BTreeMap<String, Device>,
}

impl DeviceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a registry from stored records (e.g. on process start).
    #[must_use]
    pub fn from_devices(devices: impl IntoIterator<Item = Device>) -> Self {
        Self {
            devices: devices.into_iter().map(|d| (d.id.clone(), d)).collect(),
        }
    }

    /// Registers a new device, Available by default. Returns the record.
    pub fn add(&mut self, name: String, device_type: DeviceType) -> &Device {
        let id = Uuid::new_v4().to_string();
        tracing::info!(%id, %name, %device_type, "device added");
        self.devices
            .entry(id)
            .or_insert_with_key(|id| Device {
                id: id.clone(),
                name,
                device_type,
                status: DeviceStatus::Available,
            })
    }

    pub fn get(&self, device_id: &str) -> Result<&Device, LoungeError> {
        self.devices
            .get(device_id)
            .ok_or_else(|| LoungeError::UnknownDevice(device_id.to_string()))
    }

    /// Devices ordered by id.
    pub fn iter(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Applies an administrative patch to name and/or type.
    pub fn update_device(
        &mut self,
        device_id: &str,
        patch: DevicePatch,
    ) -> Result<&Device, LoungeError> {
        let device = self
            .devices
            .get_mut(device_id)
            .ok_or_else(|| LoungeError::UnknownDevice(device_id.to_string()))?;
        if let Some(name) = patch.name {
            device.name = name;
        }
        if let Some(device_type) = patch.device_type {
            device.device_type = device_type;
        }
        Ok(device)
    }

    /// Administrative status change: Available ⇄ Maintenance only.
    ///
    /// Busy cannot be set directly (only a session start reaches it),
    /// and a Busy device cannot be toggled at all until its session ends.
    pub fn set_status(
        &mut self,
        device_id: &str,
        status: DeviceStatus,
    ) -> Result<(), LoungeError> {
        if status == DeviceStatus::Busy {
            return Err(LoungeError::InvalidRequest(
                "busy is set by starting a session, not directly".to_string(),
            ));
        }
        let device = self
            .devices
            .get_mut(device_id)
            .ok_or_else(|| LoungeError::UnknownDevice(device_id.to_string()))?;
        if device.status == DeviceStatus::Busy {
            return Err(LoungeError::DeviceBusy(device_id.to_string()));
        }
        device.status = status;
        Ok(())
    }

    /// Removes a device. Fails while a session is active on it.
    pub fn delete(&mut self, device_id: &str) -> Result<Device, LoungeError> {
        let device = self
            .devices
            .get(device_id)
            .ok_or_else(|| LoungeError::UnknownDevice(device_id.to_string()))?;
        if device.status == DeviceStatus::Busy {
            return Err(LoungeError::DeviceBusy(device_id.to_string()));
        }
        tracing::info!(id = %device_id, "device deleted");
        Ok(self
            .devices
            .remove(device_id)
            .expect("checked present above"))
    }

    /// Session-engine transition: mark Busy when a session starts.
    pub(crate) fn mark_busy(&mut self, device_id: &str) -> Result<(), LoungeError> {
        let device = self
            .devices
            .get_mut(device_id)
            .ok_or_else(|| LoungeError::UnknownDevice(device_id.to_string()))?;
        if device.status != DeviceStatus::Available {
            return Err(LoungeError::DeviceUnavailable {
                device_id: device_id.to_string(),
                status: device.status.to_string(),
            });
        }
        device.status = DeviceStatus::Busy;
        Ok(())
    }

    /// Session-engine transition: back to Available when a session ends.
    pub(crate) fn mark_available(&mut self, device_id: &str) -> Result<(), LoungeError> {
        let device = self
            .devices
            .get_mut(device_id)
            .ok_or_else(|| LoungeError::UnknownDevice(device_id.to_string()))?;
        device.status = DeviceStatus::Available;
        Ok(())
    }
}

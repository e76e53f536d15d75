//! Device registry interface
//!
//! The registry itself (CRUD, persistence) belongs to the host application.
//! The engine only needs lookups, so it depends on the [`DeviceRegistry`]
//! trait. [`DeviceList`] is the in-memory implementation, loadable from the
//! registry's `devices.json` document.

use std::path::Path;

use parking_lot::RwLock;
use tracing::{debug, info};

use hf2211_types::DeviceDescriptor;

use crate::error::{Error, Result};

/// Lookup side of the device registry
pub trait DeviceRegistry: Send + Sync {
    /// Find a device by id
    fn get_device(&self, id: &str) -> Option<DeviceDescriptor>;

    /// Device used when a command names none
    fn default_device(&self) -> Option<DeviceDescriptor>;
}

/// In-memory device list
///
/// Records can be swapped at runtime with [`replace`](DeviceList::replace)
/// while transactions are running; each lookup returns an owned copy.
#[derive(Debug, Default)]
pub struct DeviceList {
    devices: RwLock<Vec<DeviceDescriptor>>,
}

impl DeviceList {
    /// Create a list from records
    pub fn new(devices: Vec<DeviceDescriptor>) -> Self {
        Self {
            devices: RwLock::new(devices),
        }
    }

    /// Parse a `devices.json` document (a JSON array of records)
    pub fn from_json(json: &str) -> Result<Self> {
        let devices: Vec<DeviceDescriptor> = serde_json::from_str(json)
            .map_err(|e| hf2211_types::Error::Parse(e.to_string()))?;

        for device in &devices {
            device.validate()?;
        }

        debug!(count = devices.len(), "Parsed device list");
        Ok(Self::new(devices))
    }

    /// Load a `devices.json` file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let list = Self::from_json(&json)?;

        info!("Loaded {} devices from {}", list.len(), path.display());
        Ok(list)
    }

    /// Single-record list with the factory default indicator
    pub fn factory_default() -> Self {
        Self::new(vec![
            DeviceDescriptor::new("scale1", "192.168.1.11", hf2211_core::constants::DEFAULT_PORT)
                .with_name("HF2211 Scale")
                .as_default(),
        ])
    }

    /// Swap all records
    pub fn replace(&self, devices: Vec<DeviceDescriptor>) {
        *self.devices.write() = devices;
    }

    /// Copy of all records
    pub fn devices(&self) -> Vec<DeviceDescriptor> {
        self.devices.read().clone()
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.devices.read().len()
    }

    /// Check if no device is configured
    pub fn is_empty(&self) -> bool {
        self.devices.read().is_empty()
    }
}

impl DeviceRegistry for DeviceList {
    fn get_device(&self, id: &str) -> Option<DeviceDescriptor> {
        self.devices.read().iter().find(|d| d.id == id).cloned()
    }

    /// First record flagged default, else the first record
    fn default_device(&self) -> Option<DeviceDescriptor> {
        let devices = self.devices.read();
        devices
            .iter()
            .find(|d| d.is_default)
            .or_else(|| devices.first())
            .cloned()
    }
}

/// Resolve the target of a command
pub fn resolve(registry: &dyn DeviceRegistry, device_id: Option<&str>) -> Result<DeviceDescriptor> {
    match device_id {
        Some(id) => registry
            .get_device(id)
            .ok_or_else(|| Error::DeviceNotFound(id.to_string())),
        None => registry.default_device().ok_or(Error::NoDevicesConfigured),
    }
}

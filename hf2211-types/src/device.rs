//! Device descriptor

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

fn default_port() -> u16 {
    9999
}

/// A configured indicator
///
/// Same shape as the records of the `devices.json` registry file; fields the
/// protocol does not use (`type`, `model`, ...) are ignored on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDescriptor {
    /// Registry identifier
    pub id: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Host name or IP address
    pub host: String,

    /// TCP port of the Ethernet module
    #[serde(default = "default_port")]
    pub port: u16,

    /// Used when a command names no device
    #[serde(default)]
    pub is_default: bool,
}

impl DeviceDescriptor {
    pub fn new(id: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            host: host.into(),
            port,
            is_default: false,
        }
    }

    /// Set display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Mark as the default device
    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    /// Check the fields needed to open a connection
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::Validation("device id is empty".into()));
        }
        if self.host.trim().is_empty() {
            return Err(Error::Validation(format!("device {} has no host", self.id)));
        }
        if self.port == 0 {
            return Err(Error::Validation(format!("device {} has port 0", self.id)));
        }
        Ok(())
    }

    /// `host:port`
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for DeviceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{})", self.name, self.host, self.port)
    }
}

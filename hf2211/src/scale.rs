//! High-level scale interface

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use hf2211_core::{Command, FailureKind, TransactionResult};

use crate::{
    engine::TransactionEngine,
    error::{Error, Result},
    registry::{self, DeviceRegistry},
    response::ScaleResponse,
};

/// HF2211 weighing indicators reachable through a registry
///
/// Every call opens a fresh connection to the target device, sends one
/// command and returns one result tagged with the device. Calls may run
/// concurrently, including against the same device.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use hf2211::{DeviceList, Scale, TransactionResult};
///
/// #[tokio::main]
/// async fn main() {
///     let scale = Scale::new(Arc::new(DeviceList::factory_default()));
///
///     match scale.read_weight(None).await.into_result() {
///         TransactionResult::Weight(w) => println!("net: {:?}", w.net),
///         other => println!("{:?}", other),
///     }
/// }
/// ```
#[derive(Clone)]
pub struct Scale {
    registry: Arc<dyn DeviceRegistry>,
    engine: TransactionEngine,
}

impl Scale {
    /// Create a scale front end over `registry`
    pub fn new(registry: Arc<dyn DeviceRegistry>) -> Self {
        Self {
            registry,
            engine: TransactionEngine::new(),
        }
    }

    /// Set the per-command timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.engine = self.engine.with_timeout(timeout);
        self
    }

    /// Registry used for device lookups
    pub fn registry(&self) -> &Arc<dyn DeviceRegistry> {
        &self.registry
    }

    /// Send `command` to the device `device_id`, or to the default device
    ///
    /// Unknown devices and an empty registry produce an error result without
    /// touching the network.
    pub async fn send_command(&self, command: Command, device_id: Option<&str>) -> ScaleResponse {
        let device = match registry::resolve(self.registry.as_ref(), device_id) {
            Ok(device) => device,
            Err(e) => {
                warn!("Cannot send {}: {}", command, e);
                return ScaleResponse::untagged(lookup_failure(e));
            }
        };

        let result = self.engine.execute_on(&device, command).await;
        info!("{} on {} -> {}", command, device.id, result.type_name());
        ScaleResponse::new(&device, result)
    }

    /// Read gross, tare and flags
    pub async fn read_weight(&self, device_id: Option<&str>) -> ScaleResponse {
        self.send_command(Command::ReadWeight, device_id).await
    }

    /// Tare the current load (also clears any preset tare on success)
    pub async fn tare(&self, device_id: Option<&str>) -> ScaleResponse {
        self.send_command(Command::Tare, device_id).await
    }

    /// Read the error/status register
    pub async fn read_status(&self, device_id: Option<&str>) -> ScaleResponse {
        self.send_command(Command::ReadStatus, device_id).await
    }

    /// Reset the preset tare
    pub async fn clear_preset_tare(&self, device_id: Option<&str>) -> ScaleResponse {
        self.send_command(Command::ClearPresetTare, device_id).await
    }

    /// Store a preset tare in kilograms
    ///
    /// # Errors
    ///
    /// Returns an error before any network activity if `value_kg` is outside
    /// `0.0..=30.0`.
    pub async fn set_preset_tare(&self, value_kg: f64, device_id: Option<&str>) -> Result<ScaleResponse> {
        let command = Command::set_preset_tare(value_kg)?;
        Ok(self.send_command(command, device_id).await)
    }
}

fn lookup_failure(err: Error) -> TransactionResult {
    let kind = match err {
        Error::DeviceNotFound(_) => FailureKind::DeviceNotFound,
        Error::NoDevicesConfigured => FailureKind::NoDevicesConfigured,
        Error::Core(ref e) if e.is_validation() => FailureKind::Validation,
        _ => FailureKind::InvalidResponse,
    };
    TransactionResult::failure(kind, err.to_string())
}

//! # hf2211
//!
//! Rust implementation of the HF2211 weighing indicator TCP protocol.
//!
//! ## Features
//!
//! - Type-safe command set (weight, tare, status, preset tare)
//! - Async/await API using Tokio
//! - One connection per command with a hard timeout
//! - Replies classified into typed, serializable results tagged with the device
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use hf2211::{DeviceDescriptor, DeviceList, Scale};
//!
//! #[tokio::main]
//! async fn main() -> hf2211::Result<()> {
//!     let devices = DeviceList::new(vec![
//!         DeviceDescriptor::new("scale1", "192.168.1.11", 9999).as_default(),
//!     ]);
//!     let scale = Scale::new(Arc::new(devices));
//!
//!     // Read the default device
//!     println!("{:?}", scale.read_weight(None).await);
//!
//!     // Preset tare of 1.5 kg on a named device
//!     println!("{:?}", scale.set_preset_tare(1.5, Some("scale1")).await?);
//!
//!     Ok(())
//! }
//! ```

pub mod engine;
pub mod error;
pub mod registry;
pub mod response;
pub mod scale;

// Re-exports
pub use engine::TransactionEngine;
pub use error::{Error, Result};
pub use registry::{DeviceList, DeviceRegistry};
pub use response::ScaleResponse;
pub use scale::Scale;

// Re-export types
pub use hf2211_core::{
    Command, FailureKind, PresetKind, PresetTare, StatusFlags, TransactionResult,
    response::{Failure, PresetOutcome, StatusReading, TareOutcome, WeightReading},
};
pub use hf2211_types::DeviceDescriptor;

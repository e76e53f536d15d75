//! # hf2211-core
//!
//! Core protocol implementation for HF2211 weighing indicators.
//!
//! This crate provides the low-level protocol primitives:
//! - Command frames and preset tare encoding
//! - LRC checksum calculation
//! - Reply classification and status flag decoding
//! - The per-command transaction state machine
//! - Protocol constants

pub mod checksum;
pub mod command;
pub mod constants;
pub mod error;
pub mod flags;
pub mod frame;
pub mod response;
pub mod status;
pub mod transaction;

pub use command::{Command, PresetTare};
pub use error::{Error, Result};
pub use flags::StatusFlags;
pub use frame::Reply;
pub use response::{FailureKind, PresetKind, TransactionResult};
pub use transaction::{Transaction, TransactionState};

/// Protocol version information
pub const PROTOCOL_VERSION: &str = "1.0";

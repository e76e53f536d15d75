//! Type definitions for hf2211

pub mod device;
pub mod error;

pub use device::DeviceDescriptor;
pub use error::{Error, Result};

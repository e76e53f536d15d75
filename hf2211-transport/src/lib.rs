//! Transport layer for the HF2211 protocol
//!
//! Provides TCP communication with the indicator's Ethernet module.

pub mod error;
pub mod tcp;

pub use error::{Error, Result};
pub use tcp::TcpTransport;

use async_trait::async_trait;
use bytes::BytesMut;

/// Transport trait for different communication methods
#[async_trait]
pub trait Transport: Send + Sync {
    /// Connect to device
    async fn connect(&mut self) -> Result<()>;

    /// Disconnect from device
    async fn disconnect(&mut self) -> Result<()>;

    /// Check if connected
    fn is_connected(&self) -> bool;

    /// Send raw bytes
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive available bytes into `buf`
    ///
    /// Returns the number of bytes appended; `0` means the peer closed the
    /// connection.
    async fn receive(&mut self, buf: &mut BytesMut) -> Result<usize>;

    /// Get remote address
    fn remote_addr(&self) -> String;
}

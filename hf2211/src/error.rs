//! High-level error types

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Core protocol error: {0}")]
    Core(#[from] hf2211_core::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] hf2211_transport::Error),

    #[error("Type error: {0}")]
    Types(#[from] hf2211_types::Error),

    #[error("Device not found")]
    DeviceNotFound(String),

    #[error("No devices configured")]
    NoDevicesConfigured,

    #[error("Registry I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Message reported in a failed result
    ///
    /// Socket errors surface as the underlying OS message, without the
    /// "Transport error:" prefix of this type's `Display`.
    pub fn result_message(&self) -> String {
        match self {
            Self::Transport(err) => err.to_string(),
            other => other.to_string(),
        }
    }
}

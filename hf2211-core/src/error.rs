//! Error types for hf2211-core

/// Result type alias for hf2211 protocol operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core protocol errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Preset tare outside the range the indicator accepts
    #[error("Value must be between 0.0 and {max} kg, got {value}")]
    PresetOutOfRange {
        value: f64,
        max: f64,
    },

    /// Transaction driven through an impossible transition
    #[error("Invalid transaction state: {0}")]
    InvalidTransactionState(String),
}

impl Error {
    /// Check if error was raised before any network activity
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::PresetOutOfRange { .. })
    }
}

//! Protocol constants

/// Start-of-text marker opening every frame
pub const STX: u8 = 0x02;

/// End-of-text marker closing the frame body
pub const ETX: u8 = 0x03;

/// Line terminator appended after the frame
pub const CRLF: [u8; 2] = [0x0D, 0x0A];

/// Default TCP port of the indicator's Ethernet module
pub const DEFAULT_PORT: u16 = 9999;

/// Hard limit for one transaction, measured from the start of connect (milliseconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 2000;

/// Largest preset tare the indicator accepts (kilograms)
pub const MAX_PRESET_TARE_KG: f64 = 30.0;

/// Function codes as they appear in replies (lowercase echo of the request code)
pub mod function {
    /// Read reply
    pub const READ: u8 = b'r';

    /// Write reply
    pub const WRITE: u8 = b'w';

    /// Execute reply
    pub const EXECUTE: u8 = b'e';
}

/// Data addresses (4 ASCII characters at offset 6)
pub mod address {
    /// Status register
    pub const STATUS: &str = "0100";

    /// Gross / tare / flags block
    pub const WEIGHT: &str = "0107";

    /// Preset tare register
    pub const PRESET_TARE: &str = "0108";

    /// Tare execution
    pub const TARE: &str = "1103";
}

/// Byte offsets inside a reply
pub mod offsets {
    use std::ops::Range;

    /// Function code byte
    pub const FUNCTION: usize = 5;

    /// Data address field
    pub const ADDRESS: Range<usize> = 6..10;

    /// Two hex characters giving the payload length of variable replies
    pub const LENGTH: Range<usize> = 10..12;

    /// First payload byte
    pub const PAYLOAD: usize = 12;

    /// Gross weight field of a weight reply
    pub const GROSS: Range<usize> = 12..23;

    /// Tare weight field of a weight reply
    pub const TARE: Range<usize> = 23..34;

    /// Status flags field of a weight reply
    pub const FLAGS: Range<usize> = 34..38;

    /// Checksum of a weight reply
    pub const WEIGHT_LRC: Range<usize> = 38..40;

    /// Result code of a write/execute acknowledgment
    pub const RESULT_CODE: usize = 12;

    /// Checksum of a write/execute acknowledgment
    pub const ACK_LRC: Range<usize> = 13..15;
}

/// Minimum length of a weight reply
pub const WEIGHT_REPLY_MIN_LEN: usize = 43;

/// Minimum length of status and acknowledgment replies
pub const SHORT_REPLY_MIN_LEN: usize = 16;

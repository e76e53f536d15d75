//! HF2211 longitudinal redundancy check
//!
//! The indicator protects each reply with an LRC:
//! 1. XOR every byte from the first address byte (index 1, right after STX)
//!    up to the checksum field
//! 2. Render the 8-bit result as two uppercase hex characters
//!
//! The received checksum is ASCII text, so verification is a plain string
//! comparison.

use tracing::trace;

/// Fold `data[start..end]` with XOR
pub fn fold(data: &[u8], start: usize, end: usize) -> u8 {
    data[start..end].iter().fold(0u8, |acc, byte| acc ^ byte)
}

/// Calculate the LRC of `data[start..end]` as two uppercase hex characters
///
/// # Examples
///
/// ```
/// use hf2211_core::checksum;
///
/// let lrc = checksum::calculate(b"\x0200FFr", 1, 6);
/// assert_eq!(lrc, "72");
/// ```
pub fn calculate(data: &[u8], start: usize, end: usize) -> String {
    let lrc = fold(data, start, end);
    let rendered = format!("{:02X}", lrc);

    trace!(start, end, lrc = %rendered, "Calculated LRC");

    rendered
}

/// Compare a computed checksum with the one received on the wire
///
/// Case-sensitive: the indicator always sends uppercase digits.
pub fn verify(computed: &str, received: &str) -> bool {
    computed == received
}

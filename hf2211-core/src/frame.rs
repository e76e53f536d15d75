//! HF2211 reply frame view

use std::borrow::Cow;
use std::fmt;
use std::ops::Range;

use bytes::Bytes;

use crate::constants::{CRLF, ETX, STX, function, offsets};

/// Reply frame as received from the indicator
///
/// # Frame Structure
///
/// ```text
/// ┌─────┬─────────┬──────┬──────────┬───────────┬──────────┬─────────┬─────┬──────┬─────────┐
/// │ STX │ Address │  FF  │ Function │ Data addr │ Length   │ Payload │ LRC │ ETX  │ CR LF   │
/// │ 02  │ 2 ASCII │  2   │ 1 ASCII  │ 4 ASCII   │ 2 ASCII  │ N ASCII │  2  │ 03   │ 0D 0A   │
/// └─────┴─────────┴──────┴──────────┴───────────┴──────────┴─────────┴─────┴──────┴─────────┘
/// ```
///
/// The length field is only meaningful for variable-length replies (status);
/// acknowledgments put a one-digit result code at offset 12. The LRC is the
/// XOR of every byte between STX and the LRC itself.
///
/// Accessors never panic: fields past the end of a truncated reply come back
/// empty or `None`, and the classifier decides what that means.
#[derive(Clone, PartialEq, Eq)]
pub struct Reply {
    data: Bytes,
}

impl Reply {
    /// Wrap received bytes
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }

    /// Check if an accumulated buffer holds a whole reply
    ///
    /// A reply is complete once the end marker shows up after the start byte
    /// and the line terminator has arrived behind it. Every field before it
    /// is printable ASCII, so a stray 0x03 cannot occur.
    ///
    /// # Examples
    ///
    /// ```
    /// use hf2211_core::frame::Reply;
    ///
    /// assert!(!Reply::is_complete(b"\x0200FFr0107"));
    /// assert!(!Reply::is_complete(b"\x0200FFe1103000A5\x03"));
    /// assert!(Reply::is_complete(b"\x0200FFe1103000A5\x03\r\n"));
    /// ```
    pub fn is_complete(buf: &[u8]) -> bool {
        end_marker(buf).is_some_and(|at| buf[at + 1..].starts_with(&CRLF))
    }

    /// Check if the end marker arrived, line terminator or not
    ///
    /// Used when the peer closes: a reply cut short of its terminator is
    /// still classified.
    pub fn has_end_marker(buf: &[u8]) -> bool {
        end_marker(buf).is_some()
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Total reply size
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if nothing was received
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Check if the reply opens with STX
    pub fn has_start_marker(&self) -> bool {
        self.data.first() == Some(&STX)
    }

    /// Function code byte
    pub fn function_code(&self) -> Option<u8> {
        self.data.get(offsets::FUNCTION).copied()
    }

    /// Check the function code byte
    pub fn is_function(&self, code: u8) -> bool {
        self.function_code() == Some(code)
    }

    /// Data address field
    pub fn address(&self) -> Cow<'_, str> {
        self.field(offsets::ADDRESS)
    }

    /// Byte at `index`
    pub fn byte(&self, index: usize) -> Option<u8> {
        self.data.get(index).copied()
    }

    /// ASCII field, clamped to the received bytes
    pub fn field(&self, range: Range<usize>) -> Cow<'_, str> {
        let end = range.end.min(self.data.len());
        let start = range.start.min(end);
        String::from_utf8_lossy(&self.data[start..end])
    }

    /// Lowercase hex dump of the whole reply
    pub fn raw_hex(&self) -> String {
        hex::encode(&self.data)
    }
}

/// Index of the first end marker after the start byte
fn end_marker(buf: &[u8]) -> Option<usize> {
    buf.iter().skip(1).position(|&b| b == ETX).map(|i| i + 1)
}

/// Name of a reply function code for diagnostics
pub fn function_name(code: Option<u8>) -> &'static str {
    match code {
        Some(function::READ) => "read",
        Some(function::WRITE) => "write",
        Some(function::EXECUTE) => "execute",
        _ => "unknown",
    }
}

impl fmt::Debug for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reply")
            .field("function", &function_name(self.function_code()))
            .field("address", &self.address())
            .field("len", &self.data.len())
            .field("raw", &self.raw_hex())
            .finish()
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Reply[{}](address={}, len={})",
            function_name(self.function_code()),
            self.address(),
            self.data.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_reply_fields() {
        let reply = Reply::new(&b"\x0200FFr0107"[..]);
        assert!(reply.has_start_marker());
        assert_eq!(reply.function_code(), Some(b'r'));
        assert!(reply.is_function(function::READ));
        assert_eq!(reply.address(), "0107");
    }

    #[test]
    fn test_truncated_reply() {
        let reply = Reply::new(&b"\x0200F"[..]);
        assert_eq!(reply.function_code(), None);
        assert_eq!(reply.address(), "");
        assert_eq!(reply.field(3..30), "F");
        assert_eq!(reply.byte(12), None);
    }

    #[test]
    fn test_completion() {
        assert!(!Reply::is_complete(b""));
        assert!(!Reply::is_complete(b"\x03"));
        assert!(!Reply::is_complete(b"\x0200FFw0108"));
        assert!(Reply::is_complete(b"\x0200FFw0108007F\x03\r\n"));
    }

    #[test]
    fn test_completion_waits_for_line_terminator() {
        assert!(!Reply::is_complete(b"\x0200FFw0108007F\x03"));
        assert!(!Reply::is_complete(b"\x0200FFw0108007F\x03\r"));
        assert!(Reply::has_end_marker(b"\x0200FFw0108007F\x03"));
        assert!(!Reply::has_end_marker(b"\x0200FFw0108"));
        assert!(!Reply::has_end_marker(b"\x03\r\n"));
    }

    #[test]
    fn test_raw_hex_lowercase() {
        let reply = Reply::new(vec![0x02, 0xAB, 0x0D]);
        assert_eq!(reply.raw_hex(), "02ab0d");
    }

    #[test]
    fn test_function_names() {
        assert_eq!(function_name(Some(b'e')), "execute");
        assert_eq!(function_name(Some(b'w')), "write");
        assert_eq!(function_name(Some(b'x')), "unknown");
        assert_eq!(function_name(None), "unknown");
    }
}

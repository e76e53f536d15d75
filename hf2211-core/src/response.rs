//! Reply classification
//!
//! Turns the bytes received for one command into exactly one
//! [`TransactionResult`]. Checksum mismatches never reject a reply; they are
//! reported through `lrc_valid` next to the parsed values.

use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    checksum,
    command::Command,
    constants::{SHORT_REPLY_MIN_LEN, WEIGHT_REPLY_MIN_LEN, address, function, offsets},
    flags::{self, StatusFlags},
    frame::{Reply, function_name},
    status,
};

/// Failure taxonomy of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureKind {
    DeviceNotFound,
    NoDevicesConfigured,
    Validation,
    Connection,
    Timeout,
    IncompleteResponse,
    UnexpectedFunctionOrAddress,
    InvalidResponse,
}

/// Which preset tare operation was acknowledged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PresetKind {
    SetPreset,
    ClearPreset,
}

impl PresetKind {
    fn label(self) -> &'static str {
        match self {
            Self::SetPreset => "presetTare",
            Self::ClearPreset => "clearPreset",
        }
    }
}

/// Gross/tare reading
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightReading {
    /// Gross field as sent, tag letter included
    pub gross: String,
    /// Tare field as sent, tag letter included
    pub tare: String,
    pub gross_value: Option<f64>,
    pub tare_value: Option<f64>,
    /// Gross minus tare, `None` if either field is unreadable
    pub net: Option<f64>,
    pub flags: StatusFlags,
    pub lrc: String,
    pub lrc_valid: bool,
}

/// Status register reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReading {
    pub code: u32,
    pub description: &'static str,
    pub lrc: String,
    pub lrc_valid: bool,
}

/// Tare acknowledgment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TareOutcome {
    pub success: bool,
    pub message: String,
    pub lrc: String,
    pub lrc_valid: bool,
}

/// Preset tare acknowledgment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetOutcome {
    pub kind: PresetKind,
    pub success: bool,
    pub message: String,
    pub lrc: String,
    pub lrc_valid: bool,
}

/// Transaction failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Failure {
    pub kind: FailureKind,
    #[serde(rename = "error")]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_hex: Option<String>,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            raw_hex: None,
        }
    }

    pub fn with_raw(mut self, raw_hex: impl Into<String>) -> Self {
        self.raw_hex = Some(raw_hex.into());
        self
    }
}

/// Outcome of one command
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TransactionResult {
    Weight(WeightReading),
    Status(StatusReading),
    Tare(TareOutcome),
    Preset(PresetOutcome),
    Error(Failure),
}

impl TransactionResult {
    /// Shorthand for an error result
    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::Error(Failure::new(kind, message))
    }

    /// Check if this is an error result
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Failure details, if any
    pub fn as_failure(&self) -> Option<&Failure> {
        match self {
            Self::Error(failure) => Some(failure),
            _ => None,
        }
    }

    /// Checksum verdict of a parsed reply
    pub fn lrc_valid(&self) -> Option<bool> {
        match self {
            Self::Weight(w) => Some(w.lrc_valid),
            Self::Status(s) => Some(s.lrc_valid),
            Self::Tare(t) => Some(t.lrc_valid),
            Self::Preset(p) => Some(p.lrc_valid),
            Self::Error(_) => None,
        }
    }

    /// Result type tag
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Weight(_) => "weight",
            Self::Status(_) => "status",
            Self::Tare(_) => "tare",
            Self::Preset(_) => "preset",
            Self::Error(_) => "error",
        }
    }
}

/// Classifier output
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub result: TransactionResult,
    /// Command to write on the same connection before it closes
    pub follow_up: Option<Command>,
}

impl From<TransactionResult> for Classification {
    fn from(result: TransactionResult) -> Self {
        Self {
            result,
            follow_up: None,
        }
    }
}

/// Classify a complete reply to `sent`
pub fn classify(reply: &Reply, sent: &Command) -> Classification {
    let len = reply.len();
    let addr = reply.address();

    if len >= WEIGHT_REPLY_MIN_LEN && reply.is_function(function::READ) && addr == address::WEIGHT {
        return parse_weight(reply).into();
    }

    if len >= SHORT_REPLY_MIN_LEN && reply.is_function(function::READ) && addr == address::STATUS {
        return parse_status(reply).into();
    }

    if *sent == Command::Tare && len >= SHORT_REPLY_MIN_LEN {
        return parse_tare(reply);
    }

    if sent.is_preset() && len >= SHORT_REPLY_MIN_LEN && reply.is_function(function::WRITE) {
        let kind = match sent {
            Command::ClearPresetTare => PresetKind::ClearPreset,
            _ => PresetKind::SetPreset,
        };
        return parse_preset(reply, kind).into();
    }

    debug!(command = %sent, reply = %reply, "Reply matches no known layout");
    invalid(reply, "Invalid response").into()
}

fn invalid(reply: &Reply, message: &str) -> TransactionResult {
    TransactionResult::Error(
        Failure::new(FailureKind::InvalidResponse, message).with_raw(reply.raw_hex()),
    )
}

/// Checksum received at `lrc_at`, checked against the fold of `[1, end)`
fn check_lrc(reply: &Reply, end: usize, lrc_at: std::ops::Range<usize>, what: &str) -> (String, bool) {
    let computed = checksum::calculate(reply.as_bytes(), 1, end);
    let received = reply.field(lrc_at).into_owned();
    let valid = checksum::verify(&computed, &received);

    if valid {
        debug!(%computed, "{} LRC ok", what);
    } else {
        warn!(%computed, %received, "{} LRC mismatch", what);
    }

    (received, valid)
}

fn parse_weight(reply: &Reply) -> TransactionResult {
    let gross = reply.field(offsets::GROSS).into_owned();
    let tare = reply.field(offsets::TARE).into_owned();
    let gross_value = parse_tagged(&gross);
    let tare_value = parse_tagged(&tare);
    let net = match (gross_value, tare_value) {
        (Some(g), Some(t)) => Some(g - t),
        _ => None,
    };

    // leading character is a field tag, the hex digits follow
    let flags_field = reply.field(offsets::FLAGS);
    let flags_value = flags_field.get(1..).and_then(parse_hex_prefix).unwrap_or(0);

    let (lrc, lrc_valid) = check_lrc(reply, offsets::WEIGHT_LRC.start, offsets::WEIGHT_LRC, "Weight");

    TransactionResult::Weight(WeightReading {
        gross,
        tare,
        gross_value,
        tare_value,
        net,
        flags: flags::decode(flags_value),
        lrc,
        lrc_valid,
    })
}

fn parse_status(reply: &Reply) -> TransactionResult {
    let payload_len = match usize::from_str_radix(reply.field(offsets::LENGTH).trim(), 16) {
        Ok(n) => n,
        Err(_) => return incomplete_status(reply),
    };

    let payload_end = offsets::PAYLOAD + payload_len;
    if reply.len() < payload_end + 3 {
        return incomplete_status(reply);
    }

    let code = match u32::from_str_radix(reply.field(offsets::PAYLOAD..payload_end).trim(), 16) {
        Ok(code) => code,
        Err(_) => {
            return TransactionResult::Error(
                Failure::new(FailureKind::InvalidResponse, "Malformed status payload")
                    .with_raw(reply.raw_hex()),
            );
        }
    };

    let (lrc, lrc_valid) = check_lrc(reply, payload_end, payload_end..payload_end + 2, "Status");

    TransactionResult::Status(StatusReading {
        code,
        description: status::describe(code),
        lrc,
        lrc_valid,
    })
}

fn incomplete_status(reply: &Reply) -> TransactionResult {
    TransactionResult::Error(
        Failure::new(FailureKind::IncompleteResponse, "Incomplete status response")
            .with_raw(reply.raw_hex()),
    )
}

fn parse_tare(reply: &Reply) -> Classification {
    let addr = reply.address();

    if !(reply.is_function(function::EXECUTE) && addr == address::TARE) {
        let message = format!(
            "Unexpected response: function={}, address={}",
            function_name(reply.function_code()),
            addr
        );
        return TransactionResult::Error(
            Failure::new(FailureKind::UnexpectedFunctionOrAddress, message)
                .with_raw(reply.raw_hex()),
        )
        .into();
    }

    let code = reply.field(offsets::RESULT_CODE..offsets::RESULT_CODE + 1).into_owned();
    let (success, message) = match code.as_str() {
        "0" => (true, "tare executed successfully".to_string()),
        "1" => (false, "tare failed: Sealing switch locked".to_string()),
        other => (false, format!("tare failed: Error code {}", other)),
    };

    let (lrc, lrc_valid) = check_lrc(reply, offsets::RESULT_CODE + 1, offsets::ACK_LRC, "Tare");

    Classification {
        result: TransactionResult::Tare(TareOutcome {
            success,
            message,
            lrc,
            lrc_valid,
        }),
        // a fresh tare must not be stacked on a stored preset
        follow_up: success.then_some(Command::ClearPresetTare),
    }
}

fn parse_preset(reply: &Reply, kind: PresetKind) -> TransactionResult {
    let label = kind.label();
    let code = reply.field(offsets::RESULT_CODE..offsets::RESULT_CODE + 1).into_owned();
    let (success, message) = match code.as_str() {
        "0" => (
            true,
            match kind {
                PresetKind::ClearPreset => "Preset tare cleared successfully".to_string(),
                PresetKind::SetPreset => "Preset tare set successfully".to_string(),
            },
        ),
        "1" => (false, format!("{} failed: Sealing switch locked", label)),
        "5" => (false, format!("{} already set/clear or firmware quirk", label)),
        other => (false, format!("{} failed: Error code {}", label, other)),
    };

    let (lrc, lrc_valid) = check_lrc(reply, offsets::RESULT_CODE + 1, offsets::ACK_LRC, label);

    TransactionResult::Preset(PresetOutcome {
        kind,
        success,
        message,
        lrc,
        lrc_valid,
    })
}

/// Parse a weight field such as `"W   12.340"`
///
/// Strips the tag letter(s) and reads the longest leading decimal number,
/// so trailing unit text is tolerated.
fn parse_tagged(field: &str) -> Option<f64> {
    let body = field
        .trim()
        .trim_start_matches(|c: char| c.is_ascii_alphabetic())
        .trim_start();

    let bytes = body.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let digits_start = end;
    let mut seen_dot = false;
    while let Some(&b) = bytes.get(end) {
        match b {
            b'0'..=b'9' => end += 1,
            b'.' if !seen_dot => {
                seen_dot = true;
                end += 1;
            }
            _ => break,
        }
    }

    let number = &body[digits_start..end];
    if !number.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }

    body[..end].parse().ok()
}

/// Longest leading run of hex digits, leading whitespace skipped
fn parse_hex_prefix(field: &str) -> Option<u16> {
    let body = field.trim_start();
    let end = body
        .find(|c: char| !c.is_ascii_hexdigit())
        .unwrap_or(body.len());

    u16::from_str_radix(&body[..end], 16).ok()
}

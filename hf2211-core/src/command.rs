//! HF2211 command definitions and outbound frames

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

use crate::{
    constants::{CRLF, MAX_PRESET_TARE_KG},
    error::{Error, Result},
};

/// Read gross, tare and status flags (`R 0107`)
pub const READ_WEIGHT_FRAME: &[u8] = &[
    0x02, 0x30, 0x30, 0x46, 0x46, 0x52, 0x30, 0x31, 0x30, 0x37, 0x30, 0x30, 0x30, 0x30, 0x03, 0x0D,
    0x0A,
];

/// Execute tare (`E 1103`)
pub const TARE_FRAME: &[u8] = &[
    0x02, 0x30, 0x30, 0x46, 0x46, 0x45, 0x31, 0x31, 0x30, 0x33, 0x30, 0x30, 0x30, 0x30, 0x03, 0x0D,
    0x0A,
];

/// Read the error/status register (`R 0100`)
pub const READ_STATUS_FRAME: &[u8] = &[
    0x02, 0x30, 0x30, 0x46, 0x46, 0x52, 0x30, 0x31, 0x30, 0x30, 0x30, 0x30, 0x30, 0x30, 0x03, 0x0D,
    0x0A,
];

/// Write a zero preset tare (`W 0108`, length 08)
pub const CLEAR_PRESET_TARE_FRAME: &[u8] = &[
    0x02, 0x30, 0x30, 0x46, 0x46, 0x57, 0x30, 0x31, 0x30, 0x38, 0x30, 0x38, 0x30, 0x30, 0x30, 0x30,
    0x30, 0x30, 0x30, 0x30, 0x30, 0x30, 0x03, 0x0D, 0x0A,
];

/// Preset tare template: STX, address "00", "FF", function "W", address "0108", length "08",
/// spelled out as hex text the way the indicator's configuration tool sends it
const PRESET_TARE_PREFIX: &str = "023030464657303130383038";

/// Trailing end marker of the preset tare template, also as hex text
const PRESET_TARE_SUFFIX: &str = "03";

/// Validated preset tare weight, stored in grams
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PresetTare {
    grams: u32,
}

impl PresetTare {
    /// Validate a weight in kilograms and convert it to grams
    ///
    /// Accepts `0.0..=30.0`; NaN and anything outside the range is rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use hf2211_core::PresetTare;
    ///
    /// let preset = PresetTare::from_kg(1.25).unwrap();
    /// assert_eq!(preset.grams(), 1250);
    /// assert!(PresetTare::from_kg(30.1).is_err());
    /// ```
    pub fn from_kg(value_kg: f64) -> Result<Self> {
        if !(0.0..=MAX_PRESET_TARE_KG).contains(&value_kg) {
            return Err(Error::PresetOutOfRange {
                value: value_kg,
                max: MAX_PRESET_TARE_KG,
            });
        }

        Ok(Self {
            grams: (value_kg * 1000.0).round() as u32,
        })
    }

    /// Weight in grams
    pub fn grams(self) -> u32 {
        self.grams
    }

    /// Weight in kilograms
    pub fn kg(self) -> f64 {
        f64::from(self.grams) / 1000.0
    }

    /// Gram count as the 8-digit ASCII field of the frame
    pub fn field(self) -> String {
        format!("{:08}", self.grams)
    }
}

/// Commands understood by the indicator
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Command {
    /// Read gross, tare and flags
    ReadWeight,

    /// Tare the current load
    Tare,

    /// Read the error/status register
    ReadStatus,

    /// Reset the preset tare to zero
    ClearPresetTare,

    /// Store a preset tare
    SetPresetTare(PresetTare),
}

impl Command {
    /// Build a preset tare command from kilograms
    pub fn set_preset_tare(value_kg: f64) -> Result<Self> {
        PresetTare::from_kg(value_kg).map(Self::SetPresetTare)
    }

    /// Outbound frame for this command
    ///
    /// # Examples
    ///
    /// ```
    /// use hf2211_core::Command;
    ///
    /// let frame = Command::ReadWeight.frame();
    /// assert_eq!(frame.len(), 17);
    /// assert_eq!(&frame[6..10], b"0107");
    /// ```
    pub fn frame(&self) -> Bytes {
        match self {
            Self::ReadWeight => Bytes::from_static(READ_WEIGHT_FRAME),
            Self::Tare => Bytes::from_static(TARE_FRAME),
            Self::ReadStatus => Bytes::from_static(READ_STATUS_FRAME),
            Self::ClearPresetTare => Bytes::from_static(CLEAR_PRESET_TARE_FRAME),
            Self::SetPresetTare(preset) => encode_preset_tare(*preset).freeze(),
        }
    }

    /// Check if the indicator answers this command with a write acknowledgment
    pub fn is_preset(&self) -> bool {
        matches!(self, Self::ClearPresetTare | Self::SetPresetTare(_))
    }

    /// Get command name
    pub fn name(&self) -> &'static str {
        match self {
            Self::ReadWeight => "weight",
            Self::Tare => "tare",
            Self::ReadStatus => "status",
            Self::ClearPresetTare => "clearPreset",
            Self::SetPresetTare(_) => "presetTare",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetPresetTare(preset) => write!(f, "{}({}g)", self.name(), preset.grams()),
            _ => f.write_str(self.name()),
        }
    }
}

/// Encode a preset tare frame
///
/// The frame carries no checksum field, unlike the other write commands.
/// Kept exactly as the indicator's own tooling produces it.
pub fn encode_preset_tare(preset: PresetTare) -> BytesMut {
    let field = preset.field();
    let mut buf = BytesMut::with_capacity(
        PRESET_TARE_PREFIX.len() + field.len() + PRESET_TARE_SUFFIX.len() + CRLF.len(),
    );

    buf.put_slice(PRESET_TARE_PREFIX.as_bytes());
    buf.put_slice(field.as_bytes());
    buf.put_slice(PRESET_TARE_SUFFIX.as_bytes());
    buf.put_slice(&CRLF);

    buf
}

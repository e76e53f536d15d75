//! Status flags carried in the weight reply

use bitflags::bitflags;
use serde::{Serialize, Serializer};

bitflags! {
    /// Raw flag bits of the weight reply
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FlagBits: u16 {
        /// Weight at zero
        const ZERO = 0x001;
        /// Tare active
        const TARE = 0x002;
        /// Weight stable
        const STABLE = 0x004;
        /// Displaying net weight
        const NET = 0x008;
        /// Tare comes from a preset value
        const PRESET_MODE = 0x010;
        /// High resolution (x10) display
        const HIGH_RESOLUTION = 0x020;
        /// Initial zero captured at power up
        const INITIAL_ZERO = 0x040;
        /// Over capacity
        const OVERLOAD = 0x080;
        /// Weight below zero
        const NEGATIVE = 0x100;
        /// Weighing in the second range
        const RANGE_2 = 0x200;
        /// Preset tare stored
        const PRESET_TARE = 0x400;
    }
}

/// Origin of the active tare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TareMode {
    Normal,
    Preset,
}

/// Weighing range of a dual-range indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeighingRange {
    First,
    Second,
}

impl WeighingRange {
    /// Range number as shown on the indicator
    pub fn number(self) -> u8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
        }
    }
}

impl Serialize for WeighingRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.number())
    }
}

/// Decoded status flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusFlags {
    pub zero: bool,
    pub tare: bool,
    pub stable: bool,
    pub net: bool,
    pub tare_mode: TareMode,
    pub high_resolution: bool,
    pub initial_zero: bool,
    pub overload: bool,
    pub negative: bool,
    pub range: WeighingRange,
    pub preset_tare: bool,
}

impl From<FlagBits> for StatusFlags {
    fn from(bits: FlagBits) -> Self {
        Self {
            zero: bits.contains(FlagBits::ZERO),
            tare: bits.contains(FlagBits::TARE),
            stable: bits.contains(FlagBits::STABLE),
            net: bits.contains(FlagBits::NET),
            tare_mode: if bits.contains(FlagBits::PRESET_MODE) {
                TareMode::Preset
            } else {
                TareMode::Normal
            },
            high_resolution: bits.contains(FlagBits::HIGH_RESOLUTION),
            initial_zero: bits.contains(FlagBits::INITIAL_ZERO),
            overload: bits.contains(FlagBits::OVERLOAD),
            negative: bits.contains(FlagBits::NEGATIVE),
            range: if bits.contains(FlagBits::RANGE_2) {
                WeighingRange::Second
            } else {
                WeighingRange::First
            },
            preset_tare: bits.contains(FlagBits::PRESET_TARE),
        }
    }
}

/// Expand a flags value into named fields; unknown bits are ignored
pub fn decode(value: u16) -> StatusFlags {
    FlagBits::from_bits_truncate(value).into()
}

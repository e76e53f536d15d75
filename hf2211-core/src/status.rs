//! Error/status register codes

/// Human readable description of a status register value
pub fn describe(code: u32) -> &'static str {
    match code {
        0x00 => "No error",
        0x01 => "Error reading configuration from flash",
        0x02 => "A/D converter failure",
        0x03 => "Load cell signal out of range",
        0x04 => "Load cell signal > 30mV",
        0x05 => "Load cell signal < -30mV",
        0x06 => "Load cell power supply failure",
        0x07 => "Overload (> Max + 9e)",
        0x08 => "Negative weight (< -19e)",
        0x40 => "Calibration or mode warning (firmware-specific)",
        _ => "Unknown",
    }
}

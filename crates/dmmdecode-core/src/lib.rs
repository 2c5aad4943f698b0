//! dmmdecode core library: decode multimeter display frames into readings.
//!
//! A meter's display controller sends short binary status frames whose
//! bytes are XOR-obfuscated. This crate turns one frame (as hex text) into a
//! labelled reading in three stages, each depending only on the one before:
//!
//! - `codec`: XOR unmasking and per-byte bit reflection into a flat bit
//!   string (FrameCodec).
//! - `fields`: icon and seven-segment digit regions sliced out of the bit
//!   string and resolved against the profile tables (FieldExtractor).
//! - `interpret`: mode label, description and unit from the lit icons
//!   (ModeInterpreter).
//!
//! All stages are pure functions over an immutable [`DecoderConfig`], built
//! and validated once from a device profile. Acquiring frames from the meter
//! and writing readings out are left to callers (see the `dmmdecode` CLI).
//!
//! Invariants:
//! - Decoding the same frame with the same configuration always yields the
//!   same reading.
//! - Unknown digit patterns and non-numeric displays are readings, not
//!   errors; only malformed hex fails a frame.
//! - Mode ties resolve to the label listed first in the profile.
//!
//! # Examples
//! ```no_run
//! use dmmdecode_core::{Decoder, DecoderConfig};
//!
//! let json = std::fs::read_to_string("zt5b.json")?;
//! let decoder = Decoder::new(DecoderConfig::from_json_str(&json)?);
//! let reading = decoder.decode("1b847195453ad9fa668a")?;
//! println!("{} {} ({})", reading.value, reading.unit, reading.mode_label);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod codec;
pub mod config;
pub mod fields;
pub mod interpret;
pub mod trace;

mod decoder;
mod profile;

pub use codec::error::FrameError;
pub use config::{ConfigError, DecoderConfig, DigitTable, ModeLabel, ModeLabelMap, Regions};
pub use decoder::Decoder;
pub use fields::RegionSpec;
pub use fields::error::RegionError;
pub use interpret::{Interpretation, UNKNOWN_MODE_LABEL};
pub use profile::{
    DEFAULT_OUTPUT_FIELDS, DebugFlags, DeviceInfo, DeviceProfile, OutputConfig,
    OutputDestination, OutputFormat, OutputSection, RegionBounds,
};
pub use trace::{DecodeTrace, DigitWindow, digit_windows};

/// Value shown on the meter display: a number, or the raw display text when
/// it does not parse as one (`"0.L"` for overload, blanks while switching).
///
/// Serializes untagged, so JSON consumers see either a number or a string.
///
/// # Examples
/// ```
/// use dmmdecode_core::DisplayValue;
///
/// let value = DisplayValue::Number(-5.0);
/// assert_eq!(serde_json::to_string(&value).unwrap(), "-5.0");
/// let text = DisplayValue::Literal("0.L".to_string());
/// assert_eq!(serde_json::to_string(&text).unwrap(), "\"0.L\"");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DisplayValue {
    Number(f64),
    Literal(String),
}

impl DisplayValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            DisplayValue::Number(number) => Some(*number),
            DisplayValue::Literal(_) => None,
        }
    }
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayValue::Number(number) => write!(f, "{number}"),
            DisplayValue::Literal(text) => f.write_str(text),
        }
    }
}

/// Decoded frame before interpretation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDecodeResult {
    /// Lit icons in ascending bit order.
    pub active_icons: Vec<String>,
    /// Frame bytes after XOR unmasking, before bit reflection.
    pub decoded_bytes: Vec<u8>,
    pub value: DisplayValue,
    /// Segment region bits, unchanged.
    pub raw_segment_bits: String,
}

/// A fully interpreted reading.
///
/// # Examples
/// ```
/// use dmmdecode_core::{DisplayValue, InterpretedResult};
///
/// let reading = InterpretedResult {
///     active_icons: vec!["DC".to_string(), "V".to_string()],
///     decoded_bytes: vec![0x00],
///     value: DisplayValue::Number(1.5),
///     raw_segment_bits: String::new(),
///     mode_label: "DC Voltage".to_string(),
///     description: "DC Volts".to_string(),
///     unit: "V".to_string(),
/// };
/// let json = serde_json::to_value(&reading).unwrap();
/// assert_eq!(json["mode_label"], "DC Voltage");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpretedResult {
    pub active_icons: Vec<String>,
    pub decoded_bytes: Vec<u8>,
    pub value: DisplayValue,
    pub raw_segment_bits: String,
    /// Best matching mode, or `"unknown"`.
    pub mode_label: String,
    /// Possibly empty.
    pub description: String,
    /// Possibly empty.
    pub unit: String,
}

impl InterpretedResult {
    pub fn from_raw(raw: RawDecodeResult, interpretation: Interpretation) -> Self {
        Self {
            active_icons: raw.active_icons,
            decoded_bytes: raw.decoded_bytes,
            value: raw.value,
            raw_segment_bits: raw.raw_segment_bits,
            mode_label: interpretation.mode_label,
            description: interpretation.description,
            unit: interpretation.unit,
        }
    }
}

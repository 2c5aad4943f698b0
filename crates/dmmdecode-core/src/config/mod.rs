//! Decoder configuration.
//!
//! `DecoderConfig` is the validated, immutable form of a device profile. It
//! is built once (from a [`crate::DeviceProfile`] or directly) and then
//! shared read-only by every decode call; all checks happen at construction
//! so per-frame code never revalidates.

use std::collections::HashMap;
use std::ops::Range;

use serde::Serialize;
use tracing::debug;

pub mod error;

mod digits;
mod mode_map;

pub use digits::{DigitSymbol, DigitTable};
pub use error::ConfigError;
pub use mode_map::{ModeLabel, ModeLabelMap};

use crate::codec::parse_hex;
use crate::fields::error::RegionError;
use crate::fields::region::RegionSpec;
use crate::profile::DeviceProfile;

/// Decoder families a profile may name in its `decoder` key.
pub const SUPPORTED_DECODERS: &[&str] = &["ZT5BDecoder", "generic"];

/// Icon and segment regions of the frame bit string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Regions {
    pub icon: RegionSpec,
    pub segment: Range<usize>,
}

impl Regions {
    /// `icon` takes 2 or 4 bounds, `segment` exactly 2.
    pub fn from_bounds(icon: &[usize], segment: &[usize]) -> Result<Self, RegionError> {
        Ok(Self {
            icon: RegionSpec::from_bounds("icon", icon)?,
            segment: RegionSpec::span_from_bounds("segment", segment)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    xor_key: Vec<u8>,
    icon_table: Vec<String>,
    digit_table: DigitTable,
    regions: Regions,
    mode_label_map: ModeLabelMap,
    descriptions: HashMap<String, String>,
    units: HashMap<String, String>,
}

impl DecoderConfig {
    /// Build a configuration with empty digit, mode, description and unit
    /// tables; fill them with the `with_*` methods.
    pub fn new(
        xor_key: Vec<u8>,
        icon_table: Vec<String>,
        regions: Regions,
    ) -> Result<Self, ConfigError> {
        if xor_key.is_empty() {
            return Err(ConfigError::EmptyXorKey);
        }
        Ok(Self {
            xor_key,
            icon_table,
            digit_table: DigitTable::default(),
            regions,
            mode_label_map: ModeLabelMap::default(),
            descriptions: HashMap::new(),
            units: HashMap::new(),
        })
    }

    pub fn with_digit_table(mut self, digit_table: DigitTable) -> Self {
        self.digit_table = digit_table;
        self
    }

    pub fn with_mode_label_map(mut self, mode_label_map: ModeLabelMap) -> Self {
        self.mode_label_map = mode_label_map;
        self
    }

    pub fn with_descriptions<I, K, V>(mut self, descriptions: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.descriptions = collect_strings(descriptions);
        self
    }

    pub fn with_units<I, K, V>(mut self, units: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.units = collect_strings(units);
        self
    }

    /// Validate a device profile into a decoder configuration.
    pub fn from_profile(profile: &DeviceProfile) -> Result<Self, ConfigError> {
        if let Some(name) = profile.decoder.as_deref() {
            if !SUPPORTED_DECODERS.contains(&name) {
                return Err(ConfigError::UnsupportedDecoder {
                    name: name.to_string(),
                });
            }
        }

        let xor_key = parse_hex(&profile.xorkey).map_err(ConfigError::InvalidXorKey)?;
        let regions = Regions::from_bounds(&profile.regions.icon, &profile.regions.segment)?;
        let digit_table = DigitTable::new(
            profile
                .digit_table
                .iter()
                .map(|(pattern, symbol)| (pattern.clone(), symbol.as_str().to_string())),
        )?;

        let config = DecoderConfig::new(xor_key, profile.icon_table.clone(), regions)?
            .with_digit_table(digit_table)
            .with_mode_label_map(profile.mode_label_map.clone())
            .with_descriptions(profile.descriptions.clone())
            .with_units(profile.units.clone());
        debug!(
            key_len = config.xor_key.len(),
            icons = config.icon_table.len(),
            digits = config.digit_table.len(),
            modes = config.mode_label_map.len(),
            "decoder configuration loaded"
        );
        Ok(config)
    }

    /// Parse a JSON device profile and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let profile = DeviceProfile::from_json_str(json)?;
        Self::from_profile(&profile)
    }

    pub fn xor_key(&self) -> &[u8] {
        &self.xor_key
    }

    pub fn icon_table(&self) -> &[String] {
        &self.icon_table
    }

    pub fn digit_table(&self) -> &DigitTable {
        &self.digit_table
    }

    pub fn regions(&self) -> &Regions {
        &self.regions
    }

    pub fn mode_label_map(&self) -> &ModeLabelMap {
        &self.mode_label_map
    }

    pub fn description(&self, icon: &str) -> Option<&str> {
        self.descriptions.get(icon).map(String::as_str)
    }

    pub fn unit(&self, icon: &str) -> Option<&str> {
        self.units.get(icon).map(String::as_str)
    }
}

fn collect_strings<I, K, V>(entries: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    entries
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "xorkey": "41 21 73",
        "icon_table": ["A", "B"],
        "regions": {"icon": [6, 8], "segment": [8, 16]}
    }"#;

    #[test]
    fn from_json_str_fills_defaults() {
        let config = DecoderConfig::from_json_str(MINIMAL).unwrap();
        assert_eq!(config.xor_key(), &[0x41, 0x21, 0x73]);
        assert!(config.digit_table().is_empty());
        assert!(config.mode_label_map().is_empty());
        assert_eq!(config.description("A"), None);
        assert_eq!(config.regions().segment, 8..16);
    }

    #[test]
    fn missing_icon_table_is_a_config_error() {
        let json = r#"{"xorkey": "00", "regions": {"icon": [0, 2], "segment": [2, 10]}}"#;
        let err = DecoderConfig::from_json_str(json).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
        assert!(err.to_string().contains("icon_table"));
    }

    #[test]
    fn empty_xorkey_is_rejected() {
        let json = MINIMAL.replace("41 21 73", "");
        let err = DecoderConfig::from_json_str(&json).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyXorKey));
    }

    #[test]
    fn malformed_xorkey_is_rejected() {
        let json = MINIMAL.replace("41 21 73", "4g");
        let err = DecoderConfig::from_json_str(&json).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidXorKey(_)));
    }

    #[test]
    fn bad_region_arity_fails_at_load() {
        let json = MINIMAL.replace("[6, 8]", "[6, 8, 10]");
        let err = DecoderConfig::from_json_str(&json).unwrap_err();
        assert!(matches!(err, ConfigError::Region(_)));

        let json = MINIMAL.replace("[8, 16]", "[8, 16, 24, 32]");
        let err = DecoderConfig::from_json_str(&json).unwrap_err();
        assert!(err.to_string().contains("invalid segment region spec"));
    }

    #[test]
    fn unknown_decoder_is_rejected() {
        let json = MINIMAL.replacen('{', r#"{"decoder": "FooDecoder","#, 1);
        let err = DecoderConfig::from_json_str(&json).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedDecoder { .. }));
    }

    #[test]
    fn new_rejects_empty_key() {
        let regions = Regions::from_bounds(&[0, 1], &[1, 9]).unwrap();
        assert!(matches!(
            DecoderConfig::new(Vec::new(), Vec::new(), regions),
            Err(ConfigError::EmptyXorKey)
        ));
    }
}

//! Device profile document.
//!
//! A profile is the JSON file describing one meter model: informational
//! device metadata, the decoder tables, and optional output and debug
//! sections for the CLI. Unknown keys are ignored so profiles can carry
//! notes for other tools.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, DigitSymbol, ModeLabelMap};

/// Fields written to the output sink when a profile does not list any.
pub const DEFAULT_OUTPUT_FIELDS: &[&str] = &["timestamp", "mode", "value", "unit", "icons"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceProfile {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub chipset: Option<String>,
    /// Decoder family, checked against [`crate::config::SUPPORTED_DECODERS`].
    #[serde(default)]
    pub decoder: Option<String>,
    /// Notification characteristic the transport subscribes to.
    #[serde(default)]
    pub char_uuid: Option<String>,

    /// XOR key as hex text.
    pub xorkey: String,
    pub icon_table: Vec<String>,
    #[serde(default)]
    pub digit_table: BTreeMap<String, DigitSymbol>,
    pub regions: RegionBounds,
    #[serde(default)]
    pub mode_label_map: ModeLabelMap,
    #[serde(default)]
    pub descriptions: BTreeMap<String, String>,
    #[serde(default)]
    pub units: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputSection>,
    #[serde(default)]
    pub debug: DebugFlags,
}

/// Raw region bounds as written in the profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionBounds {
    pub icon: Vec<usize>,
    pub segment: Vec<usize>,
}

/// Diagnostic switches. All default to off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugFlags {
    pub packet: bool,
    pub icons: bool,
    pub segments: bool,
    pub device_info: bool,
    pub digit_windows: bool,
}

impl DebugFlags {
    pub fn any(&self) -> bool {
        self.packet || self.icons || self.segments || self.digit_windows
    }
}

/// Output section as written in the profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    pub destination: String,
    pub format: String,
    #[serde(default)]
    pub fields: Option<Vec<String>>,
    #[serde(default)]
    pub newline_flush: bool,
    #[serde(default)]
    pub output_file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputDestination {
    Stdout,
    /// Records are appended to this file.
    File(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One compact JSON object per line.
    Json,
    /// Indented JSON objects.
    JsonPretty,
    /// Header row once, then one row per reading.
    Csv,
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "json" => Ok(OutputFormat::Json),
            "json-pp" => Ok(OutputFormat::JsonPretty),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(ConfigError::UnsupportedOutput {
                reason: format!("format {other:?} (expected json, json-pp or csv)"),
            }),
        }
    }
}

/// Validated output settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    pub destination: OutputDestination,
    pub format: OutputFormat,
    pub fields: Vec<String>,
    pub newline_flush: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            destination: OutputDestination::Stdout,
            format: OutputFormat::Json,
            fields: DEFAULT_OUTPUT_FIELDS.iter().map(|f| f.to_string()).collect(),
            newline_flush: false,
        }
    }
}

impl OutputSection {
    pub fn validate(&self) -> Result<OutputConfig, ConfigError> {
        let format = self.format.parse::<OutputFormat>()?;
        let destination = match self.destination.as_str() {
            "stdout" => OutputDestination::Stdout,
            "file" => {
                let path = self.output_file.as_deref().filter(|p| !p.is_empty());
                let path = path.ok_or_else(|| ConfigError::UnsupportedOutput {
                    reason: "output_file must be set for file output".to_string(),
                })?;
                OutputDestination::File(PathBuf::from(path))
            }
            other => {
                return Err(ConfigError::UnsupportedOutput {
                    reason: format!("destination {other:?} (expected stdout or file)"),
                });
            }
        };
        let fields = self
            .fields
            .clone()
            .unwrap_or_else(|| OutputConfig::default().fields);
        Ok(OutputConfig {
            destination,
            format,
            fields,
            newline_flush: self.newline_flush,
        })
    }
}

/// Device metadata summary, as shown by `dmmdecode profile`.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceInfo {
    pub model: Option<String>,
    pub name: Option<String>,
    pub manufacturer: Option<String>,
    pub chipset: Option<String>,
    pub decoder: Option<String>,
    pub char_uuid: Option<String>,
    pub icon_count: usize,
    pub digit_patterns: usize,
    pub mode_labels: Vec<String>,
    pub debug: DebugFlags,
}

impl DeviceProfile {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            model: self.model.clone(),
            name: self.name.clone(),
            manufacturer: self.manufacturer.clone(),
            chipset: self.chipset.clone(),
            decoder: self.decoder.clone(),
            char_uuid: self.char_uuid.clone(),
            icon_count: self.icon_table.len(),
            digit_patterns: self.digit_table.len(),
            mode_labels: self
                .mode_label_map
                .iter()
                .map(|entry| entry.label.clone())
                .collect(),
            debug: self.debug,
        }
    }

    /// Output settings, defaulting to compact JSON on stdout.
    pub fn output_config(&self) -> Result<OutputConfig, ConfigError> {
        match &self.output {
            Some(section) => section.validate(),
            None => Ok(OutputConfig::default()),
        }
    }
}

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};

use anyhow::{Context, Result};
use dmmdecode_core::{InterpretedResult, OutputConfig, OutputDestination, OutputFormat};
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use serde_json::{Value, json};

/// One reading as handed to the sink.
pub struct ReadingRecord<'a> {
    pub timestamp: String,
    pub hex: &'a str,
    pub reading: &'a InterpretedResult,
}

impl ReadingRecord<'_> {
    /// Value of an output field; unknown names map to `null`.
    pub fn field(&self, name: &str) -> Value {
        let reading = self.reading;
        match name {
            "timestamp" => json!(self.timestamp),
            "mode" => json!(reading.mode_label),
            "value" => serde_json::to_value(&reading.value).unwrap_or(Value::Null),
            "unit" => json!(reading.unit),
            "icons" => json!(reading.active_icons),
            "description" => json!(reading.description),
            "hex" => json!(self.hex),
            "decoded_bytes" => json!(reading.decoded_bytes),
            "raw_segment_bits" => json!(reading.raw_segment_bits),
            _ => Value::Null,
        }
    }
}

/// Record restricted to the configured fields, in configured order.
struct Projection<'a> {
    fields: &'a [String],
    record: &'a ReadingRecord<'a>,
}

impl Serialize for Projection<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in self.fields {
            map.serialize_entry(field, &self.record.field(field))?;
        }
        map.end()
    }
}

pub struct OutputSink {
    config: OutputConfig,
    writer: Box<dyn Write>,
    header_written: bool,
    written: u64,
}

impl OutputSink {
    pub fn open(config: OutputConfig) -> Result<Self> {
        let writer: Box<dyn Write> = match &config.destination {
            OutputDestination::Stdout => Box::new(io::stdout()),
            OutputDestination::File(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        fs::create_dir_all(parent).with_context(|| {
                            format!("Failed to create output directory: {}", parent.display())
                        })?;
                    }
                }
                let file: File = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("Failed to open output file: {}", path.display()))?;
                Box::new(io::BufWriter::new(file))
            }
        };
        Ok(Self::with_writer(config, writer))
    }

    pub fn with_writer(config: OutputConfig, writer: Box<dyn Write>) -> Self {
        Self {
            config,
            writer,
            header_written: false,
            written: 0,
        }
    }

    pub fn write(&mut self, record: &ReadingRecord<'_>) -> Result<()> {
        let projection = Projection {
            fields: &self.config.fields,
            record,
        };
        match self.config.format {
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.writer, &projection)
                    .context("JSON serialization failed")?;
                self.writer.write_all(b"\n")?;
            }
            OutputFormat::JsonPretty => {
                serde_json::to_writer_pretty(&mut self.writer, &projection)
                    .context("JSON serialization failed")?;
                self.writer.write_all(b"\n")?;
            }
            OutputFormat::Csv => {
                if !self.header_written {
                    let header = csv_row(self.config.fields.iter().map(|f| f.to_string()));
                    self.writer.write_all(header.as_bytes())?;
                    self.header_written = true;
                }
                let row = csv_row(
                    self.config
                        .fields
                        .iter()
                        .map(|field| csv_cell(&record.field(field))),
                );
                self.writer.write_all(row.as_bytes())?;
            }
        }
        self.written += 1;
        if self.config.newline_flush {
            self.writer.flush().context("Failed to flush output")?;
        }
        Ok(())
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn finish(&mut self) -> Result<()> {
        self.writer.flush().context("Failed to flush output")
    }
}

fn csv_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(csv_cell)
            .collect::<Vec<_>>()
            .join("|"),
        other => other.to_string(),
    }
}

fn csv_row(cells: impl Iterator<Item = String>) -> String {
    let mut row = cells.map(|cell| csv_quote(&cell)).collect::<Vec<_>>().join(",");
    row.push_str("\r\n");
    row
}

fn csv_quote(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmmdecode_core::DisplayValue;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn reading(value: DisplayValue) -> InterpretedResult {
        InterpretedResult {
            active_icons: vec!["DC".to_string(), "V".to_string()],
            decoded_bytes: vec![0x00],
            value,
            raw_segment_bits: String::new(),
            mode_label: "DC Voltage".to_string(),
            description: "DC Volts".to_string(),
            unit: "V".to_string(),
        }
    }

    fn config(format: OutputFormat, fields: &[&str]) -> OutputConfig {
        OutputConfig {
            format,
            fields: fields.iter().map(|f| f.to_string()).collect(),
            ..OutputConfig::default()
        }
    }

    #[test]
    fn json_lines_keep_field_order() {
        let buffer = SharedBuffer::default();
        let mut sink = OutputSink::with_writer(
            config(OutputFormat::Json, &["value", "mode", "missing"]),
            Box::new(buffer.clone()),
        );
        let reading = reading(DisplayValue::Number(1.5));
        let record = ReadingRecord {
            timestamp: "1970-01-01T00:00:00Z".to_string(),
            hex: "00",
            reading: &reading,
        };
        sink.write(&record).unwrap();
        sink.finish().unwrap();
        assert_eq!(
            buffer.contents(),
            "{\"value\":1.5,\"mode\":\"DC Voltage\",\"missing\":null}\n"
        );
        assert_eq!(sink.written(), 1);
    }

    #[test]
    fn csv_writes_header_once_and_quotes() {
        let buffer = SharedBuffer::default();
        let mut sink = OutputSink::with_writer(
            config(OutputFormat::Csv, &["value", "icons", "description"]),
            Box::new(buffer.clone()),
        );
        let reading = reading(DisplayValue::Literal("0,L".to_string()));
        let record = ReadingRecord {
            timestamp: String::new(),
            hex: "00",
            reading: &reading,
        };
        sink.write(&record).unwrap();
        sink.write(&record).unwrap();
        let out = buffer.contents();
        let lines: Vec<_> = out.split("\r\n").collect();
        assert_eq!(lines[0], "value,icons,description");
        assert_eq!(lines[1], "\"0,L\",DC|V,DC Volts");
        assert_eq!(lines[2], lines[1]);
    }
}

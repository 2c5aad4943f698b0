//! Per-frame debug blocks and brief summaries, written to stderr.

use std::io::{self, Write};

use clap::ValueEnum;
use dmmdecode_core::{DebugFlags, DecodeTrace, DigitTable, InterpretedResult, digit_windows};
use serde::Serialize;
use serde_json::json;

use crate::frames::FrameLine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DebugKind {
    /// Hex input, decoded bytes and the full bit string
    Packet,
    /// Icon region bits, active indices and mode overlaps
    Icons,
    /// Segment bits and the per-digit breakdown
    Segments,
    /// Digit-table lookup at every offset of the segment bits
    Windows,
}

#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    packet: bool,
    icons: bool,
    segments: bool,
    windows: bool,
    brief: bool,
}

impl Diagnostics {
    /// Command-line kinds are added to whatever the profile already enables.
    pub fn new(kinds: &[DebugKind], profile: DebugFlags, brief: bool) -> Self {
        Self {
            packet: profile.packet || kinds.contains(&DebugKind::Packet),
            icons: profile.icons || kinds.contains(&DebugKind::Icons),
            segments: profile.segments || kinds.contains(&DebugKind::Segments),
            windows: profile.digit_windows || kinds.contains(&DebugKind::Windows),
            brief,
        }
    }

    pub fn needs_trace(&self) -> bool {
        self.packet || self.icons || self.segments || self.windows
    }

    pub fn report(
        &self,
        out: &mut impl Write,
        line: &FrameLine,
        reading: &InterpretedResult,
        trace: Option<&DecodeTrace>,
        digits: &DigitTable,
    ) -> io::Result<()> {
        if let Some(trace) = trace {
            if self.packet {
                write_block(
                    out,
                    "PACKET DEBUG",
                    &json!({
                        "origin": line.origin,
                        "hex": trace.hex,
                        "decoded_bytes": trace.decoded_bytes,
                        "bit_string": trace.bit_string,
                    }),
                )?;
            }
            if self.icons {
                write_block(
                    out,
                    "ICON DEBUG",
                    &json!({
                        "icon_region_bits": trace.icon_region_bits,
                        "active_indices": trace.active_indices,
                        "index_icon_table": trace.index_icon_table,
                        "active_icons": reading.active_icons,
                        "mode_overlaps": trace.mode_overlaps,
                        "mode_label": reading.mode_label,
                    }),
                )?;
            }
            if self.segments {
                write_block(
                    out,
                    "SEGMENT DEBUG",
                    &json!({
                        "segment_bits": trace.segment_bits,
                        "groups": trace.segment_groups,
                        "literal": trace.literal,
                        "value": reading.value,
                    }),
                )?;
            }
            if self.windows {
                writeln!(out, "[DIGIT WINDOWS]")?;
                for window in digit_windows(&trace.segment_bits, digits) {
                    writeln!(
                        out,
                        "Offset {}: {} = {}",
                        window.offset,
                        window.window,
                        window.symbol.as_deref().unwrap_or("?")
                    )?;
                }
            }
        }
        if self.brief {
            writeln!(out, "{}", brief_line(reading))?;
        }
        Ok(())
    }
}

fn write_block(out: &mut impl Write, title: &str, body: &impl Serialize) -> io::Result<()> {
    writeln!(out, "[{title}]")?;
    serde_json::to_writer_pretty(&mut *out, body)?;
    writeln!(out)
}

pub fn brief_line(reading: &InterpretedResult) -> String {
    format!(
        "[BRIEF] {} {} {} [{}]",
        reading.value,
        reading.mode_label,
        reading.unit,
        reading.active_icons.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmmdecode_core::{Decoder, DecoderConfig};

    const PROFILE: &str = r#"{
        "xorkey": "00",
        "icon_table": ["DC", "V"],
        "digit_table": {"1111101": 0, "0000101": 1},
        "regions": {"icon": [0, 2], "segment": [8, 24]},
        "mode_label_map": {"DC Voltage": ["DC", "V"]},
        "units": {"V": "V"}
    }"#;

    fn decode(hex: &str) -> (InterpretedResult, DecodeTrace, Decoder) {
        let decoder = Decoder::new(DecoderConfig::from_json_str(PROFILE).unwrap());
        let (reading, trace) = decoder.decode_traced(hex).unwrap();
        (reading, trace, decoder)
    }

    fn line(hex: &str) -> FrameLine {
        FrameLine {
            origin: "arg 1".to_string(),
            hex: hex.to_string(),
        }
    }

    #[test]
    fn profile_flags_enable_blocks() {
        let flags = DebugFlags {
            icons: true,
            ..DebugFlags::default()
        };
        let diagnostics = Diagnostics::new(&[], flags, false);
        assert!(diagnostics.needs_trace());
        assert!(!Diagnostics::new(&[], DebugFlags::default(), true).needs_trace());
    }

    #[test]
    fn icon_block_lists_active_icons() {
        let (reading, trace, decoder) = decode("03 BE A0");
        let diagnostics = Diagnostics::new(&[DebugKind::Icons], DebugFlags::default(), false);
        let mut out = Vec::new();
        diagnostics
            .report(
                &mut out,
                &line("03 BE A0"),
                &reading,
                Some(&trace),
                decoder.config().digit_table(),
            )
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("[ICON DEBUG]\n"));
        assert!(text.contains("\"DC Voltage\""));
    }

    #[test]
    fn windows_mark_unknown_offsets() {
        let (reading, trace, decoder) = decode("00 BE A0");
        let diagnostics = Diagnostics::new(&[DebugKind::Windows], DebugFlags::default(), false);
        let mut out = Vec::new();
        diagnostics
            .report(
                &mut out,
                &line("00 BE A0"),
                &reading,
                Some(&trace),
                decoder.config().digit_table(),
            )
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Offset 1: 1111101 = 0"));
        assert!(text.contains("= ?"));
    }

    #[test]
    fn brief_line_has_value_mode_and_unit() {
        let (reading, _, _) = decode("03 BE A0");
        let brief = brief_line(&reading);
        assert!(brief.starts_with("[BRIEF] "));
        assert!(brief.contains("DC Voltage V"));
    }
}

use std::collections::HashSet;

use tracing::debug;

use crate::codec::{DecodedFrame, decode_frame};
use crate::codec::error::FrameError;
use crate::config::DecoderConfig;
use crate::fields::{
    DigitGroup, active_icon_indices, assemble_literal, icon_region_bits, parse_display_value,
    read_digit_groups, segment_bits,
};
use crate::interpret::{interpret, mode_overlap};
use crate::trace::{DecodeTrace, IndexedIcon, ModeOverlap, SegmentGroupTrace};
use crate::{DisplayValue, InterpretedResult, RawDecodeResult};

/// Frame decoding pipeline: FrameCodec, then FieldExtractor, then
/// ModeInterpreter.
///
/// The decoder only reads its configuration, so one instance can be shared
/// across threads (for example behind an `Arc`) and called concurrently.
///
/// # Examples
/// ```
/// use dmmdecode_core::{Decoder, DecoderConfig, DisplayValue};
///
/// let config = DecoderConfig::from_json_str(r#"{
///     "xorkey": "00",
///     "icon_table": ["A", "B"],
///     "digit_table": {"0111110": 5},
///     "regions": {"icon": [6, 8], "segment": [8, 16]},
///     "mode_label_map": {"ModeX": ["A", "B"], "ModeY": ["A"]},
///     "descriptions": {"A": "Alpha", "B": "Beta"},
///     "units": {"A": "V"}
/// }"#)?;
/// let decoder = Decoder::new(config);
/// let reading = decoder.decode("c07d")?;
/// assert_eq!(reading.value, DisplayValue::Number(-5.0));
/// assert_eq!(reading.mode_label, "ModeX");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode one frame into an interpreted reading.
    pub fn decode(&self, hex: &str) -> Result<InterpretedResult, FrameError> {
        let raw = self.decode_raw(hex)?;
        Ok(self.interpret(raw))
    }

    /// Decode one frame without mode interpretation.
    pub fn decode_raw(&self, hex: &str) -> Result<RawDecodeResult, FrameError> {
        Ok(self.stages(hex)?.into_raw())
    }

    pub fn interpret(&self, raw: RawDecodeResult) -> InterpretedResult {
        let interpretation = interpret(&raw.active_icons, &self.config);
        InterpretedResult::from_raw(raw, interpretation)
    }

    /// Decode one frame and keep every intermediate stage.
    pub fn decode_traced(
        &self,
        hex: &str,
    ) -> Result<(InterpretedResult, DecodeTrace), FrameError> {
        let stages = self.stages(hex)?;

        let index_icon_table = stages
            .active_indices
            .iter()
            .zip(&stages.active_icons)
            .map(|(&index, icon)| IndexedIcon {
                index,
                icon: icon.clone(),
            })
            .collect();
        let active: HashSet<&str> = stages.active_icons.iter().map(String::as_str).collect();
        let mode_overlaps = self
            .config
            .mode_label_map()
            .iter()
            .map(|entry| ModeOverlap {
                label: entry.label.clone(),
                overlap: mode_overlap(&entry.icons, &active),
            })
            .collect();

        let trace = DecodeTrace {
            hex: hex.to_string(),
            decoded_bytes: stages.frame.decoded_bytes.clone(),
            bit_string: stages.frame.bits.clone(),
            icon_region_bits: stages.icon_region_bits.clone(),
            active_indices: stages.active_indices.clone(),
            index_icon_table,
            segment_bits: stages.segment_bits.clone(),
            segment_groups: stages.groups.iter().map(SegmentGroupTrace::from).collect(),
            literal: stages.literal.clone(),
            mode_overlaps,
        };
        Ok((self.interpret(stages.into_raw()), trace))
    }

    fn stages(&self, hex: &str) -> Result<Stages, FrameError> {
        let frame = decode_frame(hex, &self.config)?;
        let icon_region_bits = icon_region_bits(&frame.bits, &self.config).into_owned();
        let table = self.config.icon_table();
        let active_indices = active_icon_indices(&icon_region_bits, table.len());
        let active_icons = active_indices
            .iter()
            .map(|&index| table[index].clone())
            .collect();

        let segment_bits = segment_bits(&frame.bits, &self.config).to_string();
        let groups = read_digit_groups(&segment_bits, self.config.digit_table());
        let literal = assemble_literal(&groups);
        let value = parse_display_value(&literal);
        debug!(icons = ?active_icons, %value, "frame decoded");

        Ok(Stages {
            frame,
            icon_region_bits,
            active_indices,
            active_icons,
            segment_bits,
            groups,
            literal,
            value,
        })
    }
}

/// Products of each pipeline stage for one frame.
struct Stages {
    frame: DecodedFrame,
    icon_region_bits: String,
    active_indices: Vec<usize>,
    active_icons: Vec<String>,
    segment_bits: String,
    groups: Vec<DigitGroup>,
    literal: String,
    value: DisplayValue,
}

impl Stages {
    fn into_raw(self) -> RawDecodeResult {
        RawDecodeResult {
            active_icons: self.active_icons,
            decoded_bytes: self.frame.decoded_bytes,
            value: self.value,
            raw_segment_bits: self.segment_bits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Decoder;
    use crate::config::{DecoderConfig, DigitTable, ModeLabelMap, Regions};
    use crate::{DisplayValue, FrameError};
    use std::sync::Arc;

    fn worked_config() -> DecoderConfig {
        let regions = Regions::from_bounds(&[6, 8], &[8, 16]).unwrap();
        let modes: ModeLabelMap = [("ModeX", vec!["A", "B"]), ("ModeY", vec!["A"])]
            .into_iter()
            .collect();
        DecoderConfig::new(vec![0x00], vec!["A".into(), "B".into()], regions)
            .unwrap()
            .with_digit_table(DigitTable::new([("0111110", "5")]).unwrap())
            .with_mode_label_map(modes)
            .with_descriptions([("A", "Alpha"), ("B", "Beta")])
            .with_units([("A", "V")])
    }

    #[test]
    fn decode_matches_traced_decode() {
        let decoder = Decoder::new(worked_config());
        let plain = decoder.decode("c07d").unwrap();
        let (traced, trace) = decoder.decode_traced("c07d").unwrap();
        assert_eq!(plain, traced);
        assert_eq!(trace.bit_string, "0000001110111110");
        assert_eq!(trace.icon_region_bits, "11");
        assert_eq!(trace.active_indices, vec![0, 1]);
        assert_eq!(trace.literal, "-5");
        assert_eq!(trace.mode_overlaps[0].overlap, 2);
        assert_eq!(trace.mode_overlaps[1].overlap, 1);
        assert!(trace.segment_groups[0].marker);
        assert!(trace.segment_groups[0].matched);
    }

    #[test]
    fn raw_decode_matches_traced_stages() {
        let decoder = Decoder::new(worked_config());
        let raw = decoder.decode_raw("c07d").unwrap();
        let (reading, trace) = decoder.decode_traced("c07d").unwrap();
        assert_eq!(raw.active_icons, reading.active_icons);
        assert_eq!(raw.decoded_bytes, trace.decoded_bytes);
        assert_eq!(raw.raw_segment_bits, trace.segment_bits);
        assert_eq!(raw.value, reading.value);
        let indexed: Vec<_> = trace.index_icon_table.iter().map(|e| e.icon.clone()).collect();
        assert_eq!(indexed, raw.active_icons);
    }

    #[test]
    fn malformed_frame_is_reported() {
        let decoder = Decoder::new(worked_config());
        assert!(matches!(
            decoder.decode("c07"),
            Err(FrameError::OddLength { .. })
        ));
        assert!(decoder.decode_traced("zz").is_err());
    }

    #[test]
    fn bad_frame_does_not_affect_next_frame() {
        let decoder = Decoder::new(worked_config());
        assert!(decoder.decode("not hex").is_err());
        let reading = decoder.decode("c07d").unwrap();
        assert_eq!(reading.value, DisplayValue::Number(-5.0));
    }

    #[test]
    fn decoder_is_shareable_across_threads() {
        let decoder = Arc::new(Decoder::new(worked_config()));
        let expected = decoder.decode("c07d").unwrap();
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let decoder = Arc::clone(&decoder);
                    scope.spawn(move || decoder.decode("c07d").unwrap())
                })
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }
}

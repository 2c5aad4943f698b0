use dmmdecode_core::{
    DecodeTrace, Decoder, DecoderConfig, DigitTable, DisplayValue, FrameError, ModeLabelMap,
    Regions, UNKNOWN_MODE_LABEL,
};
use proptest::prelude::*;

fn worked_config() -> DecoderConfig {
    DecoderConfig::from_json_str(
        r#"{
            "xorkey": "00",
            "icon_table": ["A", "B"],
            "regions": {"icon": [6, 8], "segment": [8, 16]},
            "digit_table": {"0111110": 5},
            "mode_label_map": {"ModeX": ["A", "B"], "ModeY": ["A"]},
            "descriptions": {"A": "Alpha", "B": "Beta"},
            "units": {"A": "V"}
        }"#,
    )
    .expect("worked profile")
}

#[test]
fn worked_scenario_end_to_end() {
    let decoder = Decoder::new(worked_config());
    let reading = decoder.decode("c07d").expect("decode");
    assert_eq!(reading.active_icons, vec!["A", "B"]);
    assert_eq!(reading.decoded_bytes, vec![192, 125]);
    assert_eq!(reading.value, DisplayValue::Number(-5.0));
    assert_eq!(reading.raw_segment_bits, "10111110");
    assert_eq!(reading.mode_label, "ModeX");
    assert_eq!(reading.description, "Alpha Beta");
    assert_eq!(reading.unit, "V");
}

#[test]
fn raw_decode_leaves_interpretation_out() {
    let decoder = Decoder::new(worked_config());
    let raw = decoder.decode_raw("c07d").expect("decode");
    assert_eq!(raw.active_icons, vec!["A", "B"]);
    let reading = decoder.interpret(raw.clone());
    assert_eq!(reading.value, raw.value);
    assert_eq!(reading.mode_label, "ModeX");
}

#[test]
fn trace_exposes_every_stage() {
    let decoder = Decoder::new(worked_config());
    let (_, trace): (_, DecodeTrace) = decoder.decode_traced("C0 7D").expect("decode");
    assert_eq!(trace.hex, "C0 7D");
    assert_eq!(trace.decoded_bytes, vec![0xc0, 0x7d]);
    assert_eq!(trace.bit_string, "0000001110111110");
    assert_eq!(trace.segment_bits, "10111110");
    assert_eq!(trace.index_icon_table[1].icon, "B");
}

#[test]
fn malformed_frames_are_errors() {
    let decoder = Decoder::new(worked_config());
    assert_eq!(
        decoder.decode("c07").unwrap_err(),
        FrameError::OddLength { len: 3 }
    );
    assert!(matches!(
        decoder.decode("c0xd"),
        Err(FrameError::InvalidHexCharacter { ch: 'x', .. })
    ));
}

#[test]
fn unlit_display_is_unknown_mode_with_text_value() {
    let regions = Regions::from_bounds(&[0, 2], &[2, 18]).expect("regions");
    let config = DecoderConfig::new(vec![0x00], vec!["A".into(), "B".into()], regions)
        .expect("config")
        .with_digit_table(DigitTable::new([("0000000", " ")]).expect("digits"))
        .with_mode_label_map([("ModeX", vec!["A"])].into_iter().collect::<ModeLabelMap>());
    let reading = Decoder::new(config).decode("000000").expect("decode");
    assert_eq!(reading.value, DisplayValue::Literal("  ".to_string()));
    assert_eq!(reading.mode_label, UNKNOWN_MODE_LABEL);
    assert!(reading.description.is_empty());
    assert!(reading.unit.is_empty());
}

proptest! {
    #[test]
    fn decoding_is_deterministic(frame in proptest::collection::vec(any::<u8>(), 0..16)) {
        let decoder = Decoder::new(worked_config());
        let hex: String = frame.iter().map(|b| format!("{:02x}", b)).collect();
        let first = decoder.decode(&hex).expect("decode");
        let second = decoder.decode(&hex).expect("decode");
        prop_assert_eq!(first, second);
    }

    #[test]
    fn any_frame_decodes_without_error(frame in proptest::collection::vec(any::<u8>(), 0..16)) {
        let decoder = Decoder::new(worked_config());
        let hex: String = frame.iter().map(|b| format!("{:02X}", b)).collect();
        let reading = decoder.decode(&hex).expect("decode");
        prop_assert_eq!(reading.decoded_bytes, frame);
        prop_assert!(reading.active_icons.len() <= 2);
    }
}

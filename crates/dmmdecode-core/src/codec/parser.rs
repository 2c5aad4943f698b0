use tracing::trace;

use super::error::FrameError;
use super::layout;
use super::reader::HexReader;
use crate::config::DecoderConfig;

/// A frame with its obfuscation removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    /// Bytes after XOR masking, before bit reflection.
    pub decoded_bytes: Vec<u8>,
    /// Flat bit string: each byte rendered LSB first, in frame order.
    pub bits: String,
}

/// Decode a hex frame with the configured XOR key.
pub fn decode_frame(hex: &str, config: &DecoderConfig) -> Result<DecodedFrame, FrameError> {
    let encoded = parse_hex(hex)?;
    let decoded_bytes = xor_mask(&encoded, config.xor_key());
    let bits = render_bits(&decoded_bytes);
    trace!(bytes = decoded_bytes.len(), %bits, "frame unmasked");
    Ok(DecodedFrame {
        decoded_bytes,
        bits,
    })
}

pub fn parse_hex(hex: &str) -> Result<Vec<u8>, FrameError> {
    HexReader::new(hex).read_bytes()
}

/// Repeat `key` end to end and truncate it to exactly `len` bytes.
///
/// An empty key yields an empty mask.
pub fn tile_key(key: &[u8], len: usize) -> Vec<u8> {
    key.iter().copied().cycle().take(len).collect()
}

/// XOR `data` with the key tiled to its length. Applying it twice with the
/// same key returns the input. An empty key leaves the data unchanged.
pub fn xor_mask(data: &[u8], key: &[u8]) -> Vec<u8> {
    if key.is_empty() {
        return data.to_vec();
    }
    data.iter()
        .zip(tile_key(key, data.len()))
        .map(|(byte, mask)| byte ^ mask)
        .collect()
}

/// Render one byte as eight characters, most significant bit first.
pub fn render_byte(byte: u8) -> String {
    format!("{:0width$b}", byte, width = layout::BITS_PER_BYTE)
}

/// Reverse the character order of one rendered byte.
pub fn reflect_bits(bits: &str) -> String {
    bits.chars().rev().collect()
}

/// Render every byte bit-reflected and concatenate in frame order.
pub fn render_bits(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * layout::BITS_PER_BYTE);
    for byte in bytes {
        out.push_str(&render_byte(byte.reverse_bits()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DecoderConfig, Regions};
    use proptest::prelude::*;

    fn config_with_key(key: &[u8]) -> DecoderConfig {
        let regions = Regions::from_bounds(&[0, 0], &[0, 0]).unwrap();
        DecoderConfig::new(key.to_vec(), Vec::new(), regions).unwrap()
    }

    #[test]
    fn tile_key_repeats_and_truncates() {
        assert_eq!(tile_key(&[1, 2, 3], 7), vec![1, 2, 3, 1, 2, 3, 1]);
        assert_eq!(tile_key(&[1, 2, 3], 2), vec![1, 2]);
        assert!(tile_key(&[], 4).is_empty());
    }

    #[test]
    fn render_bits_reflects_each_byte_independently() {
        assert_eq!(render_bits(&[0xc0, 0x7d]), "0000001110111110");
    }

    #[test]
    fn decode_frame_applies_key_cyclically() {
        let config = config_with_key(&[0xff, 0x00]);
        let frame = decode_frame("ff00ff01", &config).unwrap();
        assert_eq!(frame.decoded_bytes, vec![0x00, 0x00, 0x00, 0x01]);
        assert_eq!(frame.bits.len(), 32);
        assert_eq!(&frame.bits[24..], "10000000");
    }

    #[test]
    fn decode_frame_rejects_malformed_hex() {
        let config = config_with_key(&[0x00]);
        assert!(matches!(
            decode_frame("abc", &config),
            Err(FrameError::OddLength { len: 3 })
        ));
        assert!(matches!(
            decode_frame("g0", &config),
            Err(FrameError::InvalidHexCharacter { .. })
        ));
    }

    proptest! {
        #[test]
        fn xor_mask_is_an_involution(
            data in proptest::collection::vec(any::<u8>(), 0..64),
            key in proptest::collection::vec(any::<u8>(), 1..16),
        ) {
            let masked = xor_mask(&data, &key);
            prop_assert_eq!(masked.len(), data.len());
            prop_assert_eq!(xor_mask(&masked, &key), data);
        }

        #[test]
        fn reflect_bits_is_an_involution(byte: u8) {
            let rendered = render_byte(byte);
            prop_assert_eq!(reflect_bits(&reflect_bits(&rendered)), rendered.clone());
            prop_assert_eq!(render_bits(&[byte]), reflect_bits(&rendered));
        }
    }
}

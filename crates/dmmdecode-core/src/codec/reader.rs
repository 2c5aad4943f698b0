use std::borrow::Cow;

use super::error::FrameError;
use super::layout;

/// Hex text access with the meter's frame conventions (optional spaces
/// between byte pairs, either letter case).
pub struct HexReader<'a> {
    text: &'a str,
}

impl<'a> HexReader<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }

    pub fn compact(&self) -> Cow<'a, str> {
        if self.text.contains(layout::HEX_SEPARATOR) {
            Cow::Owned(
                self.text
                    .chars()
                    .filter(|ch| *ch != layout::HEX_SEPARATOR)
                    .collect(),
            )
        } else {
            Cow::Borrowed(self.text)
        }
    }

    pub fn byte_len(&self) -> Result<usize, FrameError> {
        let len = self.compact().len();
        if len % layout::HEX_DIGITS_PER_BYTE != 0 {
            return Err(FrameError::OddLength { len });
        }
        Ok(len / layout::HEX_DIGITS_PER_BYTE)
    }

    /// First character that is neither a hex digit nor a separator, with its
    /// character offset in the text as given.
    pub fn find_invalid(&self) -> Option<(usize, char)> {
        self.text
            .chars()
            .enumerate()
            .find(|(_, ch)| *ch != layout::HEX_SEPARATOR && !ch.is_ascii_hexdigit())
    }

    pub fn read_bytes(&self) -> Result<Vec<u8>, FrameError> {
        if let Some((index, ch)) = self.find_invalid() {
            return Err(FrameError::InvalidHexCharacter { ch, index });
        }
        let compact = self.compact();
        self.byte_len()?;
        hex::decode(compact.as_ref()).map_err(|err| FrameError::from_hex(err, compact.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::HexReader;
    use crate::codec::error::FrameError;

    #[test]
    fn read_bytes_accepts_mixed_case_and_spaces() {
        let reader = HexReader::new("C0 7d");
        assert_eq!(reader.read_bytes().unwrap(), vec![0xc0, 0x7d]);
        assert_eq!(reader.byte_len().unwrap(), 2);
    }

    #[test]
    fn read_bytes_rejects_odd_length() {
        let err = HexReader::new("c07").read_bytes().unwrap_err();
        assert_eq!(err, FrameError::OddLength { len: 3 });
    }

    #[test]
    fn read_bytes_rejects_non_hex() {
        let err = HexReader::new("c0zz").read_bytes().unwrap_err();
        assert!(matches!(err, FrameError::InvalidHexCharacter { ch: 'z', index: 2 }));
    }

    #[test]
    fn invalid_character_offset_counts_separators() {
        let err = HexReader::new("c0 zz").read_bytes().unwrap_err();
        assert_eq!(err, FrameError::InvalidHexCharacter { ch: 'z', index: 3 });
    }

    #[test]
    fn non_ascii_text_is_malformed() {
        let err = HexReader::new("c0\u{fffd}7d").read_bytes().unwrap_err();
        assert_eq!(
            err,
            FrameError::InvalidHexCharacter {
                ch: '\u{fffd}',
                index: 2
            }
        );
    }

    #[test]
    fn empty_text_is_an_empty_frame() {
        assert!(HexReader::new("").read_bytes().unwrap().is_empty());
    }
}

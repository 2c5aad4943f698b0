use thiserror::Error;

/// Errors returned while turning a hex frame into bytes.
///
/// Every variant is a malformed frame, one per cause; the caller should log
/// it and move on to the next frame. `index` in `InvalidHexCharacter` is the
/// character offset in the frame text as given, separators included.
///
/// # Examples
/// ```
/// use dmmdecode_core::FrameError;
///
/// let err = FrameError::OddLength { len: 3 };
/// assert!(err.to_string().contains("malformed frame"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("malformed frame: odd number of hex digits ({len})")]
    OddLength { len: usize },
    #[error("malformed frame: invalid hex character {ch:?} at offset {index}")]
    InvalidHexCharacter { ch: char, index: usize },
}

impl FrameError {
    pub(crate) fn from_hex(err: hex::FromHexError, len: usize) -> Self {
        match err {
            hex::FromHexError::InvalidHexCharacter { c, index } => {
                FrameError::InvalidHexCharacter { ch: c, index }
            }
            hex::FromHexError::OddLength | hex::FromHexError::InvalidStringLength => {
                FrameError::OddLength { len }
            }
        }
    }
}

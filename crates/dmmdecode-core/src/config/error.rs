use thiserror::Error;

use crate::codec::error::FrameError;
use crate::fields::error::RegionError;

/// Errors raised while building a [`crate::DecoderConfig`].
///
/// All of them are fatal for a run: no frame can be decoded with a broken
/// configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid profile: {0}")]
    Json(#[from] serde_json::Error),
    #[error("xorkey must contain at least one byte")]
    EmptyXorKey,
    #[error("invalid xorkey: {0}")]
    InvalidXorKey(FrameError),
    #[error(transparent)]
    Region(#[from] RegionError),
    #[error("invalid digit pattern {pattern:?}: expected 7 characters of '0'/'1'")]
    InvalidDigitPattern { pattern: String },
    #[error("unsupported decoder {name:?}")]
    UnsupportedDecoder { name: String },
    #[error("unsupported output configuration: {reason}")]
    UnsupportedOutput { reason: String },
}

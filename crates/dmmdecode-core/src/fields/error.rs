use thiserror::Error;

/// Region layout errors. These are configuration errors: every frame would
/// fail the same way, so they are reported once when the configuration is
/// built.
///
/// `InvalidRegionSpec` covers a bound count other than 2 (or 4 for the icon
/// region) and a range whose start is past its end. A reversed range would
/// only ever read an empty slice, so it is rejected as a profile mistake.
///
/// # Examples
/// ```
/// use dmmdecode_core::RegionError;
///
/// let err = RegionError::InvalidRegionSpec {
///     region: "segment",
///     reason: "expected 2 bounds, got 4".to_string(),
/// };
/// assert!(err.to_string().contains("invalid segment region"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegionError {
    #[error("invalid {region} region spec: {reason}")]
    InvalidRegionSpec {
        region: &'static str,
        reason: String,
    },
}

use std::ops::Range;

use serde::{Serialize, Serializer};

use super::error::RegionError;
use super::layout;

/// Bit range(s) of the flat frame bit string, `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionSpec {
    /// One contiguous range.
    Span(Range<usize>),
    /// Two disjoint ranges read back to back.
    Split(Range<usize>, Range<usize>),
}

impl RegionSpec {
    /// Build a region from its configured bounds: `[s, e]` or
    /// `[s1, e1, s2, e2]`. Any other arity, or a range whose start lies past
    /// its end, is rejected.
    pub fn from_bounds(region: &'static str, bounds: &[usize]) -> Result<Self, RegionError> {
        match *bounds {
            [start, end] => Ok(RegionSpec::Span(checked_range(region, start, end)?)),
            [s1, e1, s2, e2] => Ok(RegionSpec::Split(
                checked_range(region, s1, e1)?,
                checked_range(region, s2, e2)?,
            )),
            _ => Err(RegionError::InvalidRegionSpec {
                region,
                reason: format!(
                    "expected {} or {} bounds, got {}",
                    layout::SPAN_BOUNDS,
                    layout::SPLIT_BOUNDS,
                    bounds.len()
                ),
            }),
        }
    }

    /// Like [`RegionSpec::from_bounds`] but only the contiguous form is
    /// accepted.
    pub fn span_from_bounds(
        region: &'static str,
        bounds: &[usize],
    ) -> Result<Range<usize>, RegionError> {
        if bounds.len() != layout::SPAN_BOUNDS {
            return Err(RegionError::InvalidRegionSpec {
                region,
                reason: format!(
                    "expected {} bounds, got {}",
                    layout::SPAN_BOUNDS,
                    bounds.len()
                ),
            });
        }
        checked_range(region, bounds[0], bounds[1])
    }

    /// Total number of bits the region covers.
    pub fn bit_len(&self) -> usize {
        match self {
            RegionSpec::Span(range) => range.len(),
            RegionSpec::Split(first, second) => first.len() + second.len(),
        }
    }

    pub fn bounds(&self) -> Vec<usize> {
        match self {
            RegionSpec::Span(range) => vec![range.start, range.end],
            RegionSpec::Split(first, second) => {
                vec![first.start, first.end, second.start, second.end]
            }
        }
    }
}

impl Serialize for RegionSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.bounds().serialize(serializer)
    }
}

fn checked_range(
    region: &'static str,
    start: usize,
    end: usize,
) -> Result<Range<usize>, RegionError> {
    if start > end {
        return Err(RegionError::InvalidRegionSpec {
            region,
            reason: format!("start {start} is past end {end}"),
        });
    }
    Ok(start..end)
}

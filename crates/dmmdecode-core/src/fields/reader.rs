use std::borrow::Cow;
use std::ops::Range;

use super::layout;
use super::region::RegionSpec;

/// Bounded access to a frame bit string.
///
/// Ranges past the end of the frame are clamped, so a region longer than a
/// short frame reads the bits that exist rather than failing. Text that is
/// not ASCII cannot be a bit string and reads as empty.
pub struct BitReader<'a> {
    bits: &'a str,
}

impl<'a> BitReader<'a> {
    pub fn new(bits: &'a str) -> Self {
        let bits = if bits.is_ascii() { bits } else { "" };
        Self { bits }
    }

    pub fn read_slice(&self, range: Range<usize>) -> &'a str {
        let end = range.end.min(self.bits.len());
        let start = range.start.min(end);
        self.bits.get(start..end).unwrap_or_default()
    }

    pub fn read_region(&self, region: &RegionSpec) -> Cow<'a, str> {
        match region {
            RegionSpec::Span(range) => Cow::Borrowed(self.read_slice(range.clone())),
            RegionSpec::Split(first, second) => {
                let mut joined = String::with_capacity(region.bit_len());
                joined.push_str(self.read_slice(first.clone()));
                joined.push_str(self.read_slice(second.clone()));
                Cow::Owned(joined)
            }
        }
    }

    /// Indices of set bits, in ascending order.
    pub fn set_indices(&self) -> impl Iterator<Item = usize> + 'a {
        self.bits
            .char_indices()
            .filter(|(_, bit)| *bit == layout::BIT_SET)
            .map(|(index, _)| index)
    }

    /// Every `width`-bit window with its starting offset.
    pub fn windows(&self, width: usize) -> impl Iterator<Item = (usize, &'a str)> + 'a {
        let bits = self.bits;
        let count = if width == 0 {
            0
        } else {
            (bits.len() + 1).saturating_sub(width)
        };
        (0..count).map(move |offset| (offset, &bits[offset..offset + width]))
    }

    /// Consecutive full digit groups; a trailing short group is dropped.
    pub fn digit_groups(&self) -> impl Iterator<Item = &'a str> + 'a {
        let bits = self.bits;
        (0..bits.len() / layout::DIGIT_GROUP_BITS).map(move |group| {
            let start = group * layout::DIGIT_GROUP_BITS;
            &bits[start..start + layout::DIGIT_GROUP_BITS]
        })
    }
}

//! Pipeline intermediates for diagnostic tooling.
//!
//! [`crate::Decoder::decode_traced`] fills a [`DecodeTrace`] from the same
//! functions the normal decode path uses, so debug output never re-derives
//! anything on its own.

use serde::Serialize;

use crate::config::DigitTable;
use crate::fields::DigitGroup;
use crate::fields::layout;
use crate::fields::reader::BitReader;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodeTrace {
    /// Frame as received.
    pub hex: String,
    pub decoded_bytes: Vec<u8>,
    /// Flat bit string after per-byte reflection.
    pub bit_string: String,
    pub icon_region_bits: String,
    pub active_indices: Vec<usize>,
    pub index_icon_table: Vec<IndexedIcon>,
    pub segment_bits: String,
    pub segment_groups: Vec<SegmentGroupTrace>,
    /// Text assembled from the digit groups before numeric parsing.
    pub literal: String,
    pub mode_overlaps: Vec<ModeOverlap>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexedIcon {
    pub index: usize,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentGroupTrace {
    pub index: usize,
    pub marker: bool,
    pub pattern: String,
    pub symbol: String,
    pub matched: bool,
}

impl From<&DigitGroup> for SegmentGroupTrace {
    fn from(group: &DigitGroup) -> Self {
        Self {
            index: group.index,
            marker: group.marker,
            pattern: group.pattern.clone(),
            symbol: group.symbol_or_blank().to_string(),
            matched: group.symbol.is_some(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModeOverlap {
    pub label: String,
    pub overlap: usize,
}

/// Digit-table lookup at one bit offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DigitWindow {
    pub offset: usize,
    pub window: String,
    pub symbol: Option<String>,
}

/// Slide a 7-bit window over `bits` and look every position up in the digit
/// table. Used to find where digits sit when mapping a new meter.
pub fn digit_windows(bits: &str, table: &DigitTable) -> Vec<DigitWindow> {
    BitReader::new(bits)
        .windows(layout::DIGIT_PATTERN_BITS)
        .map(|(offset, window)| DigitWindow {
            offset,
            window: window.to_string(),
            symbol: table.lookup(window).map(str::to_string),
        })
        .collect()
}

/// Bits per display digit group (marker bit + segment pattern).
pub const DIGIT_GROUP_BITS: usize = 8;
/// Bits in a seven-segment pattern key.
pub const DIGIT_PATTERN_BITS: usize = 7;
pub const MARKER_BIT_OFFSET: usize = 0;
pub const PATTERN_RANGE: std::ops::Range<usize> = 1..DIGIT_GROUP_BITS;

pub const SPAN_BOUNDS: usize = 2;
pub const SPLIT_BOUNDS: usize = 4;

pub const BIT_SET: char = '1';
pub const MINUS_SIGN: char = '-';
pub const DECIMAL_POINT: char = '.';
/// Symbol assembled for a segment pattern missing from the digit table.
pub const UNKNOWN_SYMBOL: &str = " ";

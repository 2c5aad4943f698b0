pub const BITS_PER_BYTE: usize = 8;
pub const HEX_DIGITS_PER_BYTE: usize = 2;

/// Separator tolerated inside hex strings (`"1b 84 71"`).
pub const HEX_SEPARATOR: char = ' ';

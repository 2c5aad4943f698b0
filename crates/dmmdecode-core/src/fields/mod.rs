//! FieldExtractor: slice the frame bit string into icon and digit regions.
//!
//! The icon region is one range or two ranges joined back to back; bit `i`
//! of it lights `icon_table[i]`. The segment region is read in 8-bit groups:
//! a marker bit (minus sign on the first group, decimal point before any
//! later one) followed by a 7-bit pattern looked up in the digit table. The
//! assembled text becomes a number when it parses as one and stays text
//! otherwise (`"0.L"`, blanks). Neither an unknown pattern nor an
//! unparseable literal is an error.

pub mod error;
pub mod icons;
pub mod layout;
pub mod reader;
pub mod region;
pub mod segments;

pub use icons::{active_icon_indices, extract_icons, icon_region_bits};
pub use region::RegionSpec;
pub use segments::{
    DigitGroup, assemble_literal, extract_segment_value, parse_display_value, read_digit_groups,
    segment_bits,
};

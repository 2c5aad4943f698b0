use super::layout;
use super::reader::BitReader;
use crate::DisplayValue;
use crate::config::{DecoderConfig, DigitTable};

/// One 8-bit digit group of the segment region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigitGroup {
    pub index: usize,
    /// Minus sign on the first group, decimal point before later ones.
    pub marker: bool,
    pub pattern: String,
    /// Table symbol, `None` when the pattern is unknown.
    pub symbol: Option<String>,
}

impl DigitGroup {
    pub fn symbol_or_blank(&self) -> &str {
        self.symbol.as_deref().unwrap_or(layout::UNKNOWN_SYMBOL)
    }
}

pub fn segment_bits<'a>(bits: &'a str, config: &DecoderConfig) -> &'a str {
    BitReader::new(bits).read_slice(config.regions().segment.clone())
}

pub fn read_digit_groups(segment_bits: &str, table: &DigitTable) -> Vec<DigitGroup> {
    BitReader::new(segment_bits)
        .digit_groups()
        .enumerate()
        .map(|(index, group)| {
            let marker = group[layout::MARKER_BIT_OFFSET..].starts_with(layout::BIT_SET);
            let pattern = &group[layout::PATTERN_RANGE];
            DigitGroup {
                index,
                marker,
                pattern: pattern.to_string(),
                symbol: table.lookup(pattern).map(str::to_string),
            }
        })
        .collect()
}

pub fn assemble_literal(groups: &[DigitGroup]) -> String {
    let mut literal = String::new();
    for group in groups {
        if group.marker {
            literal.push(if group.index == 0 {
                layout::MINUS_SIGN
            } else {
                layout::DECIMAL_POINT
            });
        }
        literal.push_str(group.symbol_or_blank());
    }
    literal
}

/// Parse an assembled literal, keeping the text when it is not a number.
///
/// Surrounding blanks (unlit leading digits) are ignored for the numeric
/// parse. Non-finite results stay literal.
pub fn parse_display_value(literal: &str) -> DisplayValue {
    match literal.trim().parse::<f64>() {
        Ok(number) if number.is_finite() => DisplayValue::Number(number),
        _ => DisplayValue::Literal(literal.to_string()),
    }
}

/// Decode the display value and return it with the raw segment bits.
pub fn extract_segment_value(bits: &str, config: &DecoderConfig) -> (DisplayValue, String) {
    let raw = segment_bits(bits, config);
    let groups = read_digit_groups(raw, config.digit_table());
    let literal = assemble_literal(&groups);
    (parse_display_value(&literal), raw.to_string())
}

use std::borrow::Cow;

use super::reader::BitReader;
use crate::config::DecoderConfig;

/// Bits of the icon region, split ranges already joined.
pub fn icon_region_bits<'a>(bits: &'a str, config: &DecoderConfig) -> Cow<'a, str> {
    BitReader::new(bits).read_region(&config.regions().icon)
}

/// Set-bit indices that name an icon. Bits past the end of the icon table
/// are ignored; tables may be shorter than the physical region.
pub fn active_icon_indices(icon_bits: &str, table_len: usize) -> Vec<usize> {
    BitReader::new(icon_bits)
        .set_indices()
        .filter(|index| *index < table_len)
        .collect()
}

/// Names of the lit icons, in ascending bit order.
pub fn extract_icons(bits: &str, config: &DecoderConfig) -> Vec<String> {
    let icon_bits = icon_region_bits(bits, config);
    let table = config.icon_table();
    active_icon_indices(&icon_bits, table.len())
        .into_iter()
        .map(|index| table[index].clone())
        .collect()
}

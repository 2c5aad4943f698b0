//! FrameCodec: undo the meter's byte obfuscation.
//!
//! A frame arrives as hex text. The codec decodes it to bytes, XORs them with
//! the configured key tiled to the frame length, then renders every byte as
//! eight bits in reversed (LSB first) order and concatenates the result. Both
//! the masking and the per-byte reflection are involutions.
//!
//! Hex conventions live in `reader`, constants in `layout`, and the pure
//! transforms in `parser`.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use parser::{
    DecodedFrame, decode_frame, parse_hex, reflect_bits, render_bits, render_byte, tile_key,
    xor_mask,
};

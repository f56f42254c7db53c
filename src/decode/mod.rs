//! Decoding of packed 32-bit float heightfields stored in RGBA images.
//!
//! Each pixel carries the four bytes of one IEEE-754 `f32` spread over its
//! channels. See [`ByteOrder`] for the channel-to-byte mapping.

mod packed;

pub use packed::{
    decode_packed, decode_packed_normalized, encode_packed, load_packed,
    ByteOrder, DecodeError,
};

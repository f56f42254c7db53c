//! Packed-float channel codec.

use std::path::{Path, PathBuf};

use image::{Rgba, Rgba32FImage, RgbaImage};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::terrain::Grid;

/// Errors that can occur while reading packed heightfields.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Failed to load heightfield image '{}': {source}", path.display())]
    MissingResource {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Grid {nx}x{ny} does not fit in an image")]
    Dimensions { nx: usize, ny: usize },
}

/// Order in which the `a, r, g, b` channels hold the bytes of the float.
///
/// * `LittleEndian`: `a` is the least significant byte, then `r`, `g`, `b`.
/// * `BigEndian`: `a` is the most significant byte, then `r`, `g`, `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ByteOrder {
    #[default]
    BigEndian,
    LittleEndian,
}

impl ByteOrder {
    /// Reassembles one float from its `a, r, g, b` channel bytes.
    pub fn assemble(self, a: u8, r: u8, g: u8, b: u8) -> f32 {
        match self {
            ByteOrder::LittleEndian => f32::from_le_bytes([a, r, g, b]),
            ByteOrder::BigEndian => f32::from_be_bytes([a, r, g, b]),
        }
    }

    /// Splits `value` into its `[a, r, g, b]` channel bytes.
    pub fn split(self, value: f32) -> [u8; 4] {
        match self {
            ByteOrder::LittleEndian => value.to_le_bytes(),
            ByteOrder::BigEndian => value.to_be_bytes(),
        }
    }
}

fn channel_to_byte(c: f32) -> u8 {
    (c * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Decodes an 8-bit RGBA image into a grid of floats.
///
/// Pixel `(x, y)` becomes cell `(i = y, j = x)`, so the grid has one row per
/// image row.
pub fn decode_packed(image: &RgbaImage, order: ByteOrder) -> Result<Grid, DecodeError> {
    let (width, height) = image.dimensions();
    let data: Vec<f32> = image
        .pixels()
        .map(|&Rgba([r, g, b, a])| order.assemble(a, r, g, b))
        .collect();

    debug!(width, height, ?order, "decoded packed heightfield");
    Grid::from_vec(height as usize, width as usize, data).map_err(|_| DecodeError::Dimensions {
        nx: height as usize,
        ny: width as usize,
    })
}

/// Decodes an image whose channels are stored as fractions in `[0, 1]`.
///
/// Each channel is scaled by 255 and rounded to a byte first, so only data
/// that was packed into 8-bit channels survives intact.
pub fn decode_packed_normalized(image: &Rgba32FImage, order: ByteOrder) -> Result<Grid, DecodeError> {
    let (width, height) = image.dimensions();
    let data: Vec<f32> = image
        .pixels()
        .map(|&Rgba([r, g, b, a])| {
            order.assemble(
                channel_to_byte(a),
                channel_to_byte(r),
                channel_to_byte(g),
                channel_to_byte(b),
            )
        })
        .collect();

    Grid::from_vec(height as usize, width as usize, data).map_err(|_| DecodeError::Dimensions {
        nx: height as usize,
        ny: width as usize,
    })
}

/// Loads and decodes a packed heightfield image from disk.
pub fn load_packed(path: &Path, order: ByteOrder) -> Result<Grid, DecodeError> {
    let image = image::open(path).map_err(|source| DecodeError::MissingResource {
        path: path.to_path_buf(),
        source,
    })?;
    decode_packed(&image.to_rgba8(), order)
}

/// Packs a grid into an RGBA image; the inverse of [`decode_packed`].
pub fn encode_packed(grid: &Grid, order: ByteOrder) -> Result<RgbaImage, DecodeError> {
    let dims_err = || DecodeError::Dimensions {
        nx: grid.nx(),
        ny: grid.ny(),
    };
    let width = u32::try_from(grid.ny()).map_err(|_| dims_err())?;
    let height = u32::try_from(grid.nx()).map_err(|_| dims_err())?;

    let mut raw = Vec::with_capacity(grid.len() * 4);
    for &v in grid.as_slice() {
        let [a, r, g, b] = order.split(v);
        raw.extend_from_slice(&[r, g, b, a]);
    }
    RgbaImage::from_raw(width, height, raw).ok_or_else(dims_err)
}

//! PNG export and import for heightfields.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ImageBuffer, ImageEncoder, Luma};
use thiserror::Error;

use crate::decode::{encode_packed, ByteOrder, DecodeError};
use crate::terrain::Grid;

/// Errors that can occur during PNG export.
#[derive(Error, Debug)]
pub enum PngExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid value range: min ({0}) >= max ({1})")]
    InvalidRange(f32, f32),
    #[error("Grid {0}x{1} does not fit in a PNG")]
    Dimensions(usize, usize),
}

impl From<DecodeError> for PngExportError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::MissingResource { source, .. } => PngExportError::Image(source),
            DecodeError::Dimensions { nx, ny } => PngExportError::Dimensions(nx, ny),
        }
    }
}

/// Options shared by the PNG exporters.
#[derive(Debug, Clone)]
pub struct PngExportOptions {
    /// PNG compression type.
    pub compression: CompressionType,
    /// PNG filter type.
    pub filter: FilterType,
}

impl Default for PngExportOptions {
    fn default() -> Self {
        Self {
            compression: CompressionType::Default,
            filter: FilterType::Adaptive,
        }
    }
}

fn image_dims(grid: &Grid) -> Result<(u32, u32), PngExportError> {
    let err = || PngExportError::Dimensions(grid.nx(), grid.ny());
    let width = u32::try_from(grid.ny()).map_err(|_| err())?;
    let height = u32::try_from(grid.nx()).map_err(|_| err())?;
    Ok((width, height))
}

/// Exports a grid as a 16-bit grayscale PNG, mapping `[min, max]` to
/// `[0, 65535]`. Cell `(i, j)` becomes pixel `(x = j, y = i)`.
pub fn export_grid_png_u16(
    grid: &Grid,
    path: &Path,
    min_value: f32,
    max_value: f32,
    options: &PngExportOptions,
) -> Result<(), PngExportError> {
    if min_value >= max_value {
        return Err(PngExportError::InvalidRange(min_value, max_value));
    }
    let (width, height) = image_dims(grid)?;

    let range = max_value - min_value;
    let mut img: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::new(width, height);
    for (px, &v) in img.pixels_mut().zip(grid.as_slice()) {
        let normalized = ((v - min_value) / range).clamp(0.0, 1.0);
        *px = Luma([(normalized * 65535.0).round() as u16]);
    }

    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let encoder = PngEncoder::new_with_quality(writer, options.compression, options.filter);

    // Convert u16 slice to bytes for the encoder
    let byte_slice: &[u8] = bytemuck::cast_slice(img.as_raw());
    encoder.write_image(byte_slice, width, height, image::ExtendedColorType::L16)?;
    Ok(())
}

/// Exports a heightfield already normalized into `[0, 1]` as a 16-bit PNG.
pub fn export_heightfield_png(
    heights: &Grid,
    path: &Path,
    options: &PngExportOptions,
) -> Result<(), PngExportError> {
    export_grid_png_u16(heights, path, 0.0, 1.0, options)
}

/// Exports a grid as a packed-float RGBA PNG readable by
/// [`crate::decode::load_packed`].
pub fn export_packed_png(
    grid: &Grid,
    order: ByteOrder,
    path: &Path,
    options: &PngExportOptions,
) -> Result<(), PngExportError> {
    let img = encode_packed(grid, order)?;

    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let encoder = PngEncoder::new_with_quality(writer, options.compression, options.filter);
    encoder.write_image(
        img.as_raw(),
        img.width(),
        img.height(),
        image::ExtendedColorType::Rgba8,
    )?;
    Ok(())
}

/// Loads a grayscale image and maps its intensity linearly onto
/// `[min_value, max_value]`.
pub fn load_grayscale_png(
    path: &Path,
    min_value: f32,
    max_value: f32,
) -> Result<Grid, PngExportError> {
    let img = image::open(path)?.to_luma16();
    let (width, height) = img.dimensions();

    let range = max_value - min_value;
    let data = img
        .pixels()
        .map(|&Luma([v])| min_value + (v as f32 / 65535.0) * range)
        .collect();

    Grid::from_vec(height as usize, width as usize, data)
        .map_err(|_| PngExportError::Dimensions(height as usize, width as usize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::load_packed;
    use tempfile::tempdir;

    #[test]
    fn test_export_heightfield_png() {
        let grid = Grid::from_fn(9, 9, |i, j| (i + j) as f32 / 16.0);
        let dir = tempdir().unwrap();
        let path = dir.path().join("heights.png");

        export_heightfield_png(&grid, &path, &PngExportOptions::default()).unwrap();

        let img = image::open(&path).unwrap().to_luma16();
        assert_eq!(img.dimensions(), (9, 9));
        assert_eq!(img.get_pixel(0, 0).0, [0]);
        assert_eq!(img.get_pixel(8, 8).0, [65535]);
    }

    #[test]
    fn test_invalid_range() {
        let grid = Grid::new(3, 3);
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.png");

        let result = export_grid_png_u16(&grid, &path, 1.0, -1.0, &PngExportOptions::default());
        assert!(matches!(result, Err(PngExportError::InvalidRange(_, _))));
    }

    #[test]
    fn test_grayscale_round_trip_layout() {
        let grid = Grid::from_fn(3, 5, |i, j| (i * 5 + j) as f32 * 10.0);
        let dir = tempdir().unwrap();
        let path = dir.path().join("gray.png");

        export_grid_png_u16(&grid, &path, 0.0, 140.0, &PngExportOptions::default()).unwrap();
        let loaded = load_grayscale_png(&path, 0.0, 140.0).unwrap();

        assert_eq!(loaded.shape(), (3, 5));
        for (a, b) in loaded.as_slice().iter().zip(grid.as_slice()) {
            assert!((a - b).abs() < 0.01, "{} vs {}", a, b);
        }
    }

    #[test]
    fn test_packed_png_is_lossless() {
        let grid = Grid::from_fn(5, 5, |i, j| 1834.25 - i as f32 * 0.5 + j as f32 * 0.0625);
        let dir = tempdir().unwrap();
        let path = dir.path().join("packed.png");

        export_packed_png(&grid, ByteOrder::BigEndian, &path, &PngExportOptions::default()).unwrap();
        let loaded = load_packed(&path, ByteOrder::BigEndian).unwrap();
        assert_eq!(loaded, grid);
    }
}

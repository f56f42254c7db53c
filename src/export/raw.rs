//! RAW format export for game engine compatibility.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::terrain::Grid;

/// Errors that can occur during RAW export.
#[derive(Error, Debug)]
pub enum RawExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// RAW export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RawFormat {
    /// 16-bit unsigned integer, little-endian (Unity default).
    #[default]
    R16LittleEndian,
    /// 16-bit unsigned integer, big-endian.
    R16BigEndian,
    /// 32-bit float, little-endian (high precision).
    R32Float,
}

impl RawFormat {
    pub fn bytes_per_sample(&self) -> usize {
        match self {
            RawFormat::R16LittleEndian | RawFormat::R16BigEndian => 2,
            RawFormat::R32Float => 4,
        }
    }
}

fn to_u16(height: f32) -> u16 {
    (height.clamp(0.0, 1.0) * 65535.0).round() as u16
}

/// Exports a normalized heightfield as a headerless RAW file, rows in order.
///
/// R16 formats clamp samples into `[0, 1]` before scaling; R32 writes the
/// samples unchanged.
pub fn export_heightfield_raw(
    heights: &Grid,
    path: &Path,
    format: RawFormat,
) -> Result<(), RawExportError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    match format {
        RawFormat::R16LittleEndian => {
            for &height in heights.as_slice() {
                writer.write_all(&to_u16(height).to_le_bytes())?;
            }
        }
        RawFormat::R16BigEndian => {
            for &height in heights.as_slice() {
                writer.write_all(&to_u16(height).to_be_bytes())?;
            }
        }
        RawFormat::R32Float => {
            for &height in heights.as_slice() {
                writer.write_all(&height.to_le_bytes())?;
            }
        }
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn grid() -> Grid {
        Grid::from_vec(1, 3, vec![0.0, 0.5, 1.0]).unwrap()
    }

    #[test]
    fn test_r16_little_endian() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.raw");
        export_heightfield_raw(&grid(), &path, RawFormat::R16LittleEndian).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes.len(), 3 * RawFormat::R16LittleEndian.bytes_per_sample());
        assert_eq!(u16::from_le_bytes([bytes[0], bytes[1]]), 0);
        assert_eq!(u16::from_le_bytes([bytes[2], bytes[3]]), 32768);
        assert_eq!(u16::from_le_bytes([bytes[4], bytes[5]]), 65535);
    }

    #[test]
    fn test_r16_big_endian() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.raw");
        export_heightfield_raw(&grid(), &path, RawFormat::R16BigEndian).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(u16::from_be_bytes([bytes[4], bytes[5]]), 65535);
        assert_eq!(bytes[4..6], [0xFF, 0xFF]);
    }

    #[test]
    fn test_r32_float() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.raw");
        export_heightfield_raw(&grid(), &path, RawFormat::R32Float).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes.len(), 12);
        let v = f32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        assert_eq!(v, 0.5);
    }
}

//! Export of a complete terrain: heightfield, normal map and descriptor.

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::descriptor::{export_terrain_descriptor, DescriptorError};
use super::normal_map::export_normal_map_png;
use super::png::{export_heightfield_png, PngExportError, PngExportOptions};
use super::raw::{export_heightfield_raw, RawExportError, RawFormat};
use crate::terrain::TerrainData;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Png(#[from] PngExportError),
    #[error(transparent)]
    Raw(#[from] RawExportError),
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
}

/// Container format for the heightfield.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HeightfieldFormat {
    /// 16-bit grayscale PNG.
    #[default]
    Png,
    /// Headerless RAW.
    Raw(RawFormat),
}

/// Paths of the files written by [`export_terrain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFiles {
    pub heightfield: PathBuf,
    pub normal_map: Option<PathBuf>,
    pub descriptor: PathBuf,
}

/// Writes every artifact of `terrain` into `output_dir`.
///
/// Files are named `{base_name}_height.{png,raw}`, `{base_name}_normal.png`
/// (only when the terrain carries a normal map) and `{base_name}.json`.
pub fn export_terrain(
    terrain: &TerrainData,
    output_dir: &Path,
    base_name: &str,
    format: HeightfieldFormat,
    options: &PngExportOptions,
) -> Result<ExportedFiles, ExportError> {
    std::fs::create_dir_all(output_dir)?;

    let heightfield = match format {
        HeightfieldFormat::Png => {
            let path = output_dir.join(format!("{}_height.png", base_name));
            export_heightfield_png(&terrain.heights, &path, options)?;
            path
        }
        HeightfieldFormat::Raw(raw) => {
            let path = output_dir.join(format!("{}_height.raw", base_name));
            export_heightfield_raw(&terrain.heights, &path, raw)?;
            path
        }
    };

    let normal_map = match &terrain.splat.normal_map {
        Some(map) => {
            let path = output_dir.join(format!("{}_normal.png", base_name));
            export_normal_map_png(map, &path, options)?;
            Some(path)
        }
        None => None,
    };

    let descriptor = output_dir.join(format!("{}.json", base_name));
    export_terrain_descriptor(&terrain.descriptor(), &descriptor)?;

    Ok(ExportedFiles {
        heightfield,
        normal_map,
        descriptor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normals::generate_normal_map;
    use crate::terrain::{build_terrain, Grid, TerrainConfig};
    use tempfile::tempdir;

    #[test]
    fn test_export_terrain_png_bundle() {
        let raw = Grid::from_fn(9, 9, |i, j| (i as f32 - 4.0).powi(2) + j as f32);
        let config = TerrainConfig::default();
        let map = generate_normal_map(&raw, config.spacing).unwrap();
        let terrain = build_terrain(&raw, &config, None, Some(map)).unwrap();

        let dir = tempdir().unwrap();
        let out = dir.path().join("nested");
        let files = export_terrain(&terrain, &out, "dem", HeightfieldFormat::Png, &PngExportOptions::default())
            .unwrap();

        assert!(files.heightfield.ends_with("dem_height.png"));
        assert!(files.heightfield.exists());
        assert!(files.normal_map.as_ref().unwrap().exists());
        assert!(files.descriptor.exists());
    }

    #[test]
    fn test_default_heightfield_format_is_png() {
        assert_eq!(HeightfieldFormat::default(), HeightfieldFormat::Png);
    }

    #[test]
    fn test_export_terrain_raw_without_normal_map() {
        let raw = Grid::from_fn(5, 5, |i, _| i as f32);
        let terrain = build_terrain(&raw, &TerrainConfig::default(), None, None).unwrap();

        let dir = tempdir().unwrap();
        let files = export_terrain(
            &terrain,
            dir.path(),
            "dem",
            HeightfieldFormat::Raw(RawFormat::R16LittleEndian),
            &PngExportOptions::default(),
        )
        .unwrap();

        assert_eq!(files.normal_map, None);
        let len = std::fs::metadata(&files.heightfield).unwrap().len();
        assert_eq!(len, 5 * 5 * 2);
    }
}

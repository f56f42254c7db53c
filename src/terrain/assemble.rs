//! Terrain preparation: shape contract, normalization and engine metadata.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{normalize, Grid, PixelSpacing, RangeStats, TerrainConfig, TerrainError};
use crate::normals::NormalMap;

/// True when `n` is a usable heightmap side: `n - 1` is a power of two and
/// `n >= 3`.
pub fn is_valid_terrain_size(n: usize) -> bool {
    n >= 3 && (n - 1).is_power_of_two()
}

/// Checks that `grid` is square with a side of `2^k + 1` samples.
pub fn validate_terrain_shape(grid: &Grid) -> Result<(), TerrainError> {
    let (nx, ny) = grid.shape();
    if nx != ny {
        return Err(TerrainError::InvalidShape {
            nx,
            ny,
            reason: "heightfield must be square".to_string(),
        });
    }
    if !is_valid_terrain_size(nx) {
        return Err(TerrainError::InvalidShape {
            nx,
            ny,
            reason: "side length must be a power of two plus one (at least 3)".to_string(),
        });
    }
    Ok(())
}

/// Texture layer painted over the terrain.
#[derive(Debug, Clone, PartialEq)]
pub struct SplatLayer {
    /// Reference to the base color texture, if any.
    pub base_texture: Option<String>,
    pub normal_map: Option<NormalMap>,
    /// World-space size one texture repeat covers.
    pub tile_size: Vec2,
}

/// Everything a terrain engine needs to instantiate the terrain.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainData {
    /// Heights normalized into `[0, 1]`.
    pub heights: Grid,
    /// Extent of the raw heights before normalization.
    pub stats: RangeStats,
    pub spacing: PixelSpacing,
    pub heightmap_resolution: u32,
    pub alphamap_resolution: u32,
    pub detail_resolution: u32,
    pub resolution_per_patch: u32,
    /// World size: `(xres * n, height range, yres * n)`.
    pub size: Vec3,
    pub splat: SplatLayer,
}

/// Serializable summary of [`TerrainData`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainDescriptor {
    pub heightmap_resolution: u32,
    pub alphamap_resolution: u32,
    pub detail_resolution: u32,
    pub resolution_per_patch: u32,
    pub spacing: PixelSpacing,
    pub size: [f32; 3],
    pub height_min: f32,
    pub height_max: f32,
    pub tile_size: [f32; 2],
    pub base_texture: Option<String>,
    pub normal_map_size: Option<[u32; 2]>,
}

impl TerrainData {
    pub fn descriptor(&self) -> TerrainDescriptor {
        TerrainDescriptor {
            heightmap_resolution: self.heightmap_resolution,
            alphamap_resolution: self.alphamap_resolution,
            detail_resolution: self.detail_resolution,
            resolution_per_patch: self.resolution_per_patch,
            spacing: self.spacing,
            size: self.size.to_array(),
            height_min: self.stats.min,
            height_max: self.stats.max,
            tile_size: self.splat.tile_size.to_array(),
            base_texture: self.splat.base_texture.clone(),
            normal_map_size: self
                .splat
                .normal_map
                .as_ref()
                .map(|m| [m.width(), m.height()]),
        }
    }
}

/// Prepares a raw heightfield for a terrain engine.
///
/// The shape is validated before anything else. `raw` is left untouched; the
/// returned data owns a normalized copy.
pub fn build_terrain(
    raw: &Grid,
    config: &TerrainConfig,
    base_texture: Option<&str>,
    normal_map: Option<NormalMap>,
) -> Result<TerrainData, TerrainError> {
    validate_terrain_shape(raw)?;
    let stats = RangeStats::compute(raw)?;
    let heights = normalize(raw, &stats, config.flat_policy)?;
    assemble_terrain(heights, stats, config, base_texture, normal_map)
}

/// Wraps an already normalized heightfield with terrain metadata.
///
/// `stats` must describe the raw heights `heights` was normalized from.
pub fn assemble_terrain(
    heights: Grid,
    stats: RangeStats,
    config: &TerrainConfig,
    base_texture: Option<&str>,
    normal_map: Option<NormalMap>,
) -> Result<TerrainData, TerrainError> {
    validate_terrain_shape(&heights)?;
    config.validate()?;

    if base_texture.is_none() {
        warn!("no base texture given, terrain will be untextured");
    }

    let n = heights.nx();
    let side = u32::try_from(n).map_err(|_| TerrainError::InvalidShape {
        nx: n,
        ny: n,
        reason: "side length exceeds u32".to_string(),
    })?;

    if let Some(map) = &normal_map {
        if (map.width(), map.height()) != (side - 1, side - 1) {
            return Err(TerrainError::InvalidShape {
                nx: map.height() as usize + 1,
                ny: map.width() as usize + 1,
                reason: format!("normal map does not match a {}x{} heightfield", n, n),
            });
        }
    }

    let spacing = config.spacing;
    let width = spacing.xres * n as f32;
    let length = spacing.yres * n as f32;

    // Descriptors are JSON, which has no representation for inf.
    let extent = [
        ("height min", stats.min),
        ("height max", stats.max),
        ("height range", stats.range),
        ("width", width),
        ("length", length),
    ];
    if let Some(&(what, value)) = extent.iter().find(|(_, v)| !v.is_finite()) {
        return Err(TerrainError::NonFiniteExtent { what, value });
    }

    debug!(side, width, length, range = stats.range, "terrain assembled");

    Ok(TerrainData {
        heights,
        stats,
        spacing,
        heightmap_resolution: side,
        alphamap_resolution: side - 1,
        detail_resolution: config.detail_resolution,
        resolution_per_patch: config.resolution_per_patch,
        size: Vec3::new(width, stats.range, length),
        splat: SplatLayer {
            base_texture: base_texture.map(str::to_string),
            normal_map,
            tile_size: Vec2::new(width, length),
        },
    })
}

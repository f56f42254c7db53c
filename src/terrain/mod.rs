//! Heightfield data structures and terrain preparation.
//!
//! Provides the [`Grid`] type shared by every numeric stage, range statistics,
//! normalization into `[0, 1]`, and the shape contract terrain engines rely on.

mod grid;
mod stats;
mod normalize;
mod config;
mod assemble;

use thiserror::Error;

pub use grid::Grid;
pub use stats::RangeStats;
pub use normalize::{normalize, normalize_in_place, FlatPolicy};
pub use config::{PixelSpacing, TerrainConfig};
pub use assemble::{
    assemble_terrain, build_terrain, is_valid_terrain_size, validate_terrain_shape,
    SplatLayer, TerrainData, TerrainDescriptor,
};

/// Errors raised by the numeric core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TerrainError {
    #[error("Invalid heightfield shape {nx}x{ny}: {reason}")]
    InvalidShape { nx: usize, ny: usize, reason: String },
    #[error("Grid has no samples to compute a range from")]
    EmptyGrid,
    #[error("Degenerate height range: every sample equals {value}")]
    DegenerateRange { value: f32 },
    #[error("Grid {nx}x{ny} is too small: at least 2 samples per axis are required")]
    GridTooSmall { nx: usize, ny: usize },
    #[error("Invalid pixel spacing ({xres}, {yres}): both must be finite and > 0")]
    InvalidSpacing { xres: f32, yres: f32 },
    #[error("Shape mismatch: expected {}x{} samples, found {found}", expected.0, expected.1)]
    ShapeMismatch { expected: (usize, usize), found: usize },
    #[error("Terrain {what} is not a finite number: {value}")]
    NonFiniteExtent { what: &'static str, value: f32 },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

//! Terrain preparation from packed-float elevation images.
//!
//! This crate decodes DEM tiles stored as 32-bit floats packed into RGBA
//! channels, normalizes them for terrain engines, and derives normal maps
//! from the raw heights and their physical sample spacing.

pub mod decode;
pub mod terrain;
pub mod normals;
pub mod pipeline;
pub mod export;

pub use decode::{decode_packed, load_packed, ByteOrder, DecodeError};
pub use terrain::{
    build_terrain, FlatPolicy, Grid, PixelSpacing, RangeStats, TerrainConfig, TerrainData,
    TerrainError,
};
pub use normals::{generate_normal_map, gradient, surface_normals, NormalField, NormalMap};
pub use pipeline::{Pipeline, PipelineError, StageConfig, TerrainJob};

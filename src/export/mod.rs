//! Export module for saving terrain data to various file formats.
//!
//! Supports 16-bit PNG and RAW heightfields, RGB normal maps, packed-float
//! RGBA images and a JSON descriptor for terrain engine import.

mod png;
mod raw;
mod normal_map;
mod descriptor;
mod bundle;

pub use png::{
    export_grid_png_u16,
    export_heightfield_png,
    export_packed_png,
    load_grayscale_png,
    PngExportOptions,
    PngExportError,
};
pub use raw::{export_heightfield_raw, RawExportError, RawFormat};
pub use normal_map::export_normal_map_png;
pub use descriptor::{export_terrain_descriptor, load_terrain_descriptor, DescriptorError};
pub use bundle::{export_terrain, ExportError, ExportedFiles, HeightfieldFormat};

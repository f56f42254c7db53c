//! Normal map PNG export.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::{ImageEncoder, codecs::png::PngEncoder};

use super::png::{PngExportError, PngExportOptions};
use crate::normals::NormalMap;

/// Export a normal map as an 8-bit RGB PNG.
///
/// Output is tangent-space-like with Z pointing "out of the image".
pub fn export_normal_map_png(
    map: &NormalMap,
    path: &Path,
    options: &PngExportOptions,
) -> Result<(), PngExportError> {
    let img = map.to_rgb8();

    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let encoder = PngEncoder::new_with_quality(writer, options.compression, options.filter);
    encoder.write_image(
        img.as_raw(),
        img.width(),
        img.height(),
        image::ExtendedColorType::Rgb8,
    )?;
    Ok(())
}

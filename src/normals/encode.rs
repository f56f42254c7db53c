//! Packing of unit normals into an RGB normal map.

use glam::Vec3;
use image::{Rgb, Rgb32FImage, RgbImage};

use super::{surface_normals, NormalField};
use crate::terrain::{Grid, PixelSpacing, TerrainError};

/// An RGB normal map with channels in `[0, 1]`.
///
/// For a source grid of `nx` x `ny` samples the map is `ny - 1` pixels wide
/// and `nx - 1` pixels high. Pixel `(x, y)` holds the normal of cell
/// `(i = y, j = x)`; the last row and column of the field are not emitted,
/// matching the alphamap resolution terrain engines sample normals at.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalMap {
    image: Rgb32FImage,
}

impl NormalMap {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Encoded color of cell `(i, j)`.
    pub fn pixel(&self, i: usize, j: usize) -> [f32; 3] {
        self.image.get_pixel(j as u32, i as u32).0
    }

    pub fn as_image(&self) -> &Rgb32FImage {
        &self.image
    }

    pub fn into_image(self) -> Rgb32FImage {
        self.image
    }

    /// Quantizes to 8 bits per channel for storage.
    pub fn to_rgb8(&self) -> RgbImage {
        RgbImage::from_fn(self.width(), self.height(), |x, y| {
            let Rgb(c) = *self.image.get_pixel(x, y);
            Rgb(c.map(|v| (v * 255.0).round().clamp(0.0, 255.0) as u8))
        })
    }
}

/// Maps a unit normal from `[-1, 1]` into `[0, 1]` per component.
pub fn encode_normal(n: Vec3) -> [f32; 3] {
    let c = (n * 0.5) + Vec3::splat(0.5);
    [
        c.x.clamp(0.0, 1.0),
        c.y.clamp(0.0, 1.0),
        c.z.clamp(0.0, 1.0),
    ]
}

/// Encodes a normal field as an RGB normal map.
pub fn encode_normal_map(field: &NormalField) -> Result<NormalMap, TerrainError> {
    let (nx, ny) = field.shape();
    if nx < 2 || ny < 2 {
        return Err(TerrainError::GridTooSmall { nx, ny });
    }

    let too_large = || TerrainError::InvalidShape {
        nx,
        ny,
        reason: "normal map does not fit in an image".to_string(),
    };
    let width = u32::try_from(ny - 1).map_err(|_| too_large())?;
    let height = u32::try_from(nx - 1).map_err(|_| too_large())?;

    let image = Rgb32FImage::from_fn(width, height, |x, y| {
        Rgb(encode_normal(field.at(y as usize, x as usize)))
    });
    Ok(NormalMap { image })
}

/// Computes the surface normals of `vals` and encodes them as a normal map.
pub fn generate_normal_map(vals: &Grid, spacing: PixelSpacing) -> Result<NormalMap, TerrainError> {
    let field = surface_normals(vals, spacing)?;
    encode_normal_map(&field)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_field(nx: usize, ny: usize) -> NormalField {
        NormalField {
            dx: Grid::new(nx, ny),
            dy: Grid::new(nx, ny),
            dz: Grid::filled(nx, ny, 1.0),
        }
    }

    #[test]
    fn test_flat_field_encodes_to_up() {
        let map = encode_normal_map(&flat_field(5, 5)).unwrap();

        assert_eq!((map.width(), map.height()), (4, 4));
        for p in map.as_image().pixels() {
            assert_eq!(p.0, [0.5, 0.5, 1.0]);
        }
    }

    #[test]
    fn test_dimensions_drop_last_row_and_column() {
        let map = encode_normal_map(&flat_field(3, 6)).unwrap();
        assert_eq!(map.width(), 5);
        assert_eq!(map.height(), 2);
    }

    #[test]
    fn test_cell_to_pixel_mapping() {
        let mut field = flat_field(3, 4);
        field.dx.set(1, 2, 1.0);
        field.dz.set(1, 2, 0.0);

        let map = encode_normal_map(&field).unwrap();
        assert_eq!(map.pixel(1, 2), [1.0, 0.5, 0.5]);
        assert_eq!(map.as_image().get_pixel(2, 1).0, [1.0, 0.5, 0.5]);
    }

    #[test]
    fn test_clamps_out_of_range_components() {
        assert_eq!(encode_normal(Vec3::new(1.00001, -1.00001, 0.0)), [1.0, 0.0, 0.5]);
    }

    #[test]
    fn test_rgb8_quantization() {
        let map = encode_normal_map(&flat_field(2, 2)).unwrap();
        let rgb = map.to_rgb8();
        assert_eq!(rgb.get_pixel(0, 0).0, [128, 128, 255]);
    }

    #[test]
    fn test_too_small_field() {
        let result = encode_normal_map(&flat_field(1, 3));
        assert_eq!(result, Err(TerrainError::GridTooSmall { nx: 1, ny: 3 }));
    }

    #[test]
    fn test_generate_normal_map_on_flat_grid() {
        let vals = Grid::filled(9, 9, -4.0);
        let map = generate_normal_map(&vals, PixelSpacing::default()).unwrap();

        assert_eq!((map.width(), map.height()), (8, 8));
        assert!(map.as_image().pixels().all(|p| p.0 == [0.5, 0.5, 1.0]));
    }
}

//! Terrain build configuration.

use serde::{Deserialize, Serialize};

use super::{FlatPolicy, TerrainError};
use crate::decode::ByteOrder;

/// Physical distance between adjacent samples along each grid axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelSpacing {
    /// Spacing along the first axis (rows, `i`).
    pub xres: f32,
    /// Spacing along the second axis (columns, `j`).
    pub yres: f32,
}

impl PixelSpacing {
    /// Creates a validated spacing.
    pub fn new(xres: f32, yres: f32) -> Result<Self, TerrainError> {
        let spacing = Self { xres, yres };
        spacing.validate()?;
        Ok(spacing)
    }

    /// Same spacing on both axes.
    pub fn uniform(res: f32) -> Result<Self, TerrainError> {
        Self::new(res, res)
    }

    pub fn validate(&self) -> Result<(), TerrainError> {
        let ok = |v: f32| v.is_finite() && v > 0.0;
        if ok(self.xres) && ok(self.yres) {
            Ok(())
        } else {
            Err(TerrainError::InvalidSpacing {
                xres: self.xres,
                yres: self.yres,
            })
        }
    }
}

impl Default for PixelSpacing {
    fn default() -> Self {
        Self { xres: 2.5, yres: 2.5 }
    }
}

/// Parameters for one terrain build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainConfig {
    /// Sample spacing in world units.
    pub spacing: PixelSpacing,
    /// Byte order of the packed float channels.
    pub byte_order: ByteOrder,
    /// Handling of perfectly flat heightfields.
    pub flat_policy: FlatPolicy,
    /// Detail map resolution handed to the terrain engine.
    pub detail_resolution: u32,
    /// Detail patch resolution handed to the terrain engine.
    pub resolution_per_patch: u32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            spacing: PixelSpacing::default(),
            byte_order: ByteOrder::default(),
            flat_policy: FlatPolicy::default(),
            detail_resolution: 128,
            resolution_per_patch: 8,
        }
    }
}

impl TerrainConfig {
    pub fn with_spacing(spacing: PixelSpacing) -> Self {
        Self {
            spacing,
            ..Default::default()
        }
    }

    /// Checks the spacing and the detail resolutions.
    pub fn validate(&self) -> Result<(), TerrainError> {
        self.spacing.validate()?;

        if self.resolution_per_patch == 0 || self.detail_resolution == 0 {
            return Err(TerrainError::InvalidConfig(
                "detail_resolution and resolution_per_patch must be > 0".to_string(),
            ));
        }
        if self.resolution_per_patch > self.detail_resolution {
            return Err(TerrainError::InvalidConfig(format!(
                "resolution_per_patch ({}) exceeds detail_resolution ({})",
                self.resolution_per_patch, self.detail_resolution
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = TerrainConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.byte_order, ByteOrder::BigEndian);
        assert_eq!(config.flat_policy, FlatPolicy::Zero);
        assert_eq!(config.detail_resolution, 128);
        assert_eq!(config.resolution_per_patch, 8);
    }

    #[test]
    fn test_spacing_validation() {
        assert!(PixelSpacing::new(1.0, 0.5).is_ok());
        assert!(PixelSpacing::new(0.0, 1.0).is_err());
        assert!(PixelSpacing::new(1.0, -2.0).is_err());
        assert!(PixelSpacing::new(f32::NAN, 1.0).is_err());
        assert!(PixelSpacing::uniform(f32::INFINITY).is_err());
    }

    #[test]
    fn test_detail_resolution_validation() {
        let config = TerrainConfig {
            detail_resolution: 4,
            resolution_per_patch: 8,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(TerrainError::InvalidConfig(_))));

        let config = TerrainConfig {
            resolution_per_patch: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}

//! Generation request configuration and validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::noise::NoiseKind;
use super::normalize::Normalizer;
use super::octave::{erosion_octaves, resolve_offsets, OctaveSpec, OffsetMode};

/// Errors raised before any heightfield buffer is allocated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TerrainError {
    #[error("Grid size must be positive, got {0}")]
    InvalidGridSize(u32),
    #[error("Grid size {0} is too large to allocate two {0}x{0} buffers")]
    GridTooLarge(u32),
    #[error("Octave list is empty")]
    NoOctaves,
    #[error("Octave {index}: {field} must be finite, got {value}")]
    NonFinite {
        index: usize,
        field: &'static str,
        value: f64,
    },
    #[error("Octave {index}: {field} must be positive, got {value}")]
    NonPositive {
        index: usize,
        field: &'static str,
        value: f64,
    },
    #[error("{name} must be finite, got {value}")]
    NonFiniteParameter { name: &'static str, value: f64 },
    #[error("Gradient factor must be finite and >= 0, got {0}")]
    InvalidGradientFactor(f64),
    #[error("Invalid output range: low ({0}) must be finite and below high ({1})")]
    InvalidOutputRange(f32, f32),
    #[error("Buffer holds {actual} values, expected {expected}")]
    BufferLength { expected: usize, actual: usize },
}

/// Everything a single generation request needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainConfig {
    /// Seed for the permutation table and randomized offsets.
    pub seed: i32,
    /// Output is `grid_size`×`grid_size` cells.
    pub grid_size: u32,
    /// Accumulation passes, applied in order.
    pub octaves: Vec<OctaveSpec>,
    /// How octave offsets are chosen.
    pub offsets: OffsetMode,
    /// Erosion damping strength; 0 disables slope feedback.
    pub gradient_factor: f64,
    /// Noise evaluator.
    pub noise: NoiseKind,
    /// Output range mapping.
    pub normalizer: Normalizer,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        let grid_size = 1024;
        Self {
            seed: 42,
            grid_size,
            octaves: erosion_octaves(grid_size),
            offsets: OffsetMode::default(),
            gradient_factor: 4.0,
            noise: NoiseKind::default(),
            normalizer: Normalizer::default(),
        }
    }
}

impl TerrainConfig {
    /// Default configuration with the given seed.
    pub fn with_seed(seed: i32) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    /// Erosion preset sized for `grid_size`.
    pub fn erosion(seed: i32, grid_size: u32) -> Self {
        Self {
            seed,
            grid_size,
            octaves: erosion_octaves(grid_size),
            ..Default::default()
        }
    }

    /// Checks the request without allocating any grid storage.
    pub fn validate(&self) -> Result<(), TerrainError> {
        validate_grid_size(self.grid_size)?;
        validate_octaves(&self.octaves)?;
        validate_gradient_factor(self.gradient_factor)?;
        if let OffsetMode::Randomized { spread } = self.offsets {
            validate_finite("Offset spread", spread)?;
        }
        if let NoiseKind::Simplex3Slice { z } = self.noise {
            validate_finite("Slice depth", z)?;
        }
        self.normalizer.validate()
    }

    /// Octaves with offsets resolved for this request's seed.
    pub fn resolved_octaves(&self) -> Vec<OctaveSpec> {
        resolve_offsets(&self.octaves, self.offsets, self.seed)
    }
}

pub(crate) fn validate_grid_size(size: u32) -> Result<(), TerrainError> {
    if size == 0 {
        return Err(TerrainError::InvalidGridSize(size));
    }
    if buffer_cell_count(size).is_none() {
        return Err(TerrainError::GridTooLarge(size));
    }
    Ok(())
}

/// Cell count of a `size`×`size` grid, or `None` when the accumulator's two
/// `f32` buffers would not fit in the address space.
pub(crate) fn buffer_cell_count(size: u32) -> Option<usize> {
    let n = usize::try_from(size).ok()?;
    let cells = n.checked_mul(n)?;
    let bytes = cells.checked_mul(2 * std::mem::size_of::<f32>())?;
    (bytes <= isize::MAX as usize).then_some(cells)
}

fn validate_finite(name: &'static str, value: f64) -> Result<(), TerrainError> {
    if !value.is_finite() {
        return Err(TerrainError::NonFiniteParameter { name, value });
    }
    Ok(())
}

pub(crate) fn validate_gradient_factor(factor: f64) -> Result<(), TerrainError> {
    if !factor.is_finite() || factor < 0.0 {
        return Err(TerrainError::InvalidGradientFactor(factor));
    }
    Ok(())
}

pub(crate) fn validate_octaves(octaves: &[OctaveSpec]) -> Result<(), TerrainError> {
    if octaves.is_empty() {
        return Err(TerrainError::NoOctaves);
    }

    for (index, o) in octaves.iter().enumerate() {
        let fields = [
            ("scale", o.scale),
            ("weight", o.weight),
            ("x offset", o.offset.x),
            ("y offset", o.offset.y),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(TerrainError::NonFinite { index, field, value });
            }
        }
        for (field, value) in [("scale", o.scale), ("weight", o.weight)] {
            if value <= 0.0 {
                return Err(TerrainError::NonPositive { index, field, value });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = TerrainConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.octaves.len(), 5);
    }

    #[test]
    fn test_zero_grid_rejected() {
        let config = TerrainConfig {
            grid_size: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(TerrainError::InvalidGridSize(0)));
    }

    #[test]
    fn test_oversized_grid_rejected() {
        assert_eq!(validate_grid_size(u32::MAX), Err(TerrainError::GridTooLarge(u32::MAX)));
        assert!(validate_grid_size(4096).is_ok());
        assert_eq!(buffer_cell_count(4096), Some(4096 * 4096));
        assert_eq!(buffer_cell_count(u32::MAX), None);
        let config = TerrainConfig {
            grid_size: u32::MAX,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(TerrainError::GridTooLarge(u32::MAX)));
    }

    #[test]
    fn test_non_finite_offset_spread_rejected() {
        let mut config = TerrainConfig::with_seed(1);
        config.offsets = OffsetMode::Randomized { spread: f64::INFINITY };
        assert!(matches!(
            config.validate(),
            Err(TerrainError::NonFiniteParameter { name: "Offset spread", .. })
        ));

        config.offsets = OffsetMode::Randomized { spread: 1e30 };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_non_finite_slice_depth_rejected() {
        let mut config = TerrainConfig::with_seed(1);
        for z in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            config.noise = NoiseKind::Simplex3Slice { z };
            assert!(matches!(
                config.validate(),
                Err(TerrainError::NonFiniteParameter { name: "Slice depth", .. })
            ));
        }
        config.noise = NoiseKind::Simplex3Slice { z: -12.5 };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_octaves_rejected() {
        let config = TerrainConfig {
            octaves: Vec::new(),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(TerrainError::NoOctaves));
    }

    #[test]
    fn test_non_finite_octave_rejected() {
        let mut config = TerrainConfig::with_seed(1);
        config.octaves[2].weight = f64::NAN;
        match config.validate() {
            Err(TerrainError::NonFinite { index, field, .. }) => {
                assert_eq!(index, 2);
                assert_eq!(field, "weight");
            }
            other => panic!("unexpected result {:?}", other),
        }

        let mut config = TerrainConfig::with_seed(1);
        config.octaves[0].offset.y = f64::INFINITY;
        assert!(matches!(
            config.validate(),
            Err(TerrainError::NonFinite { index: 0, field: "y offset", .. })
        ));
    }

    #[test]
    fn test_non_positive_scale_rejected() {
        let mut config = TerrainConfig::with_seed(1);
        config.octaves[1].scale = 0.0;
        assert!(matches!(
            config.validate(),
            Err(TerrainError::NonPositive { index: 1, field: "scale", .. })
        ));
    }

    #[test]
    fn test_gradient_factor_bounds() {
        assert!(validate_gradient_factor(0.0).is_ok());
        assert!(validate_gradient_factor(12.5).is_ok());
        assert!(validate_gradient_factor(-0.1).is_err());
        assert!(validate_gradient_factor(f64::INFINITY).is_err());
    }

    #[test]
    fn test_error_messages() {
        let err = TerrainError::InvalidGridSize(0);
        assert_eq!(err.to_string(), "Grid size must be positive, got 0");
        assert_eq!(TerrainError::NoOctaves.to_string(), "Octave list is empty");
    }

    #[test]
    fn test_resolved_octaves_follow_mode() {
        let mut config = TerrainConfig::erosion(7, 64);
        config.offsets = OffsetMode::Zeroed;
        assert!(config.resolved_octaves().iter().all(|o| o.offset == glam::DVec2::ZERO));

        config.offsets = OffsetMode::Randomized { spread: 100.0 };
        assert!(config.resolved_octaves().iter().any(|o| o.offset != glam::DVec2::ZERO));
    }
}

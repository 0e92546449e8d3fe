//! Octave parameters for heightfield accumulation.

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// One accumulation pass: where to sample the noise field and how much it adds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OctaveSpec {
    /// Noise-space distance between neighbouring cells (spatial frequency).
    pub scale: f64,
    /// Amplitude of this octave's contribution.
    pub weight: f64,
    /// Domain offset added to every sample coordinate.
    pub offset: DVec2,
}

impl OctaveSpec {
    pub fn new(scale: f64, weight: f64) -> Self {
        Self {
            scale,
            weight,
            offset: DVec2::ZERO,
        }
    }

    pub fn with_offset(mut self, x: f64, y: f64) -> Self {
        self.offset = DVec2::new(x, y);
        self
    }

    /// Noise-space coordinate of grid cell `(x, y)`.
    #[inline]
    pub fn sample_point(&self, x: usize, y: usize) -> DVec2 {
        DVec2::new(x as f64, y as f64) * self.scale + self.offset
    }
}

/// How octave offsets are chosen for a generation request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OffsetMode {
    /// Use the offsets stored in each [`OctaveSpec`].
    Explicit,
    /// Force every offset to zero.
    Zeroed,
    /// Draw each offset uniformly from `[0, spread)` per axis, seeded from the terrain seed.
    Randomized { spread: f64 },
}

impl Default for OffsetMode {
    fn default() -> Self {
        Self::Randomized { spread: 1000.0 }
    }
}

/// Fixed salt so offset draws never line up with the permutation shuffle.
const OFFSET_STREAM: u64 = 0x6f63_7461_7665;

/// Returns `octaves` with offsets resolved according to `mode`.
///
/// Randomized offsets depend only on `seed` and the octave position, so the
/// same request always resolves to the same list.
pub fn resolve_offsets(octaves: &[OctaveSpec], mode: OffsetMode, seed: i32) -> Vec<OctaveSpec> {
    match mode {
        OffsetMode::Explicit => octaves.to_vec(),
        OffsetMode::Zeroed => octaves
            .iter()
            .map(|o| OctaveSpec {
                offset: DVec2::ZERO,
                ..*o
            })
            .collect(),
        OffsetMode::Randomized { spread } => {
            let mut rng = ChaCha8Rng::seed_from_u64((seed as u32 as u64) ^ OFFSET_STREAM);
            octaves
                .iter()
                .map(|o| {
                    let x = rng.random::<f64>() * spread;
                    let y = rng.random::<f64>() * spread;
                    OctaveSpec {
                        offset: DVec2::new(x, y),
                        ..*o
                    }
                })
                .collect()
        }
    }
}

/// Relative weights of the five-octave erosion preset.
const EROSION_WEIGHTS: [f64; 5] = [0.3, 0.2, 0.25, 0.15, 0.1];
/// Features across the grid per octave; rises, then dips before the finest layer.
const EROSION_FEATURES: [f64; 5] = [2.0, 5.0, 11.0, 8.0, 23.0];

/// The five-octave preset used for erosion-style terrain on a `grid_size` grid.
pub fn erosion_octaves(grid_size: u32) -> Vec<OctaveSpec> {
    let n = grid_size.max(1) as f64;
    EROSION_FEATURES
        .iter()
        .zip(EROSION_WEIGHTS)
        .map(|(&features, weight)| OctaveSpec::new(features / n, weight))
        .collect()
}

/// Classic fBm-style octaves: each layer doubles frequency and scales amplitude by `persistence`.
pub fn fractal_octaves(count: u8, base_scale: f64, lacunarity: f64, persistence: f64) -> Vec<OctaveSpec> {
    let mut scale = base_scale;
    let mut weight = 1.0;
    let mut octaves = Vec::with_capacity(count as usize);
    for _ in 0..count {
        octaves.push(OctaveSpec::new(scale, weight));
        scale *= lacunarity;
        weight *= persistence;
    }
    let total: f64 = octaves.iter().map(|o| o.weight).sum();
    if total > 0.0 {
        for o in &mut octaves {
            o.weight /= total;
        }
    }
    octaves
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_point() {
        let o = OctaveSpec::new(0.25, 1.0).with_offset(10.0, -2.0);
        assert_eq!(o.sample_point(4, 8), DVec2::new(11.0, 0.0));
    }

    #[test]
    fn test_erosion_preset_shape() {
        let octaves = erosion_octaves(1024);
        assert_eq!(octaves.len(), 5);
        let weights: Vec<f64> = octaves.iter().map(|o| o.weight).collect();
        assert_eq!(weights, vec![0.3, 0.2, 0.25, 0.15, 0.1]);
        assert!((weights.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(octaves.iter().all(|o| o.scale > 0.0 && o.offset == DVec2::ZERO));
    }

    #[test]
    fn test_fractal_octaves_normalized() {
        let octaves = fractal_octaves(4, 0.01, 2.0, 0.5);
        assert_eq!(octaves.len(), 4);
        assert_eq!(octaves[3].scale, 0.08);
        let total: f64 = octaves.iter().map(|o| o.weight).sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert!(octaves[0].weight > octaves[1].weight);
    }

    #[test]
    fn test_zeroed_offsets() {
        let octaves = vec![OctaveSpec::new(0.1, 1.0).with_offset(3.0, 4.0)];
        let resolved = resolve_offsets(&octaves, OffsetMode::Zeroed, 1);
        assert_eq!(resolved[0].offset, DVec2::ZERO);
        assert_eq!(resolved[0].scale, 0.1);
    }

    #[test]
    fn test_explicit_offsets_kept() {
        let octaves = vec![OctaveSpec::new(0.1, 1.0).with_offset(3.0, 4.0)];
        assert_eq!(resolve_offsets(&octaves, OffsetMode::Explicit, 1), octaves);
    }

    #[test]
    fn test_randomized_offsets_reproducible() {
        let octaves = erosion_octaves(256);
        let mode = OffsetMode::Randomized { spread: 500.0 };
        let a = resolve_offsets(&octaves, mode, 99);
        let b = resolve_offsets(&octaves, mode, 99);
        let c = resolve_offsets(&octaves, mode, 100);
        assert_eq!(a, b);
        assert_ne!(a, c);
        for o in &a {
            assert!(o.offset.x >= 0.0 && o.offset.x < 500.0);
            assert!(o.offset.y >= 0.0 && o.offset.y < 500.0);
        }
        // Octaves must not share an offset.
        assert_ne!(a[0].offset, a[1].offset);
    }
}

//! Seeded gradient noise for terrain synthesis.
//!
//! All evaluators are built from a [`PermutationTable`] and are pure
//! functions of their input coordinates.

mod permutation;
mod simplex2;
mod simplex3;

use serde::{Deserialize, Serialize};

pub use permutation::{PermutationTable, TABLE_SIZE};
pub use simplex2::Simplex2;
pub use simplex3::{Simplex3, SliceNoise};

/// A continuous, deterministic scalar field over the plane.
///
/// Implementations must return the same value for the same coordinates no
/// matter how often or in which order they are called; the accumulator
/// samples each coordinate several times from different threads.
pub trait Noise2D: Send + Sync {
    /// Samples the field at `(x, y)`, approximately in [-1, 1].
    fn sample(&self, x: f64, y: f64) -> f64;
}

impl<N: Noise2D + ?Sized> Noise2D for &N {
    #[inline]
    fn sample(&self, x: f64, y: f64) -> f64 {
        (**self).sample(x, y)
    }
}

impl<N: Noise2D + ?Sized> Noise2D for Box<N> {
    #[inline]
    fn sample(&self, x: f64, y: f64) -> f64 {
        (**self).sample(x, y)
    }
}

/// Which evaluator backs a generation request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NoiseKind {
    /// Planar OpenSimplex noise.
    Simplex2,
    /// Fixed-depth slice through 3D OpenSimplex noise.
    Simplex3Slice { z: f64 },
}

impl Default for NoiseKind {
    fn default() -> Self {
        Self::Simplex2
    }
}

impl NoiseKind {
    /// Builds the evaluator for `seed`.
    pub fn build(self, seed: i32) -> Box<dyn Noise2D> {
        let table = PermutationTable::new(seed);
        match self {
            NoiseKind::Simplex2 => Box::new(Simplex2::with_table(table)),
            NoiseKind::Simplex3Slice { z } => {
                Box::new(SliceNoise::new(Simplex3::with_table(table), z))
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            NoiseKind::Simplex2 => "simplex2",
            NoiseKind::Simplex3Slice { .. } => "simplex3-slice",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_matches_direct_construction() {
        let boxed = NoiseKind::Simplex2.build(123);
        let direct = Simplex2::new(123);
        assert_eq!(boxed.sample(0.4, 1.7), direct.eval(0.4, 1.7));

        let sliced = NoiseKind::Simplex3Slice { z: 2.0 }.build(123);
        assert_eq!(sliced.sample(0.4, 1.7), Simplex3::new(123).eval(0.4, 1.7, 2.0));
    }

    #[test]
    fn test_reference_forwarding() {
        let n = Simplex2::new(4);
        let r: &dyn Noise2D = &n;
        assert_eq!((&r).sample(1.0, 2.0), n.sample(1.0, 2.0));
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(NoiseKind::default().name(), "simplex2");
        assert_eq!(NoiseKind::Simplex3Slice { z: 0.0 }.name(), "simplex3-slice");
    }
}

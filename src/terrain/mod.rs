//! Heightfield generation.
//!
//! Octaves of seeded gradient noise are accumulated with slope-dependent
//! damping, then mapped into a bounded output range.

mod accumulate;
mod config;
mod heightfield;
mod normalize;
mod octave;

pub use accumulate::{damped_contribution, surface_slope, DoubleBuffer, HeightFieldAccumulator};
pub use config::{TerrainConfig, TerrainError};
pub use heightfield::HeightField;
pub use normalize::{NormalizeMode, Normalizer};
pub use octave::{erosion_octaves, fractal_octaves, resolve_offsets, OctaveSpec, OffsetMode};

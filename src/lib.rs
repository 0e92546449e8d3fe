//! Procedural terrain heightfield generator.
//!
//! Builds square heightfields by accumulating octaves of seeded OpenSimplex
//! noise, damping each octave's contribution where the terrain built so far
//! is steep. The result reads as eroded, flat-valleyed terrain and is mapped
//! into a bounded output range for rendering or further simulation.

pub mod noise;
pub mod terrain;
pub mod pipeline;
pub mod export;

pub use noise::{Noise2D, NoiseKind, PermutationTable, Simplex2, Simplex3, SliceNoise};
pub use terrain::{
    HeightField, HeightFieldAccumulator, NormalizeMode, Normalizer, OctaveSpec, OffsetMode,
    TerrainConfig, TerrainError,
};
pub use pipeline::{generate, GenerationStage, Pipeline, PipelineError};

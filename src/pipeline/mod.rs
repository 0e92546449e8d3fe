//! Pipeline module for orchestrating heightfield generation stages.
//!
//! Provides a trait-based architecture for modular generation stages
//! that can be composed into a complete generation request.

mod stage;

pub use stage::{
    generate, GenerationStage, StageId, Pipeline, PipelineError, Terrain,
    AccumulateStage, NormalizeStage,
};

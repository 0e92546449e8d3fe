//! Generation stage trait and pipeline orchestration.

use log::info;
use thiserror::Error;

use crate::terrain::{HeightField, HeightFieldAccumulator, TerrainConfig, TerrainError};

/// Unique identifier for generation stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageId {
    /// Slope-damped octave accumulation.
    Accumulate,
    /// Mapping into the output range.
    Normalize,
}

impl StageId {
    /// Returns the name of the stage.
    pub fn name(&self) -> &'static str {
        match self {
            StageId::Accumulate => "accumulate",
            StageId::Normalize => "normalize",
        }
    }
}

/// Errors that can occur during pipeline execution.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] TerrainError),
    #[error("Stage '{0}' failed: {1}")]
    StageFailed(String, String),
    #[error("Missing dependency: stage '{0}' requires '{1}'")]
    MissingDependency(String, String),
}

/// State shared by the stages of one generation request.
#[derive(Debug, Clone)]
pub struct Terrain {
    /// Seed the request was generated with.
    pub seed: i32,
    /// Grid width and height.
    pub size: u32,
    /// Current heightfield; `None` until accumulation has run.
    pub field: Option<HeightField>,
    /// Min/max of the accumulated field before normalization.
    pub raw_range: Option<(f32, f32)>,
}

impl Terrain {
    /// Creates an empty terrain for `config`. Nothing is allocated yet.
    pub fn new(config: &TerrainConfig) -> Self {
        Self {
            seed: config.seed,
            size: config.grid_size,
            field: None,
            raw_range: None,
        }
    }

    /// Takes the finished heightfield out of the terrain.
    pub fn into_field(self) -> Option<HeightField> {
        self.field
    }
}

/// Trait for implementing generation stages.
///
/// Each stage transforms the terrain in some way, building upon previous
/// stages.
pub trait GenerationStage: Send + Sync {
    /// Returns the unique identifier for this stage.
    fn id(&self) -> StageId;

    /// Returns a human-readable name for the stage.
    fn name(&self) -> &str;

    /// Returns the stage IDs that must be executed before this stage.
    fn dependencies(&self) -> &[StageId] {
        &[]
    }

    /// Executes the generation stage, modifying the terrain in place.
    fn execute(&self, terrain: &mut Terrain, config: &TerrainConfig) -> Result<(), PipelineError>;
}

/// Orchestrates multiple generation stages into a complete pipeline.
pub struct Pipeline {
    stages: Vec<Box<dyn GenerationStage>>,
    config: TerrainConfig,
}

impl Pipeline {
    /// Creates a new empty pipeline with the given configuration.
    pub fn new(config: TerrainConfig) -> Self {
        Self {
            stages: Vec::new(),
            config,
        }
    }

    /// Accumulate followed by normalize.
    pub fn standard(config: TerrainConfig) -> Self {
        let mut pipeline = Self::new(config);
        pipeline.add_stage(AccumulateStage).add_stage(NormalizeStage);
        pipeline
    }

    /// Adds a stage to the pipeline.
    pub fn add_stage<S: GenerationStage + 'static>(&mut self, stage: S) -> &mut Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Returns the number of stages in the pipeline.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    /// Executes all stages in order on the given terrain.
    ///
    /// # Arguments
    /// * `terrain` - The terrain to generate
    ///
    /// # Returns
    /// `Ok(())` if all stages complete successfully
    pub fn run(&self, terrain: &mut Terrain) -> Result<(), PipelineError> {
        self.run_with_callbacks(terrain, |_, _, _| {}, |_, _, _| {})
    }

    /// Executes all stages with callbacks for progress reporting.
    ///
    /// The configuration is validated before the first stage starts, so an
    /// invalid request never produces a partial heightfield.
    pub fn run_with_callbacks<F1, F2>(
        &self,
        terrain: &mut Terrain,
        mut on_stage_start: F1,
        mut on_stage_complete: F2,
    ) -> Result<(), PipelineError>
    where
        F1: FnMut(&str, usize, usize),
        F2: FnMut(&str, usize, usize),
    {
        self.config.validate()?;

        let total = self.stages.len();
        let mut completed: Vec<StageId> = Vec::new();

        for (i, stage) in self.stages.iter().enumerate() {
            on_stage_start(stage.name(), i, total);

            for dep in stage.dependencies() {
                if !completed.contains(dep) {
                    return Err(PipelineError::MissingDependency(
                        stage.name().to_string(),
                        dep.name().to_string(),
                    ));
                }
            }

            stage.execute(terrain, &self.config)?;
            completed.push(stage.id());

            on_stage_complete(stage.name(), i, total);
        }

        Ok(())
    }
}

/// Octave accumulation stage.
pub struct AccumulateStage;

impl GenerationStage for AccumulateStage {
    fn id(&self) -> StageId {
        StageId::Accumulate
    }

    fn name(&self) -> &str {
        "Octave Accumulation"
    }

    fn execute(&self, terrain: &mut Terrain, config: &TerrainConfig) -> Result<(), PipelineError> {
        // The config is authoritative for seed and grid size.
        terrain.seed = config.seed;
        terrain.size = config.grid_size;

        let accumulator = HeightFieldAccumulator::new(config.grid_size, config.gradient_factor)?;
        let octaves = config.resolved_octaves();
        let noise = config.noise.build(config.seed);

        info!(
            "accumulating {} octaves of {} noise on a {}x{} grid (seed {})",
            octaves.len(),
            config.noise.name(),
            config.grid_size,
            config.grid_size,
            config.seed
        );

        let field = accumulator.accumulate(&octaves, &*noise)?;
        terrain.raw_range = Some(field.height_range());
        terrain.field = Some(field);
        Ok(())
    }
}

/// Output range normalization stage.
pub struct NormalizeStage;

impl GenerationStage for NormalizeStage {
    fn id(&self) -> StageId {
        StageId::Normalize
    }

    fn name(&self) -> &str {
        "Normalization"
    }

    fn dependencies(&self) -> &[StageId] {
        &[StageId::Accumulate]
    }

    fn execute(&self, terrain: &mut Terrain, config: &TerrainConfig) -> Result<(), PipelineError> {
        let field = terrain.field.as_mut().ok_or_else(|| {
            PipelineError::StageFailed(self.name().to_string(), "no heightfield to normalize".to_string())
        })?;
        config.normalizer.apply(field);
        Ok(())
    }
}

/// Runs the standard pipeline for `config` and returns the normalized heightfield.
///
/// # Arguments
/// * `config` - The generation request
///
/// # Returns
/// The normalized heightfield, or a [`PipelineError`] if the configuration
/// is rejected or a stage fails
pub fn generate(config: TerrainConfig) -> Result<HeightField, PipelineError> {
    let mut terrain = Terrain::new(&config);
    Pipeline::standard(config).run(&mut terrain)?;
    terrain.into_field().ok_or_else(|| {
        PipelineError::StageFailed(StageId::Accumulate.name().to_string(), "no heightfield produced".to_string())
    })
}

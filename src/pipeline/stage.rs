//! Build stage trait and pipeline orchestration.

use thiserror::Error;
use tracing::{debug, info};

use crate::normals::{generate_normal_map, NormalMap};
use crate::terrain::{
    assemble_terrain, normalize, validate_terrain_shape, Grid, RangeStats, TerrainConfig,
    TerrainData, TerrainError,
};

/// Unique identifier for build stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageId {
    /// Shape contract and configuration checks.
    Validate,
    /// Range statistics and normalization into `[0, 1]`.
    Normalize,
    /// Surface normals and normal map encoding.
    NormalMap,
    /// Terrain metadata assembly.
    Assemble,
}

impl StageId {
    /// Returns the name of the stage.
    pub fn name(&self) -> &'static str {
        match self {
            StageId::Validate => "validate",
            StageId::Normalize => "normalize",
            StageId::NormalMap => "normal-map",
            StageId::Assemble => "assemble",
        }
    }
}

/// Configuration passed to each build stage.
#[derive(Debug, Clone, Default)]
pub struct StageConfig {
    pub terrain: TerrainConfig,
    /// Base color texture reference recorded on the terrain.
    pub base_texture: Option<String>,
}

impl StageConfig {
    pub fn new(terrain: TerrainConfig) -> Self {
        Self {
            terrain,
            base_texture: None,
        }
    }

    pub fn with_base_texture(mut self, base_texture: impl Into<String>) -> Self {
        self.base_texture = Some(base_texture.into());
        self
    }
}

/// State threaded through the stages of one terrain build.
#[derive(Debug, Clone)]
pub struct TerrainJob {
    /// Decoded heights; never modified by the pipeline.
    pub raw: Grid,
    pub stats: Option<RangeStats>,
    pub normalized: Option<Grid>,
    pub normal_map: Option<NormalMap>,
    pub terrain: Option<TerrainData>,
}

impl TerrainJob {
    pub fn new(raw: Grid) -> Self {
        Self {
            raw,
            stats: None,
            normalized: None,
            normal_map: None,
            terrain: None,
        }
    }

    /// Consumes the job, returning the assembled terrain if that stage ran.
    pub fn into_terrain(self) -> Option<TerrainData> {
        self.terrain
    }
}

/// Errors that can occur during pipeline execution.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Stage '{stage}' failed: {source}")]
    StageFailed {
        stage: String,
        #[source]
        source: TerrainError,
    },
    #[error("Missing dependency: stage '{0}' requires '{1}'")]
    MissingDependency(String, String),
}

impl PipelineError {
    fn stage(id: StageId) -> impl FnOnce(TerrainError) -> PipelineError {
        move |source| PipelineError::StageFailed {
            stage: id.name().to_string(),
            source,
        }
    }
}

/// Trait for implementing build stages.
///
/// Each stage reads what earlier stages left on the [`TerrainJob`] and adds
/// its own output.
pub trait BuildStage: Send + Sync {
    /// Returns the unique identifier for this stage.
    fn id(&self) -> StageId;

    /// Returns a human-readable name for the stage.
    fn name(&self) -> &str;

    /// Returns the stage IDs that must be executed before this stage.
    fn dependencies(&self) -> &[StageId] {
        &[]
    }

    /// Executes the stage, updating the job in place.
    fn execute(&self, job: &mut TerrainJob, config: &StageConfig) -> Result<(), PipelineError>;
}

/// Orchestrates build stages into a complete terrain build.
pub struct Pipeline {
    stages: Vec<Box<dyn BuildStage>>,
    config: StageConfig,
}

impl Pipeline {
    /// Creates a new empty pipeline with the given configuration.
    pub fn new(config: StageConfig) -> Self {
        Self {
            stages: Vec::new(),
            config,
        }
    }

    /// Validate, normalize, optionally generate the normal map, assemble.
    pub fn standard(config: StageConfig, with_normal_map: bool) -> Self {
        let mut pipeline = Self::new(config);
        pipeline.add_stage(ValidateStage).add_stage(NormalizeStage);
        if with_normal_map {
            pipeline.add_stage(NormalMapStage);
        }
        pipeline.add_stage(AssembleStage);
        pipeline
    }

    /// Adds a stage to the pipeline.
    pub fn add_stage<S: BuildStage + 'static>(&mut self, stage: S) -> &mut Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Returns the number of stages in the pipeline.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    /// Executes all stages in order on the given job.
    pub fn run(&self, job: &mut TerrainJob) -> Result<(), PipelineError> {
        self.run_with_callbacks(job, |_, _, _| {}, |_, _, _| {})
    }

    /// Executes all stages with progress callbacks.
    ///
    /// # Arguments
    /// * `job` - The terrain build to advance
    /// * `on_stage_start` - Called when each stage begins
    /// * `on_stage_complete` - Called when each stage finishes
    pub fn run_with_callbacks<F1, F2>(
        &self,
        job: &mut TerrainJob,
        mut on_stage_start: F1,
        mut on_stage_complete: F2,
    ) -> Result<(), PipelineError>
    where
        F1: FnMut(&str, usize, usize),
        F2: FnMut(&str, usize, usize),
    {
        let total = self.stages.len();
        let mut completed: Vec<StageId> = Vec::new();

        for (i, stage) in self.stages.iter().enumerate() {
            on_stage_start(stage.name(), i, total);

            for dep in stage.dependencies() {
                if !completed.contains(dep) {
                    return Err(PipelineError::MissingDependency(
                        stage.id().name().to_string(),
                        dep.name().to_string(),
                    ));
                }
            }

            debug!(stage = stage.id().name(), "running stage");
            stage.execute(job, &self.config)?;
            completed.push(stage.id());

            on_stage_complete(stage.name(), i, total);
        }

        Ok(())
    }
}

/// Checks the terrain shape contract before any other work.
pub struct ValidateStage;

impl BuildStage for ValidateStage {
    fn id(&self) -> StageId {
        StageId::Validate
    }

    fn name(&self) -> &str {
        "Shape Validation"
    }

    fn execute(&self, job: &mut TerrainJob, config: &StageConfig) -> Result<(), PipelineError> {
        validate_terrain_shape(&job.raw).map_err(PipelineError::stage(self.id()))?;
        config.terrain.validate().map_err(PipelineError::stage(self.id()))
    }
}

/// Computes the height range and the normalized heightfield.
pub struct NormalizeStage;

impl BuildStage for NormalizeStage {
    fn id(&self) -> StageId {
        StageId::Normalize
    }

    fn name(&self) -> &str {
        "Normalization"
    }

    fn execute(&self, job: &mut TerrainJob, config: &StageConfig) -> Result<(), PipelineError> {
        let stats = RangeStats::compute(&job.raw).map_err(PipelineError::stage(self.id()))?;
        let normalized = normalize(&job.raw, &stats, config.terrain.flat_policy)
            .map_err(PipelineError::stage(self.id()))?;

        info!(min = stats.min, max = stats.max, range = stats.range, "height range");
        job.stats = Some(stats);
        job.normalized = Some(normalized);
        Ok(())
    }
}

/// Generates the normal map from the raw heights and the pixel spacing.
pub struct NormalMapStage;

impl BuildStage for NormalMapStage {
    fn id(&self) -> StageId {
        StageId::NormalMap
    }

    fn name(&self) -> &str {
        "Normal Map Generation"
    }

    fn execute(&self, job: &mut TerrainJob, config: &StageConfig) -> Result<(), PipelineError> {
        let map = generate_normal_map(&job.raw, config.terrain.spacing)
            .map_err(PipelineError::stage(self.id()))?;
        job.normal_map = Some(map);
        Ok(())
    }
}

/// Wraps the normalized heights and normal map into [`TerrainData`].
pub struct AssembleStage;

impl BuildStage for AssembleStage {
    fn id(&self) -> StageId {
        StageId::Assemble
    }

    fn name(&self) -> &str {
        "Terrain Assembly"
    }

    fn dependencies(&self) -> &[StageId] {
        &[StageId::Validate, StageId::Normalize]
    }

    fn execute(&self, job: &mut TerrainJob, config: &StageConfig) -> Result<(), PipelineError> {
        // Cloned so a failed assembly leaves the normalized heights on the job.
        let (Some(heights), Some(stats)) = (job.normalized.clone(), job.stats) else {
            return Err(PipelineError::MissingDependency(
                self.id().name().to_string(),
                StageId::Normalize.name().to_string(),
            ));
        };

        let terrain = assemble_terrain(
            heights,
            stats,
            &config.terrain,
            config.base_texture.as_deref(),
            job.normal_map.clone(),
        )
        .map_err(PipelineError::stage(self.id()))?;

        job.terrain = Some(terrain);
        Ok(())
    }
}

//! Pipeline module for orchestrating terrain build stages.
//!
//! Provides a trait-based architecture for the validate, normalize,
//! normal map and assemble steps of a terrain build.

mod stage;

pub use stage::{
    BuildStage, StageId, StageConfig, Pipeline, PipelineError, TerrainJob,
    ValidateStage, NormalizeStage, NormalMapStage, AssembleStage,
};

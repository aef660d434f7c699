//! Frame-based heightmap terrain simulation.
//!
//! A pipeline starts from a generated frame-0 terrain (noise or analytic
//! shape) and produces each following frame by applying the erosion jobs
//! scheduled over it, in creation order, to a single in-place grid.

pub mod config;
pub mod erosion;
pub mod export;
pub mod noise;
pub mod pipeline;
pub mod terrain;

pub use config::{decode_pipeline, DecodeError};
pub use erosion::{ErosionEngine, ErosionParams, ErosionStats};
pub use noise::{FractalNoiseConfig, PerlinNoise};
pub use pipeline::{
    execute, validate, JobConfig, PipelineConfig, Simulation, SimulationError, SimulationJob,
    ValidationResult,
};
pub use terrain::{Grid, TerrainConfig, TerrainError, TerrainMethod};

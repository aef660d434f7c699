//! Simulation jobs and the pipeline configuration that owns them.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::erosion::{ErosionParams, MAX_EROSION_RADIUS};
use crate::terrain::TerrainConfig;

/// A job parameter outside its accepted range.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    #[error("{name} must be between {min} and {max} (got {value})")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("{0} must be a finite number")]
    NonFinite(&'static str),
}

fn check_range(name: &'static str, value: f64, min: f64, max: f64) -> Result<(), ParameterError> {
    if !value.is_finite() {
        return Err(ParameterError::NonFinite(name));
    }
    if value < min || value > max {
        return Err(ParameterError::OutOfRange { name, value, min, max });
    }
    Ok(())
}

/// Hydraulic erosion job parameters, as they appear on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HydraulicErosionConfig {
    pub num_particles: u32,
    pub erosion_rate: f32,
    pub deposition_rate: f32,
    pub evaporation_rate: f32,
    pub sediment_capacity: f32,
    /// Capacity floor (maps to the engine's minimum sediment capacity).
    pub min_slope: f32,
    pub inertia: f32,
    pub gravity: f32,
    pub max_lifetime: u32,
    pub initial_water: f32,
    pub initial_speed: f32,
    pub erosion_radius: u32,
    pub max_droplet_speed: f32,
    /// Fixes spawn sampling; when absent each application draws fresh entropy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for HydraulicErosionConfig {
    fn default() -> Self {
        Self {
            num_particles: 10_000,
            erosion_rate: 0.3,
            deposition_rate: 0.3,
            evaporation_rate: 0.01,
            sediment_capacity: 4.0,
            min_slope: 0.01,
            inertia: 0.05,
            gravity: 4.0,
            max_lifetime: 30,
            initial_water: 1.0,
            initial_speed: 0.0,
            erosion_radius: 3,
            max_droplet_speed: 10.0,
            seed: None,
        }
    }
}

impl HydraulicErosionConfig {
    /// Checks every parameter that would change the simulation's correctness.
    pub fn validate(&self) -> Result<(), ParameterError> {
        check_range("erosionRadius", self.erosion_radius as f64, 1.0, MAX_EROSION_RADIUS as f64)?;
        check_range("erosionRate", self.erosion_rate as f64, 0.0, 1.0)?;
        check_range("depositionRate", self.deposition_rate as f64, 0.0, 1.0)?;
        check_range("evaporationRate", self.evaporation_rate as f64, 0.0, 1.0)?;
        check_range("inertia", self.inertia as f64, 0.0, 1.0)?;
        check_range("sedimentCapacity", self.sediment_capacity as f64, 0.0, f64::MAX)?;
        check_range("minSlope", self.min_slope as f64, 0.0, f64::MAX)?;
        check_range("gravity", self.gravity as f64, 0.0, f64::MAX)?;
        check_range("initialWater", self.initial_water as f64, 0.0, f64::MAX)?;
        check_range("initialSpeed", self.initial_speed as f64, 0.0, f64::MAX)?;
        check_range("maxDropletSpeed", self.max_droplet_speed as f64, 0.0, f64::MAX)?;
        Ok(())
    }

    /// Maps wire fields onto engine parameters.
    pub fn to_params(&self) -> ErosionParams {
        ErosionParams {
            max_iterations: self.max_lifetime,
            inertia: self.inertia,
            sediment_capacity_factor: self.sediment_capacity,
            min_sediment_capacity: self.min_slope,
            erode_speed: self.erosion_rate,
            deposit_speed: self.deposition_rate,
            evaporate_speed: self.evaporation_rate,
            gravity: self.gravity,
            max_droplet_speed: self.max_droplet_speed,
            erosion_radius: self.erosion_radius,
            initial_water: self.initial_water,
            initial_speed: self.initial_speed,
        }
    }
}

/// Thermal erosion job parameters. Carried by the model; not simulated yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThermalErosionConfig {
    /// Angle of repose in radians.
    pub talus_angle: f32,
    pub transfer_rate: f32,
    pub iterations: u32,
}

impl Default for ThermalErosionConfig {
    fn default() -> Self {
        Self {
            talus_angle: 0.7,
            transfer_rate: 0.5,
            iterations: 100,
        }
    }
}

impl ThermalErosionConfig {
    pub fn validate(&self) -> Result<(), ParameterError> {
        check_range("talusAngle", self.talus_angle as f64, 0.0, std::f64::consts::FRAC_PI_2)?;
        check_range("transferRate", self.transfer_rate as f64, 0.0, 1.0)?;
        Ok(())
    }
}

/// The effect a job applies, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "config", rename_all = "lowercase")]
pub enum JobConfig {
    Hydraulic(HydraulicErosionConfig),
    Thermal(ThermalErosionConfig),
}

impl JobConfig {
    /// Wire tag of this job kind.
    pub fn kind(&self) -> &'static str {
        match self {
            JobConfig::Hydraulic(_) => "hydraulic",
            JobConfig::Thermal(_) => "thermal",
        }
    }

    pub fn validate(&self) -> Result<(), ParameterError> {
        match self {
            JobConfig::Hydraulic(c) => c.validate(),
            JobConfig::Thermal(c) => c.validate(),
        }
    }
}

/// One effect applied over an inclusive, 1-based frame range.
///
/// `creation_index` is fixed when the job is built and decides execution
/// order among jobs active on the same frame; where the job sits in its
/// container never matters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationJob {
    pub id: String,
    pub name: String,
    pub start_frame: i32,
    pub end_frame: i32,
    pub enabled: bool,
    creation_index: u64,
    #[serde(flatten)]
    pub config: JobConfig,
}

impl SimulationJob {
    /// An enabled job.
    pub fn new(
        creation_index: u64,
        id: impl Into<String>,
        name: impl Into<String>,
        frames: RangeInclusive<i32>,
        config: JobConfig,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            start_frame: *frames.start(),
            end_frame: *frames.end(),
            enabled: true,
            creation_index,
            config,
        }
    }

    /// Builder-style toggle of the enabled flag.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn creation_index(&self) -> u64 {
        self.creation_index
    }

    /// True when the job is enabled and `frame` is inside its range.
    pub fn is_active_on(&self, frame: i32) -> bool {
        self.enabled && self.start_frame <= frame && frame <= self.end_frame
    }
}

/// A complete simulation request: frame count, frame-0 generator, jobs.
///
/// Immutable once built; editing means building a new configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
    total_frames: i32,
    step0: TerrainConfig,
    jobs: Vec<SimulationJob>,
}

impl PipelineConfig {
    pub fn new(total_frames: i32, step0: TerrainConfig, jobs: Vec<SimulationJob>) -> Self {
        Self {
            total_frames,
            step0,
            jobs,
        }
    }

    /// Starts a builder that hands out creation indices in call order.
    pub fn builder(total_frames: i32, step0: TerrainConfig) -> PipelineBuilder {
        PipelineBuilder {
            total_frames,
            step0,
            jobs: Vec::new(),
        }
    }

    pub fn total_frames(&self) -> i32 {
        self.total_frames
    }

    pub fn step0(&self) -> &TerrainConfig {
        &self.step0
    }

    pub fn jobs(&self) -> &[SimulationJob] {
        &self.jobs
    }

    /// Serializes back to the wire shape.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Incrementally assembles a [`PipelineConfig`].
#[derive(Debug, Clone)]
pub struct PipelineBuilder {
    total_frames: i32,
    step0: TerrainConfig,
    jobs: Vec<SimulationJob>,
}

impl PipelineBuilder {
    /// Appends an enabled job; its creation index is the number of jobs added before it.
    pub fn add_job(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        frames: RangeInclusive<i32>,
        config: JobConfig,
    ) -> &mut SimulationJob {
        let index = self.jobs.len() as u64;
        self.jobs.push(SimulationJob::new(index, id, name, frames, config));
        let last = self.jobs.len() - 1;
        &mut self.jobs[last]
    }

    pub fn build(self) -> PipelineConfig {
        PipelineConfig::new(self.total_frames, self.step0, self.jobs)
    }
}

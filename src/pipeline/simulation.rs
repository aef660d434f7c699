//! End-to-end driver: decode, validate, generate frame 0, execute.

use thiserror::Error;

use crate::config::{decode_pipeline, DecodeError};
use crate::terrain::{Grid, TerrainError};

use super::executor::{execute, ExecutionObserver, ExecutionReport};
use super::validate::{validate, ValidationResult};
use super::{PipelineConfig, SimulationJob};

/// Errors that stop a simulation before any frame executes.
#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("configuration error: {0}")]
    Decode(#[from] DecodeError),
    #[error("initial terrain error: {0}")]
    Terrain(#[from] TerrainError),
    #[error("pipeline is not executable: {} errors, {} uncovered frames", .0.errors.len(), .0.uncovered_frames.len())]
    NotExecutable(ValidationResult),
}

/// Receives frame states as the simulation produces them, frame 0 first.
pub trait FrameSink {
    fn accept(&mut self, frame: i32, grid: &Grid);
}

/// Keeps every frame.
impl FrameSink for Vec<Grid> {
    fn accept(&mut self, _frame: i32, grid: &Grid) {
        self.push(grid.clone());
    }
}

/// Keeps only the most recent frame.
#[derive(Debug, Clone, Default)]
pub struct LastFrame {
    pub frame: Option<(i32, Grid)>,
}

impl FrameSink for LastFrame {
    fn accept(&mut self, frame: i32, grid: &Grid) {
        match &mut self.frame {
            Some((index, last)) => {
                *index = frame;
                last.clone_from(grid);
            }
            None => self.frame = Some((frame, grid.clone())),
        }
    }
}

/// Wraps a closure as a [`FrameSink`].
pub struct FnSink<F>(pub F);

impl<F: FnMut(i32, &Grid)> FrameSink for FnSink<F> {
    fn accept(&mut self, frame: i32, grid: &Grid) {
        (self.0)(frame, grid);
    }
}

/// Discards every frame.
impl FrameSink for () {
    fn accept(&mut self, _frame: i32, _grid: &Grid) {}
}

struct SinkObserver<'a, S: ?Sized>(&'a mut S);

impl<S: FrameSink + ?Sized> ExecutionObserver for SinkObserver<'_, S> {
    fn on_job_start(&mut self, job: &SimulationJob, frame: i32) {
        log::trace!("frame {}: starting '{}' ({})", frame, job.name, job.config.kind());
    }

    fn on_frame(&mut self, frame: i32, grid: &Grid) {
        self.0.accept(frame, grid);
    }
}

/// A validated pipeline ready to run.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: PipelineConfig,
    validation: ValidationResult,
}

impl Simulation {
    /// Decodes and validates a JSON pipeline description.
    pub fn from_json(json: &str) -> Result<Self, SimulationError> {
        let config = decode_pipeline(json)?;
        Self::new(config)
    }

    /// Validates `config`, refusing it when a frame is uncovered or a job
    /// range is malformed. Overlaps are logged and accepted.
    pub fn new(config: PipelineConfig) -> Result<Self, SimulationError> {
        let validation = validate(config.total_frames(), config.jobs());
        for warning in &validation.warnings {
            log::warn!("{}", warning);
        }
        if !validation.is_valid {
            return Err(SimulationError::NotExecutable(validation));
        }
        config.step0().validate()?;
        Ok(Self { config, validation })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn validation(&self) -> &ValidationResult {
        &self.validation
    }

    /// Builds frame 0 from the step-0 configuration.
    pub fn initial_terrain(&self, width: u32, height: u32) -> Result<Grid, TerrainError> {
        self.config.step0().generate(width, height)
    }

    /// Generates frame 0 and runs every frame, returning the final grid.
    pub fn run<S: FrameSink + ?Sized>(
        &self,
        width: u32,
        height: u32,
        sink: &mut S,
    ) -> Result<(Grid, ExecutionReport), SimulationError> {
        let mut grid = self.initial_terrain(width, height)?;
        let report = self.run_on(&mut grid, sink);
        Ok((grid, report))
    }

    /// Runs every frame over a caller-supplied frame 0.
    pub fn run_on<S: FrameSink + ?Sized>(&self, grid: &mut Grid, sink: &mut S) -> ExecutionReport {
        log::info!(
            "simulating {} frames on {}x{} grid with {} jobs",
            self.config.total_frames(),
            grid.width(),
            grid.height(),
            self.config.jobs().len()
        );
        sink.accept(0, grid);
        execute(&self.config, grid, SinkObserver(sink))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{JobConfig, ThermalErosionConfig};
    use crate::terrain::{TerrainConfig, TerrainMethod};

    fn flat_config(total_frames: i32, frames: std::ops::RangeInclusive<i32>) -> PipelineConfig {
        let mut step0 = TerrainConfig::new(TerrainMethod::Flat);
        step0.height = 2.0;
        let mut builder = PipelineConfig::builder(total_frames, step0);
        builder.add_job("t", "Thermal", frames, JobConfig::Thermal(ThermalErosionConfig::default()));
        builder.build()
    }

    #[test]
    fn test_refuses_uncovered_pipeline() {
        let err = Simulation::new(flat_config(4, 1..=2)).unwrap_err();
        match err {
            SimulationError::NotExecutable(result) => assert_eq!(result.uncovered_frames, vec![3, 4]),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_collects_every_frame() {
        let simulation = Simulation::new(flat_config(3, 1..=3)).unwrap();
        let mut frames: Vec<Grid> = Vec::new();
        let (last, report) = simulation.run(8, 8, &mut frames).unwrap();

        assert_eq!(frames.len(), 4);
        assert_eq!(report.frames_executed, 3);
        assert!(frames.iter().all(|grid| grid == &last));
        assert_eq!(last.get(3, 3), 2.0);
    }

    #[test]
    fn test_last_frame_sink() {
        let simulation = Simulation::new(flat_config(5, 1..=5)).unwrap();
        let mut sink = LastFrame::default();
        simulation.run(6, 6, &mut sink).unwrap();
        let (frame, grid) = sink.frame.unwrap();
        assert_eq!(frame, 5);
        assert_eq!(grid.width(), 6);
    }

    #[test]
    fn test_closure_sink_sees_frames_in_order() {
        let simulation = Simulation::new(flat_config(3, 1..=3)).unwrap();
        let mut seen = Vec::new();
        simulation
            .run(4, 4, &mut FnSink(|frame: i32, _: &Grid| seen.push(frame)))
            .unwrap();
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_bad_grid_size_is_terrain_error() {
        let simulation = Simulation::new(flat_config(1, 1..=1)).unwrap();
        let err = simulation.run(0, 4, &mut ()).unwrap_err();
        assert!(matches!(err, SimulationError::Terrain(_)));
    }
}

//! Simulation pipeline: jobs over frame ranges, coverage validation and
//! frame-by-frame execution.
//!
//! Frame 0 is the initial terrain. Frames `1..=total_frames` are produced in
//! strict order, each by applying the enabled jobs covering it in creation
//! order to the previous frame's grid.

mod executor;
mod job;
mod simulation;
mod validate;

pub use executor::{
    execute, execute_frame, execute_with_callbacks, jobs_for_frame, ExecutionObserver,
    ExecutionReport,
};
pub use job::{
    HydraulicErosionConfig, JobConfig, ParameterError, PipelineBuilder, PipelineConfig,
    SimulationJob, ThermalErosionConfig,
};
pub use simulation::{FnSink, FrameSink, LastFrame, Simulation, SimulationError};
pub use validate::{validate, ValidationResult};

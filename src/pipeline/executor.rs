//! Frame-by-frame job execution.

use crate::erosion::{ErosionEngine, ErosionStats};
use crate::terrain::Grid;

use super::{HydraulicErosionConfig, JobConfig, PipelineConfig, SimulationJob};

/// Hooks fired while frames execute. Every method defaults to a no-op.
pub trait ExecutionObserver {
    /// Called before `job` is applied on `frame`.
    fn on_job_start(&mut self, _job: &SimulationJob, _frame: i32) {}

    /// Called after `job` has been applied on `frame`.
    fn on_job_end(&mut self, _job: &SimulationJob, _frame: i32) {}

    /// Called once every job for `frame` has run, with the grid as it now stands.
    fn on_frame(&mut self, _frame: i32, _grid: &Grid) {}
}

impl ExecutionObserver for () {}

impl<O: ExecutionObserver + ?Sized> ExecutionObserver for &mut O {
    fn on_job_start(&mut self, job: &SimulationJob, frame: i32) {
        (**self).on_job_start(job, frame);
    }

    fn on_job_end(&mut self, job: &SimulationJob, frame: i32) {
        (**self).on_job_end(job, frame);
    }

    fn on_frame(&mut self, frame: i32, grid: &Grid) {
        (**self).on_frame(frame, grid);
    }
}

/// Adapts three closures to [`ExecutionObserver`].
struct Callbacks<F, S, E> {
    on_frame: F,
    on_job_start: S,
    on_job_end: E,
}

impl<F, S, E> ExecutionObserver for Callbacks<F, S, E>
where
    F: FnMut(i32, &Grid),
    S: FnMut(&SimulationJob, i32),
    E: FnMut(&SimulationJob, i32),
{
    fn on_job_start(&mut self, job: &SimulationJob, frame: i32) {
        (self.on_job_start)(job, frame);
    }

    fn on_job_end(&mut self, job: &SimulationJob, frame: i32) {
        (self.on_job_end)(job, frame);
    }

    fn on_frame(&mut self, frame: i32, grid: &Grid) {
        (self.on_frame)(frame, grid);
    }
}

/// Totals over one or more executed frames.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionReport {
    pub frames_executed: u32,
    /// Jobs applied, counted once per frame they ran on.
    pub job_applications: u32,
    /// Applications of job kinds that have no simulation yet.
    pub skipped_applications: u32,
    pub erosion: ErosionStats,
}

impl ExecutionReport {
    fn merge(&mut self, other: &ExecutionReport) {
        self.frames_executed += other.frames_executed;
        self.job_applications += other.job_applications;
        self.skipped_applications += other.skipped_applications;
        self.erosion.merge(&other.erosion);
    }
}

/// Enabled jobs covering `frame`, in creation order.
///
/// Position in `jobs` is irrelevant; only the creation index decides order.
pub fn jobs_for_frame(jobs: &[SimulationJob], frame: i32) -> Vec<&SimulationJob> {
    let mut active: Vec<&SimulationJob> = jobs.iter().filter(|job| job.is_active_on(frame)).collect();
    active.sort_by_key(|job| job.creation_index());
    active
}

/// Runs frames `1..=total_frames` over `grid`, which holds frame 0 on entry
/// and the last frame on return.
///
/// Frames run strictly in order; each job on a frame sees the output of the
/// job before it.
pub fn execute<O: ExecutionObserver>(
    config: &PipelineConfig,
    grid: &mut Grid,
    mut observer: O,
) -> ExecutionReport {
    let mut report = ExecutionReport::default();
    for frame in 1..=config.total_frames() {
        let frame_report = execute_frame(config, frame, grid, &mut observer);
        report.merge(&frame_report);
    }
    log::info!(
        "executed {} frames ({} job applications, {} skipped)",
        report.frames_executed,
        report.job_applications,
        report.skipped_applications
    );
    report
}

/// [`execute`] with plain closures for the frame and job hooks.
pub fn execute_with_callbacks<F, S, E>(
    config: &PipelineConfig,
    grid: &mut Grid,
    on_frame: F,
    on_job_start: S,
    on_job_end: E,
) -> ExecutionReport
where
    F: FnMut(i32, &Grid),
    S: FnMut(&SimulationJob, i32),
    E: FnMut(&SimulationJob, i32),
{
    execute(
        config,
        grid,
        Callbacks {
            on_frame,
            on_job_start,
            on_job_end,
        },
    )
}

/// Applies every job active on `frame` to `grid`, then notifies the observer.
///
/// Used directly for incremental playback; [`execute`] calls it once per frame.
pub fn execute_frame<O: ExecutionObserver>(
    config: &PipelineConfig,
    frame: i32,
    grid: &mut Grid,
    mut observer: O,
) -> ExecutionReport {
    let mut report = ExecutionReport {
        frames_executed: 1,
        ..Default::default()
    };

    for job in jobs_for_frame(config.jobs(), frame) {
        observer.on_job_start(job, frame);
        match apply_job(job, frame, grid) {
            Some(stats) => report.erosion.merge(&stats),
            None => report.skipped_applications += 1,
        }
        report.job_applications += 1;
        observer.on_job_end(job, frame);
    }

    log::info!(
        "frame {}/{} done ({} jobs)",
        frame,
        config.total_frames(),
        report.job_applications
    );
    observer.on_frame(frame, grid);
    report
}

/// Returns `None` for job kinds that are modelled but not simulated.
fn apply_job(job: &SimulationJob, frame: i32, grid: &mut Grid) -> Option<ErosionStats> {
    match &job.config {
        JobConfig::Hydraulic(config) => {
            log::debug!(
                "frame {}: hydraulic job '{}' with {} particles",
                frame,
                job.name,
                config.num_particles
            );
            let mut engine = hydraulic_engine(config, job, frame);
            Some(engine.erode(grid, config.num_particles))
        }
        JobConfig::Thermal(_) => {
            log::debug!("frame {}: thermal job '{}' has no simulation, skipping", frame, job.name);
            None
        }
    }
}

/// A seeded job gets a distinct, reproducible stream per frame and job.
fn hydraulic_engine(config: &HydraulicErosionConfig, job: &SimulationJob, frame: i32) -> ErosionEngine {
    let params = config.to_params();
    match config.seed {
        Some(seed) => {
            let stream = (frame as u64)
                .wrapping_mul(0x9E37_79B9_7F4A_7C15)
                .wrapping_add(job.creation_index().rotate_left(32));
            ErosionEngine::with_seed(params, seed ^ stream)
        }
        None => ErosionEngine::new(params),
    }
}

//! Frame coverage and job range validation.

use serde::Serialize;

use super::SimulationJob;

/// Outcome of [`validate`]. Data, not an error: the caller decides whether to
/// refuse execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    /// Frames in `1..=total_frames` no enabled job produces, ascending.
    pub uncovered_frames: Vec<i32>,
    /// Overlap reports. Informational only.
    pub warnings: Vec<String>,
    /// Range violations.
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Checks job ranges, frame coverage and overlaps for a `total_frames` run.
///
/// Frame 0 is the initial terrain and is never checked. Range errors are
/// reported for every job, enabled or not; when any exist, coverage is not
/// computed. Only enabled jobs contribute coverage or overlap warnings.
pub fn validate(total_frames: i32, jobs: &[SimulationJob]) -> ValidationResult {
    let mut errors = range_errors(total_frames, jobs);

    let uncovered_frames = if errors.is_empty() {
        uncovered_frames(total_frames, jobs)
    } else {
        Vec::new()
    };
    if total_frames < 1 {
        errors.insert(0, format!("totalFrames must be >= 1 (got {})", total_frames));
    }

    let warnings = overlap_warnings(jobs);
    let is_valid = errors.is_empty() && uncovered_frames.is_empty();

    ValidationResult {
        is_valid,
        uncovered_frames,
        warnings,
        errors,
    }
}

fn range_errors(total_frames: i32, jobs: &[SimulationJob]) -> Vec<String> {
    let mut errors = Vec::new();
    for job in jobs {
        if job.start_frame < 1 {
            errors.push(format!(
                "Job '{}' has invalid startFrame {} (must be >= 1)",
                job.name, job.start_frame
            ));
        }
        if job.end_frame > total_frames {
            errors.push(format!(
                "Job '{}' has endFrame {} exceeding totalFrames {}",
                job.name, job.end_frame, total_frames
            ));
        }
        if job.start_frame > job.end_frame {
            errors.push(format!(
                "Job '{}' has startFrame {} > endFrame {}",
                job.name, job.start_frame, job.end_frame
            ));
        }
    }
    errors
}

fn uncovered_frames(total_frames: i32, jobs: &[SimulationJob]) -> Vec<i32> {
    if total_frames < 1 {
        return Vec::new();
    }
    // Index 0 is frame 0 and stays unused.
    let mut covered = vec![false; total_frames as usize + 1];
    for job in jobs.iter().filter(|job| job.enabled) {
        let start = job.start_frame.max(1);
        let end = job.end_frame.min(total_frames);
        for frame in start..=end {
            covered[frame as usize] = true;
        }
    }
    (1..=total_frames)
        .filter(|&frame| !covered[frame as usize])
        .collect()
}

fn overlap_warnings(jobs: &[SimulationJob]) -> Vec<String> {
    let mut warnings = Vec::new();
    for (i, a) in jobs.iter().enumerate() {
        if !a.enabled {
            continue;
        }
        for b in jobs[i + 1..].iter().filter(|job| job.enabled) {
            let start = a.start_frame.max(b.start_frame);
            let end = a.end_frame.min(b.end_frame);
            if start <= end {
                warnings.push(format!(
                    "Jobs '{}' and '{}' overlap on frames {}-{}",
                    a.name, b.name, start, end
                ));
            }
        }
    }
    warnings
}

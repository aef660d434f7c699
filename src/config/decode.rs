//! JSON pipeline description decoding.
//!
//! Required fields are checked explicitly so a missing or mistyped field
//! names itself in the error; optional payloads go through serde with
//! per-field defaults.

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::pipeline::{
    HydraulicErosionConfig, JobConfig, ParameterError, PipelineConfig, SimulationJob,
    ThermalErosionConfig,
};
use crate::terrain::{TerrainConfig, TerrainError, TerrainMethod};

/// A pipeline description that cannot be turned into a [`PipelineConfig`].
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0} must be a JSON object")]
    NotAnObject(String),
    #[error("configuration missing required field: {0}")]
    MissingField(&'static str),
    #[error("job {index} missing required field: {field}")]
    MissingJobField { index: usize, field: &'static str },
    #[error("{field} must be {expected}")]
    WrongType { field: String, expected: &'static str },
    #[error("totalFrames must be >= 1 (got {0})")]
    TotalFramesOutOfRange(i64),
    #[error("unknown terrain method: {0}")]
    UnknownTerrainMethod(String),
    #[error("invalid step0 parameters: {0}")]
    InvalidTerrain(#[from] TerrainError),
    #[error("unknown job type: {0}")]
    UnknownJobType(String),
    #[error("job {index} has a malformed config: {source}")]
    InvalidJobConfig {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("job {index}: {source}")]
    InvalidParameter {
        index: usize,
        #[source]
        source: ParameterError,
    },
    #[error("creationIndex {0} is used by more than one job")]
    DuplicateCreationIndex(u64),
    #[error("creationIndex overflow: no index left after u64::MAX for jobs without one")]
    CreationIndexOverflow,
}

/// Parses a JSON pipeline description.
pub fn decode_pipeline(json: &str) -> Result<PipelineConfig, DecodeError> {
    let value: Value = serde_json::from_str(json)?;
    decode_value(&value)
}

/// Decodes an already-parsed JSON value.
pub fn decode_value(value: &Value) -> Result<PipelineConfig, DecodeError> {
    let root = value
        .as_object()
        .ok_or_else(|| DecodeError::NotAnObject("configuration".to_string()))?;

    let total_frames = decode_total_frames(root)?;
    let step0 = decode_step0(root.get("step0").ok_or(DecodeError::MissingField("step0"))?)?;

    let jobs = match root.get("jobs") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => decode_jobs(items)?,
        Some(_) => {
            return Err(DecodeError::WrongType {
                field: "jobs".to_string(),
                expected: "an array",
            })
        }
    };

    log::debug!("decoded pipeline: {} frames, {} jobs", total_frames, jobs.len());
    Ok(PipelineConfig::new(total_frames, step0, jobs))
}

fn decode_total_frames(root: &Map<String, Value>) -> Result<i32, DecodeError> {
    let value = root
        .get("totalFrames")
        .ok_or(DecodeError::MissingField("totalFrames"))?;
    let frames = value.as_i64().ok_or_else(|| DecodeError::WrongType {
        field: "totalFrames".to_string(),
        expected: "an integer",
    })?;
    if frames < 1 || frames > i32::MAX as i64 {
        return Err(DecodeError::TotalFramesOutOfRange(frames));
    }
    Ok(frames as i32)
}

fn decode_step0(value: &Value) -> Result<TerrainConfig, DecodeError> {
    let object = value
        .as_object()
        .ok_or_else(|| DecodeError::NotAnObject("step0".to_string()))?;
    let method = object
        .get("method")
        .ok_or(DecodeError::MissingField("step0.method"))?
        .as_str()
        .ok_or_else(|| DecodeError::WrongType {
            field: "step0.method".to_string(),
            expected: "a string",
        })?;
    method
        .parse::<TerrainMethod>()
        .map_err(|e| DecodeError::UnknownTerrainMethod(e.0))?;

    let config: TerrainConfig = serde_json::from_value(value.clone())?;
    config.validate()?;
    Ok(config)
}

/// A job before its creation index is settled.
struct PendingJob {
    explicit_index: Option<u64>,
    id: String,
    name: String,
    start_frame: i32,
    end_frame: i32,
    enabled: bool,
    config: JobConfig,
}

fn decode_jobs(items: &[Value]) -> Result<Vec<SimulationJob>, DecodeError> {
    let pending = items
        .iter()
        .enumerate()
        .map(|(index, item)| decode_job(index, item))
        .collect::<Result<Vec<_>, _>>()?;

    // Explicit indices are kept; the rest continue after the largest one, in
    // document order.
    let mut used = HashSet::new();
    for index in pending.iter().filter_map(|job| job.explicit_index) {
        if !used.insert(index) {
            return Err(DecodeError::DuplicateCreationIndex(index));
        }
    }
    let mut next = match used.iter().max() {
        Some(max) => max.checked_add(1),
        None => Some(0),
    };

    pending
        .into_iter()
        .map(|job| {
            let creation_index = match job.explicit_index {
                Some(index) => index,
                None => {
                    let index = next.ok_or(DecodeError::CreationIndexOverflow)?;
                    next = index.checked_add(1);
                    index
                }
            };
            Ok(SimulationJob::new(
                creation_index,
                job.id,
                job.name,
                job.start_frame..=job.end_frame,
                job.config,
            )
            .enabled(job.enabled))
        })
        .collect()
}

fn decode_job(index: usize, value: &Value) -> Result<PendingJob, DecodeError> {
    let object = value
        .as_object()
        .ok_or_else(|| DecodeError::NotAnObject(format!("jobs[{}]", index)))?;
    let field = |name: &'static str| {
        object
            .get(name)
            .ok_or(DecodeError::MissingJobField { index, field: name })
    };
    let wrong_type = |name: &str, expected: &'static str| DecodeError::WrongType {
        field: format!("jobs[{}].{}", index, name),
        expected,
    };
    let string = |name: &'static str| -> Result<String, DecodeError> {
        field(name)?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| wrong_type(name, "a string"))
    };
    let frame = |name: &'static str| -> Result<i32, DecodeError> {
        field(name)?
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .ok_or_else(|| wrong_type(name, "a 32-bit integer"))
    };

    let id = string("id")?;
    let name = string("name")?;
    let start_frame = frame("startFrame")?;
    let end_frame = frame("endFrame")?;
    let kind = string("type")?;
    let payload = field("config")?;
    if !payload.is_object() {
        return Err(DecodeError::NotAnObject(format!("jobs[{}].config", index)));
    }

    let config = match kind.as_str() {
        "hydraulic" => JobConfig::Hydraulic(payload_of::<HydraulicErosionConfig>(index, payload)?),
        "thermal" => JobConfig::Thermal(payload_of::<ThermalErosionConfig>(index, payload)?),
        _ => return Err(DecodeError::UnknownJobType(kind)),
    };
    config
        .validate()
        .map_err(|source| DecodeError::InvalidParameter { index, source })?;

    let enabled = match object.get("enabled") {
        None | Some(Value::Null) => true,
        Some(v) => v.as_bool().ok_or_else(|| wrong_type("enabled", "a boolean"))?,
    };
    let explicit_index = match object.get("creationIndex") {
        None | Some(Value::Null) => None,
        Some(v) => Some(v.as_u64().ok_or_else(|| wrong_type("creationIndex", "a non-negative integer"))?),
    };

    Ok(PendingJob {
        explicit_index,
        id,
        name,
        start_frame,
        end_frame,
        enabled,
        config,
    })
}

fn payload_of<T: DeserializeOwned>(index: usize, payload: &Value) -> Result<T, DecodeError> {
    serde_json::from_value(payload.clone()).map_err(|source| DecodeError::InvalidJobConfig { index, source })
}

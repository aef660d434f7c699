//! Terrain module.
//!
//! Provides the [`Grid`] heightmap every other stage operates on, the analytic
//! shape builders, and the frame-0 generator dispatch.

mod grid;
pub mod shapes;
mod step0;

use thiserror::Error;

pub use grid::Grid;
pub use step0::{TerrainConfig, TerrainMethod, UnknownMethod};

/// Errors raised while building terrain from parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TerrainError {
    #[error("grid dimensions must be non-zero (got {width}x{height})")]
    EmptyGrid { width: u32, height: u32 },
    #[error("buffer length {actual} does not match grid size {expected}")]
    BufferLength { expected: usize, actual: usize },
    #[error("{0} must be a finite number")]
    NonFinite(&'static str),
    #[error("{0} must be greater than 0 (got {1})")]
    NonPositive(&'static str, f32),
    #[error("octaves must be between 1 and 16 (got {0})")]
    OctavesOutOfRange(u32),
}

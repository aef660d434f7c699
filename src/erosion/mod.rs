//! Hydraulic erosion.
//!
//! Simulated water droplets carve material from slopes and drop it where they
//! slow down or climb. All mutation happens in place on the caller's grid.

mod brush;
mod config;
mod hydraulic;
mod particle;

pub use brush::ErosionBrush;
pub use config::{ErosionParams, MAX_EROSION_RADIUS};
pub use hydraulic::{ErosionEngine, ErosionStats, ParticleFate};
pub use particle::{Particle, MIN_WATER};

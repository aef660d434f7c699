//! Erosion configuration.

/// Largest supported erosion-kernel radius.
pub const MAX_EROSION_RADIUS: u32 = 5;

/// Tunable constants for particle-based hydraulic erosion.
///
/// Fixed for the lifetime of an [`ErosionEngine`](super::ErosionEngine).
#[derive(Debug, Clone, PartialEq)]
pub struct ErosionParams {
    /// Maximum droplet lifetime in steps.
    pub max_iterations: u32,
    /// Fraction of the previous direction kept each step (0-1).
    pub inertia: f32,
    /// Multiplier on slope * speed * water when computing capacity.
    pub sediment_capacity_factor: f32,
    /// Capacity floor, so droplets on gentle slopes still carry something.
    pub min_sediment_capacity: f32,
    /// Fraction of free capacity picked up per step (0-1).
    pub erode_speed: f32,
    /// Fraction of excess sediment dropped per step (0-1).
    pub deposit_speed: f32,
    /// Fraction of water lost per step (0-1).
    pub evaporate_speed: f32,
    /// Converts height drop into speed.
    pub gravity: f32,
    /// Speed cap.
    pub max_droplet_speed: f32,
    /// Kernel radius for erosion and deposition (1 = single cell).
    pub erosion_radius: u32,
    /// Water volume a droplet spawns with.
    pub initial_water: f32,
    /// Lower bound on the speed of a droplet's first step.
    pub initial_speed: f32,
}

impl Default for ErosionParams {
    fn default() -> Self {
        Self {
            max_iterations: 30,
            inertia: 0.05,
            sediment_capacity_factor: 4.0,
            min_sediment_capacity: 0.01,
            erode_speed: 0.3,
            deposit_speed: 0.3,
            evaporate_speed: 0.01,
            gravity: 4.0,
            max_droplet_speed: 10.0,
            erosion_radius: 3,
            initial_water: 1.0,
            initial_speed: 0.0,
        }
    }
}

impl ErosionParams {
    /// Legacy single-cell footprint.
    pub fn single_cell() -> Self {
        Self {
            erosion_radius: 1,
            ..Default::default()
        }
    }
}

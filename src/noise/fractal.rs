//! Multi-octave fractal Brownian motion (fBm) noise generation.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::perlin::PerlinNoise;
use crate::terrain::{Grid, TerrainError};

/// Upper bound on octaves; beyond this the extra layers are sub-cell noise.
pub const MAX_OCTAVES: u32 = 16;

/// Configuration for multi-octave fractal noise generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FractalNoiseConfig {
    /// Number of noise octaves (1-16).
    pub octaves: u32,
    /// Base frequency of the first octave.
    pub frequency: f32,
    /// Target amplitude envelope of the summed result.
    pub amplitude: f32,
    /// Frequency multiplier per octave (typically 2.0).
    pub lacunarity: f32,
    /// Amplitude decay per octave (0.4-0.6 typical).
    pub persistence: f32,
    /// Random seed for reproducible generation.
    pub seed: u32,
}

impl Default for FractalNoiseConfig {
    fn default() -> Self {
        Self {
            octaves: 6,
            frequency: 0.01,
            amplitude: 50.0,
            lacunarity: 2.0,
            persistence: 0.5,
            seed: 12345,
        }
    }
}

impl FractalNoiseConfig {
    /// Creates a new noise configuration with the given seed.
    pub fn with_seed(seed: u32) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    /// Rejects parameters that would corrupt output or loop pathologically.
    pub fn validate(&self) -> Result<(), TerrainError> {
        if self.octaves < 1 || self.octaves > MAX_OCTAVES {
            return Err(TerrainError::OctavesOutOfRange(self.octaves));
        }
        let positive = [
            ("frequency", self.frequency),
            ("amplitude", self.amplitude),
            ("persistence", self.persistence),
            ("lacunarity", self.lacunarity),
        ];
        for (name, value) in positive {
            if !value.is_finite() {
                return Err(TerrainError::NonFinite(name));
            }
            if value <= 0.0 {
                return Err(TerrainError::NonPositive(name, value));
            }
        }
        Ok(())
    }
}

/// Samples fBm at `(x, y)`.
///
/// Octaves are summed with frequency scaled by `lacunarity` and amplitude by
/// `persistence` per layer, then normalized by the accumulated amplitude and
/// rescaled so the result approximates `[-amplitude, amplitude]`.
pub fn sample_fbm(perlin: &PerlinNoise, x: f32, y: f32, config: &FractalNoiseConfig) -> f32 {
    let mut total = 0.0f32;
    let mut amplitude = config.amplitude;
    let mut frequency = config.frequency;
    let mut max_amplitude = 0.0f32;

    for _ in 0..config.octaves {
        total += perlin.noise(x * frequency, y * frequency) * amplitude;
        max_amplitude += amplitude;
        amplitude *= config.persistence;
        frequency *= config.lacunarity;
    }

    total / max_amplitude * config.amplitude
}

/// Builds a grid of fBm noise sampled at integer cell coordinates.
pub fn fbm_grid(width: u32, height: u32, config: &FractalNoiseConfig) -> Result<Grid, TerrainError> {
    if width == 0 || height == 0 {
        return Err(TerrainError::EmptyGrid { width, height });
    }
    config.validate()?;

    let perlin = PerlinNoise::new(config.seed);
    let mut grid = Grid::new(width, height);

    grid.cells_mut()
        .par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, cell) in row.iter_mut().enumerate() {
                *cell = sample_fbm(&perlin, x as f32, y as f32, config);
            }
        });

    Ok(grid)
}

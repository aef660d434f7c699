//! Noise generation module for terrain synthesis.
//!
//! A seeded gradient-noise generator plus its multi-octave (fBm) variant.
//! Both build grids row-parallel with rayon; every cell is a pure function of
//! its coordinates, so output does not depend on thread scheduling.

mod fractal;
mod perlin;

pub use fractal::{fbm_grid, sample_fbm, FractalNoiseConfig, MAX_OCTAVES};
pub use perlin::{perlin_grid, PerlinNoise};

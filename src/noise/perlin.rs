//! Seeded 2-D gradient (Perlin) noise.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::terrain::{Grid, TerrainError};

/// Deterministic 2-D gradient noise generator.
///
/// The 256-entry permutation table is a seeded shuffle of `0..=255`, stored
/// twice so corner hashes never need a modulo.
#[derive(Debug, Clone)]
pub struct PerlinNoise {
    perm: [u8; 512],
}

impl PerlinNoise {
    /// Builds the permutation table for `seed`.
    pub fn new(seed: u32) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed as u64);
        let mut base: Vec<u8> = (0..=255u8).collect();
        base.shuffle(&mut rng);

        let mut perm = [0u8; 512];
        for (i, &v) in base.iter().enumerate() {
            perm[i] = v;
            perm[i + 256] = v;
        }
        Self { perm }
    }

    #[inline]
    fn hash(&self, ix: i32, iy: i32) -> u8 {
        let a = self.perm[(ix & 255) as usize] as usize;
        self.perm[a + (iy & 255) as usize]
    }

    /// Improved fade curve `6t^5 - 15t^4 + 10t^3`.
    #[inline]
    pub fn fade(t: f32) -> f32 {
        t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
    }

    #[inline]
    fn lerp(t: f32, a: f32, b: f32) -> f32 {
        a + t * (b - a)
    }

    /// Dot product of the corner's gradient (one of 8 fixed directions) with
    /// the offset `(dx, dy)` from that corner.
    #[inline]
    fn grad(&self, ix: i32, iy: i32, dx: f32, dy: f32) -> f32 {
        match self.hash(ix, iy) & 7 {
            0 => dx + dy,
            1 => dx - dy,
            2 => -dx + dy,
            3 => -dx - dy,
            4 => dx,
            5 => -dx,
            6 => dy,
            _ => -dy,
        }
    }

    /// Samples noise at `(x, y)`. Output is roughly in `[-1, 1]`, not clamped.
    pub fn noise(&self, x: f32, y: f32) -> f32 {
        let ix0 = x.floor() as i32;
        let iy0 = y.floor() as i32;
        let fx = x - ix0 as f32;
        let fy = y - iy0 as f32;

        let u = Self::fade(fx);
        let v = Self::fade(fy);

        let g00 = self.grad(ix0, iy0, fx, fy);
        let g10 = self.grad(ix0.wrapping_add(1), iy0, fx - 1.0, fy);
        let g01 = self.grad(ix0, iy0.wrapping_add(1), fx, fy - 1.0);
        let g11 = self.grad(ix0.wrapping_add(1), iy0.wrapping_add(1), fx - 1.0, fy - 1.0);

        let top = Self::lerp(u, g00, g10);
        let bottom = Self::lerp(u, g01, g11);
        Self::lerp(v, top, bottom)
    }
}

/// Builds a grid of single-octave noise: each cell samples
/// `noise(x * frequency, y * frequency) * amplitude`.
pub fn perlin_grid(
    width: u32,
    height: u32,
    seed: u32,
    frequency: f32,
    amplitude: f32,
) -> Result<Grid, TerrainError> {
    if width == 0 || height == 0 {
        return Err(TerrainError::EmptyGrid { width, height });
    }
    if !frequency.is_finite() {
        return Err(TerrainError::NonFinite("frequency"));
    }
    if frequency <= 0.0 {
        return Err(TerrainError::NonPositive("frequency", frequency));
    }
    if !amplitude.is_finite() {
        return Err(TerrainError::NonFinite("amplitude"));
    }

    let perlin = PerlinNoise::new(seed);
    let mut grid = Grid::new(width, height);

    grid.cells_mut()
        .par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, cell) in row.iter_mut().enumerate() {
                *cell = perlin.noise(x as f32 * frequency, y as f32 * frequency) * amplitude;
            }
        });

    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_is_bit_identical() {
        let a = PerlinNoise::new(1234);
        let b = PerlinNoise::new(1234);
        for i in 0..200 {
            let x = i as f32 * 0.173 - 7.0;
            let y = i as f32 * 0.311 + 3.0;
            assert_eq!(a.noise(x, y).to_bits(), b.noise(x, y).to_bits());
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = PerlinNoise::new(1);
        let b = PerlinNoise::new(2);
        let differs = (0..64).any(|i| {
            let x = i as f32 * 0.37 + 0.5;
            a.noise(x, x * 0.5) != b.noise(x, x * 0.5)
        });
        assert!(differs, "different seeds should produce different noise");
    }

    #[test]
    fn test_zero_at_lattice_points() {
        let perlin = PerlinNoise::new(99);
        for ix in -3..3 {
            for iy in -3..3 {
                assert_eq!(perlin.noise(ix as f32, iy as f32), 0.0);
            }
        }
    }

    #[test]
    fn test_noise_range() {
        let perlin = PerlinNoise::new(7);
        for i in 0..1000 {
            let v = perlin.noise(i as f32 * 0.071, i as f32 * 0.113);
            assert!((-1.5..=1.5).contains(&v), "noise value {} out of range", v);
        }
    }

    #[test]
    fn test_fade_endpoints() {
        assert_eq!(PerlinNoise::fade(0.0), 0.0);
        assert_eq!(PerlinNoise::fade(1.0), 1.0);
        assert!((PerlinNoise::fade(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_perlin_grid_reproducible_and_scaled() {
        let a = perlin_grid(32, 16, 42, 0.1, 10.0).unwrap();
        let b = perlin_grid(32, 16, 42, 0.1, 10.0).unwrap();
        assert_eq!(a, b);

        let unit = perlin_grid(32, 16, 42, 0.1, 1.0).unwrap();
        for (scaled, base) in a.cells().iter().zip(unit.cells()) {
            assert!((scaled - base * 10.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_perlin_grid_rejects_bad_params() {
        assert!(perlin_grid(0, 8, 1, 0.1, 1.0).is_err());
        assert!(perlin_grid(8, 8, 1, 0.0, 1.0).is_err());
        assert!(perlin_grid(8, 8, 1, -0.1, 1.0).is_err());
        assert!(perlin_grid(8, 8, 1, f32::NAN, 1.0).is_err());
        assert!(perlin_grid(8, 8, 1, 0.1, f32::INFINITY).is_err());
    }
}

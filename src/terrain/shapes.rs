//! Analytic terrain builders: flat, hemisphere, cone and sigmoid plateau.
//!
//! These take no seed and have no randomness. Distances are measured from
//! integer cell coordinates to the (possibly fractional) centre.

use rayon::prelude::*;

use super::Grid;

/// Fills every cell of a fresh grid by evaluating `f(distance_from_centre)`.
fn radial<F>(width: u32, height: u32, center_x: f32, center_y: f32, f: F) -> Grid
where
    F: Fn(f32) -> f32 + Sync,
{
    let mut grid = Grid::new(width, height);
    if width == 0 {
        return grid;
    }

    grid.cells_mut()
        .par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(y, row)| {
            let dy = y as f32 - center_y;
            for (x, cell) in row.iter_mut().enumerate() {
                let dx = x as f32 - center_x;
                *cell = f((dx * dx + dy * dy).sqrt());
            }
        });

    grid
}

/// A grid with every cell at `elevation`.
pub fn flat(width: u32, height: u32, elevation: f32) -> Grid {
    let mut grid = Grid::new(width, height);
    grid.fill(elevation);
    grid
}

/// Hemisphere of radius `radius`: `sqrt(r² - d²)` inside the radius, 0 outside.
pub fn hemisphere(width: u32, height: u32, center_x: f32, center_y: f32, radius: f32) -> Grid {
    let r2 = radius * radius;
    radial(width, height, center_x, center_y, |d| {
        if d < radius {
            (r2 - d * d).max(0.0).sqrt()
        } else {
            0.0
        }
    })
}

/// Cone with linear falloff `peak * (1 - d / r)` inside the radius, 0 outside.
pub fn cone(width: u32, height: u32, center_x: f32, center_y: f32, radius: f32, peak: f32) -> Grid {
    radial(width, height, center_x, center_y, |d| {
        if d < radius {
            peak * (1.0 - d / radius)
        } else {
            0.0
        }
    })
}

/// Radial logistic plateau `peak / (1 + exp((d - r) / (0.1 r)))`.
///
/// Flat-topped near the centre, falling through `peak / 2` at `d == r`.
/// A non-positive radius yields a flat zero grid.
pub fn sigmoid(width: u32, height: u32, center_x: f32, center_y: f32, radius: f32, peak: f32) -> Grid {
    if radius <= 0.0 {
        return Grid::new(width, height);
    }
    let steepness = radius * 0.1;
    radial(width, height, center_x, center_y, |d| {
        peak / (1.0 + ((d - radius) / steepness).exp())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat() {
        let grid = flat(7, 5, 2.5);
        assert_eq!(grid.len(), 35);
        assert!(grid.cells().iter().all(|&h| h == 2.5));
    }

    #[test]
    fn test_hemisphere_profile() {
        let r = 10.0;
        let grid = hemisphere(32, 32, 16.0, 16.0, r);

        assert_eq!(grid.get(16, 16), r);

        // d = 6 along x
        let expected = (r * r - 36.0f32).sqrt();
        assert!((grid.get(22, 16) - expected).abs() < 1e-5);

        // d = 5 on a diagonal (3-4-5)
        let expected = (r * r - 25.0f32).sqrt();
        assert!((grid.get(19, 20) - expected).abs() < 1e-5);

        // on and beyond the rim
        assert_eq!(grid.get(26, 16), 0.0);
        assert_eq!(grid.get(0, 0), 0.0);
    }

    #[test]
    fn test_cone_profile() {
        let grid = cone(32, 32, 16.0, 16.0, 8.0, 40.0);

        assert_eq!(grid.get(16, 16), 40.0);
        assert!((grid.get(20, 16) - 20.0).abs() < 1e-5);
        assert!((grid.get(19, 20) - 40.0 * (1.0 - 5.0 / 8.0)).abs() < 1e-5);
        assert_eq!(grid.get(24, 16), 0.0);
        assert_eq!(grid.get(31, 31), 0.0);
    }

    #[test]
    fn test_fractional_centre() {
        let grid = cone(4, 4, 1.5, 1.5, 4.0, 8.0);
        // All four central cells are equidistant from the centre.
        let c = grid.get(1, 1);
        assert_eq!(grid.get(2, 1), c);
        assert_eq!(grid.get(1, 2), c);
        assert_eq!(grid.get(2, 2), c);
    }

    #[test]
    fn test_sigmoid_plateau() {
        let grid = sigmoid(64, 64, 32.0, 32.0, 20.0, 100.0);
        assert!(grid.get(32, 32) > 99.0);
        assert!((grid.get(52, 32) - 50.0).abs() < 1e-3);
        assert!(grid.get(63, 63) < 1.0);
        assert!(sigmoid(8, 8, 4.0, 4.0, 0.0, 5.0).cells().iter().all(|&h| h == 0.0));
    }

    #[test]
    fn test_shapes_are_deterministic() {
        assert_eq!(hemisphere(20, 12, 9.5, 6.0, 5.0), hemisphere(20, 12, 9.5, 6.0, 5.0));
        assert_eq!(cone(20, 12, 9.5, 6.0, 5.0, 3.0), cone(20, 12, 9.5, 6.0, 5.0, 3.0));
    }
}

//! Radius-weighted footprint for spreading erosion and deposition.

use crate::terrain::Grid;

/// Linear-falloff disc of cell offsets with weights `max(0, 1 - d / r)`.
///
/// A radius of 1 or less collapses to the centre cell alone.
#[derive(Debug, Clone)]
pub struct ErosionBrush {
    radius: u32,
    taps: Vec<(i32, i32, f32)>,
}

impl ErosionBrush {
    pub fn new(radius: u32) -> Self {
        if radius <= 1 {
            return Self {
                radius,
                taps: vec![(0, 0, 1.0)],
            };
        }

        let r = radius as i32;
        let rf = radius as f32;
        let mut taps = Vec::new();
        for dy in -r..=r {
            for dx in -r..=r {
                let d = ((dx * dx + dy * dy) as f32).sqrt();
                let w = 1.0 - d / rf;
                if w > 0.0 {
                    taps.push((dx, dy, w));
                }
            }
        }
        Self { radius, taps }
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// Number of cells in the footprint before clipping to the grid.
    pub fn len(&self) -> usize {
        self.taps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }

    /// Footprint cells that fall inside a `width` x `height` grid.
    fn clipped(
        &self,
        width: u32,
        height: u32,
        cx: u32,
        cy: u32,
    ) -> impl Iterator<Item = (u32, u32, f32)> + '_ {
        let (w, h) = (width as i64, height as i64);
        let (cx, cy) = (cx as i64, cy as i64);
        self.taps.iter().filter_map(move |&(dx, dy, weight)| {
            let x = cx + dx as i64;
            let y = cy + dy as i64;
            if x >= 0 && y >= 0 && x < w && y < h {
                Some((x as u32, y as u32, weight))
            } else {
                None
            }
        })
    }

    /// Removes `amount` of material centred on `(cx, cy)`.
    ///
    /// Weights are renormalized over the cells that fall inside the grid, so
    /// exactly `amount` leaves the terrain.
    pub fn erode(&self, grid: &mut Grid, cx: u32, cy: u32, amount: f32) {
        if amount <= 0.0 {
            return;
        }
        let (w, h) = (grid.width(), grid.height());
        let total: f32 = self.clipped(w, h, cx, cy).map(|(_, _, weight)| weight).sum();
        if total <= 0.0 {
            return;
        }
        for (x, y, weight) in self.clipped(w, h, cx, cy) {
            grid.add(x, y, -amount * weight / total);
        }
    }

    /// Adds up to `amount` of material centred on `(cx, cy)` without lifting
    /// any cell above `ceiling`. Returns the amount actually placed.
    pub fn deposit(&self, grid: &mut Grid, cx: u32, cy: u32, amount: f32, ceiling: f32) -> f32 {
        if amount <= 0.0 {
            return 0.0;
        }
        let (w, h) = (grid.width(), grid.height());
        let total: f32 = self.clipped(w, h, cx, cy).map(|(_, _, weight)| weight).sum();
        if total <= 0.0 {
            return 0.0;
        }
        let mut placed = 0.0;
        for (x, y, weight) in self.clipped(w, h, cx, cy) {
            let room = (ceiling - grid.get(x, y)).max(0.0);
            let share = (amount * weight / total).min(room);
            if share > 0.0 {
                grid.add(x, y, share);
                placed += share;
            }
        }
        placed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_one_is_single_cell() {
        let brush = ErosionBrush::new(1);
        assert_eq!(brush.len(), 1);
        let mut grid = Grid::new(5, 5);
        grid.fill(1.0);
        brush.erode(&mut grid, 2, 2, 0.5);
        assert_eq!(grid.get(2, 2), 0.5);
        assert_eq!(grid.get(1, 2), 1.0);
    }

    #[test]
    fn test_weights_fall_off_with_distance() {
        let brush = ErosionBrush::new(3);
        let mut grid = Grid::new(9, 9);
        brush.deposit(&mut grid, 4, 4, 1.0, f32::INFINITY);
        let centre = grid.get(4, 4);
        let near = grid.get(5, 4);
        let far = grid.get(6, 4);
        assert!(centre > near && near > far && far > 0.0);
        assert_eq!(grid.get(7, 4), 0.0);
    }

    #[test]
    fn test_mass_is_exact_when_clipped() {
        let brush = ErosionBrush::new(4);
        let mut grid = Grid::new(6, 6);
        grid.fill(10.0);
        let before = grid.total_mass();
        brush.erode(&mut grid, 0, 0, 2.0);
        assert!((before - grid.total_mass() - 2.0).abs() < 1e-4);

        let placed = brush.deposit(&mut grid, 5, 5, 1.5, f32::INFINITY);
        assert!((placed - 1.5).abs() < 1e-5);
        assert!((before - grid.total_mass() - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_deposit_respects_ceiling() {
        let brush = ErosionBrush::new(2);
        let mut grid = Grid::new(5, 5);
        grid.fill(0.9);
        let placed = brush.deposit(&mut grid, 2, 2, 100.0, 1.0);
        assert!(placed < 100.0);
        assert!(grid.max_height() <= 1.0 + 1e-6);
    }
}

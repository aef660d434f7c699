//! Row-major elevation grid with interpolation, gradient and normal queries.

use glam::{Vec2, Vec3};

use super::TerrainError;

/// A 2-D elevation buffer stored in row-major order (`index = y * width + x`).
///
/// Origin is the top-left corner; x grows to the right, y grows downward.
/// Dimensions are fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<f32>,
}

impl Grid {
    /// Upward unit normal returned for queries outside the sampling domain.
    pub const UP: Vec3 = Vec3::Z;

    /// Creates a zero-filled grid.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![0.0; width as usize * height as usize],
        }
    }

    /// Wraps an externally supplied row-major buffer.
    ///
    /// Fails when `cells.len() != width * height`.
    pub fn from_cells(width: u32, height: u32, cells: Vec<f32>) -> Result<Self, TerrainError> {
        let expected = width as usize * height as usize;
        if cells.len() != expected {
            return Err(TerrainError::BufferLength {
                expected,
                actual: cells.len(),
            });
        }
        Ok(Self { width, height, cells })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells (`width * height`).
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Read-only view of the row-major buffer.
    pub fn cells(&self) -> &[f32] {
        &self.cells
    }

    /// Mutable view of the row-major buffer.
    pub fn cells_mut(&mut self) -> &mut [f32] {
        &mut self.cells
    }

    /// Consumes the grid, returning its row-major buffer.
    pub fn into_cells(self) -> Vec<f32> {
        self.cells
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Returns the elevation at an integer cell.
    ///
    /// # Panics
    /// Panics if the cell lies outside the grid.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> f32 {
        debug_assert!(x < self.width && y < self.height);
        self.cells[self.index(x, y)]
    }

    /// Sets the elevation at an integer cell.
    ///
    /// # Panics
    /// Panics if the cell lies outside the grid.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: f32) {
        debug_assert!(x < self.width && y < self.height);
        let i = self.index(x, y);
        self.cells[i] = value;
    }

    /// Adds `delta` to the elevation at an integer cell.
    #[inline]
    pub fn add(&mut self, x: u32, y: u32, delta: f32) {
        debug_assert!(x < self.width && y < self.height);
        let i = self.index(x, y);
        self.cells[i] += delta;
    }

    /// Sets every cell to `value`.
    pub fn fill(&mut self, value: f32) {
        self.cells.fill(value);
    }

    /// True when `(x, y)` lies in `[0, width-1) x [0, height-1)`, the domain
    /// where all four bilinear neighbours exist.
    #[inline]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= 0.0 && y >= 0.0 && x < (self.width as f32 - 1.0) && y < (self.height as f32 - 1.0)
    }

    /// Bilinearly interpolated elevation at a fractional position.
    ///
    /// Returns `0.0` outside the sampling domain (see [`Grid::contains`]).
    pub fn get_interpolated(&self, x: f32, y: f32) -> f32 {
        if !self.contains(x, y) {
            return 0.0;
        }

        let x0 = x.floor() as u32;
        let y0 = y.floor() as u32;
        let fx = x - x0 as f32;
        let fy = y - y0 as f32;

        let h00 = self.get(x0, y0);
        let h10 = self.get(x0 + 1, y0);
        let h01 = self.get(x0, y0 + 1);
        let h11 = self.get(x0 + 1, y0 + 1);

        let top = h00 + (h10 - h00) * fx;
        let bottom = h01 + (h11 - h01) * fx;
        top + (bottom - top) * fy
    }

    /// Finite-difference gradient at an integer cell: central differences in
    /// the interior, one-sided differences on the border rows and columns.
    fn cell_gradient(&self, x: u32, y: u32) -> Vec2 {
        let gx = if self.width < 2 {
            0.0
        } else if x == 0 {
            self.get(1, y) - self.get(0, y)
        } else if x == self.width - 1 {
            self.get(x, y) - self.get(x - 1, y)
        } else {
            (self.get(x + 1, y) - self.get(x - 1, y)) * 0.5
        };

        let gy = if self.height < 2 {
            0.0
        } else if y == 0 {
            self.get(x, 1) - self.get(x, 0)
        } else if y == self.height - 1 {
            self.get(x, y) - self.get(x, y - 1)
        } else {
            (self.get(x, y + 1) - self.get(x, y - 1)) * 0.5
        };

        Vec2::new(gx, gy)
    }

    /// Surface gradient `(dh/dx, dh/dy)` at a fractional position.
    ///
    /// The cell gradients at the four surrounding corners are blended
    /// bilinearly. Returns `None` outside the sampling domain.
    pub fn get_gradient(&self, x: f32, y: f32) -> Option<Vec2> {
        if !self.contains(x, y) {
            return None;
        }

        let x0 = x.floor() as u32;
        let y0 = y.floor() as u32;
        let fx = x - x0 as f32;
        let fy = y - y0 as f32;

        let g00 = self.cell_gradient(x0, y0);
        let g10 = self.cell_gradient(x0 + 1, y0);
        let g01 = self.cell_gradient(x0, y0 + 1);
        let g11 = self.cell_gradient(x0 + 1, y0 + 1);

        let top = g00.lerp(g10, fx);
        let bottom = g01.lerp(g11, fx);
        Some(top.lerp(bottom, fy))
    }

    /// Unit surface normal `normalize(-dh/dx, -dh/dy, 1)` at a fractional position.
    ///
    /// Returns `None` outside the sampling domain; callers that want a value
    /// regardless fall back to [`Grid::UP`].
    pub fn get_normal(&self, x: f32, y: f32) -> Option<Vec3> {
        self.get_gradient(x, y)
            .map(|g| Vec3::new(-g.x, -g.y, 1.0).normalize())
    }

    /// Returns the minimum elevation.
    pub fn min_height(&self) -> f32 {
        self.cells.iter().cloned().fold(f32::MAX, f32::min)
    }

    /// Returns the maximum elevation.
    pub fn max_height(&self) -> f32 {
        self.cells.iter().cloned().fold(f32::MIN, f32::max)
    }

    /// Returns `(min, max)` elevation.
    pub fn height_range(&self) -> (f32, f32) {
        (self.min_height(), self.max_height())
    }

    /// Sum of all cells, accumulated in f64.
    pub fn total_mass(&self) -> f64 {
        self.cells.iter().map(|&h| h as f64).sum()
    }
}

//! Frame export: 16-bit PNG for inspection and RAW for game engine import.

mod png;
mod raw;

pub use png::{export_frame_png, export_grid_png, PngExportError, PngExportOptions};
pub use raw::{
    expected_file_size, export_frame_raw, export_grid_raw, RawExportError, RawExportOptions,
    RawFormat,
};

use crate::terrain::Grid;

/// `{base_name}_{frame:04}.{extension}`, so frames sort in playback order.
pub fn frame_file_name(base_name: &str, frame: i32, extension: &str) -> String {
    format!("{}_{:04}.{}", base_name, frame, extension)
}

/// The grid's height range, widened to a unit span when the grid is flat.
fn padded_range(grid: &Grid) -> (f32, f32) {
    let (min, max) = grid.height_range();
    if max > min {
        (min, max)
    } else {
        (min, min + 1.0)
    }
}

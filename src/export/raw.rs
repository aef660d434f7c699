//! RAW heightmap export for game engine import.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use crate::terrain::Grid;

/// Errors that can occur during RAW export.
#[derive(Error, Debug)]
pub enum RawExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid height range: min ({0}) >= max ({1})")]
    InvalidHeightRange(f32, f32),
}

/// RAW sample encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RawFormat {
    /// 16-bit unsigned integer, little-endian (Unity default).
    #[default]
    R16LittleEndian,
    /// 16-bit unsigned integer, big-endian.
    R16BigEndian,
    /// 32-bit float, little-endian. Heights are written unscaled.
    R32Float,
}

impl RawFormat {
    pub fn bytes_per_sample(&self) -> u64 {
        match self {
            RawFormat::R16LittleEndian | RawFormat::R16BigEndian => 2,
            RawFormat::R32Float => 4,
        }
    }
}

/// Options for RAW export.
#[derive(Debug, Clone)]
pub struct RawExportOptions {
    pub format: RawFormat,
    /// Height mapped to 0 (R16 formats only).
    pub min_height: f32,
    /// Height mapped to 65535 (R16 formats only).
    pub max_height: f32,
}

impl Default for RawExportOptions {
    fn default() -> Self {
        Self {
            format: RawFormat::R16LittleEndian,
            min_height: 0.0,
            max_height: 1.0,
        }
    }
}

impl RawExportOptions {
    /// Normalizes over the grid's own height range.
    pub fn auto_range(grid: &Grid, format: RawFormat) -> Self {
        let (min_height, max_height) = super::padded_range(grid);
        Self {
            format,
            min_height,
            max_height,
        }
    }
}

/// Writes `grid` row-major to `path`.
pub fn export_grid_raw(grid: &Grid, path: &Path, options: &RawExportOptions) -> Result<(), RawExportError> {
    let (min_height, max_height) = (options.min_height, options.max_height);
    if options.format != RawFormat::R32Float && min_height >= max_height {
        return Err(RawExportError::InvalidHeightRange(min_height, max_height));
    }

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let range = max_height - min_height;
    let quantize = |height: f32| (((height - min_height) / range).clamp(0.0, 1.0) * 65535.0) as u16;

    match options.format {
        RawFormat::R16LittleEndian => {
            for &height in grid.cells() {
                writer.write_all(&quantize(height).to_le_bytes())?;
            }
        }
        RawFormat::R16BigEndian => {
            for &height in grid.cells() {
                writer.write_all(&quantize(height).to_be_bytes())?;
            }
        }
        RawFormat::R32Float => {
            for &height in grid.cells() {
                writer.write_all(&height.to_le_bytes())?;
            }
        }
    }

    writer.flush()?;
    Ok(())
}

/// Writes frame `frame` as `{base_name}_{frame:04}.raw` under `output_dir`.
pub fn export_frame_raw(
    grid: &Grid,
    frame: i32,
    output_dir: &Path,
    base_name: &str,
    options: &RawExportOptions,
) -> Result<(), RawExportError> {
    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(super::frame_file_name(base_name, frame, "raw"));
    export_grid_raw(grid, &path, options)
}

/// Returns the expected file size for a RAW export.
pub fn expected_file_size(width: u32, height: u32, format: RawFormat) -> u64 {
    width as u64 * height as u64 * format.bytes_per_sample()
}

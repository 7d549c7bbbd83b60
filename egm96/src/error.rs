//! Error types for the EGM96 library.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when loading or querying the geoid grid.
#[derive(Error, Debug)]
pub enum GeoidError {
    /// IO error when opening, inspecting or reading the grid file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The grid file was not found.
    #[error("Geoid grid file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Coordinates are outside the valid geographic range.
    #[error("Invalid coordinates: lat={lat}, lon={lon} (valid: lat ±90°, lon ±180°)")]
    InvalidCoordinates { lat: f64, lon: f64 },

    /// A grid post lies outside the grid or outside the loaded buffer.
    #[error("Grid post out of range: row={row}, col={col} (buffer holds {len} bytes)")]
    OutOfRange { row: usize, col: usize, len: usize },
}

impl GeoidError {
    /// Returns `true` for failures that came from reading the grid file.
    pub fn is_io(&self) -> bool {
        matches!(self, GeoidError::Io(_) | GeoidError::FileNotFound { .. })
    }
}

/// Result type alias using [`GeoidError`].
pub type Result<T> = std::result::Result<T, GeoidError>;

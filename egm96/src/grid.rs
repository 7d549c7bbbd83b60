//! Raw EGM96 grid storage and post access.
//!
//! This module provides [`GridStore`], which owns the bytes of the 15 arc-minute
//! worldwide geoid grid (`WW15MGH.DAC`) and reads individual posts from it.
//!
//! The file has no header: 721 rows of 1440 signed 16-bit big-endian samples,
//! row-major. Row 0 is the north pole (+90°) and column 0 is longitude 0°,
//! with columns increasing eastward. Each sample is the geoid undulation in
//! centimeters.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::ops::Deref;
use std::path::Path;

use memmap2::Mmap;

use crate::error::{GeoidError, Result};

/// Number of grid rows, from +90° down to -90°.
pub const NUM_ROWS: usize = 721;

/// Number of grid columns, from 0° eastward to 359.75°.
pub const NUM_COLS: usize = 1440;

/// Spacing between posts in both axes: 15 arc-minutes.
pub const INTERVAL_DEGREES: f64 = 15.0 / 60.0;

/// Size of a complete grid file: 721 × 1440 × 2 bytes
pub const GRID_BYTES: usize = NUM_ROWS * NUM_COLS * 2; // 2,076,480 bytes

/// How the grid file is brought into memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMode {
    /// Read the whole file into an owned buffer.
    #[default]
    Read,
    /// Memory-map the file read-only.
    Mmap,
}

impl LoadMode {
    /// Parse a mode name (`read` or `mmap`), case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "read" => Some(LoadMode::Read),
            "mmap" => Some(LoadMode::Mmap),
            _ => None,
        }
    }
}

enum GridBytes {
    Owned(Box<[u8]>),
    Mapped(Mmap),
}

impl Deref for GridBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            GridBytes::Owned(bytes) => bytes,
            GridBytes::Mapped(mmap) => mmap,
        }
    }
}

/// Latitude in degrees of the posts in `row`.
pub fn latitude_of(row: usize) -> f64 {
    90.0 - row as f64 * INTERVAL_DEGREES
}

/// Longitude in degrees (0 to 360) of the posts in `col`.
pub fn longitude_of(col: usize) -> f64 {
    col as f64 * INTERVAL_DEGREES
}

/// Immutable bytes of an EGM96 grid file.
///
/// The buffer is not validated on load beyond recording its length. A file
/// that is shorter than [`GRID_BYTES`] still loads, and any [`sample`](Self::sample)
/// that needs the missing bytes fails with [`GeoidError::OutOfRange`].
///
/// # Example
///
/// ```ignore
/// use egm96::GridStore;
///
/// let grid = GridStore::load("WW15MGH.DAC")?;
/// let north_pole = grid.sample(0, 0)?; // centimeters
/// ```
pub struct GridStore {
    data: GridBytes,
}

impl GridStore {
    /// Load a grid file with the given [`LoadMode`].
    pub fn open<P: AsRef<Path>>(path: P, mode: LoadMode) -> Result<Self> {
        match mode {
            LoadMode::Read => Self::load(path),
            LoadMode::Mmap => Self::map(path),
        }
    }

    /// Read a grid file into an owned buffer.
    ///
    /// The buffer is sized from the file's metadata and filled in one pass.
    /// The file handle is closed before this returns.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file does not exist ([`GeoidError::FileNotFound`])
    /// - The file cannot be opened, stat'd or fully read ([`GeoidError::Io`]);
    ///   a short read is a failure, not a partial grid
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = open_file(path)?;
        let len = file.metadata()?.len() as usize;

        let mut data = vec![0u8; len];
        file.read_exact(&mut data)?;
        drop(file);

        let grid = Self {
            data: GridBytes::Owned(data.into_boxed_slice()),
        };
        grid.log_loaded(path, LoadMode::Read);
        Ok(grid)
    }

    /// Memory-map a grid file read-only.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load), plus any failure to create the mapping.
    pub fn map<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = open_file(path)?;

        // SAFETY: Memory mapping is safe as long as the file is not modified
        // while mapped. We open the file read-only and never hand out the mapping
        // mutably.
        let mmap = unsafe { Mmap::map(&file)? };
        drop(file);

        let grid = Self {
            data: GridBytes::Mapped(mmap),
        };
        grid.log_loaded(path, LoadMode::Mmap);
        Ok(grid)
    }

    /// Build a grid from bytes already in memory, e.g. an embedded file.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            data: GridBytes::Owned(bytes.into().into_boxed_slice()),
        }
    }

    /// Read the post at `row`, `col` in centimeters.
    ///
    /// # Arguments
    ///
    /// * `row` - Row index (0 = north pole)
    /// * `col` - Column index (0 = longitude 0°, increasing eastward)
    ///
    /// # Errors
    ///
    /// Returns [`GeoidError::OutOfRange`] if the post lies outside the
    /// 721 × 1440 grid or its two bytes are not inside the loaded buffer.
    pub fn sample(&self, row: usize, col: usize) -> Result<i16> {
        let data: &[u8] = &self.data;
        let out_of_range = || GeoidError::OutOfRange {
            row,
            col,
            len: data.len(),
        };

        if row >= NUM_ROWS || col >= NUM_COLS {
            return Err(out_of_range());
        }

        // 2 bytes per sample, row-major order
        let offset = (row * NUM_COLS + col) * 2;
        match data.get(offset..offset + 2) {
            Some(&[hi, lo]) => Ok(i16::from_be_bytes([hi, lo])),
            _ => Err(out_of_range()),
        }
    }

    /// Returns the number of bytes held.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if every post of the grid is inside the buffer.
    pub fn is_complete(&self) -> bool {
        self.len() >= GRID_BYTES
    }

    /// Returns `true` if the buffer is memory-mapped rather than owned.
    pub fn is_mapped(&self) -> bool {
        matches!(self.data, GridBytes::Mapped(_))
    }

    fn log_loaded(&self, path: &Path, mode: LoadMode) {
        tracing::debug!(
            path = %path.display(),
            bytes = self.len(),
            mode = ?mode,
            "Loaded geoid grid"
        );
        if !self.is_complete() {
            tracing::warn!(
                path = %path.display(),
                bytes = self.len(),
                expected = GRID_BYTES,
                "Geoid grid is shorter than a full 721x1440 grid; queries near the missing rows will fail"
            );
        }
    }
}

impl std::fmt::Debug for GridStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridStore")
            .field("len", &self.len())
            .field("mapped", &self.is_mapped())
            .finish()
    }
}

fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => GeoidError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => GeoidError::Io(e),
    })
}

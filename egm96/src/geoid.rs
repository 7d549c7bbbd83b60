//! Geoid undulation lookup with bilinear interpolation.
//!
//! This module provides [`Geoid`], which maps a latitude/longitude onto the
//! EGM96 grid held by a [`GridStore`] and interpolates the four surrounding
//! posts into a geoid-ellipsoid separation in meters.
//!
//! # Configuration
//!
//! [`GeoidBuilder`] selects how the grid file is loaded and how the grid cell
//! for a query is chosen. It can also be configured from environment variables,
//! see [`GeoidBuilder::from_env`].

use std::path::{Path, PathBuf};

use crate::error::{GeoidError, Result};
use crate::grid::{GridStore, LoadMode, INTERVAL_DEGREES, NUM_COLS, NUM_ROWS};

/// Conventional file name of the EGM96 15 arc-minute grid.
pub const DEFAULT_GRID_FILE: &str = "WW15MGH.DAC";

/// How the top row and left column of a query's cell are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellSelection {
    /// Round the fractional row/column half-up to the nearest post.
    ///
    /// Points up to half a cell before that post are extrapolated from the
    /// cell that starts at it, so `u`/`v` range over `[-0.5, 1.0]`.
    #[default]
    Nearest,
    /// Truncate the fractional row/column, so the query point always lies
    /// inside the selected cell and `u`/`v` stay in `[0.0, 1.0]`.
    Enclosing,
}

impl CellSelection {
    /// Parse a selection name (`nearest` or `enclosing`), case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "nearest" => Some(CellSelection::Nearest),
            "enclosing" => Some(CellSelection::Enclosing),
            _ => None,
        }
    }

    /// Convert a non-negative fractional grid position into a post index.
    fn index(self, position: f64) -> usize {
        match self {
            CellSelection::Nearest => (position + 0.5) as usize,
            CellSelection::Enclosing => position as usize,
        }
    }
}

/// The grid cell selected for a query and the query's position within it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    /// Row of the northern edge.
    pub top_row: usize,
    /// Row of the southern edge, always `top_row + 1`.
    pub bottom_row: usize,
    /// Column of the western edge.
    pub left_col: usize,
    /// Column of the eastern edge; wraps to 0 at the date line seam.
    pub right_col: usize,
    /// Fractional column position, 0 at the western edge.
    pub u: f64,
    /// Fractional row position, 0 at the northern edge.
    pub v: f64,
}

/// EGM96 geoid lookup over a loaded grid.
///
/// The grid is immutable once loaded, so a `Geoid` can be shared between
/// threads (e.g. behind an `Arc`) and queried concurrently.
///
/// # Example
///
/// ```ignore
/// use egm96::Geoid;
///
/// let geoid = Geoid::from_file("WW15MGH.DAC")?;
///
/// // Geoid-ellipsoid separation in meters
/// let n = geoid.get_offset(35.3606, 138.7274)?;
///
/// // GNSS ellipsoidal height to height above mean sea level
/// let msl = geoid.ellipsoid_to_msl(35.3606, 138.7274, 3816.2)?;
/// ```
pub struct Geoid {
    grid: GridStore,
    /// Post spacing in degrees, fixed at construction.
    interval: f64,
    cell_selection: CellSelection,
}

impl Geoid {
    /// Load the grid file at `path` with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be found or fully read.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        GeoidBuilder::new(path).build()
    }

    /// Load [`DEFAULT_GRID_FILE`] from the current directory.
    pub fn from_default_file() -> Result<Self> {
        Self::from_file(DEFAULT_GRID_FILE)
    }

    /// Wrap an already loaded grid using [`CellSelection::Nearest`].
    pub fn from_grid(grid: GridStore) -> Self {
        Self::with_cell_selection(grid, CellSelection::default())
    }

    /// Wrap an already loaded grid with an explicit [`CellSelection`].
    pub fn with_cell_selection(grid: GridStore, cell_selection: CellSelection) -> Self {
        Self {
            grid,
            interval: INTERVAL_DEGREES,
            cell_selection,
        }
    }

    /// Create a builder for more configuration options.
    pub fn builder<P: AsRef<Path>>(path: P) -> GeoidBuilder {
        GeoidBuilder::new(path)
    }

    /// Get the geoid-ellipsoid separation at the given coordinates.
    ///
    /// The four posts around the point are bilinearly interpolated.
    ///
    /// # Arguments
    ///
    /// * `lat` - Latitude in decimal degrees (-90 to 90)
    /// * `lon` - Longitude in decimal degrees (-180 to 180)
    ///
    /// # Returns
    ///
    /// The separation in meters. Positive where the geoid lies above the ellipsoid.
    ///
    /// # Errors
    ///
    /// - [`GeoidError::InvalidCoordinates`] if either coordinate is out of range
    /// - [`GeoidError::OutOfRange`] if a needed post is missing from the grid file
    pub fn get_offset(&self, lat: f64, lon: f64) -> Result<f64> {
        let cell = self.cell(lat, lon)?;

        let ul = f64::from(self.grid.sample(cell.top_row, cell.left_col)?);
        let ll = f64::from(self.grid.sample(cell.bottom_row, cell.left_col)?);
        let lr = f64::from(self.grid.sample(cell.bottom_row, cell.right_col)?);
        let ur = f64::from(self.grid.sample(cell.top_row, cell.right_col)?);

        let (u, v) = (cell.u, cell.v);
        let offset_cm = (1.0 - u) * (1.0 - v) * ul
            + (1.0 - u) * v * ll
            + u * v * lr
            + u * (1.0 - v) * ur;

        tracing::trace!(
            lat,
            lon,
            row = cell.top_row,
            col = cell.left_col,
            offset_cm,
            "Geoid offset"
        );

        Ok(offset_cm / 100.0)
    }

    /// Get offsets for a batch of coordinates.
    ///
    /// Returns one offset per input coordinate, in input order.
    ///
    /// # Errors
    ///
    /// Fails with the error of the first coordinate that cannot be resolved;
    /// no partial results are returned.
    pub fn get_offsets(&self, coords: &[(f64, f64)]) -> Result<Vec<f64>> {
        coords
            .iter()
            .map(|&(lat, lon)| self.get_offset(lat, lon))
            .collect()
    }

    /// Convert an ellipsoidal height (e.g. from GNSS) to height above mean sea level.
    pub fn ellipsoid_to_msl(&self, lat: f64, lon: f64, ellipsoid_height: f64) -> Result<f64> {
        Ok(ellipsoid_height - self.get_offset(lat, lon)?)
    }

    /// Convert a height above mean sea level to an ellipsoidal height.
    pub fn msl_to_ellipsoid(&self, lat: f64, lon: f64, msl_height: f64) -> Result<f64> {
        Ok(msl_height + self.get_offset(lat, lon)?)
    }

    /// Map coordinates onto the grid cell used to interpolate them.
    ///
    /// # Errors
    ///
    /// Returns [`GeoidError::InvalidCoordinates`] if `lat` is outside
    /// [-90, 90] or `lon` is outside [-180, 180] (NaN included).
    pub fn cell(&self, lat: f64, lon: f64) -> Result<Cell> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(GeoidError::InvalidCoordinates { lat, lon });
        }

        // Normalize to 0.0 .. 360.0
        let lon = if lon < 0.0 { lon + 360.0 } else { lon };

        // No row below the south pole: keep bottom_row on the last row
        let top_row = if lat <= -90.0 {
            NUM_ROWS - 2
        } else {
            self.cell_selection
                .index((90.0 - lat) / self.interval)
                .min(NUM_ROWS - 2)
        };

        // Column NUM_COLS is column 0 again
        let (left_col, right_col) = match self.cell_selection.index(lon / self.interval) {
            col if col >= NUM_COLS - 1 => (NUM_COLS - 1, 0),
            col => (col, col + 1),
        };

        let lat_top = 90.0 - top_row as f64 * self.interval;
        let lon_left = left_col as f64 * self.interval;

        Ok(Cell {
            top_row,
            bottom_row: top_row + 1,
            left_col,
            right_col,
            u: (lon - lon_left) / self.interval,
            v: (lat_top - lat) / self.interval,
        })
    }

    /// Returns the underlying grid.
    pub fn grid(&self) -> &GridStore {
        &self.grid
    }

    /// Returns the post spacing in degrees.
    pub fn interval_degrees(&self) -> f64 {
        self.interval
    }

    /// Returns the cell selection rule.
    pub fn cell_selection(&self) -> CellSelection {
        self.cell_selection
    }
}

/// Builder for creating [`Geoid`] with custom configuration.
///
/// # Example
///
/// ```ignore
/// use egm96::{CellSelection, GeoidBuilder, LoadMode};
///
/// let geoid = GeoidBuilder::new("/data/egm96/WW15MGH.DAC")
///     .load_mode(LoadMode::Mmap)
///     .cell_selection(CellSelection::Enclosing)
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct GeoidBuilder {
    path: PathBuf,
    load_mode: LoadMode,
    cell_selection: CellSelection,
}

impl GeoidBuilder {
    /// Create a new builder for the grid file at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            load_mode: LoadMode::default(),
            cell_selection: CellSelection::default(),
        }
    }

    /// Create a builder configured from environment variables.
    ///
    /// # Environment Variables
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `EGM96_GRID_PATH` | Path to the grid file | `WW15MGH.DAC` |
    /// | `EGM96_LOAD_MODE` | `read` or `mmap` | `read` |
    /// | `EGM96_CELL_SELECTION` | `nearest` or `enclosing` | `nearest` |
    ///
    /// Unrecognized values fall back to the default.
    ///
    /// ```ignore
    /// use egm96::GeoidBuilder;
    ///
    /// let geoid = GeoidBuilder::from_env().build()?;
    /// ```
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let path = lookup("EGM96_GRID_PATH").unwrap_or_else(|| DEFAULT_GRID_FILE.to_string());

        let load_mode = match lookup("EGM96_LOAD_MODE") {
            Some(name) => LoadMode::from_name(&name).unwrap_or_else(|| {
                tracing::warn!(value = %name, "Unknown EGM96_LOAD_MODE, using default");
                LoadMode::default()
            }),
            None => LoadMode::default(),
        };

        let cell_selection = match lookup("EGM96_CELL_SELECTION") {
            Some(name) => CellSelection::from_name(&name).unwrap_or_else(|| {
                tracing::warn!(value = %name, "Unknown EGM96_CELL_SELECTION, using default");
                CellSelection::default()
            }),
            None => CellSelection::default(),
        };

        Self {
            path: PathBuf::from(path),
            load_mode,
            cell_selection,
        }
    }

    /// Set the grid file path.
    ///
    /// Overrides the path set in the constructor or from environment.
    pub fn path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.path = path.as_ref().to_path_buf();
        self
    }

    /// Set how the grid file is loaded.
    ///
    /// Default is [`LoadMode::Read`].
    pub fn load_mode(mut self, mode: LoadMode) -> Self {
        self.load_mode = mode;
        self
    }

    /// Set how query cells are chosen.
    ///
    /// Default is [`CellSelection::Nearest`].
    pub fn cell_selection(mut self, selection: CellSelection) -> Self {
        self.cell_selection = selection;
        self
    }

    /// Load the grid and build the [`Geoid`].
    ///
    /// # Errors
    ///
    /// Returns an error if the grid file cannot be found or fully read.
    pub fn build(self) -> Result<Geoid> {
        let grid = GridStore::open(&self.path, self.load_mode)?;
        Ok(Geoid::with_cell_selection(grid, self.cell_selection))
    }
}

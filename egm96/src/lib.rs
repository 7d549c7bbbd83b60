//! # EGM96 - Geoid Offset Library
//!
//! Converts between ellipsoidal heights (as reported by GNSS receivers) and
//! heights above mean sea level using the EGM96 geoid model.
//!
//! ## Features
//!
//! - **Whole-grid load**: the 15 arc-minute worldwide grid is read once, then
//!   every query is pure in-memory computation
//! - **Bilinear interpolation** between the four posts around a point
//! - **Date line and pole aware**: queries at the seam and at the poles never
//!   index past the grid
//! - **Recoverable errors**: bad coordinates and truncated files surface as
//!   [`GeoidError`], never as a silent zero offset
//!
//! ## Quick Start
//!
//! ```ignore
//! use egm96::Geoid;
//!
//! let geoid = Geoid::from_file("/data/egm96/WW15MGH.DAC")?;
//!
//! // Geoid-ellipsoid separation in meters
//! let n = geoid.get_offset(35.3606, 138.7274)?;
//!
//! // Height above mean sea level from a GNSS ellipsoidal height
//! let msl = geoid.ellipsoid_to_msl(35.3606, 138.7274, 3816.2)?;
//! ```
//!
//! ## Grid Format
//!
//! `WW15MGH.DAC` is a headerless binary file:
//!
//! - 721 rows × 1440 columns, 0.25° spacing
//! - Row 0 is +90°, column 0 is 0° longitude, columns increase eastward
//! - Each post is a 16-bit big-endian signed integer in centimeters
//!
//! A complete file is 2,076,480 bytes.

pub mod error;
pub mod geoid;
pub mod grid;

// Re-export main types at crate root for convenience
pub use error::{GeoidError, Result};
pub use geoid::{Cell, CellSelection, Geoid, GeoidBuilder, DEFAULT_GRID_FILE};
pub use grid::{GridStore, LoadMode, GRID_BYTES, INTERVAL_DEGREES, NUM_COLS, NUM_ROWS};

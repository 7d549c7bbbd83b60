//! Basic example demonstrating egm96 library usage.
//!
//! Run with: cargo run --example basic -- /path/to/WW15MGH.DAC

use egm96::{Geoid, GeoidError};
use std::env;

fn main() -> Result<(), GeoidError> {
    // Get grid file from command line
    let path = env::args().nth(1).unwrap_or_else(|| {
        eprintln!("Usage: cargo run --example basic -- /path/to/WW15MGH.DAC");
        std::process::exit(1);
    });

    let geoid = match Geoid::from_file(&path) {
        Ok(geoid) => geoid,
        Err(GeoidError::FileNotFound { path }) => {
            eprintln!("Grid file not found: {}", path.display());
            std::process::exit(1);
        }
        Err(e) => return Err(e),
    };

    if !geoid.grid().is_complete() {
        eprintln!("Warning: {} is not a complete 721x1440 grid", path);
    }

    // GNSS ellipsoidal heights at some well-known places
    let locations = [
        ("Mount Fuji, Japan", 35.3606, 138.7274, 3816.2),
        ("Mount Everest, Nepal", 27.9881, 86.9250, 8819.2),
        ("Denali, Alaska", 63.0695, -151.0074, 6205.6),
        ("South Pole", -90.0, 0.0, 2805.0),
    ];

    println!("Geoid offsets (EGM96, bilinear):");
    println!("{:-<60}", "");

    for (name, lat, lon, ellipsoid_height) in &locations {
        match geoid.get_offset(*lat, *lon) {
            Ok(offset) => {
                let msl = ellipsoid_height - offset;
                println!("{}: N = {:.2}m, MSL height = {:.1}m", name, offset, msl);
            }
            Err(e) => {
                println!("{}: error - {}", name, e);
            }
        }
    }

    Ok(())
}

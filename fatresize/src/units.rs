// SPDX-License-Identifier: MIT

//! Compact human-readable sector formatting.
//!
//! Sectors are shown as byte sizes in the largest power-of-1000 unit that
//! keeps the value at or above one, trimmed to three significant digits.
//! Parsing recovers the sector plus the natural tolerance of the printed
//! precision: half of the least significant displayed digit. Formatting
//! the old and the proposed end of an extent through the same routine is
//! what lets sub-unit differences collapse into exact no-ops.

use fatresize_part::{Geometry, Sector};

const UNITS: [(&str, u64); 5] = [
    ("B", 1),
    ("kB", 1_000),
    ("MB", 1_000_000),
    ("GB", 1_000_000_000),
    ("TB", 1_000_000_000_000),
];

/// Formats a sector offset as a compact byte size, e.g. `106MB`.
pub fn format_sector(sector_size: u64, sector: Sector) -> String {
    let bytes = sector * sector_size;
    let (unit, factor) = *UNITS
        .iter()
        .rev()
        .find(|(_, f)| bytes >= *f)
        .unwrap_or(&UNITS[0]);
    let value = bytes as f64 / factor as f64;
    let precision = precision_for(value);
    format!("{value:.precision$}{unit}")
}

/// Parses a compact byte size back into a sector plus the tolerance range
/// implied by its precision. `None` when the string is not of our own
/// making or the range falls entirely off the device.
pub fn parse_sector(
    input: &str,
    sector_size: u64,
    device_length: Sector,
) -> Option<(Sector, Geometry)> {
    let split = input.find(|c: char| c.is_ascii_alphabetic())?;
    let (num_str, unit_str) = input.split_at(split);
    let factor = UNITS.iter().find(|(u, _)| *u == unit_str)?.1;
    let value: f64 = num_str.parse().ok()?;
    if value < 0.0 {
        return None;
    }

    let precision = num_str
        .split_once('.')
        .map_or(0, |(_, frac)| frac.len() as u32);
    let bytes = value * factor as f64;
    let sector = (bytes / sector_size as f64).round() as Sector;

    let radius_bytes = 0.5 * factor as f64 / 10f64.powi(precision as i32);
    let radius = (radius_bytes / sector_size as f64).round() as Sector;
    let lo = sector.saturating_sub(radius);
    let hi = (sector + radius).min(device_length - 1);
    let range = Geometry::from_bounds(lo, hi)?;

    Some((sector, range))
}

fn precision_for(value: f64) -> usize {
    if value >= 100.0 {
        0
    } else if value >= 10.0 {
        1
    } else {
        2
    }
}

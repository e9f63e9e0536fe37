// SPDX-License-Identifier: MIT

//! Snapping a computed extent onto partition boundaries.
//!
//! The end sector derived from a byte size rarely lands exactly on a
//! neighbouring boundary; left alone, that truncation turns no-op resizes
//! into one-sector moves and leaves rounding slivers between partitions.
//! Each edge of the extent therefore tries an ordered list of candidate
//! boundaries and adopts the first one that still lies inside its
//! wiggle-room range. The constraint solver then takes over: snapping
//! runs before it, so slivers absorbed here never reach the table.

use core::fmt;

use fatresize_part::{Constraint, Device, Geometry, PartitionTable, Sector};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveError {
    /// A sector that needs resolving lies inside no partition; the layout
    /// on disk contradicts itself.
    OutsideLayout { sector: Sector },
    /// Snapping inverted the extent.
    Inverted { start: Sector, end: Sector },
    /// The requested range and the filesystem's limits do not meet.
    Infeasible {
        start: Sector,
        end: Sector,
        min_size: Sector,
        max_size: Sector,
    },
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveError::OutsideLayout { sector } => {
                write!(f, "sector {sector} lies inside no partition")
            }
            SolveError::Inverted { start, end } => {
                write!(f, "extent would end ({end}) before it starts ({start})")
            }
            SolveError::Infeasible {
                start,
                end,
                min_size,
                max_size,
            } => write!(
                f,
                "no feasible extent near {start}..{end}: filesystem allows \
                 {min_size} to {max_size} sectors"
            ),
        }
    }
}

impl std::error::Error for SolveError {}

/// Replaces `sector` with `new_sector` if the latter lies within `range`.
fn snap(sector: &mut Sector, new_sector: Sector, range: &Geometry) -> bool {
    debug_assert!(range.contains_sector(*sector));
    if !range.contains_sector(new_sector) {
        return false;
    }
    *sector = new_sector;
    true
}

/// Tries candidate replacements in order of preference; the first one
/// inside `range` wins and ends the search.
fn try_snap(
    sector: &mut Sector,
    range: &Geometry,
    candidates: impl IntoIterator<Item = Option<Sector>>,
) {
    for candidate in candidates.into_iter().flatten() {
        if snap(sector, candidate, range) {
            break;
        }
    }
}

/// Snaps `new_geom` to nearby partition boundaries.
///
/// Boundaries of `old_geom` are preferred, so re-running a resize that
/// changed nothing keeps the extent bit-identical. Without a table (raw
/// image mode) there are no neighbours to snap to and the extent passes
/// through unchanged.
pub fn snap_to_boundaries(
    new_geom: Geometry,
    old_geom: Option<&Geometry>,
    table: Option<&dyn PartitionTable>,
    start_range: &Geometry,
    end_range: &Geometry,
) -> Result<Geometry, SolveError> {
    let Some(table) = table else {
        return Ok(new_geom);
    };

    let mut start = new_geom.start;
    let mut end = new_geom.end();

    let start_part = table
        .partition_by_sector(start)
        .ok_or(SolveError::OutsideLayout { sector: start })?
        .geom;
    let end_part = match table.partition_by_sector(end) {
        Some(p) => p.geom,
        None => return Ok(new_geom),
    };

    try_snap(
        &mut start,
        start_range,
        [
            old_geom.map(|g| g.start),
            Some(start_part.start),
            Some(start_part.end() + 1),
        ],
    );
    try_snap(
        &mut end,
        end_range,
        [
            old_geom.map(|g| g.end()),
            Some(end_part.end()),
            end_part.start.checked_sub(1),
        ],
    );

    Geometry::from_bounds(start, end).ok_or(SolveError::Inverted { start, end })
}

/// The operator's side of the effective constraint: start and end pinned
/// to their wiggle-room ranges, length bounded only by the device.
pub fn user_constraint(dev: &Device, start_range: &Geometry, end_range: &Geometry) -> Constraint {
    Constraint::new(*start_range, *end_range, 1, dev.length)
}

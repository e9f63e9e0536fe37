// SPDX-License-Identifier: MIT

//! Feasible-placement constraints for a partition extent.
//!
//! A constraint bounds where the start and end sectors may land and how
//! long the extent may be. Constraints from independent sources (the
//! operator's requested range, the filesystem's own resize limits) are
//! combined by intersection; an empty intersection means the request is
//! infeasible, not that anything is corrupt.

use crate::geom::{Geometry, Sector};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constraint {
    /// Sectors the extent may start on.
    pub start_range: Geometry,
    /// Sectors the extent may end on.
    pub end_range: Geometry,
    /// Extent length bounds, in sectors.
    pub min_size: Sector,
    pub max_size: Sector,
}

impl Constraint {
    pub fn new(
        start_range: Geometry,
        end_range: Geometry,
        min_size: Sector,
        max_size: Sector,
    ) -> Self {
        Self {
            start_range,
            end_range,
            min_size,
            max_size,
        }
    }

    /// Intersection of two constraints. `None` when the ranges are
    /// disjoint or the size bounds cross.
    pub fn intersect(&self, other: &Constraint) -> Option<Constraint> {
        let start_range = self.start_range.intersect(&other.start_range)?;
        let end_range = self.end_range.intersect(&other.end_range)?;
        let min_size = self.min_size.max(other.min_size);
        let max_size = self.max_size.min(other.max_size);
        if min_size > max_size {
            return None;
        }
        Some(Constraint::new(start_range, end_range, min_size, max_size))
    }

    pub fn allows(&self, geom: &Geometry) -> bool {
        self.start_range.contains_sector(geom.start)
            && self.end_range.contains_sector(geom.end())
            && geom.length >= self.min_size
            && geom.length <= self.max_size
    }

    /// Solution of the constraint nearest to the proposed `start..=end`.
    ///
    /// Start and end are clamped into their ranges, then the end is pulled
    /// until the length bounds hold. `None` when no placement satisfies
    /// everything at once.
    pub fn solve_nearest(&self, start: Sector, end: Sector) -> Option<Geometry> {
        let start = clamp_into(&self.start_range, start);
        let mut end = clamp_into(&self.end_range, end);

        if end < start {
            return None;
        }
        let length = end - start + 1;
        if length > self.max_size {
            end = start + self.max_size - 1;
        } else if length < self.min_size {
            end = start + self.min_size - 1;
        }
        if !self.end_range.contains_sector(end) {
            return None;
        }

        let solved = Geometry::from_bounds(start, end)?;
        self.allows(&solved).then_some(solved)
    }
}

fn clamp_into(range: &Geometry, sector: Sector) -> Sector {
    sector.clamp(range.start, range.end())
}

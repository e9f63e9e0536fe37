// SPDX-License-Identifier: MIT

use crate::constraint::Constraint;
use crate::error::PartResult;
use crate::geom::{Geometry, Sector};

/// One entry of a partition table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    /// Table slot, 1-based.
    pub num: u32,
    pub geom: Geometry,
    /// Filesystem kind as the label records it (e.g. `fat16`, `fat32`).
    pub fs_kind: Option<String>,
    /// Whether the partition is in use (mounted) and must not be touched.
    pub busy: bool,
}

/// An in-memory view of a device's partition table.
///
/// Mutations accumulate in the handle; nothing reaches the device until
/// [`commit`](PartitionTable::commit).
pub trait PartitionTable: std::fmt::Debug {
    fn partitions(&self) -> &[Partition];

    fn partition(&self, num: u32) -> Option<&Partition> {
        self.partitions().iter().find(|p| p.num == num)
    }

    fn partition_by_sector(&self, sector: Sector) -> Option<&Partition> {
        self.partitions()
            .iter()
            .find(|p| p.geom.contains_sector(sector))
    }

    /// Moves partition `num` to the solution of `constraint` nearest to
    /// `start..=end` and returns the geometry actually adopted.
    fn set_geometry(
        &mut self,
        num: u32,
        constraint: &Constraint,
        start: Sector,
        end: Sector,
    ) -> PartResult<Geometry>;

    fn set_fs_kind(&mut self, num: u32, kind: &str) -> PartResult<()>;

    /// Writes the accumulated changes back to the device.
    fn commit(&mut self) -> PartResult<()>;
}

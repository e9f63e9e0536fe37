// SPDX-License-Identifier: MIT

use std::path::{Path, PathBuf};

use crate::condition::SharedHandler;
use crate::error::PartResult;
use crate::geom::{Geometry, Sector};
use crate::table::PartitionTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    /// A real block device.
    Block,
    /// A regular file holding a disk or filesystem image.
    File,
}

/// An opened device. Immutable once opened; owned by the orchestrator for
/// the lifetime of the run and released on drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub path: PathBuf,
    pub sector_size: u64,
    /// Device length in sectors.
    pub length: Sector,
    pub kind: DeviceKind,
}

impl Device {
    /// The whole device as one extent.
    pub fn whole(&self) -> Geometry {
        Geometry::new(0, self.length)
    }

    #[inline]
    pub fn bytes(&self, sectors: Sector) -> u64 {
        sectors * self.sector_size
    }
}

/// Outcome of a quiet probe: no hidden control flow, just a value.
#[derive(Debug, Clone)]
pub enum Probe {
    Found(Device),
    NotFound,
}

/// Entry point into the partition library.
pub trait DeviceAccess {
    /// Registers the decision callback once at startup. Conditions raised
    /// by any later call on this access (or tables it hands out) go
    /// through it.
    fn set_condition_handler(&mut self, handler: SharedHandler);

    /// Probes `path` as a device. Conditions the library would raise are
    /// caught and folded into [`Probe::NotFound`], never surfaced.
    fn probe(&mut self, path: &Path) -> Probe;

    /// Opens `path` as a device, raising conditions on failure.
    fn open(&mut self, path: &Path) -> PartResult<Device>;

    /// Reads the partition table of an opened device.
    fn read_table(&mut self, dev: &Device) -> PartResult<Box<dyn PartitionTable>>;
}

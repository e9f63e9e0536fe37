// SPDX-License-Identifier: MIT

//! In-memory implementation of the device/partition-table contract.
//!
//! Useful for tests and as the reference behavior a real label backend
//! must reproduce: constraint solving in `set_geometry`, overlap refusal,
//! commit counting, condition raising on open failures.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::condition::{Choices, Condition, SharedHandler, Severity, raise};
use crate::constraint::Constraint;
use crate::device::{Device, DeviceAccess, DeviceKind, Probe};
use crate::error::{PartError, PartResult};
use crate::geom::{Geometry, Sector};
use crate::table::{Partition, PartitionTable};

/// Backing state of one registered device, shared with handed-out tables.
#[derive(Debug)]
pub struct MemDeviceState {
    pub sector_size: u64,
    pub length: Sector,
    pub kind: DeviceKind,
    pub parts: Vec<Partition>,
    /// Number of times a table has been committed to this device.
    pub commits: u32,
}

pub type MemDeviceHandle = Rc<RefCell<MemDeviceState>>;

/// In-memory device registry implementing [`DeviceAccess`].
#[derive(Default)]
pub struct MemAccess {
    devices: HashMap<PathBuf, MemDeviceHandle>,
    handler: Option<SharedHandler>,
}

impl MemAccess {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(
        mut self,
        path: impl Into<PathBuf>,
        sector_size: u64,
        length: Sector,
        kind: DeviceKind,
    ) -> Self {
        self.devices.insert(
            path.into(),
            Rc::new(RefCell::new(MemDeviceState {
                sector_size,
                length,
                kind,
                parts: Vec::new(),
                commits: 0,
            })),
        );
        self
    }

    pub fn with_partition(self, path: impl AsRef<Path>, part: Partition) -> Self {
        self.devices
            .get(path.as_ref())
            .expect("with_partition: unknown device")
            .borrow_mut()
            .parts
            .push(part);
        self
    }

    /// Test inspection hook.
    pub fn device(&self, path: impl AsRef<Path>) -> Option<MemDeviceHandle> {
        self.devices.get(path.as_ref()).cloned()
    }

    fn make_device(&self, path: &Path, state: &MemDeviceHandle) -> Device {
        let s = state.borrow();
        Device {
            path: path.to_path_buf(),
            sector_size: s.sector_size,
            length: s.length,
            kind: s.kind,
        }
    }
}

impl DeviceAccess for MemAccess {
    fn set_condition_handler(&mut self, handler: SharedHandler) {
        self.handler = Some(handler);
    }

    fn probe(&mut self, path: &Path) -> Probe {
        match self.devices.get(path) {
            Some(state) => Probe::Found(self.make_device(path, state)),
            None => Probe::NotFound,
        }
    }

    fn open(&mut self, path: &Path) -> PartResult<Device> {
        match self.devices.get(path) {
            Some(state) => Ok(self.make_device(path, state)),
            None => {
                raise(
                    self.handler.as_ref(),
                    &Condition::new(
                        Severity::Error,
                        Choices::CANCEL,
                        format!("Could not stat device {}.", path.display()),
                    ),
                );
                Err(PartError::NotFound(path.to_path_buf()))
            }
        }
    }

    fn read_table(&mut self, dev: &Device) -> PartResult<Box<dyn PartitionTable>> {
        let state = self
            .devices
            .get(&dev.path)
            .ok_or_else(|| PartError::NotFound(dev.path.clone()))?;
        if state.borrow().parts.is_empty() {
            raise(
                self.handler.as_ref(),
                &Condition::new(
                    Severity::Error,
                    Choices::CANCEL,
                    format!("Unrecognised disk label on {}.", dev.path.display()),
                ),
            );
            return Err(PartError::NoTable(dev.path.clone()));
        }
        let parts = state.borrow().parts.clone();
        Ok(Box::new(MemTable {
            state: state.clone(),
            parts,
        }))
    }
}

/// Working copy of a device's table; mutations land on `commit`.
#[derive(Debug)]
pub struct MemTable {
    state: MemDeviceHandle,
    parts: Vec<Partition>,
}

impl MemTable {
    fn part_mut(&mut self, num: u32) -> PartResult<&mut Partition> {
        self.parts
            .iter_mut()
            .find(|p| p.num == num)
            .ok_or(PartError::NoSuchPartition(num))
    }
}

impl PartitionTable for MemTable {
    fn partitions(&self) -> &[Partition] {
        &self.parts
    }

    fn set_geometry(
        &mut self,
        num: u32,
        constraint: &Constraint,
        start: Sector,
        end: Sector,
    ) -> PartResult<Geometry> {
        let device_length = self.state.borrow().length;
        let solved = constraint
            .solve_nearest(start, end)
            .ok_or(PartError::NoSolution { start, end })?;
        if solved.end() >= device_length {
            return Err(PartError::NoSolution { start, end });
        }
        if let Some(other) = self
            .parts
            .iter()
            .find(|p| p.num != num && p.geom.intersect(&solved).is_some())
        {
            return Err(PartError::Overlap(other.num));
        }
        self.part_mut(num)?.geom = solved;
        Ok(solved)
    }

    fn set_fs_kind(&mut self, num: u32, kind: &str) -> PartResult<()> {
        self.part_mut(num)?.fs_kind = Some(kind.to_string());
        Ok(())
    }

    fn commit(&mut self) -> PartResult<()> {
        let mut state = self.state.borrow_mut();
        state.parts = self.parts.clone();
        state.commits += 1;
        Ok(())
    }
}

// SPDX-License-Identifier: MIT

//! In-memory FAT volume model implementing the engine contract.
//!
//! The model tracks just enough state for the pipeline to be exercised
//! end to end: cluster usage bounds the minimum size, free space after
//! the volume bounds the maximum, growth past the FAT16 ceiling flips the
//! kind to FAT32, and every resize rewrites the boot sector.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use fatresize_part::{
    Choice, Choices, Condition, Device, Geometry, Resolution, Sector, Severity, SharedHandler,
    raise,
};

use crate::error::{FsError, FsResult};
use crate::timer::Timer;
use crate::{FsKind, FsResizer, FsVolume, ResizeConstraint, ResizeOutcome};

/// Largest volume a FAT16 layout covers at 512-byte sectors (2 GiB).
pub const FAT16_MAX_SECTORS: Sector = 4_194_304;

/// Sectors the model charges for reserved sectors, FATs and root metadata.
const FS_OVERHEAD_SECTORS: Sector = 32;

/// Progress reports emitted across one simulated resize.
const RESIZE_STEPS: u32 = 4;

/// Description of one modeled volume, registered per device path.
#[derive(Debug, Clone)]
pub struct MemVolume {
    pub kind: FsKind,
    /// Sectors holding live data; the volume cannot shrink below these.
    pub used_sectors: Sector,
    /// Overrides the derived maximum size (e.g. a FAT16 format ceiling).
    pub max_size: Option<Sector>,
    /// Growing past this many sectors converts FAT16 to FAT32.
    pub fat32_threshold: Sector,
    /// When set, every resize raises this warning first.
    pub warn_on_resize: Option<String>,
}

impl MemVolume {
    pub fn new(kind: FsKind, used_sectors: Sector) -> Self {
        Self {
            kind,
            used_sectors,
            max_size: None,
            fat32_threshold: FAT16_MAX_SECTORS,
            warn_on_resize: None,
        }
    }

    pub fn with_max_size(mut self, max_size: Sector) -> Self {
        self.max_size = Some(max_size);
        self
    }

    pub fn with_fat32_threshold(mut self, sectors: Sector) -> Self {
        self.fat32_threshold = sectors;
        self
    }

    pub fn with_resize_warning(mut self, message: impl Into<String>) -> Self {
        self.warn_on_resize = Some(message.into());
        self
    }
}

/// Live state behind every volume opened from the same path.
#[derive(Debug)]
pub struct MemVolState {
    pub volume: MemVolume,
    /// Number of completed resizes, for test inspection.
    pub resizes: u32,
    /// Extent adopted by the last resize.
    pub geom: Option<Geometry>,
}

pub type MemVolHandle = Rc<RefCell<MemVolState>>;

/// In-memory resize engine implementing [`FsResizer`].
#[derive(Default)]
pub struct MemFatResizer {
    vols: HashMap<PathBuf, MemVolHandle>,
    handler: Option<SharedHandler>,
}

impl MemFatResizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_volume(mut self, path: impl Into<PathBuf>, volume: MemVolume) -> Self {
        self.vols.insert(
            path.into(),
            Rc::new(RefCell::new(MemVolState {
                volume,
                resizes: 0,
                geom: None,
            })),
        );
        self
    }

    /// Test inspection hook.
    pub fn volume(&self, path: impl Into<PathBuf>) -> Option<MemVolHandle> {
        self.vols.get(&path.into()).cloned()
    }
}

impl FsResizer for MemFatResizer {
    fn set_condition_handler(&mut self, handler: SharedHandler) {
        self.handler = Some(handler);
    }

    fn open(&mut self, dev: &Device, geom: &Geometry) -> FsResult<Box<dyn FsVolume>> {
        match self.vols.get(&dev.path) {
            Some(state) => Ok(Box::new(MemOpenVolume {
                state: state.clone(),
                handler: self.handler.clone(),
                device_length: dev.length,
                geom: *geom,
            })),
            None => {
                raise(
                    self.handler.as_ref(),
                    &Condition::new(
                        Severity::Error,
                        Choices::CANCEL,
                        format!("no FAT file system found on {}", dev.path.display()),
                    ),
                );
                Err(FsError::NoFilesystem(dev.path.clone()))
            }
        }
    }
}

struct MemOpenVolume {
    state: MemVolHandle,
    handler: Option<SharedHandler>,
    device_length: Sector,
    geom: Geometry,
}

impl MemOpenVolume {
    fn constraint(&self) -> ResizeConstraint {
        let state = self.state.borrow();
        let min_size = state.volume.used_sectors + FS_OVERHEAD_SECTORS;
        let max_size = state
            .volume
            .max_size
            .unwrap_or(self.device_length - self.geom.start);
        ResizeConstraint { min_size, max_size }
    }
}

impl FsVolume for MemOpenVolume {
    fn kind(&self) -> FsKind {
        self.state.borrow().volume.kind
    }

    fn geometry(&self) -> Geometry {
        self.geom
    }

    fn resize_constraint(&mut self) -> FsResult<ResizeConstraint> {
        Ok(self.constraint())
    }

    fn resize(
        &mut self,
        new_geom: &Geometry,
        mut timer: Option<&mut Timer<'_>>,
    ) -> FsResult<ResizeOutcome> {
        let warning = self.state.borrow().volume.warn_on_resize.clone();
        if let Some(message) = warning {
            let resolution = raise(
                self.handler.as_ref(),
                &Condition::new(Severity::Warning, Choices::IGNORE | Choices::CANCEL, message),
            );
            if resolution != Resolution::Chosen(Choice::Ignore) {
                return Err(FsError::Cancelled);
            }
        }

        let rc = self.constraint();
        if new_geom.length < rc.min_size || new_geom.length > rc.max_size {
            return Err(FsError::Infeasible {
                length: new_geom.length,
                min: rc.min_size,
                max: rc.max_size,
            });
        }

        if let Some(timer) = timer.as_deref_mut() {
            timer.set_state("resizing");
            for step in 0..=RESIZE_STEPS {
                timer.update(step as f32 / RESIZE_STEPS as f32);
            }
        }

        let mut state = self.state.borrow_mut();
        if state.volume.kind == FsKind::Fat16 && new_geom.length > state.volume.fat32_threshold {
            state.volume.kind = FsKind::Fat32;
        }
        state.geom = Some(*new_geom);
        state.resizes += 1;
        self.geom = *new_geom;

        Ok(ResizeOutcome {
            kind: state.volume.kind,
            boot_dirty: true,
        })
    }
}

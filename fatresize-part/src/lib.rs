// SPDX-License-Identifier: MIT

//! Device and partition-table access boundary.
//!
//! The resize pipeline never touches a disk label by itself: it drives a
//! partition library through the [`DeviceAccess`] and [`PartitionTable`]
//! traits and receives decisions back through the [`ConditionHandler`]
//! registration point. The `mem` feature ships an in-memory implementation
//! of the whole contract, used by the test suite and as the reference for
//! real backends.

pub mod condition;
pub mod constraint;
pub mod device;
pub mod error;
pub mod geom;
pub mod table;

#[cfg(feature = "mem")]
pub mod mem;

pub use condition::{
    Choice, Choices, Condition, ConditionHandler, Resolution, Severity, SharedHandler, raise,
};
pub use constraint::Constraint;
pub use device::{Device, DeviceAccess, DeviceKind, Probe};
pub use error::{PartError, PartResult};
pub use geom::{Geometry, Sector};
pub use table::{Partition, PartitionTable};

pub const DEFAULT_SECTOR_SIZE: u64 = 512;

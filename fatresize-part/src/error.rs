// SPDX-License-Identifier: MIT

use core::fmt;
use std::path::PathBuf;

use crate::geom::Sector;

/// Unified error type for device and partition-table operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartError {
    /// The path names no device the backend recognizes.
    NotFound(PathBuf),
    /// The device carries no partition table the backend can read.
    NoTable(PathBuf),
    NoSuchPartition(u32),
    /// The requested geometry admits no solution inside the constraint.
    NoSolution { start: Sector, end: Sector },
    /// The solved geometry would overlap partition `n`.
    Overlap(u32),
    /// The operation was cancelled at a decision prompt.
    Cancelled,
    Invalid(&'static str),
}

impl fmt::Display for PartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartError::NotFound(path) => write!(f, "cannot find device {}", path.display()),
            PartError::NoTable(path) => {
                write!(f, "unrecognised disk label on {}", path.display())
            }
            PartError::NoSuchPartition(num) => write!(f, "no partition {num}"),
            PartError::NoSolution { start, end } => {
                write!(f, "no constraint solution near {start}..{end}")
            }
            PartError::Overlap(num) => write!(f, "would overlap partition {num}"),
            PartError::Cancelled => write!(f, "cancelled"),
            PartError::Invalid(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for PartError {}

pub type PartResult<T = ()> = Result<T, PartError>;

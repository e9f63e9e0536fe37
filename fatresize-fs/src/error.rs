// SPDX-License-Identifier: MIT

use core::fmt;
use std::path::PathBuf;

use fatresize_part::Sector;

/// Unified error type for resize engine operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsError {
    /// No FAT filesystem was found on the given extent.
    NoFilesystem(PathBuf),
    /// The requested size falls outside what the filesystem supports.
    Infeasible {
        length: Sector,
        min: Sector,
        max: Sector,
    },
    /// The operation was cancelled at a decision prompt.
    Cancelled,
    Invalid(&'static str),
}

impl fmt::Display for FsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FsError::NoFilesystem(path) => {
                write!(f, "no FAT file system found on {}", path.display())
            }
            FsError::Infeasible { length, min, max } => write!(
                f,
                "cannot resize to {length} sectors (filesystem allows {min}..{max})"
            ),
            FsError::Cancelled => write!(f, "cancelled"),
            FsError::Invalid(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for FsError {}

pub type FsResult<T = ()> = Result<T, FsError>;

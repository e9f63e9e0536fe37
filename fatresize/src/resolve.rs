// SPDX-License-Identifier: MIT

//! Turns an operator-supplied path into a device plus partition number.
//!
//! Block-device paths carry the partition in a trailing number
//! (`/dev/sda1`), with volume-manager style names inserting a `p`
//! between device and number (`/dev/nvme0n1p3`). Image files and
//! already-whole devices probe as devices in their own right. The naming
//! heuristic is kept exactly as the tool has always shipped it; schemes
//! beyond it are served by `--partition`.

use core::fmt;
use std::fs::Metadata;
use std::path::PathBuf;

use fatresize_part::{DeviceAccess, Probe};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    NotFound(String),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::NotFound(path) => {
                write!(f, "{path} is not an existing device or image")
            }
        }
    }
}

impl std::error::Error for ResolveError {}

/// Resolution result: the device path to open and the partition to act
/// on. `pnum == None` means whole-device / raw-image mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub path: PathBuf,
    pub pnum: Option<u32>,
}

/// Partition number inferred from a path's trailing digits, `1` when
/// there are none.
pub fn get_partnum(path: &str) -> u32 {
    let digits = trailing_digits(path);
    if digits.is_empty() {
        return 1;
    }
    match digits.parse::<u32>() {
        Ok(0) | Err(_) => 1,
        Ok(n) => n,
    }
}

/// Candidate parent device name: the path minus its trailing digits,
/// minus one more `p` when the name is volume-manager style (a `p`
/// preceded by a digit, past the third character).
pub fn parent_device_name(path: &str) -> String {
    let stem = &path[..path.len() - trailing_digits(path).len()];
    let bytes = stem.as_bytes();
    if stem.len() > 3
        && bytes[stem.len() - 1] == b'p'
        && bytes[stem.len() - 2].is_ascii_digit()
    {
        return stem[..stem.len() - 1].to_string();
    }
    stem.to_string()
}

fn trailing_digits(path: &str) -> &str {
    let start = path
        .rfind(|c: char| !c.is_ascii_digit())
        .map_or(0, |i| i + 1);
    &path[start..]
}

/// Resolves `path`, delegating device probes to `access`. An explicitly
/// supplied partition number always wins over inference.
pub fn resolve(
    access: &mut dyn DeviceAccess,
    path: &str,
    explicit_pnum: Option<u32>,
) -> Result<Resolved, ResolveError> {
    let not_found = || ResolveError::NotFound(path.to_string());
    let meta = std::fs::metadata(path).map_err(|_| not_found())?;

    // Non-block paths (disk images, loop files) probe directly.
    if !is_block_device(&meta) {
        return match access.probe(path.as_ref()) {
            Probe::Found(_) => Ok(Resolved {
                path: path.into(),
                pnum: explicit_pnum,
            }),
            Probe::NotFound => Err(not_found()),
        };
    }

    let parent = parent_device_name(path);
    match access.probe(parent.as_ref()) {
        Probe::Found(_) => Ok(Resolved {
            path: parent.into(),
            pnum: explicit_pnum.or_else(|| Some(get_partnum(path))),
        }),
        // The path may already name a whole, unpartitioned device.
        Probe::NotFound => match access.probe(path.as_ref()) {
            Probe::Found(_) => Ok(Resolved {
                path: path.into(),
                pnum: explicit_pnum,
            }),
            Probe::NotFound => Err(not_found()),
        },
    }
}

#[cfg(unix)]
fn is_block_device(meta: &Metadata) -> bool {
    use std::os::unix::fs::FileTypeExt;
    meta.file_type().is_block_device()
}

#[cfg(not(unix))]
fn is_block_device(_meta: &Metadata) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partnum_from_trailing_digits() {
        assert_eq!(get_partnum("/dev/sda12"), 12);
        assert_eq!(get_partnum("/dev/sda1"), 1);
        assert_eq!(get_partnum("/dev/nvme0n1p3"), 3);
        assert_eq!(get_partnum("/dev/sda"), 1);
        assert_eq!(get_partnum("/dev/sda0"), 1);
    }

    #[test]
    fn parent_strips_trailing_digits() {
        assert_eq!(parent_device_name("/dev/sda1"), "/dev/sda");
        assert_eq!(parent_device_name("/dev/sda12"), "/dev/sda");
        assert_eq!(parent_device_name("/dev/sda"), "/dev/sda");
    }

    #[test]
    fn parent_strips_volume_manager_p() {
        assert_eq!(parent_device_name("/dev/nvme0n1p3"), "/dev/nvme0n1");
        assert_eq!(parent_device_name("/dev/mmcblk0p1"), "/dev/mmcblk0");
        // No digit before the `p`: left alone.
        assert_eq!(parent_device_name("/dev/loop1"), "/dev/loop");
    }
}

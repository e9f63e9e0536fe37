// SPDX-License-Identifier: MIT

//! Compiled-in collaborator stack.
//!
//! The partition library and the FAT resize engine stay behind the
//! [`DeviceAccess`](fatresize_part::DeviceAccess) and
//! [`FsResizer`](fatresize_fs::FsResizer) traits; any pair implementing
//! them can drive the pipeline. This tree ships the in-memory reference
//! pair, which models the full contract and backs the test suite. A
//! production build binds its platform backends here and changes nothing
//! else.

use fatresize_fs::mem::MemFatResizer;
use fatresize_part::mem::MemAccess;

pub fn stack() -> (MemAccess, MemFatResizer) {
    (MemAccess::new(), MemFatResizer::new())
}

//! End-to-end pipeline scenarios against the in-memory backends.
//!
//! Devices are keyed by real temp-file paths so resolution takes the
//! image-file route, with `--partition` selecting table entries the way
//! an operator would on a partitioned image.

use std::io::Cursor;
use std::path::Path;

use tempfile::NamedTempFile;

use fatresize::app;
use fatresize::bridge::{Bridge, BridgeMode};
use fatresize::cli::Options;
use fatresize::size::parse_size;
use fatresize_fs::FsKind;
use fatresize_fs::mem::{MemFatResizer, MemVolume};
use fatresize_part::mem::MemAccess;
use fatresize_part::{DEFAULT_SECTOR_SIZE as SECTOR_SIZE, DeviceKind, Geometry, Partition, SharedHandler};

const DEVICE_LENGTH: u64 = 500_000;

fn options(path: &Path, size: Option<&str>, pnum: Option<u32>, info: bool) -> Options {
    Options {
        path: path.to_str().unwrap().to_string(),
        size: size.map(|s| parse_size(s).unwrap()),
        pnum,
        info,
        force_yes: true,
        progress: false,
        verbosity: 0,
    }
}

fn fat_partition(num: u32, start: u64, length: u64, kind: &str) -> Partition {
    Partition {
        num,
        geom: Geometry::new(start, length),
        fs_kind: Some(kind.to_string()),
        busy: false,
    }
}

fn auto_bridge() -> SharedHandler {
    Bridge::with_input(BridgeMode::Automatic, 0, Cursor::new(Vec::new())).shared()
}

fn interactive_bridge(answers: &str) -> SharedHandler {
    Bridge::with_input(
        BridgeMode::Interactive,
        0,
        Cursor::new(answers.as_bytes().to_vec()),
    )
    .shared()
}

#[test]
fn info_mode_mutates_nothing() {
    let tmp = NamedTempFile::new().unwrap();
    let path = tmp.path();
    let mut access = MemAccess::new()
        .with_device(path, SECTOR_SIZE, DEVICE_LENGTH, DeviceKind::File)
        .with_partition(path, fat_partition(1, 2048, 204_800, "fat32"));
    let mut engine =
        MemFatResizer::new().with_volume(path, MemVolume::new(FsKind::Fat32, 8_192));

    let opts = options(path, None, Some(1), true);
    app::run(&opts, &mut access, &mut engine, auto_bridge()).unwrap();
    app::run(&opts, &mut access, &mut engine, auto_bridge()).unwrap();

    let device = access.device(path).unwrap();
    assert_eq!(device.borrow().commits, 0);
    assert_eq!(device.borrow().parts[0].geom, Geometry::new(2048, 204_800));
    assert_eq!(engine.volume(path).unwrap().borrow().resizes, 0);
}

#[test]
fn size_max_stops_at_the_filesystem_maximum() {
    let tmp = NamedTempFile::new().unwrap();
    let path = tmp.path();
    // The partition offers 204800 sectors but the filesystem tops out at
    // 131072; `max` must mean the latter.
    let mut access = MemAccess::new()
        .with_device(path, SECTOR_SIZE, DEVICE_LENGTH, DeviceKind::File)
        .with_partition(path, fat_partition(1, 2048, 204_800, "fat32"));
    let mut engine = MemFatResizer::new().with_volume(
        path,
        MemVolume::new(FsKind::Fat32, 8_192).with_max_size(131_072),
    );

    let opts = options(path, Some("max"), Some(1), false);
    app::run(&opts, &mut access, &mut engine, auto_bridge()).unwrap();

    let device = access.device(path).unwrap();
    assert_eq!(device.borrow().parts[0].geom.length, 131_072);
    assert_eq!(device.borrow().commits, 1);
    let vol = engine.volume(path).unwrap();
    assert_eq!(vol.borrow().geom.unwrap().length, 131_072);
}

#[test]
fn busy_partition_writes_nothing() {
    let tmp = NamedTempFile::new().unwrap();
    let path = tmp.path();
    let mut busy = fat_partition(1, 2048, 204_800, "fat32");
    busy.busy = true;
    let mut access = MemAccess::new()
        .with_device(path, SECTOR_SIZE, DEVICE_LENGTH, DeviceKind::File)
        .with_partition(path, busy);
    let mut engine =
        MemFatResizer::new().with_volume(path, MemVolume::new(FsKind::Fat32, 8_192));

    let opts = options(path, Some("100M"), Some(1), false);
    let err = app::run(&opts, &mut access, &mut engine, auto_bridge()).unwrap_err();
    assert!(err.to_string().contains("is being used"));

    let device = access.device(path).unwrap();
    assert_eq!(device.borrow().commits, 0);
    assert_eq!(engine.volume(path).unwrap().borrow().resizes, 0);
}

#[test]
fn non_fat_partition_is_refused() {
    let tmp = NamedTempFile::new().unwrap();
    let path = tmp.path();
    let mut access = MemAccess::new()
        .with_device(path, SECTOR_SIZE, DEVICE_LENGTH, DeviceKind::File)
        .with_partition(path, fat_partition(1, 2048, 204_800, "fat32"))
        .with_partition(path, fat_partition(2, 210_000, 100_000, "ext4"));
    let mut engine =
        MemFatResizer::new().with_volume(path, MemVolume::new(FsKind::Fat32, 8_192));

    let opts = options(path, Some("100M"), Some(2), false);
    let err = app::run(&opts, &mut access, &mut engine, auto_bridge()).unwrap_err();
    assert!(err.to_string().contains("not a valid FAT16/FAT32"));
    assert_eq!(access.device(path).unwrap().borrow().commits, 0);
}

#[test]
fn growth_through_the_fat16_ceiling_updates_the_table_kind() {
    let tmp = NamedTempFile::new().unwrap();
    let path = tmp.path();
    let mut access = MemAccess::new()
        .with_device(path, SECTOR_SIZE, DEVICE_LENGTH, DeviceKind::File)
        .with_partition(path, fat_partition(1, 2048, 65_536, "fat16"));
    let mut engine = MemFatResizer::new().with_volume(
        path,
        MemVolume::new(FsKind::Fat16, 8_192).with_fat32_threshold(100_000),
    );

    let opts = options(path, Some("200M"), Some(1), false);
    app::run(&opts, &mut access, &mut engine, auto_bridge()).unwrap();

    let device = access.device(path).unwrap();
    let part = device.borrow().parts[0].clone();
    assert_eq!(part.fs_kind.as_deref(), Some("fat32"));
    assert_eq!(part.geom.length, 390_531);
    assert_eq!(device.borrow().commits, 1);
}

#[test]
fn same_printed_size_is_an_exact_noop() {
    let tmp = NamedTempFile::new().unwrap();
    let path = tmp.path();
    let old_geom = Geometry::new(2048, 204_800);
    let mut access = MemAccess::new()
        .with_device(path, SECTOR_SIZE, DEVICE_LENGTH, DeviceKind::File)
        .with_partition(path, fat_partition(1, 2048, 204_800, "fat32"));
    let mut engine =
        MemFatResizer::new().with_volume(path, MemVolume::new(FsKind::Fat32, 8_192));

    // Exactly the current size: formats identically, so the end sector
    // must come through bit-identical.
    let opts = options(path, Some("104857600"), Some(1), false);
    app::run(&opts, &mut access, &mut engine, auto_bridge()).unwrap();

    let device = access.device(path).unwrap();
    assert_eq!(device.borrow().parts[0].geom, old_geom);
    assert_eq!(engine.volume(path).unwrap().borrow().geom, Some(old_geom));
}

#[test]
fn request_below_the_minimum_is_infeasible() {
    let tmp = NamedTempFile::new().unwrap();
    let path = tmp.path();
    let mut access = MemAccess::new()
        .with_device(path, SECTOR_SIZE, DEVICE_LENGTH, DeviceKind::File)
        .with_partition(path, fat_partition(1, 2048, 204_800, "fat32"));
    let mut engine =
        MemFatResizer::new().with_volume(path, MemVolume::new(FsKind::Fat32, 8_192));

    let opts = options(path, Some("1M"), Some(1), false);
    let err = app::run(&opts, &mut access, &mut engine, auto_bridge()).unwrap_err();
    assert!(err.to_string().contains("no feasible extent"));

    let device = access.device(path).unwrap();
    assert_eq!(device.borrow().commits, 0);
    assert_eq!(engine.volume(path).unwrap().borrow().resizes, 0);
}

#[test]
fn raw_image_resizes_without_a_table() {
    let tmp = NamedTempFile::new().unwrap();
    let path = tmp.path();
    // No partitions registered: whole-image mode must never read a table.
    let mut access =
        MemAccess::new().with_device(path, SECTOR_SIZE, DEVICE_LENGTH, DeviceKind::File);
    let mut engine =
        MemFatResizer::new().with_volume(path, MemVolume::new(FsKind::Fat32, 8_192));

    let opts = options(path, Some("200M"), None, false);
    app::run(&opts, &mut access, &mut engine, auto_bridge()).unwrap();

    let vol = engine.volume(path).unwrap();
    assert_eq!(vol.borrow().resizes, 1);
    assert_eq!(vol.borrow().geom.unwrap().start, 0);
    assert_eq!(access.device(path).unwrap().borrow().commits, 0);
}

#[test]
fn warning_cancelled_at_the_prompt_aborts() {
    let tmp = NamedTempFile::new().unwrap();
    let path = tmp.path();
    let mut access = MemAccess::new()
        .with_device(path, SECTOR_SIZE, DEVICE_LENGTH, DeviceKind::File)
        .with_partition(path, fat_partition(1, 2048, 204_800, "fat32"));
    let mut engine = MemFatResizer::new().with_volume(
        path,
        MemVolume::new(FsKind::Fat32, 8_192).with_resize_warning("The volume is dirty."),
    );

    let mut opts = options(path, Some("80M"), Some(1), false);
    opts.force_yes = false;
    let err =
        app::run(&opts, &mut access, &mut engine, interactive_bridge("cancel\n")).unwrap_err();
    assert!(err.to_string().contains("cancelled"));

    let device = access.device(path).unwrap();
    assert_eq!(device.borrow().commits, 0);
    assert_eq!(engine.volume(path).unwrap().borrow().resizes, 0);
}

#[test]
fn force_yes_rides_over_the_same_warning() {
    let tmp = NamedTempFile::new().unwrap();
    let path = tmp.path();
    let mut access = MemAccess::new()
        .with_device(path, SECTOR_SIZE, DEVICE_LENGTH, DeviceKind::File)
        .with_partition(path, fat_partition(1, 2048, 204_800, "fat32"));
    let mut engine = MemFatResizer::new().with_volume(
        path,
        MemVolume::new(FsKind::Fat32, 8_192).with_resize_warning("The volume is dirty."),
    );

    let opts = options(path, Some("80M"), Some(1), false);
    app::run(&opts, &mut access, &mut engine, auto_bridge()).unwrap();

    assert_eq!(engine.volume(path).unwrap().borrow().resizes, 1);
    assert_eq!(access.device(path).unwrap().borrow().commits, 1);
}

#[test]
fn missing_path_reports_not_found() {
    let mut access = MemAccess::new();
    let mut engine = MemFatResizer::new();
    let opts = options(Path::new("/nonexistent/disk.img"), Some("100M"), None, false);
    let err = app::run(&opts, &mut access, &mut engine, auto_bridge()).unwrap_err();
    assert!(err.to_string().contains("not an existing device"));
}

// SPDX-License-Identifier: MIT

//! The resize pipeline: resolve, measure, solve, commit.
//!
//! Every step is fail-fast; an error leaves the device as it was up to
//! the last completed step. Handles (device, table, open volume) are
//! plain values dropped on every exit path.

use anyhow::{anyhow, bail};

use fatresize_fs::{FsResizer, Timer};
use fatresize_part::{
    Choices, Condition, DeviceAccess, DeviceKind, Geometry, PartitionTable, Severity,
    SharedHandler, raise,
};

use crate::cli::Options;
use crate::resolve;
use crate::size::SizeRequest;
use crate::solve::{self, SolveError};
use crate::units;
use crate::utils::ResizeProgress;

pub fn run(
    opts: &Options,
    access: &mut dyn DeviceAccess,
    engine: &mut dyn FsResizer,
    handler: SharedHandler,
) -> anyhow::Result<()> {
    access.set_condition_handler(handler.clone());
    engine.set_condition_handler(handler.clone());

    let resolved = resolve::resolve(access, &opts.path, opts.pnum)?;
    crate::log_trace!("open_device({})", resolved.path.display());
    let dev = access.open(&resolved.path)?;

    let mut table: Option<Box<dyn PartitionTable>> = None;
    let part_geom: Geometry;
    if let Some(num) = resolved.pnum {
        crate::log_trace!("read_table(partition {num})");
        let t = access.read_table(&dev)?;
        let part = t
            .partition(num)
            .ok_or_else(|| anyhow!("no partition {num} on {}", dev.path.display()))?;
        if !part.fs_kind.as_deref().unwrap_or("").starts_with("fat") {
            bail!("{} is not a valid FAT16/FAT32 partition", opts.path);
        }
        if part.busy {
            bail!(
                "partition {} is being used; unmount it before resizing",
                opts.path
            );
        }
        part_geom = part.geom;
        table = Some(t);
    } else {
        part_geom = dev.whole();
    }

    println!(
        "part(start={}, end={}, length={})",
        part_geom.start,
        part_geom.end(),
        part_geom.length
    );

    let mut size = opts.size;
    if opts.info || size == Some(SizeRequest::Max) {
        crate::log_trace!("open_fs()");
        let mut vol = engine.open(&dev, &part_geom)?;
        crate::log_trace!("resize_constraint()");
        let rc = vol.resize_constraint()?;
        if opts.info {
            println!("FAT: {}", vol.kind());
            println!("Cur size: {}", dev.bytes(vol.geometry().length));
            println!("Min size: {}", dev.bytes(rc.min_size));
            println!("Max size: {}", dev.bytes(rc.max_size));
            return Ok(());
        }
        size = Some(SizeRequest::Bytes(dev.bytes(rc.max_size)));
    }
    let Some(SizeRequest::Bytes(size_bytes)) = size else {
        bail!("You must specify new size.");
    };

    let start = part_geom.start;
    let range_start = Geometry::new(start, 1);

    // The end sector a byte count lands on, passed through the unit
    // formatter both ways. If the old and new ends print the same, the
    // request is a no-op in human units: keep the exact old end rather
    // than letting sub-unit rounding nudge it.
    let mut end = start + size_bytes / dev.sector_size;
    let old_str = units::format_sector(dev.sector_size, part_geom.end());
    let new_str = units::format_sector(dev.sector_size, end);
    let range_end;
    if old_str == new_str {
        end = part_geom.end();
        range_end = Geometry::new(end, 1);
    } else {
        crate::log_trace!("unit_parse({new_str})");
        (end, range_end) = units::parse_sector(&new_str, dev.sector_size, dev.length)
            .ok_or_else(|| {
                anyhow!(
                    "requested size {size_bytes} does not fit on {}",
                    dev.path.display()
                )
            })?;
    }

    let new_geom =
        Geometry::from_bounds(start, end).ok_or(SolveError::Inverted { start, end })?;
    crate::log_trace!("snap_to_boundaries({new_geom})");
    let new_geom = solve::snap_to_boundaries(
        new_geom,
        Some(&part_geom),
        table.as_deref(),
        &range_start,
        &range_end,
    )?;

    crate::log_trace!("open_fs()");
    let mut vol = engine.open(&dev, &part_geom)?;
    crate::log_trace!("constraint_intersect()");
    let rc = vol.resize_constraint()?;
    let fs_constraint = rc
        .to_constraint(&part_geom, dev.length)
        .ok_or(SolveError::Infeasible {
            start: new_geom.start,
            end: new_geom.end(),
            min_size: rc.min_size,
            max_size: rc.max_size,
        })?;
    let effective = fs_constraint
        .intersect(&solve::user_constraint(&dev, &range_start, &range_end))
        .ok_or(SolveError::Infeasible {
            start: new_geom.start,
            end: new_geom.end(),
            min_size: rc.min_size,
            max_size: rc.max_size,
        })?;

    let final_geom = match (table.as_mut(), resolved.pnum) {
        (Some(t), Some(num)) => {
            crate::log_trace!("set_partition_geometry({num}, {new_geom})");
            t.set_geometry(num, &effective, new_geom.start, new_geom.end())?
        }
        _ => effective
            .solve_nearest(new_geom.start, new_geom.end())
            .ok_or(SolveError::Infeasible {
                start: new_geom.start,
                end: new_geom.end(),
                min_size: rc.min_size,
                max_size: rc.max_size,
            })?,
    };

    crate::log_status!("Resizing file system.");
    let mut progress = opts.progress.then(|| ResizeProgress::new(opts.verbosity));
    let outcome = {
        let mut timer = progress
            .as_mut()
            .map(|pr| Timer::new(move |p| pr.tick(p)));
        vol.resize(&final_geom, timer.as_mut())?
    };
    if let Some(pr) = progress.as_mut() {
        pr.finish();
    }
    crate::log_status!("Done.");

    if let (Some(t), Some(num)) = (table.as_mut(), resolved.pnum) {
        // May have changed on the way up: FAT16 -> FAT32.
        t.set_fs_kind(num, outcome.kind.as_str())?;
    }
    drop(vol);

    if let Some(mut t) = table {
        crate::log_status!("Committing changes.");
        t.commit()?;
    }

    if outcome.boot_dirty && dev.kind == DeviceKind::Block {
        raise(
            Some(&handler),
            &Condition::new(
                Severity::Warning,
                Choices::OK,
                "You should reinstall your boot loader.",
            ),
        );
    }

    Ok(())
}

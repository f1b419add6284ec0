use crate::snapshot::{percent, DiskInfo, DiskIoTotals, DiskPartition};
use std::collections::BTreeMap;
#[cfg(target_os = "linux")]
use std::fs;
#[cfg(target_os = "linux")]
use std::path::Path;
use sysinfo::Disks;
use tracing::debug;

const SECTOR_SIZE: u64 = 512;

/// A mounted volume as enumerated, before its usage is trusted.
#[derive(Debug, Clone)]
pub struct MountedVolume {
    pub device: String,
    pub mount_point: String,
    pub fs_type: String,
    pub total: u64,
    pub available: u64,
}

pub fn collect_disk() -> DiskInfo {
    let disks = Disks::new_with_refreshed_list();
    let volumes = disks.list().iter().map(|d| MountedVolume {
        device: d.name().to_string_lossy().to_string(),
        mount_point: d.mount_point().display().to_string(),
        fs_type: d.file_system().to_string_lossy().to_string(),
        total: d.total_space(),
        available: d.available_space(),
    });

    DiskInfo {
        partitions: build_partitions(volumes),
        io: read_io_totals(),
    }
}

/// Keys partitions by device. Volumes whose usage cannot be read are left out
/// and enumeration continues; the first mount of a device wins.
pub fn build_partitions(
    volumes: impl IntoIterator<Item = MountedVolume>,
) -> BTreeMap<String, DiskPartition> {
    let mut out = BTreeMap::new();
    for volume in volumes {
        let Some(partition) = partition_usage(&volume) else {
            debug!(
                device = %volume.device,
                mount = %volume.mount_point,
                "раздел пропущен: размер недоступен"
            );
            continue;
        };
        if out.contains_key(&volume.device) {
            debug!(
                device = %volume.device,
                mount = %volume.mount_point,
                "повторное монтирование устройства пропущено"
            );
            continue;
        }
        out.insert(volume.device, partition);
    }
    out
}

/// Zero total size is how an unready or inaccessible volume shows up.
fn partition_usage(volume: &MountedVolume) -> Option<DiskPartition> {
    if volume.total == 0 {
        return None;
    }
    let free = volume.available.min(volume.total);
    let used = volume.total - free;
    Some(DiskPartition {
        mount_point: volume.mount_point.clone(),
        fs_type: volume.fs_type.clone(),
        total: volume.total,
        used,
        free,
        percent: percent(used, volume.total),
    })
}

#[cfg(target_os = "linux")]
fn read_io_totals() -> Option<DiskIoTotals> {
    match fs::read_to_string("/proc/diskstats") {
        Ok(text) => Some(parse_diskstats(&text, |name| {
            Path::new("/sys/block").join(name.replace('/', "!")).exists()
        })),
        Err(err) => {
            debug!(error = %err, "не удалось прочитать /proc/diskstats");
            None
        }
    }
}

#[cfg(not(target_os = "linux"))]
fn read_io_totals() -> Option<DiskIoTotals> {
    None
}

/// Sums sectors read and written over whole devices only, so partitions are
/// not counted twice.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
pub fn parse_diskstats(text: &str, is_whole_disk: impl Fn(&str) -> bool) -> DiskIoTotals {
    let mut totals = DiskIoTotals::default();
    for line in text.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 10 || !is_whole_disk(fields[2]) {
            continue;
        }
        let (Ok(read), Ok(written)) = (fields[5].parse::<u64>(), fields[9].parse::<u64>()) else {
            continue;
        };
        totals.read_bytes = totals
            .read_bytes
            .saturating_add(read.saturating_mul(SECTOR_SIZE));
        totals.write_bytes = totals
            .write_bytes
            .saturating_add(written.saturating_mul(SECTOR_SIZE));
    }
    totals
}

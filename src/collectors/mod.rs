pub mod disk;
pub mod network;
pub mod system;

use crate::snapshot::Snapshot;
use std::time::Duration;
use sysinfo::{Networks, System};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_CPU_SAMPLE_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy)]
pub struct CollectOptions {
    /// Pause between the two CPU counter reads. Zero means a single
    /// non-blocking read.
    pub cpu_sample_interval: Duration,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            cpu_sample_interval: DEFAULT_CPU_SAMPLE_INTERVAL,
        }
    }
}

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("платформа не поддерживается: системные счётчики недоступны")]
    UnsupportedPlatform,
    #[error("ОС не вернула данных ни о процессорах, ни о памяти")]
    NoSystemData,
}

/// Stateless collector: every call to [`Collector::collect`] reads the OS
/// from scratch.
#[derive(Debug, Clone, Copy, Default)]
pub struct Collector {
    options: CollectOptions,
}

impl Collector {
    pub fn new(options: CollectOptions) -> Self {
        Self { options }
    }

    pub fn collect(&self) -> Result<Snapshot, CollectError> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(CollectError::UnsupportedPlatform);
        }

        let mut sys = System::new();
        let cpu = system::collect_cpu(&mut sys, self.options.cpu_sample_interval);
        let memory = system::collect_memory(&mut sys);
        if cpu.logical_cores == 0 && memory.total == 0 {
            return Err(CollectError::NoSystemData);
        }

        let networks = Networks::new_with_refreshed_list();
        let platform = system::collect_platform(&sys, &networks);
        let boot_time = system::collect_boot_time();
        let disk = disk::collect_disk();
        let network = network::collect_network(&networks);

        debug!(
            cpus = cpu.logical_cores,
            partitions = disk.partitions.len(),
            addresses = network.addresses.len(),
            boot_time_known = boot_time.is_some(),
            "снимок системы собран"
        );

        Ok(Snapshot {
            platform,
            boot_time,
            cpu,
            memory,
            disk,
            network,
        })
    }
}

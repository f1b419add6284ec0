use crate::collectors::network;
use crate::snapshot::{percent, BootTime, CpuInfo, MemoryInfo, PlatformInfo};
#[cfg(target_os = "linux")]
use std::fs;
use std::net::{IpAddr, ToSocketAddrs};
use std::thread;
use std::time::Duration;
use sysinfo::{Networks, System, MINIMUM_CPU_UPDATE_INTERVAL};
use tracing::debug;

pub fn collect_platform(system: &System, networks: &Networks) -> PlatformInfo {
    let hostname = non_empty(System::host_name());
    let ip_address = hostname
        .as_deref()
        .and_then(resolve_ipv4)
        .or_else(|| network::primary_ipv4(networks));

    PlatformInfo {
        system: Some(uname_system(std::env::consts::OS)),
        hostname,
        release: non_empty(System::kernel_version()),
        version: non_empty(System::long_os_version().or_else(System::os_version)),
        machine: non_empty(Some(System::cpu_arch())),
        processor: non_empty(system.cpus().first().map(|c| c.brand().trim().to_string())),
        architecture: Some(format!("{}bit", usize::BITS)),
        ip_address,
        mac_address: network::primary_mac(networks),
    }
}

/// OS family spelled the way `uname -s` reports it.
fn uname_system(os: &str) -> String {
    match os {
        "linux" | "android" => "Linux".to_string(),
        "macos" | "ios" => "Darwin".to_string(),
        "windows" => "Windows".to_string(),
        "freebsd" => "FreeBSD".to_string(),
        "openbsd" => "OpenBSD".to_string(),
        "netbsd" => "NetBSD".to_string(),
        "dragonfly" => "DragonFly".to_string(),
        "solaris" | "illumos" => "SunOS".to_string(),
        other => other.to_string(),
    }
}

fn resolve_ipv4(host: &str) -> Option<String> {
    match (host, 0).to_socket_addrs() {
        Ok(addrs) => addrs
            .map(|a| a.ip())
            .find(IpAddr::is_ipv4)
            .map(|ip| ip.to_string()),
        Err(err) => {
            debug!(host, error = %err, "не удалось разрешить имя хоста");
            None
        }
    }
}

pub fn collect_boot_time() -> Option<BootTime> {
    match System::boot_time() {
        0 => {
            debug!("время загрузки недоступно");
            None
        }
        unix_seconds => Some(BootTime { unix_seconds }),
    }
}

pub fn collect_cpu(system: &mut System, sample_interval: Duration) -> CpuInfo {
    system.refresh_cpu_all();
    if !sample_interval.is_zero() {
        thread::sleep(sample_interval.max(MINIMUM_CPU_UPDATE_INTERVAL));
        system.refresh_cpu_all();
    }

    let cpus = system.cpus();
    let per_core_usage: Vec<f32> = cpus.iter().map(|c| c.cpu_usage()).collect();
    let total_usage = if per_core_usage.is_empty() {
        0.0
    } else {
        per_core_usage.iter().sum::<f32>() / per_core_usage.len() as f32
    };

    let frequencies: Vec<u64> = cpus
        .iter()
        .map(|c| c.frequency())
        .filter(|f| *f > 0)
        .collect();
    let current_frequency_mhz = if frequencies.is_empty() {
        None
    } else {
        Some(frequencies.iter().sum::<u64>() as f64 / frequencies.len() as f64)
    };
    let (min_frequency_mhz, max_frequency_mhz) = read_frequency_limits();

    CpuInfo {
        physical_cores: system.physical_core_count(),
        logical_cores: cpus.len(),
        min_frequency_mhz,
        max_frequency_mhz,
        current_frequency_mhz,
        per_core_usage,
        total_usage,
    }
}

#[cfg(target_os = "linux")]
fn read_frequency_limits() -> (Option<f64>, Option<f64>) {
    const CPUFREQ: &str = "/sys/devices/system/cpu/cpu0/cpufreq";
    let read = |file: &str| {
        fs::read_to_string(format!("{CPUFREQ}/{file}"))
            .ok()
            .and_then(|s| parse_khz_as_mhz(&s))
    };
    (read("cpuinfo_min_freq"), read("cpuinfo_max_freq"))
}

#[cfg(not(target_os = "linux"))]
fn read_frequency_limits() -> (Option<f64>, Option<f64>) {
    (None, None)
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_khz_as_mhz(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|v| *v > 0)
        .map(|khz| khz as f64 / 1000.0)
}

pub fn collect_memory(system: &mut System) -> MemoryInfo {
    system.refresh_memory();
    let total = system.total_memory();
    let available = system.available_memory();
    let swap_total = system.total_swap();
    let swap_used = system.used_swap();

    MemoryInfo {
        total,
        available,
        used: system.used_memory(),
        percent: percent(total.saturating_sub(available), total),
        swap_total,
        swap_free: system.free_swap(),
        swap_used,
        swap_percent: percent(swap_used, swap_total),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

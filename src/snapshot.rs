use chrono::{DateTime, Datelike, Local, TimeZone, Timelike};
use serde::Serialize;
use std::collections::BTreeMap;

/// One point-in-time read of the host. Built by the collector, never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub platform: PlatformInfo,
    pub boot_time: Option<BootTime>,
    pub cpu: CpuInfo,
    pub memory: MemoryInfo,
    pub disk: DiskInfo,
    pub network: NetworkInfo,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PlatformInfo {
    pub system: Option<String>,
    pub hostname: Option<String>,
    pub release: Option<String>,
    pub version: Option<String>,
    pub machine: Option<String>,
    pub processor: Option<String>,
    pub architecture: Option<String>,
    pub ip_address: Option<String>,
    pub mac_address: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BootTime {
    pub unix_seconds: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarTime {
    pub day: u32,
    pub month: u32,
    pub year: i32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl BootTime {
    pub fn local(&self) -> Option<DateTime<Local>> {
        let secs = i64::try_from(self.unix_seconds).ok()?;
        Local.timestamp_opt(secs, 0).single()
    }

    pub fn calendar(&self) -> Option<CalendarTime> {
        self.local().map(|dt| CalendarTime {
            day: dt.day(),
            month: dt.month(),
            year: dt.year(),
            hour: dt.hour(),
            minute: dt.minute(),
            second: dt.second(),
        })
    }

    /// `dd/mm/yyyy HH:MM:SS` in local time.
    pub fn display(&self) -> Option<String> {
        self.calendar().map(|c| {
            format!(
                "{:02}/{:02}/{:02} {:02}:{:02}:{:02}",
                c.day, c.month, c.year, c.hour, c.minute, c.second
            )
        })
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CpuInfo {
    pub physical_cores: Option<usize>,
    pub logical_cores: usize,
    pub min_frequency_mhz: Option<f64>,
    pub max_frequency_mhz: Option<f64>,
    pub current_frequency_mhz: Option<f64>,
    /// Utilization per logical core, indexed by core number.
    pub per_core_usage: Vec<f32>,
    pub total_usage: f32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MemoryInfo {
    pub total: u64,
    pub available: u64,
    pub used: u64,
    pub percent: f64,
    pub swap_total: u64,
    pub swap_free: u64,
    pub swap_used: u64,
    pub swap_percent: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DiskInfo {
    pub partitions: BTreeMap<String, DiskPartition>,
    pub io: Option<DiskIoTotals>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiskPartition {
    pub mount_point: String,
    pub fs_type: String,
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub percent: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiskIoTotals {
    pub read_bytes: u64,
    pub write_bytes: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NetworkInfo {
    pub addresses: Vec<InterfaceAddress>,
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressFamily {
    Ipv4,
    LinkLayer,
    Other,
}

impl AddressFamily {
    pub fn label(self) -> &'static str {
        match self {
            AddressFamily::Ipv4 => "IPv4",
            AddressFamily::LinkLayer => "Link layer",
            AddressFamily::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceAddress {
    pub interface: String,
    pub family: AddressFamily,
    pub address: String,
    pub netmask: Option<String>,
    pub broadcast: Option<String>,
}

/// Used share of `total`, 0 when the total is unknown.
pub fn percent(used: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        (used as f64 / total as f64) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_of_zero_total_is_zero() {
        assert_eq!(percent(10, 0), 0.0);
        assert_eq!(percent(50, 200), 25.0);
    }

    #[test]
    fn percent_tolerates_overflowing_used() {
        assert!(percent(150, 100) > 100.0);
    }

    #[test]
    fn boot_time_display_matches_calendar() {
        let boot = BootTime {
            unix_seconds: 1_600_000_000,
        };
        let cal = boot.calendar().expect("valid timestamp");
        let expected = format!(
            "{:02}/{:02}/{:02} {:02}:{:02}:{:02}",
            cal.day, cal.month, cal.year, cal.hour, cal.minute, cal.second
        );
        assert_eq!(boot.display().as_deref(), Some(expected.as_str()));
        assert_eq!(cal.year, 2020);
        assert_eq!(cal.month, 9);
    }

    #[test]
    fn address_family_serializes_as_tag() {
        let json = serde_json::to_string(&AddressFamily::LinkLayer).unwrap();
        assert_eq!(json, "\"link_layer\"");
    }
}

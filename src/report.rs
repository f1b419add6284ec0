use crate::size::{format_bytes, format_size};
use crate::snapshot::{AddressFamily, Snapshot};
use serde_json::{Map, Value};

const UNKNOWN: &str = "unknown";
// Widest network label is "Broadcast MAC".
const LABEL_WIDTH: usize = 13;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Platform,
    BootTime,
    Cpu,
    Memory,
    Disk,
    Network,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Platform,
        Section::BootTime,
        Section::Cpu,
        Section::Memory,
        Section::Disk,
        Section::Network,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Section::Platform => "Platform Information",
            Section::BootTime => "Boot Time",
            Section::Cpu => "CPU Information",
            Section::Memory => "Memory Information",
            Section::Disk => "Disk Information",
            Section::Network => "Network Information",
        }
    }

    fn key(self) -> &'static str {
        match self {
            Section::Platform => "platform",
            Section::BootTime => "boot_time",
            Section::Cpu => "cpu",
            Section::Memory => "memory",
            Section::Disk => "disk",
            Section::Network => "network",
        }
    }
}

pub struct Renderer<'a> {
    snapshot: &'a Snapshot,
    suffix: Option<&'a str>,
}

impl<'a> Renderer<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self {
            snapshot,
            suffix: None,
        }
    }

    /// Byte sizes end in `suffix` instead of `B`.
    pub fn with_suffix(mut self, suffix: &'a str) -> Self {
        self.suffix = Some(suffix);
        self
    }

    pub fn text(&self, sections: &[Section]) -> String {
        sections
            .iter()
            .map(|section| {
                let body = match section {
                    Section::Platform => self.platform(),
                    Section::BootTime => self.boot_time(),
                    Section::Cpu => self.cpu(),
                    Section::Memory => self.memory(),
                    Section::Disk => self.disk(),
                    Section::Network => self.network(),
                };
                format!("{}\n{}\n", separator(section.title()), body)
            })
            .collect()
    }

    pub fn json(&self, sections: &[Section]) -> Result<Value, serde_json::Error> {
        let s = self.snapshot;
        let mut map = Map::new();
        for section in sections {
            let value = match section {
                Section::Platform => serde_json::to_value(&s.platform)?,
                Section::BootTime => serde_json::json!({
                    "unix_seconds": s.boot_time.map(|b| b.unix_seconds),
                    "local": s.boot_time.and_then(|b| b.local()).map(|dt| dt.to_rfc3339()),
                }),
                Section::Cpu => serde_json::to_value(&s.cpu)?,
                Section::Memory => serde_json::to_value(&s.memory)?,
                Section::Disk => serde_json::to_value(&s.disk)?,
                Section::Network => serde_json::to_value(&s.network)?,
            };
            map.insert(section.key().to_string(), value);
        }
        Ok(Value::Object(map))
    }

    fn size(&self, bytes: u64) -> String {
        match self.suffix {
            Some(suffix) => format_size(bytes, suffix),
            None => format_bytes(bytes),
        }
    }

    fn platform(&self) -> String {
        let p = &self.snapshot.platform;
        [
            ("System      ", &p.system),
            ("Hostname    ", &p.hostname),
            ("Release     ", &p.release),
            ("Version     ", &p.version),
            ("Machine     ", &p.machine),
            ("Processor   ", &p.processor),
            ("Architecture", &p.architecture),
            ("IP Address  ", &p.ip_address),
            ("MAC address ", &p.mac_address),
        ]
        .iter()
        .map(|(label, value)| format!("{label}: {}", value.as_deref().unwrap_or(UNKNOWN)))
        .collect::<Vec<_>>()
        .join("\n")
    }

    fn boot_time(&self) -> String {
        format!(
            "Boot Time: {}",
            self.snapshot
                .boot_time
                .and_then(|b| b.display())
                .unwrap_or_else(|| UNKNOWN.to_string())
        )
    }

    fn cpu(&self) -> String {
        let c = &self.snapshot.cpu;
        let cores = c
            .per_core_usage
            .iter()
            .enumerate()
            .map(|(i, usage)| format!("  Core {i:<6}: {usage:.1}%"))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "Physical cores   : {}\nTotal cores      : {}\nMax Frequency    : {}\nMin Frequency    : {}\nCurrent Frequency: {}\nCPU Usage Per Core\n{}\nTotal CPU Usage  : {:.1}%",
            opt(c.physical_cores),
            c.logical_cores,
            mhz(c.max_frequency_mhz),
            mhz(c.min_frequency_mhz),
            mhz(c.current_frequency_mhz),
            cores,
            c.total_usage,
        )
    }

    fn memory(&self) -> String {
        let m = &self.snapshot.memory;
        format!(
            "Total Memory     : {}\nAvailable Memory : {}\nUsed Memory      : {}\nPercentage Memory: {:.1}%\nTotal Swap       : {}\nFree Swap        : {}\nUsed Swap        : {}\nPercentage Swap  : {:.1}%",
            self.size(m.total),
            self.size(m.available),
            self.size(m.used),
            m.percent,
            self.size(m.swap_total),
            self.size(m.swap_free),
            self.size(m.swap_used),
            m.swap_percent,
        )
    }

    fn disk(&self) -> String {
        let d = &self.snapshot.disk;
        let devices = d
            .partitions
            .iter()
            .map(|(device, p)| {
                format!(
                    "=========== Device: {device} =========\n  Mountpoint      : {}\n  File System Type: {}\n  Total Size      : {}\n  Used Space      : {}\n  Free Space      : {}\n  Percentage Used : {:.1}%\n",
                    p.mount_point,
                    p.fs_type,
                    self.size(p.total),
                    self.size(p.used),
                    self.size(p.free),
                    p.percent,
                )
            })
            .collect::<String>();
        let (read, write) = match d.io {
            Some(io) => (self.size(io.read_bytes), self.size(io.write_bytes)),
            None => (UNKNOWN.to_string(), UNKNOWN.to_string()),
        };

        format!("{devices}\nTotal Read : {read}\nTotal Write: {write}")
    }

    fn network(&self) -> String {
        let n = &self.snapshot.network;
        let entries = n
            .addresses
            .iter()
            .map(|entry| {
                let (addr_label, bcast_label) = match entry.family {
                    AddressFamily::Ipv4 => ("IP Address", "Broadcast IP"),
                    AddressFamily::LinkLayer => ("MAC Address", "Broadcast MAC"),
                    AddressFamily::Other => ("Address", "Broadcast"),
                };
                format!(
                    "=== Interface: {} ===\nAddress Family : {}\n  {:<LABEL_WIDTH$}: {}\n  {:<LABEL_WIDTH$}: {}\n  {:<LABEL_WIDTH$}: {}\n",
                    entry.interface,
                    entry.family.label(),
                    addr_label,
                    entry.address,
                    "Netmask",
                    entry.netmask.as_deref().unwrap_or(UNKNOWN),
                    bcast_label,
                    entry.broadcast.as_deref().unwrap_or(UNKNOWN),
                )
            })
            .collect::<String>();

        format!(
            "{entries}\nTotal Bytes Sent    : {}\nTotal Bytes Received: {}",
            self.size(n.bytes_sent),
            self.size(n.bytes_received),
        )
    }
}

pub fn separator(title: &str) -> String {
    let bar = "=".repeat(30);
    format!("{bar} {title} {bar}")
}

fn opt<T: std::fmt::Display>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn mhz(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.2}Mhz"))
        .unwrap_or_else(|| UNKNOWN.to_string())
}

pub fn short_license() -> String {
    format!(
        "\nsysreport {}   Copyright (C) the sysreport authors\n\
         This program comes with ABSOLUTELY NO WARRANTY; for details run `sysreport -l'.\n\
         This is free software, and you are welcome to redistribute it under certain conditions.\n",
        env!("CARGO_PKG_VERSION")
    )
}

pub const LONG_LICENSE: &str = "
    Copyright (C) the sysreport authors

    This program is free software: you can redistribute it and/or modify it
    under the terms of the GNU General Public License as published by
    the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU General Public License for more details.

    You should have received a copy of the GNU General Public License
    along with this program.  If not, see <http://www.gnu.org/licenses/>.
";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{
        BootTime, CpuInfo, DiskInfo, DiskIoTotals, DiskPartition, InterfaceAddress, MemoryInfo,
        NetworkInfo, PlatformInfo,
    };
    use std::collections::BTreeMap;

    fn sample_snapshot() -> Snapshot {
        let mut partitions = BTreeMap::new();
        partitions.insert(
            "/dev/sda1".to_string(),
            DiskPartition {
                mount_point: "/".to_string(),
                fs_type: "ext4".to_string(),
                total: 1_099_511_627_776,
                used: 549_755_813_888,
                free: 549_755_813_888,
                percent: 50.0,
            },
        );

        Snapshot {
            platform: PlatformInfo {
                system: Some("Linux".to_string()),
                hostname: Some("box".to_string()),
                architecture: Some("64bit".to_string()),
                ..PlatformInfo::default()
            },
            boot_time: Some(BootTime {
                unix_seconds: 1_600_000_000,
            }),
            cpu: CpuInfo {
                physical_cores: Some(2),
                logical_cores: 2,
                min_frequency_mhz: Some(800.0),
                max_frequency_mhz: Some(3600.0),
                current_frequency_mhz: None,
                per_core_usage: vec![12.5, 7.25],
                total_usage: 9.875,
            },
            memory: MemoryInfo {
                total: 1_253_656_678,
                available: 1_253_656,
                used: 1024,
                percent: 99.9,
                ..MemoryInfo::default()
            },
            disk: DiskInfo {
                partitions,
                io: Some(DiskIoTotals {
                    read_bytes: 1024,
                    write_bytes: 0,
                }),
            },
            network: NetworkInfo {
                addresses: vec![
                    InterfaceAddress {
                        interface: "eth0".to_string(),
                        family: AddressFamily::LinkLayer,
                        address: "52:54:00:12:34:56".to_string(),
                        netmask: None,
                        broadcast: Some("ff:ff:ff:ff:ff:ff".to_string()),
                    },
                    InterfaceAddress {
                        interface: "eth0".to_string(),
                        family: AddressFamily::Ipv4,
                        address: "10.0.0.5".to_string(),
                        netmask: Some("255.0.0.0".to_string()),
                        broadcast: Some("10.255.255.255".to_string()),
                    },
                ],
                bytes_sent: 2048,
                bytes_received: 512,
            },
        }
    }

    #[test]
    fn separator_layout() {
        assert_eq!(
            separator("Boot Time"),
            format!("{} Boot Time {}", "=".repeat(30), "=".repeat(30))
        );
    }

    #[test]
    fn platform_marks_missing_fields() {
        let snap = sample_snapshot();
        let text = Renderer::new(&snap).text(&[Section::Platform]);
        assert!(text.contains("System      : Linux"));
        assert!(text.contains("Release     : unknown"));
        assert!(text.contains("Architecture: 64bit"));
    }

    #[test]
    fn cpu_lists_every_core() {
        let snap = sample_snapshot();
        let text = Renderer::new(&snap).text(&[Section::Cpu]);
        assert!(text.contains("Max Frequency    : 3600.00Mhz"));
        assert!(text.contains("Current Frequency: unknown"));
        assert!(text.contains("  Core 0     : 12.5%"));
        assert!(text.contains("  Core 1     : 7.2%") || text.contains("  Core 1     : 7.3%"));
        assert!(text.contains("Total CPU Usage  : 9.9%"));
    }

    #[test]
    fn sizes_use_configured_suffix() {
        let snap = sample_snapshot();
        let text = Renderer::new(&snap).text(&[Section::Memory, Section::Disk]);
        assert!(text.contains("Total Memory     : 1.17GB"));
        assert!(text.contains("Available Memory : 1.20MB"));
        assert!(text.contains("=========== Device: /dev/sda1 ========="));
        assert!(text.contains("  Total Size      : 1.00TB"));
        assert!(text.contains("Total Read : 1.00KB"));

        let text = Renderer::new(&snap).with_suffix("iB").text(&[Section::Memory]);
        assert!(text.contains("Total Memory     : 1.17GiB"));
    }

    #[test]
    fn network_labels_follow_family() {
        let snap = sample_snapshot();
        let text = Renderer::new(&snap).text(&[Section::Network]);
        assert!(text.contains("  MAC Address  : 52:54:00:12:34:56"));
        assert!(text.contains("  IP Address   : 10.0.0.5"));
        assert!(text.contains("  Netmask      : 255.0.0.0"));
        assert!(text.contains("  Broadcast IP : 10.255.255.255"));
        assert!(text.contains("  Broadcast MAC: ff:ff:ff:ff:ff:ff"));
        assert!(text.contains("Total Bytes Sent    : 2.00KB"));
    }

    #[test]
    fn interface_block_values_share_a_column() {
        let snap = sample_snapshot();
        let text = Renderer::new(&snap).text(&[Section::Network]);
        let columns: Vec<usize> = text
            .lines()
            .filter(|line| line.starts_with("  "))
            .filter_map(|line| line.find(':'))
            .collect();
        assert_eq!(columns.len(), 6);
        assert!(columns.iter().all(|&c| c == columns[0]));
    }

    #[test]
    fn default_suffix_is_bytes() {
        let snap = sample_snapshot();
        let plain = Renderer::new(&snap).text(&[Section::Memory]);
        let explicit = Renderer::new(&snap).with_suffix("B").text(&[Section::Memory]);
        assert_eq!(plain, explicit);
        assert!(plain.contains(&format!("Total Memory     : {}", format_bytes(1_253_656_678))));
    }

    #[test]
    fn sections_render_in_requested_order() {
        let snap = sample_snapshot();
        let text = Renderer::new(&snap).text(&[Section::Network, Section::Platform]);
        let net = text.find("Network Information").unwrap();
        let plat = text.find("Platform Information").unwrap();
        assert!(net < plat);
        assert!(!text.contains("CPU Information"));
    }

    #[test]
    fn json_contains_only_selected_sections() {
        let snap = sample_snapshot();
        let value = Renderer::new(&snap)
            .json(&[Section::Cpu, Section::BootTime])
            .unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(obj["cpu"]["logical_cores"], 2);
        assert_eq!(obj["boot_time"]["unix_seconds"], 1_600_000_000_u64);
    }
}

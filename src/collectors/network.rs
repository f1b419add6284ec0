use crate::snapshot::{AddressFamily, InterfaceAddress, NetworkInfo};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use sysinfo::{NetworkData, Networks};

const ZERO_MAC: &str = "00:00:00:00:00:00";
const BROADCAST_MAC: &str = "ff:ff:ff:ff:ff:ff";

pub fn collect_network(networks: &Networks) -> NetworkInfo {
    let mut info = NetworkInfo::default();
    for (name, data) in sorted_interfaces(networks) {
        let ips: Vec<(IpAddr, u8)> = data
            .ip_networks()
            .iter()
            .map(|n| (n.addr, n.prefix))
            .collect();
        info.addresses
            .extend(interface_entries(name, &data.mac_address().to_string(), &ips));
        info.bytes_sent = info.bytes_sent.saturating_add(data.total_transmitted());
        info.bytes_received = info.bytes_received.saturating_add(data.total_received());
    }
    info
}

/// First non-zero hardware address of a non-loopback interface.
pub fn primary_mac(networks: &Networks) -> Option<String> {
    sorted_interfaces(networks)
        .into_iter()
        .filter(|(_, data)| !is_loopback(data))
        .map(|(_, data)| data.mac_address().to_string())
        .find(|mac| mac != ZERO_MAC)
}

pub fn primary_ipv4(networks: &Networks) -> Option<String> {
    sorted_interfaces(networks)
        .into_iter()
        .flat_map(|(_, data)| data.ip_networks().iter().map(|n| n.addr))
        .find(|ip| ip.is_ipv4() && !ip.is_loopback())
        .map(|ip| ip.to_string())
}

fn sorted_interfaces(networks: &Networks) -> Vec<(&String, &NetworkData)> {
    let mut ifaces: Vec<_> = networks.list().iter().collect();
    ifaces.sort_by(|a, b| a.0.cmp(b.0));
    ifaces
}

fn is_loopback(data: &NetworkData) -> bool {
    data.ip_networks().iter().any(|n| n.addr.is_loopback())
}

/// One link-layer entry for the interface, then one entry per bound address.
pub fn interface_entries(name: &str, mac: &str, ips: &[(IpAddr, u8)]) -> Vec<InterfaceAddress> {
    let mut out = Vec::with_capacity(ips.len() + 1);
    out.push(InterfaceAddress {
        interface: name.to_string(),
        family: AddressFamily::LinkLayer,
        address: mac.to_string(),
        netmask: None,
        broadcast: (mac != ZERO_MAC).then(|| BROADCAST_MAC.to_string()),
    });

    for (addr, prefix) in ips {
        let entry = match addr {
            IpAddr::V4(v4) => InterfaceAddress {
                interface: name.to_string(),
                family: AddressFamily::Ipv4,
                address: v4.to_string(),
                netmask: Some(ipv4_netmask(*prefix).to_string()),
                broadcast: (!v4.is_loopback() && *prefix < 32)
                    .then(|| ipv4_broadcast(*v4, *prefix).to_string()),
            },
            IpAddr::V6(v6) => InterfaceAddress {
                interface: name.to_string(),
                family: AddressFamily::Other,
                address: v6.to_string(),
                netmask: Some(ipv6_netmask(*prefix).to_string()),
                broadcast: None,
            },
        };
        out.push(entry);
    }
    out
}

fn ipv4_netmask(prefix: u8) -> Ipv4Addr {
    let bits = u32::MAX
        .checked_shl(32 - u32::from(prefix.min(32)))
        .unwrap_or(0);
    Ipv4Addr::from(bits)
}

fn ipv4_broadcast(addr: Ipv4Addr, prefix: u8) -> Ipv4Addr {
    let mask = u32::from(ipv4_netmask(prefix));
    Ipv4Addr::from(u32::from(addr) | !mask)
}

fn ipv6_netmask(prefix: u8) -> Ipv6Addr {
    let bits = u128::MAX
        .checked_shl(128 - u32::from(prefix.min(128)))
        .unwrap_or(0);
    Ipv6Addr::from(bits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn netmask_from_prefix() {
        assert_eq!(ipv4_netmask(24), Ipv4Addr::new(255, 255, 255, 0));
        assert_eq!(ipv4_netmask(32), Ipv4Addr::new(255, 255, 255, 255));
        assert_eq!(ipv4_netmask(0), Ipv4Addr::new(0, 0, 0, 0));
        assert_eq!(ipv4_netmask(20), Ipv4Addr::new(255, 255, 240, 0));
        assert_eq!(ipv6_netmask(64).to_string(), "ffff:ffff:ffff:ffff::");
    }

    #[test]
    fn broadcast_fills_host_bits() {
        let addr = Ipv4Addr::new(192, 168, 1, 37);
        assert_eq!(ipv4_broadcast(addr, 24), Ipv4Addr::new(192, 168, 1, 255));
        assert_eq!(ipv4_broadcast(addr, 16), Ipv4Addr::new(192, 168, 255, 255));
    }

    #[test]
    fn entries_are_tagged_by_family() {
        let ips = vec![
            (IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5)), 8),
            (IpAddr::V6(Ipv6Addr::new(0xfe80, 0, 0, 0, 1, 2, 3, 4)), 64),
        ];
        let entries = interface_entries("eth0", "52:54:00:12:34:56", &ips);

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].family, AddressFamily::LinkLayer);
        assert_eq!(entries[0].address, "52:54:00:12:34:56");
        assert_eq!(entries[0].broadcast.as_deref(), Some(BROADCAST_MAC));

        assert_eq!(entries[1].family, AddressFamily::Ipv4);
        assert_eq!(entries[1].address, "10.0.0.5");
        assert_eq!(entries[1].netmask.as_deref(), Some("255.0.0.0"));
        assert_eq!(entries[1].broadcast.as_deref(), Some("10.255.255.255"));

        assert_eq!(entries[2].family, AddressFamily::Other);
        assert!(entries[2].broadcast.is_none());
        assert!(entries.iter().all(|e| e.interface == "eth0"));
    }

    #[test]
    fn loopback_has_no_broadcast() {
        let ips = vec![(IpAddr::V4(Ipv4Addr::LOCALHOST), 8)];
        let entries = interface_entries("lo", ZERO_MAC, &ips);
        assert!(entries[0].broadcast.is_none());
        assert_eq!(entries[1].netmask.as_deref(), Some("255.0.0.0"));
        assert!(entries[1].broadcast.is_none());
    }

    #[test]
    fn live_interfaces_are_sorted_by_name() {
        let networks = Networks::new_with_refreshed_list();
        let info = collect_network(&networks);
        let names: Vec<&str> = info
            .addresses
            .iter()
            .filter(|a| a.family == AddressFamily::LinkLayer)
            .map(|a| a.interface.as_str())
            .collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }
}

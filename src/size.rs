const UNITS: [&str; 6] = ["", "K", "M", "G", "T", "P"];
const FACTOR: f64 = 1024.0;

/// Human readable size with a binary unit prefix.
///
/// `1253656` -> `"1.20MB"`, `1253656678` -> `"1.17GB"`. Values past the
/// petabyte range stay in `P`.
pub fn format_size(bytes: u64, suffix: &str) -> String {
    let mut value = bytes as f64;
    let mut idx = 0;
    while value >= FACTOR && idx < UNITS.len() - 1 {
        value /= FACTOR;
        idx += 1;
    }
    format!("{:.2}{}{}", value, UNITS[idx], suffix)
}

pub fn format_bytes(bytes: u64) -> String {
    format_size(bytes, "B")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_values() {
        assert_eq!(format_bytes(0), "0.00B");
        assert_eq!(format_bytes(512), "512.00B");
        assert_eq!(format_bytes(1023), "1023.00B");
        assert_eq!(format_bytes(1024), "1.00KB");
        assert_eq!(format_bytes(1_253_656), "1.20MB");
        assert_eq!(format_bytes(1_253_656_678), "1.17GB");
        assert_eq!(format_bytes(1_099_511_627_776), "1.00TB");
    }

    #[test]
    fn picks_prefix_by_power_of_1024() {
        for (k, prefix) in UNITS.iter().enumerate() {
            let bytes = 3 * 1024_u64.pow(k as u32);
            assert_eq!(format_bytes(bytes), format!("3.00{prefix}B"));
        }
    }

    #[test]
    fn caps_at_petabytes() {
        let exa = 1024_u64.pow(6);
        assert_eq!(format_bytes(exa), "1024.00PB");
        assert!(format_bytes(u64::MAX).ends_with("PB"));
    }

    #[test]
    fn custom_suffix() {
        assert_eq!(format_size(2048, "iB"), "2.00KiB");
        assert_eq!(format_size(10, "/s"), "10.00/s");
    }

    #[test]
    fn repeated_calls_agree() {
        let a = format_bytes(987_654_321);
        let b = format_bytes(987_654_321);
        assert_eq!(a, b);
    }
}

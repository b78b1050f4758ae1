// ── Address notation helpers ──
//
// Mist reports WAN addressing in three shapes: runtime CIDR strings from
// `if_stat` (`192.168.20.2/24`), static netmasks in dotted form
// (`255.255.255.0`) and static netmasks in prefix form (`/24`). The
// dashboard shows prefix lengths throughout.

use std::net::{IpAddr, Ipv4Addr};

/// Split `addr/len` into the address and prefix length.
pub fn split_cidr(cidr: &str) -> Option<(IpAddr, u8)> {
    let (addr, len) = cidr.trim().split_once('/')?;
    let addr: IpAddr = addr.parse().ok()?;
    let len: u8 = len.parse().ok()?;
    let max = if addr.is_ipv4() { 32 } else { 128 };
    (len <= max).then_some((addr, len))
}

/// Prefix length of a netmask given as `/24`, `24`, or `255.255.255.0`.
///
/// Non-contiguous dotted masks are rejected.
pub fn prefix_len(netmask: &str) -> Option<u8> {
    let raw = netmask.trim().trim_start_matches('/');
    if let Ok(len) = raw.parse::<u8>() {
        return (len <= 32).then_some(len);
    }
    let mask = u32::from(raw.parse::<Ipv4Addr>().ok()?);
    let len = mask.leading_ones();
    (mask.checked_shl(len).unwrap_or(0) == 0).then(|| u8::try_from(len).unwrap_or(32))
}

/// Display form of a netmask: the prefix length when it parses, otherwise
/// the raw value without a leading slash.
pub fn normalize_netmask(netmask: &str) -> String {
    prefix_len(netmask).map_or_else(
        || netmask.trim().trim_start_matches('/').to_owned(),
        |len| len.to_string(),
    )
}

/// Canonical MAC form for comparisons: lowercase hex, no separators.
pub fn normalize_mac(mac: &str) -> String {
    mac.chars()
        .filter(char::is_ascii_hexdigit)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Whether `s` looks like a MAC address in any common notation.
pub fn looks_like_mac(s: &str) -> bool {
    let stripped: Vec<char> = s.chars().filter(|c| !matches!(c, ':' | '-' | '.')).collect();
    stripped.len() == 12 && stripped.iter().all(char::is_ascii_hexdigit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_runtime_cidr() {
        let (addr, len) = split_cidr("192.168.20.2/24").unwrap_or_else(|| panic!("parse"));
        assert_eq!(addr.to_string(), "192.168.20.2");
        assert_eq!(len, 24);
        assert!(split_cidr("192.168.20.2").is_none());
        assert!(split_cidr("10.0.0.1/33").is_none());
        assert_eq!(split_cidr("2001:db8::1/64").map(|(_, l)| l), Some(64));
    }

    #[test]
    fn netmask_forms() {
        assert_eq!(prefix_len("/24"), Some(24));
        assert_eq!(prefix_len("30"), Some(30));
        assert_eq!(prefix_len("255.255.255.0"), Some(24));
        assert_eq!(prefix_len("255.255.255.255"), Some(32));
        assert_eq!(prefix_len("0.0.0.0"), Some(0));
        assert_eq!(prefix_len("255.0.255.0"), None);
        assert_eq!(prefix_len(""), None);
        assert_eq!(normalize_netmask(" /29 "), "29");
        assert_eq!(normalize_netmask("bogus"), "bogus");
        assert_eq!(normalize_netmask(""), "");
    }

    #[test]
    fn mac_handling() {
        assert_eq!(normalize_mac("AA:BB:CC:00:11:22"), "aabbcc001122");
        assert!(looks_like_mac("aa-bb-cc-00-11-22"));
        assert!(looks_like_mac("aabbcc001122"));
        assert!(!looks_like_mac("00000000-0000-0000-1000-aabbcc001122"));
    }
}

//! Built-in DNS profiles.

use serde::Serialize;

/// A named pair of DNS servers offered for selection.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct DnsProfile {
    /// Display name, e.g. "Quad9"
    pub name: &'static str,
    /// Primary server address
    pub primary: &'static str,
    /// Secondary server address
    pub secondary: &'static str,
}

/// The fixed profile table, in selector order.
pub const DNS_PROFILES: [DnsProfile; 4] = [
    DnsProfile {
        name: "Google Public DNS",
        primary: "8.8.8.8",
        secondary: "8.8.4.4",
    },
    DnsProfile {
        name: "Quad9",
        primary: "9.9.9.9",
        secondary: "149.112.112.112",
    },
    DnsProfile {
        name: "OpenDNS",
        primary: "208.67.222.222",
        secondary: "208.67.220.220",
    },
    DnsProfile {
        name: "CleanBrowsing",
        primary: "185.228.168.9",
        secondary: "185.228.169.9",
    },
];

/// Look up a profile by name, ignoring ASCII case.
#[must_use]
pub fn find_profile(name: &str) -> Option<&'static DnsProfile> {
    DNS_PROFILES
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
}

/// Index of a profile in [`DNS_PROFILES`], used to preselect it in the window.
#[must_use]
pub fn profile_index(name: &str) -> Option<usize> {
    DNS_PROFILES
        .iter()
        .position(|p| p.name.eq_ignore_ascii_case(name.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_all_named_profiles_present() {
        let names: Vec<&str> = DNS_PROFILES.iter().map(|p| p.name).collect();
        assert_eq!(
            names,
            ["Google Public DNS", "Quad9", "OpenDNS", "CleanBrowsing"]
        );
    }

    #[test]
    fn test_each_profile_has_two_distinct_addresses() {
        for profile in &DNS_PROFILES {
            let primary: Ipv4Addr = profile.primary.parse().unwrap();
            let secondary: Ipv4Addr = profile.secondary.parse().unwrap();
            assert_ne!(primary, secondary, "{}", profile.name);
        }
    }

    #[test]
    fn test_find_profile_case_insensitive() {
        let profile = find_profile("quad9").unwrap();
        assert_eq!(profile.primary, "9.9.9.9");
        assert_eq!(profile.secondary, "149.112.112.112");
        assert_eq!(profile_index(" opendns "), Some(2));
        assert!(find_profile("Cloudflare").is_none());
    }
}

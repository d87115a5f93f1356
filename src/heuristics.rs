//! Static classification tables shared by the probe modules and the VPN
//! detector. Everything in this module is an approximation with real
//! false-positive and false-negative rates; callers treat matches as
//! evidence contributing to a confidence score, never as ground truth.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use lazy_static::lazy_static;

lazy_static! {
    /// Organization/ISP name fragments that commonly identify VPN and
    /// hosting providers in IP metadata.
    pub static ref VPN_ORG_KEYWORDS: Vec<&'static str> = vec![
        "vpn",
        "proxy",
        "hosting",
        "datacenter",
        "data center",
        "cloud",
        "server",
        "digitalocean",
        "linode",
        "vultr",
        "ovh",
        "hetzner",
        "m247",
        "mullvad",
        "nordvpn",
        "expressvpn",
        "proton",
        "surfshark",
        "private internet access",
    ];

    /// Tracker domains probed by the tracking-protection test. Kept small:
    /// the test measures blocking ratio, not coverage.
    pub static ref KNOWN_TRACKER_DOMAINS: Vec<&'static str> = vec![
        "doubleclick.net",
        "google-analytics.com",
        "googletagmanager.com",
        "facebook.net",
        "scorecardresearch.com",
        "quantserve.com",
        "criteo.com",
        "adnxs.com",
    ];

    /// IANA timezones frequently reported by browsers behind VPN exits.
    /// Membership is weak positive evidence of timezone masking.
    pub static ref COMMON_VPN_TIMEZONES: Vec<&'static str> = vec![
        "UTC",
        "Etc/UTC",
        "Etc/GMT",
        "America/New_York",
        "America/Chicago",
        "America/Los_Angeles",
        "Europe/London",
        "Europe/Amsterdam",
        "Europe/Zurich",
        "Europe/Frankfurt",
        "Asia/Singapore",
    ];

    /// Screen resolutions common enough that reporting one is weak evidence
    /// of resolution spoofing (or at least of blending into the crowd).
    pub static ref COMMON_SCREEN_RESOLUTIONS: Vec<(u32, u32)> = vec![
        (1920, 1080),
        (1366, 768),
        (1536, 864),
        (1440, 900),
        (1280, 720),
        (2560, 1440),
    ];

    /// WebGL renderer-string fragments indicating a generic/software
    /// renderer rather than real GPU hardware.
    pub static ref GENERIC_WEBGL_RENDERERS: Vec<&'static str> = vec![
        "swiftshader",
        "llvmpipe",
        "software",
        "generic",
        "mesa offscreen",
    ];
}

/// Fonts below this count suggest the environment restricts font
/// enumeration.
pub const RESTRICTED_FONT_COUNT: u32 = 10;

/// True when the candidate address sits in a range that never identifies
/// the user on the public internet: loopback, RFC1918, link-local, CGNAT,
/// unique-local and unspecified addresses.
pub fn is_private_or_local(addr: &IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => is_private_or_local_v4(v4),
        IpAddr::V6(v6) => is_private_or_local_v6(v6),
    }
}

fn is_private_or_local_v4(addr: &Ipv4Addr) -> bool {
    if addr.is_private() || addr.is_loopback() || addr.is_link_local() || addr.is_unspecified() {
        return true;
    }
    // CGNAT 100.64.0.0/10
    let octets = addr.octets();
    octets[0] == 100 && (64..=127).contains(&octets[1])
}

fn is_private_or_local_v6(addr: &Ipv6Addr) -> bool {
    if addr.is_loopback() || addr.is_unspecified() {
        return true;
    }
    let segments = addr.segments();
    // fe80::/10 link-local
    if (segments[0] & 0xffc0) == 0xfe80 {
        return true;
    }
    // fc00::/7 unique-local
    (segments[0] & 0xfe00) == 0xfc00
}

/// Extracts the first parseable IP address out of an ICE candidate line.
/// Accepts either a bare address or a full SDP candidate attribute; mDNS
/// obfuscated hostnames (`*.local`) yield `None`.
pub fn candidate_address(candidate: &str) -> Option<IpAddr> {
    if let Ok(addr) = candidate.trim().parse::<IpAddr>() {
        return Some(addr);
    }
    candidate
        .split_whitespace()
        .find_map(|token| token.parse::<IpAddr>().ok())
}

/// True when the org/ISP label matches a known VPN/hosting keyword.
pub fn org_matches_vpn_keyword(org: &str) -> bool {
    let lowered = org.to_lowercase();
    VPN_ORG_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}

/// True when the renderer string looks like a generic/software renderer.
pub fn renderer_is_generic(renderer: &str) -> bool {
    let lowered = renderer.to_lowercase();
    GENERIC_WEBGL_RENDERERS.iter().any(|kw| lowered.contains(kw))
}

/// Suffix match for hostnames: `sub.doubleclick.net` matches
/// `doubleclick.net`, `notdoubleclick.net` does not.
pub fn host_matches_suffix(host: &str, suffix: &str) -> bool {
    if host == suffix {
        return true;
    }
    let host_len = host.len();
    let suffix_len = suffix.len();
    if host_len <= suffix_len {
        return false;
    }
    if !host.ends_with(suffix) {
        return false;
    }
    let dot_index = host_len - suffix_len - 1;
    host.as_bytes().get(dot_index) == Some(&b'.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc1918_and_loopback_are_local() {
        for addr in ["192.168.1.5", "10.0.0.2", "172.16.4.1", "127.0.0.1", "169.254.10.1", "100.64.0.9"] {
            let parsed: IpAddr = addr.parse().unwrap();
            assert!(is_private_or_local(&parsed), "{addr} should be local");
        }
    }

    #[test]
    fn public_addresses_are_not_local() {
        for addr in ["203.0.113.7", "8.8.8.8", "2001:db8::1"] {
            let parsed: IpAddr = addr.parse().unwrap();
            assert!(!is_private_or_local(&parsed), "{addr} should be public");
        }
    }

    #[test]
    fn v6_link_local_and_ula_are_local() {
        for addr in ["fe80::1", "fd00::42", "::1"] {
            let parsed: IpAddr = addr.parse().unwrap();
            assert!(is_private_or_local(&parsed), "{addr} should be local");
        }
    }

    #[test]
    fn candidate_address_handles_sdp_lines_and_mdns() {
        let sdp = "candidate:842163049 1 udp 1677729535 203.0.113.7 58180 typ srflx";
        assert_eq!(candidate_address(sdp), Some("203.0.113.7".parse().unwrap()));
        assert_eq!(candidate_address("192.168.1.5"), Some("192.168.1.5".parse().unwrap()));
        assert_eq!(candidate_address("candidate:1 1 udp 1 a1b2c3d4.local 9 typ host"), None);
    }

    #[test]
    fn org_keyword_match_is_case_insensitive() {
        assert!(org_matches_vpn_keyword("Mullvad VPN AB"));
        assert!(org_matches_vpn_keyword("DIGITALOCEAN-ASN"));
        assert!(!org_matches_vpn_keyword("Comcast Cable Communications"));
    }

    #[test]
    fn suffix_match_requires_label_boundary() {
        assert!(host_matches_suffix("stats.doubleclick.net", "doubleclick.net"));
        assert!(host_matches_suffix("doubleclick.net", "doubleclick.net"));
        assert!(!host_matches_suffix("notdoubleclick.net", "doubleclick.net"));
    }
}

//! Maps failing and warning results (plus the VPN-detection outcome) into
//! three priority buckets of remediation guidance. Buckets deduplicate
//! independently, preserving first occurrence, and cap at five entries so
//! the dashboard never scrolls advice.

use crate::contract::{Recommendations, TestResult, TestStatus};

const BUCKET_CAP: usize = 5;

const ADOPT_VPN: &str =
    "No VPN detected: route traffic through a reputable VPN before relying on any other protections";
const CONSIDER_TOR: &str =
    "For maximum anonymity, consider the Tor Browser in addition to your VPN";
const WEBRTC_EXTENSION: &str =
    "Install a WebRTC-blocking browser extension or disable WebRTC in your browser settings";
const DNS_SERVERS: &str =
    "Use your VPN provider's DNS servers or switch to an encrypted DNS resolver";
const LOCATION_HYGIENE: &str =
    "Match your system timezone to your VPN exit region and deny geolocation prompts by default";
const FINGERPRINT_BROWSER: &str =
    "Use a browser with built-in fingerprinting protection or a dedicated anti-fingerprinting extension";
const VPN_TUNING: &str =
    "Enable your VPN's auto-connect and prefer servers matching your browsing region";
const PRIVATE_BROWSING: &str =
    "Browse in private/incognito mode or clear site data regularly to limit storage-based tracking";

/// Builds the buckets for a VPN-effectiveness scan.
pub fn generate_vpn_recommendations(results: &[TestResult], vpn_detected: bool) -> Recommendations {
    let mut buckets = route_per_test(results);

    if !vpn_detected {
        buckets.immediate.push(ADOPT_VPN.to_string());
    }
    if crate::scorer::count_critical_issues(results) == 0 {
        buckets.suggested.push(CONSIDER_TOR.to_string());
    }
    if any_named(results, "WebRTC", |s| s == TestStatus::Fail) {
        buckets.important.push(WEBRTC_EXTENSION.to_string());
    }
    if any_named(results, "DNS", |s| s != TestStatus::Pass) {
        buckets.important.push(DNS_SERVERS.to_string());
    }
    if any_named(results, "Geolocation", |s| s != TestStatus::Pass)
        || any_named(results, "Timezone", |s| s != TestStatus::Pass)
    {
        buckets.suggested.push(LOCATION_HYGIENE.to_string());
    }
    if any_named(results, "Fingerprint", |s| s != TestStatus::Pass) {
        buckets.suggested.push(FINGERPRINT_BROWSER.to_string());
    }
    if vpn_detected {
        buckets.suggested.push(VPN_TUNING.to_string());
    }

    finalize(buckets)
}

/// Builds the buckets for the smaller privacy-test battery. Same routing,
/// privacy-oriented general rules.
pub fn generate_privacy_recommendations(results: &[TestResult]) -> Recommendations {
    let mut buckets = route_per_test(results);

    if any_named(results, "Cookie", |s| s != TestStatus::Pass)
        || any_named(results, "Storage", |s| s != TestStatus::Pass)
    {
        buckets.suggested.push(PRIVATE_BROWSING.to_string());
    }
    if any_named(results, "Fingerprint", |s| s != TestStatus::Pass)
        || any_named(results, "Canvas", |s| s != TestStatus::Pass)
    {
        buckets.suggested.push(FINGERPRINT_BROWSER.to_string());
    }

    finalize(buckets)
}

/// Per-test routing: a failing critical test's recommendation is
/// immediate, a plain failure's is important, a warning's is suggested.
/// Passing and unknown results contribute nothing here.
fn route_per_test(results: &[TestResult]) -> Recommendations {
    let mut buckets = Recommendations::default();
    for result in results {
        let Some(recommendation) = &result.recommendation else {
            continue;
        };
        match result.status {
            TestStatus::Fail if result.critical => buckets.immediate.push(recommendation.clone()),
            TestStatus::Fail => buckets.important.push(recommendation.clone()),
            TestStatus::Warning => buckets.suggested.push(recommendation.clone()),
            TestStatus::Pass | TestStatus::Unknown => {}
        }
    }
    buckets
}

fn any_named(
    results: &[TestResult],
    fragment: &str,
    predicate: impl Fn(TestStatus) -> bool,
) -> bool {
    results
        .iter()
        .any(|r| r.test_name.contains(fragment) && predicate(r.status))
}

fn finalize(buckets: Recommendations) -> Recommendations {
    Recommendations {
        immediate: dedup_cap(buckets.immediate),
        important: dedup_cap(buckets.important),
        suggested: dedup_cap(buckets.suggested),
    }
}

fn dedup_cap(entries: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(entries.len().min(BUCKET_CAP));
    for entry in entries {
        if !seen.contains(&entry) {
            seen.push(entry);
        }
        if seen.len() == BUCKET_CAP {
            break;
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::TestResult;

    #[test]
    fn critical_failure_routes_to_immediate() {
        let results = vec![TestResult::fail(
            "WebRTC Leak Test",
            25,
            "desc",
            "leaked".to_string(),
            "disable WebRTC",
            true,
        )];
        let buckets = generate_vpn_recommendations(&results, true);
        assert!(buckets.immediate.contains(&"disable WebRTC".to_string()));
        // The WebRTC general rule also fires, into important.
        assert!(buckets.important.contains(&WEBRTC_EXTENSION.to_string()));
    }

    #[test]
    fn non_critical_failure_routes_to_important_and_warning_to_suggested() {
        let results = vec![
            TestResult::fail("Public IP Classification", 20, "d", "isp".to_string(), "get a vpn", false),
            TestResult::warning("Timezone Consistency", 5, 10, "d", "tz".to_string(), "fix tz", ),
        ];
        let buckets = generate_vpn_recommendations(&results, true);
        assert!(buckets.important.contains(&"get a vpn".to_string()));
        assert!(buckets.suggested.contains(&"fix tz".to_string()));
    }

    #[test]
    fn missing_vpn_pushes_adoption_advice_to_immediate() {
        let buckets = generate_vpn_recommendations(&[], false);
        assert_eq!(buckets.immediate, vec![ADOPT_VPN.to_string()]);
    }

    #[test]
    fn clean_run_suggests_tor_and_detected_vpn_suggests_tuning() {
        let results = vec![TestResult::pass("WebRTC Leak Test", 25, "d", "ok".to_string())];
        let buckets = generate_vpn_recommendations(&results, true);
        assert!(buckets.suggested.contains(&CONSIDER_TOR.to_string()));
        assert!(buckets.suggested.contains(&VPN_TUNING.to_string()));
        assert!(buckets.immediate.is_empty());
    }

    #[test]
    fn buckets_deduplicate_and_cap_at_five() {
        let mut results = Vec::new();
        for i in 0..4 {
            results.push(TestResult::fail(
                &format!("Duplicate Test {i}"),
                10,
                "d",
                "x".to_string(),
                "same advice",
                false,
            ));
        }
        for i in 0..10 {
            results.push(TestResult::fail(
                &format!("Distinct Test {i}"),
                10,
                "d",
                "x".to_string(),
                &format!("advice {i}"),
                false,
            ));
        }
        let buckets = generate_vpn_recommendations(&results, true);
        assert!(buckets.important.len() <= 5);
        assert_eq!(
            buckets
                .important
                .iter()
                .filter(|r| r.as_str() == "same advice")
                .count(),
            1
        );
        // First occurrence order preserved.
        assert_eq!(buckets.important[0], "same advice");
    }

    #[test]
    fn pass_and_unknown_results_contribute_no_per_test_advice() {
        let results = vec![
            TestResult::pass("DoH Availability", 10, "d", "ok".to_string()),
            TestResult::unknown("Canvas Fingerprint", 15, "d", "threw".to_string(), Some("retry later")),
        ];
        let buckets = route_per_test(&results);
        assert!(buckets.immediate.is_empty());
        assert!(buckets.important.is_empty());
        assert!(buckets.suggested.is_empty());
    }

    #[test]
    fn dns_advice_fires_on_warning_not_just_failure() {
        let results = vec![TestResult::warning(
            "DNS Egress Consistency",
            10,
            25,
            "d",
            "mismatch".to_string(),
            "check resolver",
        )];
        let buckets = generate_vpn_recommendations(&results, true);
        assert!(buckets.important.contains(&DNS_SERVERS.to_string()));
    }
}

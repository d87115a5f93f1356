//! IP address protection battery: WebRTC ICE candidate leaks, public-IP
//! classification, IPv6 exposure. Sub-probes fan out concurrently; the
//! result list always comes back in declaration order.

use std::sync::Arc;
use std::time::Duration;

use crate::browser::BrowserEnvironment;
use crate::contract::{ScanMode, TestResult};
use crate::heuristics::{candidate_address, is_private_or_local, org_matches_vpn_keyword};
use crate::probe::{bounded, ProbeError, TestModule};
use crate::sources::{LookupError, NetworkSources};

pub const CATEGORY_NAME: &str = "IP Address Protection";

const WEBRTC_TEST: &str = "WebRTC Leak Test";
const PUBLIC_IP_TEST: &str = "Public IP Classification";
const IPV6_TEST: &str = "IPv6 Leak Test";

const WEBRTC_MAX: u32 = 25;
const PUBLIC_IP_MAX: u32 = 20;
const IPV6_MAX: u32 = 15;

const ICE_GATHER_TIMEOUT: Duration = Duration::from_secs(6);
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

const WEBRTC_DESC: &str =
    "Checks whether WebRTC ICE gathering exposes a routable address outside the tunnel";
const PUBLIC_IP_DESC: &str =
    "Classifies the public IP as a VPN/hosting exit versus a consumer ISP address";
const IPV6_DESC: &str =
    "Checks for a routable IPv6 path that could bypass an IPv4-only tunnel; \
     an unreachable IPv6-only endpoint counts as blocked";

const WEBRTC_RECOMMENDATION: &str =
    "Disable WebRTC or install an extension that prevents ICE candidate leaks";
const PUBLIC_IP_RECOMMENDATION: &str =
    "Connect to a VPN so your public address no longer points at your home ISP";
const IPV6_RECOMMENDATION: &str =
    "Disable IPv6 on this device or choose a VPN with IPv6 leak protection";

pub struct IpProtectionModule {
    sources: Arc<dyn NetworkSources>,
    browser: Arc<dyn BrowserEnvironment>,
    mode: ScanMode,
}

impl IpProtectionModule {
    pub fn new(
        sources: Arc<dyn NetworkSources>,
        browser: Arc<dyn BrowserEnvironment>,
        mode: ScanMode,
    ) -> Self {
        Self {
            sources,
            browser,
            mode,
        }
    }

    async fn webrtc_leak_test(&self) -> TestResult {
        let candidates = bounded(ICE_GATHER_TIMEOUT, self.browser.ice_candidates(), None).await;

        let Some(candidates) = candidates else {
            return TestResult::unknown(
                WEBRTC_TEST,
                WEBRTC_MAX,
                WEBRTC_DESC,
                "ICE candidate gathering is unavailable in this environment".to_string(),
                Some("Re-run the scan from a WebRTC-capable browser context"),
            );
        };

        let mut leaked: Vec<String> = Vec::new();
        for candidate in &candidates {
            if let Some(addr) = candidate_address(candidate) {
                if !is_private_or_local(&addr) {
                    let rendered = addr.to_string();
                    if !leaked.contains(&rendered) {
                        leaked.push(rendered);
                    }
                }
            }
        }

        if leaked.is_empty() {
            TestResult::pass(
                WEBRTC_TEST,
                WEBRTC_MAX,
                WEBRTC_DESC,
                format!(
                    "No WebRTC IP leaks detected ({} candidate(s) inspected, all private-range)",
                    candidates.len()
                ),
            )
        } else {
            TestResult::fail(
                WEBRTC_TEST,
                WEBRTC_MAX,
                WEBRTC_DESC,
                format!(
                    "WebRTC leaked {} IP address(es): {}",
                    leaked.len(),
                    leaked.join(", ")
                ),
                WEBRTC_RECOMMENDATION,
                true,
            )
        }
    }

    async fn public_ip_test(&self) -> TestResult {
        let lookup = bounded(
            LOOKUP_TIMEOUT,
            self.sources.ip_info(),
            Err(LookupError::Timeout),
        )
        .await;

        let info = match lookup {
            Ok(info) => info,
            Err(e) => {
                return TestResult::unknown(
                    PUBLIC_IP_TEST,
                    PUBLIC_IP_MAX,
                    PUBLIC_IP_DESC,
                    format!("Public IP lookup failed: {e}"),
                    None,
                );
            }
        };

        let org = info.org_label().to_string();
        let vpn_like = info.proxy == Some(true)
            || info.hosting == Some(true)
            || (org != "Unknown" && org_matches_vpn_keyword(&org));

        if vpn_like {
            TestResult::pass(
                PUBLIC_IP_TEST,
                PUBLIC_IP_MAX,
                PUBLIC_IP_DESC,
                format!(
                    "Public IP {} appears to belong to a VPN or hosting provider ({})",
                    info.ip_label(),
                    org
                ),
            )
        } else {
            match self.mode {
                ScanMode::VpnActive => TestResult::fail(
                    PUBLIC_IP_TEST,
                    PUBLIC_IP_MAX,
                    PUBLIC_IP_DESC,
                    format!(
                        "Public IP {} looks like a consumer ISP connection ({})",
                        info.ip_label(),
                        org
                    ),
                    PUBLIC_IP_RECOMMENDATION,
                    false,
                ),
                ScanMode::Baseline => TestResult::warning(
                    PUBLIC_IP_TEST,
                    0,
                    PUBLIC_IP_MAX,
                    PUBLIC_IP_DESC,
                    format!(
                        "Public IP {} is a consumer ISP connection ({}); expected for a baseline run",
                        info.ip_label(),
                        org
                    ),
                    PUBLIC_IP_RECOMMENDATION,
                ),
            }
        }
    }

    async fn ipv6_leak_test(&self) -> TestResult {
        let lookup = bounded(
            LOOKUP_TIMEOUT,
            self.sources.ipv6_address(),
            Err(LookupError::Timeout),
        )
        .await;

        match lookup {
            Ok(Some(addr)) => match self.mode {
                ScanMode::VpnActive => TestResult::fail(
                    IPV6_TEST,
                    IPV6_MAX,
                    IPV6_DESC,
                    format!("IPv6 address {addr} is reachable alongside the tunnel"),
                    IPV6_RECOMMENDATION,
                    true,
                ),
                ScanMode::Baseline => TestResult::warning(
                    IPV6_TEST,
                    0,
                    IPV6_MAX,
                    IPV6_DESC,
                    format!("IPv6 connectivity present ({addr}); expected outside a tunnel"),
                    IPV6_RECOMMENDATION,
                ),
            },
            Ok(None) => TestResult::pass(
                IPV6_TEST,
                IPV6_MAX,
                IPV6_DESC,
                "No routable IPv6 address detected".to_string(),
            ),
            // An IPv6-only endpoint that cannot be reached is itself the
            // negative observation: no IPv6 route exists.
            Err(LookupError::Timeout) | Err(LookupError::Network(_)) => TestResult::pass(
                IPV6_TEST,
                IPV6_MAX,
                IPV6_DESC,
                "IPv6 lookup endpoint unreachable; treating IPv6 as blocked".to_string(),
            ),
            Err(e) => TestResult::unknown(
                IPV6_TEST,
                IPV6_MAX,
                IPV6_DESC,
                format!("IPv6 lookup answered abnormally: {e}"),
                None,
            ),
        }
    }
}

impl TestModule for IpProtectionModule {
    fn name(&self) -> &'static str {
        CATEGORY_NAME
    }

    async fn run(&self) -> Result<Vec<TestResult>, ProbeError> {
        let (webrtc, public_ip, ipv6) = tokio::join!(
            self.webrtc_leak_test(),
            self.public_ip_test(),
            self.ipv6_leak_test(),
        );
        Ok(vec![webrtc, public_ip, ipv6])
    }
}

//! DNS protection battery: egress-location consistency and
//! DNS-over-HTTPS availability. The consistency check is a heuristic
//! comparison, and says so in its output; it is not a resolver-path proof.

use std::sync::Arc;
use std::time::Duration;

use crate::contract::TestResult;
use crate::probe::{bounded, ProbeError, TestModule};
use crate::sources::{LookupError, NetworkSources};

pub const CATEGORY_NAME: &str = "DNS Leak Protection";

const LEAK_TEST: &str = "DNS Egress Consistency";
const DOH_TEST: &str = "DNS-over-HTTPS Availability";

const LEAK_MAX: u32 = 25;
const LEAK_MISMATCH_SCORE: u32 = 10;
const DOH_MAX: u32 = 10;
/// Documented degraded value when no provider answers: DoH absence is a
/// posture gap, not a leak.
const DOH_DEGRADED_SCORE: u32 = 5;

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);
const DOH_PROBE_TIMEOUT: Duration = Duration::from_secs(4);

/// Probed in order; the first provider answering HTTP 200 with a JSON
/// content type wins.
const DOH_PROVIDERS: [(&str, &str); 3] = [
    ("Cloudflare", "https://cloudflare-dns.com/dns-query"),
    ("Google", "https://dns.google/resolve"),
    ("Quad9", "https://dns.quad9.net/dns-query"),
];

const LEAK_DESC: &str =
    "Compares the DNS/HTTP egress location against the public IP's country; \
     a divergence is heuristic evidence that resolver traffic takes a different path";
const DOH_DESC: &str = "Checks whether an encrypted DNS-over-HTTPS resolver is reachable";

const LEAK_RECOMMENDATION: &str =
    "Verify your VPN routes DNS queries through the tunnel and not to your ISP resolver";
const DOH_RECOMMENDATION: &str = "Enable DNS-over-HTTPS in your browser or OS settings";

pub struct DnsProtectionModule {
    sources: Arc<dyn NetworkSources>,
}

impl DnsProtectionModule {
    pub fn new(sources: Arc<dyn NetworkSources>) -> Self {
        Self { sources }
    }

    async fn egress_consistency_test(&self) -> TestResult {
        let (ip_info, trace) = tokio::join!(
            bounded(
                LOOKUP_TIMEOUT,
                self.sources.ip_info(),
                Err(LookupError::Timeout)
            ),
            bounded(
                LOOKUP_TIMEOUT,
                self.sources.edge_trace(),
                Err(LookupError::Timeout)
            ),
        );

        let ip_country = ip_info.ok().and_then(|info| info.country);
        let egress_location = trace.ok().and_then(|t| t.location);

        match (ip_country, egress_location) {
            (Some(ip_country), Some(egress)) => {
                if ip_country.eq_ignore_ascii_case(&egress) {
                    TestResult::pass(
                        LEAK_TEST,
                        LEAK_MAX,
                        LEAK_DESC,
                        format!(
                            "DNS egress location {egress} matches the public IP country {ip_country}"
                        ),
                    )
                } else {
                    TestResult::warning(
                        LEAK_TEST,
                        LEAK_MISMATCH_SCORE,
                        LEAK_MAX,
                        LEAK_DESC,
                        format!(
                            "DNS egress location {egress} differs from the public IP country \
                             {ip_country}; resolver traffic may bypass the tunnel"
                        ),
                        LEAK_RECOMMENDATION,
                    )
                    .with_critical(true)
                }
            }
            (ip_country, egress) => {
                let missing = match (&ip_country, &egress) {
                    (None, None) => "neither lookup answered",
                    (None, _) => "the public IP lookup did not answer",
                    (_, None) => "the egress trace did not answer",
                };
                TestResult::unknown(
                    LEAK_TEST,
                    LEAK_MAX,
                    LEAK_DESC,
                    format!("Egress comparison impossible: {missing}"),
                    None,
                )
            }
        }
    }

    async fn doh_availability_test(&self) -> TestResult {
        for (provider, endpoint) in DOH_PROVIDERS {
            let available = bounded(
                DOH_PROBE_TIMEOUT,
                self.sources.doh_available(endpoint),
                Err(LookupError::Timeout),
            )
            .await;

            if available.unwrap_or(false) {
                return TestResult::pass(
                    DOH_TEST,
                    DOH_MAX,
                    DOH_DESC,
                    format!("DNS-over-HTTPS is reachable via {provider}"),
                );
            }
        }

        TestResult::warning(
            DOH_TEST,
            DOH_DEGRADED_SCORE,
            DOH_MAX,
            DOH_DESC,
            format!(
                "No DNS-over-HTTPS provider answered ({} probed); \
                 queries likely use the system resolver",
                DOH_PROVIDERS.len()
            ),
            DOH_RECOMMENDATION,
        )
    }
}

impl TestModule for DnsProtectionModule {
    fn name(&self) -> &'static str {
        CATEGORY_NAME
    }

    async fn run(&self) -> Result<Vec<TestResult>, ProbeError> {
        let (leak, doh) = tokio::join!(self.egress_consistency_test(), self.doh_availability_test());
        Ok(vec![leak, doh])
    }
}

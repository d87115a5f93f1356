//! Location privacy battery: platform geolocation exposure and timezone
//! consistency. The timezone check is weak evidence either way and its
//! wording keeps it that honest.

use std::sync::Arc;
use std::time::Duration;

use crate::browser::{BrowserEnvironment, GeoOutcome};
use crate::contract::TestResult;
use crate::heuristics::COMMON_VPN_TIMEZONES;
use crate::probe::{bounded, ProbeError, TestModule};

pub const CATEGORY_NAME: &str = "Location Privacy";

const GEO_TEST: &str = "Geolocation Access";
const TIMEZONE_TEST: &str = "Timezone Consistency";

const GEO_MAX: u32 = 15;
const GEO_EXPOSED_SCORE: u32 = 5;
const TIMEZONE_MAX: u32 = 10;
const TIMEZONE_PARTIAL_SCORE: u32 = 5;

/// The host applies its own prompt timeout; this bound is the outer guard.
const GEO_TIMEOUT: Duration = Duration::from_secs(12);

const GEO_DESC: &str =
    "Requests the platform location; a denial or timeout means the site cannot read your position";
const TIMEZONE_DESC: &str =
    "Checks whether the resolved timezone is one commonly reported by VPN exits (weak evidence)";

const GEO_RECOMMENDATION: &str =
    "Deny geolocation prompts or revoke the Location permission for this site";
const TIMEZONE_RECOMMENDATION: &str =
    "Set your system timezone to match your VPN exit location";

pub struct LocationPrivacyModule {
    browser: Arc<dyn BrowserEnvironment>,
}

impl LocationPrivacyModule {
    pub fn new(browser: Arc<dyn BrowserEnvironment>) -> Self {
        Self { browser }
    }

    async fn geolocation_test(&self) -> TestResult {
        let outcome = bounded(GEO_TIMEOUT, self.browser.geolocation(), GeoOutcome::TimedOut).await;

        match outcome {
            GeoOutcome::Denied => TestResult::pass(
                GEO_TEST,
                GEO_MAX,
                GEO_DESC,
                "Geolocation request was denied; position not exposed".to_string(),
            ),
            GeoOutcome::TimedOut => TestResult::pass(
                GEO_TEST,
                GEO_MAX,
                GEO_DESC,
                "Geolocation request timed out without an answer; position not exposed".to_string(),
            ),
            GeoOutcome::Granted {
                latitude,
                longitude,
            } => TestResult::warning(
                GEO_TEST,
                GEO_EXPOSED_SCORE,
                GEO_MAX,
                GEO_DESC,
                format!(
                    "Geolocation request succeeded: position near {:.1}, {:.1} is readable",
                    latitude, longitude
                ),
                GEO_RECOMMENDATION,
            ),
            GeoOutcome::Unavailable => TestResult::unknown(
                GEO_TEST,
                GEO_MAX,
                GEO_DESC,
                "Geolocation API is not present in this environment".to_string(),
                None,
            ),
        }
    }

    fn timezone_test(&self) -> TestResult {
        match self.browser.timezone() {
            Some(tz) => {
                let masked = COMMON_VPN_TIMEZONES.iter().any(|common| *common == tz);
                if masked {
                    TestResult::pass(
                        TIMEZONE_TEST,
                        TIMEZONE_MAX,
                        TIMEZONE_DESC,
                        format!("Timezone {tz} is commonly reported by VPN exits"),
                    )
                } else {
                    TestResult::warning(
                        TIMEZONE_TEST,
                        TIMEZONE_PARTIAL_SCORE,
                        TIMEZONE_MAX,
                        TIMEZONE_DESC,
                        format!("Timezone {tz} is uncommon for VPN exits and may reveal your real region"),
                        TIMEZONE_RECOMMENDATION,
                    )
                }
            }
            None => TestResult::unknown(
                TIMEZONE_TEST,
                TIMEZONE_MAX,
                TIMEZONE_DESC,
                "Timezone could not be resolved in this environment".to_string(),
                None,
            ),
        }
    }
}

impl TestModule for LocationPrivacyModule {
    fn name(&self) -> &'static str {
        CATEGORY_NAME
    }

    async fn run(&self) -> Result<Vec<TestResult>, ProbeError> {
        // The timezone read is synchronous; only geolocation suspends.
        let geolocation = self.geolocation_test().await;
        let timezone = self.timezone_test();
        Ok(vec![geolocation, timezone])
    }
}

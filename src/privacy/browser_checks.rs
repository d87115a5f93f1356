//! Browser configuration probes: Do-Not-Track posture and the enumerable
//! plugin surface.

use std::sync::Arc;

use crate::browser::BrowserEnvironment;
use crate::contract::TestResult;
use crate::probe::{ProbeError, TestModule};

pub const CATEGORY_NAME: &str = "Browser Configuration";

const DNT_TEST: &str = "Do-Not-Track Signal";
const PLUGIN_TEST: &str = "Plugin Surface";

const DNT_MAX: u32 = 10;
const PLUGIN_MAX: u32 = 5;
const PLUGIN_PARTIAL: u32 = 2;

const DNT_DESC: &str = "Checks whether the browser sends the Do-Not-Track signal";
const PLUGIN_DESC: &str =
    "Counts enumerable plugins; each plugin adds fingerprinting entropy";

const DNT_RECOMMENDATION: &str = "Enable the Do-Not-Track setting in your browser";
const PLUGIN_RECOMMENDATION: &str =
    "Remove or disable unused browser plugins to shrink your fingerprint";

pub struct BrowserConfigDetector {
    browser: Arc<dyn BrowserEnvironment>,
}

impl BrowserConfigDetector {
    pub fn new(browser: Arc<dyn BrowserEnvironment>) -> Self {
        Self { browser }
    }

    fn dnt_test(&self) -> TestResult {
        match self.browser.hardware().do_not_track {
            Some(true) => TestResult::pass(
                DNT_TEST,
                DNT_MAX,
                DNT_DESC,
                "Do-Not-Track is enabled".to_string(),
            ),
            Some(false) => TestResult::warning(
                DNT_TEST,
                0,
                DNT_MAX,
                DNT_DESC,
                "Do-Not-Track is disabled".to_string(),
                DNT_RECOMMENDATION,
            ),
            None => TestResult::unknown(
                DNT_TEST,
                DNT_MAX,
                DNT_DESC,
                "Do-Not-Track preference could not be read".to_string(),
                None,
            ),
        }
    }

    fn plugin_test(&self) -> TestResult {
        match self.browser.hardware().plugin_count {
            Some(0) => TestResult::pass(
                PLUGIN_TEST,
                PLUGIN_MAX,
                PLUGIN_DESC,
                "No enumerable plugins exposed".to_string(),
            ),
            Some(count) => TestResult::warning(
                PLUGIN_TEST,
                PLUGIN_PARTIAL,
                PLUGIN_MAX,
                PLUGIN_DESC,
                format!("{count} plugin(s) are enumerable by any site"),
                PLUGIN_RECOMMENDATION,
            ),
            None => TestResult::unknown(
                PLUGIN_TEST,
                PLUGIN_MAX,
                PLUGIN_DESC,
                "Plugin list could not be read".to_string(),
                None,
            ),
        }
    }
}

impl TestModule for BrowserConfigDetector {
    fn name(&self) -> &'static str {
        CATEGORY_NAME
    }

    async fn run(&self) -> Result<Vec<TestResult>, ProbeError> {
        Ok(vec![self.dnt_test(), self.plugin_test()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::HardwareProfile;
    use crate::contract::TestStatus;
    use crate::test_fixtures::ScriptedBrowser;

    fn detector(hardware: HardwareProfile) -> BrowserConfigDetector {
        BrowserConfigDetector::new(Arc::new(ScriptedBrowser {
            hardware,
            ..Default::default()
        }))
    }

    #[tokio::test]
    async fn dnt_enabled_passes_and_disabled_warns() {
        let enabled = detector(HardwareProfile {
            do_not_track: Some(true),
            ..Default::default()
        })
        .dnt_test();
        assert_eq!(enabled.status, TestStatus::Pass);

        let disabled = detector(HardwareProfile {
            do_not_track: Some(false),
            ..Default::default()
        })
        .dnt_test();
        assert_eq!(disabled.status, TestStatus::Warning);
        assert_eq!(disabled.score, 0);
    }

    #[tokio::test]
    async fn plugin_count_zero_passes_nonzero_warns() {
        let none = detector(HardwareProfile {
            plugin_count: Some(0),
            ..Default::default()
        })
        .plugin_test();
        assert_eq!(none.status, TestStatus::Pass);

        let some = detector(HardwareProfile {
            plugin_count: Some(4),
            ..Default::default()
        })
        .plugin_test();
        assert_eq!(some.status, TestStatus::Warning);
        assert!(some.details.contains("4 plugin(s)"));
    }

    #[tokio::test]
    async fn unreadable_profile_is_unknown() {
        let results = detector(HardwareProfile::default()).run().await.unwrap();
        assert!(results.iter().all(|r| r.status == TestStatus::Unknown));
    }
}

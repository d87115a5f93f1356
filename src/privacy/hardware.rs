//! Hardware exposure probes: device capability fields and screen
//! resolution commonness. Resolution membership in the common table is a
//! coarse heuristic: it means blending into a large crowd, not proof of
//! spoofing.

use std::sync::Arc;

use crate::browser::BrowserEnvironment;
use crate::contract::TestResult;
use crate::heuristics::COMMON_SCREEN_RESOLUTIONS;
use crate::probe::{ProbeError, TestModule};

pub const CATEGORY_NAME: &str = "Hardware Exposure";

const CAPABILITY_TEST: &str = "Hardware Capability Exposure";
const RESOLUTION_TEST: &str = "Screen Resolution Commonness";

const CAPABILITY_MAX: u32 = 10;
const CAPABILITY_PARTIAL: u32 = 4;
const RESOLUTION_MAX: u32 = 10;
const RESOLUTION_PARTIAL: u32 = 4;

const CAPABILITY_DESC: &str =
    "Checks whether CPU core count and device memory are readable by any site";
const RESOLUTION_DESC: &str =
    "Checks whether the reported screen resolution blends into the common crowd (weak evidence)";

const CAPABILITY_RECOMMENDATION: &str =
    "Use a browser that clamps hardware capability fields to generic values";
const RESOLUTION_RECOMMENDATION: &str =
    "Run the browser at a common window size or enable resolution spoofing";

pub struct HardwareDetector {
    browser: Arc<dyn BrowserEnvironment>,
}

impl HardwareDetector {
    pub fn new(browser: Arc<dyn BrowserEnvironment>) -> Self {
        Self { browser }
    }

    fn capability_test(&self) -> TestResult {
        let hardware = self.browser.hardware();
        let mut exposed: Vec<String> = Vec::new();
        if let Some(cores) = hardware.hardware_concurrency {
            exposed.push(format!("{cores} CPU cores"));
        }
        if let Some(memory) = hardware.device_memory_gb {
            exposed.push(format!("{memory} GB device memory"));
        }

        if exposed.is_empty() {
            TestResult::pass(
                CAPABILITY_TEST,
                CAPABILITY_MAX,
                CAPABILITY_DESC,
                "Hardware capability fields are hidden".to_string(),
            )
        } else {
            TestResult::warning(
                CAPABILITY_TEST,
                CAPABILITY_PARTIAL,
                CAPABILITY_MAX,
                CAPABILITY_DESC,
                format!("Sites can read: {}", exposed.join(", ")),
                CAPABILITY_RECOMMENDATION,
            )
        }
    }

    fn resolution_test(&self) -> TestResult {
        match self.browser.hardware().screen_resolution {
            Some((width, height)) => {
                let common = COMMON_SCREEN_RESOLUTIONS
                    .iter()
                    .any(|(w, h)| *w == width && *h == height);
                if common {
                    TestResult::pass(
                        RESOLUTION_TEST,
                        RESOLUTION_MAX,
                        RESOLUTION_DESC,
                        format!("Resolution {width}x{height} is shared by a large crowd"),
                    )
                } else {
                    TestResult::warning(
                        RESOLUTION_TEST,
                        RESOLUTION_PARTIAL,
                        RESOLUTION_MAX,
                        RESOLUTION_DESC,
                        format!("Resolution {width}x{height} is uncommon and narrows your fingerprint"),
                        RESOLUTION_RECOMMENDATION,
                    )
                }
            }
            None => TestResult::unknown(
                RESOLUTION_TEST,
                RESOLUTION_MAX,
                RESOLUTION_DESC,
                "Screen resolution could not be read".to_string(),
                None,
            ),
        }
    }
}

impl TestModule for HardwareDetector {
    fn name(&self) -> &'static str {
        CATEGORY_NAME
    }

    async fn run(&self) -> Result<Vec<TestResult>, ProbeError> {
        Ok(vec![self.capability_test(), self.resolution_test()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::HardwareProfile;
    use crate::contract::TestStatus;
    use crate::test_fixtures::ScriptedBrowser;

    fn detector(hardware: HardwareProfile) -> HardwareDetector {
        HardwareDetector::new(Arc::new(ScriptedBrowser {
            hardware,
            ..Default::default()
        }))
    }

    #[tokio::test]
    async fn hidden_capabilities_pass() {
        let result = detector(HardwareProfile::default()).capability_test();
        assert_eq!(result.status, TestStatus::Pass);
    }

    #[tokio::test]
    async fn exposed_capabilities_warn_with_observed_values() {
        let result = detector(HardwareProfile {
            hardware_concurrency: Some(16),
            device_memory_gb: Some(8.0),
            ..Default::default()
        })
        .capability_test();
        assert_eq!(result.status, TestStatus::Warning);
        assert!(result.details.contains("16 CPU cores"));
        assert!(result.details.contains("8 GB device memory"));
    }

    #[tokio::test]
    async fn common_resolution_passes_uncommon_warns() {
        let common = detector(HardwareProfile {
            screen_resolution: Some((1920, 1080)),
            ..Default::default()
        })
        .resolution_test();
        assert_eq!(common.status, TestStatus::Pass);

        let uncommon = detector(HardwareProfile {
            screen_resolution: Some((1917, 1033)),
            ..Default::default()
        })
        .resolution_test();
        assert_eq!(uncommon.status, TestStatus::Warning);
        assert!(uncommon.details.contains("1917x1033"));
    }
}

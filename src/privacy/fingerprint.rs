//! Fingerprint-resistance probes: canvas render determinism and WebGL
//! renderer-string genericness.

use std::sync::Arc;
use std::time::Duration;

use crate::browser::BrowserEnvironment;
use crate::contract::TestResult;
use crate::heuristics::renderer_is_generic;
use crate::probe::{bounded, ProbeError, TestModule};

pub const CATEGORY_NAME: &str = "Fingerprint Resistance";

const CANVAS_TEST: &str = "Canvas Fingerprint Determinism";
const WEBGL_TEST: &str = "WebGL Renderer Exposure";

const CANVAS_MAX: u32 = 15;
const WEBGL_MAX: u32 = 10;
const WEBGL_PARTIAL: u32 = 4;

const SUBCHECK_TIMEOUT: Duration = Duration::from_secs(5);

const CANVAS_DESC: &str =
    "Renders the same scene twice; differing pixel hashes mean the browser injects canvas noise";
const WEBGL_DESC: &str =
    "Reads the unmasked WebGL renderer string; a generic renderer hides the real GPU";

const CANVAS_RECOMMENDATION: &str =
    "Enable canvas fingerprinting protection (privacy browser or anti-fingerprinting extension)";
const WEBGL_RECOMMENDATION: &str =
    "Hide the GPU model by enabling WebGL fingerprinting protection or disabling WebGL";

pub struct FingerprintDetector {
    browser: Arc<dyn BrowserEnvironment>,
}

impl FingerprintDetector {
    pub fn new(browser: Arc<dyn BrowserEnvironment>) -> Self {
        Self { browser }
    }

    async fn canvas_test(&self) -> TestResult {
        let sample = bounded(SUBCHECK_TIMEOUT, self.browser.canvas_fingerprint(), None).await;

        match sample {
            Some(sample) if !sample.is_deterministic() => TestResult::pass(
                CANVAS_TEST,
                CANVAS_MAX,
                CANVAS_DESC,
                "Two canvas render passes produced different hashes; noise injection is active"
                    .to_string(),
            ),
            Some(_) => TestResult::fail(
                CANVAS_TEST,
                CANVAS_MAX,
                CANVAS_DESC,
                "Canvas rendering is deterministic; the canvas hash identifies this browser"
                    .to_string(),
                CANVAS_RECOMMENDATION,
                false,
            ),
            None => TestResult::unknown(
                CANVAS_TEST,
                CANVAS_MAX,
                CANVAS_DESC,
                "Canvas rendering could not be observed in this environment".to_string(),
                None,
            ),
        }
    }

    async fn webgl_test(&self) -> TestResult {
        let renderer = bounded(SUBCHECK_TIMEOUT, self.browser.webgl_renderer(), None).await;

        match renderer {
            Some(renderer) if renderer_is_generic(&renderer) => TestResult::pass(
                WEBGL_TEST,
                WEBGL_MAX,
                WEBGL_DESC,
                format!("WebGL reports a generic renderer: {renderer}"),
            ),
            Some(renderer) => TestResult::warning(
                WEBGL_TEST,
                WEBGL_PARTIAL,
                WEBGL_MAX,
                WEBGL_DESC,
                format!("WebGL exposes the GPU model: {renderer}"),
                WEBGL_RECOMMENDATION,
            ),
            None => TestResult::unknown(
                WEBGL_TEST,
                WEBGL_MAX,
                WEBGL_DESC,
                "WebGL renderer string could not be observed".to_string(),
                None,
            ),
        }
    }
}

impl TestModule for FingerprintDetector {
    fn name(&self) -> &'static str {
        CATEGORY_NAME
    }

    async fn run(&self) -> Result<Vec<TestResult>, ProbeError> {
        let (canvas, webgl) = tokio::join!(self.canvas_test(), self.webgl_test());
        Ok(vec![canvas, webgl])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::CanvasSample;
    use crate::contract::TestStatus;
    use crate::test_fixtures::ScriptedBrowser;

    fn detector(browser: ScriptedBrowser) -> FingerprintDetector {
        FingerprintDetector::new(Arc::new(browser))
    }

    #[tokio::test]
    async fn noisy_canvas_passes() {
        let result = detector(ScriptedBrowser {
            canvas: Some(CanvasSample {
                first_pass: 1,
                second_pass: 2,
            }),
            ..Default::default()
        })
        .canvas_test()
        .await;
        assert_eq!(result.status, TestStatus::Pass);
    }

    #[tokio::test]
    async fn deterministic_canvas_fails() {
        let result = detector(ScriptedBrowser {
            canvas: Some(CanvasSample {
                first_pass: 9,
                second_pass: 9,
            }),
            ..Default::default()
        })
        .canvas_test()
        .await;
        assert_eq!(result.status, TestStatus::Fail);
        assert!(result.recommendation.is_some());
    }

    #[tokio::test]
    async fn real_gpu_string_warns_with_the_model_in_details() {
        let result = detector(ScriptedBrowser {
            webgl_renderer: Some("AMD Radeon RX 6800".to_string()),
            ..Default::default()
        })
        .webgl_test()
        .await;
        assert_eq!(result.status, TestStatus::Warning);
        assert!(result.details.contains("AMD Radeon RX 6800"));
    }

    #[tokio::test]
    async fn generic_renderer_passes() {
        let result = detector(ScriptedBrowser {
            webgl_renderer: Some("Google SwiftShader".to_string()),
            ..Default::default()
        })
        .webgl_test()
        .await;
        assert_eq!(result.status, TestStatus::Pass);
    }

    #[tokio::test]
    async fn unobservable_surfaces_are_unknown() {
        let results = detector(ScriptedBrowser::default()).run().await.unwrap();
        assert!(results.iter().all(|r| r.status == TestStatus::Unknown));
        assert!(results.iter().all(|r| r.score == 0));
    }
}

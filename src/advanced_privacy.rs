//! Advanced privacy battery: fingerprinting-surface checks and tracker
//! reachability. Fingerprinting protection aggregates four independent
//! sub-checks and requires more than half of the evaluable ones to
//! indicate blocking.

use std::sync::Arc;
use std::time::Duration;

use crate::browser::BrowserEnvironment;
use crate::contract::TestResult;
use crate::heuristics::{
    host_matches_suffix, renderer_is_generic, KNOWN_TRACKER_DOMAINS, RESTRICTED_FONT_COUNT,
};
use crate::probe::{bounded, ProbeError, TestModule};
use crate::sources::NetworkSources;

pub const CATEGORY_NAME: &str = "Advanced Privacy";

const FINGERPRINT_TEST: &str = "Fingerprinting Protection";
const TRACKER_TEST: &str = "Tracker Blocking";

const FINGERPRINT_MAX: u32 = 15;
const TRACKER_MAX: u32 = 10;

const SUBCHECK_TIMEOUT: Duration = Duration::from_secs(5);
const TRACKER_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

const FINGERPRINT_DESC: &str =
    "Aggregates canvas, WebGL, font and audio checks; protection means most surfaces are blocked or noisy";
const TRACKER_DESC: &str =
    "Attempts connections to known tracking domains; a blocker should make most of them unreachable";

const FINGERPRINT_RECOMMENDATION: &str =
    "Use a browser with built-in fingerprinting protection or a dedicated anti-fingerprinting extension";
const TRACKER_RECOMMENDATION: &str =
    "Add a content blocker so common tracking domains cannot be reached";

pub struct AdvancedPrivacyModule {
    sources: Arc<dyn NetworkSources>,
    browser: Arc<dyn BrowserEnvironment>,
}

impl AdvancedPrivacyModule {
    pub fn new(sources: Arc<dyn NetworkSources>, browser: Arc<dyn BrowserEnvironment>) -> Self {
        Self { sources, browser }
    }

    async fn fingerprint_test(&self) -> TestResult {
        let (canvas, renderer, fonts, audio) = tokio::join!(
            bounded(SUBCHECK_TIMEOUT, self.browser.canvas_fingerprint(), None),
            bounded(SUBCHECK_TIMEOUT, self.browser.webgl_renderer(), None),
            bounded(SUBCHECK_TIMEOUT, self.browser.available_font_count(), None),
            bounded(SUBCHECK_TIMEOUT, self.browser.audio_context_usable(), None),
        );

        // Each sub-check answers "does this surface indicate blocking?",
        // or None when the surface could not be observed at all.
        let verdicts: [(&str, Option<bool>); 4] = [
            ("canvas noise", canvas.map(|sample| !sample.is_deterministic())),
            ("generic WebGL renderer", renderer.map(|r| renderer_is_generic(&r))),
            ("restricted font set", fonts.map(|count| count <= RESTRICTED_FONT_COUNT)),
            ("audio context blocked", audio.map(|usable| !usable)),
        ];

        let evaluable: Vec<(&str, bool)> = verdicts
            .iter()
            .filter_map(|(name, verdict)| verdict.map(|v| (*name, v)))
            .collect();

        if evaluable.is_empty() {
            return TestResult::unknown(
                FINGERPRINT_TEST,
                FINGERPRINT_MAX,
                FINGERPRINT_DESC,
                "No fingerprinting surface could be observed in this environment".to_string(),
                None,
            );
        }

        let blocking: Vec<&str> = evaluable
            .iter()
            .filter(|(_, blocked)| *blocked)
            .map(|(name, _)| *name)
            .collect();
        let protected = blocking.len() * 2 > evaluable.len();

        if protected {
            TestResult::pass(
                FINGERPRINT_TEST,
                FINGERPRINT_MAX,
                FINGERPRINT_DESC,
                format!(
                    "Fingerprinting surface reduced: {} of {} checks indicate blocking ({})",
                    blocking.len(),
                    evaluable.len(),
                    blocking.join(", ")
                ),
            )
        } else {
            TestResult::fail(
                FINGERPRINT_TEST,
                FINGERPRINT_MAX,
                FINGERPRINT_DESC,
                format!(
                    "Fingerprinting largely unobstructed: only {} of {} checks indicate blocking",
                    blocking.len(),
                    evaluable.len()
                ),
                FINGERPRINT_RECOMMENDATION,
                false,
            )
        }
    }

    async fn tracker_test(&self) -> TestResult {
        let mut handles = Vec::with_capacity(KNOWN_TRACKER_DOMAINS.len());
        for domain in KNOWN_TRACKER_DOMAINS.iter() {
            let sources = Arc::clone(&self.sources);
            let domain = domain.to_string();
            handles.push(tokio::spawn(async move {
                let reachable = bounded(
                    TRACKER_PROBE_TIMEOUT,
                    sources.tracker_reachable(&domain),
                    // An aborted/timed-out probe is what a blocker produces.
                    Ok(false),
                )
                .await
                .unwrap_or(false);
                (domain, reachable)
            }));
        }

        let mut reachable: Vec<String> = Vec::new();
        let mut probed = 0usize;
        for handle in handles {
            // A panicked probe task is simply not counted.
            if let Ok((domain, was_reachable)) = handle.await {
                probed += 1;
                if was_reachable {
                    reachable.push(domain);
                }
            }
        }

        if probed == 0 {
            return TestResult::unknown(
                TRACKER_TEST,
                TRACKER_MAX,
                TRACKER_DESC,
                "No tracker domain could be probed".to_string(),
                None,
            );
        }

        let blocked = probed - reachable.len();
        if blocked * 2 > probed {
            TestResult::pass(
                TRACKER_TEST,
                TRACKER_MAX,
                TRACKER_DESC,
                format!("{blocked} of {probed} known tracking domains are blocked"),
            )
        } else {
            TestResult::fail(
                TRACKER_TEST,
                TRACKER_MAX,
                TRACKER_DESC,
                format!(
                    "{} of {} known tracking domains are reachable: {}",
                    reachable.len(),
                    probed,
                    reachable.join(", ")
                ),
                TRACKER_RECOMMENDATION,
                false,
            )
        }
    }
}

impl TestModule for AdvancedPrivacyModule {
    fn name(&self) -> &'static str {
        CATEGORY_NAME
    }

    async fn run(&self) -> Result<Vec<TestResult>, ProbeError> {
        let (fingerprint, trackers) = tokio::join!(self.fingerprint_test(), self.tracker_test());
        Ok(vec![fingerprint, trackers])
    }
}

/// True when `host` falls under any known tracker domain. Used by hosts
/// that classify observed requests rather than probing.
pub fn is_tracker_host(host: &str) -> bool {
    KNOWN_TRACKER_DOMAINS
        .iter()
        .any(|suffix| host_matches_suffix(host, suffix))
}

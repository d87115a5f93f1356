//! The smaller privacy-test battery: cookie, fingerprint, browser and
//! hardware detectors behind the same result contract and aggregation
//! pattern as the VPN-effectiveness scan, with its own weights and a
//! three-tier privacy level instead of the protection tier.

pub mod browser_checks;
pub mod cookies;
pub mod fingerprint;
pub mod hardware;

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::Serialize;

use crate::browser::BrowserEnvironment;
use crate::contract::{Grade, Recommendations, TestCategory, TestResult, TestSummary};
use crate::probe::{results_or_fallback, TestModule};
use crate::recommend;
use crate::scorer;

use browser_checks::BrowserConfigDetector;
use cookies::CookieDetector;
use fingerprint::FingerprintDetector;
use hardware::HardwareDetector;

/// Coarse privacy posture derived from the overall percentage.
/// Variants are ordered from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyLevel {
    Low,
    Moderate,
    High,
}

pub fn determine_privacy_level(score: u32, max_score: u32) -> PrivacyLevel {
    if max_score == 0 {
        return PrivacyLevel::Low;
    }
    let pct = f64::from(score) / f64::from(max_score) * 100.0;
    if pct >= 80.0 {
        PrivacyLevel::High
    } else if pct >= 50.0 {
        PrivacyLevel::Moderate
    } else {
        PrivacyLevel::Low
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivacyMetadata {
    pub timestamp: String,
    pub duration_ms: u64,
    pub user_agent: String,
}

/// Immutable snapshot of one privacy-test run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivacyReport {
    pub overall_score: u32,
    pub max_possible_score: u32,
    pub overall_grade: Grade,
    pub privacy_level: PrivacyLevel,
    pub categories: Vec<TestCategory>,
    pub summary: TestSummary,
    pub recommendations: Recommendations,
    pub metadata: PrivacyMetadata,
}

pub struct PrivacyService {
    browser: Arc<dyn BrowserEnvironment>,
}

impl PrivacyService {
    pub fn new(browser: Arc<dyn BrowserEnvironment>) -> Self {
        Self { browser }
    }

    /// One full privacy-test run; infallible for the same reason the
    /// effectiveness scan is.
    pub async fn run_privacy_test(&self) -> PrivacyReport {
        let started = Instant::now();
        let timestamp = Utc::now().to_rfc3339();

        let cookie_detector = CookieDetector::new(Arc::clone(&self.browser));
        let fingerprint_detector = FingerprintDetector::new(Arc::clone(&self.browser));
        let browser_detector = BrowserConfigDetector::new(Arc::clone(&self.browser));
        let hardware_detector = HardwareDetector::new(Arc::clone(&self.browser));

        let (cookie_results, fingerprint_results, browser_results, hardware_results) = tokio::join!(
            cookie_detector.run(),
            fingerprint_detector.run(),
            browser_detector.run(),
            hardware_detector.run(),
        );

        let categories = vec![
            scorer::build_category(
                cookies::CATEGORY_NAME,
                results_or_fallback(cookies::CATEGORY_NAME, cookie_results),
            ),
            scorer::build_category(
                fingerprint::CATEGORY_NAME,
                results_or_fallback(fingerprint::CATEGORY_NAME, fingerprint_results),
            ),
            scorer::build_category(
                browser_checks::CATEGORY_NAME,
                results_or_fallback(browser_checks::CATEGORY_NAME, browser_results),
            ),
            scorer::build_category(
                hardware::CATEGORY_NAME,
                results_or_fallback(hardware::CATEGORY_NAME, hardware_results),
            ),
        ];

        let flattened: Vec<TestResult> = categories
            .iter()
            .flat_map(|category| category.tests.iter().cloned())
            .collect();

        let overall_score = scorer::calculate_score(&flattened);
        let max_possible_score = scorer::calculate_max_score(&flattened);

        crate::core::observability::record_scan_completed();

        PrivacyReport {
            overall_score,
            max_possible_score,
            overall_grade: scorer::calculate_grade(overall_score, max_possible_score),
            privacy_level: determine_privacy_level(overall_score, max_possible_score),
            summary: scorer::calculate_summary(&flattened),
            recommendations: recommend::generate_privacy_recommendations(&flattened),
            categories,
            metadata: PrivacyMetadata {
                timestamp,
                duration_ms: started.elapsed().as_millis() as u64,
                user_agent: self.browser.user_agent(),
            },
        }
    }
}

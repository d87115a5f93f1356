//! Runs the four probe batteries and the VPN detector concurrently and
//! assembles the immutable effectiveness report. Expected unreliability
//! never crosses this boundary: a module that somehow fails outright is
//! folded into one `Unknown` placeholder result for its category, and the
//! remaining categories still report.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;

use crate::advanced_privacy::AdvancedPrivacyModule;
use crate::browser::BrowserEnvironment;
use crate::contract::{EffectivenessReport, ScanMetadata, ScanMode, TestResult};
use crate::dns_protection::DnsProtectionModule;
use crate::ip_protection::IpProtectionModule;
use crate::location_privacy::LocationPrivacyModule;
use crate::probe::{results_or_fallback, TestModule};
use crate::recommend;
use crate::scorer;
use crate::vpn_detector::VpnDetector;
use crate::{advanced_privacy, dns_protection, ip_protection, location_privacy};

pub struct EffectivenessService {
    sources: Arc<dyn crate::sources::NetworkSources>,
    browser: Arc<dyn BrowserEnvironment>,
    mode: ScanMode,
}

impl EffectivenessService {
    pub fn new(
        sources: Arc<dyn crate::sources::NetworkSources>,
        browser: Arc<dyn BrowserEnvironment>,
        mode: ScanMode,
    ) -> Self {
        Self {
            sources,
            browser,
            mode,
        }
    }

    /// One full scan. Infallible by design: every expected failure mode
    /// has already been recovered into a typed result by the time this
    /// returns.
    pub async fn run_full_scan(&self) -> EffectivenessReport {
        let started = Instant::now();
        let timestamp = Utc::now().to_rfc3339();

        let ip_module = IpProtectionModule::new(
            Arc::clone(&self.sources),
            Arc::clone(&self.browser),
            self.mode,
        );
        let dns_module = DnsProtectionModule::new(Arc::clone(&self.sources));
        let location_module = LocationPrivacyModule::new(Arc::clone(&self.browser));
        let advanced_module =
            AdvancedPrivacyModule::new(Arc::clone(&self.sources), Arc::clone(&self.browser));
        let detector = VpnDetector::new(Arc::clone(&self.sources));

        let (ip_results, dns_results, location_results, advanced_results, detection) = tokio::join!(
            ip_module.run(),
            dns_module.run(),
            location_module.run(),
            advanced_module.run(),
            detector.detect(),
        );

        let categories = vec![
            scorer::build_category(
                ip_protection::CATEGORY_NAME,
                results_or_fallback(ip_protection::CATEGORY_NAME, ip_results),
            ),
            scorer::build_category(
                dns_protection::CATEGORY_NAME,
                results_or_fallback(dns_protection::CATEGORY_NAME, dns_results),
            ),
            scorer::build_category(
                location_privacy::CATEGORY_NAME,
                results_or_fallback(location_privacy::CATEGORY_NAME, location_results),
            ),
            scorer::build_category(
                advanced_privacy::CATEGORY_NAME,
                results_or_fallback(advanced_privacy::CATEGORY_NAME, advanced_results),
            ),
        ];

        let flattened: Vec<TestResult> = categories
            .iter()
            .flat_map(|category| category.tests.iter().cloned())
            .collect();

        let overall_score = scorer::calculate_score(&flattened);
        let max_possible_score = scorer::calculate_max_score(&flattened);
        let critical_issues = scorer::count_critical_issues(&flattened);

        let recommendations =
            recommend::generate_vpn_recommendations(&flattened, detection.detected);
        let summary = scorer::calculate_summary(&flattened);

        let estimated_location = detection.location.clone();

        crate::core::observability::record_scan_completed();

        EffectivenessReport {
            overall_score,
            max_possible_score,
            overall_grade: scorer::calculate_grade(overall_score, max_possible_score),
            vpn_status: scorer::determine_tier(overall_score, max_possible_score, critical_issues),
            categories,
            summary,
            recommendations,
            metadata: ScanMetadata {
                timestamp,
                duration_ms: started.elapsed().as_millis() as u64,
                user_agent: self.browser.user_agent(),
                vpn_detection: detection,
                estimated_location,
            },
        }
    }
}

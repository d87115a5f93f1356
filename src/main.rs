mod advanced_privacy;
mod browser;
mod contract;
mod core;
mod dns_protection;
mod heuristics;
mod ip_protection;
mod location_privacy;
mod logging;
mod orchestrator;
mod privacy;
mod probe;
mod real_sources;
mod recommend;
mod scorer;
mod sources;
#[cfg(test)]
mod test_fixtures;
mod vpn_detector;

use std::sync::Arc;

use browser::DetachedBrowser;
use contract::ScanMode;
use orchestrator::EffectivenessService;
use real_sources::HttpSources;

/// Demo host shim: runs one effectiveness scan with the live lookup
/// sources and no embedding browser, then prints the summary. Embedding
/// hosts construct the services themselves and render the report.
#[tokio::main]
async fn main() {
    let sources = Arc::new(HttpSources::new());
    let browser = Arc::new(DetachedBrowser);

    let service = EffectivenessService::new(sources, browser, ScanMode::VpnActive);
    let report = service.run_full_scan().await;

    println!(
        "Overall: {}/{} (grade {:?}, status {:?})",
        report.overall_score,
        report.max_possible_score,
        report.overall_grade,
        report.vpn_status
    );
    for category in &report.categories {
        println!(
            "  {}: {}/{} ({} critical issue(s))",
            category.category_name,
            category.category_score,
            category.max_category_score,
            category.critical_issues
        );
        for test in &category.tests {
            println!("    [{:?}] {} - {}", test.status, test.test_name, test.details);
        }
    }
    println!(
        "VPN detection: detected={} confidence={} ({})",
        report.metadata.vpn_detection.detected,
        report.metadata.vpn_detection.confidence,
        report.metadata.vpn_detection.indicators.join("; ")
    );
    for bucket in [
        ("immediate", &report.recommendations.immediate),
        ("important", &report.recommendations.important),
        ("suggested", &report.recommendations.suggested),
    ] {
        for entry in bucket.1 {
            println!("  [{}] {}", bucket.0, entry);
        }
    }
    println!("Completed in {} ms", report.metadata.duration_ms);

    let privacy_service = privacy::PrivacyService::new(Arc::new(DetachedBrowser));
    let privacy_report = privacy_service.run_privacy_test().await;
    println!(
        "Privacy battery: {}/{} (grade {:?}, level {:?})",
        privacy_report.overall_score,
        privacy_report.max_possible_score,
        privacy_report.overall_grade,
        privacy_report.privacy_level
    );

    if crate::core::observability::OBS_DEV {
        let counters = crate::core::observability::snapshot();
        println!(
            "obs: timeouts={} lookup_failures={} fallbacks={} scans={} health={:?}",
            counters.probe_timeouts,
            counters.lookup_failures,
            counters.fallback_results,
            counters.scans_completed,
            crate::core::observability::get_health()
        );
    }
}

/// Shared result vocabulary every probe group emits and every consumer
/// renders against. Field names serialize in the camelCase form the
/// dashboard UI expects.
use serde::Serialize;

/// Outcome of a single probe. `Unknown` marks a probe that threw or could
/// not complete; it is never upgraded to `Pass`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Pass,
    Fail,
    Warning,
    Unknown,
}

/// Whether a scan runs against an active privacy tunnel or as a deliberate
/// unprotected baseline measurement. Baseline runs downgrade
/// "presence is expected" outcomes (an IPv6 route, a consumer-ISP address)
/// from failures to informational warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    VpnActive,
    Baseline,
}

/// Atomic unit of evidence emitted by a test module.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub test_name: String,
    pub status: TestStatus,
    pub score: u32,
    pub max_score: u32,
    pub description: String,
    pub details: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    pub critical: bool,
}

impl TestResult {
    pub fn pass(test_name: &str, max_score: u32, description: &str, details: String) -> Self {
        Self {
            test_name: test_name.to_string(),
            status: TestStatus::Pass,
            score: max_score,
            max_score,
            description: description.to_string(),
            details,
            recommendation: None,
            critical: false,
        }
    }

    pub fn fail(
        test_name: &str,
        max_score: u32,
        description: &str,
        details: String,
        recommendation: &str,
        critical: bool,
    ) -> Self {
        Self {
            test_name: test_name.to_string(),
            status: TestStatus::Fail,
            score: 0,
            max_score,
            description: description.to_string(),
            details,
            recommendation: Some(recommendation.to_string()),
            critical,
        }
    }

    pub fn warning(
        test_name: &str,
        score: u32,
        max_score: u32,
        description: &str,
        details: String,
        recommendation: &str,
    ) -> Self {
        Self {
            test_name: test_name.to_string(),
            status: TestStatus::Warning,
            score: score.min(max_score),
            max_score,
            description: description.to_string(),
            details,
            recommendation: Some(recommendation.to_string()),
            critical: false,
        }
    }

    /// Error fallback: the probe could not produce a genuine answer.
    /// Always scores zero.
    pub fn unknown(
        test_name: &str,
        max_score: u32,
        description: &str,
        details: String,
        recommendation: Option<&str>,
    ) -> Self {
        Self {
            test_name: test_name.to_string(),
            status: TestStatus::Unknown,
            score: 0,
            max_score,
            description: description.to_string(),
            details,
            recommendation: recommendation.map(str::to_string),
            critical: false,
        }
    }

    /// Marks this test definition as one whose failure must escalate the
    /// overall tier regardless of aggregate percentage.
    pub fn with_critical(mut self, critical: bool) -> Self {
        self.critical = critical;
        self
    }
}

/// A test module's results grouped under one category name. Built only by
/// the scorer so the sum invariants hold.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCategory {
    pub category_name: String,
    pub tests: Vec<TestResult>,
    pub category_score: u32,
    pub max_category_score: u32,
    pub critical_issues: u32,
}

/// Flat pass/fail counts across a merged result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSummary {
    pub total: u32,
    pub passed: u32,
    pub failed: u32,
    pub warnings: u32,
    pub critical_issues: u32,
}

/// Letter grade derived from the overall percentage.
/// Variants are ordered from worst to best for correct derived Ord behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Grade {
    #[serde(rename = "F")]
    F,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A+")]
    APlus,
}

/// Overall protection tier. `Critical` is forced by any critical failure
/// irrespective of percentage; the tier is a safety signal, not an average.
/// Variants are ordered from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtectionTier {
    Critical,
    Poor,
    Good,
    Excellent,
}

/// Best-effort geo/ISP metadata attached to a detection outcome.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoHint {
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub timezone: Option<String>,
    pub organization: Option<String>,
}

/// Heuristic VPN/proxy detection outcome. `detected == false` means
/// "no positive evidence found", not confirmed absence.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VpnDetection {
    pub detected: bool,
    pub confidence: u32,
    pub indicators: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoHint>,
}

/// Prioritized remediation guidance, bucketed by urgency. Each bucket is
/// deduplicated and capped independently.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Recommendations {
    pub immediate: Vec<String>,
    pub important: Vec<String>,
    pub suggested: Vec<String>,
}

/// Run metadata assembled by the orchestrator.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanMetadata {
    pub timestamp: String,
    pub duration_ms: u64,
    pub user_agent: String,
    pub vpn_detection: VpnDetection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_location: Option<GeoHint>,
}

/// Immutable snapshot of one full effectiveness scan.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectivenessReport {
    pub overall_score: u32,
    pub max_possible_score: u32,
    pub overall_grade: Grade,
    pub vpn_status: ProtectionTier,
    pub categories: Vec<TestCategory>,
    pub summary: TestSummary,
    pub recommendations: Recommendations,
    pub metadata: ScanMetadata,
}

//! Pure aggregation over probe results: sums, category assembly, grading
//! and tier classification. No I/O and no randomness, so the result is deterministic
//! given its inputs, which is what makes the overall score explainable.

use crate::contract::{
    Grade, ProtectionTier, TestCategory, TestResult, TestStatus, TestSummary,
};

pub fn calculate_score(results: &[TestResult]) -> u32 {
    results.iter().map(|r| r.score).sum()
}

pub fn calculate_max_score(results: &[TestResult]) -> u32 {
    results.iter().map(|r| r.max_score).sum()
}

pub fn count_critical_issues(results: &[TestResult]) -> u32 {
    results
        .iter()
        .filter(|r| r.status == TestStatus::Fail && r.critical)
        .count() as u32
}

/// Assembles a category from a module's results, computing the sum
/// invariants in one place.
pub fn build_category(category_name: &str, tests: Vec<TestResult>) -> TestCategory {
    let category_score = calculate_score(&tests);
    let max_category_score = calculate_max_score(&tests);
    let critical_issues = count_critical_issues(&tests);
    TestCategory {
        category_name: category_name.to_string(),
        tests,
        category_score,
        max_category_score,
        critical_issues,
    }
}

fn percentage(score: u32, max_score: u32) -> f64 {
    if max_score == 0 {
        // Nothing measurable earns nothing: worst grade, not NaN.
        return 0.0;
    }
    f64::from(score) / f64::from(max_score) * 100.0
}

pub fn calculate_grade(score: u32, max_score: u32) -> Grade {
    let pct = percentage(score, max_score);
    if pct >= 95.0 {
        Grade::APlus
    } else if pct >= 90.0 {
        Grade::A
    } else if pct >= 80.0 {
        Grade::B
    } else if pct >= 70.0 {
        Grade::C
    } else if pct >= 60.0 {
        Grade::D
    } else {
        Grade::F
    }
}

/// A single critical failure forces the worst tier no matter how well the
/// rest of the battery scored: one severe leak must never be masked by
/// unrelated high scores.
pub fn determine_tier(score: u32, max_score: u32, critical_issues: u32) -> ProtectionTier {
    if critical_issues > 0 {
        return ProtectionTier::Critical;
    }
    let pct = percentage(score, max_score);
    if pct >= 90.0 {
        ProtectionTier::Excellent
    } else if pct >= 75.0 {
        ProtectionTier::Good
    } else if pct >= 50.0 {
        ProtectionTier::Poor
    } else {
        ProtectionTier::Critical
    }
}

pub fn calculate_summary(results: &[TestResult]) -> TestSummary {
    TestSummary {
        total: results.len() as u32,
        passed: results.iter().filter(|r| r.status == TestStatus::Pass).count() as u32,
        failed: results.iter().filter(|r| r.status == TestStatus::Fail).count() as u32,
        warnings: results.iter().filter(|r| r.status == TestStatus::Warning).count() as u32,
        critical_issues: count_critical_issues(results),
    }
}

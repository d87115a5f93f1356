//! Probe plumbing shared by the test modules: the module contract, the
//! bounded-timeout race every network/platform touch runs under, and the
//! error type reserved for the orchestrator's defense-in-depth seam.

use std::future::Future;
use std::time::Duration;

use crate::contract::TestResult;
use crate::core::observability;

/// One probe group. `run` must not let an internal probe failure escape:
/// each sub-probe degrades to its documented fallback result instead. The
/// `Err` arm exists so the orchestrator can still recover if a module
/// violates that guarantee.
pub trait TestModule {
    fn name(&self) -> &'static str;
    async fn run(&self) -> Result<Vec<TestResult>, ProbeError>;
}

/// Races `future` against `limit` and always resolves. On timeout the
/// losing branch is dropped, so a late result can never touch an
/// already-returned value, and `fallback` is reported instead.
pub async fn bounded<F, T>(limit: Duration, future: F, fallback: T) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(limit, future).await {
        Ok(value) => value,
        Err(_) => {
            observability::record_probe_timeout();
            fallback
        }
    }
}

/// Defense in depth for the service layer: a module-level failure becomes
/// one `Unknown` placeholder result so the category still appears in the
/// report and sibling categories are unaffected.
pub fn results_or_fallback(
    category_name: &str,
    results: Result<Vec<TestResult>, ProbeError>,
) -> Vec<TestResult> {
    match results {
        Ok(results) => results,
        Err(e) => {
            observability::record_fallback_result();
            observability::set_health(observability::HealthState::DEGRADED);
            crate::log!(
                crate::logging::LogLevel::Error,
                "test module '{}' failed outright: {}",
                category_name,
                e
            );
            vec![TestResult::unknown(
                category_name,
                0,
                "The whole test group failed to run",
                format!("Test group did not complete: {e}"),
                None,
            )]
        }
    }
}

/// Module-level failure surfaced to the orchestrator.
#[derive(Debug)]
pub struct ProbeError {
    pub module: &'static str,
    pub cause: String,
}

impl std::fmt::Display for ProbeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "test module '{}' failed: {}", self.module, self.cause)
    }
}

impl std::error::Error for ProbeError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::TestStatus;

    #[tokio::test]
    async fn bounded_returns_inner_value_when_fast() {
        let value = bounded(Duration::from_secs(1), async { 7u32 }, 0u32).await;
        assert_eq!(value, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn bounded_resolves_to_fallback_when_future_never_returns() {
        let value = bounded(
            Duration::from_secs(2),
            std::future::pending::<u32>(),
            42u32,
        )
        .await;
        assert_eq!(value, 42);
    }

    #[test]
    fn module_failure_folds_into_one_unknown_placeholder() {
        let results = results_or_fallback(
            "IP Address Protection",
            Err(ProbeError {
                module: "IP Address Protection",
                cause: "scripted".to_string(),
            }),
        );
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, TestStatus::Unknown);
        assert_eq!(results[0].score, 0);
        assert!(results[0].details.contains("scripted"));
    }
}

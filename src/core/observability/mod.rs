#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservabilityLevel {
    OBS_NONE,
    OBS_SAFE,
    OBS_DEV,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    OK,
    DEGRADED,
    FAULTED,
    #[doc(hidden)]
    _Private,
}

#[cfg(feature = "obs_none")]
pub const OBS_LEVEL: ObservabilityLevel = ObservabilityLevel::OBS_NONE;

#[cfg(feature = "obs_dev")]
pub const OBS_LEVEL: ObservabilityLevel = ObservabilityLevel::OBS_DEV;

#[cfg(all(not(feature = "obs_none"), not(feature = "obs_dev")))]
pub const OBS_LEVEL: ObservabilityLevel = ObservabilityLevel::OBS_SAFE;

pub const OBS_NONE: bool = matches!(OBS_LEVEL, ObservabilityLevel::OBS_NONE);
pub const OBS_SAFE: bool = matches!(OBS_LEVEL, ObservabilityLevel::OBS_SAFE);
pub const OBS_DEV: bool = matches!(OBS_LEVEL, ObservabilityLevel::OBS_DEV);

use std::sync::atomic::{AtomicU64, Ordering};

// Coarse probe bookkeeping only. Counters never carry addresses,
// identifiers or timing that could reconstruct what a scan observed.
static PROBE_TIMEOUTS: AtomicU64 = AtomicU64::new(0);
static LOOKUP_FAILURES: AtomicU64 = AtomicU64::new(0);
static FALLBACK_RESULTS: AtomicU64 = AtomicU64::new(0);
static SCANS_COMPLETED: AtomicU64 = AtomicU64::new(0);
static HEALTH_STATE: AtomicU64 = AtomicU64::new(HealthState::OK as u64);

#[inline]
pub fn record_probe_timeout() {
    PROBE_TIMEOUTS.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub fn record_lookup_failure() {
    LOOKUP_FAILURES.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub fn record_fallback_result() {
    FALLBACK_RESULTS.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub fn record_scan_completed() {
    SCANS_COMPLETED.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub fn set_health(state: HealthState) {
    HEALTH_STATE.store(state as u64, Ordering::Relaxed);
}

#[inline]
pub fn get_health() -> HealthState {
    match HEALTH_STATE.load(Ordering::Relaxed) {
        x if x == HealthState::OK as u64 => HealthState::OK,
        x if x == HealthState::DEGRADED as u64 => HealthState::DEGRADED,
        x if x == HealthState::FAULTED as u64 => HealthState::FAULTED,
        _ => HealthState::FAULTED,
    }
}

#[derive(Debug, Clone)]
pub struct ObservabilitySnapshot {
    pub probe_timeouts: u64,
    pub lookup_failures: u64,
    pub fallback_results: u64,
    pub scans_completed: u64,
}

pub fn snapshot() -> ObservabilitySnapshot {
    ObservabilitySnapshot {
        probe_timeouts: PROBE_TIMEOUTS.load(Ordering::Relaxed),
        lookup_failures: LOOKUP_FAILURES.load(Ordering::Relaxed),
        fallback_results: FALLBACK_RESULTS.load(Ordering::Relaxed),
        scans_completed: SCANS_COMPLETED.load(Ordering::Relaxed),
    }
}

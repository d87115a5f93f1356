//! Platform observation seam. The probes never touch browser APIs
//! directly: an embedding host (a WebView or wasm shell owning the real
//! WebRTC/canvas/geolocation surfaces) implements this trait, and every
//! observation carries an explicit "unavailable" outcome so probes can
//! degrade to their documented fallbacks instead of guessing.

use async_trait::async_trait;

/// Two render passes of the same canvas scene. Differing hashes mean the
/// host injects noise into canvas reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasSample {
    pub first_pass: u64,
    pub second_pass: u64,
}

impl CanvasSample {
    pub fn is_deterministic(&self) -> bool {
        self.first_pass == self.second_pass
    }
}

/// Outcome of a platform geolocation request. The host applies its own
/// prompt/timeout bound before answering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeoOutcome {
    Granted { latitude: f64, longitude: f64 },
    Denied,
    TimedOut,
    Unavailable,
}

/// Which web storage scope a probe targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageScope {
    Local,
    Session,
}

/// Exposed hardware/browser surface used by the fingerprint-oriented
/// probes. Every field optional: hosts report only what the platform
/// exposes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HardwareProfile {
    pub hardware_concurrency: Option<u32>,
    pub device_memory_gb: Option<f64>,
    pub screen_resolution: Option<(u32, u32)>,
    pub plugin_count: Option<u32>,
    pub do_not_track: Option<bool>,
}

#[async_trait]
pub trait BrowserEnvironment: Send + Sync {
    /// ICE candidate lines gathered by a short-lived peer connection.
    /// `None` when WebRTC is not available to the host.
    async fn ice_candidates(&self) -> Option<Vec<String>>;

    async fn canvas_fingerprint(&self) -> Option<CanvasSample>;

    async fn webgl_renderer(&self) -> Option<String>;

    async fn available_font_count(&self) -> Option<u32>;

    /// Whether an audio context could be created (audio fingerprint
    /// surface present).
    async fn audio_context_usable(&self) -> Option<bool>;

    async fn geolocation(&self) -> GeoOutcome;

    fn timezone(&self) -> Option<String>;

    /// Whether a cookie set from a third-party context is readable back.
    async fn third_party_cookie_allowed(&self) -> Option<bool>;

    /// First-party cookie jar operations for the hygiene probe. These are
    /// synchronous on every real platform, which lets probe cleanup run
    /// from a scope guard on early exit paths.
    fn set_cookie(&self, name: &str, value: &str) -> bool;
    fn cookie_present(&self, name: &str) -> bool;
    fn delete_cookie(&self, name: &str);

    /// Web storage operations for the persistence probe; synchronous for
    /// the same reason as the cookie jar.
    fn storage_set(&self, scope: StorageScope, key: &str, value: &str) -> bool;
    fn storage_get(&self, scope: StorageScope, key: &str) -> Option<String>;
    fn storage_remove(&self, scope: StorageScope, key: &str);

    fn hardware(&self) -> HardwareProfile;

    fn user_agent(&self) -> String;
}

/// Host adapter for running without an embedding browser: every
/// observation reports unavailable, so browser-dependent probes land on
/// their conservative fallbacks while network probes stay real.
pub struct DetachedBrowser;

#[async_trait]
impl BrowserEnvironment for DetachedBrowser {
    async fn ice_candidates(&self) -> Option<Vec<String>> {
        None
    }

    async fn canvas_fingerprint(&self) -> Option<CanvasSample> {
        None
    }

    async fn webgl_renderer(&self) -> Option<String> {
        None
    }

    async fn available_font_count(&self) -> Option<u32> {
        None
    }

    async fn audio_context_usable(&self) -> Option<bool> {
        None
    }

    async fn geolocation(&self) -> GeoOutcome {
        GeoOutcome::Unavailable
    }

    fn timezone(&self) -> Option<String> {
        None
    }

    async fn third_party_cookie_allowed(&self) -> Option<bool> {
        None
    }

    fn set_cookie(&self, _name: &str, _value: &str) -> bool {
        false
    }

    fn cookie_present(&self, _name: &str) -> bool {
        false
    }

    fn delete_cookie(&self, _name: &str) {}

    fn storage_set(&self, _scope: StorageScope, _key: &str, _value: &str) -> bool {
        false
    }

    fn storage_get(&self, _scope: StorageScope, _key: &str) -> Option<String> {
        None
    }

    fn storage_remove(&self, _scope: StorageScope, _key: &str) {}

    fn hardware(&self) -> HardwareProfile {
        HardwareProfile::default()
    }

    fn user_agent(&self) -> String {
        format!(
            "privacy-effectiveness-engine/{} (detached)",
            env!("CARGO_PKG_VERSION")
        )
    }
}

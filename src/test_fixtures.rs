//! Programmable stand-ins for the browser and network seams, shared by the
//! unit tests of every probe module.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::browser::{
    BrowserEnvironment, CanvasSample, GeoOutcome, HardwareProfile, StorageScope,
};
use crate::sources::{EdgeTrace, IpInfoPayload, LookupError, NetworkSources};

/// Scripted behavior of one lookup endpoint.
pub enum SourceScript<T> {
    Returns(T),
    Fails,
    /// Never resolves; exercises probe timeout bounds.
    Hangs,
}

impl<T: Clone> SourceScript<T> {
    async fn answer(&self) -> Result<T, LookupError> {
        match self {
            SourceScript::Returns(value) => Ok(value.clone()),
            SourceScript::Fails => Err(LookupError::Network("scripted failure".to_string())),
            SourceScript::Hangs => std::future::pending().await,
        }
    }
}

pub struct ScriptedSources {
    pub ip_info: SourceScript<IpInfoPayload>,
    pub ipv6: SourceScript<Option<String>>,
    pub trace: SourceScript<EdgeTrace>,
    pub doh: SourceScript<bool>,
    /// Domains the tracker probe should report as reachable.
    pub reachable_trackers: Vec<String>,
}

impl Default for ScriptedSources {
    fn default() -> Self {
        Self {
            ip_info: SourceScript::Fails,
            ipv6: SourceScript::Returns(None),
            trace: SourceScript::Fails,
            doh: SourceScript::Returns(false),
            reachable_trackers: Vec::new(),
        }
    }
}

#[async_trait]
impl NetworkSources for ScriptedSources {
    async fn ip_info(&self) -> Result<IpInfoPayload, LookupError> {
        self.ip_info.answer().await
    }

    async fn ipv6_address(&self) -> Result<Option<String>, LookupError> {
        self.ipv6.answer().await
    }

    async fn edge_trace(&self) -> Result<EdgeTrace, LookupError> {
        self.trace.answer().await
    }

    async fn doh_available(&self, _endpoint: &str) -> Result<bool, LookupError> {
        self.doh.answer().await
    }

    async fn tracker_reachable(&self, domain: &str) -> Result<bool, LookupError> {
        Ok(self.reachable_trackers.iter().any(|d| d == domain))
    }
}

/// In-memory browser with per-field scripted observations and a real
/// cookie jar / storage map, so cleanup behavior is actually observable.
pub struct ScriptedBrowser {
    pub ice_candidates: Option<Vec<String>>,
    pub canvas: Option<CanvasSample>,
    pub webgl_renderer: Option<String>,
    pub font_count: Option<u32>,
    pub audio_usable: Option<bool>,
    pub geolocation: GeoOutcome,
    pub timezone: Option<String>,
    pub third_party_cookies: Option<bool>,
    pub cookies_writable: bool,
    pub storage_writable: bool,
    pub hardware: HardwareProfile,
    pub cookie_jar: Mutex<HashMap<String, String>>,
    pub storage: Mutex<HashMap<(StorageScope, String), String>>,
}

impl Default for ScriptedBrowser {
    fn default() -> Self {
        Self {
            ice_candidates: None,
            canvas: None,
            webgl_renderer: None,
            font_count: None,
            audio_usable: None,
            geolocation: GeoOutcome::Unavailable,
            timezone: None,
            third_party_cookies: None,
            cookies_writable: true,
            storage_writable: true,
            hardware: HardwareProfile::default(),
            cookie_jar: Mutex::new(HashMap::new()),
            storage: Mutex::new(HashMap::new()),
        }
    }
}

impl ScriptedBrowser {
    pub fn with_ice_candidates(mut self, candidates: &[&str]) -> Self {
        self.ice_candidates = Some(candidates.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn cookie_jar_len(&self) -> usize {
        self.cookie_jar.lock().unwrap().len()
    }

    pub fn storage_len(&self) -> usize {
        self.storage.lock().unwrap().len()
    }
}

#[async_trait]
impl BrowserEnvironment for ScriptedBrowser {
    async fn ice_candidates(&self) -> Option<Vec<String>> {
        self.ice_candidates.clone()
    }

    async fn canvas_fingerprint(&self) -> Option<CanvasSample> {
        self.canvas
    }

    async fn webgl_renderer(&self) -> Option<String> {
        self.webgl_renderer.clone()
    }

    async fn available_font_count(&self) -> Option<u32> {
        self.font_count
    }

    async fn audio_context_usable(&self) -> Option<bool> {
        self.audio_usable
    }

    async fn geolocation(&self) -> GeoOutcome {
        self.geolocation
    }

    fn timezone(&self) -> Option<String> {
        self.timezone.clone()
    }

    async fn third_party_cookie_allowed(&self) -> Option<bool> {
        self.third_party_cookies
    }

    fn set_cookie(&self, name: &str, value: &str) -> bool {
        if !self.cookies_writable {
            return false;
        }
        self.cookie_jar
            .lock()
            .unwrap()
            .insert(name.to_string(), value.to_string());
        true
    }

    fn cookie_present(&self, name: &str) -> bool {
        self.cookie_jar.lock().unwrap().contains_key(name)
    }

    fn delete_cookie(&self, name: &str) {
        self.cookie_jar.lock().unwrap().remove(name);
    }

    fn storage_set(&self, scope: StorageScope, key: &str, value: &str) -> bool {
        if !self.storage_writable {
            return false;
        }
        self.storage
            .lock()
            .unwrap()
            .insert((scope, key.to_string()), value.to_string());
        true
    }

    fn storage_get(&self, scope: StorageScope, key: &str) -> Option<String> {
        self.storage
            .lock()
            .unwrap()
            .get(&(scope, key.to_string()))
            .cloned()
    }

    fn storage_remove(&self, scope: StorageScope, key: &str) {
        self.storage.lock().unwrap().remove(&(scope, key.to_string()));
    }

    fn hardware(&self) -> HardwareProfile {
        self.hardware.clone()
    }

    fn user_agent(&self) -> String {
        "ScriptedBrowser/1.0".to_string()
    }
}

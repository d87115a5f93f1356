//! Cookie and web-storage probes. Every probe that writes uses a
//! uniquely-suffixed key and removes it through a scope guard, so no test
//! artifact survives the probe on any exit path.

use std::sync::Arc;
use std::time::Duration;

use crate::browser::{BrowserEnvironment, StorageScope};
use crate::contract::TestResult;
use crate::probe::{bounded, ProbeError, TestModule};

pub const CATEGORY_NAME: &str = "Cookie Privacy";

const THIRD_PARTY_TEST: &str = "Third-Party Cookie Policy";
const COOKIE_TEST: &str = "Cookie Persistence";
const STORAGE_TEST: &str = "Web Storage Persistence";

const THIRD_PARTY_MAX: u32 = 20;
const COOKIE_MAX: u32 = 10;
const COOKIE_PARTIAL: u32 = 3;
const STORAGE_MAX: u32 = 10;
const STORAGE_PARTIAL: u32 = 3;

const THIRD_PARTY_TIMEOUT: Duration = Duration::from_secs(5);

const THIRD_PARTY_DESC: &str =
    "Checks whether a cookie set from a third-party context is readable back";
const COOKIE_DESC: &str =
    "Writes, reads and removes a uniquely-named first-party cookie; a blocked write counts as restricted";
const STORAGE_DESC: &str =
    "Writes, reads and removes a uniquely-named key in local and session storage";

const THIRD_PARTY_RECOMMENDATION: &str =
    "Block third-party cookies in your browser settings";
const COOKIE_RECOMMENDATION: &str =
    "Clear cookies on exit or restrict sites' cookie lifetime";
const STORAGE_RECOMMENDATION: &str =
    "Browse in private/incognito mode or clear site data regularly to limit storage-based tracking";

pub struct CookieDetector {
    browser: Arc<dyn BrowserEnvironment>,
}

impl CookieDetector {
    pub fn new(browser: Arc<dyn BrowserEnvironment>) -> Self {
        Self { browser }
    }

    fn probe_key() -> String {
        format!("__privacy_probe_{:08x}", rand::random::<u32>())
    }

    async fn third_party_test(&self) -> TestResult {
        let allowed = bounded(
            THIRD_PARTY_TIMEOUT,
            self.browser.third_party_cookie_allowed(),
            None,
        )
        .await;

        match allowed {
            Some(false) => TestResult::pass(
                THIRD_PARTY_TEST,
                THIRD_PARTY_MAX,
                THIRD_PARTY_DESC,
                "Third-party cookies are blocked".to_string(),
            ),
            Some(true) => TestResult::fail(
                THIRD_PARTY_TEST,
                THIRD_PARTY_MAX,
                THIRD_PARTY_DESC,
                "A third-party cookie was set and read back; cross-site tracking is possible"
                    .to_string(),
                THIRD_PARTY_RECOMMENDATION,
                false,
            ),
            None => TestResult::unknown(
                THIRD_PARTY_TEST,
                THIRD_PARTY_MAX,
                THIRD_PARTY_DESC,
                "Third-party cookie behavior could not be observed".to_string(),
                None,
            ),
        }
    }

    fn cookie_persistence_test(&self) -> TestResult {
        let key = Self::probe_key();
        let browser = Arc::clone(&self.browser);
        // The delete must run even if the probe bails out early.
        let _cleanup = scopeguard::guard(key.clone(), move |k| {
            browser.delete_cookie(&k);
        });

        if !self.browser.set_cookie(&key, "1") {
            return TestResult::pass(
                COOKIE_TEST,
                COOKIE_MAX,
                COOKIE_DESC,
                "Cookie writes are blocked in this environment".to_string(),
            );
        }

        if self.browser.cookie_present(&key) {
            TestResult::warning(
                COOKIE_TEST,
                COOKIE_PARTIAL,
                COOKIE_MAX,
                COOKIE_DESC,
                format!("Cookie '{key}' persisted and was readable; sites can store identifiers"),
                COOKIE_RECOMMENDATION,
            )
        } else {
            TestResult::pass(
                COOKIE_TEST,
                COOKIE_MAX,
                COOKIE_DESC,
                "Cookie write was accepted but not readable back; storage appears partitioned"
                    .to_string(),
            )
        }
    }

    fn storage_persistence_test(&self) -> TestResult {
        let key = Self::probe_key();
        let browser = Arc::clone(&self.browser);
        let _cleanup = scopeguard::guard(key.clone(), move |k| {
            browser.storage_remove(StorageScope::Local, &k);
            browser.storage_remove(StorageScope::Session, &k);
        });

        let mut persisting: Vec<&str> = Vec::new();
        for (scope, label) in [(StorageScope::Local, "local"), (StorageScope::Session, "session")] {
            if self.browser.storage_set(scope, &key, "1")
                && self.browser.storage_get(scope, &key).is_some()
            {
                persisting.push(label);
            }
        }

        if persisting.is_empty() {
            TestResult::pass(
                STORAGE_TEST,
                STORAGE_MAX,
                STORAGE_DESC,
                "Neither local nor session storage persisted the probe key".to_string(),
            )
        } else {
            TestResult::warning(
                STORAGE_TEST,
                STORAGE_PARTIAL,
                STORAGE_MAX,
                STORAGE_DESC,
                format!(
                    "Storage persisted the probe key in: {} scope(s)",
                    persisting.join(", ")
                ),
                STORAGE_RECOMMENDATION,
            )
        }
    }
}

impl TestModule for CookieDetector {
    fn name(&self) -> &'static str {
        CATEGORY_NAME
    }

    async fn run(&self) -> Result<Vec<TestResult>, ProbeError> {
        let third_party = self.third_party_test().await;
        let cookie = self.cookie_persistence_test();
        let storage = self.storage_persistence_test();
        Ok(vec![third_party, cookie, storage])
    }
}

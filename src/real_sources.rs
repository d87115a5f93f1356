//! Live HTTP implementation of the lookup seam. One shared client, a
//! per-request timeout on every call, and a primary/fallback pair for the
//! IP-info lookup. All endpoints are best-effort third parties; every
//! failure path lands on a typed `LookupError`.

use std::time::Duration;

use async_trait::async_trait;

use crate::core::observability;
use crate::sources::{EdgeTrace, IpInfoPayload, LookupError, NetworkSources};

const IP_INFO_PRIMARY: &str = "https://ipapi.co/json/";
const IP_INFO_FALLBACK: &str = "https://ipwhois.app/json/";
const IPV6_LOOKUP: &str = "https://api64.ipify.org?format=json";
const EDGE_TRACE: &str = "https://www.cloudflare.com/cdn-cgi/trace";

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(8);
const TRACKER_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, serde::Deserialize)]
struct AddressOnlyPayload {
    ip: Option<String>,
}

pub struct HttpSources {
    client: reqwest::Client,
}

impl HttpSources {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    async fn fetch_ip_info(&self, url: &str) -> Result<IpInfoPayload, LookupError> {
        let response = self
            .client
            .get(url)
            .timeout(LOOKUP_TIMEOUT)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        if !response.status().is_success() {
            return Err(LookupError::Http(response.status().as_u16()));
        }

        response
            .json::<IpInfoPayload>()
            .await
            .map_err(|e| LookupError::Malformed(e.to_string()))
    }
}

impl Default for HttpSources {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NetworkSources for HttpSources {
    async fn ip_info(&self) -> Result<IpInfoPayload, LookupError> {
        match self.fetch_ip_info(IP_INFO_PRIMARY).await {
            Ok(payload) => Ok(payload),
            Err(primary_err) => {
                observability::record_lookup_failure();
                crate::log!(
                    crate::logging::LogLevel::Warn,
                    "primary IP lookup failed ({}), trying fallback",
                    primary_err
                );
                self.fetch_ip_info(IP_INFO_FALLBACK).await.map_err(|e| {
                    observability::record_lookup_failure();
                    e
                })
            }
        }
    }

    async fn ipv6_address(&self) -> Result<Option<String>, LookupError> {
        let response = self
            .client
            .get(IPV6_LOOKUP)
            .timeout(LOOKUP_TIMEOUT)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        if !response.status().is_success() {
            return Err(LookupError::Http(response.status().as_u16()));
        }

        let payload = response
            .json::<AddressOnlyPayload>()
            .await
            .map_err(|e| LookupError::Malformed(e.to_string()))?;

        // The endpoint prefers IPv6 and answers with IPv4 when no v6 route
        // exists; only a colon-formatted address counts as IPv6 presence.
        Ok(payload.ip.filter(|addr| addr.contains(':')))
    }

    async fn edge_trace(&self) -> Result<EdgeTrace, LookupError> {
        let response = self
            .client
            .get(EDGE_TRACE)
            .timeout(LOOKUP_TIMEOUT)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        if !response.status().is_success() {
            return Err(LookupError::Http(response.status().as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| LookupError::Malformed(e.to_string()))?;

        Ok(EdgeTrace::parse(&body))
    }

    async fn doh_available(&self, endpoint: &str) -> Result<bool, LookupError> {
        let response = self
            .client
            .get(endpoint)
            .query(&[("name", "example.com"), ("type", "A")])
            .header("Accept", "application/dns-json")
            .timeout(LOOKUP_TIMEOUT)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let json_content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("json"))
            .unwrap_or(false);

        Ok(response.status().as_u16() == 200 && json_content_type)
    }

    async fn tracker_reachable(&self, domain: &str) -> Result<bool, LookupError> {
        let url = format!("https://{}/", domain);
        match self
            .client
            .get(&url)
            .timeout(TRACKER_PROBE_TIMEOUT)
            .send()
            .await
        {
            // Any HTTP answer at all means the domain was reachable; the
            // status code does not matter for a blocking check.
            Ok(_) => Ok(true),
            // A transport error (refused, reset, DNS failure, timeout) is
            // what a blocker produces.
            Err(_) => Ok(false),
        }
    }
}

fn classify_reqwest_error(error: reqwest::Error) -> LookupError {
    if error.is_timeout() {
        LookupError::Timeout
    } else {
        LookupError::Network(error.to_string())
    }
}

//! External data sources consumed by the probes, behind one trait so tests
//! substitute scripted fakes for the live HTTP implementation. Third-party
//! payloads are narrow records with every field optional; absence coalesces
//! to documented defaults at this boundary so nothing downstream ever
//! operates on an untyped blob.

use async_trait::async_trait;
use serde::Deserialize;

use crate::contract::GeoHint;

/// Best-effort JSON payload from a public IP-info service. Any of these
/// fields may be absent depending on the provider.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IpInfoPayload {
    pub ip: Option<String>,
    pub org: Option<String>,
    pub isp: Option<String>,
    pub country: Option<String>,
    pub country_name: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub asn: Option<String>,
    pub timezone: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub proxy: Option<bool>,
    pub hosting: Option<bool>,
}

impl IpInfoPayload {
    /// The address string, or `'Unknown'`.
    pub fn ip_label(&self) -> &str {
        self.ip.as_deref().unwrap_or("Unknown")
    }

    /// Organization label, falling back to the ISP name, then `'Unknown'`.
    pub fn org_label(&self) -> &str {
        self.org
            .as_deref()
            .or(self.isp.as_deref())
            .unwrap_or("Unknown")
    }

    /// Two-letter country code when present, else the country name.
    pub fn country_label(&self) -> Option<&str> {
        self.country.as_deref().or(self.country_name.as_deref())
    }

    pub fn geo_hint(&self) -> GeoHint {
        GeoHint {
            country: self
                .country_name
                .clone()
                .or_else(|| self.country.clone()),
            region: self.region.clone(),
            city: self.city.clone(),
            timezone: self.timezone.clone(),
            organization: Some(self.org_label().to_string()),
        }
    }
}

/// Parsed `key=value` newline-delimited edge trace (Cloudflare-style).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeTrace {
    pub ip: Option<String>,
    pub location: Option<String>,
    pub colo: Option<String>,
}

impl EdgeTrace {
    /// Extracts the known keys by prefix match; unknown lines are ignored.
    pub fn parse(body: &str) -> Self {
        let mut trace = Self::default();
        for line in body.lines() {
            if let Some(value) = line.strip_prefix("ip=") {
                trace.ip = Some(value.trim().to_string());
            } else if let Some(value) = line.strip_prefix("loc=") {
                trace.location = Some(value.trim().to_string());
            } else if let Some(value) = line.strip_prefix("colo=") {
                trace.colo = Some(value.trim().to_string());
            }
        }
        trace
    }
}

/// Failure modes of a third-party lookup. This is expected unreliability;
/// callers recover each variant into a typed probe result.
#[derive(Debug)]
pub enum LookupError {
    Timeout,
    Http(u16),
    Network(String),
    Malformed(String),
}

impl std::fmt::Display for LookupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupError::Timeout => write!(f, "lookup timed out"),
            LookupError::Http(status) => write!(f, "lookup returned HTTP {}", status),
            LookupError::Network(detail) => write!(f, "lookup network error: {}", detail),
            LookupError::Malformed(detail) => write!(f, "lookup payload malformed: {}", detail),
        }
    }
}

impl std::error::Error for LookupError {}

/// The network lookups the probes depend on. Every method resolves within
/// its implementation's documented bound and degrades to `LookupError`
/// instead of hanging or panicking.
#[async_trait]
pub trait NetworkSources: Send + Sync {
    /// IP address plus org/geo metadata from a public IP-info service.
    async fn ip_info(&self) -> Result<IpInfoPayload, LookupError>;

    /// The address reported by an IPv6-capable resolution service:
    /// `Some(addr)` when the caller has a routable IPv6 path, `None` when
    /// the service answered over IPv4 only.
    async fn ipv6_address(&self) -> Result<Option<String>, LookupError>;

    /// Edge trace naming the location the caller's DNS/HTTP egress hits.
    async fn edge_trace(&self) -> Result<EdgeTrace, LookupError>;

    /// Probes one DNS-over-HTTPS endpoint; `true` means HTTP 200 with a
    /// JSON content type.
    async fn doh_available(&self, endpoint: &str) -> Result<bool, LookupError>;

    /// Short-timeout reachability probe for a tracker domain. A transport
    /// error is reported by implementations as `Ok(false)`, meaning blocked;
    /// `Err` is reserved for probe infrastructure failures.
    async fn tracker_reachable(&self, domain: &str) -> Result<bool, LookupError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_trace_parses_known_keys_and_ignores_rest() {
        let body = "fl=123abc\nh=example.com\nip=203.0.113.7\nts=1700000000.1\nloc=NL\ncolo=AMS\n";
        let trace = EdgeTrace::parse(body);
        assert_eq!(trace.ip.as_deref(), Some("203.0.113.7"));
        assert_eq!(trace.location.as_deref(), Some("NL"));
        assert_eq!(trace.colo.as_deref(), Some("AMS"));
    }

    #[test]
    fn edge_trace_tolerates_empty_body() {
        assert_eq!(EdgeTrace::parse(""), EdgeTrace::default());
    }

    #[test]
    fn payload_coalesces_missing_fields() {
        let payload = IpInfoPayload::default();
        assert_eq!(payload.ip_label(), "Unknown");
        assert_eq!(payload.org_label(), "Unknown");
        assert!(payload.country_label().is_none());
    }

    #[test]
    fn org_label_falls_back_to_isp() {
        let payload = IpInfoPayload {
            isp: Some("Example Telecom".to_string()),
            ..Default::default()
        };
        assert_eq!(payload.org_label(), "Example Telecom");
    }
}

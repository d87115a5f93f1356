//! Heuristic VPN/proxy presence classifier. Confidence accumulates
//! additively from independent indicators and is clamped to [0, 100];
//! crossing 50 flips `detected`. Absence of either metadata source zeroes
//! that source's contributions; it never aborts detection.

use std::sync::Arc;
use std::time::Duration;

use crate::contract::VpnDetection;
use crate::heuristics::org_matches_vpn_keyword;
use crate::probe::bounded;
use crate::sources::NetworkSources;

const ORG_KEYWORD_POINTS: u32 = 40;
const HOSTING_FLAG_POINTS: u32 = 30;
const PROXY_FLAG_POINTS: u32 = 50;
const LOCATION_MISMATCH_POINTS: u32 = 20;
const DETECTION_THRESHOLD: u32 = 50;
const DETECT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct VpnDetector {
    sources: Arc<dyn NetworkSources>,
}

impl VpnDetector {
    pub fn new(sources: Arc<dyn NetworkSources>) -> Self {
        Self { sources }
    }

    pub async fn detect(&self) -> VpnDetection {
        let (ip_info, trace) = tokio::join!(
            bounded(DETECT_TIMEOUT, self.sources.ip_info(), Err(crate::sources::LookupError::Timeout)),
            bounded(DETECT_TIMEOUT, self.sources.edge_trace(), Err(crate::sources::LookupError::Timeout)),
        );

        let ip_info = ip_info.ok();
        let trace = trace.ok();

        if ip_info.is_none() && trace.is_none() {
            return VpnDetection {
                detected: false,
                confidence: 0,
                indicators: vec!["Detection failed".to_string()],
                location: None,
            };
        }

        let mut confidence: u32 = 0;
        let mut indicators = Vec::new();

        if let Some(info) = &ip_info {
            let org = info.org_label();
            if org != "Unknown" && org_matches_vpn_keyword(org) {
                confidence += ORG_KEYWORD_POINTS;
                indicators.push(format!("Organization name matches a VPN/hosting pattern: {org}"));
            }
            if info.hosting == Some(true) {
                confidence += HOSTING_FLAG_POINTS;
                indicators.push("IP address belongs to a hosting/datacenter range".to_string());
            }
            if info.proxy == Some(true) {
                confidence += PROXY_FLAG_POINTS;
                indicators.push("Lookup service flags this IP as a proxy".to_string());
            }
        }

        if let (Some(info), Some(trace)) = (&ip_info, &trace) {
            if let (Some(ip_country), Some(dns_location)) =
                (info.country.as_deref(), trace.location.as_deref())
            {
                if !ip_country.eq_ignore_ascii_case(dns_location) {
                    confidence += LOCATION_MISMATCH_POINTS;
                    indicators.push(format!(
                        "IP country {ip_country} differs from DNS egress location {dns_location}"
                    ));
                }
            }
        }

        let confidence = confidence.min(100);

        VpnDetection {
            detected: confidence > DETECTION_THRESHOLD,
            confidence,
            indicators,
            location: ip_info.map(|info| info.geo_hint()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{EdgeTrace, IpInfoPayload};
    use crate::test_fixtures::{ScriptedSources, SourceScript};

    fn detector(sources: ScriptedSources) -> VpnDetector {
        VpnDetector::new(Arc::new(sources))
    }

    fn vpn_like_payload() -> IpInfoPayload {
        IpInfoPayload {
            ip: Some("185.65.134.7".to_string()),
            org: Some("Mullvad VPN AB".to_string()),
            country: Some("NL".to_string()),
            hosting: Some(true),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn both_sources_failing_degrades_to_detection_failed() {
        let detection = detector(ScriptedSources {
            ip_info: SourceScript::Fails,
            trace: SourceScript::Fails,
            ..Default::default()
        })
        .detect()
        .await;

        assert!(!detection.detected);
        assert_eq!(detection.confidence, 0);
        assert_eq!(detection.indicators, vec!["Detection failed".to_string()]);
    }

    #[tokio::test]
    async fn indicators_accumulate_and_confidence_clamps() {
        let mut payload = vpn_like_payload();
        payload.proxy = Some(true);
        let detection = detector(ScriptedSources {
            ip_info: SourceScript::Returns(payload),
            trace: SourceScript::Returns(EdgeTrace {
                location: Some("SE".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        })
        .detect()
        .await;

        // 40 + 30 + 50 + 20 would be 140; clamp holds it at 100.
        assert_eq!(detection.confidence, 100);
        assert!(detection.detected);
        assert_eq!(detection.indicators.len(), 4);
    }

    #[tokio::test]
    async fn consumer_isp_yields_no_positive_evidence() {
        let detection = detector(ScriptedSources {
            ip_info: SourceScript::Returns(IpInfoPayload {
                ip: Some("198.51.100.4".to_string()),
                org: Some("Comcast Cable Communications".to_string()),
                country: Some("US".to_string()),
                ..Default::default()
            }),
            trace: SourceScript::Returns(EdgeTrace {
                location: Some("US".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        })
        .detect()
        .await;

        assert!(!detection.detected);
        assert_eq!(detection.confidence, 0);
        assert!(detection.indicators.is_empty());
    }

    #[tokio::test]
    async fn single_weak_indicator_stays_below_threshold() {
        // Hosting flag alone (+30) is evidence, but not detection.
        let detection = detector(ScriptedSources {
            ip_info: SourceScript::Returns(IpInfoPayload {
                hosting: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        })
        .detect()
        .await;

        assert_eq!(detection.confidence, 30);
        assert!(!detection.detected);
    }

    #[tokio::test]
    async fn location_carried_from_ip_metadata() {
        let detection = detector(ScriptedSources {
            ip_info: SourceScript::Returns(vpn_like_payload()),
            ..Default::default()
        })
        .detect()
        .await;

        let location = detection.location.expect("location hint");
        assert_eq!(location.organization.as_deref(), Some("Mullvad VPN AB"));
    }
}

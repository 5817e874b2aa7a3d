//! Thin client for the subscription pricing service.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde_json::Value;

use crate::config::ServiceConfig;
use crate::error::{Error, Result};
use crate::projector::NextTierInfo;
use crate::tiers::{tiers_from_value, PricingTier};

const TIERS_PATH: &str = "/subscription/pricing-tiers";
const NEXT_TIER_PATH: &str = "/subscription/next-tier";

pub struct PricingClient {
    client: reqwest::Client,
    base_url: String,
}

impl PricingClient {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if !config.api_key.is_empty() {
            let key = HeaderValue::from_str(&config.api_key).map_err(|_| Error::InvalidApiKey)?;
            headers.insert("X-API-Code", key);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(PricingClient {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn send_get_request(&self, path: &str) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "GET");
        let resp = self.client.get(&url).send().await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(Error::Status { status, body: text });
        }
        Ok(text)
    }

    /// All tiers on offer. A payload that is not a tier array yields no tiers.
    pub async fn fetch_tiers(&self) -> Result<Vec<PricingTier>> {
        let body = self.send_get_request(TIERS_PATH).await?;
        let value: Value = serde_json::from_str(&body)?;
        let tiers = tiers_from_value(&value);
        tracing::info!(count = tiers.len(), "fetched pricing tiers");
        Ok(tiers)
    }

    /// The signed-in user's counters and next applicable tiers.
    pub async fn fetch_next_tier(&self) -> Result<NextTierInfo> {
        let body = self.send_get_request(NEXT_TIER_PATH).await?;
        let info: NextTierInfo = serde_json::from_str(&body)?;
        tracing::info!(
            paid_purchases = info.paid_purchases,
            next = info.next_paid_purchase_count,
            candidates = info.next_tier.len(),
            "fetched next tier"
        );
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve a single canned response and return a config pointing at it.
    async fn serve_once(status_line: &str, body: &str) -> ServiceConfig {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request: Vec<u8> = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        ServiceConfig {
            base_url: format!("http://{}", addr),
            timeout_secs: 5,
            ..ServiceConfig::default()
        }
    }

    #[test]
    fn trailing_slash_trimmed_from_base_url() {
        let config = ServiceConfig {
            base_url: "https://pricing.example.vn/api/".to_string(),
            ..ServiceConfig::default()
        };
        let client = PricingClient::new(&config).unwrap();
        assert_eq!(client.base_url, "https://pricing.example.vn/api");
    }

    #[test]
    fn rejects_api_key_with_newline() {
        let config = ServiceConfig {
            api_key: "abc\ndef".to_string(),
            ..ServiceConfig::default()
        };
        assert!(matches!(PricingClient::new(&config), Err(Error::InvalidApiKey)));
    }

    #[tokio::test]
    async fn unreachable_service_is_http_error() {
        let config = ServiceConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_secs: 2,
            ..ServiceConfig::default()
        };
        let client = PricingClient::new(&config).unwrap();
        assert!(matches!(client.fetch_tiers().await, Err(Error::Http(_))));
    }

    #[tokio::test]
    async fn non_success_status_carries_body() {
        let config = serve_once("500 Internal Server Error", "database down").await;
        let client = PricingClient::new(&config).unwrap();

        match client.fetch_tiers().await {
            Err(Error::Status { status, body }) => {
                assert_eq!(status, reqwest::StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(body, "database down");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn non_array_tier_payload_is_empty() {
        let config = serve_once("200 OK", r#"{"data": []}"#).await;
        let client = PricingClient::new(&config).unwrap();

        let tiers = client.fetch_tiers().await.unwrap();
        assert!(tiers.is_empty());
    }

    #[tokio::test]
    async fn tier_array_is_parsed() {
        let body = r#"[{"id": "a", "tier_name": "Lần mua thứ 2", "duration_days": 90, "price_vnd": 249000}]"#;
        let config = serve_once("200 OK", body).await;
        let client = PricingClient::new(&config).unwrap();

        let tiers = client.fetch_tiers().await.unwrap();
        assert_eq!(tiers.len(), 1);
        assert_eq!(tiers[0].purchase_ordinal(), 2);
        assert_eq!(tiers[0].duration_months(), 3);
    }

    #[tokio::test]
    async fn next_tier_counters_are_parsed() {
        let body = r#"{
            "total_purchases": 4,
            "paid_purchases": 3,
            "next_paid_purchase_count": 4,
            "has_free_subscription": true,
            "next_tier": [{"id": "x", "tier_name": "Lần mua thứ 4", "duration_days": 30, "price_vnd": 199000}]
        }"#;
        let config = serve_once("200 OK", body).await;
        let client = PricingClient::new(&config).unwrap();

        let info = client.fetch_next_tier().await.unwrap();
        assert_eq!(info.total_purchases, 4);
        assert_eq!(info.paid_purchases, 3);
        assert_eq!(info.next_paid_purchase_count, 4);
        assert!(info.has_free_subscription);
        assert_eq!(info.next_tier.len(), 1);
        assert_eq!(info.next_tier[0].id, "x");
    }

    #[tokio::test]
    async fn malformed_next_tier_is_json_error() {
        let config = serve_once("200 OK", "[]").await;
        let client = PricingClient::new(&config).unwrap();

        assert!(matches!(client.fetch_next_tier().await, Err(Error::Json(_))));
    }
}

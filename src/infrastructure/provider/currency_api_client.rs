//! HTTP client for the external currency rates API.

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde::de::IgnoredAny;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

use crate::domain::entities::ProviderSnapshot;
use crate::domain::provider::{ProviderError, RatesProvider};

/// Header carrying the provider API key.
const API_KEY_HEADER: &str = "apikey";

const MAX_IDLE_PER_HOST: usize = 10;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;

#[derive(Debug, Deserialize)]
struct CurrencyApiResponse {
    meta: CurrencyApiMeta,
    data: BTreeMap<String, CurrencyApiRate>,
}

#[derive(Debug, Deserialize)]
struct CurrencyApiMeta {
    last_updated_at: DateTime<Utc>,
}

/// One entry of `data`. `code` must be present but the map key is
/// authoritative.
#[derive(Debug, Deserialize)]
struct CurrencyApiRate {
    #[serde(rename = "code")]
    _code: IgnoredAny,
    value: f64,
}

/// Currency rates API client.
///
/// Holds one pooled `reqwest::Client` for the life of the process. Every
/// request is bounded by the configured timeout. Endpoint and key are
/// optional at construction; a missing value fails each fetch instead of
/// failing startup.
#[derive(Clone)]
pub struct CurrencyApiClient {
    client: Client,
    endpoint: Option<String>,
    api_key: Option<String>,
}

impl CurrencyApiClient {
    /// Creates a client with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Request`] if the HTTP client cannot be built.
    pub fn new(
        timeout: Duration,
        endpoint: Option<String>,
        api_key: Option<String>,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(MAX_IDLE_PER_HOST)
            .pool_idle_timeout(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS))
            .build()
            .map_err(|e| ProviderError::Request(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.filter(|s| !s.is_empty()),
            api_key: api_key.filter(|s| !s.is_empty()),
        })
    }
}

/// Keys the rates by upper-cased code, matching how queries normalize codes.
///
/// Blank codes are dropped. When two keys differ only in case, the one
/// already upper-case wins.
fn normalize_rates(data: BTreeMap<String, CurrencyApiRate>) -> BTreeMap<String, f64> {
    let mut rates = BTreeMap::new();
    for (code, rate) in data {
        let code = code.trim().to_uppercase();
        if code.is_empty() {
            debug!("Dropping provider rate with a blank code");
            continue;
        }
        rates.entry(code).or_insert(rate.value);
    }
    rates
}

fn map_transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(e.to_string())
    } else {
        ProviderError::Request(e.to_string())
    }
}

#[async_trait]
impl RatesProvider for CurrencyApiClient {
    async fn fetch_latest(&self) -> Result<ProviderSnapshot, ProviderError> {
        let (Some(endpoint), Some(api_key)) = (&self.endpoint, &self.api_key) else {
            return Err(ProviderError::NotConfigured);
        };

        let response = self
            .client
            .get(endpoint)
            .header(API_KEY_HEADER, api_key)
            .send()
            .await
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }

        let body = response.bytes().await.map_err(map_transport_error)?;
        let fetched_at = Utc::now().trunc_subsecs(6);

        let decoded: CurrencyApiResponse =
            serde_json::from_slice(&body).map_err(|e| ProviderError::Decode(e.to_string()))?;

        let rates = normalize_rates(decoded.data);

        debug!(
            "Fetched {} rates (provider updated at {})",
            rates.len(),
            decoded.meta.last_updated_at
        );

        Ok(ProviderSnapshot::new(
            fetched_at,
            decoded.meta.last_updated_at,
            rates,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_expected_shape() {
        let body = r#"{
            "meta": { "last_updated_at": "2024-02-19T23:59:59Z" },
            "data": {
                "USD": { "code": "USD", "value": 1 },
                "MXN": { "code": "MXN", "value": 17.05 }
            }
        }"#;

        let decoded: CurrencyApiResponse = serde_json::from_str(body).unwrap();
        assert_eq!(decoded.data.len(), 2);
        assert_eq!(decoded.data["MXN"].value, 17.05);
    }

    #[test]
    fn test_decode_rejects_other_shapes() {
        assert!(serde_json::from_str::<CurrencyApiResponse>(r#"{"data": {}}"#).is_err());
        assert!(
            serde_json::from_str::<CurrencyApiResponse>(
                r#"{"meta": {"last_updated_at": "2024-02-19T23:59:59Z"}, "data": {"USD": {"code": "USD"}}}"#
            )
            .is_err()
        );
        assert!(serde_json::from_str::<CurrencyApiResponse>("[]").is_err());
    }

    #[test]
    fn test_decode_requires_code_field() {
        let body = r#"{
            "meta": { "last_updated_at": "2024-02-19T23:59:59Z" },
            "data": { "USD": { "value": 1 } }
        }"#;
        assert!(serde_json::from_str::<CurrencyApiResponse>(body).is_err());
    }

    #[test]
    fn test_codes_are_upper_cased() {
        let body = r#"{
            "meta": { "last_updated_at": "2024-02-19T23:59:59Z" },
            "data": {
                "usd": { "code": "usd", "value": 1.5 },
                " mxn ": { "code": "MXN", "value": 17.05 },
                "EUR": { "code": "EUR", "value": 0.92 },
                "eur": { "code": "eur", "value": 9.99 },
                " ": { "code": "", "value": 3.0 }
            }
        }"#;

        let decoded: CurrencyApiResponse = serde_json::from_str(body).unwrap();
        let rates = normalize_rates(decoded.data);

        assert_eq!(
            rates,
            BTreeMap::from([
                ("EUR".to_string(), 0.92),
                ("MXN".to_string(), 17.05),
                ("USD".to_string(), 1.5),
            ])
        );
    }

    #[tokio::test]
    async fn test_missing_configuration_fails_fetch() {
        let client = CurrencyApiClient::new(Duration::from_secs(1), None, Some("key".into()))
            .unwrap();
        assert!(matches!(
            client.fetch_latest().await,
            Err(ProviderError::NotConfigured)
        ));

        let client = CurrencyApiClient::new(
            Duration::from_secs(1),
            Some("http://localhost".into()),
            Some(String::new()),
        )
        .unwrap();
        assert!(matches!(
            client.fetch_latest().await,
            Err(ProviderError::NotConfigured)
        ));
    }
}

//! HTTP item bank client.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

use practica_core::error::{ErrorCode, PracticaError, PracticaResult};
use practica_core::traits::{ItemBank, ItemBankConfig};
use practica_core::types::{GradeOutcome, GradeRequest, Item};

/// Item bank served over HTTP.
///
/// - `GET {base}/practice/next?teks=<skill>` returns an item
/// - `POST {base}/attempts` grades a response
///
/// Each call is a single request with the configured timeout; failures are
/// returned to the caller without retrying.
pub struct RemoteItemBank {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl RemoteItemBank {
    /// Create a client from item bank configuration.
    pub fn new(config: &ItemBankConfig) -> PracticaResult<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| {
            PracticaError::Configuration(format!("Invalid item bank URL '{}': {}", base_url, e))
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PracticaError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    /// Create a client pointing at `base_url` with default settings.
    pub fn with_base_url(base_url: impl Into<String>) -> PracticaResult<Self> {
        Self::new(&ItemBankConfig {
            base_url: base_url.into(),
            ..Default::default()
        })
    }

    /// Create a client from `PRACTICA_ITEM_BANK_*` environment variables.
    pub fn from_env() -> PracticaResult<Self> {
        Self::new(&practica_core::PracticaConfig::from_env().item_bank)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn headers(&self) -> PracticaResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(ref key) = self.api_key {
            let value = HeaderValue::from_str(&format!("Token {}", key)).map_err(|_| {
                PracticaError::Authentication {
                    message: "API key contains invalid header characters".to_string(),
                    code: ErrorCode::AuthInvalidKey,
                }
            })?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    fn next_item_url(&self, target: Option<&str>) -> PracticaResult<Url> {
        let mut url = Url::parse(&format!("{}/practice/next", self.base_url))
            .map_err(|e| PracticaError::Configuration(e.to_string()))?;
        if let Some(skill) = target {
            url.query_pairs_mut().append_pair("teks", skill);
        }
        Ok(url)
    }

    async fn read_json<T: DeserializeOwned>(
        response: reqwest::Response,
        what: &str,
    ) -> PracticaResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(what, e))?;

        if !status.is_success() {
            return Err(PracticaError::from_http_status(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| PracticaError::ItemBank {
            message: format!("Failed to parse {} response: {}", what, e),
            code: ErrorCode::BankInvalidResponse,
            source: Some(Box::new(e)),
        })
    }
}

fn transport_error(what: &str, e: reqwest::Error) -> PracticaError {
    let code = if e.is_timeout() {
        ErrorCode::NetTimeout
    } else {
        ErrorCode::NetConnectionFailed
    };
    PracticaError::Network {
        message: format!("Failed to {}: {}", what, e),
        code,
        source: Some(Box::new(e)),
    }
}

#[async_trait]
impl ItemBank for RemoteItemBank {
    async fn next_item(&self, target: Option<&str>) -> PracticaResult<Item> {
        let url = self.next_item_url(target)?;
        debug!(%url, "Requesting next item");

        let response = self
            .client
            .get(url)
            .headers(self.headers()?)
            .send()
            .await
            .map_err(|e| transport_error("fetch item", e))?;

        Self::read_json(response, "fetch item").await
    }

    async fn grade(&self, request: &GradeRequest) -> PracticaResult<GradeOutcome> {
        debug!(item_id = %request.item_id, "Submitting attempt");

        let response = self
            .client
            .post(format!("{}/attempts", self.base_url))
            .headers(self.headers()?)
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error("grade attempt", e))?;

        Self::read_json(response, "grade attempt").await
    }

    fn name(&self) -> &str {
        "remote"
    }
}

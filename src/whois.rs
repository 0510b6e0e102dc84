//! Upstream WHOIS gateway client.
//!
//! The service never speaks port 43 itself; it asks an HTTP-to-WHOIS gateway
//! (WhoisXML API by default) for a JSON document and classifies failures.

use crate::{config::Config, errors::LookupError};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Source of raw WHOIS documents.
#[async_trait]
pub trait WhoisProvider: Send + Sync {
    /// Fetch the raw document for an already normalized domain.
    async fn fetch(&self, domain: &str) -> Result<Value, LookupError>;
}

pub struct WhoisXmlApiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl WhoisXmlApiClient {
    pub fn new(config: &Config) -> Result<Self, LookupError> {
        // Bounded timeout so a slow provider cannot pin request handlers
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.whois_timeout_seconds))
            .user_agent(concat!("whois-lookup-service/", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .build()
            .map_err(|e| LookupError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        if config.whois_api_key.is_none() {
            info!("WHOIS_API_KEY not set, lookups will be rejected until it is configured");
        }

        Ok(Self {
            client,
            base_url: config.whois_api_url.clone(),
            api_key: config.whois_api_key.clone(),
        })
    }
}

#[async_trait]
impl WhoisProvider for WhoisXmlApiClient {
    async fn fetch(&self, domain: &str) -> Result<Value, LookupError> {
        let api_key = self.api_key.as_deref().ok_or(LookupError::Configuration)?;

        debug!("Querying WHOIS gateway for {}", domain);
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("apiKey", api_key),
                ("domainName", domain),
                ("outputFormat", "JSON"),
            ])
            .send()
            .await?;

        classify_status(response.status())?;

        let body = response.json::<Value>().await.map_err(|e| {
            LookupError::UpstreamUnavailable(format!("invalid response body: {}", e))
        })?;

        Ok(body)
    }
}

/// Map an upstream HTTP status onto the lookup error taxonomy.
pub fn classify_status(status: StatusCode) -> Result<(), LookupError> {
    match status {
        StatusCode::UNAUTHORIZED => Err(LookupError::UpstreamAuth),
        StatusCode::TOO_MANY_REQUESTS => Err(LookupError::UpstreamRateLimited),
        s if s.is_success() => Ok(()),
        s => Err(LookupError::UpstreamUnavailable(format!("upstream returned HTTP {}", s))),
    }
}

//! # WHOIS Lookup Library
//!
//! Backend pieces for a WHOIS lookup service that delegates to an HTTP WHOIS
//! gateway and reduces its deeply nested JSON into two flat summaries.
//!
//! ## Features
//!
//! - Tolerant field resolution across registry-level and document-level keys
//! - Multi-format timestamp normalization with domain age estimation
//! - Registrant, technical and administrative contact resolution
//! - Optional, best-effort lookup history
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use whois_lookup::{
//!     store::NullLookupStore, Config, LookupService, LookupType, WhoisXmlApiClient,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load()?;
//!     let provider = Arc::new(WhoisXmlApiClient::new(&config)?);
//!     let service = LookupService::new(provider, Arc::new(NullLookupStore::new()));
//!
//!     let summary = service.lookup("example.com", LookupType::Domain).await?;
//!     println!("{}", serde_json::to_string_pretty(&summary)?);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dates;
pub mod errors;
pub mod parser;
pub mod resolver;
pub mod service;
pub mod store;
pub mod whois;

#[cfg(feature = "server")]
pub mod api;
#[cfg(feature = "server")]
pub mod metrics;

// Re-export main types for easy access
pub use config::Config;
pub use errors::LookupError;
pub use service::LookupService;
pub use store::{LookupRecord, LookupStore};
pub use whois::{WhoisProvider, WhoisXmlApiClient};

use serde::{Deserialize, Serialize};

/// Domain registration summary. Every field carries a value or a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainInfo {
    pub domain_name: String,
    pub registrar: String,
    pub registration_date: String,
    pub expiration_date: String,
    pub estimated_domain_age: String,
    pub hostnames: String,
}

/// Contact summary. Missing values are `"N/A"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    pub registrant_name: String,
    pub technical_contact_name: String,
    pub administrative_contact_name: String,
    pub contact_email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LookupSummary {
    Domain(DomainInfo),
    Contact(ContactInfo),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupType {
    #[default]
    Domain,
    Contact,
}

impl LookupType {
    /// Anything other than `contact` selects the domain summary.
    pub fn from_param(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("contact") {
            LookupType::Contact
        } else {
            LookupType::Domain
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LookupType::Domain => "domain",
            LookupType::Contact => "contact",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_type_from_param() {
        assert_eq!(LookupType::from_param("contact"), LookupType::Contact);
        assert_eq!(LookupType::from_param("  CONTACT "), LookupType::Contact);
        assert_eq!(LookupType::from_param("domain"), LookupType::Domain);
        assert_eq!(LookupType::from_param("whatever"), LookupType::Domain);
        assert_eq!(LookupType::from_param(""), LookupType::Domain);
    }

    #[test]
    fn test_summaries_use_camel_case() {
        let info = DomainInfo {
            domain_name: "example.com".to_string(),
            registrar: "N/A".to_string(),
            registration_date: "N/A".to_string(),
            expiration_date: "N/A".to_string(),
            estimated_domain_age: "Unknown".to_string(),
            hostnames: String::new(),
        };
        let json = serde_json::to_value(LookupSummary::Domain(info)).unwrap();
        assert_eq!(json["domainName"], "example.com");
        assert_eq!(json["estimatedDomainAge"], "Unknown");
        assert!(json.get("Domain").is_none());
    }
}

use crate::{
    config::Config,
    errors::LookupError,
    parser::{extract_contact_info, extract_domain_info},
    store::{LookupRecord, LookupStore},
    whois::WhoisProvider,
    LookupSummary, LookupType,
};
use serde_json::Value;
use std::{sync::Arc, time::Duration};
use tracing::{debug, warn};

pub const DEFAULT_HISTORY_LIMIT: i64 = 20;
pub const MAX_HISTORY_LIMIT: i64 = 100;

const DEFAULT_PERSIST_TIMEOUT_SECS: u64 = 5;

/// Ties the upstream provider, the extractors and the history store together.
pub struct LookupService {
    provider: Arc<dyn WhoisProvider>,
    store: Arc<dyn LookupStore>,
    persist_timeout: Duration,
}

impl LookupService {
    pub fn new(provider: Arc<dyn WhoisProvider>, store: Arc<dyn LookupStore>) -> Self {
        Self {
            provider,
            store,
            persist_timeout: Duration::from_secs(DEFAULT_PERSIST_TIMEOUT_SECS),
        }
    }

    pub fn with_config(
        provider: Arc<dyn WhoisProvider>,
        store: Arc<dyn LookupStore>,
        config: &Config,
    ) -> Self {
        Self {
            persist_timeout: Duration::from_secs(config.persist_timeout_seconds),
            ..Self::new(provider, store)
        }
    }

    pub fn history_enabled(&self) -> bool {
        self.store.is_connected()
    }

    /// Look up `domain` upstream and reduce the answer to the requested summary.
    pub async fn lookup(
        &self,
        domain: &str,
        lookup_type: LookupType,
    ) -> Result<LookupSummary, LookupError> {
        let domain = domain.trim().to_lowercase();
        if domain.is_empty() {
            return Err(LookupError::InvalidDomain("Empty domain".to_string()));
        }

        let document = self.provider.fetch(&domain).await?;
        if !has_whois_record(&document) {
            debug!("No WhoisRecord in response for {}", domain);
            return Err(LookupError::NotFound);
        }

        let summary = match lookup_type {
            LookupType::Contact => LookupSummary::Contact(extract_contact_info(&document)),
            LookupType::Domain => LookupSummary::Domain(extract_domain_info(&document)),
        };

        self.persist(LookupRecord::new(domain, lookup_type, summary.clone())).await;

        Ok(summary)
    }

    /// Most recent lookups, newest first. Never fails.
    pub async fn history(&self, limit: Option<i64>) -> Vec<LookupRecord> {
        if !self.store.is_connected() {
            return Vec::new();
        }

        match self.store.recent(clamp_history_limit(limit)).await {
            Ok(items) => items,
            Err(e) => {
                warn!("Failed to read history: {}", e);
                Vec::new()
            }
        }
    }

    async fn persist(&self, record: LookupRecord) {
        if !self.store.is_connected() {
            return;
        }

        match tokio::time::timeout(self.persist_timeout, self.store.insert(&record)).await {
            Ok(Ok(())) => debug!(
                "Persisted {} lookup for {}",
                record.lookup_type.as_str(),
                record.domain
            ),
            Ok(Err(e)) => warn!("Failed to persist lookup for {}: {}", record.domain, e),
            Err(_) => warn!("Persist timeout for {}", record.domain),
        }
    }
}

fn has_whois_record(document: &Value) -> bool {
    match document.get("WhoisRecord") {
        None | Some(Value::Null) => false,
        Some(Value::Object(record)) => !record.is_empty(),
        Some(_) => true,
    }
}

pub fn clamp_history_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_HISTORY_LIMIT).clamp(1, MAX_HISTORY_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{NullLookupStore, SqliteLookupStore, StoreError};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticProvider {
        response: Result<Value, fn() -> LookupError>,
        calls: AtomicUsize,
    }

    impl StaticProvider {
        fn ok(document: Value) -> Self {
            Self { response: Ok(document), calls: AtomicUsize::new(0) }
        }

        fn err(make: fn() -> LookupError) -> Self {
            Self { response: Err(make), calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl WhoisProvider for StaticProvider {
        async fn fetch(&self, domain: &str) -> Result<Value, LookupError> {
            assert_eq!(domain, domain.trim().to_lowercase());
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.response {
                Ok(doc) => Ok(doc.clone()),
                Err(make) => Err(make()),
            }
        }
    }

    struct FailingStore;

    #[async_trait]
    impl LookupStore for FailingStore {
        fn is_connected(&self) -> bool {
            true
        }

        async fn insert(&self, _record: &LookupRecord) -> Result<(), StoreError> {
            Err(StoreError::Timeout)
        }

        async fn recent(&self, _limit: i64) -> Result<Vec<LookupRecord>, StoreError> {
            Err(StoreError::Timeout)
        }
    }

    fn example_document() -> Value {
        json!({
            "WhoisRecord": {
                "domainName": "example.com",
                "contactEmail": "hostmaster@example.com",
                "registryData": {
                    "registrarName": "Example Registrar",
                    "createdDate": "1995-08-14T04:00:00Z",
                    "nameServers": {"hostNames": ["ns1.example.com", "ns2.example.com"]}
                }
            }
        })
    }

    async fn sqlite_store() -> Arc<dyn LookupStore> {
        Arc::new(
            SqliteLookupStore::connect("sqlite::memory:", Duration::from_secs(1))
                .await
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_lookup_dispatches_on_type_and_records_history() {
        let store = sqlite_store().await;
        let service = LookupService::new(Arc::new(StaticProvider::ok(example_document())), store);

        let domain = service.lookup("  Example.COM ", LookupType::Domain).await.unwrap();
        match domain {
            LookupSummary::Domain(info) => assert_eq!(info.registrar, "Example Registrar"),
            other => panic!("unexpected summary {:?}", other),
        }

        let contact = service.lookup("example.com", LookupType::Contact).await.unwrap();
        match contact {
            LookupSummary::Contact(info) => {
                assert_eq!(info.contact_email, "hostmaster@example.com")
            }
            other => panic!("unexpected summary {:?}", other),
        }

        let history = service.history(None).await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].lookup_type, LookupType::Contact);
        assert!(history.iter().all(|r| r.domain == "example.com"));
    }

    #[tokio::test]
    async fn test_missing_whois_record_is_not_found() {
        let documents = [
            json!({}),
            json!({"WhoisRecord": null}),
            json!({"WhoisRecord": {}}),
            json!([]),
        ];
        for document in documents {
            let service = LookupService::new(
                Arc::new(StaticProvider::ok(document)),
                Arc::new(NullLookupStore::new()),
            );
            let result = service.lookup("example.com", LookupType::Domain).await;
            assert!(matches!(result, Err(LookupError::NotFound)));
        }
    }

    #[tokio::test]
    async fn test_not_found_is_not_persisted() {
        let store = sqlite_store().await;
        let service = LookupService::new(Arc::new(StaticProvider::ok(json!({}))), store);

        let _ = service.lookup("example.com", LookupType::Domain).await;
        assert!(service.history(Some(100)).await.is_empty());
    }

    #[tokio::test]
    async fn test_upstream_errors_propagate() {
        let service = LookupService::new(
            Arc::new(StaticProvider::err(|| LookupError::UpstreamRateLimited)),
            Arc::new(NullLookupStore::new()),
        );
        let result = service.lookup("example.com", LookupType::Domain).await;
        assert!(matches!(result, Err(LookupError::UpstreamRateLimited)));
    }

    #[tokio::test]
    async fn test_empty_domain_skips_upstream() {
        let provider = Arc::new(StaticProvider::ok(example_document()));
        let service = LookupService::new(provider.clone(), Arc::new(NullLookupStore::new()));

        let result = service.lookup("   ", LookupType::Domain).await;
        assert!(matches!(result, Err(LookupError::InvalidDomain(_))));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_persistence_failure_is_swallowed() {
        let service = LookupService::new(
            Arc::new(StaticProvider::ok(example_document())),
            Arc::new(FailingStore),
        );

        let result = service.lookup("example.com", LookupType::Domain).await;
        assert!(result.is_ok());
        assert!(service.history(Some(5)).await.is_empty());
    }

    #[tokio::test]
    async fn test_disconnected_store_yields_empty_history() {
        let service = LookupService::new(
            Arc::new(StaticProvider::ok(example_document())),
            Arc::new(NullLookupStore::new()),
        );
        assert!(!service.history_enabled());
        service.lookup("example.com", LookupType::Domain).await.unwrap();
        assert!(service.history(None).await.is_empty());
    }

    #[test]
    fn test_clamp_history_limit() {
        assert_eq!(clamp_history_limit(None), 20);
        assert_eq!(clamp_history_limit(Some(0)), 1);
        assert_eq!(clamp_history_limit(Some(-7)), 1);
        assert_eq!(clamp_history_limit(Some(50)), 50);
        assert_eq!(clamp_history_limit(Some(1000)), 100);
    }
}

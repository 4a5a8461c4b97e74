//! The three caching strategies.
//!
//! Each strategy opens its target namespace, then resolves a request
//! against the store and the network. Network failures never propagate:
//! cache-first and network-first degrade to a synthetic 503, while
//! stale-while-revalidate suppresses the failure entirely when it has
//! nothing cached (the asymmetry is deliberate and load-bearing for the
//! offline UX). Store errors do propagate.

use std::sync::Arc;

use reqwest::Url;
use tokio::task::JoinHandle;

use salah_core::cache::compute_entry_key;
use salah_core::{CacheDb, Error, StoredResponse};

use crate::fetch::Fetcher;

/// The synthetic offline reply: HTTP 503 with a JSON error body.
pub fn offline_response() -> StoredResponse {
    StoredResponse::new(
        503,
        Some("application/json".to_string()),
        br#"{"error":"offline"}"#.to_vec(),
    )
}

/// Serve from cache; fall back to network and store a successful result.
pub async fn cache_first(
    store: &CacheDb,
    namespace: &str,
    fetcher: &dyn Fetcher,
    url: &Url,
) -> Result<StoredResponse, Error> {
    store.open_namespace(namespace).await?;
    let key = compute_entry_key("GET", url.as_str());

    if let Some(hit) = store.lookup(namespace, &key).await? {
        return Ok(hit);
    }

    match fetcher.get(url).await {
        Ok(response) => {
            let stored = response.to_stored();
            if stored.is_success() {
                store.put(namespace, &key, url.as_str(), &stored).await?;
            }
            Ok(stored)
        }
        Err(err) => {
            tracing::debug!(error = %err, %url, "cache-first miss with network down");
            Ok(offline_response())
        }
    }
}

/// Try the network first; fall back to cache, then to the 503 sentinel.
pub async fn network_first(
    store: &CacheDb,
    namespace: &str,
    fetcher: &dyn Fetcher,
    url: &Url,
) -> Result<StoredResponse, Error> {
    store.open_namespace(namespace).await?;
    let key = compute_entry_key("GET", url.as_str());

    match fetcher.get(url).await {
        Ok(response) => {
            let stored = response.to_stored();
            if stored.is_success() {
                store.put(namespace, &key, url.as_str(), &stored).await?;
            }
            Ok(stored)
        }
        Err(err) => {
            tracing::debug!(error = %err, %url, "network-first falling back to cache");
            match store.lookup(namespace, &key).await? {
                Some(hit) => Ok(hit),
                None => Ok(offline_response()),
            }
        }
    }
}

/// Result of a stale-while-revalidate pass.
pub struct SwrOutcome {
    /// The value handed to the requester; None means the failure was
    /// suppressed (no cache entry and no network).
    pub response: Option<StoredResponse>,
    /// The detached background refresh, present only on a cache hit.
    /// The gateway drops it; tests can await it to observe the refresh.
    pub revalidation: Option<JoinHandle<()>>,
}

/// Serve a cached value immediately and refresh it in the background.
///
/// Two concurrent requests for the same key may both trigger a refresh;
/// the per-key write is idempotent so the duplication is accepted.
pub async fn stale_while_revalidate(
    store: &CacheDb,
    namespace: &str,
    fetcher: &Arc<dyn Fetcher>,
    url: &Url,
) -> Result<SwrOutcome, Error> {
    store.open_namespace(namespace).await?;
    let key = compute_entry_key("GET", url.as_str());

    if let Some(hit) = store.lookup(namespace, &key).await? {
        let store = store.clone();
        let fetcher = Arc::clone(fetcher);
        let namespace = namespace.to_string();
        let url = url.clone();
        let revalidation = tokio::spawn(async move {
            match fetcher.get(&url).await {
                Ok(response) => {
                    let stored = response.to_stored();
                    if stored.is_success() {
                        if let Err(err) = store.put(&namespace, &key, url.as_str(), &stored).await {
                            tracing::debug!(error = %err, %url, "revalidation store failed");
                        }
                    }
                }
                Err(err) => {
                    tracing::debug!(error = %err, %url, "revalidation fetch failed");
                }
            }
        });
        return Ok(SwrOutcome { response: Some(hit), revalidation: Some(revalidation) });
    }

    match fetcher.get(url).await {
        Ok(response) => {
            let stored = response.to_stored();
            if stored.is_success() {
                store.put(namespace, &key, url.as_str(), &stored).await?;
            }
            Ok(SwrOutcome { response: Some(stored), revalidation: None })
        }
        Err(err) => {
            tracing::debug!(error = %err, %url, "stale-while-revalidate with nothing cached, suppressing");
            Ok(SwrOutcome { response: None, revalidation: None })
        }
    }
}

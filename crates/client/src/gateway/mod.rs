//! Offline-first caching gateway.
//!
//! The gateway sits beneath the application and intercepts every
//! network-capable GET request: it classifies the URL into one of three
//! traffic classes, applies the matching caching strategy against a
//! named namespace in the store, and degrades gracefully offline. The
//! store and the network transport are injected, and the namespace
//! names, host lists, and shell manifest are plain configuration.

pub mod lifecycle;
pub mod router;
pub mod strategy;

use std::sync::Arc;
use std::sync::atomic::AtomicU8;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{StatusCode, Url};

use salah_core::{AppConfig, CacheDb, Error, StoredResponse};

use crate::fetch::{FetchResponse, Fetcher};

pub use lifecycle::{LifecycleState, UpdateSignal};
pub use router::{Route, TrafficClass};
pub use strategy::SwrOutcome;

/// Routing and lifecycle configuration for the gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Versioned shell namespace; a new version supersedes old ones on
    /// activation.
    pub shell_namespace: String,
    /// Stable namespace for hadith/Quran corpus JSON.
    pub data_namespace: String,
    /// Stable namespace shared by CDN assets and external-API responses.
    pub cdn_namespace: String,
    /// Hostname of the remote timing authority.
    pub authority_host: String,
    /// CDN and font hosts served stale-while-revalidate.
    pub cdn_hosts: Vec<String>,
    /// Path segments marking local religious-text data.
    pub data_markers: Vec<String>,
    /// URL schemes that are never intercepted.
    pub bypass_schemes: Vec<String>,
    /// Origin the shell manifest paths resolve against.
    pub app_origin: String,
    /// Shell resource paths pre-cached on install.
    pub shell_manifest: Vec<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            shell_namespace: "ramadan-hub-v1".to_string(),
            data_namespace: "ramadan-data-v1".to_string(),
            cdn_namespace: "ramadan-cdn-v1".to_string(),
            authority_host: "api.aladhan.com".to_string(),
            cdn_hosts: vec![
                "cdn.jsdelivr.net".to_string(),
                "fonts.googleapis.com".to_string(),
                "fonts.gstatic.com".to_string(),
            ],
            data_markers: vec!["/hadithbangla/".to_string(), "/quran/".to_string()],
            bypass_schemes: vec!["chrome-extension".to_string()],
            app_origin: "http://localhost:5173".to_string(),
            shell_manifest: vec![
                "/".to_string(),
                "/index.html".to_string(),
                "/manifest.json".to_string(),
                "/icons/icon.svg".to_string(),
                "/icons/icon-maskable.svg".to_string(),
                "/quran/quran.json".to_string(),
            ],
        }
    }
}

impl GatewayConfig {
    /// Derive gateway routing from the application configuration.
    pub fn from_app(config: &AppConfig) -> Result<Self, Error> {
        let authority = Url::parse(&config.authority_base_url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let authority_host = authority
            .host_str()
            .ok_or_else(|| Error::InvalidUrl("authority URL has no host".to_string()))?
            .to_string();

        Ok(Self {
            shell_namespace: config.shell_version.clone(),
            app_origin: config.app_origin.clone(),
            authority_host,
            ..Self::default()
        })
    }

    /// The namespaces that survive an activation sweep.
    pub fn keep_set(&self) -> [&str; 3] {
        [&self.shell_namespace, &self.data_namespace, &self.cdn_namespace]
    }
}

/// What the gateway hands back for one intercepted request.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Not intercepted (non-GET or excluded scheme); caller goes to the
    /// network itself.
    Bypass,
    Response(StoredResponse),
    /// Stale-while-revalidate with nothing cached and no network; the
    /// failure is swallowed rather than synthesized into a 503.
    Suppressed,
}

/// The request-interception gateway.
pub struct Gateway {
    store: CacheDb,
    fetcher: Arc<dyn Fetcher>,
    config: GatewayConfig,
    state: AtomicU8,
}

impl Gateway {
    pub fn new(store: CacheDb, fetcher: Arc<dyn Fetcher>, config: GatewayConfig) -> Self {
        Self {
            store,
            fetcher,
            config,
            state: AtomicU8::new(LifecycleState::New as u8),
        }
    }

    pub fn store(&self) -> &CacheDb {
        &self.store
    }

    /// Resolve one intercepted request.
    ///
    /// Classification is first-match-wins; each class maps to a fixed
    /// (strategy, namespace) pair. Network failures surface as degraded
    /// responses, never as errors; only store failures propagate.
    pub async fn handle(&self, method: &str, url: &Url) -> Result<FetchOutcome, Error> {
        let class = match router::classify(&self.config, method, url) {
            Route::Bypass => return Ok(FetchOutcome::Bypass),
            Route::Intercept(class) => class,
        };

        tracing::debug!(%url, class = ?class, strategy = class.strategy(), "intercepted");

        match class {
            TrafficClass::ExternalApi => {
                let response =
                    strategy::network_first(&self.store, &self.config.cdn_namespace, self.fetcher.as_ref(), url)
                        .await?;
                Ok(FetchOutcome::Response(response))
            }
            TrafficClass::Cdn => {
                let outcome =
                    strategy::stale_while_revalidate(&self.store, &self.config.cdn_namespace, &self.fetcher, url)
                        .await?;
                // the refresh task runs detached
                drop(outcome.revalidation);
                Ok(match outcome.response {
                    Some(response) => FetchOutcome::Response(response),
                    None => FetchOutcome::Suppressed,
                })
            }
            TrafficClass::LocalData => {
                let response =
                    strategy::cache_first(&self.store, &self.config.data_namespace, self.fetcher.as_ref(), url)
                        .await?;
                Ok(FetchOutcome::Response(response))
            }
            TrafficClass::Shell => {
                let response =
                    strategy::cache_first(&self.store, &self.config.shell_namespace, self.fetcher.as_ref(), url)
                        .await?;
                Ok(FetchOutcome::Response(response))
            }
        }
    }
}

/// Adapter exposing a gateway as a [`Fetcher`].
///
/// Puts the router in front of a consumer such as the timings client:
/// authority traffic gets the network-first policy, so a previously
/// cached response keeps serving when the network is down. The synthetic
/// offline 503 and a suppressed outcome both surface as transport errors,
/// which is what callers of [`Fetcher`] treat as "network unavailable".
pub struct GatewayFetcher {
    gateway: Arc<Gateway>,
}

impl GatewayFetcher {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Fetcher for GatewayFetcher {
    async fn get(&self, url: &Url) -> Result<FetchResponse, Error> {
        let stored = match self.gateway.handle("GET", url).await? {
            FetchOutcome::Response(stored) => stored,
            FetchOutcome::Bypass => {
                return Err(Error::HttpError(format!("not routed through the gateway: {url}")));
            }
            FetchOutcome::Suppressed => {
                return Err(Error::HttpError(format!("offline with nothing cached: {url}")));
            }
        };

        let sentinel = strategy::offline_response();
        if stored.status == sentinel.status && stored.body == sentinel.body {
            return Err(Error::HttpError(format!("offline with nothing cached: {url}")));
        }

        let status = StatusCode::from_u16(stored.status)
            .map_err(|e| Error::HttpError(format!("invalid stored status: {e}")))?;
        Ok(FetchResponse {
            url: url.clone(),
            final_url: url.clone(),
            status,
            content_type: stored.content_type,
            bytes: Bytes::from(stored.body),
            fetch_ms: 0,
        })
    }
}

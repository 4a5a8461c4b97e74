//! Traffic classification for intercepted requests.
//!
//! First match wins, in this order: bypass (non-GET, excluded schemes),
//! timing authority, CDN/font hosts, local religious-text data, and
//! finally the app shell as the default class.

use reqwest::Url;

use super::GatewayConfig;

/// The three cacheable traffic classes plus the shell default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrafficClass {
    /// Remote timing authority: network-first.
    ExternalApi,
    /// CDN and font hosts: stale-while-revalidate.
    Cdn,
    /// Hadith/Quran corpus JSON: cache-first, stable namespace.
    LocalData,
    /// Everything else: cache-first, versioned shell namespace.
    Shell,
}

impl TrafficClass {
    /// Strategy name, for logs.
    pub fn strategy(&self) -> &'static str {
        match self {
            TrafficClass::ExternalApi => "network-first",
            TrafficClass::Cdn => "stale-while-revalidate",
            TrafficClass::LocalData | TrafficClass::Shell => "cache-first",
        }
    }
}

/// Routing decision for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Not intercepted at all; the request goes straight to the network.
    Bypass,
    Intercept(TrafficClass),
}

/// Classify a request by method and URL.
pub fn classify(config: &GatewayConfig, method: &str, url: &Url) -> Route {
    if !method.eq_ignore_ascii_case("GET") {
        return Route::Bypass;
    }
    if config.bypass_schemes.iter().any(|s| s == url.scheme()) {
        return Route::Bypass;
    }

    let host = url.host_str().unwrap_or_default();
    if host == config.authority_host {
        return Route::Intercept(TrafficClass::ExternalApi);
    }
    if config.cdn_hosts.iter().any(|h| h == host) {
        return Route::Intercept(TrafficClass::Cdn);
    }
    if config.data_markers.iter().any(|m| url.path().contains(m.as_str())) {
        return Route::Intercept(TrafficClass::LocalData);
    }

    Route::Intercept(TrafficClass::Shell)
}

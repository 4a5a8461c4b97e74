//! Client code for salah.
//!
//! This crate provides the HTTP fetch pipeline, the prayer-times client
//! against the remote timing authority, and the offline caching gateway
//! shared by the CLI and embedding applications.

pub mod fetch;
pub mod gateway;
pub mod timings;

#[cfg(test)]
pub(crate) mod testutil;

pub use fetch::{FetchConfig, FetchResponse, Fetcher, HttpFetcher, canonicalize};
pub use gateway::{FetchOutcome, Gateway, GatewayConfig, GatewayFetcher, LifecycleState, TrafficClass, UpdateSignal};
pub use timings::TimingsClient;

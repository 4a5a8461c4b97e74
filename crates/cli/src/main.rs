//! salah CLI entry point.
//!
//! Boots the caching gateway (install, then immediate activation) and
//! prints today's prayer times for the configured location. Logging
//! goes to stderr so the timetable on stdout stays clean.

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use salah_client::{FetchConfig, Gateway, GatewayConfig, GatewayFetcher, HttpFetcher, TimingsClient, UpdateSignal};
use salah_core::{AppConfig, CacheDb};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    // --local skips the remote authority and computes from solar position
    let local_only = std::env::args().any(|arg| arg == "--local");

    let store = CacheDb::open(&config.db_path).await?;
    let fetcher = Arc::new(HttpFetcher::new(FetchConfig {
        user_agent: config.user_agent.clone(),
        timeout: config.timeout(),
        ..FetchConfig::default()
    })?);

    let gateway = Arc::new(Gateway::new(store, fetcher, GatewayConfig::from_app(&config)?));
    match gateway.install().await {
        Ok(()) => gateway.signal(UpdateSignal::SkipWaiting).await?,
        // never activate over a failed install: the previous deploy's
        // namespaces keep serving
        Err(err) => tracing::warn!(error = %err, "shell pre-cache failed, keeping previous deploy"),
    }

    let coordinate = config.coordinate();
    let date = chrono::Local::now().date_naive();
    let method = config.calculation_method();
    let school = config.asr_school();

    // authority traffic goes through the router, so cached timings keep
    // serving when the network is down
    let client = TimingsClient::new(Arc::new(GatewayFetcher::new(gateway)), config.authority_base_url.clone());
    let times = if local_only {
        client.local_estimate(date, coordinate, config.timezone_offset, method, school)
    } else {
        client.get_prayer_times(date, coordinate, method, school).await
    };

    println!(
        "{} — {} ({:.4}, {:.4}) — {}",
        date,
        config.city,
        coordinate.latitude,
        coordinate.longitude,
        method.name_en()
    );
    for (name, time) in [
        ("Fajr", times.fajr),
        ("Sunrise", times.sunrise),
        ("Dhuhr", times.dhuhr),
        ("Asr", times.asr),
        ("Maghrib", times.maghrib),
        ("Isha", times.isha),
    ] {
        println!("  {name:<8} {time}");
    }

    Ok(())
}

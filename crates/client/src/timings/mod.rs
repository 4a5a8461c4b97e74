//! Prayer-times client against the remote timing authority.
//!
//! The contract is total: `get_prayer_times` always returns a
//! `PrayerTimeSet`. Transport failures, non-success statuses, and
//! malformed envelopes all fall back to the fixed approximate Dhaka
//! timetable — the local astronomical solver is deliberately not wired
//! into the failure path (it stays available as [`TimingsClient::local_estimate`]
//! for callers that want a computed offline value).

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

use salah_core::astro;
use salah_core::times::{AsrSchool, CalculationMethod, ClockTime, Coordinate, DHAKA_FALLBACK, PrayerTimeSet};
use salah_core::Error;

use crate::fetch::{Fetcher, canonicalize};

/// Success envelope of the timing authority.
#[derive(Debug, Deserialize)]
struct TimingsEnvelope {
    code: i64,
    data: Option<TimingsData>,
}

#[derive(Debug, Deserialize)]
struct TimingsData {
    timings: RawTimings,
}

/// The six timestamps we consume; the authority sends more, which serde
/// ignores.
#[derive(Debug, Deserialize)]
struct RawTimings {
    #[serde(rename = "Fajr")]
    fajr: String,
    #[serde(rename = "Sunrise")]
    sunrise: String,
    #[serde(rename = "Dhuhr")]
    dhuhr: String,
    #[serde(rename = "Asr")]
    asr: String,
    #[serde(rename = "Maghrib")]
    maghrib: String,
    #[serde(rename = "Isha")]
    isha: String,
}

/// Client for the remote timing authority.
pub struct TimingsClient {
    fetcher: Arc<dyn Fetcher>,
    base_url: String,
}

impl TimingsClient {
    pub fn new(fetcher: Arc<dyn Fetcher>, base_url: impl Into<String>) -> Self {
        Self { fetcher, base_url: base_url.into() }
    }

    /// Fetch the timetable for one (date, coordinate, method, school) tuple.
    ///
    /// Never fails: any remote problem is logged and answered with the
    /// approximate Dhaka timetable. Idempotent per input tuple; every
    /// call issues a fresh request (caching, if any, happens in the
    /// gateway's network-first policy underneath).
    pub async fn get_prayer_times(
        &self,
        date: NaiveDate,
        coordinate: Coordinate,
        method: CalculationMethod,
        school: AsrSchool,
    ) -> PrayerTimeSet {
        match self.fetch_remote(date, coordinate, method, school).await {
            Ok(set) => set,
            Err(err) => {
                tracing::warn!(error = %err, %date, "timing authority unavailable, serving Dhaka fallback");
                DHAKA_FALLBACK
            }
        }
    }

    /// Compute the timetable locally from solar position, no network.
    pub fn local_estimate(
        &self,
        date: NaiveDate,
        coordinate: Coordinate,
        tz_hours: f64,
        method: CalculationMethod,
        school: AsrSchool,
    ) -> PrayerTimeSet {
        astro::local_prayer_times(date, coordinate, tz_hours, method, school)
    }

    async fn fetch_remote(
        &self,
        date: NaiveDate,
        coordinate: Coordinate,
        method: CalculationMethod,
        school: AsrSchool,
    ) -> Result<PrayerTimeSet, Error> {
        let url = format!(
            "{}/v1/timings/{:02}-{:02}-{}?latitude={}&longitude={}&method={}&school={}",
            self.base_url,
            date.day(),
            date.month(),
            date.year(),
            coordinate.latitude,
            coordinate.longitude,
            method.authority_code(),
            school.authority_code(),
        );
        let url = canonicalize(&url).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        let response = self.fetcher.get(&url).await?;
        if !response.status.is_success() {
            return Err(Error::HttpError(format!("authority status {}", response.status.as_u16())));
        }

        let envelope: TimingsEnvelope = serde_json::from_slice(&response.bytes)
            .map_err(|e| Error::InvalidInput(format!("malformed authority envelope: {e}")))?;

        if envelope.code != 200 {
            return Err(Error::InvalidInput(format!("authority envelope code {}", envelope.code)));
        }
        let timings = envelope
            .data
            .ok_or_else(|| Error::InvalidInput("authority envelope missing data".to_string()))?
            .timings;

        Ok(PrayerTimeSet {
            fajr: parse_clock(&timings.fajr)?,
            sunrise: parse_clock(&timings.sunrise)?,
            dhuhr: parse_clock(&timings.dhuhr)?,
            asr: parse_clock(&timings.asr)?,
            maghrib: parse_clock(&timings.maghrib)?,
            isha: parse_clock(&timings.isha)?,
        })
    }
}

/// Parse an authority timestamp like `"05:10"` (a timezone annotation
/// suffix such as `"17:59 (+06)"` is tolerated and ignored).
fn parse_clock(raw: &str) -> Result<ClockTime, Error> {
    let malformed = || Error::InvalidInput(format!("malformed timestamp: {raw:?}"));

    let (hour, rest) = raw.trim().split_once(':').ok_or_else(malformed)?;
    let minute = rest.split_whitespace().next().ok_or_else(malformed)?;

    let hour: u8 = hour.parse().map_err(|_| malformed())?;
    let minute: u8 = minute.parse().map_err(|_| malformed())?;
    if hour >= 24 || minute >= 60 {
        return Err(malformed());
    }

    Ok(ClockTime::new(hour, minute))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{StubFetcher, StubRule};

    const ENVELOPE: &str = r#"{
        "code": 200,
        "status": "OK",
        "data": {
            "timings": {
                "Fajr": "05:10",
                "Sunrise": "06:30",
                "Dhuhr": "12:16",
                "Asr": "15:45",
                "Sunset": "17:59",
                "Maghrib": "17:59",
                "Isha": "19:14",
                "Midnight": "00:07"
            }
        }
    }"#;

    fn client_with(rule: StubRule) -> (Arc<StubFetcher>, TimingsClient) {
        let stub = Arc::new(StubFetcher::new());
        stub.set_default(rule);
        let client = TimingsClient::new(stub.clone(), "https://api.aladhan.com");
        (stub, client)
    }

    fn march_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    fn dhaka() -> Coordinate {
        Coordinate::new(23.81, 90.41).unwrap()
    }

    #[tokio::test]
    async fn test_success_envelope_exact_parse() {
        let (_, client) = client_with(StubRule::json(ENVELOPE));
        let set = client
            .get_prayer_times(march_first(), dhaka(), CalculationMethod::Karachi, AsrSchool::Hanafi)
            .await;

        assert_eq!(set.fajr, ClockTime::new(5, 10));
        assert_eq!(set.sunrise, ClockTime::new(6, 30));
        assert_eq!(set.dhuhr, ClockTime::new(12, 16));
        assert_eq!(set.asr, ClockTime::new(15, 45));
        assert_eq!(set.maghrib, ClockTime::new(17, 59));
        assert_eq!(set.isha, ClockTime::new(19, 14));
    }

    #[tokio::test]
    async fn test_request_url_carries_codes() {
        let (stub, client) = client_with(StubRule::json(ENVELOPE));
        client
            .get_prayer_times(march_first(), dhaka(), CalculationMethod::Karachi, AsrSchool::Hanafi)
            .await;

        let calls = stub.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].contains("/v1/timings/01-03-2026"), "url: {}", calls[0]);
        assert!(calls[0].contains("latitude=23.81"), "url: {}", calls[0]);
        assert!(calls[0].contains("method=1"), "url: {}", calls[0]);
        assert!(calls[0].contains("school=1"), "url: {}", calls[0]);
    }

    #[tokio::test]
    async fn test_idempotent_and_uncached() {
        let (stub, client) = client_with(StubRule::json(ENVELOPE));
        let first = client
            .get_prayer_times(march_first(), dhaka(), CalculationMethod::Karachi, AsrSchool::Standard)
            .await;
        let second = client
            .get_prayer_times(march_first(), dhaka(), CalculationMethod::Karachi, AsrSchool::Standard)
            .await;

        assert_eq!(first, second);
        // no internal caching: each call hits the authority
        assert_eq!(stub.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_transport_failure_falls_back() {
        let (_, client) = client_with(StubRule::Fail);
        let set = client
            .get_prayer_times(march_first(), dhaka(), CalculationMethod::Karachi, AsrSchool::Standard)
            .await;
        assert_eq!(set, DHAKA_FALLBACK);
    }

    #[tokio::test]
    async fn test_http_error_status_falls_back() {
        let (_, client) = client_with(StubRule::status(500, "boom"));
        let set = client
            .get_prayer_times(march_first(), dhaka(), CalculationMethod::Karachi, AsrSchool::Standard)
            .await;
        assert_eq!(set, DHAKA_FALLBACK);
    }

    #[tokio::test]
    async fn test_malformed_envelope_falls_back() {
        let (_, client) = client_with(StubRule::json("{\"code\": 200, \"data\": \"nope\"}"));
        let set = client
            .get_prayer_times(march_first(), dhaka(), CalculationMethod::Karachi, AsrSchool::Standard)
            .await;
        assert_eq!(set, DHAKA_FALLBACK);
    }

    #[tokio::test]
    async fn test_non_success_envelope_code_falls_back() {
        let (_, client) = client_with(StubRule::json("{\"code\": 429, \"data\": null}"));
        let set = client
            .get_prayer_times(march_first(), dhaka(), CalculationMethod::Karachi, AsrSchool::Standard)
            .await;
        assert_eq!(set, DHAKA_FALLBACK);
    }

    #[test]
    fn test_parse_clock_plain_and_annotated() {
        assert_eq!(parse_clock("05:10").unwrap(), ClockTime::new(5, 10));
        assert_eq!(parse_clock("17:59 (+06)").unwrap(), ClockTime::new(17, 59));
        assert!(parse_clock("25:00").is_err());
        assert!(parse_clock("05:61").is_err());
        assert!(parse_clock("0510").is_err());
        assert!(parse_clock("aa:bb").is_err());
    }

    #[tokio::test]
    async fn test_cached_timings_survive_authority_outage() {
        use crate::gateway::{Gateway, GatewayConfig, GatewayFetcher};
        use salah_core::CacheDb;

        // deliberately different from the Dhaka fallback numbers
        const ENVELOPE_OFFSET: &str = r#"{
            "code": 200,
            "data": {
                "timings": {
                    "Fajr": "04:45", "Sunrise": "06:02", "Dhuhr": "12:05",
                    "Asr": "16:20", "Maghrib": "18:10", "Isha": "19:30"
                }
            }
        }"#;

        let stub = Arc::new(StubFetcher::new());
        stub.set_default(StubRule::json(ENVELOPE_OFFSET));
        let store = CacheDb::open_in_memory().await.unwrap();
        let gateway = Arc::new(Gateway::new(store, stub.clone(), GatewayConfig::default()));
        let client = TimingsClient::new(Arc::new(GatewayFetcher::new(gateway)), "https://api.aladhan.com");

        let online = client
            .get_prayer_times(march_first(), dhaka(), CalculationMethod::Karachi, AsrSchool::Standard)
            .await;
        assert_eq!(online.fajr, ClockTime::new(4, 45));

        // authority goes dark; the gateway's network-first cache answers
        stub.set_default(StubRule::Fail);
        let offline = client
            .get_prayer_times(march_first(), dhaka(), CalculationMethod::Karachi, AsrSchool::Standard)
            .await;
        assert_eq!(offline, online);
        assert_ne!(offline, DHAKA_FALLBACK);
    }

    #[test]
    fn test_local_estimate_matches_solver() {
        let stub = Arc::new(StubFetcher::new());
        let client = TimingsClient::new(stub, "https://api.aladhan.com");
        let estimate =
            client.local_estimate(march_first(), dhaka(), 6.0, CalculationMethod::Karachi, AsrSchool::Standard);
        let direct =
            astro::local_prayer_times(march_first(), dhaka(), 6.0, CalculationMethod::Karachi, AsrSchool::Standard);
        assert_eq!(estimate, direct);
    }
}

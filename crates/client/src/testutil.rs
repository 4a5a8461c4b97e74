//! Deterministic stub fetcher shared by strategy and client tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{StatusCode, Url};

use salah_core::Error;

use crate::fetch::{FetchResponse, Fetcher};

/// What the stub does when a URL is requested.
#[derive(Debug, Clone)]
pub(crate) enum StubRule {
    Ok {
        status: u16,
        content_type: Option<String>,
        body: Vec<u8>,
    },
    Fail,
}

impl StubRule {
    pub(crate) fn json(body: &str) -> Self {
        StubRule::Ok {
            status: 200,
            content_type: Some("application/json".to_string()),
            body: body.as_bytes().to_vec(),
        }
    }

    pub(crate) fn status(status: u16, body: &str) -> Self {
        StubRule::Ok { status, content_type: None, body: body.as_bytes().to_vec() }
    }
}

/// Programmable fetcher: per-URL rules, a default rule, and a call log.
pub(crate) struct StubFetcher {
    rules: Mutex<HashMap<String, StubRule>>,
    fallback: Mutex<StubRule>,
    calls: Mutex<Vec<String>>,
}

impl StubFetcher {
    /// Every unmatched URL fails with a transport error.
    pub(crate) fn new() -> Self {
        Self {
            rules: Mutex::new(HashMap::new()),
            fallback: Mutex::new(StubRule::Fail),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn set(&self, url: &str, rule: StubRule) {
        self.rules.lock().unwrap().insert(url.to_string(), rule);
    }

    pub(crate) fn set_default(&self, rule: StubRule) {
        *self.fallback.lock().unwrap() = rule;
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| c.as_str() == url).count()
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn get(&self, url: &Url) -> Result<FetchResponse, Error> {
        self.calls.lock().unwrap().push(url.as_str().to_string());

        let rule = self
            .rules
            .lock()
            .unwrap()
            .get(url.as_str())
            .cloned()
            .unwrap_or_else(|| self.fallback.lock().unwrap().clone());

        match rule {
            StubRule::Fail => Err(Error::HttpError("stub: network unreachable".to_string())),
            StubRule::Ok { status, content_type, body } => Ok(FetchResponse {
                url: url.clone(),
                final_url: url.clone(),
                status: StatusCode::from_u16(status).unwrap(),
                content_type,
                bytes: Bytes::from(body),
                fetch_ms: 0,
            }),
        }
    }
}

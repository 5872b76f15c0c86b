//! Active reflection probing.
//!
//! The prober takes the discovered parameter names, pairs each with a
//! fresh random marker value, and sends the pairs at the target in chunks
//! of 30 as a GET query string and again as a form-encoded POST body. Any
//! marker found verbatim in a response body flags its parameter as
//! reflected.
//!
//! Detection is a raw substring check against the whole response text.
//! It has no HTML or script context awareness, so it also fires on safely
//! escaped echoes; the output is a triage signal for manual review, not a
//! vulnerability verdict.

use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::{distr::Alphanumeric, Rng};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;

/// Parameters probed per request pair, bounding query-string size.
pub const CHUNK_SIZE: usize = 30;

/// Length of the random marker substituted for each parameter value.
pub const MARKER_LENGTH: usize = 5;

/// A strategy for deciding which parameter names a target reflects.
#[async_trait]
pub trait ReflectionChecker: Send + Sync {
    fn name(&self) -> &'static str;

    /// Probes `base_url` with the given parameters and returns the
    /// deduplicated names whose markers came back in a response body.
    async fn check(&self, params: &[String], base_url: &str) -> Result<Vec<String>>;
}

/// HTTP prober issuing paired GET and POST requests per chunk.
pub struct HttpProber {
    client: reqwest::Client,
}

impl HttpProber {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ReflectionChecker for HttpProber {
    fn name(&self) -> &'static str {
        "HTTP GET/POST prober"
    }

    async fn check(&self, params: &[String], base_url: &str) -> Result<Vec<String>> {
        let mut reflected = Vec::new();
        let mut recorded = HashSet::new();

        // Chunks run strictly in sequence so the target sees a steady
        // trickle of requests, not a burst.
        for chunk in params.chunks(CHUNK_SIZE) {
            let pairs = marker_pairs(chunk);
            let query = build_query(&pairs);
            let get_url = format!("{}?{}", base_url, query);

            match self.client.get(&get_url).send().await {
                Ok(response) => match response.text().await {
                    Ok(body) => record_reflections(&body, &pairs, &mut recorded, &mut reflected),
                    Err(e) => warn!(url = %get_url, error = %e, "failed to read GET response"),
                },
                Err(e) => warn!(url = %get_url, error = %e, "GET probe failed"),
            }

            match self.client.post(base_url).form(&pairs).send().await {
                Ok(response) => match response.text().await {
                    Ok(body) => record_reflections(&body, &pairs, &mut recorded, &mut reflected),
                    Err(e) => warn!(url = base_url, error = %e, "failed to read POST response"),
                },
                Err(e) => warn!(url = base_url, error = %e, "POST probe failed"),
            }
        }

        debug!(count = reflected.len(), "reflection probe finished");
        Ok(reflected)
    }
}

/// Pairs each parameter with a fresh random marker.
fn marker_pairs(params: &[String]) -> Vec<(String, String)> {
    params
        .iter()
        .map(|param| (param.clone(), generate_marker(MARKER_LENGTH)))
        .collect()
}

/// Uniform random alphanumeric string of the given length.
pub fn generate_marker(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Percent-encodes the pairs into a `k=v&k=v` query string.
fn build_query(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(param, marker)| {
            format!(
                "{}={}",
                urlencoding::encode(param),
                urlencoding::encode(marker)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Records every parameter whose own marker appears verbatim in `body`,
/// skipping names already recorded earlier in the probe run.
fn record_reflections(
    body: &str,
    pairs: &[(String, String)],
    recorded: &mut HashSet<String>,
    reflected: &mut Vec<String>,
) {
    for (param, marker) in pairs {
        if body.contains(marker.as_str()) && recorded.insert(param.clone()) {
            debug!(param = %param, "marker reflected in response");
            reflected.push(param.clone());
        }
    }
}

//! HTTP client for the similarity-key matching service.
//!
//! Each lookup is one GET against a per-domain endpoint; the response is a
//! small JSON object carrying the similarity key, a result code, and the
//! remaining credit balance.

use std::time::Duration;

use serde::Deserialize;
use simclust_core::{Outcome, Record, Resolution};
use thiserror::Error;
use tracing::warn;

/// Result code the service sends for a full match.
const SUCCESS_CODE: &str = "Success";

#[derive(Error, Debug)]
pub enum MatchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}")]
    Server { status: u16 },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Which per-domain endpoint family to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    /// Company and organization names.
    Company,
    /// Person full names.
    Individual,
    /// Street addresses.
    Address,
}

impl Matcher {
    /// Endpoint path on the service host.
    pub fn path(self) -> &'static str {
        match self {
            Matcher::Company => "/getcompanymatchadvanced",
            Matcher::Individual => "/getfullnamematch",
            Matcher::Address => "/getaddressmatchadvanced",
        }
    }

    /// Name of the query parameter carrying the lookup value.
    pub fn param(self) -> &'static str {
        match self {
            Matcher::Company => "company",
            Matcher::Individual => "fullname",
            Matcher::Address => "address",
        }
    }

    /// Algorithm selector sent when the caller does not pick one. The
    /// full-name endpoint takes none.
    pub fn default_algorithm(self) -> Option<&'static str> {
        match self {
            Matcher::Company => Some("model-v4-wide"),
            Matcher::Individual => None,
            Matcher::Address => Some("model-v3-narrow"),
        }
    }
}

impl std::str::FromStr for Matcher {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "company" => Ok(Matcher::Company),
            "individual" | "fullname" => Ok(Matcher::Individual),
            "address" => Ok(Matcher::Address),
            other => Err(format!(
                "unknown matcher '{other}' (expected company, individual, or address)"
            )),
        }
    }
}

/// Configuration for one batch run. Read-only once the client is built.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// API license key, sent as the `license` query parameter.
    pub license: String,
    pub matcher: Matcher,
    /// Overrides the matcher's default algorithm selector when set.
    pub algorithm: Option<String>,
    /// Service origin like `https://api.interzoid.com` (no trailing slash).
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// One decoded service response. Every field is optional so that an absent
/// field and an empty one stay distinguishable.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchResponse {
    #[serde(rename = "SimKey")]
    pub sim_key: Option<String>,
    #[serde(rename = "Code")]
    pub code: Option<String>,
    #[serde(rename = "Credits")]
    pub credits: Option<String>,
}

/// Client for the matching service. Holds one connection pool for the whole
/// batch; cheap to share by reference across concurrent lookups.
pub struct MatchClient {
    client: reqwest::Client,
    config: MatchConfig,
}

impl MatchClient {
    pub fn new(mut config: MatchConfig) -> Result<Self, MatchError> {
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    /// Issue a single lookup for `value` and decode the response body.
    ///
    /// Query parameters are percent-encoded by the transport layer. A
    /// non-2xx status is an error and the body is discarded. No retries.
    pub async fn fetch(&self, value: &str) -> Result<MatchResponse, MatchError> {
        let url = format!("{}{}", self.config.base_url, self.config.matcher.path());

        let mut query: Vec<(&str, &str)> = vec![
            ("license", self.config.license.as_str()),
            (self.config.matcher.param(), value),
        ];
        let algorithm = self
            .config
            .algorithm
            .as_deref()
            .or_else(|| self.config.matcher.default_algorithm());
        if let Some(algorithm) = algorithm {
            query.push(("algorithm", algorithm));
        }

        let resp = self.client.get(&url).query(&query).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(MatchError::Server {
                status: status.as_u16(),
            });
        }

        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Resolve one record to its similarity key.
    ///
    /// Total: every failure mode degrades to an outcome on the resolution,
    /// so one bad record never aborts a batch. The lookup is a plain GET
    /// with no client-side state, so calling this again for the same value
    /// is safe; a retry layer could wrap it without contract changes.
    pub async fn resolve(&self, record: Record) -> Resolution {
        let response = match self.fetch(&record.value).await {
            Ok(response) => response,
            Err(MatchError::Json(err)) => {
                warn!(value = %record.value, index = record.index, %err, "response decode failed");
                return Resolution::keyless(record, Outcome::DecodeError);
            }
            Err(err) => {
                warn!(value = %record.value, index = record.index, %err, "lookup failed");
                return Resolution::keyless(record, Outcome::TransportError);
            }
        };

        let success = response.code.as_deref() == Some(SUCCESS_CODE);
        if !success {
            // Partial-credit matches still return a usable key; record the
            // code but keep going.
            warn!(
                value = %record.value,
                index = record.index,
                code = response.code.as_deref().unwrap_or("<missing>"),
                "non-success result code"
            );
        }

        match response.sim_key.filter(|k| !k.is_empty()) {
            Some(key) if success => Resolution::keyed(record, key, Outcome::Success),
            Some(key) => Resolution::keyed(record, key, Outcome::NonSuccessCode),
            None => Resolution::keyless(record, Outcome::Empty),
        }
    }
}

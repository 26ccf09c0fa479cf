use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::{error::AppError, models::location::LocationCandidate};

const RESULT_LIMIT: &str = "5";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Thin client for a Nominatim-compatible search endpoint.
#[derive(Clone)]
pub struct GeocodingClient {
    http: reqwest::Client,
    base_url: Url,
}

/// Raw provider record. Nominatim sends coordinates as strings, so they are
/// kept as untyped values and parsed leniently in [`normalize`].
#[derive(Debug, Deserialize)]
struct ProviderResult {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    lat: Value,
    #[serde(default)]
    lon: Value,
    #[serde(default)]
    address: Option<ProviderAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct ProviderAddress {
    house_number: Option<String>,
    road: Option<String>,
}

impl GeocodingClient {
    pub fn new(base_url: Url, user_agent: &str) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build geocoding http client")?;
        Ok(Self {
            http,
            base_url: ensure_trailing_slash(base_url),
        })
    }

    /// Looks up free-text `query` against the provider and returns the
    /// normalized candidates. Provider failures of any kind surface as a
    /// single upstream error; no partial results are returned.
    pub async fn search(&self, query: &str) -> Result<Vec<LocationCandidate>, AppError> {
        let url = self
            .base_url
            .join("search")
            .map_err(|err| AppError::Upstream(err.into()))?;

        debug!(%query, "searching geocoding provider");
        let response = self
            .http
            .get(url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("limit", RESULT_LIMIT),
                ("addressdetails", "1"),
            ])
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| AppError::Upstream(err.into()))?;

        let results: Vec<ProviderResult> = response
            .json()
            .await
            .map_err(|err| AppError::Upstream(err.into()))?;

        let candidates = normalize(results);
        debug!(count = candidates.len(), "geocoding search finished");
        Ok(candidates)
    }
}

// `Url::join` replaces the last path segment unless the base ends with a
// slash, which would drop a path like "/nominatim" from the configured base.
fn ensure_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        url.set_path(&format!("{}/", url.path()));
    }
    url
}

fn normalize(results: Vec<ProviderResult>) -> Vec<LocationCandidate> {
    results
        .into_iter()
        .filter_map(|result| {
            let (Some(latitude), Some(longitude)) =
                (parse_coord(&result.lat), parse_coord(&result.lon))
            else {
                warn!(
                    display_name = %result.display_name,
                    "dropping search result with unparseable coordinates"
                );
                return None;
            };
            if latitude == 0.0 && longitude == 0.0 {
                warn!(
                    display_name = %result.display_name,
                    "dropping search result with zero coordinates"
                );
                return None;
            }
            Some(LocationCandidate {
                name: short_name(&result),
                display_name: result.display_name,
                latitude,
                longitude,
            })
        })
        .collect()
}

fn parse_coord(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => raw.trim().parse().ok(),
        _ => None,
    }
}

/// Display-worthy short name: the provider's own name, then house number
/// plus road, then the first comma-separated segment of the display name.
fn short_name(result: &ProviderResult) -> String {
    if let Some(name) = result.name.as_deref() {
        let trimmed = name.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    if let Some(address) = &result.address {
        if let (Some(house_number), Some(road)) =
            (address.house_number.as_deref(), address.road.as_deref())
        {
            return format!("{house_number} {road}");
        }
    }
    result
        .display_name
        .split(',')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

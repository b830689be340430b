//! Forward geocoding: free-text place names to coordinates.
//! Uses Nominatim (OpenStreetMap) - free, no API key required.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = concat!("fairweather/", env!("CARGO_PKG_VERSION"));
const MAX_CANDIDATES: usize = 5;

/// A resolved location.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct Place {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("geocoding request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("no location matched \"{0}\"")]
    NotFound(String),
    /// Several distinct places matched; the caller shows the candidates
    /// so the user can pick one.
    #[error("\"{query}\" matched more than one location")]
    Ambiguous { query: String, candidates: Vec<Place> },
}

/// Narrow interface the analysis pipeline depends on; mocked in the
/// HTTP-level tests.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn resolve(&self, query: &str) -> Result<Place, GeocodeError>;
}

pub struct NominatimClient {
    client: reqwest::Client,
}

impl NominatimClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn resolve(&self, query: &str) -> Result<Place, GeocodeError> {
        let response = self
            .client
            .get(NOMINATIM_URL)
            .query(&[
                ("q", query),
                ("format", "jsonv2"),
                ("limit", &MAX_CANDIDATES.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let results: Vec<SearchResult> = response.json().await?;
        interpret(query, results)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    display_name: String,
    /// Nominatim serializes coordinates as strings.
    lat: String,
    lon: String,
}

impl SearchResult {
    fn into_place(self) -> Option<Place> {
        Some(Place {
            latitude: self.lat.parse().ok()?,
            longitude: self.lon.parse().ok()?,
            name: self.display_name,
        })
    }
}

fn interpret(query: &str, results: Vec<SearchResult>) -> Result<Place, GeocodeError> {
    let mut candidates: Vec<Place> = results
        .into_iter()
        .filter_map(SearchResult::into_place)
        .collect();

    match candidates.len() {
        0 => Err(GeocodeError::NotFound(query.to_string())),
        1 => Ok(candidates.remove(0)),
        _ => Err(GeocodeError::Ambiguous {
            query: query.to_string(),
            candidates,
        }),
    }
}

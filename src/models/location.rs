use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A stored point in a trip's itinerary. `order` is the zero-based position
/// within the trip and is rewritten wholesale on every update.
#[derive(Debug, Clone, Serialize)]
pub struct Location {
    pub name: String,
    pub display_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub order: i64,
}

/// A candidate returned by the geocoding provider, already normalized.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LocationCandidate {
    pub name: String,
    pub display_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Location as submitted by the client. Coordinates arrive either as JSON
/// numbers or numeric strings, under either key alias, so they are kept raw
/// here and coerced by the trip service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationPayload {
    pub name: Option<String>,
    pub display_name: Option<String>,
    #[serde(default, alias = "lat")]
    pub latitude: Option<Value>,
    #[serde(default, alias = "lon")]
    pub longitude: Option<Value>,
}

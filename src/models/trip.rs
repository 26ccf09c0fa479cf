use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::location::{Location, LocationPayload};

#[derive(Debug, Clone, Serialize)]
pub struct Trip {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub locations: Vec<Location>,
}

/// Request body for creating or updating a trip. Every field is optional at
/// the serde level so that missing data surfaces as a 400 from the trip
/// service instead of a rejection from the JSON extractor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TripPayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub locations: Option<Vec<LocationPayload>>,
}

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{error::AppError, models::location::LocationCandidate, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new().route("/search", get(search_locations))
}

#[derive(Deserialize)]
struct SearchParams {
    q: Option<String>,
}

#[derive(Serialize)]
struct SearchResponse {
    locations: Vec<LocationCandidate>,
}

async fn search_locations(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, AppError> {
    let query = required_query(params.q.as_deref())?;
    let locations = state.geocoder.search(query).await?;
    Ok(Json(SearchResponse { locations }))
}

fn required_query(raw: Option<&str>) -> Result<&str, AppError> {
    raw.map(str::trim)
        .filter(|query| !query.is_empty())
        .ok_or_else(|| AppError::validation("No query provided"))
}

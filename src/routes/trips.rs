use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::{
    error::AppError,
    models::trip::{Trip, TripPayload},
    services::trips as trip_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/trips", get(list_trips).post(create_trip))
        .route(
            "/trips/:id",
            get(get_trip).put(update_trip).delete(delete_trip),
        )
}

#[derive(Serialize)]
struct TripsResponse {
    trips: Vec<Trip>,
}

#[derive(Serialize)]
struct TripResponse {
    trip: Trip,
}

#[derive(Serialize)]
struct CreatedResponse {
    message: &'static str,
    trip_id: i64,
}

#[derive(Serialize)]
struct MessageResponse {
    message: &'static str,
}

async fn list_trips(State(state): State<AppState>) -> Result<Json<TripsResponse>, AppError> {
    let trips = trip_service::list_trips(&state.db).await?;
    Ok(Json(TripsResponse { trips }))
}

async fn create_trip(
    State(state): State<AppState>,
    Json(payload): Json<TripPayload>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let trip_id = trip_service::create_trip(&state.db, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Trip created successfully",
            trip_id,
        }),
    ))
}

async fn get_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<i64>,
) -> Result<Json<TripResponse>, AppError> {
    let trip = trip_service::get_trip(&state.db, trip_id).await?;
    Ok(Json(TripResponse { trip }))
}

async fn update_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<i64>,
    Json(payload): Json<TripPayload>,
) -> Result<Json<TripResponse>, AppError> {
    let trip = trip_service::update_trip(&state.db, trip_id, payload).await?;
    Ok(Json(TripResponse { trip }))
}

async fn delete_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    trip_service::delete_trip(&state.db, trip_id).await?;
    Ok(Json(MessageResponse {
        message: "Trip deleted successfully",
    }))
}

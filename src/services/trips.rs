use chrono::{NaiveDate, Utc};
use serde_json::Value;
use sqlx::{sqlite::SqliteRow, Row, Sqlite, Transaction};
use tracing::{info, warn};

use crate::{
    db::DbPool,
    error::AppError,
    models::{
        location::{Location, LocationPayload},
        trip::{Trip, TripPayload},
    },
};

/// A location payload after validation, ready to insert.
#[derive(Debug)]
struct LocationRecord {
    name: String,
    display_name: String,
    latitude: f64,
    longitude: f64,
}

/// Coordinate requirements differ between the two write paths: create
/// tolerates absent coordinates (defaulting to zero), update insists on
/// nonzero values for every entry.
#[derive(Clone, Copy, PartialEq)]
enum CoordinatePolicy {
    AllowZero,
    RequireNonzero,
}

/// Creates a trip and its locations in one transaction and returns the new
/// trip id. Location order is the array index of the input.
pub async fn create_trip(db: &DbPool, payload: TripPayload) -> Result<i64, AppError> {
    let title = required_title(&payload)?;
    let inputs = required_locations(&payload)?;
    let records = resolve_locations(inputs, CoordinatePolicy::AllowZero)?;
    let start_date = parse_date(payload.start_date.as_deref());
    let end_date = parse_date(payload.end_date.as_deref());

    let mut tx = db.begin().await?;
    let trip_id = sqlx::query(
        "INSERT INTO trips (title, description, created_at, start_date, end_date) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(title)
    .bind(payload.description.as_deref())
    .bind(Utc::now())
    .bind(start_date)
    .bind(end_date)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    insert_locations(&mut tx, trip_id, &records).await?;
    tx.commit().await?;

    info!(trip_id, "trip created");
    Ok(trip_id)
}

/// Returns the trip with its locations in itinerary order.
pub async fn get_trip(db: &DbPool, trip_id: i64) -> Result<Trip, AppError> {
    let row = sqlx::query(
        "SELECT id, title, description, created_at, start_date, end_date \
         FROM trips WHERE id = ?1",
    )
    .bind(trip_id)
    .fetch_optional(db)
    .await?
    .ok_or(AppError::NotFound)?;

    let locations = load_locations(db, trip_id).await?;
    Ok(row_to_trip(&row, locations)?)
}

/// All trips, most recently created first. A trip whose locations cannot be
/// read is logged and skipped rather than failing the whole listing.
pub async fn list_trips(db: &DbPool) -> Result<Vec<Trip>, AppError> {
    let rows = sqlx::query(
        "SELECT id, title, description, created_at, start_date, end_date \
         FROM trips ORDER BY id DESC",
    )
    .fetch_all(db)
    .await?;

    let mut trips = Vec::with_capacity(rows.len());
    for row in rows {
        match hydrate_trip(db, &row).await {
            Ok(trip) => trips.push(trip),
            Err(err) => warn!("skipping unreadable trip in listing: {err}"),
        }
    }
    Ok(trips)
}

async fn hydrate_trip(db: &DbPool, row: &SqliteRow) -> Result<Trip, AppError> {
    let trip_id: i64 = row.try_get("id")?;
    let locations = load_locations(db, trip_id).await?;
    Ok(row_to_trip(row, locations)?)
}

/// Replaces the trip's fields and its entire location set. Every new
/// location is validated before anything is deleted, and the whole
/// replacement runs in one transaction, so a rejected update leaves the
/// stored set untouched.
pub async fn update_trip(db: &DbPool, trip_id: i64, payload: TripPayload) -> Result<Trip, AppError> {
    ensure_exists(db, trip_id).await?;
    let title = required_title(&payload)?;
    let inputs = required_locations(&payload)?;
    let records = resolve_locations(inputs, CoordinatePolicy::RequireNonzero)?;
    let start_date = parse_date(payload.start_date.as_deref());
    let end_date = parse_date(payload.end_date.as_deref());

    let mut tx = db.begin().await?;
    sqlx::query(
        "UPDATE trips SET title = ?1, description = ?2, start_date = ?3, end_date = ?4 \
         WHERE id = ?5",
    )
    .bind(title)
    .bind(payload.description.as_deref())
    .bind(start_date)
    .bind(end_date)
    .bind(trip_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM locations WHERE trip_id = ?1")
        .bind(trip_id)
        .execute(&mut *tx)
        .await?;
    insert_locations(&mut tx, trip_id, &records).await?;
    tx.commit().await?;

    info!(trip_id, "trip updated");
    get_trip(db, trip_id).await
}

/// Deletes the trip; its locations go with it via the cascade.
pub async fn delete_trip(db: &DbPool, trip_id: i64) -> Result<(), AppError> {
    ensure_exists(db, trip_id).await?;
    sqlx::query("DELETE FROM trips WHERE id = ?1")
        .bind(trip_id)
        .execute(db)
        .await?;
    info!(trip_id, "trip deleted");
    Ok(())
}

async fn ensure_exists(db: &DbPool, trip_id: i64) -> Result<(), AppError> {
    sqlx::query("SELECT id FROM trips WHERE id = ?1")
        .bind(trip_id)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(())
}

async fn load_locations(db: &DbPool, trip_id: i64) -> Result<Vec<Location>, AppError> {
    let rows = sqlx::query(
        "SELECT name, display_name, latitude, longitude, position \
         FROM locations WHERE trip_id = ?1 ORDER BY position ASC",
    )
    .bind(trip_id)
    .fetch_all(db)
    .await?;

    let mut locations = Vec::with_capacity(rows.len());
    for row in rows {
        locations.push(Location {
            name: row.try_get("name")?,
            display_name: row.try_get("display_name")?,
            latitude: row.try_get("latitude")?,
            longitude: row.try_get("longitude")?,
            order: row.try_get("position")?,
        });
    }
    Ok(locations)
}

async fn insert_locations(
    tx: &mut Transaction<'_, Sqlite>,
    trip_id: i64,
    records: &[LocationRecord],
) -> Result<(), AppError> {
    for (position, record) in records.iter().enumerate() {
        sqlx::query(
            "INSERT INTO locations (trip_id, name, display_name, latitude, longitude, position) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(trip_id)
        .bind(&record.name)
        .bind(&record.display_name)
        .bind(record.latitude)
        .bind(record.longitude)
        .bind(position as i64)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

fn row_to_trip(row: &SqliteRow, locations: Vec<Location>) -> Result<Trip, sqlx::Error> {
    Ok(Trip {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        locations,
    })
}

fn required_title(payload: &TripPayload) -> Result<&str, AppError> {
    payload
        .title
        .as_deref()
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .ok_or_else(|| AppError::validation("Title is required"))
}

fn required_locations(payload: &TripPayload) -> Result<&[LocationPayload], AppError> {
    payload
        .locations
        .as_deref()
        .filter(|locations| !locations.is_empty())
        .ok_or_else(|| AppError::validation("At least one location is required"))
}

fn resolve_locations(
    inputs: &[LocationPayload],
    policy: CoordinatePolicy,
) -> Result<Vec<LocationRecord>, AppError> {
    let mut records = Vec::with_capacity(inputs.len());
    for (index, input) in inputs.iter().enumerate() {
        let invalid = || AppError::Validation(format!("Invalid location data at index {index}"));

        let name = input
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(invalid)?
            .to_string();
        let latitude = coerce_coord(input.latitude.as_ref()).ok_or_else(invalid)?;
        let longitude = coerce_coord(input.longitude.as_ref()).ok_or_else(invalid)?;
        if policy == CoordinatePolicy::RequireNonzero && (latitude == 0.0 || longitude == 0.0) {
            return Err(invalid());
        }

        let display_name = input
            .display_name
            .as_deref()
            .map(str::trim)
            .filter(|display| !display.is_empty())
            .unwrap_or(&name)
            .to_string();

        records.push(LocationRecord {
            name,
            display_name,
            latitude,
            longitude,
        });
    }
    Ok(records)
}

/// Accepts JSON numbers and numeric strings; an absent or null coordinate
/// defaults to zero.
fn coerce_coord(value: Option<&Value>) -> Option<f64> {
    match value {
        None | Some(Value::Null) => Some(0.0),
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(raw)) => raw.trim().parse().ok(),
        Some(_) => None,
    }
}

/// Single date policy for both create and update: "YYYY-MM-DD" strings,
/// anything unparseable becomes null rather than an error.
fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .and_then(|value| NaiveDate::parse_from_str(value, "%Y-%m-%d").ok())
}

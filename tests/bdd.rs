use std::{fmt, fs::File};

use anyhow::Context;
use cucumber::{given, then, when, World as _};
use serde_json::json;
use tempfile::TempDir;
use travel_journal::{
    db::{init_pool, DbPool},
    models::{
        location::LocationPayload,
        trip::{Trip, TripPayload},
    },
    services::trips,
};

#[derive(Debug, cucumber::World, Default)]
struct JournalWorld {
    state: Option<TestState>,
    current_trip: Option<i64>,
    last_error: Option<String>,
}

impl JournalWorld {
    fn db(&self) -> &DbPool {
        &self
            .state
            .as_ref()
            .expect("database must be initialised first")
            .db
    }

    fn current_trip(&self) -> i64 {
        self.current_trip.expect("a trip must have been created")
    }

    async fn fetch_current_trip(&self) -> Trip {
        trips::get_trip(self.db(), self.current_trip())
            .await
            .expect("current trip should be loadable")
    }
}

struct TestState {
    db: DbPool,
    _root: TempDir,
}

impl fmt::Debug for TestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestState").finish()
    }
}

impl TestState {
    async fn new() -> anyhow::Result<Self> {
        let root = TempDir::new().context("create temp dir for bdd world")?;
        let db_path = root.path().join("bdd.sqlite");
        File::create(&db_path)?;
        let database_url = format!("sqlite://{}", db_path.to_string_lossy());

        let db = init_pool(&database_url).await?;
        sqlx::migrate!("./migrations").run(&db).await?;

        Ok(Self { db, _root: root })
    }
}

/// Parses "Name@lat,lon; Name2@lat2,lon2" into location payloads. An empty
/// string yields an empty list.
fn parse_locations(spec: &str) -> Vec<LocationPayload> {
    spec.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (name, coords) = entry
                .split_once('@')
                .expect("location entry must look like Name@lat,lon");
            let (lat, lon) = coords
                .split_once(',')
                .expect("coordinates must look like lat,lon");
            LocationPayload {
                name: Some(name.trim().to_string()),
                display_name: None,
                latitude: Some(json!(lat.trim().parse::<f64>().expect("latitude"))),
                longitude: Some(json!(lon.trim().parse::<f64>().expect("longitude"))),
            }
        })
        .collect()
}

async fn create_trip(world: &mut JournalWorld, title: Option<String>, payload: TripPayload) {
    let payload = TripPayload { title, ..payload };
    match trips::create_trip(world.db(), payload).await {
        Ok(trip_id) => {
            world.current_trip = Some(trip_id);
            world.last_error = None;
        }
        Err(err) => world.last_error = Some(err.to_string()),
    }
}

#[given("an empty journal database")]
async fn given_empty_database(world: &mut JournalWorld) {
    world.state = Some(TestState::new().await.expect("state"));
    world.current_trip = None;
    world.last_error = None;
}

#[when(regex = r#"^I create a trip \"([^\"]*)\" with locations \"([^\"]*)\"$"#)]
async fn when_create_trip(world: &mut JournalWorld, title: String, locations: String) {
    let payload = TripPayload {
        locations: Some(parse_locations(&locations)),
        ..TripPayload::default()
    };
    create_trip(world, Some(title), payload).await;
}

#[when(regex = r#"^I create an untitled trip with locations \"([^\"]*)\"$"#)]
async fn when_create_untitled_trip(world: &mut JournalWorld, locations: String) {
    let payload = TripPayload {
        locations: Some(parse_locations(&locations)),
        ..TripPayload::default()
    };
    create_trip(world, None, payload).await;
}

#[when(
    regex = r#"^I create a trip \"([^\"]*)\" described as \"([^\"]*)\" from \"([^\"]*)\" to \"([^\"]*)\" with locations \"([^\"]*)\"$"#
)]
async fn when_create_described_trip(
    world: &mut JournalWorld,
    title: String,
    description: String,
    start_date: String,
    end_date: String,
    locations: String,
) {
    let payload = TripPayload {
        description: Some(description),
        start_date: Some(start_date),
        end_date: Some(end_date),
        locations: Some(parse_locations(&locations)),
        ..TripPayload::default()
    };
    create_trip(world, Some(title), payload).await;
}

#[when(regex = r#"^I update the trip with title \"([^\"]*)\" and locations \"([^\"]*)\"$"#)]
async fn when_update_trip(world: &mut JournalWorld, title: String, locations: String) {
    let payload = TripPayload {
        title: Some(title),
        locations: Some(parse_locations(&locations)),
        ..TripPayload::default()
    };
    match trips::update_trip(world.db(), world.current_trip(), payload).await {
        Ok(_) => world.last_error = None,
        Err(err) => world.last_error = Some(err.to_string()),
    }
}

#[when("a trip row with a garbled timestamp exists")]
async fn when_garbled_trip_row(world: &mut JournalWorld) {
    sqlx::query("INSERT INTO trips (title, description, created_at) VALUES (?1, NULL, ?2)")
        .bind("Broken")
        .bind("not-a-timestamp")
        .execute(world.db())
        .await
        .expect("insert garbled trip row");
}

#[when("I delete the trip")]
async fn when_delete_trip(world: &mut JournalWorld) {
    trips::delete_trip(world.db(), world.current_trip())
        .await
        .expect("delete trip");
}

#[then("the create succeeds")]
async fn then_create_succeeds(world: &mut JournalWorld) {
    assert_eq!(world.last_error, None);
    assert!(world.current_trip.is_some());
}

#[then(regex = r#"^the (?:create|update) fails with \"([^\"]*)\"$"#)]
async fn then_operation_fails(world: &mut JournalWorld, expected: String) {
    let message = world
        .last_error
        .as_deref()
        .expect("the previous operation should have failed");
    assert_eq!(message, expected);
}

#[then(regex = r"^the journal contains (\d+) trips$")]
async fn then_journal_contains(world: &mut JournalWorld, expected: usize) {
    let listed = trips::list_trips(world.db()).await.expect("list trips");
    assert_eq!(listed.len(), expected);
}

#[then(regex = r#"^the journal lists titles \"([^\"]*)\"$"#)]
async fn then_journal_lists_titles(world: &mut JournalWorld, expected: String) {
    let listed = trips::list_trips(world.db()).await.expect("list trips");
    let titles = listed
        .iter()
        .map(|trip| trip.title.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    assert_eq!(titles, expected);
}

#[then(regex = r#"^the trip has (\d+) locations in order \"([^\"]*)\"$"#)]
async fn then_trip_has_locations(world: &mut JournalWorld, count: usize, expected: String) {
    let trip = world.fetch_current_trip().await;
    assert_eq!(trip.locations.len(), count);
    for (index, location) in trip.locations.iter().enumerate() {
        assert_eq!(location.order, index as i64);
    }
    let names = trip
        .locations
        .iter()
        .map(|location| location.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    assert_eq!(names, expected);
}

#[then(regex = r#"^the trip is titled \"([^\"]*)\" with description \"([^\"]*)\"$"#)]
async fn then_trip_titled(world: &mut JournalWorld, title: String, description: String) {
    let trip = world.fetch_current_trip().await;
    assert_eq!(trip.title, title);
    assert_eq!(trip.description.as_deref(), Some(description.as_str()));
}

#[then(regex = r#"^the trip runs from \"([^\"]*)\" to \"([^\"]*)\"$"#)]
async fn then_trip_runs(world: &mut JournalWorld, start_date: String, end_date: String) {
    let trip = world.fetch_current_trip().await;
    assert_eq!(
        trip.start_date.map(|date| date.to_string()),
        Some(start_date)
    );
    assert_eq!(trip.end_date.map(|date| date.to_string()), Some(end_date));
}

#[then(regex = r"^location (\d+) of the trip sits at (-?[\d.]+), (-?[\d.]+)$")]
async fn then_location_sits_at(world: &mut JournalWorld, index: usize, lat: f64, lon: f64) {
    let trip = world.fetch_current_trip().await;
    let location = &trip.locations[index];
    assert_eq!(location.latitude, lat);
    assert_eq!(location.longitude, lon);
}

#[then("no location rows remain")]
async fn then_no_location_rows(world: &mut JournalWorld) {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM locations")
        .fetch_one(world.db())
        .await
        .expect("count locations");
    assert_eq!(count, 0);
}

#[tokio::main]
async fn main() {
    JournalWorld::cucumber()
        .fail_on_skipped()
        .with_default_cli()
        .run("tests/features")
        .await;
}

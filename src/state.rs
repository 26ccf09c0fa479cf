use crate::{config::AppConfig, db::DbPool, services::geocoding::GeocodingClient};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: DbPool,
    pub geocoder: GeocodingClient,
}

impl AppState {
    pub fn new(config: AppConfig, db: DbPool, geocoder: GeocodingClient) -> Self {
        Self {
            config,
            db,
            geocoder,
        }
    }
}

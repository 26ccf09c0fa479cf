use std::{env, net::SocketAddr};

use url::Url;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub listen_addr: SocketAddr,
    pub geocoder_base_url: Url,
    pub geocoder_user_agent: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://travel_journal.db".to_string());
        let listen_addr: SocketAddr = env::var("APP_LISTEN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:5001".to_string())
            .parse()
            .map_err(|err| AppError::Config(format!("invalid APP_LISTEN_ADDR: {err}")))?;

        let geocoder_base_url: Url = env::var("GEOCODER_BASE_URL")
            .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string())
            .parse()
            .map_err(|err| AppError::Config(format!("invalid GEOCODER_BASE_URL: {err}")))?;

        let geocoder_user_agent =
            env::var("GEOCODER_USER_AGENT").unwrap_or_else(|_| "TravelJournalApp/1.0".to_string());

        Ok(Self {
            database_url,
            listen_addr,
            geocoder_base_url,
            geocoder_user_agent,
        })
    }
}

pub mod geocoding;
pub mod trips;

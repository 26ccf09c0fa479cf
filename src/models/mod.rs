pub mod location;
pub mod trip;

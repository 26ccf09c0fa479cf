use tokio::net::TcpListener;
use tracing::{error, info};
use travel_journal::config::AppConfig;
use travel_journal::db::init_pool;
use travel_journal::error::AppError;
use travel_journal::routes::create_router;
use travel_journal::services::geocoding::GeocodingClient;
use travel_journal::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_logging();

    let config = AppConfig::from_env()?;
    let db = init_pool(&config.database_url).await?;

    if let Err(err) = sqlx::migrate!("./migrations").run(&db).await {
        error!("migration failed: {err:?}");
        return Err(AppError::Other(err.into()));
    }

    let geocoder = GeocodingClient::new(
        config.geocoder_base_url.clone(),
        &config.geocoder_user_agent,
    )?;

    let state = AppState::new(config.clone(), db.clone(), geocoder);
    let app = create_router(state);

    let listener = TcpListener::bind(config.listen_addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,travel_journal=debug".into());

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}

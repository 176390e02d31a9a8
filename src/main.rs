use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dayclock_api::{config::Config, db, routes, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let store = db::connect(config.redis_url.as_deref()).await?;
    info!("Allowed origins: {}", config.allowed_origins.join(", "));

    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(config, store)?;
    let app = routes::router(state);

    info!("Day clock API listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

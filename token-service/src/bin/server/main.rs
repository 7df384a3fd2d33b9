use std::net::SocketAddr;
use std::sync::Arc;

use auth::AccessTokenCodec;
use auth::Clock;
use auth::SystemClock;
use auth::TokenHasher;
use sqlx::postgres::PgPoolOptions;
use token_service::config::Config;
use token_service::domain::token::service::RotationManager;
use token_service::inbound::http::router::create_router;
use token_service::inbound::sweeper::ExpiredTokenSweeper;
use token_service::outbound::repositories::PostgresRefreshTokenStore;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "token_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "token-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        access_ttl_seconds = config.jwt.access_ttl_seconds,
        refresh_ttl_seconds = config.tokens.refresh_ttl_seconds,
        seal_at_rest = config.tokens.seal_at_rest,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let codec = Arc::new(AccessTokenCodec::new(
        config.jwt.secret.as_bytes(),
        config.jwt.access_ttl(),
        Arc::clone(&clock),
    )?);
    let hasher = TokenHasher::new(config.tokens.digest_key.as_bytes())?;
    let store = Arc::new(PostgresRefreshTokenStore::new(pg_pool));

    let token_service = Arc::new(RotationManager::new(
        store,
        codec,
        hasher,
        clock,
        config.tokens.rotation_settings(),
    ));

    let sweeper = ExpiredTokenSweeper::new(token_service.clone(), config.tokens.sweep_interval());
    let sweeper_task = sweeper.spawn();

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(token_service);
    let result = axum::serve(
        http_listener,
        http_application.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await;

    sweeper_task.abort();

    if let Err(e) = result {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    tracing::info!("Server exited successfully");
    Ok(())
}

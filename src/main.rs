//! fintrack - Personal finance tracking backend
//!
//! Binary entry point: loads configuration, opens the database, and
//! serves the API until shutdown.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fintrack::api::{build_router, AppState};
use fintrack::auth::JwtService;
use fintrack::{db, Config};

/// Initialize the tracing subscriber. Production gets JSON lines,
/// development gets the human-readable formatter.
fn init_tracing(json_logs: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "fintrack=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(config.is_production());

    tracing::info!("Starting fintrack server");

    let pool = db::connect(&config.database_url, config.database_max_connections).await?;
    db::init_schema(&pool).await?;
    tracing::info!("Database ready at {}", config.database_url);

    let jwt = JwtService::new(
        &config.jwt_secret,
        config.access_token_lifetime_secs,
        config.refresh_token_lifetime_secs,
    );
    let state = AppState {
        pool: pool.clone(),
        jwt,
    };

    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped, closing database pool");
    pool.close().await;

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}

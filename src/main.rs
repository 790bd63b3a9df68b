use std::net::SocketAddr;
use std::sync::Arc;

use food_tracker::api::{self, AppState};
use food_tracker::clock::SystemClock;
use food_tracker::config::Config;
use food_tracker::db::{
    create_pool, run_migrations, FoodItemRepository, MemoryFoodItemRepository,
    PgFoodItemRepository,
};

use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "food_tracker=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    tracing::info!("Starting food-tracker server...");

    // Pick the storage backend
    let repo: Arc<dyn FoodItemRepository> = match &config.database_url {
        Some(url) => {
            tracing::info!("Connecting to database...");
            let pool = create_pool(url, config.db_max_connections).await?;
            run_migrations(&pool).await?;
            tracing::info!("Database connection established");
            Arc::new(PgFoodItemRepository::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory storage");
            Arc::new(MemoryFoodItemRepository::new())
        }
    };

    if config.admin_secret.is_none() {
        tracing::warn!("No admin password configured, gated edits will be refused");
    }

    let state = AppState::build(&config, repo, Arc::new(SystemClock));

    // Start the lifecycle worker
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker = tokio::spawn(
        state
            .lifecycle
            .clone()
            .run(config.refresh_interval, shutdown_rx),
    );

    let app = api::router(state);

    // Parse server address
    let addr: SocketAddr = config.server_addr().parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown_tx.send(true).ok();
    worker.await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}

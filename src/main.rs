use anyhow::Context;
use mediatheque::{
    adapters::{
        clock::SystemClock,
        memory::InMemoryStore,
        postgres::{PostgresCatalog, PostgresLoanLedger, PostgresMembership},
    },
    api::{AppState, create_router},
    application::ServiceDependencies,
    config::{AppConfig, StorageBackend},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("mediatheque={},tower_http=debug", config.logging.level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let service_deps = build_dependencies(&config).await?;

    // Create application state
    let app_state = Arc::new(AppState::new(service_deps, config.auth.staff_token.clone()));
    if app_state.staff_token.is_none() {
        tracing::warn!("No staff token configured; staff endpoints will answer 403");
    }

    // Create router
    let app = create_router(app_state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .context("Server terminated unexpectedly")
}

async fn build_dependencies(config: &AppConfig) -> anyhow::Result<ServiceDependencies> {
    let clock = Arc::new(SystemClock);

    match config.storage.backend {
        StorageBackend::Memory => {
            tracing::info!("Using in-memory storage");
            Ok(ServiceDependencies::from_store(
                Arc::new(InMemoryStore::new()),
                clock,
            ))
        }
        StorageBackend::Postgres => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .connect(&config.database.url)
                .await
                .context("Failed to connect to database")?;

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Connected to PostgreSQL, migrations applied");

            Ok(ServiceDependencies {
                catalog: Arc::new(PostgresCatalog::new(pool.clone())),
                membership: Arc::new(PostgresMembership::new(pool.clone())),
                loan_ledger: Arc::new(PostgresLoanLedger::new(pool)),
                clock,
            })
        }
    }
}

use invest_ledger::{ Config, Result };
use invest_ledger::api::{ router, AppState };
use invest_ledger::settlement::SettlementWorker;
use sea_orm_migration::MigratorTrait;
use tracing_subscriber::{ layer::SubscriberExt, util::SubscriberInitExt };

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber
        ::registry()
        .with(
            tracing_subscriber::EnvFilter
                ::try_from_default_env()
                .unwrap_or_else(|_| "invest_ledger=debug,tower_http=debug".into())
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| invest_ledger::AppError::Config(e.to_string()))?;

    tracing::info!(
        "Starting invest-ledger: {}-day term at {}% daily",
        config.investment_terms.term_days,
        config.investment_terms.daily_interest_percent
    );

    let db = sea_orm::Database::connect(&config.database_url).await?;

    tracing::info!("Database connected successfully");

    migration::Migrator::up(&db, None).await?;

    tracing::info!("Migrations completed successfully");

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let settlement_interval = config.settlement_interval_secs;

    let state = AppState::new(db, config);

    let worker = SettlementWorker::new(
        state.settlement_service.clone(),
        state.auth_service.clone(),
        settlement_interval
    );
    tokio::spawn(worker.start());

    let app = router(state);

    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener
        ::bind(&addr).await
        .map_err(|e| invest_ledger::AppError::Internal(e.to_string()))?;

    axum::serve(listener, app).await.map_err(|e| invest_ledger::AppError::Internal(e.to_string()))?;

    Ok(())
}

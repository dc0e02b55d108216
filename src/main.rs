use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, App, HttpResponse, HttpServer};
use tokio::sync::watch;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use revpay::config::Config;
use revpay::modules::loans::controllers;
use revpay::modules::loans::repositories::{MySqlInstallmentRepository, MySqlLoanRepository};
use revpay::modules::loans::services::{LoanService, OverdueSweeper};
use revpay::modules::notifications::MySqlNotificationSink;
use revpay::modules::users::MySqlUserDirectory;
use revpay::modules::wallets::MySqlLedgerGateway;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "revpay=debug,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().expect("Failed to load configuration");
    config.validate().expect("Configuration validation failed");

    tracing::info!("Starting RevPay Loan & Ledger Engine");
    tracing::info!("Environment: {}", config.app.env);
    tracing::info!("Server binding to: {}", config.server.bind_address());

    // Create database connection pool
    let db_pool = config
        .database
        .create_pool()
        .await
        .expect("Failed to create database pool");

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!(
        "Database pool initialized ({} connections)",
        config.database.pool_size
    );

    // Composition root: all dependencies wired explicitly, no container
    let loans = Arc::new(MySqlLoanRepository::new(db_pool.clone()));
    let installments = Arc::new(MySqlInstallmentRepository::new(db_pool.clone()));
    let users = Arc::new(MySqlUserDirectory::new(db_pool.clone()));
    let ledger = Arc::new(MySqlLedgerGateway::new(db_pool.clone()));
    let notifications = Arc::new(MySqlNotificationSink::new(db_pool.clone()));

    let loan_service = web::Data::new(LoanService::new(
        loans,
        installments.clone(),
        users,
        ledger,
        notifications.clone(),
    ));

    let sweeper = Arc::new(OverdueSweeper::new(installments, notifications));
    let sweeper_data = web::Data::from(sweeper.clone());

    // The sweeper owns its own ticker; shutdown is signalled explicitly
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweep_period = Duration::from_secs(config.sweeper.interval_hours * 3600);
    let sweeper_handle = tokio::spawn(sweeper.start(sweep_period, shutdown_rx));

    // Start HTTP server
    let bind_address = config.server.bind_address();
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(loan_service.clone())
            .app_data(sweeper_data.clone())
            .configure(controllers::configure)
            .route("/health", web::get().to(health_check))
            .route("/", web::get().to(index))
    })
    .bind(&bind_address)?
    .run();

    tracing::info!("Server started at http://{}", bind_address);

    let result = server.await;

    // Stop the ticker and let an in-flight sweep finish
    let _ = shutdown_tx.send(true);
    let _ = sweeper_handle.await;

    result
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "revpay"
    }))
}

async fn index() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "service": "RevPay Loan & Ledger Engine",
        "version": "0.1.0",
        "status": "running"
    }))
}

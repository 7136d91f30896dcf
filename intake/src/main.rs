//! Problem intake HTTP server.

use problem_intake::{
    config::Config,
    repository::PostgresRegistrationRepository,
    server::{build_router, AppState},
};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,problem_intake=debug,tower_http=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting problem intake server");

    let config = Config::from_env()?;
    info!(
        db_host = %config.database.host,
        db_port = config.database.port,
        db_name = %config.database.database,
        db_password_set = config.database.password.is_some(),
        "Configuration loaded"
    );

    if config.session.secret.is_none() {
        warn!("SESSION_SECRET not set, using a generated key; sessions will not survive a restart");
    }

    // Connections are opened on first use, so the server comes up even while
    // the database is down.
    let repository = PostgresRegistrationRepository::connect_lazy(&config.database);

    if config.database.run_migrations {
        match repository.migrate().await {
            Ok(()) => info!("Database migrations applied"),
            Err(e) => error!(error = %e, "Failed to apply migrations, continuing without them"),
        }
    }

    let state = AppState::new(Arc::new(repository));
    let app = build_router(state, &config.session);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            },
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}

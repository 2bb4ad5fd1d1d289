use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use alephic_intake::config::Config;
use alephic_intake::email::{Mailer, SmtpMailer};
use alephic_intake::files::{FileStore, LocalFileStore};
use alephic_intake::sheets::{MemorySheetStore, PgSheetStore, SheetStore};
use alephic_intake::state::{AppState, SharedState};
use alephic_intake::FILES_PATH;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Load config
    let config = Config::from_env().expect("Failed to load configuration");

    // Init tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(&config.log_level)
        }))
        .init();

    tracing::info!("Starting Alephic Labs form intake");

    let sheets: Arc<dyn SheetStore> = match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(database_url)
                .await
                .expect("Failed to connect to database");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .expect("Failed to run migrations");

            tracing::info!("Migrations applied");
            Arc::new(PgSheetStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, submission log is kept in memory only");
            Arc::new(MemorySheetStore::new())
        }
    };

    let files: Arc<dyn FileStore> = Arc::new(LocalFileStore::new(
        config.upload_dir.clone(),
        format!("{}{FILES_PATH}", config.base_url.trim_end_matches('/')),
    ));

    let mailer = config.smtp.as_ref().and_then(|smtp| match SmtpMailer::new(smtp) {
        Ok(mailer) => {
            tracing::info!("SMTP configured");
            Some(Arc::new(mailer) as Arc<dyn Mailer>)
        }
        Err(e) => {
            tracing::warn!("SMTP not available: {e}");
            None
        }
    });

    let addr = SocketAddr::new(config.host, config.port);
    let state: SharedState = Arc::new(AppState::new(config, sheets, files, mailer));

    // Periodically drop expired rate-limit windows
    let cleanup_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(300));
        loop {
            interval.tick().await;
            let max_age = Duration::from_secs(cleanup_state.config.rate_window_secs);
            cleanup_state.submission_limiter.cleanup(max_age);
        }
    });

    let app = alephic_intake::build_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

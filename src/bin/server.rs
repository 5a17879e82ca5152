use clap::{Parser, Subcommand};
use mediashelf::db::{PgCatalogStore, schema};
use mediashelf::server::config::ServerConfig;
use mediashelf::services::{TokenService, auth_service};
use mediashelf::web::create_axum_router;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Print a bcrypt hash for a new admin password
    HashPassword { password: String },
}

fn init_logging(log_dir: &str) -> WorkerGuard {
    // Log to a file: JSON format, daily rotation
    let (file_writer, guard) = tracing_appender::non_blocking(rolling::daily(log_dir, "server.log"));
    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .json();

    // Log to stdout: human-readable format
    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx::query=warn,tower_http=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    guard
}

fn print_password_hash(password: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let hash = auth_service::hash_password(password)?;
    println!("{hash}");
    println!();
    println!("UPDATE users SET password_hash = '{hash}' WHERE username = 'Admin';");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal.");
        return;
    }
    info!("Shutdown signal received, draining connections.");
}

async fn serve(config: ServerConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if config.uses_default_jwt_secret() {
        warn!("JWT_SECRET is not set; using the built-in development secret.");
    }

    // --- Database Pool Setup ---
    let pool = config
        .database
        .pool_options()
        .connect_with(config.database.connect_options()?)
        .await
        .map_err(|e| {
            error!(
                host = %config.database.host,
                database = %config.database.name,
                error = %e,
                "Failed to connect to the database."
            );
            e
        })?;
    info!(
        max_connections = config.database.max_connections,
        "Database pool established."
    );

    schema::ensure_schema(&pool).await?;

    // --- Axum HTTP Server Setup ---
    let store = Arc::new(PgCatalogStore::new(pool.clone()));
    let token_service = Arc::new(TokenService::new(&config.jwt_secret));
    let app = create_axum_router(store, token_service, &config.cors_allowed_origins);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, "HTTP server listening.");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    info!("Server stopped.");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    if let Some(Command::HashPassword { password }) = &args.command {
        return print_password_hash(password);
    }

    let config = ServerConfig::load(args.config.as_deref())?;
    let _log_guard = init_logging(&config.log_dir);
    info!(version = env!("CARGO_PKG_VERSION"), "Starting mediashelf server.");

    serve(config).await
}

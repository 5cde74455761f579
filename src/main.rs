//! Main entry point for the Commons Arena service
//!
//! This is the production entry point that initializes and runs the
//! comparison service with proper error handling, logging, and
//! graceful shutdown.

use anyhow::Result;
use clap::Parser;
use commons_arena::config::AppConfig;
use commons_arena::service::{create_router, AppState};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::Notify;
use tracing::{error, info, warn};

/// Commons Arena - Pairwise image comparison with Elo ratings
#[derive(Parser)]
#[command(
    name = "commons-arena",
    version,
    about = "Pairwise image comparison arena for Wikimedia Commons categories",
    long_about = "Commons Arena serves pairs of images drawn from a Wikimedia Commons category, \
                 selected by a mix of weighted matchmaking policies, and maintains Elo ratings \
                 from the choices viewers submit."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// HTTP port override
    #[arg(long, value_name = "PORT", help = "Override HTTP server port")]
    http_port: Option<u16>,

    /// Category override
    #[arg(
        long,
        value_name = "CATEGORY",
        help = "Override the Commons category items are drawn from"
    )]
    category: Option<String>,

    /// Skip startup seeding
    #[arg(long, help = "Do not pre-populate an empty catalog at startup")]
    no_seed: bool,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Dry run mode (validate config and exit)
    #[arg(
        long,
        help = "Validate configuration and exit without starting service"
    )]
    dry_run: bool,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Wait for shutdown signals (SIGINT, SIGTERM)
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C) signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}

/// Display startup banner with service information
fn display_startup_banner(config: &AppConfig) {
    info!("🖼️  Commons Arena");
    info!("   Service: {}", config.service.name);
    info!("   Log level: {}", config.service.log_level);
    info!("   HTTP port: {}", config.service.http_port);
    info!("   Category: {}", config.media.category);
    info!("   K-factor: {}", config.rating.k_factor);
    info!(
        "   Policy weights: {:?}",
        config.matchmaking.policy_weights.as_array()
    );
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}

/// Load and merge configuration from environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    // Start with environment-based config
    let mut config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path.display());
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(http_port) = args.http_port {
        config.service.http_port = http_port;
    }

    if let Some(category) = &args.category {
        config.media.category = category.clone();
    }

    if args.no_seed {
        config.media.seed_target = 0;
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration (CLI args can override environment/config file)
    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    // Initialize logging early (before any other operations)
    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if args.dry_run {
        info!("Configuration validation successful");
        display_startup_banner(&config);
        info!("Dry run completed - exiting without starting service");
        return Ok(());
    }

    // Display startup information
    display_startup_banner(&config);

    // Initialize application state
    info!("Initializing service components...");
    let app_state = match AppState::new(config.clone()) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    // Pre-populate the catalog so the first comparison has contenders
    app_state.seed_if_empty().await;

    let router = create_router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.service.http_port));
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        error!("Failed to bind {}: {}", addr, e);
        anyhow::anyhow!("Failed to bind {}: {}", addr, e)
    })?;

    // Drain is triggered from here so the timeout below can bound it
    let drain = Arc::new(Notify::new());
    let drain_signal = drain.clone();
    let server = tokio::spawn(
        axum::serve(listener, router)
            .with_graceful_shutdown(async move { drain_signal.notified().await })
            .into_future(),
    );

    info!("✅ Commons Arena is running on {}", addr);
    info!("Press Ctrl+C to shutdown gracefully...");

    // Wait for shutdown signal
    wait_for_shutdown_signal().await;

    // Begin graceful shutdown
    info!("🛑 Shutdown signal received, beginning graceful shutdown...");
    drain.notify_one();

    match tokio::time::timeout(config.shutdown_timeout(), server).await {
        Ok(Ok(Ok(()))) => {
            info!("✅ Graceful shutdown completed successfully");
        }
        Ok(Ok(Err(e))) => {
            error!("Server error during shutdown: {}", e);
        }
        Ok(Err(e)) => {
            error!("Server task failed: {}", e);
        }
        Err(_) => {
            warn!("⚠️  Shutdown timeout exceeded, forcing exit");
        }
    }

    info!("🛑 Commons Arena stopped");
    Ok(())
}

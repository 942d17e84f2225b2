//! libris-meta - Book metadata service
//!
//! Resolves ISBNs to (title, author, cover, genre) for the library catalog,
//! serves the preview/intake HTTP API and runs the backfill jobs.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use libris_common::config::{ConfigOverrides, LibrisConfig};
use libris_meta::config::PipelineConfig;
use libris_meta::services::{backfill_covers, backfill_genres};
use libris_meta::{build_router, AppState, Orchestrator};
use serde_json::json;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command-line arguments for libris-meta
#[derive(Parser, Debug)]
#[command(name = "libris-meta")]
#[command(about = "Book metadata resolution for the libris catalog")]
#[command(version)]
struct Args {
    /// TOML config file
    #[arg(long, global = true, env = "LIBRIS_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database file
    #[arg(long, global = true, env = "LIBRIS_DATABASE")]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Resolve one ISBN and print the result as JSON
    Resolve { isbn: String },
    /// Search a cover image by title and author
    Cover {
        title: String,
        #[arg(long)]
        author: Option<String>,
    },
    /// Infer genres for books with none
    BackfillGenres,
    /// Find covers for books with none
    BackfillCovers,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let port = match &args.command {
        Command::Serve { port } => *port,
        _ => None,
    };
    let overrides = ConfigOverrides {
        config_path: args.config.clone(),
        database_path: args.database.clone(),
        port,
    };

    // Config warnings are emitted before the configured log level is known
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("warn"))
        .finish();
    let config = tracing::subscriber::with_default(bootstrap, || LibrisConfig::resolve(overrides))
        .context("Failed to resolve configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str())),
        )
        .init();

    info!(
        "Starting libris-meta v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Database: {}", config.database_path.display());

    let pool = libris_common::db::init_database(&config.database_path)
        .await
        .context("Failed to open database")?;

    let pipeline = PipelineConfig::from_settings(&config.providers)?;
    let orchestrator = Arc::new(
        Orchestrator::with_pool(pool.clone(), pipeline)
            .context("Failed to build provider clients")?,
    );

    match args.command {
        Command::Serve { .. } => {
            let state = AppState::new(pool, orchestrator);
            let app = build_router(state);

            let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;
            info!("Listening on http://{}", addr);
            info!("Health check: http://{}/health", addr);

            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            info!("Shutdown complete");
        }
        Command::Resolve { isbn } => {
            let resolution = orchestrator.resolve(&isbn).await;
            let output = json!({
                "isbn": isbn.trim(),
                "book": resolution.book,
                "source": resolution.source,
                "store_error": resolution.store_error.map(|e| e.to_string()),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Cover { title, author } => {
            let cover_url = orchestrator.find_cover(&title, author.as_deref()).await;
            println!("{}", serde_json::to_string_pretty(&json!({ "cover_url": cover_url }))?);
        }
        Command::BackfillGenres => {
            let report = backfill_genres(&pool, &orchestrator).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::BackfillCovers => {
            let report = backfill_covers(&pool, &orchestrator).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

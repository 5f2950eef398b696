// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Meno Stats server
//!
//! Runs the once-a-minute sampler of the game's "who's online" page next to
//! a read-only API over the collected activity.

use meno_stats::{
    config::{Config, StorageBackend},
    db::{Db, FirestoreDb, MemoryDb},
    services::Sampler,
    AppState,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Meno Stats");

    // Initialize the store
    let db: Db = match config.storage_backend {
        StorageBackend::Firestore => FirestoreDb::new(&config.gcp_project_id).await?.into(),
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory store; collected activity will not be persisted");
            MemoryDb::new().into()
        }
    };

    // Start the sampler
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sampler = if config.sampler_enabled {
        let sampler = Sampler::from_config(db.clone(), &config)?;
        Some(tokio::spawn(sampler.run(shutdown_rx)))
    } else {
        tracing::info!("Sampler disabled");
        None
    };

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
    });

    // Build router
    let app = meno_stats::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown requested");
        })
        .await?;

    let _ = shutdown_tx.send(true);
    if let Some(handle) = sampler {
        handle.await?;
    }
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("meno_stats=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}

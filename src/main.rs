//! Maxbytes Cache - demo driver
//!
//! Inserts integers into a bounded cache until a configured count is reached
//! or the process is interrupted, logging the estimated cache size as it goes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context as _;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use maxbytes_cache::{BoundedCache, Config};

/// Main entry point for the demo driver.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the bounded cache, validating the value type
/// 4. Run the insert loop on a blocking task
/// 5. Stop on completion, Ctrl+C or SIGTERM and print statistics
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "maxbytes_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: limit_bytes={}, map_entry_overhead={}, demo_inserts={}, report_every={}",
        config.limit_bytes, config.map_entry_overhead, config.demo_inserts, config.report_every
    );

    let cache = BoundedCache::<i64>::with_overhead(config.limit_bytes, config.overhead())
        .context("failed to create cache")?;
    let cache = Arc::new(cache);
    let stop = Arc::new(AtomicBool::new(false));

    let signal_handle = tokio::spawn({
        let stop = Arc::clone(&stop);
        async move {
            shutdown_signal().await;
            stop.store(true, Ordering::Relaxed);
        }
    });

    let driver = tokio::task::spawn_blocking({
        let cache = Arc::clone(&cache);
        let stop = Arc::clone(&stop);
        let config = config.clone();
        move || drive(&cache, &config, &stop)
    });

    let inserted = driver.await??;
    signal_handle.abort();

    info!("Demo finished after {} inserts", inserted);
    let stats = serde_json::to_string_pretty(&cache.stats())?;
    println!("{}", stats);

    Ok(())
}

/// Inserts `i -> i` until the configured count is reached or `stop` is set.
fn drive(cache: &BoundedCache<i64>, config: &Config, stop: &AtomicBool) -> anyhow::Result<u64> {
    let mut i: u64 = 0;
    while !stop.load(Ordering::Relaxed) {
        if config.demo_inserts > 0 && i >= config.demo_inserts {
            break;
        }
        if i % config.report_every == 0 {
            info!("[{}] estimated size: {} bytes", i, cache.estimated_size()?);
        }
        cache.set(i.to_string(), i as i64)?;
        i += 1;
    }
    Ok(i)
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, stopping...");
        }
        _ = terminate => {
            info!("Received SIGTERM, stopping...");
        }
    }
}

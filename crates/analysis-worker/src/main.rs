//! Analysis Worker
//!
//! Reads finished games as JSON move histories, analyzes each one with a
//! pool of UCI engines and prints one JSON analysis per line.
//!
//! Usage: analysis-worker [--depth N] game.json...

use std::path::PathBuf;
use std::sync::Arc;

use analysis_worker::{analyze_game, UciEngine, WorkerConfig, WorkerError};
use chess_core::parse_history;
use futures::future::join_all;
use serde_json::json;
use tokio::sync::{Mutex, Semaphore};
use tracing::{error, info, warn};

struct Args {
    depth: Option<u8>,
    files: Vec<PathBuf>,
}

fn parse_args() -> Result<Args, WorkerError> {
    let mut depth = None;
    let mut files = Vec::new();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--depth" {
            let value = args
                .next()
                .ok_or(WorkerError::Config("--depth needs a value"))?;
            depth = Some(
                value
                    .parse()
                    .map_err(|_| WorkerError::Config("--depth must be a number"))?,
            );
        } else {
            files.push(PathBuf::from(arg));
        }
    }
    if files.is_empty() {
        return Err(WorkerError::Config("no game files given"));
    }
    Ok(Args { depth, files })
}

async fn analyze_file(
    engine: &Mutex<UciEngine>,
    path: &PathBuf,
    depth: u8,
    max_depth: u8,
) -> Result<serde_json::Value, WorkerError> {
    let text = tokio::fs::read_to_string(path).await?;
    let moves: Vec<_> = parse_history(&text)?.iter().map(|r| r.to_move()).collect();
    let mut engine = engine.lock().await;
    let analysis = analyze_game(&mut *engine, &moves, depth, max_depth).await?;
    Ok(json!({ "file": path.display().to_string(), "analysis": analysis }))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load .env file for local dev
    let _ = dotenvy::dotenv();

    let args = parse_args()?;
    let config = WorkerConfig::from_env();
    let depth = args.depth.unwrap_or(config.depth);
    info!(
        stockfish_path = %config.stockfish_path,
        depth,
        max_depth = config.max_depth,
        "Worker config loaded"
    );

    // One engine process per slot; never more than there are games.
    let num_workers = config.engines.min(args.files.len()).max(1);
    info!(num_workers, "Creating engine pool");
    let mut engines: Vec<Arc<Mutex<UciEngine>>> = Vec::with_capacity(num_workers);
    for i in 0..num_workers {
        let engine = UciEngine::spawn(&config.stockfish_path, config.engine_options()).await?;
        info!(engine_id = i, "Engine ready");
        engines.push(Arc::new(Mutex::new(engine)));
    }

    let semaphore = Arc::new(Semaphore::new(num_workers));
    let jobs = args.files.into_iter().enumerate().map(|(i, path)| {
        let engine = engines[i % num_workers].clone();
        let semaphore = semaphore.clone();
        let max_depth = config.max_depth;
        async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return;
            };
            match analyze_file(&engine, &path, depth, max_depth).await {
                Ok(line) => {
                    info!(file = %path.display(), "Analysis complete");
                    println!("{line}");
                }
                Err(WorkerError::DepthOutOfRange { depth, max }) => {
                    warn!(file = %path.display(), depth, max, "Depth rejected");
                }
                Err(e) => error!(file = %path.display(), error = %e, "Analysis failed"),
            }
        }
    });
    let all = join_all(jobs);

    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        tokio::select! {
            _ = all => info!("All games analyzed"),
            _ = sigterm.recv() => info!("Received SIGTERM, abandoning remaining games"),
        }
    }

    #[cfg(not(unix))]
    {
        all.await;
        info!("All games analyzed");
    }

    info!("Shutting down engines");
    for engine in engines {
        engine.lock().await.quit().await;
    }

    Ok(())
}

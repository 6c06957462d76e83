use std::time::Duration;

use game_server::{GameServer, ServerConfig};

use tracing_subscriber::EnvFilter;

const ARCHIVE_DRAIN: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = ServerConfig::from_env();
    tracing::info!(
        default_promotion = %config.default_promotion,
        clock_tick_ms = config.clock_tick.as_millis() as u64,
        auto_fifty_move_draw = config.auto_fifty_move_draw,
        "Server config loaded"
    );

    let (server, mut archive) = GameServer::with_archive(config);

    // Finished games are written out as JSON lines for whatever persists them.
    let archiver = tokio::spawn(async move {
        while let Some(record) = archive.recv().await {
            match serde_json::to_string(&record) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::warn!(game_id = record.id, error = %e, "Failed to encode game record"),
            }
        }
    });

    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        tokio::select! {
            _ = tokio::signal::ctrl_c() => tracing::info!("Received Ctrl-C"),
            _ = sigterm.recv() => tracing::info!("Received SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        tracing::info!("Received Ctrl-C");
    }

    server.shutdown().await;
    // The archive channel closes once the last server handle is gone, which
    // lets the archiver write out whatever is still queued.
    drop(server);
    match tokio::time::timeout(ARCHIVE_DRAIN, archiver).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!(error = %e, "Archiver task failed"),
        Err(_) => tracing::warn!("Archiver did not drain in time, finished games may be lost"),
    }
    tracing::info!("Shutdown complete");
    Ok(())
}

use crate::cli::args::WatchArgs;
use crate::cli::commands::{exit_codes, load_app_config};
use ballotwatch_core::storage::Store;
use ballotwatch_core::sync::{RealTimeElectionService, SyncConfig};
use std::sync::Arc;
use tokio::time::Duration;

pub async fn run(args: WatchArgs) -> anyhow::Result<i32> {
    let cfg = load_app_config(args.config.as_deref())?;
    let db = args.db.unwrap_or_else(|| cfg.db_path.clone());
    let interval_ms = args.interval_ms.unwrap_or(cfg.poll_interval_ms);
    let limit = args.limit.unwrap_or(cfg.upcoming_limit);

    let store = Store::open(&db)?;
    store.init_schema()?;

    let service = RealTimeElectionService::new(
        Arc::new(store),
        SyncConfig {
            interval: Duration::from_millis(interval_ms),
            upcoming_limit: limit,
        },
    );

    let _sub = service.subscribe(|snap| {
        println!(
            "[{}] {} upcoming election(s)  source={}",
            snap.last_updated.format("%H:%M:%S"),
            snap.elections.len(),
            snap.source
        );
    });

    service.start().await?;
    eprintln!("watching for updates every {}ms; press Ctrl-C to stop", interval_ms);

    tokio::signal::ctrl_c().await?;
    service.stop().await;
    eprintln!("stopped");
    Ok(exit_codes::OK)
}

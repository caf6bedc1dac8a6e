use crate::cli::args::CountdownArgs;
use crate::cli::commands::{exit_codes, load_app_config};
use anyhow::Context;
use ballotwatch_core::countdown::{self, DisplayMode};
use ballotwatch_core::storage::Store;
use chrono::Utc;
use std::io::Write;
use tokio::time::{interval, Duration};

pub async fn run(args: CountdownArgs) -> anyhow::Result<i32> {
    let unit: DisplayMode = args.unit.parse()?;

    let target = match (&args.target, &args.election_id) {
        (Some(t), _) => t.clone(),
        (None, Some(id)) => {
            let cfg = load_app_config(args.config.as_deref())?;
            let db = args.db.unwrap_or_else(|| cfg.db_path.clone());
            let store = Store::open(&db)?;
            store.init_schema()?;
            let row = store
                .get_election(id)?
                .with_context(|| format!("no election with id '{}'", id))?;
            eprintln!("{} — {}", row.office_name, row.election_dt);
            row.election_dt
        }
        (None, None) => anyhow::bail!("pass an election id or --target"),
    };

    let mut ticker = interval(Duration::from_millis(args.tick_ms.max(1)));
    let mut frames_left = args.frames;
    let mut stdout = std::io::stdout();

    loop {
        ticker.tick().await;
        // Recomputed from the timestamp difference every frame; no
        // accumulated remainder, so fast ticks cannot drift.
        let remaining = countdown::time_remaining_str(&target, Utc::now());
        write!(stdout, "\r{}", countdown::format_remaining(&remaining, unit))?;
        stdout.flush()?;

        if remaining.is_elapsed() {
            break;
        }
        if let Some(n) = frames_left.as_mut() {
            if *n <= 1 {
                break;
            }
            *n -= 1;
        }
    }
    writeln!(stdout)?;
    Ok(exit_codes::OK)
}

use crate::cli::args::ListArgs;
use crate::cli::commands::{exit_codes, load_app_config};
use ballotwatch_core::fetch::ElectionFetcher;
use ballotwatch_core::filter::apply_filters;
use ballotwatch_core::model::{Election, FilterOptions, Trend};
use ballotwatch_core::storage::Store;
use chrono::Utc;
use std::sync::Arc;

pub async fn run(args: ListArgs) -> anyhow::Result<i32> {
    let cfg = load_app_config(args.config.as_deref())?;
    let db = args.db.unwrap_or_else(|| cfg.db_path.clone());

    let store = Store::open(&db)?;
    store.init_schema()?;
    let fetcher = ElectionFetcher::new(Arc::new(store));

    let elections = if args.upcoming {
        fetcher.fetch_upcoming(Utc::now(), args.limit).await?
    } else {
        fetcher.fetch_all().await?
    };

    let filters = FilterOptions {
        party: args.party,
        state: args.state,
        election_type: args.election_type,
    };
    let filtered = apply_filters(&elections, &filters);

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&filtered)?);
        return Ok(exit_codes::OK);
    }

    if filtered.is_empty() {
        // distinct from a fetch error: the read worked, the filters matched nothing
        println!("no elections match");
        return Ok(exit_codes::OK);
    }

    for e in &filtered {
        print_election(e);
    }
    println!("{} election(s)", filtered.len());
    Ok(exit_codes::OK)
}

fn print_election(e: &Election) {
    println!(
        "{}  {:<8} {:<2}  {}",
        e.date.format("%Y-%m-%d"),
        e.kind,
        e.state,
        e.title
    );
    if !e.candidates.is_empty() {
        let line: Vec<String> = e
            .candidates
            .iter()
            .map(|c| {
                format!(
                    "{} ({}) {}%{} {}",
                    c.name,
                    c.party,
                    c.polling_percentage,
                    if c.incumbent { "*" } else { "" },
                    trend_arrow(c.trend)
                )
            })
            .collect();
        println!("            {}", line.join(" | "));
    }
}

fn trend_arrow(trend: Trend) -> &'static str {
    match trend {
        Trend::Up => "↑",
        Trend::Down => "↓",
        Trend::Stable => "→",
    }
}

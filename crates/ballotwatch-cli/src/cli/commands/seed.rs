use crate::cli::args::SeedArgs;
use crate::cli::commands::{exit_codes, load_app_config};
use anyhow::Context;
use ballotwatch_core::storage::rows::{CandidateRow, ElectionRow};
use ballotwatch_core::storage::{store::db_timestamp, Store};
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct SeedFile {
    elections: Vec<SeedElection>,
}

#[derive(Debug, Deserialize)]
struct SeedElection {
    #[serde(flatten)]
    election: ElectionRow,
    #[serde(default)]
    candidates: Vec<SeedCandidate>,
}

#[derive(Debug, Deserialize)]
struct SeedCandidate {
    id: String,
    name: String,
    party: String,
    #[serde(default)]
    incumbent: bool,
    #[serde(default)]
    poll_pct: f64,
    #[serde(default)]
    intent_pct: f64,
    #[serde(default)]
    endorsements: u32,
    #[serde(default)]
    last_polled: Option<String>,
}

pub async fn run(args: SeedArgs) -> anyhow::Result<i32> {
    let cfg = load_app_config(args.config.as_deref())?;
    let db = args.db.unwrap_or_else(|| cfg.db_path.clone());

    let raw = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read seed file {}", args.file.display()))?;
    let seed: SeedFile = serde_yaml::from_str(&raw)
        .with_context(|| format!("failed to parse seed file {}", args.file.display()))?;

    let store = Store::open(&db)?;
    store.init_schema()?;

    let mut elections = 0usize;
    let mut candidates = 0usize;
    for entry in seed.elections {
        let mut row = entry.election;
        // Normalize to the store's canonical timestamp format so date
        // ordering stays lexicographic.
        let dt = DateTime::parse_from_rfc3339(&row.election_dt)
            .with_context(|| format!("election {}: bad election_dt {:?}", row.id, row.election_dt))?
            .with_timezone(&Utc);
        row.election_dt = db_timestamp(dt);

        store.upsert_election(&row)?;
        elections += 1;

        for c in entry.candidates {
            store.upsert_candidate(&CandidateRow {
                id: c.id,
                election_id: row.id.clone(),
                name: c.name,
                party: c.party,
                incumbent: c.incumbent,
                poll_pct: c.poll_pct,
                intent_pct: c.intent_pct,
                endorsements: c.endorsements,
                last_polled: c.last_polled,
            })?;
            candidates += 1;
        }
    }

    eprintln!(
        "seeded {} election(s), {} candidate(s) into {}",
        elections,
        candidates,
        db.display()
    );
    Ok(exit_codes::OK)
}

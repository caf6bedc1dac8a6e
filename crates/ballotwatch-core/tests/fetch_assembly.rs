mod common;

use ballotwatch_core::fetch::ElectionFetcher;
use ballotwatch_core::model::Trend;
use ballotwatch_core::storage::Store;
use chrono::Utc;
use common::{candidate_row, days_from_now, election_row, ScriptedSource};
use std::collections::HashSet;
use std::sync::Arc;

fn seeded_store() -> anyhow::Result<Store> {
    let store = Store::memory()?;
    store.init_schema()?;
    store.upsert_election(&election_row("e1", "Federal", "OH", &days_from_now(30), false))?;
    store.upsert_election(&election_row("e2", "State", "TX", &days_from_now(10), true))?;
    store.upsert_election(&election_row("e3", "Local", "CA", &days_from_now(-5), false))?;
    store.upsert_candidate(&candidate_row("c1", "e1", "A. Smith", "Democratic", 44.0))?;
    store.upsert_candidate(&candidate_row("c2", "e1", "B. Jones", "Republican", 48.5))?;
    store.upsert_candidate(&candidate_row("c3", "e2", "C. Brown", "Independent", 12.0))?;
    Ok(store)
}

#[tokio::test]
async fn grouping_places_every_candidate_exactly_once() -> anyhow::Result<()> {
    let store = seeded_store()?;
    let fetcher = ElectionFetcher::new(Arc::new(store));

    let elections = fetcher.fetch_all().await?;
    assert_eq!(elections.len(), 3);

    let mut seen = HashSet::new();
    for e in &elections {
        for c in &e.candidates {
            assert!(seen.insert(c.name.clone()), "candidate {} duplicated", c.name);
        }
    }
    assert_eq!(seen.len(), 3, "a candidate was dropped");

    // e3 has no candidates: empty list, never absent
    let e3 = elections.iter().find(|e| e.id == "e3").unwrap();
    assert!(e3.candidates.is_empty());
    Ok(())
}

#[tokio::test]
async fn candidates_keep_polling_order_within_election() -> anyhow::Result<()> {
    let store = seeded_store()?;
    let fetcher = ElectionFetcher::new(Arc::new(store));

    let elections = fetcher.fetch_all().await?;
    let e1 = elections.iter().find(|e| e.id == "e1").unwrap();
    let names: Vec<_> = e1.candidates.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["B. Jones", "A. Smith"]);
    assert_eq!(e1.candidates[0].polling_percentage, 49); // 48.5 rounded
    assert_eq!(e1.candidates[0].trend, Trend::Up);
    Ok(())
}

#[tokio::test]
async fn display_mapping_matches_the_row() -> anyhow::Result<()> {
    let store = seeded_store()?;
    let fetcher = ElectionFetcher::new(Arc::new(store));

    let elections = fetcher.fetch_all().await?;
    let e2 = elections.iter().find(|e| e.id == "e2").unwrap();
    assert_eq!(e2.kind, "Special"); // is_special beats office level
    assert_eq!(e2.title, "Office e2");
    assert_eq!(e2.description, "State election in TX");
    assert_eq!(e2.key_races, vec!["Office e2".to_string()]);
    Ok(())
}

#[tokio::test]
async fn fetch_upcoming_excludes_past_elections() -> anyhow::Result<()> {
    let store = seeded_store()?;
    let fetcher = ElectionFetcher::new(Arc::new(store));

    let upcoming = fetcher.fetch_upcoming(Utc::now(), 50).await?;
    let ids: Vec<_> = upcoming.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["e2", "e1"]);
    Ok(())
}

#[tokio::test]
async fn candidate_read_failure_degrades_to_empty_lists() -> anyhow::Result<()> {
    let source = ScriptedSource::new(vec![election_row(
        "e1",
        "Federal",
        "OH",
        &days_from_now(30),
        false,
    )]);
    source.set_candidates(vec![candidate_row("c1", "e1", "A", "Democratic", 40.0)]);
    source.fail_candidates(true);

    let fetcher = ElectionFetcher::new(Arc::new(source));
    let elections = fetcher.fetch_all().await?;
    assert_eq!(elections.len(), 1);
    assert!(elections[0].candidates.is_empty());
    Ok(())
}

#[tokio::test]
async fn election_read_failure_fails_the_whole_fetch() {
    let source = ScriptedSource::new(vec![]);
    source.push_script(0, Err("storage unavailable"));

    let fetcher = ElectionFetcher::new(Arc::new(source));
    let err = fetcher.fetch_all().await.unwrap_err();
    assert!(err.to_string().contains("failed to fetch elections"));
}

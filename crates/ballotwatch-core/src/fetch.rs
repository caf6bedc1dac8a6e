use crate::model::{Candidate, Election, OfficeLevel, Trend};
use crate::source::ElectionSource;
use crate::storage::rows::{CandidateRow, ElectionRow};
use anyhow::Context;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;

pub const DEFAULT_UPCOMING_LIMIT: u32 = 50;

/// Joins election and candidate rows into the display model.
#[derive(Clone)]
pub struct ElectionFetcher {
    source: Arc<dyn ElectionSource>,
}

impl ElectionFetcher {
    pub fn new(source: Arc<dyn ElectionSource>) -> Self {
        Self { source }
    }

    /// Every election on record, candidates joined in.
    ///
    /// An election read failure fails the whole fetch. A candidate read
    /// failure alone is non-critical: elections still render, with empty
    /// candidate lists.
    pub async fn fetch_all(&self) -> anyhow::Result<Vec<Election>> {
        let rows = self
            .source
            .elections()
            .await
            .context("failed to fetch elections")?;
        self.assemble(rows).await
    }

    /// Elections with `date >= now`, bounded, for the real-time snapshot.
    pub async fn fetch_upcoming(
        &self,
        now: DateTime<Utc>,
        limit: u32,
    ) -> anyhow::Result<Vec<Election>> {
        let rows = self
            .source
            .upcoming_elections(now, limit)
            .await
            .context("failed to fetch upcoming elections")?;
        self.assemble(rows).await
    }

    async fn assemble(&self, rows: Vec<ElectionRow>) -> anyhow::Result<Vec<Election>> {
        let candidates = match self.source.candidates().await {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(
                    event = "fetch.candidates_degraded",
                    error = %e,
                    "candidate read failed; continuing with empty candidate lists"
                );
                Vec::new()
            }
        };

        // Group by owning election; rows arrive poll_pct descending and the
        // grouping keeps that order within each election.
        let mut by_election: HashMap<String, Vec<CandidateRow>> = HashMap::new();
        for c in candidates {
            by_election.entry(c.election_id.clone()).or_default().push(c);
        }

        rows.into_iter()
            .map(|row| {
                let grouped = by_election.remove(&row.id).unwrap_or_default();
                map_election(row, grouped)
            })
            .collect()
    }
}

fn map_election(row: ElectionRow, candidates: Vec<CandidateRow>) -> anyhow::Result<Election> {
    let level: OfficeLevel = row
        .office_level
        .parse()
        .with_context(|| format!("election {}", row.id))?;
    let date = DateTime::parse_from_rfc3339(&row.election_dt)
        .with_context(|| format!("election {}: bad election_dt {:?}", row.id, row.election_dt))?
        .with_timezone(&Utc);

    let kind = if row.is_special {
        "Special".to_string()
    } else {
        level.as_str().to_string()
    };
    let description = match row.description {
        Some(d) if !d.is_empty() => d,
        _ => format!("{} election in {}", level.as_str(), row.state),
    };

    Ok(Election {
        id: row.id,
        title: row.office_name.clone(),
        date,
        kind,
        state: row.state,
        description,
        candidates: candidates.into_iter().map(map_candidate).collect(),
        key_races: vec![row.office_name],
    })
}

fn map_candidate(row: CandidateRow) -> Candidate {
    Candidate {
        name: row.name,
        party: row.party,
        polling_percentage: row.poll_pct.round().clamp(0.0, 100.0) as u8,
        incumbent: row.incumbent,
        trend: Trend::from_poll_pct(row.poll_pct),
        endorsements: row.endorsements,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, level: &str, state: &str, special: bool) -> ElectionRow {
        ElectionRow {
            id: id.into(),
            office_name: "US Senate".into(),
            office_level: level.into(),
            state: state.into(),
            election_dt: "2026-11-03T12:00:00Z".into(),
            is_special: special,
            description: None,
        }
    }

    #[test]
    fn synthesizes_description_when_absent() {
        let e = map_election(row("e1", "Federal", "OH", false), vec![]).unwrap();
        assert_eq!(e.description, "Federal election in OH");
        assert_eq!(e.kind, "Federal");
        assert!(e.candidates.is_empty());
    }

    #[test]
    fn special_flag_wins_the_type_label() {
        let e = map_election(row("e1", "State", "TX", true), vec![]).unwrap();
        assert_eq!(e.kind, "Special");
    }

    #[test]
    fn keeps_stored_description() {
        let mut r = row("e1", "Local", "CA", false);
        r.description = Some("Mayoral runoff".into());
        let e = map_election(r, vec![]).unwrap();
        assert_eq!(e.description, "Mayoral runoff");
    }

    #[test]
    fn rejects_unknown_office_level() {
        assert!(map_election(row("e1", "County", "CA", false), vec![]).is_err());
    }

    #[test]
    fn polling_pct_rounds_and_clamps() {
        let c = map_candidate(CandidateRow {
            id: "c1".into(),
            election_id: "e1".into(),
            name: "A".into(),
            party: "Independent".into(),
            incumbent: false,
            poll_pct: 41.6,
            intent_pct: 0.0,
            endorsements: 3,
            last_polled: None,
        });
        assert_eq!(c.polling_percentage, 42);
        assert_eq!(c.trend, Trend::Up);
        assert_eq!(c.endorsements, 3);
    }
}

//! Dataset completeness checks.
//!
//! Aggregates the election relation against configured coverage floors and
//! produces a [`DataStatus`]. Pure read-side aggregation: a failed read
//! propagates as an error, it is never folded into a synthetic
//! "not comprehensive" status that would mask the outage.

use crate::model::{DataStatus, OfficeLevel};
use crate::source::ElectionSource;
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// The 50 states plus DC.
pub const REQUIRED_STATES: [&str; 51] = [
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN", "IA",
    "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ",
    "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT",
    "VA", "WA", "WV", "WI", "WY", "DC",
];

/// Coverage floors. These read like product requirements rather than
/// invariants and have shifted between revisions, so they are injectable
/// configuration, not constants baked into the validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletenessConfig {
    #[serde(default = "default_min_total")]
    pub min_total: usize,
    #[serde(default = "default_min_per_level")]
    pub min_per_level: usize,
    #[serde(default = "default_required_states")]
    pub required_states: Vec<String>,
}

fn default_min_total() -> usize {
    160
}

fn default_min_per_level() -> usize {
    50
}

fn default_required_states() -> Vec<String> {
    REQUIRED_STATES.iter().map(|s| s.to_string()).collect()
}

impl Default for CompletenessConfig {
    fn default() -> Self {
        Self {
            min_total: default_min_total(),
            min_per_level: default_min_per_level(),
            required_states: default_required_states(),
        }
    }
}

pub struct CompletenessValidator {
    source: Arc<dyn ElectionSource>,
    config: CompletenessConfig,
}

impl CompletenessValidator {
    pub fn new(source: Arc<dyn ElectionSource>, config: CompletenessConfig) -> Self {
        Self { source, config }
    }

    /// Recompute the completeness snapshot from the current election rows.
    /// Deterministic: the same rows and the same `now` produce an identical
    /// status.
    pub async fn verify(&self, now: DateTime<Utc>) -> anyhow::Result<DataStatus> {
        let elections = self
            .source
            .elections()
            .await
            .context("failed to read elections for completeness check")?;

        let mut federal = 0usize;
        let mut state = 0usize;
        let mut local = 0usize;
        let mut upcoming = 0usize;
        let mut states = BTreeSet::new();

        for row in &elections {
            match row.office_level.parse::<OfficeLevel>() {
                Ok(OfficeLevel::Federal) => federal += 1,
                Ok(OfficeLevel::State) => state += 1,
                Ok(OfficeLevel::Local) => local += 1,
                Err(e) => return Err(e).context(format!("election {}", row.id)),
            }
            if is_future(&row.election_dt, now) {
                upcoming += 1;
            }
            states.insert(row.state.clone());
        }

        let total = elections.len();
        let mut missing = Vec::new();

        if total < self.config.min_total {
            missing.push(format!(
                "Need {} more elections (currently {})",
                self.config.min_total - total,
                total
            ));
        }
        if federal < self.config.min_per_level {
            missing.push(format!(
                "Need {} more federal elections",
                self.config.min_per_level - federal
            ));
        }
        if state < self.config.min_per_level {
            missing.push(format!(
                "Need {} more state elections",
                self.config.min_per_level - state
            ));
        }
        if local < self.config.min_per_level {
            missing.push(format!(
                "Need {} more local elections",
                self.config.min_per_level - local
            ));
        }

        let missing_states: Vec<&str> = self
            .config
            .required_states
            .iter()
            .filter(|s| !states.contains(s.as_str()))
            .map(|s| s.as_str())
            .collect();
        if !missing_states.is_empty() {
            missing.push(format!("Missing states: {}", missing_states.join(", ")));
        }

        Ok(DataStatus {
            total_elections: total,
            federal_elections: federal,
            state_elections: state,
            local_elections: local,
            upcoming_elections: upcoming,
            states_covered: states.into_iter().collect(),
            is_comprehensive: missing.is_empty(),
            missing_requirements: missing,
        })
    }
}

fn is_future(election_dt: &str, now: DateTime<Utc>) -> bool {
    match DateTime::parse_from_rfc3339(election_dt) {
        Ok(dt) => dt.with_timezone(&Utc) > now,
        Err(_) => false,
    }
}

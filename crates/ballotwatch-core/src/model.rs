use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OfficeLevel {
    Federal,
    State,
    Local,
}

impl OfficeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfficeLevel::Federal => "Federal",
            OfficeLevel::State => "State",
            OfficeLevel::Local => "Local",
        }
    }
}

impl FromStr for OfficeLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Federal" => Ok(OfficeLevel::Federal),
            "State" => Ok(OfficeLevel::State),
            "Local" => Ok(OfficeLevel::Local),
            other => anyhow::bail!("unknown office level: {}", other),
        }
    }
}

/// Polling trend shown next to a candidate.
///
/// No polling history is persisted, so this is a placeholder heuristic
/// banded on the raw figure rather than a derivative of past snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl Trend {
    pub fn from_poll_pct(poll_pct: f64) -> Self {
        if poll_pct > 40.0 {
            Trend::Up
        } else if poll_pct < 20.0 {
            Trend::Down
        } else {
            Trend::Stable
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub name: String,
    pub party: String,
    pub polling_percentage: u8,
    pub incumbent: bool,
    pub trend: Trend,
    pub endorsements: u32,
}

/// Display model for a single contest, with candidates already joined in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Election {
    pub id: String,
    pub title: String,
    pub date: DateTime<Utc>,
    /// "Special" when the special flag is set, else the office level label.
    #[serde(rename = "type")]
    pub kind: String,
    pub state: String,
    pub description: String,
    pub candidates: Vec<Candidate>,
    pub key_races: Vec<String>,
}

/// One fetch-and-broadcast result as delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub elections: Vec<Election>,
    pub last_updated: DateTime<Utc>,
    pub source: String,
}

pub const FILTER_WILDCARD: &str = "all";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub party: String,
    pub state: String,
    pub election_type: String,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            party: FILTER_WILDCARD.into(),
            state: FILTER_WILDCARD.into(),
            election_type: FILTER_WILDCARD.into(),
        }
    }
}

/// Aggregate completeness view, recomputed on demand and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataStatus {
    pub total_elections: usize,
    pub federal_elections: usize,
    pub state_elections: usize,
    pub local_elections: usize,
    pub upcoming_elections: usize,
    pub states_covered: Vec<String>,
    pub is_comprehensive: bool,
    pub missing_requirements: Vec<String>,
}

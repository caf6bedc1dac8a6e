use serde::{Deserialize, Serialize};

/// Raw election row, shaped like the `elections` relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectionRow {
    pub id: String,
    pub office_name: String,
    pub office_level: String,
    pub state: String,
    pub election_dt: String,
    pub is_special: bool,
    #[serde(default)]
    pub description: Option<String>,
}

/// Raw candidate row, shaped like the `candidates` relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRow {
    pub id: String,
    pub election_id: String,
    pub name: String,
    pub party: String,
    #[serde(default)]
    pub incumbent: bool,
    #[serde(default)]
    pub poll_pct: f64,
    #[serde(default)]
    pub intent_pct: f64,
    #[serde(default)]
    pub endorsements: u32,
    #[serde(default)]
    pub last_polled: Option<String>,
}

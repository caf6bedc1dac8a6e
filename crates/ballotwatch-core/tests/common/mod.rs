#![allow(dead_code)] // not every test binary uses every helper

use async_trait::async_trait;
use ballotwatch_core::source::ElectionSource;
use ballotwatch_core::storage::rows::{CandidateRow, ElectionRow};
use ballotwatch_core::storage::{Relation, StoreEvent};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::sync::broadcast;

pub fn election_row(id: &str, level: &str, state: &str, dt: &str, special: bool) -> ElectionRow {
    ElectionRow {
        id: id.into(),
        office_name: format!("Office {}", id),
        office_level: level.into(),
        state: state.into(),
        election_dt: dt.into(),
        is_special: special,
        description: None,
    }
}

pub fn candidate_row(id: &str, election_id: &str, name: &str, party: &str, poll: f64) -> CandidateRow {
    CandidateRow {
        id: id.into(),
        election_id: election_id.into(),
        name: name.into(),
        party: party.into(),
        incumbent: false,
        poll_pct: poll,
        intent_pct: 0.0,
        endorsements: 0,
        last_polled: None,
    }
}

pub fn days_from_now(days: i64) -> String {
    let dt: DateTime<Utc> = Utc::now() + ChronoDuration::days(days);
    dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

/// One scripted reply for an election read: optional delay, then either rows
/// or an error.
pub struct FetchScript {
    pub delay_ms: u64,
    pub outcome: Result<Vec<ElectionRow>, String>,
}

/// Election source with scripted election reads, used to exercise failure
/// and overlap paths the sqlite store cannot produce on demand. Scripted
/// replies are consumed in order; once the queue is empty, reads serve the
/// default rows.
pub struct ScriptedSource {
    scripts: Mutex<VecDeque<FetchScript>>,
    default_rows: Mutex<Vec<ElectionRow>>,
    candidates: Mutex<Vec<CandidateRow>>,
    fail_candidates: AtomicBool,
    changes: broadcast::Sender<StoreEvent>,
}

impl ScriptedSource {
    pub fn new(default_rows: Vec<ElectionRow>) -> Self {
        let (changes, _) = broadcast::channel(16);
        Self {
            scripts: Mutex::new(VecDeque::new()),
            default_rows: Mutex::new(default_rows),
            candidates: Mutex::new(Vec::new()),
            fail_candidates: AtomicBool::new(false),
            changes,
        }
    }

    pub fn push_script(&self, delay_ms: u64, outcome: Result<Vec<ElectionRow>, &str>) {
        self.scripts.lock().unwrap().push_back(FetchScript {
            delay_ms,
            outcome: outcome.map_err(|m| m.to_string()),
        });
    }

    pub fn set_candidates(&self, rows: Vec<CandidateRow>) {
        *self.candidates.lock().unwrap() = rows;
    }

    pub fn fail_candidates(&self, fail: bool) {
        self.fail_candidates.store(fail, Ordering::SeqCst);
    }

    pub fn emit_change(&self, table: Relation) {
        let _ = self.changes.send(StoreEvent { table });
    }

    async fn scripted_elections(&self) -> anyhow::Result<Vec<ElectionRow>> {
        let script = self.scripts.lock().unwrap().pop_front();
        match script {
            Some(s) => {
                if s.delay_ms > 0 {
                    tokio::time::sleep(tokio::time::Duration::from_millis(s.delay_ms)).await;
                }
                s.outcome.map_err(|m| anyhow::anyhow!(m))
            }
            None => Ok(self.default_rows.lock().unwrap().clone()),
        }
    }
}

#[async_trait]
impl ElectionSource for ScriptedSource {
    async fn elections(&self) -> anyhow::Result<Vec<ElectionRow>> {
        self.scripted_elections().await
    }

    async fn upcoming_elections(
        &self,
        _now: DateTime<Utc>,
        _limit: u32,
    ) -> anyhow::Result<Vec<ElectionRow>> {
        self.scripted_elections().await
    }

    async fn candidates(&self) -> anyhow::Result<Vec<CandidateRow>> {
        if self.fail_candidates.load(Ordering::SeqCst) {
            anyhow::bail!("candidate read unavailable");
        }
        Ok(self.candidates.lock().unwrap().clone())
    }

    fn subscribe_changes(&self) -> broadcast::Receiver<StoreEvent> {
        self.changes.subscribe()
    }
}

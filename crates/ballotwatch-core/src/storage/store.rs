use crate::storage::rows::{CandidateRow, ElectionRow};
use anyhow::Context;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

const CHANGE_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Elections,
    Candidates,
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Elections => "elections",
            Relation::Candidates => "candidates",
        }
    }
}

/// Change notification published after every successful write, keyed by
/// relation. The real-time service listens on this channel the way the
/// original listens on per-table change feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreEvent {
    pub table: Relation,
}

#[derive(Clone)]
pub struct Store {
    pub conn: Arc<Mutex<Connection>>,
    changes: broadcast::Sender<StoreEvent>,
}

impl Store {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }
        let conn = Connection::open(path).context("failed to open sqlite db")?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self::from_conn(conn))
    }

    pub fn memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory sqlite db")?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self::from_conn(conn))
    }

    fn from_conn(conn: Connection) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            conn: Arc::new(Mutex::new(conn)),
            changes,
        }
    }

    pub fn init_schema(&self) -> anyhow::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(crate::storage::schema::DDL)?;
        Ok(())
    }

    /// Subscribe to write notifications. Receivers that lag past the channel
    /// capacity miss events; callers treat a lagged receiver as "something
    /// changed" and refetch.
    pub fn subscribe_changes(&self) -> broadcast::Receiver<StoreEvent> {
        self.changes.subscribe()
    }

    fn notify(&self, table: Relation) {
        // No receivers is fine; nobody is watching yet.
        let _ = self.changes.send(StoreEvent { table });
    }

    pub fn list_elections(&self) -> anyhow::Result<Vec<ElectionRow>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, office_name, office_level, state, election_dt, is_special, description
             FROM elections
             ORDER BY election_dt ASC",
        )?;
        let rows = stmt.query_map([], map_election_row)?;
        collect_rows(rows)
    }

    pub fn list_upcoming_elections(
        &self,
        now: DateTime<Utc>,
        limit: u32,
    ) -> anyhow::Result<Vec<ElectionRow>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, office_name, office_level, state, election_dt, is_special, description
             FROM elections
             WHERE election_dt >= ?1
             ORDER BY election_dt ASC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![db_timestamp(now), limit], map_election_row)?;
        collect_rows(rows)
    }

    pub fn get_election(&self, id: &str) -> anyhow::Result<Option<ElectionRow>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, office_name, office_level, state, election_dt, is_special, description
             FROM elections
             WHERE id = ?1",
        )?;
        let mut rows = stmt.query(params![id])?;
        match rows.next()? {
            Some(row) => Ok(Some(map_election_row(row)?)),
            None => Ok(None),
        }
    }

    pub fn list_candidates(&self) -> anyhow::Result<Vec<CandidateRow>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, election_id, name, party, incumbent, poll_pct, intent_pct, endorsements, last_polled
             FROM candidates
             ORDER BY poll_pct DESC",
        )?;
        let rows = stmt.query_map([], map_candidate_row)?;
        collect_rows(rows)
    }

    pub fn upsert_election(&self, row: &ElectionRow) -> anyhow::Result<()> {
        {
            let conn = self.conn.lock().unwrap();
            let now = db_timestamp(Utc::now());
            conn.execute(
                "INSERT INTO elections(id, office_name, office_level, state, election_dt, is_special, description, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
                 ON CONFLICT(id) DO UPDATE SET
                    office_name=excluded.office_name,
                    office_level=excluded.office_level,
                    state=excluded.state,
                    election_dt=excluded.election_dt,
                    is_special=excluded.is_special,
                    description=excluded.description,
                    updated_at=excluded.updated_at",
                params![
                    row.id,
                    row.office_name,
                    row.office_level,
                    row.state,
                    row.election_dt,
                    row.is_special,
                    row.description,
                    now
                ],
            )
            .context("upsert election")?;
        }
        self.notify(Relation::Elections);
        Ok(())
    }

    pub fn upsert_candidate(&self, row: &CandidateRow) -> anyhow::Result<()> {
        {
            let conn = self.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO candidates(id, election_id, name, party, incumbent, poll_pct, intent_pct, endorsements, last_polled)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT(id) DO UPDATE SET
                    election_id=excluded.election_id,
                    name=excluded.name,
                    party=excluded.party,
                    incumbent=excluded.incumbent,
                    poll_pct=excluded.poll_pct,
                    intent_pct=excluded.intent_pct,
                    endorsements=excluded.endorsements,
                    last_polled=excluded.last_polled",
                params![
                    row.id,
                    row.election_id,
                    row.name,
                    row.party,
                    row.incumbent,
                    row.poll_pct,
                    row.intent_pct,
                    row.endorsements,
                    row.last_polled
                ],
            )
            .context("upsert candidate")?;
        }
        self.notify(Relation::Candidates);
        Ok(())
    }

    pub fn count_rows(&self, table: &str) -> anyhow::Result<i64> {
        let conn = self.conn.lock().unwrap();
        // Allowlist to keep the identifier out of injection territory
        if !["elections", "candidates"].contains(&table) {
            anyhow::bail!("invalid table name for count_rows: {}", table);
        }
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        let n: i64 = conn.query_row(&sql, [], |r| r.get(0))?;
        Ok(n)
    }
}

/// Canonical timestamp format for the store: UTC RFC 3339, 'Z' suffix.
pub fn db_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn map_election_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ElectionRow> {
    Ok(ElectionRow {
        id: row.get(0)?,
        office_name: row.get(1)?,
        office_level: row.get(2)?,
        state: row.get(3)?,
        election_dt: row.get(4)?,
        is_special: row.get(5)?,
        description: row.get(6)?,
    })
}

fn map_candidate_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CandidateRow> {
    Ok(CandidateRow {
        id: row.get(0)?,
        election_id: row.get(1)?,
        name: row.get(2)?,
        party: row.get(3)?,
        incumbent: row.get(4)?,
        poll_pct: row.get(5)?,
        intent_pct: row.get(6)?,
        endorsements: row.get(7)?,
        last_polled: row.get(8)?,
    })
}

fn collect_rows<T>(
    rows: impl Iterator<Item = rusqlite::Result<T>>,
) -> anyhow::Result<Vec<T>> {
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

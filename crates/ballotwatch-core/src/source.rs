use crate::storage::rows::{CandidateRow, ElectionRow};
use crate::storage::{Store, StoreEvent};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

/// Read side of the storage collaborator.
///
/// The fetcher and the real-time service only need ordered reads plus a
/// change feed, so they take this seam instead of a concrete [`Store`];
/// tests swap in scripted sources to exercise failure paths.
#[async_trait]
pub trait ElectionSource: Send + Sync {
    /// All election rows, date ascending.
    async fn elections(&self) -> anyhow::Result<Vec<ElectionRow>>;

    /// Election rows with `election_dt >= now`, date ascending, bounded.
    async fn upcoming_elections(
        &self,
        now: DateTime<Utc>,
        limit: u32,
    ) -> anyhow::Result<Vec<ElectionRow>>;

    /// All candidate rows, polling pct descending.
    async fn candidates(&self) -> anyhow::Result<Vec<CandidateRow>>;

    /// Change notifications for the election and candidate relations.
    fn subscribe_changes(&self) -> broadcast::Receiver<StoreEvent>;
}

#[async_trait]
impl ElectionSource for Store {
    async fn elections(&self) -> anyhow::Result<Vec<ElectionRow>> {
        self.list_elections()
    }

    async fn upcoming_elections(
        &self,
        now: DateTime<Utc>,
        limit: u32,
    ) -> anyhow::Result<Vec<ElectionRow>> {
        self.list_upcoming_elections(now, limit)
    }

    async fn candidates(&self) -> anyhow::Result<Vec<CandidateRow>> {
        self.list_candidates()
    }

    fn subscribe_changes(&self) -> broadcast::Receiver<StoreEvent> {
        Store::subscribe_changes(self)
    }
}

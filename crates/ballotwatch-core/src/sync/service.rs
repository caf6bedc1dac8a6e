//! Real-time election updates.
//!
//! Two trigger sources funnel into one fetch-and-broadcast routine: a
//! repeating timer and the store's change feed. Every trigger takes a
//! monotonic sequence number and each delivery is last-writer-wins, so a
//! slow fetch whose result lands after a newer one is discarded instead of
//! being applied out of order. `stop()` bumps an epoch; results fetched
//! under an older epoch are discarded, which is what makes the "no
//! broadcasts after stop() returns" guarantee hold for in-flight work.

use crate::fetch::{ElectionFetcher, DEFAULT_UPCOMING_LIMIT};
use crate::model::Snapshot;
use crate::source::ElectionSource;
use anyhow::Context;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub interval: Duration,
    pub upcoming_limit: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            upcoming_limit: DEFAULT_UPCOMING_LIMIT,
        }
    }
}

type SubscriberFn = dyn Fn(&Snapshot) + Send + Sync;

#[derive(Default)]
struct ServiceState {
    active: bool,
    epoch: u64,
    delivered_seq: u64,
    next_token: u64,
    subscribers: Vec<(u64, Arc<SubscriberFn>)>,
    tasks: Vec<JoinHandle<()>>,
    last_snapshot: Option<Snapshot>,
}

struct Inner {
    fetcher: ElectionFetcher,
    source: Arc<dyn ElectionSource>,
    config: SyncConfig,
    seq: AtomicU64,
    state: Mutex<ServiceState>,
    // Serializes snapshot delivery; stop() waits on it so no callback can
    // still be running when stop() returns.
    delivery: tokio::sync::Mutex<()>,
}

/// Owns the polling loop and the change subscription. Constructed per
/// composition root; there is no ambient global instance.
pub struct RealTimeElectionService {
    inner: Arc<Inner>,
}

/// Registration handle returned by [`RealTimeElectionService::subscribe`].
/// Dropping it removes the callback from the registry.
pub struct Subscription {
    token: u64,
    inner: Weak<Inner>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            let mut st = inner.state.lock().unwrap();
            st.subscribers.retain(|(t, _)| *t != self.token);
        }
    }
}

impl RealTimeElectionService {
    pub fn new(source: Arc<dyn ElectionSource>, config: SyncConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                fetcher: ElectionFetcher::new(Arc::clone(&source)),
                source,
                config,
                seq: AtomicU64::new(0),
                state: Mutex::new(ServiceState::default()),
                delivery: tokio::sync::Mutex::new(()),
            }),
        }
    }

    pub fn is_active(&self) -> bool {
        self.inner.state.lock().unwrap().active
    }

    /// Last snapshot that was actually delivered; survives failed cycles as
    /// the last-known-good value.
    pub fn last_snapshot(&self) -> Option<Snapshot> {
        self.inner.state.lock().unwrap().last_snapshot.clone()
    }

    /// Register a callback for every future broadcast. Broadcasts iterate a
    /// copy of the registry, so subscribing or unsubscribing from inside a
    /// callback cannot corrupt delivery.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Snapshot) + Send + Sync + 'static,
    {
        let mut st = self.inner.state.lock().unwrap();
        let token = st.next_token;
        st.next_token += 1;
        st.subscribers.push((token, Arc::new(callback)));
        Subscription {
            token,
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Transition Stopped -> Active: one immediate fetch-and-broadcast, then
    /// the repeating timer and the store change subscription.
    ///
    /// A failed initial fetch is surfaced to the caller (distinct from the
    /// silent retry of later cycles) and leaves the service stopped.
    pub async fn start(&self) -> anyhow::Result<()> {
        let epoch = {
            let mut st = self.inner.state.lock().unwrap();
            if st.active {
                anyhow::bail!("real-time updates already active");
            }
            st.active = true;
            st.epoch
        };
        tracing::info!(
            event = "sync.starting",
            interval_ms = self.inner.config.interval.as_millis() as u64,
            "starting real-time election updates"
        );

        if let Err(e) = fetch_and_broadcast(&self.inner, epoch, "initial").await {
            let mut st = self.inner.state.lock().unwrap();
            st.active = false;
            st.epoch += 1;
            return Err(e).context("initial election fetch failed");
        }

        let timer_inner = Arc::clone(&self.inner);
        let timer = tokio::spawn(async move {
            let mut ticker = interval(timer_inner.config.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The immediate fetch above already covered t=0.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if timer_inner.state.lock().unwrap().epoch != epoch {
                    break;
                }
                // Each cycle runs detached: a hanging fetch delays only its
                // own snapshot, never the next tick.
                let inner = Arc::clone(&timer_inner);
                tokio::spawn(async move {
                    if let Err(e) = fetch_and_broadcast(&inner, epoch, "interval").await {
                        tracing::warn!(
                            event = "sync.tick_failed",
                            error = %e,
                            "scheduled refresh failed; keeping last snapshot"
                        );
                    }
                });
            }
        });

        let change_inner = Arc::clone(&self.inner);
        let mut rx = self.inner.source.subscribe_changes();
        let listener = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => {
                        tracing::debug!(
                            event = "sync.store_change",
                            table = ev.table.as_str(),
                            "store changed; refreshing"
                        );
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        // Lagging loses the individual events, not the fact
                        // that something changed; one refetch covers it.
                        tracing::debug!(event = "sync.change_lagged", missed, "change feed lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
                if change_inner.state.lock().unwrap().epoch != epoch {
                    break;
                }
                let inner = Arc::clone(&change_inner);
                tokio::spawn(async move {
                    if let Err(e) = fetch_and_broadcast(&inner, epoch, "change").await {
                        tracing::warn!(
                            event = "sync.change_refresh_failed",
                            error = %e,
                            "change-triggered refresh failed; keeping last snapshot"
                        );
                    }
                });
            }
        });

        let mut st = self.inner.state.lock().unwrap();
        st.tasks.push(timer);
        st.tasks.push(listener);
        Ok(())
    }

    /// Transition Active -> Stopped. Cancels the timer and the change
    /// subscription, drops all subscribers, and waits out any delivery in
    /// progress: once this returns, no further broadcast is observed, even
    /// from a fetch that was in flight when it was called.
    pub async fn stop(&self) {
        let tasks = {
            let mut st = self.inner.state.lock().unwrap();
            if !st.active {
                return;
            }
            st.active = false;
            st.epoch += 1;
            st.subscribers.clear();
            std::mem::take(&mut st.tasks)
        };
        for t in &tasks {
            t.abort();
        }
        drop(self.inner.delivery.lock().await);
        tracing::info!(event = "sync.stopped", "stopped real-time election updates");
    }

    /// One fetch-and-broadcast right now, timer and subscription state
    /// notwithstanding. Works whether Active or Stopped.
    pub async fn force_refresh(&self) -> anyhow::Result<()> {
        let epoch = self.inner.state.lock().unwrap().epoch;
        fetch_and_broadcast(&self.inner, epoch, "manual").await
    }
}

impl Drop for RealTimeElectionService {
    fn drop(&mut self) {
        let mut st = self.inner.state.lock().unwrap();
        st.epoch += 1;
        st.subscribers.clear();
        for t in st.tasks.drain(..) {
            t.abort();
        }
    }
}

async fn fetch_and_broadcast(
    inner: &Arc<Inner>,
    epoch: u64,
    origin: &'static str,
) -> anyhow::Result<()> {
    let seq = inner.seq.fetch_add(1, Ordering::Relaxed) + 1;
    let now = Utc::now();
    let elections = inner
        .fetcher
        .fetch_upcoming(now, inner.config.upcoming_limit)
        .await?;
    let snapshot = Snapshot {
        elections,
        last_updated: now,
        source: origin.to_string(),
    };

    let _delivery = inner.delivery.lock().await;
    let callbacks: Vec<Arc<SubscriberFn>> = {
        let mut st = inner.state.lock().unwrap();
        if st.epoch != epoch {
            tracing::debug!(
                event = "sync.discard_stopped",
                origin,
                "snapshot discarded; service stopped since the fetch began"
            );
            return Ok(());
        }
        if seq <= st.delivered_seq {
            tracing::debug!(
                event = "sync.discard_stale",
                origin,
                "late snapshot superseded by a newer broadcast"
            );
            return Ok(());
        }
        st.delivered_seq = seq;
        st.last_snapshot = Some(snapshot.clone());
        st.subscribers.iter().map(|(_, cb)| Arc::clone(cb)).collect()
    };

    tracing::debug!(
        event = "sync.broadcast",
        origin,
        elections = snapshot.elections.len(),
        subscribers = callbacks.len(),
    );
    for cb in callbacks {
        // A panicking subscriber must not take the cycle down with it.
        if std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| (*cb)(&snapshot))).is_err() {
            tracing::warn!(event = "sync.subscriber_panic", "subscriber callback panicked");
        }
    }
    Ok(())
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The replay dispatcher.
//!
//! Holds failed actions until connectivity returns, then replays them on a
//! stagger. Drains are single-flight: a drain request arriving while the
//! previous drain's grace window is open is dropped.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use nr_core::{ConnectivityState, ReplayConfig};
use nr_observer::{ConnectivityListener, ConnectivityObserver};
use tokio::runtime::Handle;

use crate::action::{ActionError, ActionResult, ReplayAction};
use crate::error::DispatchResult;
use crate::subscribers::{RefreshSubscriber, SubscriberRegistry};
use crate::table::{FailOutcome, MarkOutcome, PendingAction, PendingTable};

/// Queues actions that failed for lack of network and replays them on reconnect.
///
/// Cheap to clone; clones share one table.
#[derive(Clone)]
pub struct ReplayDispatcher {
    inner: Arc<Inner>,
}

struct Inner {
    config: ReplayConfig,
    handle: Handle,
    table: Mutex<PendingTable>,
    draining: AtomicBool,
    /// Bumped on every availability edge; a settle timer acts only if it is unchanged.
    reconnects: AtomicU64,
    subscribers: Mutex<SubscriberRegistry>,
    wiring: Mutex<Option<Wiring>>,
}

struct Wiring {
    observer: Arc<ConnectivityObserver>,
    listener: Arc<dyn ConnectivityListener>,
}

impl ReplayDispatcher {
    /// Creates a dispatcher bound to the current Tokio runtime.
    pub fn new(config: ReplayConfig) -> DispatchResult<Self> {
        config.validate()?;
        let handle = Handle::try_current()?;
        let table = PendingTable::new(config.max_retries, config.max_pending);

        Ok(ReplayDispatcher {
            inner: Arc::new(Inner {
                config,
                handle,
                table: Mutex::new(table),
                draining: AtomicBool::new(false),
                reconnects: AtomicU64::new(0),
                subscribers: Mutex::new(SubscriberRegistry::default()),
                wiring: Mutex::new(None),
            }),
        })
    }

    /// Subscribes to `observer` so reconnects drain the table.
    ///
    /// Only the first call has any effect.
    pub fn initialize(&self, observer: Arc<ConnectivityObserver>) {
        let mut wiring = self.inner.wiring();
        if wiring.is_some() {
            tracing::debug!("replay dispatcher already initialized");
            return;
        }

        let listener: Arc<dyn ConnectivityListener> = Arc::new(ReconnectTrigger {
            inner: Arc::downgrade(&self.inner),
            last: Mutex::new(observer.current_state()),
        });
        observer.subscribe(Arc::clone(&listener));
        *wiring = Some(Wiring { observer, listener });
        tracing::info!("replay dispatcher initialized");
    }

    /// Detaches from the observer and forgets all pending actions and subscribers.
    ///
    /// Actions already running are not interrupted.
    pub fn shutdown(&self) {
        if let Some(wiring) = self.inner.wiring().take() {
            wiring.observer.unsubscribe(&wiring.listener);
        }
        // Orphan any pending settle timer.
        self.inner.reconnects.fetch_add(1, Ordering::AcqRel);

        let dropped = {
            let mut table = self.inner.table();
            let dropped = table.len();
            table.clear();
            dropped
        };
        self.inner.subscribers().clear();
        tracing::info!("replay dispatcher shut down, dropped {} pending", dropped);
    }

    /// Queues `action` for replay under `id`.
    ///
    /// Re-submitting an id replaces its entry and counts as another attempt;
    /// once an id has been queued `max_retries` times it is dropped instead.
    pub fn mark_for_replay<A: ReplayAction>(&self, id: &str, action: A) {
        self.mark_for_replay_if(id, action, true);
    }

    /// Like [`mark_for_replay`](Self::mark_for_replay), but a no-op unless
    /// `replay_eligible` is set.
    pub fn mark_for_replay_if<A: ReplayAction>(&self, id: &str, action: A, replay_eligible: bool) {
        if !replay_eligible {
            tracing::trace!("{} not eligible for replay", id);
            return;
        }
        let outcome = self.inner.table().mark(id, Arc::new(action));
        match outcome {
            MarkOutcome::Queued {
                retry_count,
                evicted,
            } => {
                if let Some(evicted) = evicted {
                    tracing::warn!("pending table full, evicted {}", evicted);
                }
                tracing::debug!("queued {} for replay (attempt {})", id, retry_count);
            }
            MarkOutcome::Abandoned { attempts } => {
                tracing::warn!("giving up on {} after {} attempts", id, attempts);
            }
        }
    }

    /// Drops the pending entry for `id`, if any.
    ///
    /// An invocation already taken by a drain still runs.
    pub fn cancel(&self, id: &str) -> bool {
        let removed = self.inner.table().cancel(id);
        if removed {
            tracing::debug!("cancelled replay of {}", id);
        }
        removed
    }

    pub fn has_pending(&self) -> bool {
        !self.inner.table().is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.inner.table().len()
    }

    /// Pending ids, oldest first.
    pub fn pending_ids(&self) -> Vec<String> {
        self.inner.table().ids()
    }

    /// How many times `id` has been queued, if it is pending.
    pub fn retry_count(&self, id: &str) -> Option<u32> {
        self.inner.table().retry_count(id)
    }

    /// Replays every pending action now.
    ///
    /// Returns false if a drain was already in progress and this one was dropped.
    pub fn flush_failed_actions(&self) -> bool {
        self.inner.drain()
    }

    /// Adds a subscriber notified after each settled reconnect.
    ///
    /// The dispatcher keeps only a weak reference.
    pub fn register_refresh_subscriber<S>(&self, subscriber: &Arc<S>)
    where
        S: RefreshSubscriber + 'static,
    {
        let weak: Weak<S> = Arc::downgrade(subscriber);
        self.register_refresh_subscriber_weak(weak);
    }

    /// Like [`register_refresh_subscriber`](Self::register_refresh_subscriber),
    /// for callers holding a trait object (`Arc::downgrade(&arc_dyn)`).
    pub fn register_refresh_subscriber_weak(&self, subscriber: Weak<dyn RefreshSubscriber>) {
        if self.inner.subscribers().add(subscriber) {
            tracing::debug!("refresh subscriber registered");
        }
    }

    pub fn unregister_refresh_subscriber<S>(&self, subscriber: &Arc<S>)
    where
        S: RefreshSubscriber + 'static,
    {
        let weak: Weak<dyn RefreshSubscriber> = Arc::downgrade(subscriber) as Weak<S>;
        self.unregister_refresh_subscriber_weak(&weak);
    }

    pub fn unregister_refresh_subscriber_weak(&self, subscriber: &Weak<dyn RefreshSubscriber>) {
        self.inner.subscribers().remove(subscriber);
    }

    /// Number of registered subscribers still alive.
    pub fn live_subscriber_count(&self) -> usize {
        self.inner.subscribers().live_count()
    }
}

impl Inner {
    fn table(&self) -> MutexGuard<'_, PendingTable> {
        self.table.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn subscribers(&self) -> MutexGuard<'_, SubscriberRegistry> {
        self.subscribers.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn wiring(&self) -> MutexGuard<'_, Option<Wiring>> {
        self.wiring.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn drain(self: &Arc<Self>) -> bool {
        if self
            .draining
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("drain already in progress");
            return false;
        }

        let batch = self.table().take_all();
        if !batch.is_empty() {
            tracing::info!("replaying {} pending action(s)", batch.len());
        }

        let stagger = self.config.stagger();
        for (index, entry) in batch.into_iter().enumerate() {
            let delay = stagger.saturating_mul(u32::try_from(index).unwrap_or(u32::MAX));
            let inner = Arc::clone(self);
            self.handle.spawn(async move {
                tokio::time::sleep(delay).await;
                tracing::debug!(
                    "replaying {} (attempt {}, queued {})",
                    entry.id,
                    entry.retry_count,
                    entry.submitted_at.format("%H:%M:%S%.3f")
                );
                let result = inner.invoke(&entry).await;
                inner.finish(entry, result);
            });
        }

        let inner = Arc::clone(self);
        self.handle.spawn(async move {
            tokio::time::sleep(inner.config.grace()).await;
            inner.draining.store(false, Ordering::Release);
        });
        true
    }

    /// Runs one invocation in its own task so a panic is reported, not propagated.
    async fn invoke(&self, entry: &PendingAction) -> ActionResult {
        let action = Arc::clone(&entry.action);
        match self.handle.spawn(async move { action.invoke().await }).await {
            Ok(result) => result,
            Err(e) if e.is_panic() => Err(ActionError::Panicked),
            Err(e) => Err(ActionError::Failed(e.to_string())),
        }
    }

    fn finish(&self, entry: PendingAction, result: ActionResult) {
        let error = match result {
            Ok(()) => {
                tracing::debug!("replayed {}", entry.id);
                self.table().complete(&entry);
                return;
            }
            Err(e) => e,
        };

        let id = entry.id.clone();
        let outcome = self.table().fail(entry);
        match outcome {
            FailOutcome::Requeued { retry_count } => {
                tracing::warn!(
                    "replay of {} failed: {}; requeued (attempt {})",
                    id,
                    error,
                    retry_count
                );
            }
            FailOutcome::Superseded => {
                tracing::debug!("replay of {} failed: {}; already requeued", id, error);
            }
            FailOutcome::Abandoned { attempts } => {
                tracing::warn!(
                    "replay of {} failed: {}; giving up after {} attempts",
                    id,
                    error,
                    attempts
                );
            }
        }
    }

    fn on_available(self: &Arc<Self>) {
        let epoch = self.reconnects.fetch_add(1, Ordering::AcqRel) + 1;
        let inner = Arc::clone(self);
        self.handle.spawn(async move {
            tokio::time::sleep(inner.config.settle()).await;
            if inner.reconnects.load(Ordering::Acquire) != epoch {
                tracing::debug!("reconnect superseded during settle delay");
                return;
            }
            inner.drain();
            inner.notify_refresh();
        });
    }

    fn on_lost(&self) {
        self.reconnects.fetch_add(1, Ordering::AcqRel);
        let pending = self.table().len();
        if pending > 0 {
            tracing::debug!("connectivity lost, holding {} pending", pending);
        }
    }

    fn notify_refresh(&self) {
        let live = self.subscribers().live();
        if live.is_empty() {
            return;
        }
        self.handle.spawn(async move {
            for subscriber in live {
                let result = catch_unwind(AssertUnwindSafe(|| subscriber.on_refresh_requested()));
                if result.is_err() {
                    tracing::warn!("refresh subscriber panicked");
                }
            }
        });
    }
}

/// Observer listener that turns reconnects into drains.
struct ReconnectTrigger {
    inner: Weak<Inner>,
    last: Mutex<ConnectivityState>,
}

impl ReconnectTrigger {
    fn remember(&self, state: ConnectivityState) -> ConnectivityState {
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *last, state)
    }
}

/// A move onto a cheaper or faster network.
fn improved(prev: &ConnectivityState, next: &ConnectivityState) -> bool {
    (prev.metered && !next.metered) || (!prev.is_fast() && next.is_fast())
}

impl ConnectivityListener for ReconnectTrigger {
    fn on_available(&self, state: &ConnectivityState) {
        self.remember(*state);
        if let Some(inner) = self.inner.upgrade() {
            inner.on_available();
        }
    }

    fn on_lost(&self) {
        self.remember(ConnectivityState::disconnected());
        if let Some(inner) = self.inner.upgrade() {
            inner.on_lost();
        }
    }

    fn on_capabilities_changed(&self, state: &ConnectivityState) {
        let prev = self.remember(*state);
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        if improved(&prev, state) && !inner.table().is_empty() {
            tracing::info!("moved to {}, replaying early", state);
            inner.drain();
        }
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;

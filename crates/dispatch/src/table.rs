// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The pending-action table.
//!
//! Entries are keyed by caller-supplied id and kept in insertion order, so a
//! drain replays them oldest first. A re-submission replaces the earlier
//! entry and carries its retry count forward.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::action::ReplayAction;

/// A queued action awaiting replay.
#[derive(Clone)]
pub(crate) struct PendingAction {
    pub(crate) id: String,
    pub(crate) action: Arc<dyn ReplayAction>,
    /// Times this id has been queued, including this entry.
    pub(crate) retry_count: u32,
    pub(crate) submitted_at: DateTime<Utc>,
}

impl std::fmt::Debug for PendingAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingAction")
            .field("id", &self.id)
            .field("retry_count", &self.retry_count)
            .field("submitted_at", &self.submitted_at)
            .finish_non_exhaustive()
    }
}

/// What [`PendingTable::mark`] did with a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MarkOutcome {
    Queued {
        retry_count: u32,
        /// Oldest id dropped to stay within the size cap.
        evicted: Option<String>,
    },
    /// The id had already been queued the maximum number of times.
    Abandoned { attempts: u32 },
}

/// What [`PendingTable::fail`] did with a failed invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FailOutcome {
    Requeued { retry_count: u32 },
    /// The caller re-submitted the id while it was running; their entry stands.
    Superseded,
    Abandoned { attempts: u32 },
}

pub(crate) struct PendingTable {
    entries: IndexMap<String, PendingAction>,
    /// Retry counts of entries taken by a drain and not yet finished.
    in_flight: HashMap<String, u32>,
    max_retries: u32,
    max_pending: Option<usize>,
}

impl PendingTable {
    pub(crate) fn new(max_retries: u32, max_pending: Option<usize>) -> Self {
        PendingTable {
            entries: IndexMap::new(),
            in_flight: HashMap::new(),
            max_retries,
            max_pending,
        }
    }

    /// Queues `action` under `id`, replacing any entry with the same id.
    pub(crate) fn mark(&mut self, id: &str, action: Arc<dyn ReplayAction>) -> MarkOutcome {
        let previous = self
            .entries
            .get(id)
            .map(|entry| entry.retry_count)
            .or_else(|| self.in_flight.get(id).copied());
        let retry_count = previous.map_or(1, |count| count + 1);

        if retry_count > self.max_retries {
            self.entries.shift_remove(id);
            return MarkOutcome::Abandoned {
                attempts: previous.unwrap_or_default(),
            };
        }

        let evicted = self.insert(PendingAction {
            id: id.to_string(),
            action,
            retry_count,
            submitted_at: Utc::now(),
        });
        MarkOutcome::Queued {
            retry_count,
            evicted,
        }
    }

    /// Removes the entry for `id`. Returns whether one existed.
    pub(crate) fn cancel(&mut self, id: &str) -> bool {
        self.entries.shift_remove(id).is_some()
    }

    /// Empties the table, returning its entries oldest first.
    ///
    /// Taken entries are tracked as in flight until [`complete`](Self::complete)
    /// or [`fail`](Self::fail) is called for them.
    pub(crate) fn take_all(&mut self) -> Vec<PendingAction> {
        let batch: Vec<PendingAction> = std::mem::take(&mut self.entries).into_values().collect();
        for entry in &batch {
            self.in_flight.insert(entry.id.clone(), entry.retry_count);
        }
        batch
    }

    pub(crate) fn complete(&mut self, entry: &PendingAction) {
        self.settle(entry);
    }

    /// Records a failed invocation, re-queueing it if it has retries left.
    pub(crate) fn fail(&mut self, entry: PendingAction) -> FailOutcome {
        self.settle(&entry);

        if self.entries.contains_key(&entry.id) {
            return FailOutcome::Superseded;
        }
        if entry.retry_count >= self.max_retries {
            return FailOutcome::Abandoned {
                attempts: entry.retry_count,
            };
        }

        let retry_count = entry.retry_count + 1;
        self.insert(PendingAction {
            retry_count,
            submitted_at: Utc::now(),
            ..entry
        });
        FailOutcome::Requeued { retry_count }
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.in_flight.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn ids(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub(crate) fn retry_count(&self, id: &str) -> Option<u32> {
        self.entries.get(id).map(|entry| entry.retry_count)
    }

    fn insert(&mut self, entry: PendingAction) -> Option<String> {
        let mut evicted = None;
        if !self.entries.contains_key(&entry.id) {
            if let Some(cap) = self.max_pending {
                if self.entries.len() >= cap {
                    evicted = self.entries.shift_remove_index(0).map(|(id, _)| id);
                }
            }
        }
        // A replaced id moves to the back, as if freshly submitted.
        self.entries.shift_remove(&entry.id);
        self.entries.insert(entry.id.clone(), entry);
        evicted
    }

    fn settle(&mut self, entry: &PendingAction) {
        // A later drain may have taken a newer attempt of the same id.
        if self.in_flight.get(&entry.id) == Some(&entry.retry_count) {
            self.in_flight.remove(&entry.id);
        }
    }
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;

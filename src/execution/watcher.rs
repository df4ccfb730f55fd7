use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::proto::Operation;

/// Outcome of a watcher observing one operation snapshot.
///
/// `Done` means "finished processing; deregister me" — it is not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherDecision {
    Continue,
    Done,
}

/// A subscriber to one operation's updates. Invoked with `None` when the
/// watched operation does not exist.
pub type Watcher = Arc<dyn Fn(Option<&Operation>) -> WatcherDecision + Send + Sync>;

struct RegisteredWatcher {
    id: u64,
    watcher: Watcher,
}

/// Multimap `operation name → set of watchers` with per-name sharding.
///
/// Fan-out evaluates each watcher on its own task; a watcher is removed when
/// it reports [`WatcherDecision::Done`] or when the observed snapshot is
/// terminal. Watcher panics are contained by the task boundary.
#[derive(Default)]
pub struct WatcherRegistry {
    watchers: DashMap<String, Vec<RegisteredWatcher>>,
    next_id: AtomicU64,
}

impl WatcherRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a watcher and returns its registration id.
    pub fn put(
        &self,
        name: &str,
        watcher: Watcher,
    ) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.watchers
            .entry(name.to_string())
            .or_default()
            .push(RegisteredWatcher { id, watcher });
        id
    }

    pub fn watcher_count(
        &self,
        name: &str,
    ) -> usize {
        self.watchers.get(name).map(|entry| entry.len()).unwrap_or(0)
    }

    /// Delivers `operation` to every watcher currently registered under its
    /// name. Each invocation runs on the shared executor; fire-and-forget.
    /// A terminal snapshot additionally clears the name's registration.
    pub fn fan_out(
        self: &Arc<Self>,
        operation: &Operation,
    ) {
        let name = operation.name.clone();
        let snapshot: Vec<(u64, Watcher)> = match self.watchers.get(&name) {
            Some(entry) => entry
                .iter()
                .map(|r| (r.id, Arc::clone(&r.watcher)))
                .collect(),
            None => return,
        };
        debug!(%name, watchers = snapshot.len(), done = operation.done, "fan-out");

        for (id, watcher) in snapshot {
            let registry = Arc::clone(self);
            let name = name.clone();
            let operation = operation.clone();
            tokio::spawn(async move {
                let decision = (watcher.as_ref())(Some(&operation));
                let still_watching = decision == WatcherDecision::Continue && !operation.done;
                if !still_watching {
                    registry.remove(&name, id);
                }
            });
        }

        if operation.done {
            self.watchers.remove(&name);
        }
    }

    pub(crate) fn remove(
        &self,
        name: &str,
        id: u64,
    ) {
        if let Some(mut entry) = self.watchers.get_mut(name) {
            entry.retain(|r| r.id != id);
        }
    }
}

use std::collections::HashMap;
use std::collections::HashSet;
use std::collections::VecDeque;
use std::future::Future;

use futures::future::BoxFuture;
use tokio::sync::Mutex;
use tracing::debug;

use crate::proto::Operation;
use crate::proto::Platform;
use crate::Result;

/// Single-use dispatch acceptance callback supplied by a worker. Invoked
/// with a candidate operation; `Ok(true)` accepts the handoff, `Ok(false)`
/// declares the worker inviable, `Err` signals interruption of the worker
/// round-trip.
pub type OnMatch = Box<dyn FnOnce(Operation) -> BoxFuture<'static, Result<bool>> + Send>;

/// Boxes a closure into an [`OnMatch`].
pub fn on_match<F, Fut>(f: F) -> OnMatch
where
    F: FnOnce(Operation) -> Fut + Send + 'static,
    Fut: Future<Output = Result<bool>> + Send + 'static,
{
    Box::new(move |operation| Box::pin(f(operation)))
}

/// A parked worker: its offered platform and the pending acceptance
/// callback.
pub struct WorkerOffer {
    pub platform: Platform,
    on_match: OnMatch,
}

/// A queued operation paired with its resolved platform requirements, so
/// satisfaction checks under the queue monitor need no blob I/O.
#[derive(Debug)]
pub struct QueuedEntry {
    pub operation: Operation,
    pub requirements: Platform,
}

/// Result of one `offer` attempt.
#[derive(Debug)]
pub struct OfferOutcome {
    /// Operation handed to the offering worker, if any.
    pub dispatched: Option<Operation>,
    /// Entries consumed by the scan; the caller re-enqueues them through
    /// the standard requeue path so watcher delivery is preserved.
    pub set_aside: Vec<QueuedEntry>,
    /// Whether the offer was parked in the worker pool.
    pub parked: bool,
}

/// The rendezvous between queued operations and idle workers.
///
/// One mutex is the queue monitor of the match protocol: every read and
/// write of either FIFO during a single enqueue/offer attempt holds it,
/// including the `on_match` suspension. This is what makes "check both
/// sides and park on the opposite side" atomic.
#[derive(Default)]
pub struct Matcher {
    state: Mutex<MatchState>,
}

#[derive(Default)]
struct MatchState {
    queued: VecDeque<QueuedEntry>,
    workers: VecDeque<WorkerOffer>,
}

impl Matcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts immediate dispatch of `entry` against parked workers, in
    /// offer order. Non-satisfying workers are re-parked after the scan;
    /// an inviable worker (`on_match` → false) is discarded and the scan
    /// continues. Returns `true` when a worker accepted the operation,
    /// `false` when the entry was pushed to the queue tail.
    ///
    /// On interruption the consumed worker is lost and the entry is queued
    /// before the error propagates.
    pub async fn enqueue(
        &self,
        entry: QueuedEntry,
    ) -> Result<bool> {
        let mut state = self.state.lock().await;
        let mut skipped: Vec<WorkerOffer> = Vec::new();
        let mut dispatched = false;
        let mut failure = None;

        while !dispatched {
            let Some(worker) = state.workers.pop_front() else {
                break;
            };
            if !satisfies(&worker.platform, &entry.requirements) {
                skipped.push(worker);
                continue;
            }
            match (worker.on_match)(entry.operation.clone()).await {
                Ok(true) => dispatched = true,
                Ok(false) => {
                    debug!(operation = %entry.operation.name, "inviable worker discarded");
                }
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        for worker in skipped {
            state.workers.push_back(worker);
        }
        if !dispatched {
            state.queued.push_back(entry);
        }
        match failure {
            Some(e) => Err(e),
            None => Ok(dispatched),
        }
    }

    /// Scans queued operations in FIFO order for the first one `platform`
    /// satisfies. Every scanned entry is consumed: the satisfying entry is
    /// either dispatched (`on_match` → true) or set aside (inviable
    /// worker, which also ends the attempt without parking); non-satisfying
    /// entries are set aside. If nothing satisfied, the offer is parked.
    ///
    /// On interruption the consumed entries return to the queue head, the
    /// offer is lost, and the error propagates.
    pub async fn offer(
        &self,
        platform: Platform,
        on_match: OnMatch,
    ) -> Result<OfferOutcome> {
        let mut state = self.state.lock().await;
        let mut set_aside: Vec<QueuedEntry> = Vec::new();

        // first satisfying entry wins; everything scanned is consumed
        let mut candidate = None;
        while candidate.is_none() {
            let Some(entry) = state.queued.pop_front() else {
                break;
            };
            if satisfies(&platform, &entry.requirements) {
                candidate = Some(entry);
            } else {
                set_aside.push(entry);
            }
        }

        let Some(entry) = candidate else {
            state.workers.push_back(WorkerOffer { platform, on_match });
            return Ok(OfferOutcome {
                dispatched: None,
                set_aside,
                parked: true,
            });
        };

        let dispatched = match on_match(entry.operation.clone()).await {
            Ok(true) => Some(entry.operation),
            Ok(false) => {
                debug!(operation = %entry.operation.name, "offer inviable; discarding worker");
                set_aside.push(entry);
                None
            }
            Err(e) => {
                state.queued.push_front(entry);
                for earlier in set_aside.into_iter().rev() {
                    state.queued.push_front(earlier);
                }
                return Err(e);
            }
        };

        Ok(OfferOutcome {
            dispatched,
            set_aside,
            parked: false,
        })
    }

    pub async fn queued_len(&self) -> usize {
        self.state.lock().await.queued.len()
    }

    pub async fn parked_len(&self) -> usize {
        self.state.lock().await.workers.len()
    }
}

/// The satisfaction rule: every required `(name, value)` pair must be
/// present in the offered property set. Duplicates collapse; comparison is
/// byte-exact.
pub fn satisfies(
    offered: &Platform,
    required: &Platform,
) -> bool {
    let mut provisions: HashMap<&str, HashSet<&str>> = HashMap::new();
    for property in &offered.properties {
        provisions
            .entry(property.name.as_str())
            .or_default()
            .insert(property.value.as_str());
    }
    required.properties.iter().all(|property| {
        provisions
            .get(property.name.as_str())
            .is_some_and(|values| values.contains(property.value.as_str()))
    })
}

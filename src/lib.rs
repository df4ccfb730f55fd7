//! # buildmill
//!
//! An in-memory operation scheduler for the Remote Execution API.
//!
//! Clients submit build/test actions; the scheduler queues them, matches
//! them to workers advertising platform capabilities, tracks their
//! lifecycle through `QUEUED → EXECUTING → COMPLETED`, and streams progress
//! to subscribed watchers.
//!
//! ## Features
//! - **Platform matching**: first-fit rendezvous between queued operations
//!   and idle workers under `(name, value)` property constraints
//! - **Watchdog fabric**: per-operation poll-requeue and completion
//!   deadlines as lightweight tokio tasks
//! - **At-least-once watchers**: terminal snapshots are never lost to
//!   registration races
//! - **Delegated storage**: blobs, archived operations and cached results
//!   live behind a pluggable CAS trait
//!
//! ## Quick Start
//! ```no_run
//! use buildmill::config::SchedulerConfig;
//! use buildmill::MemoryInstance;
//!
//! #[tokio::main]
//! async fn main() -> buildmill::Result<()> {
//!     let config = SchedulerConfig::new()?;
//!     let instance = MemoryInstance::new("shard-1", config)?;
//!     let (operations, _next) = instance.list_operations(0, "").await?;
//!     println!("{} operations in flight", operations.len());
//!     Ok(())
//! }
//! ```
//!
//! Nothing here is durable: every queue, operation record and watcher
//! registration lives in process memory. Only content-addressed blobs are
//! delegated to the CAS.

pub mod cas;
pub mod config;
pub mod digest;
pub mod execution;
pub mod proto;

mod constants;
mod errors;
mod utils;

pub use constants::TIMEOUT_OUT_OF_BOUNDS;
pub use errors::*;
#[doc(hidden)]
pub use execution::*;
#[doc(hidden)]
pub use utils::*;

//-----------------------------------------------------------
// Test utils
#[cfg(test)]
#[doc(hidden)]
pub mod test_utils;

//-----------------------------------------------------------
// Autometrics
use autometrics::objectives::Objective;
use autometrics::objectives::ObjectiveLatency;
use autometrics::objectives::ObjectivePercentile;

#[doc(hidden)]
pub const API_SLO: Objective = Objective::new("api")
    .success_rate(ObjectivePercentile::P99_9)
    .latency(ObjectiveLatency::Ms10, ObjectivePercentile::P99);

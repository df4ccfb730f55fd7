//! The operation lifecycle engine.
//!
//! Everything between "a client submitted an action" and "a watcher saw the
//! terminal snapshot" lives here: the in-flight operation store, the
//! queue/worker rendezvous, the watchdog fabric, watcher fan-out, operation
//! streams, and the paged iterators over operations and directory trees.
mod instance;
mod matcher;
mod operations;
mod paging;
mod stream;
mod tree;
mod watchdog;
mod watcher;

pub use instance::*;
pub use matcher::*;
pub use operations::*;
pub use paging::*;
pub use stream::*;
pub use tree::*;
pub use watchdog::*;
pub use watcher::*;

#[cfg(test)]
mod matcher_test;
#[cfg(test)]
mod stream_test;
#[cfg(test)]
mod watchdog_test;

//! Shared fixtures and builders for unit tests.
mod builders;

pub use builders::*;

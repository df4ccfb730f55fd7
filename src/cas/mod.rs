//! Content-addressable storage and the stores layered on top of it.
//!
//! The scheduler never owns blob bytes durably; actions, commands and
//! archived results all live behind [`ContentAddressableStorage`]. The
//! in-process binding ([`MemoryCas`]) serves tests and single-node
//! deployments; remote backends implement the same trait.
mod action_cache;
mod delegate_map;
mod memory;

pub use action_cache::*;
pub use delegate_map::*;
pub use memory::*;

#[cfg(test)]
mod delegate_map_test;
#[cfg(test)]
mod memory_test;

use bytes::Bytes;
#[cfg(test)]
use mockall::automock;
use tonic::async_trait;

use crate::digest::DigestUtil;
use crate::proto::Digest;
use crate::Result;

/// A digest-addressed blob.
#[derive(Debug, Clone)]
pub struct Blob {
    digest: Digest,
    data: Bytes,
}

impl Blob {
    pub fn new(
        data: Bytes,
        digest_util: &DigestUtil,
    ) -> Self {
        let digest = digest_util.compute(&data);
        Self { digest, data }
    }

    pub fn digest(&self) -> &Digest {
        &self.digest
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ContentAddressableStorage: Send + Sync + 'static {
    /// Fetches a blob. `Ok(None)` means the digest is unknown or evicted.
    async fn get(
        &self,
        digest: &Digest,
    ) -> Result<Option<Bytes>>;

    /// Stores a blob and returns its digest.
    async fn put(
        &self,
        blob: Blob,
    ) -> Result<Digest>;

    async fn contains(
        &self,
        digest: &Digest,
    ) -> bool;
}

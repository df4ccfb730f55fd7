use std::collections::HashMap;
use std::collections::VecDeque;

use bytes::Bytes;
use parking_lot::Mutex;
use tonic::async_trait;
use tracing::debug;
use tracing::warn;

use super::Blob;
use super::ContentAddressableStorage;
use crate::proto::Digest;
use crate::ExecutionError;
use crate::Result;

/// In-process CAS binding: a size-capped map keyed by content hash.
///
/// When an insert would exceed the capacity, the oldest entries are evicted
/// in insertion order until the new blob fits. A single blob larger than the
/// capacity is rejected outright.
pub struct MemoryCas {
    state: Mutex<CasState>,
    max_size_bytes: u64,
}

struct CasState {
    blobs: HashMap<String, Bytes>,
    insertion_order: VecDeque<String>,
    total_size: u64,
}

impl MemoryCas {
    pub fn new(max_size_bytes: u64) -> Self {
        Self {
            state: Mutex::new(CasState {
                blobs: HashMap::new(),
                insertion_order: VecDeque::new(),
                total_size: 0,
            }),
            max_size_bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.state.lock().total_size
    }
}

#[async_trait]
impl ContentAddressableStorage for MemoryCas {
    async fn get(
        &self,
        digest: &Digest,
    ) -> Result<Option<Bytes>> {
        Ok(self.state.lock().blobs.get(&digest.hash).cloned())
    }

    async fn put(
        &self,
        blob: Blob,
    ) -> Result<Digest> {
        let size = blob.size();
        if size > self.max_size_bytes {
            warn!(
                size,
                capacity = self.max_size_bytes,
                "blob exceeds CAS capacity"
            );
            return Err(ExecutionError::InvalidArgument(format!(
                "blob of {size} bytes exceeds CAS capacity of {} bytes",
                self.max_size_bytes
            ))
            .into());
        }

        let digest = blob.digest().clone();
        let mut state = self.state.lock();
        if state.blobs.contains_key(&digest.hash) {
            return Ok(digest);
        }

        while state.total_size + size > self.max_size_bytes {
            let Some(hash) = state.insertion_order.pop_front() else {
                break;
            };
            if let Some(evicted) = state.blobs.remove(&hash) {
                state.total_size -= evicted.len() as u64;
                debug!(%hash, "evicted blob to make room");
            }
        }

        state.total_size += size;
        state.insertion_order.push_back(digest.hash.clone());
        state.blobs.insert(digest.hash.clone(), blob.data().clone());
        Ok(digest)
    }

    async fn contains(
        &self,
        digest: &Digest,
    ) -> bool {
        self.state.lock().blobs.contains_key(&digest.hash)
    }
}

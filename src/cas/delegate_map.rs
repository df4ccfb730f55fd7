use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

use bytes::Bytes;
use dashmap::DashMap;
use prost::Message;
use tracing::debug;

use super::Blob;
use super::ContentAddressableStorage;
use crate::digest::DigestUtil;
use crate::proto::Digest;
use crate::Result;

/// A key/value map whose values live in the CAS.
///
/// `put` encodes the value, uploads the bytes, and records `key → digest`
/// in an in-memory index; `get` resolves digest → bytes → decoded value.
/// Values evicted from the CAS read back as absent.
pub struct DelegateCasMap<K, V> {
    cas: Arc<dyn ContentAddressableStorage>,
    digest_util: DigestUtil,
    index: DashMap<K, Digest>,
    _marker: PhantomData<fn() -> V>,
}

impl<K, V> DelegateCasMap<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Message + Default,
{
    pub fn new(
        cas: Arc<dyn ContentAddressableStorage>,
        digest_util: DigestUtil,
    ) -> Self {
        Self {
            cas,
            digest_util,
            index: DashMap::new(),
            _marker: PhantomData,
        }
    }

    pub async fn put(
        &self,
        key: K,
        value: V,
    ) -> Result<()> {
        let blob = Blob::new(Bytes::from(value.encode_to_vec()), &self.digest_util);
        let digest = self.cas.put(blob).await?;
        self.index.insert(key, digest);
        Ok(())
    }

    pub async fn get(
        &self,
        key: &K,
    ) -> Result<Option<V>> {
        let Some(digest) = self.index.get(key).map(|entry| entry.value().clone()) else {
            return Ok(None);
        };
        match self.cas.get(&digest).await? {
            Some(bytes) => Ok(Some(V::decode(bytes.as_ref())?)),
            None => {
                debug!(hash = %digest.hash, "indexed blob no longer in CAS");
                Ok(None)
            }
        }
    }

    pub fn remove(
        &self,
        key: &K,
    ) -> Option<Digest> {
        self.index.remove(key).map(|(_, digest)| digest)
    }

    pub fn contains_key(
        &self,
        key: &K,
    ) -> bool {
        self.index.contains_key(key)
    }
}

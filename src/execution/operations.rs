use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

#[cfg(test)]
use mockall::automock;
use parking_lot::RwLock;
use tonic::async_trait;

use crate::cas::ContentAddressableStorage;
use crate::cas::DelegateCasMap;
use crate::digest::DigestUtil;
use crate::proto::Operation;
use crate::Result;

/// Capability record over a name-keyed operation store.
///
/// Backings differ in durability: the in-flight map is purely in-memory,
/// the completed archive delegates to the CAS. Key-ordered iteration is a
/// property of the in-flight backing only and lives on
/// [`OutstandingOperations`] directly.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait OperationsMap: Send + Sync + 'static {
    async fn get(
        &self,
        name: &str,
    ) -> Result<Option<Operation>>;

    async fn put(
        &self,
        name: &str,
        operation: Operation,
    ) -> Result<()>;

    async fn remove(
        &self,
        name: &str,
    ) -> Result<Option<Operation>>;

    async fn contains(
        &self,
        name: &str,
    ) -> bool;
}

/// The in-flight operation store: key-ordered, atomically snapshottable.
#[derive(Default)]
pub struct OutstandingOperations {
    map: RwLock<BTreeMap<String, Operation>>,
}

impl OutstandingOperations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns up to `limit` operations in key order, strictly after
    /// `after` when given. The page is a consistent snapshot; concurrent
    /// mutations are observed by later pages, not this one.
    pub fn page(
        &self,
        after: Option<&str>,
        limit: usize,
    ) -> Vec<Operation> {
        let map = self.map.read();
        let range = match after {
            Some(name) => map.range::<str, _>((Bound::Excluded(name), Bound::Unbounded)),
            None => map.range::<str, _>(..),
        };
        range.take(limit).map(|(_, op)| op.clone()).collect()
    }

    /// True when at least one key orders strictly after `name`.
    pub fn has_after(
        &self,
        name: &str,
    ) -> bool {
        self.map
            .read()
            .range::<str, _>((Bound::Excluded(name), Bound::Unbounded))
            .next()
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }
}

#[async_trait]
impl OperationsMap for OutstandingOperations {
    async fn get(
        &self,
        name: &str,
    ) -> Result<Option<Operation>> {
        Ok(self.map.read().get(name).cloned())
    }

    async fn put(
        &self,
        name: &str,
        operation: Operation,
    ) -> Result<()> {
        self.map.write().insert(name.to_string(), operation);
        Ok(())
    }

    async fn remove(
        &self,
        name: &str,
    ) -> Result<Option<Operation>> {
        Ok(self.map.write().remove(name))
    }

    async fn contains(
        &self,
        name: &str,
    ) -> bool {
        self.map.read().contains_key(name)
    }
}

/// The completed-operations archive: terminal snapshots parked in the CAS
/// behind a name → digest index. Iteration is deliberately unsupported.
pub struct CompletedOperations {
    map: DelegateCasMap<String, Operation>,
}

impl CompletedOperations {
    pub fn new(
        cas: Arc<dyn ContentAddressableStorage>,
        digest_util: DigestUtil,
    ) -> Self {
        Self {
            map: DelegateCasMap::new(cas, digest_util),
        }
    }
}

#[async_trait]
impl OperationsMap for CompletedOperations {
    async fn get(
        &self,
        name: &str,
    ) -> Result<Option<Operation>> {
        self.map.get(&name.to_string()).await
    }

    async fn put(
        &self,
        name: &str,
        operation: Operation,
    ) -> Result<()> {
        self.map.put(name.to_string(), operation).await
    }

    async fn remove(
        &self,
        name: &str,
    ) -> Result<Option<Operation>> {
        self.map.remove(&name.to_string());
        Ok(None)
    }

    async fn contains(
        &self,
        name: &str,
    ) -> bool {
        self.map.contains_key(&name.to_string())
    }
}

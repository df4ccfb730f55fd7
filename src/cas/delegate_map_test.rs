use std::sync::Arc;

use super::*;
use crate::digest::DigestUtil;
use crate::proto::ActionResult;

fn map() -> DelegateCasMap<String, ActionResult> {
    let cas = Arc::new(MemoryCas::new(1 << 20));
    DelegateCasMap::new(cas, DigestUtil)
}

fn result(exit_code: i32) -> ActionResult {
    ActionResult {
        exit_code,
        ..Default::default()
    }
}

/// # Case 1: values round-trip through the CAS
#[tokio::test]
async fn test_put_get_case1() {
    let map = map();
    map.put("op-1".to_string(), result(0))
        .await
        .expect("should succeed");
    let read = map.get(&"op-1".to_string()).await.expect("should succeed");
    assert_eq!(read, Some(result(0)));
    assert!(map.contains_key(&"op-1".to_string()));
}

/// # Case 2: absent keys read back as None
#[tokio::test]
async fn test_get_missing_case2() {
    let map = map();
    assert!(map
        .get(&"never".to_string())
        .await
        .expect("should succeed")
        .is_none());
}

/// # Case 3: remove drops the index entry
#[tokio::test]
async fn test_remove_case3() {
    let map = map();
    map.put("op-2".to_string(), result(1))
        .await
        .expect("should succeed");
    assert!(map.remove(&"op-2".to_string()).is_some());
    assert!(!map.contains_key(&"op-2".to_string()));
    assert!(map
        .get(&"op-2".to_string())
        .await
        .expect("should succeed")
        .is_none());
}

/// # Case 4: a value evicted from the CAS reads back as None
#[tokio::test]
async fn test_evicted_value_case4() {
    let cas = Arc::new(MemoryCas::new(8));
    let map: DelegateCasMap<String, ActionResult> = DelegateCasMap::new(cas.clone(), DigestUtil);
    map.put("old".to_string(), result(2))
        .await
        .expect("should succeed");
    // Fill the store until the first value's blob is evicted.
    cas.put(Blob::new(bytes::Bytes::from_static(b"xxxxxxx"), &DigestUtil))
        .await
        .expect("should succeed");

    assert!(map.contains_key(&"old".to_string()));
    assert!(map
        .get(&"old".to_string())
        .await
        .expect("should succeed")
        .is_none());
}

use bytes::Bytes;

use super::*;
use crate::digest::DigestUtil;

fn blob(content: &[u8]) -> Blob {
    Blob::new(Bytes::copy_from_slice(content), &DigestUtil)
}

/// # Case 1: round trip through put/get/contains
#[tokio::test]
async fn test_put_get_case1() {
    let cas = MemoryCas::new(1024);
    let b = blob(b"stdout of a build");
    let digest = cas.put(b.clone()).await.expect("should succeed");
    assert_eq!(&digest, b.digest());
    assert!(cas.contains(&digest).await);
    let read = cas.get(&digest).await.expect("should succeed");
    assert_eq!(read.as_deref(), Some(b"stdout of a build".as_slice()));
}

/// # Case 2: unknown digests read back as None
#[tokio::test]
async fn test_get_missing_case2() {
    let cas = MemoryCas::new(1024);
    let digest = DigestUtil.compute(b"never stored");
    assert!(cas.get(&digest).await.expect("should succeed").is_none());
    assert!(!cas.contains(&digest).await);
}

/// # Case 3: inserts evict oldest entries once the capacity is exceeded
#[tokio::test]
async fn test_eviction_case3() {
    let cas = MemoryCas::new(8);
    let first = cas.put(blob(b"aaaa")).await.expect("should succeed");
    let second = cas.put(blob(b"bbbb")).await.expect("should succeed");
    // 4 + 4 bytes fill the store; the next insert pushes `first` out.
    let third = cas.put(blob(b"cccc")).await.expect("should succeed");

    assert!(!cas.contains(&first).await);
    assert!(cas.contains(&second).await);
    assert!(cas.contains(&third).await);
    assert_eq!(cas.size(), 8);
}

/// # Case 4: a blob larger than the capacity is rejected
#[tokio::test]
async fn test_oversized_blob_case4() {
    let cas = MemoryCas::new(4);
    assert!(cas.put(blob(b"too large")).await.is_err());
    assert_eq!(cas.size(), 0);
}

/// # Case 5: re-inserting identical content does not double-count
#[tokio::test]
async fn test_duplicate_put_case5() {
    let cas = MemoryCas::new(1024);
    cas.put(blob(b"same")).await.expect("should succeed");
    cas.put(blob(b"same")).await.expect("should succeed");
    assert_eq!(cas.size(), 4);
}

use std::time::Duration;

use tokio::time::timeout;

use super::stream::StreamRegistry;

/// # Case 1: committed size tracks appends; close resolves the future
#[tokio::test]
async fn test_write_observation_case1() {
    let registry = StreamRegistry::new();
    let write = registry.write("operations/x/streams/stdout");

    assert_eq!(write.committed_size(), 0);
    write.append(b"hello ");
    write.append(b"world");
    assert_eq!(write.committed_size(), 11);
    assert!(!write.is_complete());

    let source = registry.source("operations/x/streams/stdout");
    let closed = tokio::spawn({
        let source = source.clone();
        async move { source.closed().await }
    });
    write.close();
    timeout(Duration::from_secs(1), closed)
        .await
        .expect("closed future should resolve")
        .expect("should succeed");
}

/// # Case 2: a reader drains committed bytes and ends after close
#[tokio::test]
async fn test_reader_drains_case2() {
    let registry = StreamRegistry::new();
    let write = registry.write("operations/y/streams/stdout");
    write.append(b"first chunk");

    let mut reader = registry.source("operations/y/streams/stdout").open(0);
    let chunk = reader.next_chunk().await.expect("bytes available");
    assert_eq!(chunk.as_ref(), b"first chunk");

    write.append(b", second");
    let chunk = reader.next_chunk().await.expect("bytes available");
    assert_eq!(chunk.as_ref(), b", second");

    write.close();
    assert!(reader.next_chunk().await.is_none());
}

/// # Case 3: a reader opened at an offset skips committed bytes
#[tokio::test]
async fn test_reader_offset_case3() {
    let registry = StreamRegistry::new();
    let write = registry.write("operations/z/streams/stderr");
    write.append(b"0123456789");
    write.close();

    let mut reader = registry.source("operations/z/streams/stderr").open(4);
    let chunk = reader.next_chunk().await.expect("bytes available");
    assert_eq!(chunk.as_ref(), b"456789");
    assert!(reader.next_chunk().await.is_none());
}

/// # Case 4: a blocked reader wakes on append
#[tokio::test]
async fn test_reader_wakes_case4() {
    let registry = StreamRegistry::new();
    let mut reader = registry.source("operations/w/streams/stdout").open(0);

    let pending = tokio::spawn(async move { reader.next_chunk().await });
    tokio::task::yield_now().await;

    registry.write("operations/w/streams/stdout").append(b"late data");
    let chunk = timeout(Duration::from_secs(1), pending)
        .await
        .expect("reader should wake")
        .expect("should succeed")
        .expect("bytes available");
    assert_eq!(chunk.as_ref(), b"late data");
}

/// # Case 5: close removes the registry entry; reset drops it silently
#[tokio::test]
async fn test_registry_removal_case5() {
    let registry = StreamRegistry::new();
    let write = registry.write("operations/v/streams/stdout");
    write.append(b"data");
    assert!(registry.contains("operations/v/streams/stdout"));

    write.close();
    assert!(!registry.contains("operations/v/streams/stdout"));

    let write = registry.write("operations/v/streams/stdout");
    write.append(b"fresh");
    registry.reset("operations/v/streams/stdout");
    assert!(!registry.contains("operations/v/streams/stdout"));
    // a new source starts empty
    assert_eq!(registry.write("operations/v/streams/stdout").committed_size(), 0);
}

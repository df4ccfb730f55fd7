use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use super::matcher::on_match;
use super::matcher::satisfies;
use super::matcher::Matcher;
use super::matcher::QueuedEntry;
use crate::proto::Operation;
use crate::proto::Platform;
use crate::proto::Property;
use crate::ExecutionError;

fn platform(pairs: &[(&str, &str)]) -> Platform {
    Platform {
        properties: pairs
            .iter()
            .map(|(name, value)| Property {
                name: name.to_string(),
                value: value.to_string(),
            })
            .collect(),
    }
}

fn entry(
    name: &str,
    requirements: Platform,
) -> QueuedEntry {
    QueuedEntry {
        operation: Operation {
            name: name.to_string(),
            ..Default::default()
        },
        requirements,
    }
}

/// # Case 1: empty requirements are satisfied by any worker; extras are fine
#[test]
fn test_satisfies_case1() {
    assert!(satisfies(&platform(&[]), &platform(&[])));
    assert!(satisfies(&platform(&[("os", "linux")]), &platform(&[])));
    assert!(satisfies(
        &platform(&[("os", "linux"), ("arch", "x86_64")]),
        &platform(&[("os", "linux")])
    ));
}

/// # Case 2: every required pair must be present; comparison is byte-exact
#[test]
fn test_satisfies_case2() {
    assert!(!satisfies(&platform(&[]), &platform(&[("os", "linux")])));
    assert!(!satisfies(
        &platform(&[("os", "Linux")]),
        &platform(&[("os", "linux")])
    ));
    assert!(!satisfies(
        &platform(&[("os", "linux")]),
        &platform(&[("os", "linux"), ("arch", "arm64")])
    ));
}

/// # Case 3: duplicate names contribute a value set
#[test]
fn test_satisfies_case3() {
    let offered = platform(&[("policy", "a"), ("policy", "b")]);
    assert!(satisfies(&offered, &platform(&[("policy", "a"), ("policy", "b")])));
    assert!(!satisfies(&offered, &platform(&[("policy", "c")])));
}

/// # Case 4: offer with an empty queue parks the worker
#[tokio::test]
async fn test_offer_parks_case4() {
    let matcher = Matcher::new();
    let outcome = matcher
        .offer(platform(&[("os", "linux")]), on_match(|_| async { Ok(true) }))
        .await
        .expect("should succeed");
    assert!(outcome.parked);
    assert!(outcome.dispatched.is_none());
    assert_eq!(matcher.parked_len().await, 1);
}

/// # Case 5: enqueue dispatches to the first satisfying parked worker and
/// re-parks the ones it skipped
#[tokio::test]
async fn test_enqueue_dispatches_case5() {
    let matcher = Matcher::new();
    matcher
        .offer(platform(&[("os", "macos")]), on_match(|_| async { Ok(true) }))
        .await
        .expect("should succeed");
    matcher
        .offer(platform(&[("os", "linux")]), on_match(|_| async { Ok(true) }))
        .await
        .expect("should succeed");

    let dispatched = matcher
        .enqueue(entry("operations/a", platform(&[("os", "linux")])))
        .await
        .expect("should succeed");
    assert!(dispatched);
    // the macos worker was skipped, not consumed
    assert_eq!(matcher.parked_len().await, 1);
    assert_eq!(matcher.queued_len().await, 0);
}

/// # Case 6: an inviable worker is discarded while the operation survives
#[tokio::test]
async fn test_enqueue_inviable_worker_case6() {
    let matcher = Matcher::new();
    matcher
        .offer(platform(&[("os", "linux")]), on_match(|_| async { Ok(false) }))
        .await
        .expect("should succeed");

    let dispatched = matcher
        .enqueue(entry("operations/b", platform(&[("os", "linux")])))
        .await
        .expect("should succeed");
    assert!(!dispatched);
    assert_eq!(matcher.parked_len().await, 0);
    assert_eq!(matcher.queued_len().await, 1);
}

/// # Case 7: offer scans FIFO, consumes scanned entries, and dispatches the
/// first satisfying one
#[tokio::test]
async fn test_offer_scans_fifo_case7() {
    let matcher = Matcher::new();
    matcher
        .enqueue(entry("operations/gpu", platform(&[("gpu", "a100")])))
        .await
        .expect("should succeed");
    matcher
        .enqueue(entry("operations/cpu", platform(&[("os", "linux")])))
        .await
        .expect("should succeed");

    let outcome = matcher
        .offer(platform(&[("os", "linux")]), on_match(|_| async { Ok(true) }))
        .await
        .expect("should succeed");
    assert_eq!(
        outcome.dispatched.as_ref().map(|op| op.name.as_str()),
        Some("operations/cpu")
    );
    assert!(!outcome.parked);
    // the gpu entry was consumed by the scan and handed back for requeue
    assert_eq!(outcome.set_aside.len(), 1);
    assert_eq!(outcome.set_aside[0].operation.name, "operations/gpu");
    assert_eq!(matcher.queued_len().await, 0);
}

/// # Case 8: an inviable offer neither dispatches nor parks; the candidate
/// is set aside for requeue
#[tokio::test]
async fn test_offer_inviable_case8() {
    let matcher = Matcher::new();
    matcher
        .enqueue(entry("operations/c", platform(&[("os", "linux")])))
        .await
        .expect("should succeed");

    let outcome = matcher
        .offer(platform(&[("os", "linux")]), on_match(|_| async { Ok(false) }))
        .await
        .expect("should succeed");
    assert!(outcome.dispatched.is_none());
    assert!(!outcome.parked);
    assert_eq!(outcome.set_aside.len(), 1);
    assert_eq!(matcher.parked_len().await, 0);
}

/// # Case 9: interruption inside on_match loses the offer and restores the
/// queue
#[tokio::test]
async fn test_offer_interrupted_case9() {
    let matcher = Matcher::new();
    matcher
        .enqueue(entry("operations/first", platform(&[("gpu", "a100")])))
        .await
        .expect("should succeed");
    matcher
        .enqueue(entry("operations/second", platform(&[("os", "linux")])))
        .await
        .expect("should succeed");

    let err = matcher
        .offer(
            platform(&[("os", "linux")]),
            on_match(|_| async { Err(ExecutionError::Interrupted("worker hung up".into()).into()) }),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        crate::Error::Execution(ExecutionError::Interrupted(_))
    ));
    // both entries back in order, no worker parked
    assert_eq!(matcher.queued_len().await, 2);
    assert_eq!(matcher.parked_len().await, 0);
}

/// # Case 10: workers are considered in insertion order; first satisfying
/// pair wins
#[tokio::test]
async fn test_first_worker_wins_case10() {
    let matcher = Matcher::new();
    let first_hits = Arc::new(AtomicUsize::new(0));
    let second_hits = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&first_hits);
    matcher
        .offer(
            platform(&[("os", "linux")]),
            on_match(move |_| async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(true)
            }),
        )
        .await
        .expect("should succeed");
    let counter = Arc::clone(&second_hits);
    matcher
        .offer(
            platform(&[("os", "linux")]),
            on_match(move |_| async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(true)
            }),
        )
        .await
        .expect("should succeed");

    matcher
        .enqueue(entry("operations/d", platform(&[("os", "linux")])))
        .await
        .expect("should succeed");

    assert_eq!(first_hits.load(Ordering::SeqCst), 1);
    assert_eq!(second_hits.load(Ordering::SeqCst), 0);
    assert_eq!(matcher.parked_len().await, 1);
}

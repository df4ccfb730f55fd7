use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::advance;
use tokio::time::sleep;

use super::watchdog::Watchdog;

fn counting(counter: &Arc<AtomicUsize>) -> impl FnOnce() -> futures::future::BoxFuture<'static, ()> {
    let counter = Arc::clone(counter);
    move || {
        Box::pin(async move {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }
}

/// # Case 1: fires once after the timeout with no pets
#[tokio::test(start_paused = true)]
async fn test_fires_after_timeout_case1() {
    let fired = Arc::new(AtomicUsize::new(0));
    let _dog = Watchdog::start(Duration::from_secs(5), counting(&fired));

    advance(Duration::from_secs(4)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);

    advance(Duration::from_secs(2)).await;
    // yield so the watchdog task observes the deadline
    sleep(Duration::from_millis(1)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

/// # Case 2: pets reset the remaining interval
#[tokio::test(start_paused = true)]
async fn test_pet_resets_case2() {
    let fired = Arc::new(AtomicUsize::new(0));
    let dog = Watchdog::start(Duration::from_secs(5), counting(&fired));

    for _ in 0..3 {
        advance(Duration::from_secs(4)).await;
        dog.pet();
        sleep(Duration::from_millis(1)).await;
    }
    assert_eq!(fired.load(Ordering::SeqCst), 0);

    advance(Duration::from_secs(6)).await;
    sleep(Duration::from_millis(1)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

/// # Case 3: stop disarms; the callback never runs
#[tokio::test(start_paused = true)]
async fn test_stop_disarms_case3() {
    let fired = Arc::new(AtomicUsize::new(0));
    let dog = Watchdog::start(Duration::from_secs(5), counting(&fired));

    dog.stop();
    advance(Duration::from_secs(10)).await;
    sleep(Duration::from_millis(1)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

/// # Case 4: pet and stop after firing are no-ops; firing is single-shot
#[tokio::test(start_paused = true)]
async fn test_post_fire_idempotence_case4() {
    let fired = Arc::new(AtomicUsize::new(0));
    let dog = Watchdog::start(Duration::from_secs(1), counting(&fired));

    advance(Duration::from_secs(2)).await;
    sleep(Duration::from_millis(1)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);

    dog.pet();
    dog.stop();
    advance(Duration::from_secs(10)).await;
    sleep(Duration::from_millis(1)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

/// # Case 5: dropping the handle disarms
#[tokio::test(start_paused = true)]
async fn test_drop_disarms_case5() {
    let fired = Arc::new(AtomicUsize::new(0));
    let dog = Watchdog::start(Duration::from_secs(5), counting(&fired));

    drop(dog);
    advance(Duration::from_secs(10)).await;
    sleep(Duration::from_millis(1)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

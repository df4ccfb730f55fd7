use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::watch;
use tokio::time::sleep_until;
use tokio::time::Instant;

/// Single-shot inactivity timer.
///
/// Constructed armed with `(timeout, on_expire)`. `pet()` resets the
/// remaining interval; `stop()` disarms. If no pet arrives within `timeout`,
/// `on_expire` runs exactly once on the watchdog's own task. `pet` and
/// `stop` are idempotent and are no-ops after firing. Dropping the handle
/// also disarms.
///
/// Used in two modes: petted (requeue guard, reset by worker polls) and
/// un-petted (absolute completion deadline).
pub struct Watchdog {
    pet_tx: mpsc::UnboundedSender<()>,
    stop_tx: watch::Sender<bool>,
}

impl Watchdog {
    pub fn start<F, Fut>(
        timeout: Duration,
        on_expire: F,
    ) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (pet_tx, mut pet_rx) = mpsc::unbounded_channel::<()>();
        let (stop_tx, mut stop_rx) = watch::channel(false);

        tokio::spawn(async move {
            let mut on_expire = Some(on_expire);
            let mut deadline = Instant::now() + timeout;
            loop {
                tokio::select! {
                    _ = sleep_until(deadline) => {
                        if let Some(expire) = on_expire.take() {
                            expire().await;
                        }
                        break;
                    }
                    pet = pet_rx.recv() => match pet {
                        Some(()) => deadline = Instant::now() + timeout,
                        // all handles dropped: disarm
                        None => break,
                    },
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }
        });

        Self { pet_tx, stop_tx }
    }

    /// Resets the remaining interval. No-op once fired or stopped.
    pub fn pet(&self) {
        let _ = self.pet_tx.send(());
    }

    /// Disarms the timer. No-op once fired; safe to call repeatedly.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
    }
}

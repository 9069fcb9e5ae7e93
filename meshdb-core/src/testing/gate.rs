//! Delay that holds each suspension until the test releases it

use crate::simulation::Delay;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Duration;
use tokio::sync::Notify;

/// Lets a test observe state while an operation is suspended
///
/// Every `pause` signals [`GatedDelay::entered`] and then waits for one
/// [`GatedDelay::release`].
#[derive(Debug, Default)]
pub struct GatedDelay {
    entered: Notify,
    released: Notify,
    requested: Mutex<Vec<Duration>>,
}

impl GatedDelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until an operation has reached its suspension point
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    /// Let one suspended operation continue
    pub fn release(&self) {
        self.released.notify_one();
    }

    pub fn requested(&self) -> Vec<Duration> {
        self.requested.lock().clone()
    }
}

#[async_trait]
impl Delay for GatedDelay {
    async fn pause(&self, duration: Duration) {
        self.requested.lock().push(duration);
        self.entered.notify_one();
        self.released.notified().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn test_pause_waits_for_release() {
        let gate = Arc::new(GatedDelay::new());
        let done = Arc::new(AtomicBool::new(false));

        let task = {
            let gate = gate.clone();
            let done = done.clone();
            tokio::spawn(async move {
                gate.pause(Duration::from_millis(5)).await;
                done.store(true, Ordering::SeqCst);
            })
        };

        gate.entered().await;
        assert!(!done.load(Ordering::SeqCst));
        gate.release();
        task.await.unwrap();
        assert!(done.load(Ordering::SeqCst));
        assert_eq!(gate.requested(), vec![Duration::from_millis(5)]);
    }
}

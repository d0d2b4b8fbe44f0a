//! Cancellation for a live run: one handle, any number of tokens, built on a watch channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn token(&self) -> CancelToken {
        CancelToken {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancelled. Never resolves if the handle is dropped uncancelled.
    pub async fn cancelled(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Sleeps for `duration` unless cancelled first. Returns true when the full sleep elapsed.
/// A zero duration still yields once so other cooperative tasks get a turn.
pub async fn sleep_or_cancel(duration: Duration, token: &mut CancelToken) -> bool {
    if token.is_cancelled() {
        return false;
    }
    if duration.is_zero() {
        tokio::task::yield_now().await;
        return !token.is_cancelled();
    }
    let slept = tokio::select! {
        _ = tokio::time::sleep(duration) => true,
        _ = token.cancelled() => false,
    };
    slept && !token.is_cancelled()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancel_interrupts_long_sleep() {
        let handle = CancelHandle::new();
        let mut token = handle.token();
        let canceller = handle.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });
        let finished = sleep_or_cancel(Duration::from_secs(30), &mut token).await;
        assert!(!finished);
        assert!(handle.is_cancelled());
    }

    #[tokio::test]
    async fn uncancelled_sleep_completes() {
        let handle = CancelHandle::new();
        let mut token = handle.token();
        assert!(sleep_or_cancel(Duration::from_millis(1), &mut token).await);
        assert!(sleep_or_cancel(Duration::ZERO, &mut token).await);
    }

    #[tokio::test]
    async fn tokens_created_after_cancel_see_it() {
        let handle = CancelHandle::new();
        handle.cancel();
        let mut token = handle.token();
        assert!(token.is_cancelled());
        assert!(!sleep_or_cancel(Duration::from_secs(5), &mut token).await);
    }
}

//! Cooperative shutdown signalling, standing in for
//! `tokio_util::sync::CancellationToken` (not part of our dependency
//! stack) with the same "signal once, every clone observes it" shape,
//! built on a `tokio::sync::watch` channel.

use tokio::sync::watch;

#[derive(Clone)]
pub struct ShutdownSignal {
    tx: watch::Sender<bool>,
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self { tx, rx }
    }

    /// A clone sharing the same underlying signal; kept as a distinct
    /// method (rather than plain `clone()`) to mirror
    /// `CancellationToken::child_token()` call sites in the platform
    /// workspace.
    pub fn child(&self) -> Self {
        self.clone()
    }

    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if *rx.borrow() {
            return;
        }
        while rx.changed().await.is_ok() {
            if *rx.borrow() {
                return;
            }
        }
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancelled_resolves_after_cancel() {
        let signal = ShutdownSignal::new();
        let child = signal.child();
        assert!(!child.is_cancelled());
        signal.cancel();
        child.cancelled().await;
        assert!(child.is_cancelled());
    }

    #[tokio::test]
    async fn already_cancelled_resolves_immediately() {
        let signal = ShutdownSignal::new();
        signal.cancel();
        signal.cancelled().await;
    }
}

//! Single-slot "refresh now" mailbox

use tokio::sync::mpsc;
use tracing::debug;

/// Sending side. Cloneable; a request made while one is pending is dropped.
#[derive(Debug, Clone)]
pub struct RefreshTrigger {
    tx: mpsc::Sender<()>,
}

/// Receiving side, owned by the fetch engine
#[derive(Debug)]
pub struct RefreshReceiver {
    rx: mpsc::Receiver<()>,
}

pub fn refresh_trigger() -> (RefreshTrigger, RefreshReceiver) {
    let (tx, rx) = mpsc::channel(1);
    (RefreshTrigger { tx }, RefreshReceiver { rx })
}

impl RefreshTrigger {
    /// Returns `false` when a refresh was already pending (or the engine is gone)
    pub fn request(&self) -> bool {
        match self.tx.try_send(()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(())) => {
                debug!("Refresh already pending, request dropped");
                false
            }
            Err(mpsc::error::TrySendError::Closed(())) => false,
        }
    }
}

impl RefreshReceiver {
    /// Waits for a pending request; `None` once every trigger has been dropped
    pub async fn recv(&mut self) -> Option<()> {
        self.rx.recv().await
    }

    /// Drain one pending request without waiting
    pub fn try_recv(&mut self) -> bool {
        self.rx.try_recv().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_request_is_coalesced() {
        let (trigger, mut receiver) = refresh_trigger();
        assert!(trigger.request());
        assert!(!trigger.request());
        assert!(!trigger.clone().request());

        assert!(receiver.try_recv());
        assert!(!receiver.try_recv());

        assert!(trigger.request());
    }

    #[test]
    fn test_request_after_receiver_dropped() {
        let (trigger, receiver) = refresh_trigger();
        drop(receiver);
        assert!(!trigger.request());
    }
}

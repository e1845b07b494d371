use std::sync::Arc;

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::debug;

use crate::model::PaymentStatus;

/// Holder of the current [`PaymentStatus`] for one workflow instance.
///
/// Clones share the same status. Readers subscribe for changes; only the
/// submitter and the poller write.
#[derive(Debug, Clone)]
pub struct WorkflowState {
    tx: Arc<watch::Sender<PaymentStatus>>,
}

impl WorkflowState {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(PaymentStatus::Idle);
        Self { tx: Arc::new(tx) }
    }

    pub fn status(&self) -> PaymentStatus {
        *self.tx.borrow()
    }

    /// Overwrite the status and notify subscribers if it changed.
    pub fn set(&self, status: PaymentStatus) {
        let previous = self.tx.send_replace(status);
        if previous != status {
            debug!(from = %previous, to = %status, "payment status changed");
        }
    }

    /// Move to `processing` unless a payment is already in flight.
    ///
    /// Returns `false` and leaves the status untouched when it already
    /// was `processing`.
    pub fn begin_processing(&self) -> bool {
        let mut previous = PaymentStatus::Processing;
        let started = self.tx.send_if_modified(|status| {
            if *status == PaymentStatus::Processing {
                return false;
            }
            previous = *status;
            *status = PaymentStatus::Processing;
            true
        });
        if started {
            debug!(from = %previous, to = "processing", "payment status changed");
        }
        started
    }

    pub fn subscribe(&self) -> watch::Receiver<PaymentStatus> {
        self.tx.subscribe()
    }

    /// Stream of statuses, starting with the current one.
    pub fn changes(&self) -> WatchStream<PaymentStatus> {
        WatchStream::new(self.subscribe())
    }

    /// Wait until no payment is in flight and return the status.
    pub async fn settled(&self) -> PaymentStatus {
        let mut rx = self.subscribe();
        match rx.wait_for(|status| *status != PaymentStatus::Processing).await {
            Ok(status) => *status,
            // the sender lives in `self`, so this cannot close while we wait
            Err(_) => self.status(),
        }
    }
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self::new()
    }
}

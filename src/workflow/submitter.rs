use std::sync::Arc;

use tracing::{info, warn};

use super::error::SubmissionError;
use super::poller::{PollHandle, Poller};
use super::state::WorkflowState;
use crate::gateway::PaymentGateway;
use crate::model::{CardInput, PaymentRequest, PaymentStatus};

/// Sends payments and hands accepted ones to the [`Poller`].
pub struct Submitter {
    gateway: Arc<dyn PaymentGateway>,
    state: WorkflowState,
    poller: Poller,
}

impl Submitter {
    pub fn new(gateway: Arc<dyn PaymentGateway>, state: WorkflowState, poller: Poller) -> Self {
        Self {
            gateway,
            state,
            poller,
        }
    }

    /// Submit a validated card snapshot.
    ///
    /// The status becomes `processing` before any network activity. On
    /// success polling has started and the returned handle owns it; on
    /// any failure the status is `failed` and nothing else happens.
    pub async fn submit(&self, card: &CardInput) -> Result<PollHandle, SubmissionError> {
        if !self.state.begin_processing() {
            return Err(SubmissionError::InFlight);
        }

        let request = PaymentRequest::new(card);

        match self.gateway.submit(&request).await {
            Ok(pid) => {
                info!(id = request.id(), pid = %pid, "payment submitted");
                Ok(self.poller.start(pid))
            }
            Err(e) => {
                warn!(id = request.id(), reason = %e, "payment submission failed");
                self.state.set(PaymentStatus::Failed);
                Err(e.into())
            }
        }
    }
}

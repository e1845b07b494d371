//! Payment workflow.
//!
//! One [`Workflow`] drives one payment form: it owns the form, the
//! status container and the polling loop of the latest submission.
//! Status only moves through the submitter and the poller; everything
//! else reads it or subscribes to it.

use std::sync::Arc;

use tracing::debug;

use crate::config::Config;
use crate::form::CardForm;
use crate::gateway::PaymentGateway;
use crate::model::{CardInput, Field, PaymentStatus, Pid};
use crate::validate::FieldError;

mod error;
pub use error::{PollError, SubmissionError, WorkflowError};

mod poller;
pub use poller::{PollExit, PollHandle, Poller};

mod state;
pub use state::WorkflowState;

mod submitter;
pub use submitter::Submitter;

/// A single payment workflow instance.
pub struct Workflow {
    form: CardForm,
    state: WorkflowState,
    submitter: Submitter,
    poll: Option<PollHandle>,
}

/// Public API
impl Workflow {
    pub fn new(gateway: Arc<dyn PaymentGateway>, config: &Config) -> Self {
        Self::with_state(gateway, config, WorkflowState::new())
    }

    /// Build a workflow around an existing status container.
    pub fn with_state(
        gateway: Arc<dyn PaymentGateway>,
        config: &Config,
        state: WorkflowState,
    ) -> Self {
        let poller = Poller::new(gateway.clone(), state.clone(), config.poll_interval);
        Self {
            form: CardForm::new(config.expiry_window),
            submitter: Submitter::new(gateway, state.clone(), poller),
            state,
            poll: None,
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn status(&self) -> PaymentStatus {
        self.state.status()
    }

    pub fn form(&self) -> &CardForm {
        &self.form
    }

    /// Apply a keystroke-level edit. Inputs are locked while processing.
    pub fn edit(&mut self, field: Field, raw: &str) -> Result<(), WorkflowError> {
        if self.is_processing() {
            return Err(WorkflowError::Locked);
        }
        self.form.set_field(field, raw);
        Ok(())
    }

    /// Fill every field from `card`, as if typed in.
    pub fn fill(&mut self, card: &CardInput) -> Result<(), WorkflowError> {
        for field in Field::ALL {
            self.edit(field, card.get(field))?;
        }
        Ok(())
    }

    /// Validate `field` as it loses focus.
    pub fn blur(&mut self, field: Field) -> Option<&FieldError> {
        self.form.blur(field)
    }

    /// Whether the submit affordance is enabled: the form has been
    /// edited, currently validates, and no payment is in flight.
    pub fn can_submit(&self) -> bool {
        !self.is_processing() && self.form.is_dirty() && self.form.is_valid()
    }

    /// Validate the form and submit the payment.
    ///
    /// Any previous polling loop is cancelled first. Returns the pid the
    /// new loop polls for; the outcome arrives through [`Self::state`].
    pub async fn submit(&mut self) -> Result<Pid, WorkflowError> {
        if self.is_processing() {
            return Err(SubmissionError::InFlight.into());
        }
        if !self.form.is_dirty() {
            return Err(WorkflowError::Pristine);
        }
        let card = self.form.validate_all()?;

        if let Some(previous) = self.poll.take() {
            debug!(pid = %previous.pid(), "cancelling previous polling loop");
            previous.cancel();
        }

        let handle = self.submitter.submit(&card).await?;
        let pid = handle.pid().clone();
        self.poll = Some(handle);
        Ok(pid)
    }

    /// Wait until the current payment leaves `processing`.
    pub async fn settled(&self) -> PaymentStatus {
        self.state.settled().await
    }

    pub fn poll_handle(&self) -> Option<&PollHandle> {
        self.poll.as_ref()
    }

    pub fn take_poll_handle(&mut self) -> Option<PollHandle> {
        self.poll.take()
    }
}

/// Private API
impl Workflow {
    fn is_processing(&self) -> bool {
        self.state.status() == PaymentStatus::Processing
    }
}

impl Drop for Workflow {
    fn drop(&mut self) {
        if let Some(handle) = &self.poll {
            handle.cancel();
        }
    }
}

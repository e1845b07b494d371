//! Error types for the payment workflow.

use thiserror::Error;

use crate::gateway::GatewayError;
use crate::validate::ValidationErrors;

/// Top-level error returned by [`Workflow`](super::Workflow) operations.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("inputs are locked while a payment is processing")]
    Locked,

    #[error("no field has been filled in")]
    Pristine,

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

/// Error while sending a payment.
///
/// Except for `InFlight`, the workflow status is `failed` once this is
/// returned.
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("a payment is already being processed")]
    InFlight,

    #[error("payment submission failed: {0}")]
    Gateway(#[from] GatewayError),
}

/// Error while checking the status of a submitted payment.
#[derive(Debug, Error)]
#[error("payment status check failed: {0}")]
pub struct PollError(#[from] pub GatewayError);

//! Core domain types for the payment workflow.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::normalize::strip_pan;

/// Card fields as entered by the user.
///
/// `pan` holds the display form (digits grouped by 4) while the form is
/// being edited; the request params carry the stripped digits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardInput {
    pub pan: String,
    pub expire: String,
    pub cardholder: String,
    pub cvc: String,
}

impl CardInput {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Pan => &self.pan,
            Field::Expire => &self.expire,
            Field::Cardholder => &self.cardholder,
            Field::Cvc => &self.cvc,
        }
    }

    pub fn get_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Pan => &mut self.pan,
            Field::Expire => &mut self.expire,
            Field::Cardholder => &mut self.cardholder,
            Field::Cvc => &mut self.cvc,
        }
    }
}

/// One input of the card form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Pan,
    Expire,
    Cardholder,
    Cvc,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Pan, Field::Expire, Field::Cardholder, Field::Cvc];

    pub fn name(self) -> &'static str {
        match self {
            Field::Pan => "pan",
            Field::Expire => "expire",
            Field::Cardholder => "cardholder",
            Field::Cvc => "cvc",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Processor-assigned transaction identifier, the polling key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pid(String);

impl Pid {
    pub fn new(value: impl Into<String>) -> Self {
        Pid(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle phase of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaymentStatus {
    #[default]
    Idle,
    Processing,
    Succeeded,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Idle => "idle",
            PaymentStatus::Processing => "processing",
            PaymentStatus::Succeeded => "succeeded",
            PaymentStatus::Failed => "failed",
        }
    }

    /// `succeeded` and `failed` need a fresh submission to be left.
    pub fn is_terminal(self) -> bool {
        matches!(self, PaymentStatus::Succeeded | PaymentStatus::Failed)
    }

    /// Text shown to the user once the payment settles.
    pub fn outcome_message(self) -> Option<&'static str> {
        match self {
            PaymentStatus::Succeeded => Some("Payment completed successfully"),
            PaymentStatus::Failed => Some("An error occurred"),
            PaymentStatus::Idle | PaymentStatus::Processing => None,
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized payment status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for PaymentStatus {
    type Err = UnknownStatus;

    /// Accepts the canonical names and the processor's short vocabulary
    /// (`process`, `ok`, `fail`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(PaymentStatus::Idle),
            "processing" | "process" => Ok(PaymentStatus::Processing),
            "succeeded" | "ok" => Ok(PaymentStatus::Succeeded),
            "failed" | "fail" => Ok(PaymentStatus::Failed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// JSON-RPC envelope sent to the processor.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentRequest {
    jsonrpc: &'static str,
    id: String,
    method: &'static str,
    params: CardInput,
}

impl PaymentRequest {
    pub const PROTOCOL_VERSION: &'static str = "2.0";
    pub const METHOD: &'static str = "pay";

    /// Build a request from a validated card snapshot with a fresh id.
    pub fn new(card: &CardInput) -> Self {
        Self {
            jsonrpc: Self::PROTOCOL_VERSION,
            id: uuid::Uuid::new_v4().to_string(),
            method: Self::METHOD,
            params: CardInput {
                pan: strip_pan(&card.pan),
                ..card.clone()
            },
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn params(&self) -> &CardInput {
        &self.params
    }
}

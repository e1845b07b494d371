//! Per-field acceptance rules for the card form.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::model::{CardInput, Field};
use crate::normalize::strip_pan;

pub const PAN_MIN_DIGITS: usize = 13;
pub const PAN_MAX_DIGITS: usize = 19;

static EXPIRE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0[1-9]|1[0-2])/([0-9]{2})$").expect("valid expire pattern"));
static CARDHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]+ [A-Za-z]+$").expect("valid cardholder pattern"));
static CVC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{3}$").expect("valid cvc pattern"));

const PAN_MESSAGE: &str = "The card number is incorrect. Please check the number of digits \
                           entered and their order";

/// Why a field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorKind {
    Required,
    InvalidLength,
    InvalidFormat,
}

/// A rejected field with the message shown next to it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FieldError {
    field: Field,
    kind: FieldErrorKind,
    message: String,
}

impl FieldError {
    fn new(field: Field, kind: FieldErrorKind, message: impl Into<String>) -> Self {
        Self {
            field,
            kind,
            message: message.into(),
        }
    }

    fn required(field: Field) -> Self {
        let message = match field {
            Field::Pan => "Card number is required",
            Field::Expire => "Expiry date is required",
            Field::Cardholder => "Cardholder name is required",
            Field::Cvc => "CVC is required",
        };
        Self::new(field, FieldErrorKind::Required, message)
    }

    pub fn field(&self) -> Field {
        self.field
    }

    pub fn kind(&self) -> FieldErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Every field that failed on submit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} invalid field(s): {}", .0.len(), fields(.0))]
pub struct ValidationErrors(Vec<FieldError>);

fn fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.field.name())
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn get(&self, field: Field) -> Option<&FieldError> {
        self.0.iter().find(|e| e.field == field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Accepted range of two-digit expiry years, inclusive.
///
/// A fixed policy, not derived from the current date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryWindow {
    first: u8,
    last: u8,
}

impl ExpiryWindow {
    pub fn new(first: u8, last: u8) -> Option<Self> {
        (first <= last && last <= 99).then_some(Self { first, last })
    }

    pub fn contains(&self, year: u8) -> bool {
        (self.first..=self.last).contains(&year)
    }

    pub fn first(&self) -> u8 {
        self.first
    }

    pub fn last(&self) -> u8 {
        self.last
    }
}

impl Default for ExpiryWindow {
    fn default() -> Self {
        Self { first: 21, last: 26 }
    }
}

impl fmt::Display for ExpiryWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.first, self.last)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid expiry window '{0}', expected YY-YY")]
pub struct InvalidExpiryWindow(pub String);

impl FromStr for ExpiryWindow {
    type Err = InvalidExpiryWindow;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || InvalidExpiryWindow(s.to_string());
        let (first, last) = s.split_once('-').ok_or_else(err)?;
        let first = first.trim().parse().map_err(|_| err())?;
        let last = last.trim().parse().map_err(|_| err())?;
        ExpiryWindow::new(first, last).ok_or_else(err)
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Card number: 13 to 19 digits once spaces are removed.
pub fn validate_pan(value: &str) -> Result<(), FieldError> {
    if is_blank(value) {
        return Err(FieldError::required(Field::Pan));
    }
    let digits = strip_pan(value);
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(FieldError::new(
            Field::Pan,
            FieldErrorKind::InvalidFormat,
            PAN_MESSAGE,
        ));
    }
    if !(PAN_MIN_DIGITS..=PAN_MAX_DIGITS).contains(&digits.len()) {
        return Err(FieldError::new(
            Field::Pan,
            FieldErrorKind::InvalidLength,
            PAN_MESSAGE,
        ));
    }
    Ok(())
}

/// Expiry date: `MM/YY` with the month in 01-12 and the year in `window`.
pub fn validate_expire(value: &str, window: &ExpiryWindow) -> Result<(), FieldError> {
    if is_blank(value) {
        return Err(FieldError::required(Field::Expire));
    }
    let in_window = EXPIRE_RE
        .captures(value)
        .and_then(|caps| caps[2].parse::<u8>().ok())
        .is_some_and(|year| window.contains(year));
    if !in_window {
        return Err(FieldError::new(
            Field::Expire,
            FieldErrorKind::InvalidFormat,
            format!("Date must be in MM/YY format (01-12 / {window})"),
        ));
    }
    Ok(())
}

/// Cardholder: first and last name, letters only.
pub fn validate_cardholder(value: &str) -> Result<(), FieldError> {
    if is_blank(value) {
        return Err(FieldError::required(Field::Cardholder));
    }
    if !CARDHOLDER_RE.is_match(value) {
        return Err(FieldError::new(
            Field::Cardholder,
            FieldErrorKind::InvalidFormat,
            "Enter first and last name without digits",
        ));
    }
    Ok(())
}

/// CVC: exactly 3 digits.
pub fn validate_cvc(value: &str) -> Result<(), FieldError> {
    if is_blank(value) {
        return Err(FieldError::required(Field::Cvc));
    }
    if !CVC_RE.is_match(value) {
        return Err(FieldError::new(
            Field::Cvc,
            FieldErrorKind::InvalidFormat,
            "CVC must be 3 digits",
        ));
    }
    Ok(())
}

pub fn validate_field(field: Field, value: &str, window: &ExpiryWindow) -> Result<(), FieldError> {
    match field {
        Field::Pan => validate_pan(value),
        Field::Expire => validate_expire(value, window),
        Field::Cardholder => validate_cardholder(value),
        Field::Cvc => validate_cvc(value),
    }
}

/// Validate every field, collecting all failures.
pub fn validate_card(card: &CardInput, window: &ExpiryWindow) -> Result<(), ValidationErrors> {
    let errors: Vec<FieldError> = Field::ALL
        .into_iter()
        .filter_map(|field| validate_field(field, card.get(field), window).err())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}

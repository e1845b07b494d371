//! Card form state: current values, dirty tracking and blur-time errors.

use std::collections::HashMap;

use crate::model::{CardInput, Field};
use crate::normalize::{format_pan, normalize_cvc};
use crate::validate::{ExpiryWindow, FieldError, ValidationErrors, validate_card, validate_field};

/// The editable card form.
///
/// Errors are only refreshed when a field loses focus or on submit, so
/// a field being typed into keeps its last reported error.
#[derive(Debug, Default)]
pub struct CardForm {
    input: CardInput,
    errors: HashMap<Field, FieldError>,
    window: ExpiryWindow,
}

impl CardForm {
    pub fn new(window: ExpiryWindow) -> Self {
        Self {
            window,
            ..Self::default()
        }
    }

    pub fn input(&self) -> &CardInput {
        &self.input
    }

    /// Store a new raw value for `field`, normalizing it on the way in.
    pub fn set_field(&mut self, field: Field, raw: &str) {
        let value = match field {
            Field::Pan => format_pan(raw),
            Field::Cvc => normalize_cvc(raw),
            Field::Expire | Field::Cardholder => raw.to_string(),
        };
        *self.input.get_mut(field) = value;
    }

    /// Validate `field` as it loses focus; returns its current error.
    pub fn blur(&mut self, field: Field) -> Option<&FieldError> {
        match validate_field(field, self.input.get(field), &self.window) {
            Ok(()) => {
                self.errors.remove(&field);
                None
            }
            Err(e) => {
                self.errors.insert(field, e);
                self.errors.get(&field)
            }
        }
    }

    pub fn error(&self, field: Field) -> Option<&FieldError> {
        self.errors.get(&field)
    }

    /// Whether any field differs from its initial empty value.
    pub fn is_dirty(&self) -> bool {
        self.input != CardInput::default()
    }

    pub fn is_valid(&self) -> bool {
        validate_card(&self.input, &self.window).is_ok()
    }

    /// Validate every field and take a snapshot for submission.
    pub fn validate_all(&mut self) -> Result<CardInput, ValidationErrors> {
        self.errors.clear();
        match validate_card(&self.input, &self.window) {
            Ok(()) => Ok(self.input.clone()),
            Err(errors) => {
                self.errors
                    .extend(errors.iter().map(|e| (e.field(), e.clone())));
                Err(errors)
            }
        }
    }
}

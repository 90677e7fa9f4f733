//! JSON payloads accepted by the API and their conversion into domain values.

use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::types::TypeConstraintError;

pub mod billing;
pub mod campaigns;
pub mod clients;
pub mod deliverables;
pub mod messaging;
pub mod team;
pub mod workspace;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("invalid email address")]
    InvalidEmail,

    #[error("invalid name")]
    InvalidName,

    #[error("invalid phone number")]
    InvalidPhoneNumber,

    #[error("invalid id")]
    InvalidId,

    #[error("{0}")]
    Constraint(#[from] TypeConstraintError),
}

/// Trims the value and turns blank strings into `None`.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

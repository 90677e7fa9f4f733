//! Error conversion glue between the layers.
//!
//! The domain and repository layers stay free of service error types; the
//! mapping onto [`ServiceError`] lives here and is only compiled with the
//! `server` feature.

use crate::domain::types::TypeConstraintError;
use crate::forms::FormError;
use crate::repository::errors::RepositoryError;
use crate::services::ServiceError;

impl From<TypeConstraintError> for ServiceError {
    fn from(val: TypeConstraintError) -> Self {
        ServiceError::TypeConstraint(val.to_string())
    }
}

impl From<FormError> for ServiceError {
    fn from(val: FormError) -> Self {
        ServiceError::Form(val.to_string())
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(val: RepositoryError) -> Self {
        match val {
            RepositoryError::NotFound => ServiceError::NotFound,
            RepositoryError::ValidationError(message) => ServiceError::TypeConstraint(message),
            RepositoryError::InsufficientFunds { .. }
            | RepositoryError::PackageExhausted { .. }
            | RepositoryError::ConstraintViolation(_) => ServiceError::Conflict(val.to_string()),
            RepositoryError::Conflict(message) => ServiceError::Conflict(message),
            RepositoryError::DatabaseError(_)
            | RepositoryError::ConnectionError(_)
            | RepositoryError::Unexpected(_) => ServiceError::Internal(val.to_string()),
        }
    }
}

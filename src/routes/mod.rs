//! JSON HTTP handlers. Each handler extracts the caller, delegates to a
//! service and maps the outcome onto a status code.

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::Serialize;

use crate::services::{ServiceError, ServiceResult};

pub mod billing;
pub mod campaigns;
pub mod clients;
pub mod dashboard;
pub mod deliverables;
pub mod events;
pub mod messaging;
pub mod session;
pub mod team;
pub mod workspace;

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

pub(crate) fn error_response(err: &ServiceError) -> HttpResponse {
    let (status, message) = match err {
        ServiceError::Unauthorized => (StatusCode::FORBIDDEN, "forbidden"),
        ServiceError::NotFound => (StatusCode::NOT_FOUND, "not found"),
        ServiceError::Form(message) | ServiceError::TypeConstraint(message) => {
            (StatusCode::BAD_REQUEST, message.as_str())
        }
        ServiceError::Conflict(message) => (StatusCode::CONFLICT, message.as_str()),
        ServiceError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal error"),
    };
    HttpResponse::build(status).json(ErrorBody { error: message })
}

/// Serializes a service outcome, answering `status` on success.
pub(crate) fn respond_with<T: Serialize>(
    status: StatusCode,
    action: &str,
    result: ServiceResult<T>,
) -> HttpResponse {
    match result {
        Ok(body) => HttpResponse::build(status).json(body),
        Err(err) => {
            if matches!(err, ServiceError::Internal(_)) {
                log::error!("Failed to {action}: {err}");
            } else {
                log::debug!("Rejected {action}: {err}");
            }
            error_response(&err)
        }
    }
}

pub(crate) fn respond<T: Serialize>(action: &str, result: ServiceResult<T>) -> HttpResponse {
    respond_with(StatusCode::OK, action, result)
}

pub(crate) fn respond_created<T: Serialize>(
    action: &str,
    result: ServiceResult<T>,
) -> HttpResponse {
    respond_with(StatusCode::CREATED, action, result)
}

/// `204 No Content` on success.
pub(crate) fn respond_empty(action: &str, result: ServiceResult<()>) -> HttpResponse {
    match result {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => respond::<()>(action, Err(err)),
    }
}

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;

    use super::*;

    #[actix_web::test]
    async fn service_errors_map_to_status_codes() {
        let cases = [
            (ServiceError::Unauthorized, StatusCode::FORBIDDEN),
            (ServiceError::NotFound, StatusCode::NOT_FOUND),
            (ServiceError::Form("bad".into()), StatusCode::BAD_REQUEST),
            (
                ServiceError::TypeConstraint("bad".into()),
                StatusCode::BAD_REQUEST,
            ),
            (ServiceError::Conflict("taken".into()), StatusCode::CONFLICT),
            (
                ServiceError::Internal("db down".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(error_response(&err).status(), status);
        }
    }

    #[actix_web::test]
    async fn internal_details_are_not_leaked() {
        let response = respond::<()>(
            "load things",
            Err(ServiceError::Internal("password=hunter2".into())),
        );
        let body = to_bytes(response.into_body()).await.unwrap();
        assert_eq!(body.as_ref(), br#"{"error":"internal error"}"#);
    }

    #[actix_web::test]
    async fn conflicts_carry_their_message() {
        let response = respond::<()>("pay", Err(ServiceError::Conflict("insufficient".into())));
        let body = to_bytes(response.into_body()).await.unwrap();
        assert_eq!(body.as_ref(), br#"{"error":"insufficient"}"#);
    }
}

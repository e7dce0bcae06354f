//! Outcome to HTTP response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use idcheck_types::{RejectionReason, RequiredField, VerificationOutcome};
use serde::Serialize;

/// JSON body for every non-2xx answer.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_fields: Option<Vec<RequiredField>>,
}

impl ErrorBody {
    #[must_use]
    pub fn new(status: StatusCode, error: &'static str, message: String) -> Self {
        Self {
            status_code: status.as_u16(),
            error,
            message,
            missing_fields: None,
        }
    }
}

impl IntoResponse for ErrorBody {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[must_use]
pub fn status_for(reason: &RejectionReason) -> StatusCode {
    match reason {
        RejectionReason::Timeout => StatusCode::GATEWAY_TIMEOUT,
        RejectionReason::RateLimited | RejectionReason::OracleUnavailable => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        RejectionReason::InternalFailure => StatusCode::INTERNAL_SERVER_ERROR,
        RejectionReason::DocumentOrderMismatch
        | RejectionReason::MissingFields(_)
        | RejectionReason::InconsistentDates
        | RejectionReason::FaceMismatch => StatusCode::BAD_REQUEST,
    }
}

pub fn rejection_response(reason: RejectionReason) -> Response {
    let status = status_for(&reason);
    let mut body = ErrorBody::new(status, reason.kind(), reason.to_string());
    if let RejectionReason::MissingFields(fields) = reason {
        body.missing_fields = Some(fields);
    }
    (status, body).into_response()
}

pub fn outcome_response(outcome: VerificationOutcome) -> Response {
    match outcome {
        VerificationOutcome::Success(record) => (StatusCode::OK, Json(record)).into_response(),
        VerificationOutcome::Rejected(reason) => rejection_response(reason),
    }
}

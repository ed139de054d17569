//! HTTP error responses.
//!
//! Every failure is returned as `{ "error": ... }`, with `details` added for
//! server-side failures.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};
use uuid::Uuid;

use delulu_core::Error;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                error: message.into(),
                details: None,
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
        Error::NoUsableText { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        Error::Unparseable(_) | Error::Upstream(_) => StatusCode::BAD_GATEWAY,
        Error::Config(_) => StatusCode::SERVICE_UNAVAILABLE,
        Error::Io(_) | Error::Json(_) | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = status_for(&err);
        let details = if status.is_server_error() {
            err.details()
        } else {
            None
        };
        Self {
            status,
            body: ErrorBody {
                error: err.public_message(),
                details,
            },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(reason = %rejection.body_text(), "Rejected request body");
        ApiError::bad_request("Invalid JSON request body")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let request_id = Uuid::new_v4();
        if self.status.is_server_error() {
            error!(
                request_id = %request_id,
                status = self.status.as_u16(),
                error = %self.body.error,
                details = ?self.body.details,
                "Request failed"
            );
        } else {
            warn!(
                request_id = %request_id,
                status = self.status.as_u16(),
                error = %self.body.error,
                "Request rejected"
            );
        }
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (Error::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (Error::NoUsableText { submitted: 3 }, StatusCode::UNPROCESSABLE_ENTITY),
            (Error::Unparseable("x".into()), StatusCode::BAD_GATEWAY),
            (Error::Upstream("x".into()), StatusCode::BAD_GATEWAY),
            (Error::Config("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (Error::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_details_only_on_server_errors() {
        let client = ApiError::from(Error::InvalidInput("Text content is required".into()));
        assert_eq!(client.body.error, "Text content is required");
        assert!(client.body.details.is_none());

        let server = ApiError::from(Error::Upstream("HTTP 429".into()));
        assert_eq!(server.body.error, "The analysis service is unavailable");
        assert!(server.body.details.unwrap().contains("429"));
    }
}

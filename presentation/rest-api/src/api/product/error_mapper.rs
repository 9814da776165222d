use poem::http::StatusCode;
use poem_openapi::payload::Json;

use business::domain::product::errors::ProductError;

use crate::api::error::{ErrorResponse, IntoErrorResponse};

impl IntoErrorResponse for ProductError {
    fn into_error_response(self) -> (StatusCode, Json<ErrorResponse>) {
        let (status, name, message) = match &self {
            ProductError::Unavailable => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "InternalError",
                "product.unavailable",
            ),
            ProductError::EmptyInput => (
                StatusCode::BAD_REQUEST,
                "ValidationError",
                "product.empty_input",
            ),
            ProductError::MalformedPayload => (
                StatusCode::BAD_REQUEST,
                "ValidationError",
                "product.malformed_payload",
            ),
            ProductError::MissingPayload => (
                StatusCode::BAD_REQUEST,
                "ValidationError",
                "product.missing_payload",
            ),
            ProductError::SourceUnavailable => (
                StatusCode::BAD_REQUEST,
                "InputError",
                "product.source_unavailable",
            ),
            ProductError::IngestFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "InternalError",
                "product.ingest_failed",
            ),
        };

        (
            status,
            Json(ErrorResponse {
                name: name.to_string(),
                message: message.to_string(),
            }),
        )
    }
}

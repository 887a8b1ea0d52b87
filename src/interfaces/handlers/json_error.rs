use actix_web::{error::JsonPayloadError, HttpRequest};

use crate::errors::AppError;

pub fn json_error(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!(path = %req.path(), error = %err, "Rejected JSON payload");

    match err {
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            AppError::PayloadTooLarge.into()
        }
        other => AppError::BadRequest(other.to_string()).into(),
    }
}

pub async fn not_found() -> Result<actix_web::HttpResponse, AppError> {
    Err(AppError::NotFound)
}

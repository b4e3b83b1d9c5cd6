mod categories;
mod questions;
mod quizzes;

use axum::{
    extract::{rejection::PathRejection, Path},
    Json,
};
use serde::de::DeserializeOwned;

pub use categories::category_router;
pub use questions::questions_router;
pub use quizzes::quiz_router;

use super::error::ApiError;

pub type ApiResponse<T> = Result<Json<T>, ApiError>;

/// Parses a JSON body regardless of its Content-Type header.
fn json_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|err| {
        tracing::debug!("Rejected request body: {err}");
        ApiError::BadRequest
    })
}

// `/questions/abc` is not a route at all, whatever the method
async fn method_not_allowed_for_id(id: Result<Path<i64>, PathRejection>) -> ApiError {
    match id {
        Ok(_) => ApiError::MethodNotAllowed,
        Err(_) => ApiError::NotFound,
    }
}

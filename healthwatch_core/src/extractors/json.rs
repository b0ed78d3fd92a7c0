//! JSON extractor that rejects malformed or invalid payloads before handlers run

use crate::error::AppError;
use crate::validation::Validatable;
use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// Deserializes the body as `T` and runs its `validator` rules.
///
/// Any failure surfaces as `400 Bad Request`, including bodies missing a
/// required field or carrying a field of the wrong JSON type.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_to_error)?;

        let result = value.validate_comprehensive();
        if !result.is_valid {
            return Err(AppError::Validation(result.summary()));
        }

        Ok(ValidatedJson(value))
    }
}

fn rejection_to_error(rejection: JsonRejection) -> AppError {
    let message = match &rejection {
        JsonRejection::MissingJsonContentType(_) => {
            "Expected request with `Content-Type: application/json`".to_string()
        }
        JsonRejection::JsonSyntaxError(_) => "Invalid JSON format".to_string(),
        _ => rejection.body_text(),
    };
    tracing::debug!(error = %rejection, "rejected request body");
    AppError::BadRequest(message)
}

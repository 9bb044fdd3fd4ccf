//! A JSON extractor whose rejections use the application's error responses.

use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use crate::Error;

/// Like [axum::Json], but a body that is malformed, is the wrong shape or is
/// not sent as `application/json` is rejected with [Error::InvalidRequestBody].
///
/// ```ignore
/// async fn create(JsonBody(body): JsonBody<CreateTransactionBody>) {
///     // body has already been checked against the shape of `CreateTransactionBody`
/// }
/// ```
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                tracing::debug!("rejected request body: {rejection}");
                Error::InvalidRequestBody(rejection.body_text())
            })?;

        Ok(Self(value))
    }
}

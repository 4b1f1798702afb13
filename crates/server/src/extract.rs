//! Extractors that turn every decoding or validation failure into a 400
//! `{ "error": ... }` body.

use api_types::Validate;
use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::ServerError;

/// JSON body that has been decoded and validated.
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Send,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ServerError::Validation(rejection.body_text()))?;
        check(&value)?;
        Ok(Self(value))
    }
}

/// Query string that has been decoded and validated.
pub struct ValidQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Send,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ServerError::Validation(rejection.body_text()))?;
        check(&value)?;
        Ok(Self(value))
    }
}

fn check<T: Validate>(value: &T) -> Result<(), ServerError> {
    value.validate().map_err(|errors| {
        tracing::debug!(?errors, "request rejected");
        ServerError::Validation(errors.join("; "))
    })
}

pub(crate) fn parse_id(value: &str) -> Result<Uuid, ServerError> {
    Uuid::parse_str(value).map_err(|_| ServerError::Validation(format!("invalid id '{value}'")))
}

//! Path and query extractors that reject with application errors.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path, Query},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::errors::AppError;

/// Numeric user id taken from the `:id` path segment.
///
/// Only the integer parse happens here; range checks belong to the service.
#[derive(Debug, Clone, Copy)]
pub struct UserId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::invalid(e.body_text()))?;

        raw.trim()
            .parse::<i64>()
            .map(UserId)
            .map_err(|_| AppError::invalid("id must be an integer"))
    }
}

/// Query string extractor. Malformed queries are invalid arguments.
pub struct ValidQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::invalid(e.body_text()))?;

        Ok(ValidQuery(value))
    }
}

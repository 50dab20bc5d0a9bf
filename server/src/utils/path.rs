use axum::async_trait;
use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::utils::error::AppError;

/// Path parameters that answer a malformed id with the error envelope.
///
/// An id that does not parse names no resource, so it is a 404 like any
/// other unknown id.
#[derive(Debug)]
pub struct PathIds<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for PathIds<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                debug!(reason = %rejection.body_text(), "Unparseable path parameters");
                AppError::not_found("Not found.")
            })?;
        Ok(Self(value))
    }
}

use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::utils::error::{AppError, AppResult};

/// A JSON request body that has been read but not yet parsed.
///
/// Services decode it only after their permission checks, so an
/// unauthorized caller gets a 403 whatever the payload contains.
#[derive(Debug, Clone)]
pub struct DeferredJson(Bytes);

impl DeferredJson {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    pub fn decode<T: DeserializeOwned>(&self) -> AppResult<T> {
        serde_json::from_slice(&self.0)
            .map_err(|e| AppError::BadRequest(format!("Malformed request body: {e}")))
    }

    pub fn decode_validated<T: DeserializeOwned + Validate>(&self) -> AppResult<T> {
        let value: T = self.decode()?;
        value.validate()?;
        Ok(value)
    }
}

#[async_trait]
impl<S> FromRequest<S> for DeferredJson
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> AppResult<Self> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        Ok(Self(bytes))
    }
}

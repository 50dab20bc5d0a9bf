use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::User;
use crate::policy::Requester;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};

/// Token claims issued by the authentication service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub exp: usize,
    pub iat: usize,
}

impl Claims {
    pub fn new(sub: Uuid, username: impl Into<String>, email: impl Into<String>, ttl_secs: i64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub,
            username: username.into(),
            email: email.into(),
            exp: (now + ttl_secs).max(0) as usize,
            iat: now.max(0) as usize,
        }
    }
}

/// HS256 key pair derived from the shared secret.
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    pub fn encode(&self, claims: &Claims) -> AppResult<String> {
        encode(&Header::default(), claims, &self.encoding)
            .map_err(|e| AppError::InternalServerError(format!("token encoding failed: {e}")))
    }

    pub fn decode(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected bearer token");
                AppError::AuthError("Invalid or expired token".to_string())
            })
    }
}

fn bearer_token(parts: &Parts) -> AppResult<Option<&str>> {
    let Some(header_value) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let header_value = header_value
        .to_str()
        .map_err(|_| AppError::AuthError("Invalid authorization header".to_string()))?;

    let mut pieces = header_value.trim().splitn(2, ' ');
    let scheme = pieces.next().unwrap_or_default();
    let token = pieces.next().map(str::trim).unwrap_or_default();

    if scheme != "Bearer" || token.is_empty() {
        tracing::warn!("Invalid auth scheme: {scheme}");
        return Err(AppError::AuthError(
            "Invalid authorization scheme".to_string(),
        ));
    }
    Ok(Some(token))
}

fn claims_from_parts(parts: &Parts, state: &AppState) -> AppResult<Option<Claims>> {
    bearer_token(parts)?
        .map(|token| state.keys.decode(token))
        .transpose()
}

/// Anonymous when no `Authorization` header is sent; a bad token is a 401.
#[async_trait]
impl FromRequestParts<AppState> for Requester {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> AppResult<Self> {
        Ok(match claims_from_parts(parts, state)? {
            Some(claims) => Requester::User(claims.sub),
            None => Requester::Anonymous,
        })
    }
}

/// A caller with a valid token, mirrored into the users table.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl AuthenticatedUser {
    pub fn requester(&self) -> Requester {
        Requester::User(self.0.id)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> AppResult<Self> {
        let claims = claims_from_parts(parts, state)?.ok_or_else(|| {
            AppError::AuthError("Authentication credentials were not provided.".to_string())
        })?;

        let user = state
            .store
            .upsert_user(&User {
                id: claims.sub,
                username: claims.username,
                email: claims.email,
                created_at: Utc::now(),
            })
            .await?;
        Ok(AuthenticatedUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/events");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_token_round_trip() {
        let keys = JwtKeys::from_secret(b"test-secret");
        let id = Uuid::new_v4();
        let token = keys
            .encode(&Claims::new(id, "raghu", "raghu@example.com", 3600))
            .unwrap();

        let claims = keys.decode(&token).unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.username, "raghu");
    }

    #[test]
    fn test_expired_token_rejected() {
        let keys = JwtKeys::from_secret(b"test-secret");
        let token = keys
            .encode(&Claims::new(Uuid::new_v4(), "guest", "", -3600))
            .unwrap();
        assert!(matches!(keys.decode(&token), Err(AppError::AuthError(_))));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = JwtKeys::from_secret(b"one")
            .encode(&Claims::new(Uuid::new_v4(), "guest", "", 3600))
            .unwrap();
        assert!(JwtKeys::from_secret(b"two").decode(&token).is_err());
    }

    #[test]
    fn test_bearer_parsing() {
        assert_eq!(bearer_token(&parts_with(None)).unwrap(), None);
        assert_eq!(
            bearer_token(&parts_with(Some("Bearer abc"))).unwrap(),
            Some("abc")
        );
        assert!(bearer_token(&parts_with(Some("Basic abc"))).is_err());
        assert!(bearer_token(&parts_with(Some("Bearer"))).is_err());
    }
}

//! Authentication seam for the catalog service
//!
//! Token validation itself happens in an external service; this module only
//! consumes the identity result. [`AuthProvider`] is the interface to that
//! external validator, and [`AuthUser`] is the extractor handlers use to
//! require an authenticated principal.

use crate::core::error::CatalogError;
use anyhow::Result;
use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// The authenticated principal, as reported by the external validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub email: String,
}

/// Interface to the external token validator.
///
/// `Ok(None)` means the token was understood but rejected; `Err` means the
/// validator itself failed. Both reject the request.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn validate_token(&self, token: &str) -> Result<Option<AuthUser>>;
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.splitn(2, ' ');
    match (parts.next(), parts.next()) {
        (Some("Bearer"), Some(token)) if !token.is_empty() => Some(token),
        _ => None,
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<dyn AuthProvider>: FromRef<S>,
{
    type Rejection = CatalogError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let provider = <Arc<dyn AuthProvider> as FromRef<S>>::from_ref(state);
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| CatalogError::unauthorized("missing bearer token"))?;

        match provider.validate_token(token).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(CatalogError::unauthorized("token rejected")),
            Err(_) => Err(CatalogError::unauthorized("token validation failed")),
        }
    }
}

/// Permissive provider for local development: every token resolves to a
/// fixed development identity. Never deploy this.
pub struct NoAuthProvider;

#[async_trait]
impl AuthProvider for NoAuthProvider {
    async fn validate_token(&self, _token: &str) -> Result<Option<AuthUser>> {
        Ok(Some(AuthUser {
            id: ObjectId::from_bytes([0; 12]),
            email: "dev@localhost".to_string(),
        }))
    }
}

/// Fixed token table, used by tests and demos.
#[derive(Default)]
pub struct StaticTokenProvider {
    tokens: HashMap<String, AuthUser>,
}

impl StaticTokenProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, user: AuthUser) -> Self {
        self.tokens.insert(token.into(), user);
        self
    }
}

#[async_trait]
impl AuthProvider for StaticTokenProvider {
    async fn validate_token(&self, token: &str) -> Result<Option<AuthUser>> {
        Ok(self.tokens.get(token).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_token_parses_well_formed_header() {
        let headers = headers_with("Bearer abc123");
        assert_eq!(bearer_token(&headers), Some("abc123"));
    }

    #[test]
    fn bearer_token_rejects_missing_header() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn bearer_token_rejects_other_schemes() {
        assert_eq!(bearer_token(&headers_with("Basic abc123")), None);
        assert_eq!(bearer_token(&headers_with("abc123")), None);
    }

    #[test]
    fn bearer_token_rejects_empty_token() {
        assert_eq!(bearer_token(&headers_with("Bearer ")), None);
    }

    #[tokio::test]
    async fn static_provider_resolves_known_token() {
        let user = AuthUser {
            id: ObjectId::new(),
            email: "alice@example.com".to_string(),
        };
        let provider = StaticTokenProvider::new().with_token("tok-1", user.clone());

        let resolved = provider.validate_token("tok-1").await.unwrap();
        assert_eq!(resolved, Some(user));

        let unknown = provider.validate_token("tok-2").await.unwrap();
        assert_eq!(unknown, None);
    }

    #[tokio::test]
    async fn no_auth_provider_accepts_anything() {
        let provider = NoAuthProvider;
        let user = provider.validate_token("whatever").await.unwrap();
        assert!(user.is_some());
    }
}

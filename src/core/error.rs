//! Typed error handling for the catalog service
//!
//! One error type crosses every layer: the repository raises the
//! storage-facing variants (`WriteFailed`, `Store`, `Serialization`),
//! resource services raise `NotFound`/`BadRequest`, and the HTTP layer
//! renders any of them through [`IntoResponse`].
//!
//! Absence is not an error: point lookups return `Ok(None)` and the calling
//! resource service decides whether that becomes a `NotFound`. The core
//! never logs and never retries — driver errors pass through unchanged.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// The error type shared by the repository, resource services and handlers.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Malformed client input (invalid sort order, bad identifier, empty
    /// search).
    #[error("{message}")]
    BadRequest { message: String },

    /// Missing or rejected credentials.
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// A resource service decided an absent document is user-visible.
    #[error("{resource} with id '{id}' not found")]
    NotFound { resource: &'static str, id: String },

    /// An update keyed by id matched no document.
    ///
    /// Deliberately a 400 on the wire: this is the id-keyed update contract,
    /// asymmetric with the query-keyed update which reports absence as
    /// `Ok(None)`.
    #[error("failed to update {collection}: {detail}")]
    WriteFailed {
        collection: &'static str,
        detail: String,
    },

    /// Request body failed DTO validation.
    #[error(transparent)]
    Validation(#[from] validator::ValidationErrors),

    /// BSON encode/decode failure between domain types and documents.
    #[error("serialization error: {detail}")]
    Serialization { detail: String },

    /// Driver/store failure, propagated unchanged.
    #[error(transparent)]
    Store(#[from] mongodb::error::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// States that should be unreachable in normal operation.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CatalogError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            CatalogError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            CatalogError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            CatalogError::NotFound { .. } => StatusCode::NOT_FOUND,
            CatalogError::WriteFailed { .. } => StatusCode::BAD_REQUEST,
            CatalogError::Validation(_) => StatusCode::BAD_REQUEST,
            CatalogError::Serialization { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            CatalogError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CatalogError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            CatalogError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            CatalogError::BadRequest { .. } => "BAD_REQUEST",
            CatalogError::Unauthorized { .. } => "UNAUTHORIZED",
            CatalogError::NotFound { .. } => "NOT_FOUND",
            CatalogError::WriteFailed { .. } => "WRITE_FAILED",
            CatalogError::Validation(_) => "VALIDATION_ERROR",
            CatalogError::Serialization { .. } => "SERIALIZATION_ERROR",
            CatalogError::Store(_) => "STORE_ERROR",
            CatalogError::Config { .. } => "CONFIG_ERROR",
            CatalogError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            CatalogError::Validation(errors) => serde_json::to_value(errors).ok(),
            CatalogError::NotFound { resource, id } => Some(serde_json::json!({
                "resource": resource,
                "id": id,
            })),
            _ => None,
        }
    }

    /// Convert to the JSON error body.
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            success: false,
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }
}

/// JSON body rendered for any error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(self.to_response())).into_response()
    }
}

impl From<mongodb::bson::ser::Error> for CatalogError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        CatalogError::Serialization {
            detail: err.to_string(),
        }
    }
}

impl From<mongodb::bson::de::Error> for CatalogError {
    fn from(err: mongodb::bson::de::Error) -> Self {
        CatalogError::Serialization {
            detail: err.to_string(),
        }
    }
}

/// A specialized Result for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(
            CatalogError::bad_request("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            CatalogError::unauthorized("no token").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            CatalogError::not_found("product", "abc").status_code(),
            StatusCode::NOT_FOUND
        );
        // The id-keyed update contract reports a failed match as a client
        // error, not a 500.
        assert_eq!(
            CatalogError::WriteFailed {
                collection: "products",
                detail: "no document matched".into()
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            CatalogError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_display_and_details() {
        let err = CatalogError::not_found("product", "66f0");
        assert_eq!(err.to_string(), "product with id '66f0' not found");

        let body = err.to_response();
        assert_eq!(body.code, "NOT_FOUND");
        assert!(!body.success);
        let details = body.details.expect("details");
        assert_eq!(details["resource"], "product");
        assert_eq!(details["id"], "66f0");
    }

    #[test]
    fn serialization_error_from_bson() {
        let bad = mongodb::bson::from_document::<String>(mongodb::bson::doc! {"a": 1}).unwrap_err();
        let err: CatalogError = bad.into();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn error_body_serializes_without_empty_details() {
        let body = CatalogError::bad_request("sortOrder must be 1 or -1").to_response();
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["code"], "BAD_REQUEST");
        assert_eq!(json["message"], "sortOrder must be 1 or -1");
        assert!(json.get("details").is_none());
    }
}

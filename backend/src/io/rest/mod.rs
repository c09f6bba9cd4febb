//! # REST API Interface Layer
//!
//! JSON endpoints over the domain services, mounted under `/api`.
//! Handlers map DTOs from the `shared` crate to domain commands, call one
//! service, and map the result back. Domain errors become HTTP statuses in
//! the [`IntoResponse`] impl for [`HerdError`].

pub mod animal_apis;
pub mod breeding_apis;
pub mod mappers;
pub mod pedigree_apis;
pub mod sale_apis;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Query,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::error;

use crate::error::HerdError;

/// JSON body extractor whose rejections use the API error body
#[derive(FromRequest)]
#[from_request(via(Json), rejection(HerdError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor whose rejections use the API error body
#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(HerdError))]
pub struct ApiQuery<T>(pub T);

impl From<JsonRejection> for HerdError {
    fn from(rejection: JsonRejection) -> Self {
        HerdError::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for HerdError {
    fn from(rejection: QueryRejection) -> Self {
        HerdError::validation(rejection.body_text())
    }
}

impl HerdError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            HerdError::NotFound(_) => StatusCode::NOT_FOUND,
            HerdError::Validation(_) => StatusCode::BAD_REQUEST,
            HerdError::Integrity(_) => StatusCode::CONFLICT,
            HerdError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            HerdError::NotFound(_) => "not_found",
            HerdError::Validation(_) => "validation",
            HerdError::Integrity(_) => "integrity",
            HerdError::Storage(_) => "storage",
        }
    }
}

impl IntoResponse for HerdError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            HerdError::Storage(e) => {
                error!("Storage failure: {:#}", e);
                "Internal storage error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::DuplicateKey;

    #[test]
    fn test_status_mapping() {
        assert_eq!(HerdError::not_found("Animal X").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(HerdError::validation("bad").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(HerdError::integrity("referenced").status_code(), StatusCode::CONFLICT);
        assert_eq!(
            HerdError::Storage(anyhow::anyhow!("disk full")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_duplicate_key_becomes_integrity() {
        let err = HerdError::from(anyhow::Error::new(DuplicateKey("Animal M005".to_string())));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.code(), "integrity");

        let err = HerdError::from(anyhow::anyhow!("disk full"));
        assert_eq!(err.code(), "storage");
    }
}

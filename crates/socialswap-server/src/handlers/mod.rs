//! HTTP handlers

pub mod catalog;
pub mod listings;
pub mod messages;
pub mod watchlist;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use socialswap_core::StoreError;

pub async fn health() -> &'static str {
    "OK"
}

/// Error response: `{"error": "...", "code": "..."}`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: "unauthorized",
            message: message.into(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        let (status, code) = match &err {
            StoreError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            StoreError::ConstraintViolation(_) => (StatusCode::CONFLICT, "conflict"),
            StoreError::InvalidArgument(_) => (StatusCode::BAD_REQUEST, "invalid_argument"),
            StoreError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            StoreError::DanglingReference { .. } | StoreError::Storage(_) => {
                tracing::error!("Request failed: {}", err);
                return Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    code: "internal",
                    message: "Internal server error".to_string(),
                };
            }
        };
        Self {
            status,
            code,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "code": self.code
        }));
        (self.status, body).into_response()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::services::Integrity;
    use crate::{router, seed, AppState};
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::Value;
    use socialswap_core::EntityStore;
    use std::sync::Arc;
    use tower::ServiceExt;

    /// Router over a seeded in-memory store
    pub async fn seeded_app() -> (Router, Arc<dyn EntityStore>) {
        let store: Arc<dyn EntityStore> = Arc::new(crate::storage::MemoryStore::new());
        seed::bootstrap_reference_data(&*store).await.unwrap();
        seed::seed_demo_data(&Integrity::new(store.clone())).await.unwrap();
        (router(AppState::new(store.clone())), store)
    }

    pub async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        account: Option<i64>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(id) = account {
            request = request.header("X-Account-Id", id.to_string());
        }
        let request = match body {
            Some(json) => request
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, value)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{seeded_app, send};
    use super::*;
    use socialswap_core::{Constraint, EntityKind};

    #[test]
    fn test_store_errors_map_to_status() {
        let cases = [
            (StoreError::not_found(EntityKind::Listing, 3), StatusCode::NOT_FOUND),
            (
                StoreError::ConstraintViolation(Constraint::WatchlistPair),
                StatusCode::CONFLICT,
            ),
            (StoreError::InvalidArgument("page".into()), StatusCode::BAD_REQUEST),
            (StoreError::Unauthorized("no".into()), StatusCode::UNAUTHORIZED),
            (StoreError::Storage("disk".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let err = ApiError::from(StoreError::Storage("database is locked".into()));
        assert_eq!(err.message, "Internal server error");
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = seeded_app().await;
        let (status, body) = send(&app, "GET", "/api/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }

    #[tokio::test]
    async fn test_identity_required_and_checked() {
        let (app, _) = seeded_app().await;

        let (status, body) = send(&app, "GET", "/api/watchlist", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "unauthorized");

        let (status, _) = send(&app, "GET", "/api/watchlist", Some(404), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, "GET", "/api/watchlist", Some(1), None).await;
        assert_eq!(status, StatusCode::OK);
    }
}

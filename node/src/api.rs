//! # HTTP API
//!
//! | Method | Path      | Description                                  |
//! |--------|-----------|----------------------------------------------|
//! | GET    | `/health` | Liveness check                               |
//! | POST   | `/verify` | Verify a response against a request          |
//!
//! `/verify` takes `{"request": ..., "response": ...}` where `request` is
//! the unnormalized request input the application built and `response` is
//! the wallet's response. Errors map to status codes:
//!
//! | Failure                              | Status |
//! |--------------------------------------|--------|
//! | body or request construction         | 400    |
//! | verification                         | 422    |
//! | registry unavailable                 | 503    |
//!
//! Every error body is `{"kind", "message", "retryable"}`.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use sismo_connect_protocol::{
    SismoConnectRequestInput, SismoConnectResponse, SismoConnectVerifier, VerificationError,
};

use crate::metrics::SharedMetrics;

#[derive(Clone)]
pub struct AppState {
    pub version: String,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub verifier: Arc<SismoConnectVerifier>,
    pub metrics: SharedMetrics,
}

#[derive(Debug, Deserialize)]
pub struct VerifyBody {
    pub request: SismoConnectRequestInput,
    pub response: SismoConnectResponse,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
    pub retryable: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub app_id: String,
    pub schemes: Vec<String>,
    pub started_at: String,
}

/// An error on its way out as a JSON body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    fn bad_body(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                kind: "invalid_body".into(),
                message: rejection.body_text(),
                retryable: false,
            },
        }
    }
}

impl From<VerificationError> for ApiError {
    fn from(err: VerificationError) -> Self {
        let status = if err.is_request_error() {
            StatusCode::BAD_REQUEST
        } else if err.is_retryable() {
            StatusCode::SERVICE_UNAVAILABLE
        } else {
            StatusCode::UNPROCESSABLE_ENTITY
        };
        Self {
            status,
            body: ErrorBody {
                kind: err.kind().into(),
                message: err.to_string(),
                retryable: err.is_retryable(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/verify", post(verify_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `GET /health`
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".into(),
        version: state.version.clone(),
        app_id: state.verifier.config().app_id.to_string(),
        schemes: state.verifier.schemes().map(|s| s.tag().to_string()).collect(),
        started_at: state.started_at.to_rfc3339(),
    })
}

/// `POST /verify`
async fn verify_handler(
    State(state): State<AppState>,
    body: Result<Json<VerifyBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body.map_err(ApiError::bad_body)?;
    let request = body.request.build().map_err(VerificationError::from)?;

    let started = Instant::now();
    let outcome = state.verifier.verify(&request, &body.response).await;
    state
        .metrics
        .observe(started.elapsed(), outcome.as_ref().err().map(|e| e.kind()));

    let result = outcome?;
    Ok((StatusCode::OK, Json(result)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use sismo_connect_protocol::registry::StaticRegistry;
    use sismo_connect_protocol::zkp::Groth16ProofSystem;
    use sismo_connect_protocol::VerifierConfig;
    use tower::ServiceExt;

    const APP_ID: &str = "0x112a692a2005259c25f6094161007967";

    fn test_state() -> AppState {
        let registry = Arc::new(StaticRegistry::new([U256::from(1u8), U256::from(2u8)]));
        let verifier = SismoConnectVerifier::new(
            VerifierConfig::new(APP_ID.parse().unwrap()),
            registry.clone(),
            registry,
            Arc::new(Groth16ProofSystem::new()),
        )
        .unwrap();
        AppState {
            version: "0.1.0-test".into(),
            started_at: chrono::Utc::now(),
            verifier: Arc::new(verifier),
            metrics: Arc::new(crate::metrics::VerifierMetrics::new().unwrap()),
        }
    }

    async fn send(router: &Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let resp = router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    fn post_verify(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/verify")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn response(app_id: &str) -> serde_json::Value {
        serde_json::json!({
            "appId": app_id,
            "version": "sismo-connect-v1.1",
            "proofs": [{
                "claims": [{
                    "groupId": "0x1",
                    "claimType": 1,
                    "groupTimestamp": "latest",
                    "value": 1
                }],
                "provingScheme": "hydra-s3.1",
                "proofData": "0x"
            }]
        })
    }

    #[tokio::test]
    async fn health_reports_configuration() {
        let router = create_router(test_state());
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, json) = send(&router, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["app_id"], APP_ID);
        assert_eq!(json["schemes"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn empty_request_is_a_bad_request() {
        let router = create_router(test_state());
        let body = serde_json::json!({ "request": {}, "response": response(APP_ID) });
        let (status, json) = send(&router, post_verify(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["kind"], "empty_request");
        assert_eq!(json["retryable"], false);
    }

    #[tokio::test]
    async fn malformed_body_is_a_bad_request() {
        let router = create_router(test_state());
        let req = Request::builder()
            .method("POST")
            .uri("/verify")
            .header("content-type", "application/json")
            .body(Body::from("{\"request\":"))
            .unwrap();
        let (status, json) = send(&router, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["kind"], "invalid_body");
    }

    #[tokio::test]
    async fn verification_failure_is_unprocessable_and_counted() {
        let state = test_state();
        let metrics = state.metrics.clone();
        let router = create_router(state);
        let body = serde_json::json!({
            "request": { "claim": { "groupId": "0x1" } },
            "response": response("0xf68985adfc209fafebfb1a956913e7fa"),
        });
        let (status, json) = send(&router, post_verify(body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["kind"], "app_id_mismatch");
        assert!(json["message"].as_str().unwrap().contains(APP_ID));

        assert_eq!(metrics.verifications_total.get(), 1);
        assert_eq!(
            metrics
                .verification_failures_total
                .with_label_values(&["app_id_mismatch"])
                .get(),
            1
        );
    }

    #[test]
    fn registry_errors_are_retryable_503s() {
        let err = ApiError::from(VerificationError::RegistryUnavailable("timeout".into()));
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(err.body.retryable);
        assert_eq!(err.body.kind, "registry_unavailable");
    }
}

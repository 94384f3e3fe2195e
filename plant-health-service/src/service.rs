use assess_flow::{
    ClientConfig, HealthAssessmentClient, ImageSelection, InMemorySessionStorage, SessionStorage,
    SubmissionRunner,
};
use axum::{
    Router,
    extract::{Path, State},
    http::{HeaderValue, Request, StatusCode},
    middleware::{Next, from_fn},
    response::Json,
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{Instrument, error, info};
use uuid::Uuid;

use crate::models::{SessionResponse, SubmitAssessmentRequest};

type ApiResult<T> = Result<Json<T>, ApiError>;
type ApiError = (StatusCode, Json<Value>);

fn bad_request_error(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

fn not_found_error(message: &str, id: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": message,
            "session_id": id
        })),
    )
}

fn internal_error(message: &str, details: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": message,
            "details": details
        })),
    )
}

#[derive(Clone)]
pub struct AppState {
    pub runner: SubmissionRunner,
    pub storage: Arc<dyn SessionStorage>,
}

pub fn create_app(config: ClientConfig) -> Router {
    let client = Arc::new(HealthAssessmentClient::new(config));
    let storage: Arc<dyn SessionStorage> = Arc::new(InMemorySessionStorage::new());
    let runner = SubmissionRunner::new(client, storage.clone());

    let app_state = AppState { runner, storage };

    Router::new()
        .route("/health", get(health_check))
        .route("/assessments", post(submit_assessment))
        .route("/sessions/{id}", get(get_session))
        .layer(from_fn(correlation_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

/// Middleware to add a correlation ID to all requests
async fn correlation_id_middleware(
    mut request: Request<axum::body::Body>,
    next: Next,
) -> axum::response::Response {
    let correlation_id = Uuid::new_v4().to_string();

    request.headers_mut().insert(
        "x-correlation-id",
        HeaderValue::from_str(&correlation_id).unwrap(),
    );

    let span = tracing::info_span!("http_request", correlation_id = %correlation_id);
    next.run(request).instrument(span).await
}

async fn health_check() -> &'static str {
    "OK"
}

/// Drive one full submission: Pending is persisted before the remote call
/// goes out, and the final session reflects Succeeded or Failed. A failed
/// assessment is a session state, not an HTTP error; the error string is
/// rendered in place of results.
async fn submit_assessment(
    State(state): State<AppState>,
    Json(request): Json<SubmitAssessmentRequest>,
) -> ApiResult<SessionResponse> {
    if request.image_base64.is_empty() {
        return Err(bad_request_error("image_base64 must not be empty"));
    }

    let session_id_provided = request.session_id.is_some();
    let session_id = request
        .session_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    if session_id_provided {
        if Uuid::parse_str(&session_id).is_err() {
            return Err(bad_request_error("invalid session id format"));
        }
        match state.storage.get(&session_id).await {
            Ok(Some(_)) => {}
            Ok(None) => return Err(not_found_error("session not found", &session_id)),
            Err(e) => {
                error!(session_id = %session_id, error = %e, "failed to load session");
                return Err(internal_error("failed to load session", &e.to_string()));
            }
        }
    }

    info!(
        session_id = %session_id,
        payload_length = %request.image_base64.len(),
        "processing assessment submission"
    );

    let selection = ImageSelection::new(request.display_uri, request.image_base64);
    let session = match state.runner.submit(&session_id, selection).await {
        Ok(session) => session,
        Err(e) => {
            error!(session_id = %session_id, error = %e, "submission failed");
            return Err(internal_error("submission failed", &e.to_string()));
        }
    };

    info!(
        session_id = %session_id,
        phase = ?session.state.phase(),
        "submission completed"
    );

    Ok(Json(SessionResponse::from_session(&session)))
}

async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<SessionResponse> {
    match state.storage.get(&session_id).await {
        Ok(Some(session)) => Ok(Json(SessionResponse::from_session(&session))),
        Ok(None) => Err(not_found_error("session not found", &session_id)),
        Err(e) => {
            error!(session_id = %session_id, error = %e, "failed to get session");
            Err(internal_error("failed to get session", &e.to_string()))
        }
    }
}

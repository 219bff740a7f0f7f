//! HTTP transport for the content pipeline.
//!
//! A run is created with `POST /api/v1/runs`, polled with
//! `GET /api/v1/runs/{run_id}`, and cancelled with
//! `DELETE /api/v1/runs/{run_id}`. Admission is bounded by a semaphore sized
//! from `MAX_CONCURRENT_RUNS`; queued runs start in arrival order.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, Semaphore};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use postforge_pipeline::{
    render_artifact, CancelFlag, Orchestrator, Request as RunRequest, RunId, RunOutcome,
    RunStatus, RunTracker,
};

use crate::middleware::{request_id, RequestId};

#[derive(Clone)]
pub struct AppState {
    orchestrator: Arc<Orchestrator>,
    tracker: Arc<RunTracker>,
    permits: Arc<Semaphore>,
    cancels: Arc<Mutex<HashMap<RunId, CancelFlag>>>,
    directory_enabled: bool,
}

impl AppState {
    #[must_use]
    pub fn new(
        orchestrator: Arc<Orchestrator>,
        directory_enabled: bool,
        max_concurrent_runs: usize,
    ) -> Self {
        Self {
            orchestrator,
            tracker: Arc::new(RunTracker::new()),
            permits: Arc::new(Semaphore::new(max_concurrent_runs)),
            cancels: Arc::new(Mutex::new(HashMap::new())),
            directory_enabled,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

impl ResponseMeta {
    fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/runs", post(create_run))
        .route(
            "/api/v1/runs/{run_id}",
            get(get_run).delete(cancel_run),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthData {
    status: &'static str,
    competitor_research: &'static str,
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    Json(ApiResponse {
        data: HealthData {
            status: "ok",
            competitor_research: if state.directory_enabled {
                "enabled"
            } else {
                "disabled"
            },
        },
        meta: ResponseMeta::new(req_id.0),
    })
}

#[derive(Debug, Deserialize)]
pub struct CreateRunBody {
    pub text: String,
    pub session_id: String,
}

#[derive(Debug, Serialize)]
struct RunAccepted {
    run_id: RunId,
    status: &'static str,
}

async fn create_run(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateRunBody>,
) -> Result<impl IntoResponse, ApiError> {
    if body.text.trim().is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "text must not be empty",
        ));
    }
    if body.session_id.trim().is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "session_id must not be empty",
        ));
    }

    let request = RunRequest::new(body.text, body.session_id);
    let run_id = state.tracker.register(&request);
    let cancel = CancelFlag::new();
    state.cancels.lock().await.insert(run_id, cancel.clone());
    tokio::spawn(drive_run(state.clone(), run_id, request, cancel));

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse {
            data: RunAccepted {
                run_id,
                status: "running",
            },
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

/// Runs the pipeline for one accepted request and records its single
/// terminal outcome. The semaphore permit is held for the whole run.
async fn drive_run(state: AppState, run_id: RunId, request: RunRequest, cancel: CancelFlag) {
    let permit = match Arc::clone(&state.permits).acquire_owned().await {
        Ok(permit) => permit,
        Err(_) => {
            state.tracker.complete(
                run_id,
                RunOutcome::Error("The server is shutting down; please retry.".to_string()),
            );
            state.cancels.lock().await.remove(&run_id);
            return;
        }
    };

    let outcome = match state.orchestrator.run_with_cancel(&request, &cancel).await {
        Ok(artifact) => RunOutcome::Artifact(Arc::new(artifact)),
        Err(err) => {
            tracing::warn!(run_id = %run_id, error = %err, "run failed");
            RunOutcome::Error(err.user_message())
        }
    };
    drop(permit);

    state.tracker.complete(run_id, outcome);
    state.cancels.lock().await.remove(&run_id);
}

#[derive(Debug, Serialize)]
struct RunView {
    run_id: RunId,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    artifact: Option<serde_json::Value>,
}

async fn get_run(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(run_id): Path<String>,
) -> Result<Json<ApiResponse<RunView>>, ApiError> {
    let run_id: RunId = run_id
        .parse()
        .map_err(|_| ApiError::new(req_id.0.clone(), "bad_request", "malformed run id"))?;

    let Some(status) = state.tracker.lookup(run_id) else {
        return Err(ApiError::new(req_id.0, "not_found", "unknown run id"));
    };

    let view = match status {
        RunStatus::Running { .. } => RunView {
            run_id,
            status: "running",
            message: None,
            artifact: None,
        },
        RunStatus::Completed(artifact) => {
            let rendered = render_artifact(&artifact);
            let raw = serde_json::to_value(&*artifact).map_err(|e| {
                tracing::error!(run_id = %run_id, error = %e, "artifact serialization failed");
                ApiError::new(
                    req_id.0.clone(),
                    "internal_error",
                    "failed to serialize run artifact",
                )
            })?;
            RunView {
                run_id,
                status: "completed",
                message: Some(rendered),
                artifact: Some(raw),
            }
        }
        RunStatus::Failed(message) => RunView {
            run_id,
            status: "failed",
            message: Some(message),
            artifact: None,
        },
    };

    Ok(Json(ApiResponse {
        data: view,
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[derive(Debug, Serialize)]
struct CancelView {
    run_id: RunId,
    status: &'static str,
}

async fn cancel_run(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(run_id): Path<String>,
) -> Result<(StatusCode, Json<ApiResponse<CancelView>>), ApiError> {
    let run_id: RunId = run_id
        .parse()
        .map_err(|_| ApiError::new(req_id.0.clone(), "bad_request", "malformed run id"))?;

    match state.tracker.lookup(run_id) {
        None => Err(ApiError::new(req_id.0, "not_found", "unknown run id")),
        Some(status) if status.is_terminal() => Ok((
            StatusCode::OK,
            Json(ApiResponse {
                data: CancelView {
                    run_id,
                    status: "already_finished",
                },
                meta: ResponseMeta::new(req_id.0),
            }),
        )),
        Some(_) => {
            if let Some(flag) = state.cancels.lock().await.get(&run_id) {
                flag.cancel();
            }
            tracing::info!(run_id = %run_id, "cancellation requested");
            Ok((
                StatusCode::ACCEPTED,
                Json(ApiResponse {
                    data: CancelView {
                        run_id,
                        status: "cancelling",
                    },
                    meta: ResponseMeta::new(req_id.0),
                }),
            ))
        }
    }
}

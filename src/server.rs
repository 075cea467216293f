use crate::config::ServiceConfig;
use crate::data::{
    Dataset, FacultyId, GenerationOutput, GenerationParams, RoomId, Session, SessionId,
    SolutionReport, Timeslot,
};
use crate::error::TimetableError;
use crate::search;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Body of `POST /api/generate`: the dataset plus generation parameters at top level.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub dataset: Dataset,
    #[serde(flatten)]
    pub params: GenerationParams,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub solutions: Vec<Vec<(SessionId, Timeslot, RoomId, FacultyId)>>,
    pub sessions: BTreeMap<SessionId, Session>,
    pub requested_variants: usize,
    pub complete: bool,
    pub reports: Vec<SolutionReport>,
}

impl From<GenerationOutput> for GenerateResponse {
    fn from(output: GenerationOutput) -> Self {
        Self {
            solutions: output
                .solutions
                .iter()
                .map(|s| s.assignments.iter().map(|a| a.as_row()).collect())
                .collect(),
            sessions: output.sessions.into_iter().map(|s| (s.id, s)).collect(),
            requested_variants: output.requested_variants,
            complete: output.complete,
            reports: output.reports,
        }
    }
}

pub enum ApiError {
    Timetable(TimetableError),
    Internal(String),
}

impl From<TimetableError> for ApiError {
    fn from(e: TimetableError) -> Self {
        ApiError::Timetable(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Timetable(TimetableError::Validation(issues)) => {
                let error = TimetableError::Validation(issues.clone()).to_string();
                let issues: Vec<String> = issues.iter().map(|i| i.to_string()).collect();
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": error, "issues": issues })),
                )
                    .into_response()
            }
            ApiError::Timetable(e @ TimetableError::Configuration(_)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response(),
            ApiError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": message })),
            )
                .into_response(),
        }
    }
}

async fn generate_handler(
    State(config): State<Arc<ServiceConfig>>,
    Json(mut request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    config.apply_defaults(&mut request.params);
    let output =
        tokio::task::spawn_blocking(move || search::generate(&request.dataset, &request.params))
            .await
            .map_err(|e| {
                error!("Generation task failed: {}", e);
                ApiError::Internal(format!("generation task failed: {e}"))
            })?;
    match output {
        Ok(output) => Ok(Json(output.into())),
        Err(e) => {
            warn!("Rejected generation request: {}", e);
            Err(e.into())
        }
    }
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub fn router(config: ServiceConfig) -> Router {
    Router::new()
        .route("/api/generate", post(generate_handler))
        .route("/api/health", get(health_handler))
        .with_state(Arc::new(config))
}

pub async fn run_server(config: ServiceConfig) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, router(config)).await
}

//! API request handlers
//!
//! Handlers for all REST API endpoints.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use super::server::AppState;
use crate::error::REQUIRED_COLUMNS_HINT;
use crate::pipeline::{report_path, run_full_analysis, UploadedFile};
use crate::types::WeeklySummary;

/// Download name offered to browsers
pub const REPORT_DOWNLOAD_NAME: &str = "Scheduling Lag Calculation Output.xlsx";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
            error: None,
            hint: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            request_id: Uuid::new_v4().to_string(),
            data: None,
            error: Some(message.into()),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Root endpoint response
#[derive(Serialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Serialize)]
pub struct EndpointInfo {
    pub path: String,
    pub method: String,
    pub description: String,
}

impl EndpointInfo {
    fn new(path: &str, method: &str, description: &str) -> Self {
        Self {
            path: path.to_string(),
            method: method.to_string(),
            description: description.to_string(),
        }
    }
}

/// GET / - Root info
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = RootResponse {
        name: "schedlag API Server".to_string(),
        version: state.version.clone(),
        description: "Scheduling lag report generation from CSV/Excel exports".to_string(),
        endpoints: vec![
            EndpointInfo::new("/health", "GET", "Health check endpoint"),
            EndpointInfo::new("/version", "GET", "Get server version"),
            EndpointInfo::new(
                "/api/v1/analyze?file_name=<name>",
                "POST",
                "Analyze an uploaded export (raw file bytes as body)",
            ),
            EndpointInfo::new(
                "/api/v1/reports/{run_id}/{report_file}",
                "GET",
                "Download a generated Excel report",
            ),
        ],
    };
    Json(ApiResponse::ok(response))
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_message: String,
}

/// GET /health - Health check
pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
        uptime_message: "Server is running".to_string(),
    }))
}

/// Version response
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub features: Vec<String>,
}

/// GET /version - Server version
pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(VersionResponse {
        version: state.version.clone(),
        features: vec!["analyze".to_string(), "reports".to_string()],
    }))
}

/// Analyze query string
#[derive(Deserialize)]
pub struct AnalyzeQuery {
    /// Original name of the uploaded file, including its extension
    pub file_name: String,
}

/// Analyze response
#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub file_name: String,
    pub run_id: String,
    pub report_file: String,
    pub download_url: String,
    pub records: usize,
    pub dropped_rows: usize,
    pub weekly_summary: WeeklySummary,
    pub generated_at: String,
}

/// POST /api/v1/analyze - Analyze an uploaded export
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AnalyzeQuery>,
    body: Bytes,
) -> (StatusCode, Json<ApiResponse<AnalyzeResponse>>) {
    let upload = UploadedFile::new(query.file_name.clone(), body.to_vec());
    let job_state = Arc::clone(&state);

    let result = tokio::task::spawn_blocking(move || {
        run_full_analysis(&upload, &job_state.analysis, &job_state.output_dir)
    })
    .await;

    match result {
        Ok(Ok(outcome)) => {
            let report_file = outcome
                .output_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let run_id = outcome.run_id.unwrap_or_default();
            info!(file = %query.file_name, run_id = %run_id, report = %report_file, "analysis complete");
            (
                StatusCode::OK,
                Json(ApiResponse::ok(AnalyzeResponse {
                    file_name: query.file_name,
                    download_url: format!("/api/v1/reports/{}/{}", run_id, report_file),
                    run_id,
                    report_file,
                    records: outcome.records,
                    dropped_rows: outcome.dropped_rows,
                    weekly_summary: outcome.weekly,
                    generated_at: chrono::Utc::now().to_rfc3339(),
                })),
            )
        }
        Ok(Err(e)) => {
            let status = if e.is_input_error() {
                StatusCode::UNPROCESSABLE_ENTITY
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            error!(file = %query.file_name, error = %e, "analysis failed");
            (
                status,
                Json(ApiResponse::err(e.to_string()).with_hint(REQUIRED_COLUMNS_HINT)),
            )
        }
        Err(e) => {
            error!(file = %query.file_name, error = %e, "analysis task failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::err(format!("Analysis task failed: {}", e))),
            )
        }
    }
}

/// GET /api/v1/reports/{run_id}/{report_file} - Download a generated report
pub async fn download_report(
    State(state): State<Arc<AppState>>,
    Path((run_id, report_file)): Path<(String, String)>,
) -> Response {
    let Some(path) = report_path(&state.output_dir, &run_id, &report_file) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::err(format!(
                "Invalid report reference '{}/{}'",
                run_id, report_file
            ))),
        )
            .into_response();
    };

    match tokio::fs::read(&path).await {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, XLSX_MIME.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", REPORT_DOWNLOAD_NAME),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::err(format!(
                "Report '{}' not found",
                report_file
            ))),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<()>::err(format!(
                "Failed to read report: {}",
                e
            ))),
        )
            .into_response(),
    }
}

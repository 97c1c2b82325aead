//! This module defines the JSON endpoints for ingesting and reading log entries.
use super::Backend;
use crate::error::ServiceError;
use crate::types::{ErrorResponse, IngestResponse, LogsResponse};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error};

/// Reads one field of an ingest body.
///
/// Absent, `null`, `false`, `0` and `""` count as missing. Other non-string
/// values are kept as their JSON text, so `{"severity": 5}` fails the
/// severity check instead of the body parse.
fn body_field(body: &Value, name: &str) -> Option<String> {
    match body.get(name)? {
        Value::Null | Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Maps a service error onto its status code and JSON body.
fn error_response(e: ServiceError) -> Response {
    match e {
        ServiceError::Validation(msg) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: msg,
                message: None,
            }),
        )
            .into_response(),
        ServiceError::Internal(e) => {
            error!("Error processing log request: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Internal server error".to_string(),
                    message: Some(e.to_string()),
                }),
            )
                .into_response()
        }
    }
}

/// Stores a new log entry.
#[axum::debug_handler]
pub async fn ingest_log(
    State(backend): State<Arc<Backend>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(json) => json,
        Err(rejection) => {
            debug!("Rejected ingest body: {}", rejection);
            return error_response(ServiceError::Validation(format!(
                "Invalid request body: {}",
                rejection.body_text()
            )));
        }
    };

    let severity = body_field(&body, "severity");
    let message = body_field(&body, "message");

    match backend
        .ingest
        .submit(severity.as_deref(), message.as_deref())
        .await
    {
        Ok(receipt) => (
            StatusCode::CREATED,
            Json(IngestResponse {
                success: true,
                id: receipt.id,
                date_time: receipt.timestamp,
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// Lists the most recent log entries, newest first.
#[axum::debug_handler]
pub async fn recent_logs(State(backend): State<Arc<Backend>>) -> Response {
    match backend.query.recent().await {
        Ok(logs) => Json(LogsResponse {
            count: logs.len(),
            logs,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

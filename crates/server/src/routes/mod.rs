//! API route handlers
//!
//! - `health`: liveness and readiness
//! - `classify`: batch classification of an uploaded texts file
//! - `keywords`: knowledge base lookup, insert, and listings

pub mod classify;
pub mod health;
pub mod keywords;

use crate::error::{ServerError, ServerResult};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// API version and base info
///
/// # Response
///
/// ```json
/// {
///   "name": "Department Classifier",
///   "version": "0.1.0",
///   "endpoints": ["..."]
/// }
/// ```
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "Department Classifier",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/classify",
            "/find-department/",
            "/add-keyword/",
            "/list-keywords/",
            "/list-departments/",
            "/health",
            "/ready"
        ]
    })))
}

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}

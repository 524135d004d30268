use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use deptclass::ClassifyError;
use knowledge::KnowledgeError;
use semantic::SemanticError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tabular::TabularError;

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Classification failed: {0}")]
    Classify(#[from] ClassifyError),

    #[error("Knowledge base error: {0}")]
    Knowledge(#[from] KnowledgeError),

    #[error("File processing failed: {0}")]
    Tabular(#[from] TabularError),

    #[error("Semantic error: {0}")]
    Semantic(#[from] SemanticError),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found")]
    NotFound,
}

/// API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ServerError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::Classify(err) if err.is_input_error() => StatusCode::BAD_REQUEST,
            ServerError::Knowledge(KnowledgeError::NotFound(_)) => StatusCode::NOT_FOUND,
            ServerError::Knowledge(KnowledgeError::EmptyKeyword) => StatusCode::BAD_REQUEST,
            ServerError::Tabular(TabularError::MissingColumn(_)) => StatusCode::BAD_REQUEST,
            ServerError::Classify(_)
            | ServerError::Knowledge(_)
            | ServerError::Tabular(_)
            | ServerError::Semantic(_)
            | ServerError::Internal(_)
            | ServerError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ServerError::BadRequest(_) => "BAD_REQUEST",
            ServerError::Classify(ClassifyError::MissingColumn(_))
            | ServerError::Tabular(TabularError::MissingColumn(_)) => "MISSING_COLUMN",
            ServerError::Classify(ClassifyError::NoProfile) => "NO_KEYWORDS",
            ServerError::Classify(ClassifyError::EmptyKeywordSet) => "EMPTY_KEYWORDS",
            ServerError::Classify(_) => "CLASSIFY_ERROR",
            ServerError::Knowledge(KnowledgeError::NotFound(_)) => "KEYWORD_NOT_FOUND",
            ServerError::Knowledge(KnowledgeError::EmptyKeyword) => "EMPTY_KEYWORD",
            ServerError::Knowledge(_) => "KNOWLEDGE_BASE_ERROR",
            ServerError::Tabular(_) => "FILE_PARSE_ERROR",
            ServerError::Semantic(_) => "SEMANTIC_ERROR",
            ServerError::Internal(_) => "INTERNAL_ERROR",
            ServerError::Config(_) => "CONFIG_ERROR",
            ServerError::NotFound => "NOT_FOUND",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code().to_string();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(code = %error_code, error = %message, "request failed");
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::Internal(format!("IO error: {err}"))
    }
}

impl From<MultipartError> for ServerError {
    fn from(err: MultipartError) -> Self {
        ServerError::BadRequest(format!("Invalid multipart body: {}", err.body_text()))
    }
}

impl From<JsonRejection> for ServerError {
    fn from(err: JsonRejection) -> Self {
        ServerError::BadRequest(format!("JSON parse error: {}", err.body_text()))
    }
}

impl From<tokio::task::JoinError> for ServerError {
    fn from(err: tokio::task::JoinError) -> Self {
        ServerError::Internal(format!("Background task failed: {err}"))
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        ServerError::Internal(err.to_string())
    }
}

use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use knowledge::registry::{department_map, OTHER_DEPARTMENT};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct FindDepartmentQuery {
    #[serde(default)]
    pub keyword: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FindDepartmentResponse {
    pub keyword: String,
    pub department: String,
}

#[derive(Debug, Deserialize)]
pub struct AddKeywordRequest {
    pub keyword: String,
    pub department_id: i64,
}

#[derive(Debug, Serialize)]
pub struct AddKeywordResponse {
    pub message: String,
    pub department: String,
}

#[derive(Debug, Serialize)]
pub struct ListKeywordsResponse {
    pub knowledge_base: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct ListDepartmentsResponse {
    pub departments: BTreeMap<i64, &'static str>,
    pub other_department: &'static str,
}

/// Look up the department of a keyword (case-insensitive).
pub async fn find_department(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<FindDepartmentQuery>,
) -> ServerResult<impl IntoResponse> {
    let keyword = query
        .keyword
        .ok_or_else(|| ServerError::BadRequest("missing 'keyword' query parameter".to_string()))?;
    let (keyword, department) = state.knowledge.lookup(&keyword)?;
    Ok(Json(FindDepartmentResponse {
        keyword,
        department,
    }))
}

/// Insert a keyword under a registry department id; unknown ids go to
/// the catch-all department. Re-adding an existing keyword is a no-op.
pub async fn add_keyword(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<AddKeywordRequest>, JsonRejection>,
) -> ServerResult<impl IntoResponse> {
    let Json(request) = payload?;
    let knowledge = Arc::clone(&state.knowledge);
    let outcome = tokio::task::spawn_blocking(move || {
        knowledge.add(&request.keyword, request.department_id)
    })
    .await??;

    Ok(Json(AddKeywordResponse {
        message: outcome.message(),
        department: outcome.department().to_string(),
    }))
}

/// Every keyword and its department.
pub async fn list_keywords(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    Json(ListKeywordsResponse {
        knowledge_base: state.knowledge.list(),
    })
}

/// The fixed department registry.
pub async fn list_departments() -> impl IntoResponse {
    Json(ListDepartmentsResponse {
        departments: department_map(),
        other_department: OTHER_DEPARTMENT,
    })
}

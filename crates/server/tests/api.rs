//! Router-level tests driven through `tower::ServiceExt::oneshot`.

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use deptclass::{ClassifierService, EmbedderConfig, EncoderMode, KeywordSet, PipelineConfig};
use http_body_util::BodyExt;
use knowledge::KnowledgeBase;
use serde_json::{json, Value};
use server::{build_router, ServerConfig, ServerState};
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "deptclass-test-boundary";
const KEYWORDS_CSV: &str = "Phòng Đào tạo,Phòng Truyền thông\ntuyển sinh,sự kiện\nhọc phí,báo chí\n";
const TEXTS_CSV: &str = "text,sentiment\ntuyển sinh học phí,positive\nmột câu khác,neutral\n";

async fn classifier() -> Arc<ClassifierService> {
    let cfg = PipelineConfig {
        semantic: EmbedderConfig {
            mode: EncoderMode::Stub,
            hidden_size: 128,
            ..Default::default()
        },
        ..Default::default()
    };
    Arc::new(ClassifierService::from_config(cfg).await.unwrap())
}

fn server_config(dir: &Path) -> ServerConfig {
    ServerConfig {
        knowledge_base_path: dir.join("knowledgebase.csv"),
        results_dir: dir.join("results"),
        ..Default::default()
    }
}

async fn app_with(dir: &TempDir, default_keywords: Option<KeywordSet>) -> Router {
    let config = server_config(dir.path());
    let knowledge = Arc::new(KnowledgeBase::load(&config.knowledge_base_path).unwrap());
    let classifier = classifier().await;
    let default_keywords = default_keywords.map(|set| {
        classifier.rebuild(&set).unwrap();
        Arc::new(set)
    });
    let state = ServerState::from_parts(config, classifier, knowledge, default_keywords);
    build_router(Arc::new(state))
}

async fn app(dir: &TempDir) -> Router {
    app_with(dir, None).await
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart(files: &[(&str, &str, &str)]) -> Request<Body> {
    let mut body = String::new();
    for (field, file_name, content) in files {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: text/csv\r\n\r\n{content}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));

    Request::builder()
        .method("POST")
        .uri("/classify")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn health_and_ready() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir).await;

    let response = app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "healthy");

    let response = app.oneshot(get("/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["components"]["profile"]["loaded"], false);
    assert_eq!(body["components"]["embedder"]["encoder"], "stub");
}

#[tokio::test]
async fn request_id_is_echoed() {
    let dir = TempDir::new().unwrap();
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "abc-123")
        .body(Body::empty())
        .unwrap();
    let response = app(&dir).await.oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "abc-123");
}

#[tokio::test]
async fn list_departments_returns_registry() {
    let dir = TempDir::new().unwrap();
    let response = app(&dir)
        .await
        .oneshot(get("/list-departments/"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["departments"].as_object().unwrap().len(), 6);
    assert_eq!(body["departments"]["5"], "Phòng Đào tạo");
    assert_eq!(body["other_department"], "Other Departments");
}

#[tokio::test]
async fn add_find_and_list_keywords() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir).await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/add-keyword/",
            json!({"keyword": "  Học Phí ", "department_id": 5}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["message"],
        "Keyword 'học phí' added to department 'Phòng Đào tạo'."
    );

    let response = app
        .clone()
        .oneshot(post_json(
            "/add-keyword/",
            json!({"keyword": "HỌC PHÍ", "department_id": 1}),
        ))
        .await
        .unwrap();
    assert_eq!(
        body_json(response).await["message"],
        "Keyword 'học phí' already exists in department 'Phòng Đào tạo'."
    );

    let response = app
        .clone()
        .oneshot(get("/find-department/?keyword=H%E1%BB%8CC%20PH%C3%8D"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["keyword"], "học phí");
    assert_eq!(body["department"], "Phòng Đào tạo");

    let response = app.oneshot(get("/list-keywords/")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["knowledge_base"], json!({"học phí": "Phòng Đào tạo"}));

    assert!(dir.path().join("knowledgebase.csv").exists());
}

#[tokio::test]
async fn unknown_department_id_goes_to_other() {
    let dir = TempDir::new().unwrap();
    let response = app(&dir)
        .await
        .oneshot(post_json(
            "/add-keyword/",
            json!({"keyword": "webinar", "department_id": 42}),
        ))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["department"], "Other Departments");
}

#[tokio::test]
async fn find_unknown_keyword_is_404() {
    let dir = TempDir::new().unwrap();
    let response = app(&dir)
        .await
        .oneshot(get("/find-department/?keyword=nothing"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"]["code"], "KEYWORD_NOT_FOUND");
}

#[tokio::test]
async fn malformed_add_keyword_is_400() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir).await;

    let response = app
        .clone()
        .oneshot(post_json("/add-keyword/", json!({"keyword": "x"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "BAD_REQUEST");

    let response = app
        .oneshot(post_json(
            "/add-keyword/",
            json!({"keyword": "   ", "department_id": 1}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "EMPTY_KEYWORD");
}

#[tokio::test]
async fn classify_with_uploaded_keywords() {
    let dir = TempDir::new().unwrap();
    let response = app(&dir)
        .await
        .oneshot(multipart(&[
            ("texts_file", "texts.csv", TEXTS_CSV),
            ("keywords_file", "keywords.csv", KEYWORDS_CSV),
        ]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["text"], "tuyển sinh học phí");
    assert_eq!(data[0]["sentiment"], "positive");
    assert_eq!(data[0]["departments"], "Rất cao: PHÒNG ĐÀO TẠO");
    assert_eq!(data[1]["sentiment"], "neutral");

    let output = dir.path().join("results").join("classified_results.csv");
    assert!(output.exists());
    assert_eq!(body["output_file"], output.display().to_string());
}

#[tokio::test]
async fn classify_falls_back_to_default_keywords() {
    let dir = TempDir::new().unwrap();
    let defaults: KeywordSet = [("phòng đào tạo", vec!["tuyển sinh", "học phí"])]
        .into_iter()
        .collect();
    let response = app_with(&dir, Some(defaults))
        .await
        .oneshot(multipart(&[("texts_file", "texts.csv", TEXTS_CSV)]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"][0]["departments"], "Rất cao: PHÒNG ĐÀO TẠO");
}

#[tokio::test]
async fn classify_without_any_keywords_is_400() {
    let dir = TempDir::new().unwrap();
    let response = app(&dir)
        .await
        .oneshot(multipart(&[("texts_file", "texts.csv", TEXTS_CSV)]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "NO_KEYWORDS");
}

#[tokio::test]
async fn classify_requires_text_column() {
    let dir = TempDir::new().unwrap();
    let config = server_config(dir.path());
    let knowledge = Arc::new(KnowledgeBase::load(&config.knowledge_base_path).unwrap());
    let classifier = classifier().await;
    let state = ServerState::from_parts(config, Arc::clone(&classifier), knowledge, None);

    let response = build_router(Arc::new(state))
        .oneshot(multipart(&[
            ("texts_file", "texts.csv", "body\nhello\n"),
            ("keywords_file", "keywords.csv", KEYWORDS_CSV),
        ]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "MISSING_COLUMN");
    // The uploaded keywords were never embedded.
    assert!(classifier.current_profile().is_none());
}

#[tokio::test]
async fn classify_requires_texts_file() {
    let dir = TempDir::new().unwrap();
    let response = app(&dir)
        .await
        .oneshot(multipart(&[("keywords_file", "keywords.csv", KEYWORDS_CSV)]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_route_is_404() {
    let dir = TempDir::new().unwrap();
    let response = app(&dir).await.oneshot(get("/nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"]["code"], "NOT_FOUND");
}

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use service::storage::{JsonFileStore, MemoryStore};
use tower::ServiceExt;

use server::routes::{self, AppState};

fn cors() -> tower_http::cors::CorsLayer { tower_http::cors::CorsLayer::very_permissive() }

fn build_app(store: Arc<MemoryStore>) -> Router {
    routes::build_router(AppState::new(store), cors())
}

fn json_request(method: &str, uri: &str, body: &Value) -> anyhow::Result<Request<Body>> {
    Ok(Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body)?))?)
}

fn empty_request(method: &str, uri: &str) -> anyhow::Result<Request<Body>> {
    Ok(Request::builder().method(method).uri(uri).body(Body::empty())?)
}

async fn send(app: &Router, req: Request<Body>) -> anyhow::Result<(StatusCode, Vec<u8>)> {
    let resp = app.clone().oneshot(req).await?;
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    Ok((status, bytes.to_vec()))
}

async fn send_json(app: &Router, req: Request<Body>) -> anyhow::Result<(StatusCode, Value)> {
    let (status, bytes) = send(app, req).await?;
    Ok((status, serde_json::from_slice(&bytes)?))
}

async fn send_text(app: &Router, req: Request<Body>) -> anyhow::Result<(StatusCode, String)> {
    let (status, bytes) = send(app, req).await?;
    Ok((status, String::from_utf8(bytes)?))
}

async fn post_grade(app: &Router, student: &str, subject: &str, kind: &str, value: Value) -> anyhow::Result<Value> {
    let (status, body) = send_json(
        app,
        json_request("POST", "/grades", &json!({"student": student, "subject": subject, "type": kind, "value": value}))?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "create failed: {body}");
    Ok(body)
}

#[tokio::test]
async fn test_create_total_average_top3_scenario() -> anyhow::Result<()> {
    let app = build_app(Arc::new(MemoryStore::new()));

    let first = post_grade(&app, "A", "Math", "Quiz", json!(10)).await?;
    assert_eq!(first["id"], 1);
    assert_eq!(first["type"], "Quiz");
    assert!(first["timestamp"].is_string());
    let second = post_grade(&app, "A", "Math", "Quiz", json!(20)).await?;
    assert_eq!(second["id"], 2);

    // body-carried filters, as older clients send them
    let (status, text) = send_text(&app, json_request("GET", "/grades/total", &json!({"student": "A", "subject": "Math"}))?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, "30");

    let (status, text) = send_text(&app, json_request("GET", "/grades/average", &json!({"subject": "Math", "type": "Quiz"}))?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, "15");

    let (status, body) = send_json(&app, json_request("GET", "/grades/top3", &json!({"subject": "Math", "type": "Quiz"}))?).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("nextId").is_none());
    let ids: Vec<u64> = body["grades"].as_array().unwrap().iter().map(|g| g["id"].as_u64().unwrap()).collect();
    assert_eq!(ids, vec![2, 1]);
    Ok(())
}

#[tokio::test]
async fn test_aggregates_from_query_string() -> anyhow::Result<()> {
    let app = build_app(Arc::new(MemoryStore::new()));
    post_grade(&app, "Ana Lima", "01 - JavaScript", "Fórum", json!(15)).await?;
    post_grade(&app, "Ana Lima", "01 - JavaScript", "Fórum", json!("5")).await?;
    post_grade(&app, "Bob", "01 - JavaScript", "Fórum", json!(40)).await?;

    let (status, text) = send_text(&app, empty_request("GET", "/grades/total?student=Ana%20Lima&subject=01%20-%20JavaScript")?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, "20");

    let (_, text) = send_text(&app, empty_request("GET", "/grades/average?subject=01%20-%20JavaScript&type=F%C3%B3rum")?).await?;
    assert_eq!(text, "20");

    let (_, text) = send_text(&app, empty_request("GET", "/grades/total?student=Nobody&subject=Math")?).await?;
    assert_eq!(text, "0");

    let (_, text) = send_text(&app, empty_request("GET", "/grades/average?subject=Math&type=Quiz")?).await?;
    assert_eq!(text, "NaN");

    let (_, body) = send_json(&app, empty_request("GET", "/grades/top3?subject=Math&type=Quiz")?).await?;
    assert_eq!(body, json!({"grades": []}));
    Ok(())
}

#[tokio::test]
async fn test_missing_filter_is_bad_request() -> anyhow::Result<()> {
    let app = build_app(Arc::new(MemoryStore::new()));
    let (status, body) = send_json(&app, empty_request("GET", "/grades/total?student=A")?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "subject is required");
    Ok(())
}

#[tokio::test]
async fn test_malformed_query_string_is_json_bad_request() -> anyhow::Result<()> {
    let app = build_app(Arc::new(MemoryStore::new()));
    for uri in [
        "/grades/total?student=A&student=B&subject=Math",
        "/grades/top3?subject=Math&subject=Art&type=Quiz",
        "/grades?id=1&id=2",
    ] {
        let resp = app.clone().oneshot(empty_request("GET", uri)?).await?;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
        let ct = resp.headers().get("content-type").and_then(|v| v.to_str().ok()).map(str::to_owned);
        assert_eq!(ct.as_deref(), Some("application/json"), "{uri}");
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
        let body: Value = serde_json::from_slice(&bytes)?;
        assert!(body["error"].as_str().is_some_and(|m| m.contains("duplicate field")), "{uri}: {body}");
    }
    Ok(())
}

#[tokio::test]
async fn test_get_update_delete_by_id() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let app = build_app(Arc::clone(&store));
    post_grade(&app, "A", "Math", "Quiz", json!(10)).await?;
    let created = post_grade(&app, "B", "Math", "Quiz", json!(12)).await?;

    let (status, fetched) = send_json(&app, empty_request("GET", "/grades?id=2")?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let (status, updated) = send_json(
        &app,
        json_request("PUT", "/grades", &json!({"id": 2, "student": "B", "subject": "Math", "type": "Exam", "value": 18}))?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], 2);
    assert_eq!(updated["type"], "Exam");
    assert_ne!(updated["timestamp"], created["timestamp"]);

    // query-string id when the body has none
    let (status, updated) = send_json(
        &app,
        json_request("PUT", "/grades?id=1", &json!({"student": "A", "subject": "Math", "type": "Quiz", "value": 11}))?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], 1);
    assert_eq!(updated["value"], 11);

    let (status, text) = send_text(&app, empty_request("DELETE", "/grades/1")?).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(text.is_empty());

    let doc = store.snapshot().await;
    assert_eq!(doc.next_id, 3);
    assert_eq!(doc.grades.len(), 1);
    assert_eq!(doc.grades[0].id, 2);

    let (status, _) = send_json(&app, empty_request("GET", "/grades?id=1")?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_delete_unknown_id_is_not_found_and_unchanged() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let app = build_app(Arc::clone(&store));
    post_grade(&app, "A", "Math", "Quiz", json!(10)).await?;
    let before = store.snapshot().await;

    let (status, body) = send_json(&app, empty_request("DELETE", "/grades/999")?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "grade 999 not found");
    assert_eq!(store.snapshot().await, before);
    Ok(())
}

#[tokio::test]
async fn test_validation_errors() -> anyhow::Result<()> {
    let app = build_app(Arc::new(MemoryStore::new()));

    let (status, body) = send_json(&app, json_request("POST", "/grades", &json!({"student": "A", "subject": "Math", "value": 3}))?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "type is required");

    let req = Request::builder()
        .method("POST")
        .uri("/grades")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))?;
    let (status, body) = send_json(&app, req).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send_json(&app, empty_request("GET", "/grades")?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_json(&app, empty_request("GET", "/grades?id=abc")?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_json(&app, empty_request("DELETE", "/grades/abc")?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send_json(
        &app,
        json_request("PUT", "/grades?id=2", &json!({"id": 1, "student": "A", "subject": "Math", "type": "Quiz", "value": 1}))?,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "body id 1 does not match query id 2");

    let (status, _) = send_json(
        &app,
        json_request("PUT", "/grades", &json!({"id": 5, "student": "A", "subject": "Math", "type": "Quiz", "value": 1}))?,
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_storage_failure_is_internal_error() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let app = build_app(Arc::clone(&store));
    store.set_fail_saves(true);

    let (status, body) = send_json(
        &app,
        json_request("POST", "/grades", &json!({"student": "A", "subject": "Math", "type": "Quiz", "value": 1}))?,
    )
    .await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().starts_with("storage unavailable"));
    assert!(store.snapshot().await.grades.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_non_integer_value_reports_nan() -> anyhow::Result<()> {
    let app = build_app(Arc::new(MemoryStore::new()));
    post_grade(&app, "A", "Math", "Quiz", json!("ten")).await?;
    post_grade(&app, "A", "Math", "Quiz", json!(10)).await?;
    let (status, text) = send_text(&app, empty_request("GET", "/grades/total?student=A&subject=Math")?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, "NaN");
    Ok(())
}

#[tokio::test]
async fn test_file_backed_app_persists_pretty_document() -> anyhow::Result<()> {
    let tmp = std::env::temp_dir().join(format!("grades_flow_{}.json", uuid::Uuid::new_v4()));
    let store = Arc::new(JsonFileStore::open_or_create(&tmp).await?);
    let app = routes::build_router(AppState::new(store), cors());

    post_grade(&app, "A", "Math", "Quiz", json!(10)).await?;
    let raw = tokio::fs::read_to_string(&tmp).await?;
    assert!(raw.contains("\n  \"nextId\": 2"));
    let doc: Value = serde_json::from_str(&raw)?;
    assert_eq!(doc["grades"][0]["student"], "A");

    let _ = tokio::fs::remove_file(&tmp).await;
    Ok(())
}

#[tokio::test]
async fn test_health_and_openapi() -> anyhow::Result<()> {
    let app = build_app(Arc::new(MemoryStore::new()));
    let (status, body) = send_json(&app, empty_request("GET", "/health")?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send_json(&app, empty_request("GET", "/openapi.json")?).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/grades/top3"].is_object());
    Ok(())
}

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use healthwatch_core::{
    config::{AppConfig, DatabaseConfig},
    create_app, create_app_with_config, get_database_pool, run_migrations, AppState,
    EndpointRepository, HealthCheckOrchestrator, HttpProber, MemoryStore,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn orchestrator() -> HealthCheckOrchestrator {
    let prober = HttpProber::new(5).unwrap();
    HealthCheckOrchestrator::new(Arc::new(prober), Duration::from_secs(2))
}

fn memory_app() -> Router {
    create_app(AppState::new(Arc::new(MemoryStore::new()), orchestrator()))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn register(app: &Router, url: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/endpoints",
        Some(json!({"name": url, "url": url})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_liveness() {
    let app = memory_app();

    let (status, body) = send(&app, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "OK");
    assert_eq!(body["data"]["message"], "API is healthy");
    assert_eq!(body["data"]["endpoints"], 0);
    assert_eq!(body["data"]["backend"], "memory");
}

#[tokio::test]
async fn test_dashboard_page() {
    let app = memory_app();

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/html"));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let page = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(page.contains("/api/status"));
    assert!(page.contains("POLL_INTERVAL_MS = 30000"));
}

#[tokio::test]
async fn test_create_rejects_bad_payloads() {
    let app = memory_app();

    let cases = [
        json!({"name": "no url"}),
        json!({"name": "numeric url", "url": 42}),
        json!({"name": "null url", "url": null}),
        json!({"name": "empty url", "url": ""}),
        json!({"name": "ftp", "url": "ftp://example.com"}),
        json!({"name": "garbage", "url": "not a url"}),
    ];

    for payload in cases {
        let (status, body) = send(&app, Method::POST, "/api/endpoints", Some(payload.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", payload);
        assert_eq!(body["status"], 400);
        assert!(body["error"].is_string());
    }

    let (_, body) = send(&app, Method::GET, "/api/endpoints", None).await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_create_rejects_malformed_json() {
    let app = memory_app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/endpoints")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"url\": "))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/endpoints")
        .body(Body::from("{\"url\": \"http://example.com\"}"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_endpoint_crud() {
    let app = memory_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/endpoints",
        Some(json!({
            "name": "Cat Facts",
            "url": "https://catfact.ninja/fact",
            "authToken": "secret"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["name"], "Cat Facts");
    assert_eq!(body["data"]["hasAuthToken"], true);
    assert!(body["data"].get("authToken").is_none());
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, Method::GET, "/api/endpoints", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = send(&app, Method::GET, &format!("/api/endpoints/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["url"], "https://catfact.ninja/fact");

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/endpoints/{}", id),
        Some(json!({"url": "https://catfact.ninja/breeds", "authToken": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "https://catfact.ninja/breeds");
    assert_eq!(body["data"]["hasAuthToken"], false);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/endpoints/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, Method::GET, &format!("/api/endpoints/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/endpoints/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_and_unknown_ids() {
    let app = memory_app();

    let (status, _) = send(&app, Method::GET, "/api/endpoints/123", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::GET, "/api/status/not-an-id", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let unknown = uuid::Uuid::new_v4();
    let (status, _) = send(&app, Method::GET, &format!("/api/status/{}", unknown), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/endpoints/{}", unknown),
        Some(json!({"url": "http://example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_status_with_empty_registry() {
    let app = memory_app();

    let (status, body) = send(&app, Method::GET, "/api/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_status_reports_every_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/up"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let app = memory_app();
    let up = register(&app, &format!("{}/up", server.uri())).await;
    let down = register(&app, &format!("{}/down", server.uri())).await;
    let refused = register(&app, "http://127.0.0.1:1/").await;

    let (status, body) = send(&app, Method::GET, "/api/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "1 healthy, 2 unhealthy");
    assert_eq!(
        body["data"],
        json!([
            {"endpointId": up, "status": "healthy"},
            {"endpointId": down, "status": "unhealthy"},
            {"endpointId": refused, "status": "unhealthy"},
        ])
    );

    let (status, body) = send(&app, Method::GET, &format!("/api/status/{}", up), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({"endpointId": up, "status": "healthy"}));

    let (_, body) = send(&app, Method::GET, "/api/health", None).await;
    assert_eq!(body["data"]["endpoints"], 3);
}

#[tokio::test]
async fn test_permissive_cors_by_default() {
    let app = memory_app();

    let request = Request::builder()
        .uri("/api/health")
        .header(header::ORIGIN, "http://dashboard.example")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn test_restricted_cors_origins() {
    let mut config = AppConfig::default();
    config.cors.allowed_origins = vec!["http://allowed.example".to_string()];
    let state = AppState::new(Arc::new(MemoryStore::new()), orchestrator());
    let app = create_app_with_config(state, &config);

    let request = Request::builder()
        .uri("/api/health")
        .header(header::ORIGIN, "http://allowed.example")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://allowed.example"
    );

    let request = Request::builder()
        .uri("/api/health")
        .header(header::ORIGIN, "http://other.example")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn test_sqlite_backed_api() {
    let temp_file = NamedTempFile::new().unwrap();
    let config = DatabaseConfig {
        url: format!("sqlite:{}", temp_file.path().display()),
        ..DatabaseConfig::default()
    };
    let pool = get_database_pool(&config).await.unwrap();
    run_migrations(pool.clone()).await.unwrap();

    let registry = Arc::new(EndpointRepository::new(pool));
    let app = create_app(AppState::new(registry, orchestrator()));

    let id = register(&app, "https://example.com/health").await;

    let (status, body) = send(&app, Method::GET, &format!("/api/endpoints/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["url"], "https://example.com/health");

    let (_, body) = send(&app, Method::GET, "/api/health", None).await;
    assert_eq!(body["data"]["backend"], "sqlite");
    assert_eq!(body["data"]["endpoints"], 1);
}

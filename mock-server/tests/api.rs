use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, DATABASE, PASSWORD, TOKEN, USERNAME};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn post(uri: &str, token: Option<&str>, body: Value) -> Request<String> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(http::header::AUTHORIZATION, format!("Token {token}"));
    }
    builder.body(body.to_string()).unwrap()
}

fn command(name: &str, body: Value) -> Request<String> {
    post(&format!("/rest/db/{DATABASE}/{name}/"), Some(TOKEN), body)
}

// --- login ---

#[tokio::test]
async fn login_issues_token() {
    let resp = app()
        .oneshot(post(
            "/rest/auth/token/login/",
            None,
            json!({"username": USERNAME, "password": PASSWORD}),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert!(!body["token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn login_wrong_password_returns_400() {
    let resp = app()
        .oneshot(post(
            "/rest/auth/token/login/",
            None,
            json!({"username": USERNAME, "password": "wrong"}),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- auth ---

#[tokio::test]
async fn check_without_token_returns_401() {
    let resp = app()
        .oneshot(post(&format!("/rest/db/{DATABASE}/check/"), None, json!({})))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(&body_bytes(resp).await[..], b"Invalid token.");
}

#[tokio::test]
async fn check_unknown_database_returns_404() {
    let resp = app()
        .oneshot(post("/rest/db/nowhere/check/", Some(TOKEN), json!({})))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn check_reports_connected() {
    let resp = app().oneshot(command("check", json!({}))).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({"data": {"connected": true}}));
}

// --- commands ---

#[tokio::test]
async fn get_unknown_path_returns_400_json() {
    let resp = app()
        .oneshot(command("get", json!({"path": "ghost.weight", "states": []})))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("ghost.weight"));
}

#[tokio::test]
async fn malformed_payload_returns_400() {
    let resp = app()
        .oneshot(command("remove", json!({"ids": "not-a-list"})))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_command_returns_404() {
    let resp = app().oneshot(command("explode", json!({}))).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_accepts_bodies_over_two_megabytes() {
    let blob = "x".repeat(3 << 20);
    let resp = app()
        .oneshot(command(
            "update",
            json!({"data": [{"id": "big", "blob": blob}], "partial": false}),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"][0]["blob"].as_str().unwrap().len(), 3 << 20);
}

// --- full lifecycle ---

#[tokio::test]
async fn update_query_remove_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // update
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(command(
            "update",
            json!({"data": [{"id": "car", "name": "car", "weight": 1200}], "partial": false}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await,
        json!({"data": [{"id": "car", "name": "car", "weight": 1200}]})
    );

    // get
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(command("get", json!({"path": "car.weight", "states": []})))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await, json!({"data": 1200}));

    // query
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(command("query", json!({"nodes": ["car"], "properties": ["weight"]})))
        .await
        .unwrap();
    assert_eq!(
        body_json(resp).await,
        json!({"data": [{"id": "car", "weight": 1200}]})
    );

    // remove
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(command("remove", json!({"ids": ["car"]})))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await, json!({"data": null}));

    // query — empty again
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(command("query", json!({})))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await, json!({"data": []}));

    // journal lists every command in order
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .uri(format!("/__journal/{DATABASE}/"))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        body_json(resp).await,
        json!(["update", "get", "query", "remove", "query"])
    );
}

//! Mock backend for integration tests: an axum router served on an ephemeral port.

#![allow(dead_code)]

use axum::Router;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use merch_console::ApiClient;
use serde_json::{Value, json};

/// Serve `routes` under `/api` and return a client bound to it.
pub async fn spawn(routes: Router) -> ApiClient {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().nest("/api", routes);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    ApiClient::with_base_url(&format!("http://{addr}/api")).unwrap()
}

pub fn task_json(id: &str, status: &str, progress: f64) -> Value {
    json!({
        "id": id,
        "taskType": "UPLOAD_STYLES",
        "status": status,
        "progressPercentage": progress,
        "progressMessage": format!("{progress}%"),
        "createdAt": "2024-05-01T09:00:00",
    })
}

pub async fn internal_error() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(json!({"message": "database unavailable"})))
}

pub async fn gateway_page() -> impl IntoResponse {
    (StatusCode::BAD_GATEWAY, Html("<!DOCTYPE html><html><body><h1>502 Bad Gateway</h1></body></html>"))
}

//! `logging::init` against a stand-in Rollbar.
//!
//! The global subscriber can only be installed once per process, so this
//! file holds a single test.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use courtbot_notify::alert::AlertStats;
use courtbot_notify::config::AlertConfig;
use courtbot_notify::logging;
use serde_json::{Value, json};

#[derive(Clone, Default)]
struct Items(Arc<Mutex<Vec<(Option<String>, Value)>>>);

async fn create_item(
    State(items): State<Items>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let token = headers
        .get("x-rollbar-access-token")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    items.0.lock().unwrap().push((token, body));
    Json(json!({"err": 0, "result": {"uuid": "0b9f1a"}}))
}

#[tokio::test]
async fn init_forwards_errors_and_flush_delivers_them() {
    let items = Items::default();
    let router = Router::new()
        .route("/api/1/item/", post(create_item))
        .with_state(items.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let config = AlertConfig {
        access_token: Some("post_server_item_token".into()),
        environment: "test".into(),
        endpoint: Some(format!("http://{addr}/api/1/item/")),
    };
    let guard = logging::init(&config)
        .unwrap()
        .expect("a token enables forwarding");

    tracing::info!("reminders sent");
    tracing::error!(case_id = "A1", "failed to send reminder");

    let stats = guard.flush(Duration::from_secs(5)).await;
    assert_eq!(stats, Some(AlertStats { reported: 1, failed: 0 }));

    let items = items.0.lock().unwrap();
    assert_eq!(items.len(), 1);
    let (token, body) = &items[0];
    assert_eq!(token.as_deref(), Some("post_server_item_token"));
    assert_eq!(body["data"]["environment"], "test");
    assert_eq!(
        body["data"]["body"]["message"]["body"],
        "failed to send reminder {case_id=A1}"
    );
}

//! Integration tests for the Twilio client.
//!
//! A local axum server stands in for the Messages API and records what it
//! receives.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Form, Json, Router};
use courtbot_notify::NotifyError;
use courtbot_notify::config::TwilioConfig;
use courtbot_notify::sms::TwilioClient;
use serde_json::{Value, json};

#[derive(Clone, Default)]
struct Received(Arc<Mutex<Vec<(String, Option<String>, HashMap<String, String>)>>>);

async fn create_message(
    State(received): State<Received>,
    Path(sid): Path<String>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let invalid_to = form.get("To").is_some_and(|to| to == "123");
    received.0.lock().unwrap().push((sid, auth, form));

    if invalid_to {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "code": 21211,
                "message": "The 'To' number 123 is not a valid phone number.",
                "status": 400,
            })),
        );
    }
    (
        StatusCode::CREATED,
        Json(json!({"sid": "SM0001", "status": "queued"})),
    )
}

/// Helper: spawn a stand-in Messages API on a random port.
async fn spawn_twilio() -> (Received, String) {
    let received = Received::default();
    let router = Router::new()
        .route(
            "/2010-04-01/Accounts/{sid}/Messages.json",
            post(create_message),
        )
        .with_state(received.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (received, format!("http://{addr}"))
}

#[tokio::test]
async fn send_posts_form_with_basic_auth() {
    let (received, base) = spawn_twilio().await;
    let client = TwilioClient::new("AC123", "secret")
        .unwrap()
        .with_base_url(base);

    let sent = client
        .send("+15005550006", "+15005550001", "Reminder: court tomorrow.")
        .await
        .unwrap();
    assert_eq!(sent.sid, "SM0001");
    assert_eq!(sent.status.as_deref(), Some("queued"));

    let received = received.0.lock().unwrap();
    assert_eq!(received.len(), 1);
    let (sid, auth, form) = &received[0];
    assert_eq!(sid, "AC123");
    assert_eq!(auth.as_deref(), Some("Basic QUMxMjM6c2VjcmV0"));
    assert_eq!(form["To"], "+15005550006");
    assert_eq!(form["From"], "+15005550001");
    assert_eq!(form["Body"], "Reminder: court tomorrow.");
}

#[tokio::test]
async fn rejected_message_surfaces_twilio_error_text() {
    let (_received, base) = spawn_twilio().await;
    let client = TwilioClient::new("AC123", "secret")
        .unwrap()
        .with_base_url(base);

    let err = client.send("123", "+15005550001", "hi").await.unwrap_err();
    match err {
        NotifyError::Api {
            service,
            status,
            message,
        } => {
            assert_eq!(service, "twilio");
            assert_eq!(status, 400);
            assert_eq!(message, "The 'To' number 123 is not a valid phone number.");
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_host_is_a_request_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = TwilioConfig {
        account_sid: "AC123".into(),
        auth_token: "secret".into(),
        api_url: Some(format!("http://{addr}")),
        ..Default::default()
    };
    let err = courtbot_notify::sms::send(&config, "+15005550006", "+15005550001", "hi")
        .await
        .unwrap_err();
    assert!(matches!(err, NotifyError::Request(_)), "{err:?}");
}

#[tokio::test]
async fn send_builds_its_client_from_config() {
    let (received, base) = spawn_twilio().await;
    let config = TwilioConfig {
        account_sid: "AC987".into(),
        auth_token: "token".into(),
        phone_number: Some("+15005550001".into()),
        api_url: Some(base),
    };

    let sent = courtbot_notify::sms::send(
        &config,
        "+15005550006",
        "+15005550001",
        "See you in court.",
    )
    .await
    .unwrap();
    assert_eq!(sent.sid, "SM0001");

    let received = received.0.lock().unwrap();
    assert_eq!(received.len(), 1);
    let (sid, auth, form) = &received[0];
    assert_eq!(sid, "AC987");
    // base64("AC987:token")
    assert_eq!(auth.as_deref(), Some("Basic QUM5ODc6dG9rZW4="));
    assert_eq!(form["Body"], "See you in court.");
}

#[tokio::test]
async fn send_without_credentials_never_reaches_the_api() {
    let (received, base) = spawn_twilio().await;
    let config = TwilioConfig {
        api_url: Some(base),
        ..Default::default()
    };

    let err = courtbot_notify::sms::send(&config, "+15005550006", "+15005550001", "hi")
        .await
        .unwrap_err();
    assert!(matches!(err, NotifyError::MissingEnv("TWILIO_ACCOUNT_SID")));
    assert!(received.0.lock().unwrap().is_empty());
}

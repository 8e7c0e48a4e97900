//! HTTP API tests driving the router in-process with `tower::ServiceExt`.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use reunite_nullables::{NullCaseStore, NullClock, NullNotifier};
use reunite_rpc::RpcServer;
use reunite_verification::{CaseWorkflow, WorkflowLimits};
use serde_json::{json, Value};
use tower::util::ServiceExt;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const FINDER: &str = "fay@example.org";
const CLAIMANT: &str = "cal@example.org";
const ADMIN: &str = "ada@example.org";

fn app() -> Router {
    let workflow = CaseWorkflow::new(
        Arc::new(NullCaseStore::new()),
        Arc::new(NullClock::new(1_700_000_000)),
        Arc::new(NullNotifier::new()),
        WorkflowLimits::default(),
    );
    RpcServer::router(Arc::new(workflow))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    caller: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(email) = caller {
        builder = builder.header("x-caller-email", email);
        if email == ADMIN {
            builder = builder.header("x-caller-admin", "true");
        }
    }
    let request = match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn open_case(app: &Router) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/cases",
        Some(CLAIMANT),
        Some(json!({
            "pet": { "name": "Biscuit", "species": "dog" },
            "finder": { "display_name": "Fay", "email": FINDER },
            "claimant": { "display_name": "Cal", "email": CLAIMANT },
            "verification_method": "MICROCHIP"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["case_id"].as_str().unwrap().to_string()
}

async fn submit_chip(app: &Router, id: &str) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        &format!("/cases/{id}/evidence"),
        Some(CLAIMANT),
        Some(json!({ "evidence": { "MICROCHIP": { "chip": "985121000000001" } } })),
    )
    .await
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_is_public() {
    let (status, body) = send(&app(), Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn missing_identity_is_401() {
    let (status, body) = send(&app(), Method::GET, "/cases", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "missing_identity");
}

#[tokio::test]
async fn full_dispute_flow_over_http() {
    let app = app();
    let id = open_case(&app).await;

    let (status, case) = submit_chip(&app, &id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(case["status"], "PENDING");

    let (status, case) = send(
        &app,
        Method::POST,
        &format!("/cases/{id}/decision"),
        Some(FINDER),
        Some(json!({ "outcome": "REJECTED", "reason": "chip mismatch" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(case["status"], "REJECTED");

    let (status, case) = send(
        &app,
        Method::POST,
        &format!("/cases/{id}/dispute"),
        Some(CLAIMANT),
        Some(json!({ "reason": "chip reader error on finder's side" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(case["status"], "DISPUTED");

    let (status, queue) = send(&app, Method::GET, "/cases/disputes", Some(ADMIN), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(queue["cases"].as_array().unwrap().len(), 1);

    let (status, case) = send(
        &app,
        Method::POST,
        &format!("/cases/{id}/ruling"),
        Some(ADMIN),
        Some(json!({ "outcome": "VERIFIED", "reason": "chip re-scanned, matches" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(case["status"], json!({ "RESOLVED": { "outcome": "VERIFIED" } }));

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/cases/{id}/decision"),
        Some(FINDER),
        Some(json!({ "outcome": "VERIFIED", "reason": "fine" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "invalid_transition");
}

#[tokio::test]
async fn error_statuses() {
    let app = app();
    let id = open_case(&app).await;

    // wrong role
    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/cases/{id}/decision"),
        Some(CLAIMANT),
        Some(json!({ "outcome": "VERIFIED", "reason": "it's mine" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "unauthorized");

    // wrong evidence shape for the method
    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/cases/{id}/evidence"),
        Some(CLAIMANT),
        Some(json!({ "evidence": { "OTHER": { "description": "trust me" } } })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "malformed_evidence");

    // unparseable body
    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/cases/{id}/messages"),
        Some(CLAIMANT),
        Some(json!({ "text": "wrong field" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    // bad id and unknown id
    let (status, _) = send(&app, Method::GET, "/cases/not-hex", Some(CLAIMANT), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let unknown = "00".repeat(16);
    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/cases/{unknown}"),
        Some(CLAIMANT),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    // stranger
    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/cases/{id}"),
        Some("eve@example.org"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn chat_pages_and_freezes() {
    let app = app();
    let id = open_case(&app).await;

    for (who, text) in [(FINDER, "found him by the pond"), (CLAIMANT, "that's Biscuit!")] {
        let (status, _) = send(
            &app,
            Method::POST,
            &format!("/cases/{id}/messages"),
            Some(who),
            Some(json!({ "body": text })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, page) = send(
        &app,
        Method::GET,
        &format!("/cases/{id}/messages?offset=0&count=1"),
        Some(ADMIN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["messages"][0]["body"], "found him by the pond");
    assert_eq!(page["messages"][0]["sender_role"], "finder");
    assert_eq!(page["pagination"]["total"], 2);
    assert_eq!(page["pagination"]["next_offset"], 1);

    submit_chip(&app, &id).await;
    send(
        &app,
        Method::POST,
        &format!("/cases/{id}/decision"),
        Some(FINDER),
        Some(json!({ "outcome": "VERIFIED", "reason": "chip matches" })),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/cases/{id}/messages"),
        Some(CLAIMANT),
        Some(json!({ "body": "thank you!" })),
    )
    .await;
    assert_eq!(status, StatusCode::LOCKED);
    assert_eq!(body["error"], "channel_frozen");
}

#[tokio::test]
async fn list_and_queue_access() {
    let app = app();
    open_case(&app).await;

    let (status, body) = send(&app, Method::GET, "/cases", Some(FINDER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cases"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, Method::GET, "/cases/disputes", Some(FINDER), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::{admin_request, evidence_payload, invite_payload, invite_payload_with_geofence, parse_body, TestApp};
use serde_json::{json, Value};
use std::sync::atomic::Ordering;
use tower::ServiceExt;

async fn create_invite(app: &TestApp, payload: Value) -> (String, String) {
    let auth = app.login().await;
    let res = app.router.clone().oneshot(
        admin_request("POST", "/api/v1/invites", &auth, Some(payload))
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    (
        body["invite"]["id"].as_str().unwrap().to_string(),
        body["invite"]["token"].as_str().unwrap().to_string(),
    )
}

fn submit_request(token: &str, payload: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/api/v1/submissions/submit/{}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_submit_without_geofence_disables_token() {
    let app = TestApp::new().await;
    let (invite_id, token) = create_invite(&app, invite_payload()).await;

    // Candidate prefill works while the link is live
    let res = app.router.clone().oneshot(
        Request::builder()
            .method("GET")
            .uri(format!("/api/v1/candidate/invite/{}", token))
            .body(Body::empty())
            .unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Arbitrary coordinates are admitted when no geofence is configured
    let res = app.router.clone().oneshot(
        submit_request(&token, &evidence_payload(51.5074, -0.1278))
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = parse_body(res).await;
    let submission = &body["submission"];
    assert_eq!(submission["status"], json!("submitted"));
    assert_eq!(submission["invite_id"].as_str().unwrap(), invite_id);
    assert!(submission["map_image_url"].as_str().unwrap().starts_with("https://maps.test/"));
    assert!(submission["house_entrance_url"].as_str().unwrap().starts_with("https://media.test/"));
    assert!(submission["signature_url"].as_str().unwrap().starts_with("https://media.test/"));

    // The token is burned together with the record write
    let auth = app.login().await;
    let res = app.router.clone().oneshot(
        admin_request("GET", &format!("/api/v1/invites/{}", invite_id), &auth, None)
    ).await.unwrap();
    let body = parse_body(res).await;
    assert_eq!(body["invite"]["token_disabled"], json!(true));
    assert_eq!(body["invite"]["status"], json!("submitted"));

    // Prefill and resubmission both observe the dead link
    let res = app.router.clone().oneshot(
        Request::builder()
            .method("GET")
            .uri(format!("/api/v1/candidate/invite/{}", token))
            .body(Body::empty())
            .unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::GONE);

    let res = app.router.clone().oneshot(
        submit_request(&token, &evidence_payload(51.5074, -0.1278))
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::GONE);
}

#[tokio::test]
async fn test_submit_with_unknown_token_is_not_found() {
    let app = TestApp::new().await;

    let res = app.router.clone().oneshot(
        submit_request("does-not-exist", &evidence_payload(0.0, 0.0))
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_submit_outside_geofence_has_no_side_effects() {
    let app = TestApp::new().await;
    let (invite_id, token) = create_invite(
        &app,
        invite_payload_with_geofence(22.57, 88.36, 100.0),
    ).await;

    // Roughly 500m north of the configured center
    let res = app.router.clone().oneshot(
        submit_request(&token, &evidence_payload(22.5745, 88.36))
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = parse_body(res).await;
    let distance = body["distance_m"].as_f64().unwrap();
    assert!(distance > 400.0 && distance < 600.0, "distance was {}", distance);
    assert_eq!(body["radius_m"].as_f64().unwrap(), 100.0);

    // Nothing persisted, nothing uploaded, token still live
    assert_eq!(app.storage.uploads.load(Ordering::SeqCst), 0);

    let auth = app.login().await;
    let res = app.router.clone().oneshot(
        admin_request("GET", &format!("/api/v1/invites/{}", invite_id), &auth, None)
    ).await.unwrap();
    let body = parse_body(res).await;
    assert_eq!(body["invite"]["token_disabled"], json!(false));

    let res = app.router.clone().oneshot(
        admin_request("GET", "/api/v1/submissions", &auth, None)
    ).await.unwrap();
    let body = parse_body(res).await;
    assert_eq!(body["total"], json!(0));

    // Retrying inside the fence succeeds
    let res = app.router.clone().oneshot(
        submit_request(&token, &evidence_payload(22.5703, 88.3601))
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_submit_with_missing_evidence_is_rejected() {
    let app = TestApp::new().await;
    let (invite_id, token) = create_invite(&app, invite_payload()).await;

    let mut payload = evidence_payload(22.57, 88.36);
    payload["signature"] = Value::Null;

    let res = app.router.clone().oneshot(
        submit_request(&token, &payload)
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = parse_body(res).await;
    assert!(body["error"].as_str().unwrap().contains("signature"));

    // Token stays live for a corrected attempt
    let auth = app.login().await;
    let res = app.router.clone().oneshot(
        admin_request("GET", &format!("/api/v1/invites/{}", invite_id), &auth, None)
    ).await.unwrap();
    let body = parse_body(res).await;
    assert_eq!(body["invite"]["token_disabled"], json!(false));
}

#[tokio::test]
async fn test_upload_failure_aborts_before_any_mutation() {
    let app = TestApp::new().await;
    let (invite_id, token) = create_invite(&app, invite_payload()).await;

    app.storage.fail.store(true, Ordering::SeqCst);

    let res = app.router.clone().oneshot(
        submit_request(&token, &evidence_payload(22.57, 88.36))
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);

    let auth = app.login().await;
    let res = app.router.clone().oneshot(
        admin_request("GET", &format!("/api/v1/invites/{}", invite_id), &auth, None)
    ).await.unwrap();
    let body = parse_body(res).await;
    assert_eq!(body["invite"]["token_disabled"], json!(false));

    let res = app.router.clone().oneshot(
        admin_request("GET", "/api/v1/submissions", &auth, None)
    ).await.unwrap();
    let body = parse_body(res).await;
    assert_eq!(body["total"], json!(0));

    // The whole call is safe to retry once the outage clears
    app.storage.fail.store(false, Ordering::SeqCst);
    let res = app.router.clone().oneshot(
        submit_request(&token, &evidence_payload(22.57, 88.36))
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_submissions_list_is_hydrated_with_invites() {
    let app = TestApp::new().await;
    let (_, token) = create_invite(&app, invite_payload()).await;

    let res = app.router.clone().oneshot(
        submit_request(&token, &evidence_payload(10.0, 20.0))
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let auth = app.login().await;
    let res = app.router.clone().oneshot(
        admin_request("GET", "/api/v1/submissions", &auth, None)
    ).await.unwrap();
    let body = parse_body(res).await;

    assert_eq!(body["total"], json!(1));
    let entry = &body["submissions"][0];
    assert_eq!(entry["submission"]["status"], json!("submitted"));
    assert_eq!(entry["invite"]["candidate_name"], json!("Priya Sharma"));

    // Status filter
    let res = app.router.clone().oneshot(
        admin_request("GET", "/api/v1/submissions?status=accepted", &auth, None)
    ).await.unwrap();
    let body = parse_body(res).await;
    assert_eq!(body["total"], json!(0));
}

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::{admin_request, evidence_payload, invite_payload, parse_body, AuthHeaders, TestApp};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn create_and_submit(app: &TestApp, auth: &AuthHeaders) -> (String, String, String) {
    let res = app.router.clone().oneshot(
        admin_request("POST", "/api/v1/invites", auth, Some(invite_payload()))
    ).await.unwrap();
    let body = parse_body(res).await;
    let invite_id = body["invite"]["id"].as_str().unwrap().to_string();
    let token = body["invite"]["token"].as_str().unwrap().to_string();

    let res = app.router.clone().oneshot(
        Request::builder()
            .method("POST")
            .uri(format!("/api/v1/submissions/submit/{}", token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(evidence_payload(22.57, 88.36).to_string()))
            .unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    let submission_id = body["submission"]["id"].as_str().unwrap().to_string();

    (invite_id, token, submission_id)
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
async fn test_accept_is_terminal() {
    let app = TestApp::new().await;
    let auth = app.login().await;
    let (_, token, submission_id) = create_and_submit(&app, &auth).await;

    let res = app.router.clone().oneshot(
        admin_request("POST", &format!("/api/v1/submissions/{}/accept", submission_id), &auth, None)
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let accepted = parse_body(res).await;
    assert_eq!(accepted["status"], json!("accepted"));
    assert!(accepted["accepted_at"].as_str().is_some());

    // Accepted tokens cannot be resubmitted; only rejection re-opens them
    let res = app.router.clone().oneshot(
        submit_request(&token, &evidence_payload(22.57, 88.36))
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::GONE);

    // Double accept is an explicit conflict, not a silent re-stamp
    let res = app.router.clone().oneshot(
        admin_request("POST", &format!("/api/v1/submissions/{}/accept", submission_id), &auth, None)
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // Rejecting an accepted record is equally illegal
    let res = app.router.clone().oneshot(
        admin_request("POST", &format!("/api/v1/submissions/{}/reject", submission_id), &auth, Some(json!({"reason": "nope"})))
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_reject_requires_reason() {
    let app = TestApp::new().await;
    let auth = app.login().await;
    let (_, _, submission_id) = create_and_submit(&app, &auth).await;

    let res = app.router.clone().oneshot(
        admin_request("POST", &format!("/api/v1/submissions/{}/reject", submission_id), &auth, Some(json!({"reason": "   "})))
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reject_reopens_token_with_regenerated_link() {
    let app = TestApp::new().await;
    let auth = app.login().await;
    let (invite_id, token, submission_id) = create_and_submit(&app, &auth).await;

    let res = app.router.clone().oneshot(
        admin_request("POST", &format!("/api/v1/submissions/{}/reject", submission_id), &auth, Some(json!({"reason": "Photos are blurry"})))
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = parse_body(res).await;
    let submission = &body["submission"];
    assert_eq!(submission["status"], json!("rejected"));
    assert_eq!(submission["reject_reason"], json!("Photos are blurry"));
    assert!(submission["rejected_at"].as_str().is_some());

    // The regenerated link embeds the same token
    let link = body["link"].as_str().unwrap();
    assert_eq!(link, format!("http://localhost:5173/verify/{}", token));

    // The invite flips back atomically with the record
    let res = app.router.clone().oneshot(
        admin_request("GET", &format!("/api/v1/invites/{}", invite_id), &auth, None)
    ).await.unwrap();
    let body = parse_body(res).await;
    assert_eq!(body["invite"]["token_disabled"], json!(false));
    assert_eq!(body["invite"]["status"], json!("pending"));
}

#[tokio::test]
async fn test_resubmission_overwrites_rejected_record() {
    let app = TestApp::new().await;
    let auth = app.login().await;
    let (_, token, submission_id) = create_and_submit(&app, &auth).await;

    let res = app.router.clone().oneshot(
        admin_request("POST", &format!("/api/v1/submissions/{}/reject", submission_id), &auth, Some(json!({"reason": "Wrong house"})))
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Second attempt on the same token, different evidence
    let mut payload = evidence_payload(22.5701, 88.3602);
    payload["ownership"] = json!("rented");
    payload["verified_person_name"] = json!("Ravi Sharma");

    let res = app.router.clone().oneshot(
        submit_request(&token, &payload)
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Exactly one record survives, reflecting only the second payload
    let res = app.router.clone().oneshot(
        admin_request("GET", "/api/v1/submissions", &auth, None)
    ).await.unwrap();
    let body = parse_body(res).await;
    assert_eq!(body["total"], json!(1));

    let entry = &body["submissions"][0]["submission"];
    assert_eq!(entry["id"].as_str().unwrap(), submission_id);
    assert_eq!(entry["status"], json!("submitted"));
    assert_eq!(entry["ownership"], json!("rented"));
    assert_eq!(entry["verified_person_name"], json!("Ravi Sharma"));
    assert_eq!(entry["lat"].as_f64().unwrap(), 22.5701);
    assert_eq!(entry["reject_reason"], Value::Null);
    assert_eq!(entry["rejected_at"], Value::Null);
    assert_eq!(entry["regenerated_link"], Value::Null);

    // A third submission without another rejection is refused
    let res = app.router.clone().oneshot(
        submit_request(&token, &evidence_payload(22.57, 88.36))
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::GONE);
}

#[tokio::test]
async fn test_operator_edits_touch_context_fields_only() {
    let app = TestApp::new().await;
    let auth = app.login().await;
    let (_, _, submission_id) = create_and_submit(&app, &auth).await;

    let res = app.router.clone().oneshot(
        admin_request("GET", &format!("/api/v1/submissions/{}", submission_id), &auth, None)
    ).await.unwrap();
    let before = parse_body(res).await;
    let photo_before = before["submission"]["house_entrance_url"].as_str().unwrap().to_string();

    let res = app.router.clone().oneshot(
        admin_request("PUT", &format!("/api/v1/submissions/{}", submission_id), &auth, Some(json!({
            "ownership": "family-owned",
            "address_type": "permanent",
            "from_month": "03",
            "from_year": "2018",
            "to_month": "06",
            "to_year": "2025",
            "verified_by_relation": "father",
            "verified_person_name": "S. Sharma",
            "resolved_address": "12 Park Street, Kolkata 700016"
        })))
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let updated = parse_body(res).await;
    assert_eq!(updated["ownership"], json!("family-owned"));
    assert_eq!(updated["verified_by_relation"], json!("father"));
    // Evidence references are not operator-editable
    assert_eq!(updated["house_entrance_url"].as_str().unwrap(), photo_before);
    assert_eq!(updated["status"], json!("submitted"));
}

#[tokio::test]
async fn test_review_of_missing_submission_is_not_found() {
    let app = TestApp::new().await;
    let auth = app.login().await;

    let res = app.router.clone().oneshot(
        admin_request("POST", "/api/v1/submissions/no-such-id/accept", &auth, None)
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app.router.clone().oneshot(
        admin_request("POST", "/api/v1/submissions/no-such-id/reject", &auth, Some(json!({"reason": "x"})))
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::{parse_body, TestApp, TEST_ADMIN_EMAIL};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let app = TestApp::new().await;

    let res = app.router.clone().oneshot(
        Request::builder()
            .method("POST")
            .uri("/api/v1/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({
                "email": TEST_ADMIN_EMAIL,
                "password": "wrong-password"
            }).to_string()))
            .unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app.router.clone().oneshot(
        Request::builder()
            .method("POST")
            .uri("/api/v1/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({
                "email": "nobody@test.local",
                "password": "irrelevant"
            }).to_string()))
            .unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_sets_cookie_pair_and_csrf() {
    let app = TestApp::new().await;
    let auth = app.login().await;

    assert!(!auth.access_token.is_empty());
    assert!(!auth.csrf_token.is_empty());
}

#[tokio::test]
async fn test_refresh_rotates_the_token() {
    let app = TestApp::new().await;

    let res = app.router.clone().oneshot(
        Request::builder()
            .method("POST")
            .uri("/api/v1/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({
                "email": TEST_ADMIN_EMAIL,
                "password": common::TEST_ADMIN_PASSWORD
            }).to_string()))
            .unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let refresh_cookie = res.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|h| h.to_str().unwrap().to_string())
        .find(|c| c.contains("refresh_token="))
        .expect("No refresh_token cookie returned");

    let start = refresh_cookie.find("refresh_token=").unwrap() + 14;
    let end = refresh_cookie[start..].find(';').unwrap_or(refresh_cookie.len() - start);
    let refresh_token = refresh_cookie[start..start + end].to_string();

    let res = app.router.clone().oneshot(
        Request::builder()
            .method("POST")
            .uri("/api/v1/auth/refresh")
            .header(header::COOKIE, format!("refresh_token={}", refresh_token))
            .body(Body::empty())
            .unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert!(body["csrf_token"].as_str().is_some());

    // The old refresh token was consumed by the rotation
    let res = app.router.clone().oneshot(
        Request::builder()
            .method("POST")
            .uri("/api/v1/auth/refresh")
            .header(header::COOKIE, format!("refresh_token={}", refresh_token))
            .body(Body::empty())
            .unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

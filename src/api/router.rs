use axum::{
    body::Body,
    extract::Request,
    routing::{get, post, put, delete},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{auth, candidate, dashboard, health, invite, submission};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tower_cookies::CookieManagerLayer;
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Auth
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route("/api/v1/auth/logout", post(auth::logout))

        // Dashboard
        .route("/api/v1/dashboard/stats", get(dashboard::stats))
        .route("/api/v1/dashboard/status-summary", get(dashboard::status_summary))
        .route("/api/v1/dashboard/trend", get(dashboard::trend))
        .route("/api/v1/dashboard/recent-invites", get(dashboard::recent_invites))
        .route("/api/v1/dashboard/recent-submissions", get(dashboard::recent_submissions))

        // Invites (operator)
        .route("/api/v1/invites", post(invite::create_invite).get(invite::list_invites))
        .route("/api/v1/invites/{invite_id}", get(invite::get_invite).put(invite::update_invite).delete(invite::delete_invite))

        // Candidate Flow (public, token-addressed)
        .route("/api/v1/candidate/invite/{token}", get(candidate::get_invite_by_token))
        .route("/api/v1/submissions/submit/{token}", post(submission::submit_evidence))

        // Submissions (operator)
        .route("/api/v1/submissions", get(submission::list_submissions))
        .route("/api/v1/submissions/bulk-delete", post(submission::bulk_delete_submissions))
        .route("/api/v1/submissions/{submission_id}", get(submission::get_submission).put(submission::update_submission_fields).delete(submission::delete_submission))
        .route("/api/v1/submissions/{submission_id}/accept", post(submission::accept_submission))
        .route("/api/v1/submissions/{submission_id}/reject", post(submission::reject_submission))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        admin_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .layer(CookieManagerLayer::new())
        .with_state(state)
}

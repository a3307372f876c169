use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthAdmin;
use crate::api::dtos::responses::SubmissionWithInvite;
use crate::error::AppError;
use std::collections::HashMap;
use std::sync::Arc;
use chrono::{Datelike, Duration, NaiveDate, TimeZone, Utc};

const RECENT_LIMIT: i64 = 5;

fn start_of(date: NaiveDate) -> chrono::DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap())
}

pub async fn stats(
    State(state): State<Arc<AppState>>,
    _admin: AuthAdmin,
) -> Result<impl IntoResponse, AppError> {
    let today = Utc::now().date_naive();
    let start_today = start_of(today);
    let start_yesterday = start_of(today - Duration::days(1));
    let start_month = start_of(today.with_day(1).unwrap());

    let total_invites = state.invite_repo.count_between(None, None).await?;
    let invites_today = state.invite_repo.count_between(Some(start_today), None).await?;
    let invites_yesterday = state.invite_repo
        .count_between(Some(start_yesterday), Some(start_today))
        .await?;
    let invites_this_month = state.invite_repo.count_between(Some(start_month), None).await?;
    let pending_all = state.invite_repo.count_pending_between(None, None).await?;
    let pending_this_month = state.invite_repo.count_pending_between(Some(start_month), None).await?;

    let submitted_total = state.submission_repo.count_between(None, None).await?;
    let submitted_today = state.submission_repo.count_between(Some(start_today), None).await?;

    Ok(Json(serde_json::json!({
        "stats": {
            "total_invites": total_invites,
            "submitted_total": submitted_total,
            "pending_all": pending_all,
            "invites_today": invites_today,
            "invites_yesterday": invites_yesterday,
            "submitted_today": submitted_today,
            "invites_this_month": invites_this_month,
            "pending_this_month": pending_this_month,
        }
    })))
}

pub async fn status_summary(
    State(state): State<Arc<AppState>>,
    _admin: AuthAdmin,
) -> Result<impl IntoResponse, AppError> {
    let accepted = state.submission_repo.count_by_status("accepted").await?;
    let rejected = state.submission_repo.count_by_status("rejected").await?;
    let submitted = state.submission_repo.count_by_status("submitted").await?;

    Ok(Json(serde_json::json!({
        "accepted": accepted,
        "rejected": rejected,
        "submitted": submitted,
    })))
}

pub async fn trend(
    State(state): State<Arc<AppState>>,
    _admin: AuthAdmin,
) -> Result<impl IntoResponse, AppError> {
    let today = Utc::now().date_naive();
    let mut result = Vec::with_capacity(7);

    for i in (0..7).rev() {
        let date = today - Duration::days(i);
        let start = start_of(date);
        let end = start_of(date + Duration::days(1));

        let count = state.invite_repo.count_between(Some(start), Some(end)).await?;

        result.push(serde_json::json!({
            "date": date.format("%-d %b").to_string(),
            "count": count,
        }));
    }

    Ok(Json(serde_json::json!({ "trend": result })))
}

pub async fn recent_invites(
    State(state): State<Arc<AppState>>,
    _admin: AuthAdmin,
) -> Result<impl IntoResponse, AppError> {
    let invites = state.invite_repo.list_recent(RECENT_LIMIT).await?;
    Ok(Json(serde_json::json!({ "invites": invites })))
}

pub async fn recent_submissions(
    State(state): State<Arc<AppState>>,
    _admin: AuthAdmin,
) -> Result<impl IntoResponse, AppError> {
    let submissions = state.submission_repo.list_recent(RECENT_LIMIT).await?;

    let invite_ids: Vec<String> = submissions.iter().map(|s| s.invite_id.clone()).collect();
    let invites = state.invite_repo.find_by_ids(&invite_ids).await?;
    let mut invites_by_id: HashMap<String, _> = invites.into_iter()
        .map(|i| (i.id.clone(), i))
        .collect();

    let submissions: Vec<SubmissionWithInvite> = submissions.into_iter()
        .map(|submission| {
            let invite = invites_by_id.remove(&submission.invite_id);
            SubmissionWithInvite { submission, invite }
        })
        .collect();

    Ok(Json(serde_json::json!({ "submissions": submissions })))
}

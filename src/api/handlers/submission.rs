use axum::{extract::{State, Path, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthAdmin;
use crate::api::dtos::requests::{
    BulkDeleteRequest, RejectSubmissionRequest, SubmissionListQuery, SubmitEvidenceRequest,
    UpdateSubmissionFieldsRequest,
};
use crate::api::dtos::responses::{BulkDeleteResponse, SubmissionListResponse, SubmissionWithInvite};
use crate::api::handlers::invite::{day_end, day_start};
use crate::domain::models::submission::{ContextFields, EvidencePayload};
use crate::domain::ports::SubmissionFilter;
use crate::error::AppError;
use base64::{engine::general_purpose, Engine as _};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

const DEFAULT_PAGE_SIZE: i64 = 10;

pub async fn submit_evidence(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    Json(payload): Json<SubmitEvidenceRequest>,
) -> Result<impl IntoResponse, AppError> {
    let evidence = EvidencePayload {
        context: ContextFields {
            ownership: payload.ownership,
            address_type: payload.address_type,
            from_month: payload.from_month,
            from_year: payload.from_year,
            to_month: payload.to_month,
            to_year: payload.to_year,
            verified_by_relation: payload.verified_by_relation,
            verified_person_name: payload.verified_person_name,
            resolved_address: payload.resolved_address,
        },
        lat: payload.lat,
        lng: payload.lng,
        accuracy: payload.accuracy,
        house_entrance: decode_image("houseEntrance", payload.house_entrance)?,
        selfie_with_house: decode_image("selfieWithHouse", payload.selfie_with_house)?,
        id_photo: decode_image("idPhoto", payload.id_photo)?,
        landmark_photo: decode_image("landmarkPhoto", payload.landmark_photo)?,
        signature: decode_image("signature", payload.signature)?,
    };

    let submission = state.verification_service.submit(&token, evidence).await?;

    Ok(Json(serde_json::json!({
        "message": "Submission received successfully",
        "submission": submission,
    })))
}

pub async fn list_submissions(
    State(state): State<Arc<AppState>>,
    _admin: AuthAdmin,
    Query(query): Query<SubmissionListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 100);
    let page = query.page.unwrap_or(1).max(1);

    let filter = SubmissionFilter {
        page,
        limit,
        from: query.from.map(day_start),
        to: query.to.map(day_end),
        status: query.status,
        client: query.client,
        search: query.search,
    };

    let (submissions, total) = state.submission_repo.list_filtered(&filter).await?;

    let invite_ids: Vec<String> = submissions.iter().map(|s| s.invite_id.clone()).collect();
    let invites = state.invite_repo.find_by_ids(&invite_ids).await?;
    let mut invites_by_id: HashMap<String, _> = invites.into_iter()
        .map(|i| (i.id.clone(), i))
        .collect();

    let submissions = submissions.into_iter()
        .map(|submission| {
            let invite = invites_by_id.remove(&submission.invite_id);
            SubmissionWithInvite { submission, invite }
        })
        .collect();

    let total_pages = (total + limit - 1) / limit;

    Ok(Json(SubmissionListResponse { submissions, total, page, total_pages }))
}

pub async fn get_submission(
    State(state): State<Arc<AppState>>,
    _admin: AuthAdmin,
    Path(submission_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let submission = state.submission_repo.find_by_id(&submission_id).await?
        .ok_or(AppError::NotFound("Submission not found".into()))?;

    let invite = state.invite_repo.find_by_id(&submission.invite_id).await?;

    Ok(Json(SubmissionWithInvite { submission, invite }))
}

pub async fn update_submission_fields(
    State(state): State<Arc<AppState>>,
    _admin: AuthAdmin,
    Path(submission_id): Path<String>,
    Json(payload): Json<UpdateSubmissionFieldsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let fields = ContextFields {
        ownership: payload.ownership,
        address_type: payload.address_type,
        from_month: payload.from_month,
        from_year: payload.from_year,
        to_month: payload.to_month,
        to_year: payload.to_year,
        verified_by_relation: payload.verified_by_relation,
        verified_person_name: payload.verified_person_name,
        resolved_address: payload.resolved_address,
    };

    let updated = state.submission_repo.update_fields(&submission_id, &fields).await?;
    info!("Updated submission fields: {}", submission_id);
    Ok(Json(updated))
}

pub async fn accept_submission(
    State(state): State<Arc<AppState>>,
    _admin: AuthAdmin,
    Path(submission_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let accepted = state.verification_service.accept(&submission_id).await?;
    Ok(Json(accepted))
}

pub async fn reject_submission(
    State(state): State<Arc<AppState>>,
    _admin: AuthAdmin,
    Path(submission_id): Path<String>,
    Json(payload): Json<RejectSubmissionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let rejected = state.verification_service.reject(&submission_id, &payload.reason).await?;

    Ok(Json(serde_json::json!({
        "message": "Submission rejected successfully",
        "link": rejected.regenerated_link,
        "submission": rejected,
    })))
}

pub async fn delete_submission(
    State(state): State<Arc<AppState>>,
    _admin: AuthAdmin,
    Path(submission_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.verification_service.delete_submission(&submission_id).await?;
    Ok(Json(serde_json::json!({"status": "deleted"})))
}

pub async fn bulk_delete_submissions(
    State(state): State<Arc<AppState>>,
    _admin: AuthAdmin,
    Json(payload): Json<BulkDeleteRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (submissions_deleted, invites_deleted) =
        state.verification_service.bulk_delete(&payload.ids).await?;

    Ok(Json(BulkDeleteResponse { submissions_deleted, invites_deleted }))
}

/// Accepts plain base64 or `data:<mime>;base64,<payload>` URLs. A missing
/// field decodes to empty bytes; the workflow reports which evidence is
/// missing.
fn decode_image(name: &str, value: Option<String>) -> Result<Vec<u8>, AppError> {
    let Some(value) = value else {
        return Ok(Vec::new());
    };

    let encoded = if value.starts_with("data:") {
        value.split_once(',')
            .map(|(_, rest)| rest.to_string())
            .ok_or_else(|| AppError::Validation(format!("Malformed data URL for {}", name)))?
    } else {
        value
    };

    general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|_| AppError::Validation(format!("Invalid base64 image data for {}", name)))
}

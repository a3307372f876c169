use axum::{extract::{State, Path, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthAdmin;
use crate::api::dtos::requests::{CreateInviteRequest, InviteListQuery, UpdateInviteRequest};
use crate::api::dtos::responses::{InviteCreatedResponse, InviteDetailResponse, InviteListResponse};
use crate::domain::models::invite::{Invite, NewInviteParams};
use crate::domain::ports::InviteFilter;
use crate::error::AppError;
use std::sync::Arc;
use chrono::{NaiveDate, TimeZone, Utc};
use tracing::info;

const DEFAULT_PAGE_SIZE: i64 = 10;

pub async fn create_invite(
    State(state): State<Arc<AppState>>,
    _admin: AuthAdmin,
    Json(payload): Json<CreateInviteRequest>,
) -> Result<impl IntoResponse, AppError> {
    let required = [
        ("client_name", &payload.client_name),
        ("organization", &payload.organization),
        ("candidate_name", &payload.candidate_name),
        ("candidate_email", &payload.candidate_email),
        ("candidate_mobile", &payload.candidate_mobile),
        ("full_address", &payload.full_address),
        ("district", &payload.district),
        ("pincode", &payload.pincode),
        ("reference_id", &payload.reference_id),
    ];
    for (name, value) in required {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{} is required", name)));
        }
    }

    let invite = Invite::new(NewInviteParams {
        client_name: payload.client_name,
        organization: payload.organization,
        candidate_name: payload.candidate_name,
        candidate_email: payload.candidate_email,
        candidate_mobile: payload.candidate_mobile,
        full_address: payload.full_address,
        district: payload.district,
        pincode: payload.pincode,
        reference_id: payload.reference_id,
        center_lat: payload.center_lat,
        center_lng: payload.center_lng,
        radius_m: payload.radius_m,
    });

    let created = state.invite_repo.create(&invite).await?;

    let link = state.config.verify_link(&created.token);
    let whatsapp_url = build_whatsapp_url(&created.candidate_mobile, &created.candidate_name, &link);

    info!("Created invite {} for client {}", created.id, created.client_name);

    Ok(Json(InviteCreatedResponse { invite: created, link, whatsapp_url }))
}

pub async fn list_invites(
    State(state): State<Arc<AppState>>,
    _admin: AuthAdmin,
    Query(query): Query<InviteListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 100);
    let page = query.page.unwrap_or(1).max(1);

    let filter = InviteFilter {
        page,
        limit,
        from: query.from.map(day_start),
        to: query.to.map(day_end),
        client: query.client,
        search: query.search,
    };

    let (invites, total) = state.invite_repo.list_filtered(&filter).await?;
    let total_pages = (total + limit - 1) / limit;

    Ok(Json(InviteListResponse { invites, total, page, total_pages }))
}

pub async fn get_invite(
    State(state): State<Arc<AppState>>,
    _admin: AuthAdmin,
    Path(invite_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let invite = state.invite_repo.find_by_id(&invite_id).await?
        .ok_or(AppError::NotFound("Invite not found".into()))?;

    let link = state.config.verify_link(&invite.token);

    Ok(Json(InviteDetailResponse { invite, link }))
}

pub async fn update_invite(
    State(state): State<Arc<AppState>>,
    _admin: AuthAdmin,
    Path(invite_id): Path<String>,
    Json(payload): Json<UpdateInviteRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut invite = state.invite_repo.find_by_id(&invite_id).await?
        .ok_or(AppError::NotFound("Invite not found".into()))?;

    if let Some(v) = payload.client_name { invite.client_name = v; }
    if let Some(v) = payload.organization { invite.organization = v; }
    if let Some(v) = payload.candidate_name { invite.candidate_name = v; }
    if let Some(v) = payload.candidate_email { invite.candidate_email = v; }
    if let Some(v) = payload.candidate_mobile { invite.candidate_mobile = v; }
    if let Some(v) = payload.full_address { invite.full_address = v; }
    if let Some(v) = payload.district { invite.district = v; }
    if let Some(v) = payload.pincode { invite.pincode = v; }
    if let Some(v) = payload.reference_id { invite.reference_id = v; }
    if payload.center_lat.is_some() { invite.center_lat = payload.center_lat; }
    if payload.center_lng.is_some() { invite.center_lng = payload.center_lng; }
    if payload.radius_m.is_some() { invite.radius_m = payload.radius_m; }

    let updated = state.invite_repo.update(&invite).await?;
    info!("Updated invite: {}", invite_id);
    Ok(Json(updated))
}

pub async fn delete_invite(
    State(state): State<Arc<AppState>>,
    _admin: AuthAdmin,
    Path(invite_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.invite_repo.delete(&invite_id).await?;
    info!("Deleted invite: {}", invite_id);
    Ok(Json(serde_json::json!({"status": "deleted"})))
}

pub fn day_start(date: NaiveDate) -> chrono::DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap())
}

pub fn day_end(date: NaiveDate) -> chrono::DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(23, 59, 59).unwrap())
}

fn build_whatsapp_url(mobile: &str, candidate_name: &str, link: &str) -> String {
    let message = format!(
        "Dear {},\nYour address verification is required.\n\nClick the link below to complete your verification:\n{}",
        candidate_name, link
    );

    format!("https://wa.me/{}?text={}", mobile, percent_encode(&message))
}

fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len() * 3);
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

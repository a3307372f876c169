use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::error::AppError;
use std::sync::Arc;

/// Public prefill for the candidate form. Exposes only what the candidate
/// needs to see, never the workflow flags.
pub async fn get_invite_by_token(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let invite = state.invite_repo.find_by_token(&token).await?
        .ok_or(AppError::NotFound("Invalid or expired invite link".into()))?;

    if invite.token_disabled {
        return Err(AppError::Gone("This link has already been used".into()));
    }

    Ok(Json(serde_json::json!({
        "invite": {
            "client_name": invite.client_name,
            "organization": invite.organization,
            "candidate_name": invite.candidate_name,
            "candidate_email": invite.candidate_email,
            "candidate_mobile": invite.candidate_mobile,
            "full_address": invite.full_address,
            "district": invite.district,
            "pincode": invite.pincode,
            "reference_id": invite.reference_id,
            "token": invite.token,
        }
    })))
}

use std::sync::Arc;
use chrono::Utc;
use tracing::{info, warn};

use crate::config::Config;
use crate::domain::models::invite::Invite;
use crate::domain::models::submission::{EvidencePayload, EvidenceRefs, Submission, SubmissionStatus};
use crate::domain::ports::{EvidenceStorage, InviteRepository, MapSnapshotService, SubmissionRepository};
use crate::domain::services::geo;
use crate::error::AppError;

const DEFAULT_ACCURACY_M: f64 = 50.0;

/// Drives the capture-token / evidence-record state machine:
///
/// ```text
/// (no record) --submit--> submitted --accept--> accepted   [terminal]
///                            |
///                            +-----reject----> rejected --submit--> submitted
/// ```
///
/// The cross-entity mutations of `submit` and `reject` are delegated to the
/// submission repository as single transactions; everything before them
/// (validation, geofence, uploads) is side-effect free with respect to the
/// ledger.
pub struct VerificationService {
    invite_repo: Arc<dyn InviteRepository>,
    submission_repo: Arc<dyn SubmissionRepository>,
    storage: Arc<dyn EvidenceStorage>,
    maps: Arc<dyn MapSnapshotService>,
    config: Config,
}

impl VerificationService {
    pub fn new(
        invite_repo: Arc<dyn InviteRepository>,
        submission_repo: Arc<dyn SubmissionRepository>,
        storage: Arc<dyn EvidenceStorage>,
        maps: Arc<dyn MapSnapshotService>,
        config: Config,
    ) -> Self {
        Self { invite_repo, submission_repo, storage, maps, config }
    }

    pub async fn submit(&self, token: &str, payload: EvidencePayload) -> Result<Submission, AppError> {
        let invite = self.invite_repo.find_by_token(token).await?
            .ok_or(AppError::NotFound("Invalid or expired invite link".into()))?;

        if invite.token_disabled {
            return Err(AppError::Gone("This link has already been used".into()));
        }

        validate_evidence(&payload)?;
        self.check_geofence(&invite, &payload)?;

        // Uploads happen strictly before any ledger mutation; a failure or
        // timeout here aborts the submission with zero persistent effects.
        let refs = self.upload_evidence(&payload).await?;

        let submission = Submission::new(invite.id.clone(), &payload, refs);

        match self.submission_repo.upsert_for_invite(&submission, &invite.token).await {
            Ok(saved) => {
                info!("Evidence submitted for invite {}", invite.id);
                Ok(saved)
            }
            // Lost the token-burn race: another submission won while this one
            // was uploading. The subject sees the link as consumed.
            Err(AppError::Conflict(_)) => {
                warn!("Concurrent submission lost token race for invite {}", invite.id);
                Err(AppError::Gone("This link has already been used".into()))
            }
            Err(e) => Err(e),
        }
    }

    pub async fn accept(&self, id: &str) -> Result<Submission, AppError> {
        let submission = self.submission_repo.find_by_id(id).await?
            .ok_or(AppError::NotFound("Submission not found".into()))?;

        require_reviewable(&submission, "accepted")?;

        let accepted = self.submission_repo.accept(id, Utc::now()).await?
            .ok_or(AppError::Conflict("Submission is no longer awaiting review".into()))?;

        info!("Submission accepted: {}", id);
        Ok(accepted)
    }

    pub async fn reject(&self, id: &str, reason: &str) -> Result<Submission, AppError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::Validation("Reason is required".into()));
        }

        let submission = self.submission_repo.find_by_id(id).await?
            .ok_or(AppError::NotFound("Submission not found".into()))?;

        require_reviewable(&submission, "rejected")?;

        let invite = self.invite_repo.find_by_id(&submission.invite_id).await?
            .ok_or(AppError::NotFound("Invite not found".into()))?;

        // Same token, one more attempt: the regenerated link re-embeds it.
        let regenerated_link = self.config.verify_link(&invite.token);

        let rejected = self.submission_repo
            .reject(id, &invite.id, reason, &regenerated_link, Utc::now())
            .await?
            .ok_or(AppError::Conflict("Submission is no longer awaiting review".into()))?;

        info!("Submission rejected: {} (token re-enabled)", id);
        Ok(rejected)
    }

    pub async fn delete_submission(&self, id: &str) -> Result<(), AppError> {
        self.submission_repo.delete_with_invite(id).await?;
        info!("Submission and owning invite deleted: {}", id);
        Ok(())
    }

    pub async fn bulk_delete(&self, ids: &[String]) -> Result<(u64, u64), AppError> {
        if ids.is_empty() {
            return Err(AppError::Validation("No submission IDs provided".into()));
        }

        let (submissions, invites) = self.submission_repo.bulk_delete_with_invites(ids).await?;
        info!("Bulk delete removed {} submissions and {} invites", submissions, invites);
        Ok((submissions, invites))
    }

    fn check_geofence(&self, invite: &Invite, payload: &EvidencePayload) -> Result<(), AppError> {
        let Some((center_lat, center_lng, radius_m)) = invite.geofence() else {
            return Ok(());
        };

        let (distance_m, inside) =
            geo::within_radius(center_lat, center_lng, payload.lat, payload.lng, radius_m)?;

        if !inside {
            warn!(
                "Submission outside geofence for invite {}: {:.0}m > {:.0}m",
                invite.id, distance_m, radius_m
            );
            return Err(AppError::OutOfBounds { distance_m, radius_m });
        }

        Ok(())
    }

    async fn upload_evidence(&self, payload: &EvidencePayload) -> Result<EvidenceRefs, AppError> {
        let house_entrance_url = self.storage.store(&payload.house_entrance, "house").await?;
        let selfie_with_house_url = self.storage.store(&payload.selfie_with_house, "selfie").await?;
        let id_photo_url = self.storage.store(&payload.id_photo, "id").await?;
        let landmark_photo_url = self.storage.store(&payload.landmark_photo, "landmark").await?;
        let signature_url = self.storage.store(&payload.signature, "signature").await?;

        let map_image_url = self.maps.snapshot_url(
            payload.lat,
            payload.lng,
            payload.accuracy.unwrap_or(DEFAULT_ACCURACY_M),
        );

        Ok(EvidenceRefs {
            map_image_url,
            house_entrance_url,
            selfie_with_house_url,
            id_photo_url,
            landmark_photo_url,
            signature_url,
        })
    }
}

fn validate_evidence(payload: &EvidencePayload) -> Result<(), AppError> {
    if !payload.lat.is_finite() || !payload.lng.is_finite() {
        return Err(AppError::Validation("A valid location fix is required".into()));
    }

    let required: [(&str, &[u8]); 5] = [
        ("houseEntrance", &payload.house_entrance),
        ("selfieWithHouse", &payload.selfie_with_house),
        ("idPhoto", &payload.id_photo),
        ("landmarkPhoto", &payload.landmark_photo),
        ("signature", &payload.signature),
    ];

    for (name, data) in required {
        if data.is_empty() {
            return Err(AppError::Validation(format!("Missing required evidence: {}", name)));
        }
    }

    Ok(())
}

fn require_reviewable(submission: &Submission, action: &str) -> Result<(), AppError> {
    let status = SubmissionStatus::parse(&submission.status)
        .ok_or_else(|| AppError::InternalWithMsg(format!("Unknown submission status: {}", submission.status)))?;

    if !status.reviewable() {
        return Err(AppError::Conflict(format!(
            "Only submitted evidence can be {} (current status: {})",
            action, submission.status
        )));
    }

    Ok(())
}

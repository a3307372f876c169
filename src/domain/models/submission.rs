use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Evidence record states. Review transitions (`accept`/`reject`) are only
/// legal from `Submitted`; `Accepted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStatus {
    Pending,
    Submitted,
    Accepted,
    Rejected,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Submitted => "submitted",
            SubmissionStatus::Accepted => "accepted",
            SubmissionStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(SubmissionStatus::Pending),
            "submitted" => Some(SubmissionStatus::Submitted),
            "accepted" => Some(SubmissionStatus::Accepted),
            "rejected" => Some(SubmissionStatus::Rejected),
            _ => None,
        }
    }

    pub fn reviewable(&self) -> bool {
        matches!(self, SubmissionStatus::Submitted)
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Submission {
    pub id: String,
    pub invite_id: String,

    pub ownership: Option<String>,
    pub address_type: Option<String>,
    pub from_month: Option<String>,
    pub from_year: Option<String>,
    pub to_month: Option<String>,
    pub to_year: Option<String>,
    pub verified_by_relation: Option<String>,
    pub verified_person_name: Option<String>,
    pub resolved_address: Option<String>,

    pub lat: f64,
    pub lng: f64,
    pub accuracy: Option<f64>,

    pub map_image_url: Option<String>,
    pub house_entrance_url: String,
    pub selfie_with_house_url: String,
    pub id_photo_url: String,
    pub landmark_photo_url: String,
    pub signature_url: String,

    pub status: String, // pending, submitted, accepted, rejected
    pub reject_reason: Option<String>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub regenerated_link: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Address-context fields the candidate fills in alongside the captured
/// evidence. The operator may later edit these (and only these).
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ContextFields {
    pub ownership: Option<String>,
    pub address_type: Option<String>,
    pub from_month: Option<String>,
    pub from_year: Option<String>,
    pub to_month: Option<String>,
    pub to_year: Option<String>,
    pub verified_by_relation: Option<String>,
    pub verified_person_name: Option<String>,
    pub resolved_address: Option<String>,
}

/// Raw evidence as decoded from the candidate request, before upload.
pub struct EvidencePayload {
    pub context: ContextFields,
    pub lat: f64,
    pub lng: f64,
    pub accuracy: Option<f64>,
    pub house_entrance: Vec<u8>,
    pub selfie_with_house: Vec<u8>,
    pub id_photo: Vec<u8>,
    pub landmark_photo: Vec<u8>,
    pub signature: Vec<u8>,
}

/// Stable references returned by the storage collaborator.
pub struct EvidenceRefs {
    pub map_image_url: Option<String>,
    pub house_entrance_url: String,
    pub selfie_with_house_url: String,
    pub id_photo_url: String,
    pub landmark_photo_url: String,
    pub signature_url: String,
}

impl Submission {
    pub fn new(invite_id: String, payload: &EvidencePayload, refs: EvidenceRefs) -> Self {
        let now = Utc::now();
        let ctx = payload.context.clone();

        Self {
            id: Uuid::new_v4().to_string(),
            invite_id,
            ownership: ctx.ownership,
            address_type: ctx.address_type,
            from_month: ctx.from_month,
            from_year: ctx.from_year,
            to_month: ctx.to_month,
            to_year: ctx.to_year,
            verified_by_relation: ctx.verified_by_relation,
            verified_person_name: ctx.verified_person_name,
            resolved_address: ctx.resolved_address,
            lat: payload.lat,
            lng: payload.lng,
            accuracy: payload.accuracy,
            map_image_url: refs.map_image_url,
            house_entrance_url: refs.house_entrance_url,
            selfie_with_house_url: refs.selfie_with_house_url,
            id_photo_url: refs.id_photo_url,
            landmark_photo_url: refs.landmark_photo_url,
            signature_url: refs.signature_url,
            status: SubmissionStatus::Submitted.as_str().to_string(),
            reject_reason: None,
            accepted_at: None,
            rejected_at: None,
            regenerated_link: None,
            created_at: now,
            updated_at: now,
        }
    }
}

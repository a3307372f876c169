use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use rand::{distributions::Alphanumeric, Rng};

/// Invite lifecycle states. `Submitted` mirrors `token_disabled = true`
/// except during the reject/re-enable transition, which flips both back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InviteStatus {
    Pending,
    Submitted,
}

impl InviteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InviteStatus::Pending => "pending",
            InviteStatus::Submitted => "submitted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(InviteStatus::Pending),
            "submitted" => Some(InviteStatus::Submitted),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Invite {
    pub id: String,
    pub client_name: String,
    pub organization: String,
    pub candidate_name: String,
    pub candidate_email: String,
    pub candidate_mobile: String,
    pub full_address: String,
    pub district: String,
    pub pincode: String,
    pub reference_id: String,
    pub token: String,
    pub token_disabled: bool,
    pub status: String, // pending, submitted
    pub center_lat: Option<f64>,
    pub center_lng: Option<f64>,
    pub radius_m: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewInviteParams {
    pub client_name: String,
    pub organization: String,
    pub candidate_name: String,
    pub candidate_email: String,
    pub candidate_mobile: String,
    pub full_address: String,
    pub district: String,
    pub pincode: String,
    pub reference_id: String,
    pub center_lat: Option<f64>,
    pub center_lng: Option<f64>,
    pub radius_m: Option<f64>,
}

impl Invite {
    pub fn new(params: NewInviteParams) -> Self {
        // Bearer capability: 32 alphanumeric chars, well above 128 bits.
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();

        let now = Utc::now();

        Self {
            id: Uuid::new_v4().to_string(),
            client_name: params.client_name,
            organization: params.organization,
            candidate_name: params.candidate_name,
            candidate_email: params.candidate_email,
            candidate_mobile: params.candidate_mobile,
            full_address: params.full_address,
            district: params.district,
            pincode: params.pincode,
            reference_id: params.reference_id,
            token,
            token_disabled: false,
            status: InviteStatus::Pending.as_str().to_string(),
            center_lat: params.center_lat,
            center_lng: params.center_lng,
            radius_m: params.radius_m,
            created_at: now,
            updated_at: now,
        }
    }

    /// A geofence applies only when center and radius are all configured.
    pub fn geofence(&self) -> Option<(f64, f64, f64)> {
        match (self.center_lat, self.center_lng, self.radius_m) {
            (Some(lat), Some(lng), Some(radius)) => Some((lat, lng, radius)),
            _ => None,
        }
    }
}

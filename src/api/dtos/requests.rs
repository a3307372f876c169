use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct CreateInviteRequest {
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

#[derive(Deserialize)]
pub struct UpdateInviteRequest {
    pub client_name: Option<String>,
    pub organization: Option<String>,
    pub candidate_name: Option<String>,
    pub candidate_email: Option<String>,
    pub candidate_mobile: Option<String>,
    pub full_address: Option<String>,
    pub district: Option<String>,
    pub pincode: Option<String>,
    pub reference_id: Option<String>,
    pub center_lat: Option<f64>,
    pub center_lng: Option<f64>,
    pub radius_m: Option<f64>,
}

#[derive(Deserialize)]
pub struct InviteListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub client: Option<String>,
    pub search: Option<String>,
}

/// Candidate evidence. Images arrive base64-encoded, optionally as
/// `data:image/...;base64,` URLs (the signature pad produces those).
#[derive(Deserialize)]
pub struct SubmitEvidenceRequest {
    pub lat: f64,
    pub lng: f64,
    pub accuracy: Option<f64>,

    pub ownership: Option<String>,
    pub address_type: Option<String>,
    pub from_month: Option<String>,
    pub from_year: Option<String>,
    pub to_month: Option<String>,
    pub to_year: Option<String>,
    pub verified_by_relation: Option<String>,
    pub verified_person_name: Option<String>,
    pub resolved_address: Option<String>,

    pub house_entrance: Option<String>,
    pub selfie_with_house: Option<String>,
    pub id_photo: Option<String>,
    pub landmark_photo: Option<String>,
    pub signature: Option<String>,
}

#[derive(Deserialize)]
pub struct SubmissionListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub status: Option<String>,
    pub client: Option<String>,
    pub search: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateSubmissionFieldsRequest {
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

#[derive(Deserialize)]
pub struct RejectSubmissionRequest {
    pub reason: String,
}

#[derive(Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Vec<String>,
}

use serde::Serialize;
use crate::domain::models::{invite::Invite, submission::Submission};

#[derive(Serialize)]
pub struct InviteCreatedResponse {
    pub invite: Invite,
    pub link: String,
    pub whatsapp_url: String,
}

#[derive(Serialize)]
pub struct InviteDetailResponse {
    pub invite: Invite,
    pub link: String,
}

#[derive(Serialize)]
pub struct InviteListResponse {
    pub invites: Vec<Invite>,
    pub total: i64,
    pub page: i64,
    pub total_pages: i64,
}

#[derive(Serialize)]
pub struct SubmissionWithInvite {
    pub submission: Submission,
    pub invite: Option<Invite>,
}

#[derive(Serialize)]
pub struct SubmissionListResponse {
    pub submissions: Vec<SubmissionWithInvite>,
    pub total: i64,
    pub page: i64,
    pub total_pages: i64,
}

#[derive(Serialize)]
pub struct BulkDeleteResponse {
    pub submissions_deleted: u64,
    pub invites_deleted: u64,
}

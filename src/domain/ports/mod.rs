use crate::domain::models::{
    admin::Admin, auth::RefreshTokenRecord, invite::Invite,
    submission::{ContextFields, Submission},
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct InviteFilter {
    pub page: i64,
    pub limit: i64,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub client: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SubmissionFilter {
    pub page: i64,
    pub limit: i64,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub client: Option<String>,
    pub search: Option<String>,
}

#[async_trait]
pub trait InviteRepository: Send + Sync {
    async fn create(&self, invite: &Invite) -> Result<Invite, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Invite>, AppError>;
    async fn find_by_token(&self, token: &str) -> Result<Option<Invite>, AppError>;
    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Invite>, AppError>;
    async fn list_filtered(&self, filter: &InviteFilter) -> Result<(Vec<Invite>, i64), AppError>;
    async fn list_recent(&self, limit: i64) -> Result<Vec<Invite>, AppError>;
    async fn update(&self, invite: &Invite) -> Result<Invite, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
    async fn count_between(&self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Result<i64, AppError>;
    async fn count_pending_between(&self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Result<i64, AppError>;
}

#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    /// Persist evidence and burn the capture token as one transaction.
    /// The token burn is a compare-and-swap on `token_disabled`; losing the
    /// swap rolls the whole transaction back.
    async fn upsert_for_invite(&self, submission: &Submission, token: &str) -> Result<Submission, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Submission>, AppError>;
    async fn find_by_invite(&self, invite_id: &str) -> Result<Option<Submission>, AppError>;
    async fn list_filtered(&self, filter: &SubmissionFilter) -> Result<(Vec<Submission>, i64), AppError>;
    async fn list_recent(&self, limit: i64) -> Result<Vec<Submission>, AppError>;
    /// Guarded on `status = 'submitted'`; returns None when the guard misses.
    async fn accept(&self, id: &str, at: DateTime<Utc>) -> Result<Option<Submission>, AppError>;
    /// Marks the record rejected and re-enables the owning invite's token in
    /// one transaction. Guarded on `status = 'submitted'`.
    async fn reject(&self, id: &str, invite_id: &str, reason: &str, regenerated_link: &str, at: DateTime<Utc>) -> Result<Option<Submission>, AppError>;
    async fn update_fields(&self, id: &str, fields: &ContextFields) -> Result<Submission, AppError>;
    /// Deletes the owning invite (when resolvable) and the record together.
    async fn delete_with_invite(&self, id: &str) -> Result<(), AppError>;
    /// Returns (records deleted, invites deleted).
    async fn bulk_delete_with_invites(&self, ids: &[String]) -> Result<(u64, u64), AppError>;
    async fn count_by_status(&self, status: &str) -> Result<i64, AppError>;
    async fn count_between(&self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Result<i64, AppError>;
}

#[async_trait]
pub trait AdminRepository: Send + Sync {
    async fn create(&self, admin: &Admin) -> Result<Admin, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Admin>, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Admin>, AppError>;
}

#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn create_refresh_token(&self, record: &RefreshTokenRecord) -> Result<(), AppError>;
    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshTokenRecord>, AppError>;
    async fn delete_refresh_token(&self, token_hash: &str) -> Result<(), AppError>;
    async fn delete_refresh_family(&self, family_id: Uuid) -> Result<(), AppError>;
}

#[async_trait]
pub trait EvidenceStorage: Send + Sync {
    /// Uploads a binary blob and returns a stable URL.
    async fn store(&self, data: &[u8], category: &str) -> Result<String, AppError>;
}

/// Static-map reference for a location fix. Absence of a snapshot is not an
/// error; submission proceeds without one.
pub trait MapSnapshotService: Send + Sync {
    fn snapshot_url(&self, lat: f64, lng: f64, accuracy_m: f64) -> Option<String>;
}

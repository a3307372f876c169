use std::sync::Arc;
use crate::domain::ports::{
    AdminRepository, AuthRepository, EvidenceStorage, InviteRepository,
    MapSnapshotService, SubmissionRepository,
};
use crate::domain::services::auth_service::AuthService;
use crate::domain::services::verification_service::VerificationService;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub invite_repo: Arc<dyn InviteRepository>,
    pub submission_repo: Arc<dyn SubmissionRepository>,
    pub admin_repo: Arc<dyn AdminRepository>,
    pub auth_repo: Arc<dyn AuthRepository>,
    pub auth_service: Arc<AuthService>,
    pub verification_service: Arc<VerificationService>,
    pub evidence_storage: Arc<dyn EvidenceStorage>,
    pub map_service: Arc<dyn MapSnapshotService>,
}

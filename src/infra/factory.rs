use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use argon2::{password_hash::SaltString, Argon2, PasswordHasher};
use rand::rngs::OsRng;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::domain::models::admin::Admin;
use crate::domain::services::auth_service::AuthService;
use crate::domain::services::verification_service::VerificationService;
use crate::infra::maps::geoapify_maps::GeoapifyMaps;
use crate::infra::repositories::{
    postgres_admin_repo::PostgresAdminRepo, postgres_auth_repo::PostgresAuthRepo,
    postgres_invite_repo::PostgresInviteRepo, postgres_submission_repo::PostgresSubmissionRepo,
    sqlite_admin_repo::SqliteAdminRepo, sqlite_auth_repo::SqliteAuthRepo,
    sqlite_invite_repo::SqliteInviteRepo, sqlite_submission_repo::SqliteSubmissionRepo,
};
use crate::infra::storage::http_media_storage::HttpMediaStorage;
use crate::state::AppState;

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;

    let evidence_storage = Arc::new(HttpMediaStorage::new(
        config.media_api_url.clone(),
        config.media_api_key.clone(),
        config.media_timeout_secs,
    ));

    let map_service = Arc::new(GeoapifyMaps::new(config.geoapify_api_key.clone()));

    let state = if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;

        let auth_repo = Arc::new(PostgresAuthRepo::new(pool.clone()));
        let auth_service = Arc::new(AuthService::new(auth_repo.clone(), config.clone()));

        let invite_repo = Arc::new(PostgresInviteRepo::new(pool.clone()));
        let submission_repo = Arc::new(PostgresSubmissionRepo::new(pool.clone()));

        let verification_service = Arc::new(VerificationService::new(
            invite_repo.clone(),
            submission_repo.clone(),
            evidence_storage.clone(),
            map_service.clone(),
            config.clone(),
        ));

        AppState {
            config: config.clone(),
            invite_repo,
            submission_repo,
            admin_repo: Arc::new(PostgresAdminRepo::new(pool.clone())),
            auth_repo,
            auth_service,
            verification_service,
            evidence_storage,
            map_service,
        }
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;

        let auth_repo = Arc::new(SqliteAuthRepo::new(pool.clone()));
        let auth_service = Arc::new(AuthService::new(auth_repo.clone(), config.clone()));

        let invite_repo = Arc::new(SqliteInviteRepo::new(pool.clone()));
        let submission_repo = Arc::new(SqliteSubmissionRepo::new(pool.clone()));

        let verification_service = Arc::new(VerificationService::new(
            invite_repo.clone(),
            submission_repo.clone(),
            evidence_storage.clone(),
            map_service.clone(),
            config.clone(),
        ));

        AppState {
            config: config.clone(),
            invite_repo,
            submission_repo,
            admin_repo: Arc::new(SqliteAdminRepo::new(pool.clone())),
            auth_repo,
            auth_service,
            verification_service,
            evidence_storage,
            map_service,
        }
    };

    seed_admin(&state).await;

    state
}

/// Creates the bootstrap admin account on first start, mirroring the
/// configured credentials. Subsequent starts are a no-op.
async fn seed_admin(state: &AppState) {
    let existing = state.admin_repo.find_by_email(&state.config.admin_email).await
        .expect("Failed to query admins during seed");

    if existing.is_some() {
        return;
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(state.config.admin_password.as_bytes(), &salt)
        .expect("Failed to hash admin password")
        .to_string();

    let admin = Admin::new(state.config.admin_email.clone(), password_hash);
    state.admin_repo.create(&admin).await.expect("Failed to seed admin account");

    info!("Seeded bootstrap admin: {}", admin.email);
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}

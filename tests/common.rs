use verification_backend::{
    api::router::create_router,
    state::AppState,
    config::Config,
    domain::models::admin::Admin,
    domain::ports::{AdminRepository, EvidenceStorage, MapSnapshotService},
    domain::services::auth_service::AuthService,
    domain::services::verification_service::VerificationService,
    error::AppError,
    infra::repositories::{
        sqlite_admin_repo::SqliteAdminRepo,
        sqlite_auth_repo::SqliteAuthRepo,
        sqlite_invite_repo::SqliteInviteRepo,
        sqlite_submission_repo::SqliteSubmissionRepo,
    },
};
use argon2::{password_hash::SaltString, Argon2, PasswordHasher};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use base64::{engine::general_purpose, Engine as _};
use rand::rngs::OsRng;
use serde_json::{json, Value};
use sqlx::{sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions}, Pool, Sqlite};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_ADMIN_EMAIL: &str = "admin@test.local";
pub const TEST_ADMIN_PASSWORD: &str = "test-password";

pub struct MockEvidenceStorage {
    pub uploads: AtomicUsize,
    pub fail: AtomicBool,
}

impl MockEvidenceStorage {
    pub fn new() -> Self {
        Self {
            uploads: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl EvidenceStorage for MockEvidenceStorage {
    async fn store(&self, _data: &[u8], category: &str) -> Result<String, AppError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::UploadFailed("mock media outage".into()));
        }

        let n = self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(format!("https://media.test/verification/{}/{}", category, n))
    }
}

pub struct MockMapService;

impl MapSnapshotService for MockMapService {
    fn snapshot_url(&self, lat: f64, lng: f64, _accuracy_m: f64) -> Option<String> {
        Some(format!("https://maps.test/static?lat={}&lng={}", lat, lng))
    }
}

pub struct AuthHeaders {
    pub access_token: String,
    pub csrf_token: String,
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub storage: Arc<MockEvidenceStorage>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            public_base_url: "http://localhost:5173".to_string(),
            media_api_url: "http://localhost".to_string(),
            media_api_key: "test-key".to_string(),
            media_timeout_secs: 5,
            geoapify_api_key: None,
            jwt_secret: "test-jwt-secret".to_string(),
            auth_issuer: "test-issuer".to_string(),
            admin_email: TEST_ADMIN_EMAIL.to_string(),
            admin_password: TEST_ADMIN_PASSWORD.to_string(),
        };

        let storage = Arc::new(MockEvidenceStorage::new());
        let map_service = Arc::new(MockMapService);

        let auth_repo = Arc::new(SqliteAuthRepo::new(pool.clone()));
        let auth_service = Arc::new(AuthService::new(auth_repo.clone(), config.clone()));

        let invite_repo = Arc::new(SqliteInviteRepo::new(pool.clone()));
        let submission_repo = Arc::new(SqliteSubmissionRepo::new(pool.clone()));

        let verification_service = Arc::new(VerificationService::new(
            invite_repo.clone(),
            submission_repo.clone(),
            storage.clone(),
            map_service.clone(),
            config.clone(),
        ));

        let admin_repo = Arc::new(SqliteAdminRepo::new(pool.clone()));
        seed_test_admin(admin_repo.as_ref()).await;

        let state = Arc::new(AppState {
            config: config.clone(),
            invite_repo,
            submission_repo,
            admin_repo,
            auth_repo,
            auth_service,
            verification_service,
            evidence_storage: storage.clone(),
            map_service,
        });

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            storage,
        }
    }

    pub async fn login(&self) -> AuthHeaders {
        let payload = json!({
            "email": TEST_ADMIN_EMAIL,
            "password": TEST_ADMIN_PASSWORD
        });

        let response = self.router.clone().oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap()
        ).await.unwrap();

        if !response.status().is_success() {
            panic!("Login failed in test helper: status {}", response.status());
        }

        let cookies: Vec<String> = response.headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|h| h.to_str().unwrap().to_string())
            .collect();

        let access_token_cookie = cookies.iter()
            .find(|c| c.contains("access_token="))
            .expect("No access_token cookie returned");

        let start = access_token_cookie.find("access_token=").unwrap() + 13;
        let end = access_token_cookie[start..].find(';').unwrap_or(access_token_cookie.len() - start);
        let access_token = access_token_cookie[start..start+end].to_string();

        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body_json: Value = serde_json::from_slice(&body_bytes).unwrap();
        let csrf_token = body_json["csrf_token"].as_str().expect("No csrf_token in body").to_string();

        AuthHeaders {
            access_token,
            csrf_token
        }
    }
}

async fn seed_test_admin(repo: &dyn AdminRepository) {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(TEST_ADMIN_PASSWORD.as_bytes(), &salt)
        .unwrap()
        .to_string();

    let admin = Admin::new(TEST_ADMIN_EMAIL.to_string(), password_hash);
    repo.create(&admin).await.expect("Failed to seed test admin");
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}

#[allow(dead_code)]
pub async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[allow(dead_code)]
pub fn invite_payload() -> Value {
    json!({
        "client_name": "Acme Screening",
        "organization": "Acme Corp",
        "candidate_name": "Priya Sharma",
        "candidate_email": "priya@example.com",
        "candidate_mobile": "919876543210",
        "full_address": "12 Park Street, Kolkata",
        "district": "Kolkata",
        "pincode": "700016",
        "reference_id": "REF-1001"
    })
}

#[allow(dead_code)]
pub fn invite_payload_with_geofence(lat: f64, lng: f64, radius_m: f64) -> Value {
    let mut payload = invite_payload();
    payload["center_lat"] = json!(lat);
    payload["center_lng"] = json!(lng);
    payload["radius_m"] = json!(radius_m);
    payload
}

#[allow(dead_code)]
pub fn evidence_payload(lat: f64, lng: f64) -> Value {
    let img = general_purpose::STANDARD.encode(b"fake-image-bytes");

    json!({
        "lat": lat,
        "lng": lng,
        "accuracy": 12.5,
        "ownership": "owned",
        "address_type": "residential",
        "from_month": "01",
        "from_year": "2020",
        "to_month": "12",
        "to_year": "2024",
        "verified_by_relation": "self",
        "verified_person_name": "Priya Sharma",
        "resolved_address": "12 Park Street, Kolkata",
        "house_entrance": img,
        "selfie_with_house": img,
        "id_photo": img,
        "landmark_photo": img,
        "signature": format!("data:image/png;base64,{}", img)
    })
}

/// POST helper for authenticated admin routes.
#[allow(dead_code)]
pub fn admin_request(method: &str, uri: &str, auth: &AuthHeaders, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, format!("access_token={}", auth.access_token))
        .header("X-CSRF-Token", auth.csrf_token.clone())
        .header(header::CONTENT_TYPE, "application/json");

    match body {
        Some(value) => builder.body(Body::from(value.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub public_base_url: String, // origin the candidate frontend is served from
    pub media_api_url: String,
    pub media_api_key: String,
    pub media_timeout_secs: u64,
    pub geoapify_api_key: Option<String>,
    pub jwt_secret: String,
    pub auth_issuer: String,
    pub admin_email: String,
    pub admin_password: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "5000".to_string()).parse().expect("PORT must be a number"),
            public_base_url: env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| "http://localhost:5173".to_string()),
            media_api_url: env::var("MEDIA_API_URL").expect("MEDIA_API_URL must be set"),
            media_api_key: env::var("MEDIA_API_KEY").expect("MEDIA_API_KEY must be set"),
            media_timeout_secs: env::var("MEDIA_TIMEOUT_SECS").unwrap_or_else(|_| "30".to_string()).parse().expect("MEDIA_TIMEOUT_SECS must be a number"),
            geoapify_api_key: env::var("GEOAPIFY_API_KEY").ok(),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            auth_issuer: env::var("AUTH_ISSUER").unwrap_or_else(|_| "https://api.verification.local".to_string()),
            admin_email: env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@verification.local".to_string()),
            admin_password: env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "changeme".to_string()),
        }
    }

    /// Candidate capture link. The `/verify/{token}` scheme is the only
    /// externally visible addressing contract of this service.
    pub fn verify_link(&self, token: &str) -> String {
        format!("{}/verify/{}", self.public_base_url.trim_end_matches('/'), token)
    }
}

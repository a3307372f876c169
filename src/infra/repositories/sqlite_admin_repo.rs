use crate::domain::{models::admin::Admin, ports::AdminRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteAdminRepo {
    pool: SqlitePool,
}

impl SqliteAdminRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdminRepository for SqliteAdminRepo {
    async fn create(&self, admin: &Admin) -> Result<Admin, AppError> {
        sqlx::query_as::<_, Admin>(
            "INSERT INTO admins (id, email, password_hash, role, created_at) VALUES (?, ?, ?, ?, ?) RETURNING *",
        )
            .bind(&admin.id)
            .bind(&admin.email)
            .bind(&admin.password_hash)
            .bind(&admin.role)
            .bind(admin.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Admin>, AppError> {
        sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Admin>, AppError> {
        sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}

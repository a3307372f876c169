use crate::domain::{models::invite::Invite, ports::{InviteFilter, InviteRepository}};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

pub struct SqliteInviteRepo {
    pool: SqlitePool,
}

impl SqliteInviteRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InviteRepository for SqliteInviteRepo {
    async fn create(&self, invite: &Invite) -> Result<Invite, AppError> {
        sqlx::query_as::<_, Invite>(
            "INSERT INTO invites (id, client_name, organization, candidate_name, candidate_email, candidate_mobile,
                                  full_address, district, pincode, reference_id, token, token_disabled, status,
                                  center_lat, center_lng, radius_m, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
            .bind(&invite.id)
            .bind(&invite.client_name)
            .bind(&invite.organization)
            .bind(&invite.candidate_name)
            .bind(&invite.candidate_email)
            .bind(&invite.candidate_mobile)
            .bind(&invite.full_address)
            .bind(&invite.district)
            .bind(&invite.pincode)
            .bind(&invite.reference_id)
            .bind(&invite.token)
            .bind(invite.token_disabled)
            .bind(&invite.status)
            .bind(invite.center_lat)
            .bind(invite.center_lng)
            .bind(invite.radius_m)
            .bind(invite.created_at)
            .bind(invite.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Invite>, AppError> {
        sqlx::query_as::<_, Invite>("SELECT * FROM invites WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Invite>, AppError> {
        sqlx::query_as::<_, Invite>("SELECT * FROM invites WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Invite>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("SELECT * FROM invites WHERE id IN ({})", placeholders);

        let mut query = sqlx::query_as::<_, Invite>(&sql);
        for id in ids {
            query = query.bind(id);
        }

        query.fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_filtered(&self, filter: &InviteFilter) -> Result<(Vec<Invite>, i64), AppError> {
        let mut conditions = String::new();

        if filter.from.is_some() {
            conditions.push_str(" AND created_at >= ?");
        }
        if filter.to.is_some() {
            conditions.push_str(" AND created_at <= ?");
        }
        if filter.client.is_some() {
            conditions.push_str(" AND client_name LIKE ?");
        }
        if filter.search.is_some() {
            conditions.push_str(" AND (candidate_name LIKE ? OR candidate_mobile LIKE ?)");
        }

        let count_sql = format!("SELECT COUNT(*) FROM invites WHERE 1=1{}", conditions);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(from) = filter.from {
            count_query = count_query.bind(from);
        }
        if let Some(to) = filter.to {
            count_query = count_query.bind(to);
        }
        if let Some(client) = &filter.client {
            count_query = count_query.bind(format!("%{}%", client));
        }
        if let Some(search) = &filter.search {
            let pattern = format!("%{}%", search);
            count_query = count_query.bind(pattern.clone()).bind(pattern);
        }
        let total = count_query.fetch_one(&self.pool).await.map_err(AppError::Database)?;

        let list_sql = format!(
            "SELECT * FROM invites WHERE 1=1{} ORDER BY created_at DESC LIMIT ? OFFSET ?",
            conditions
        );
        let mut list_query = sqlx::query_as::<_, Invite>(&list_sql);
        if let Some(from) = filter.from {
            list_query = list_query.bind(from);
        }
        if let Some(to) = filter.to {
            list_query = list_query.bind(to);
        }
        if let Some(client) = &filter.client {
            list_query = list_query.bind(format!("%{}%", client));
        }
        if let Some(search) = &filter.search {
            let pattern = format!("%{}%", search);
            list_query = list_query.bind(pattern.clone()).bind(pattern);
        }
        let offset = (filter.page.max(1) - 1) * filter.limit;
        let invites = list_query
            .bind(filter.limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok((invites, total))
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<Invite>, AppError> {
        sqlx::query_as::<_, Invite>("SELECT * FROM invites ORDER BY created_at DESC LIMIT ?")
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, invite: &Invite) -> Result<Invite, AppError> {
        sqlx::query_as::<_, Invite>(
            "UPDATE invites SET client_name=?, organization=?, candidate_name=?, candidate_email=?,
                                candidate_mobile=?, full_address=?, district=?, pincode=?, reference_id=?,
                                center_lat=?, center_lng=?, radius_m=?, updated_at=?
             WHERE id=?
             RETURNING *",
        )
            .bind(&invite.client_name)
            .bind(&invite.organization)
            .bind(&invite.candidate_name)
            .bind(&invite.candidate_email)
            .bind(&invite.candidate_mobile)
            .bind(&invite.full_address)
            .bind(&invite.district)
            .bind(&invite.pincode)
            .bind(&invite.reference_id)
            .bind(invite.center_lat)
            .bind(invite.center_lng)
            .bind(invite.radius_m)
            .bind(Utc::now())
            .bind(&invite.id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM invites WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Invite not found".into()));
        }
        Ok(())
    }

    async fn count_between(&self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Result<i64, AppError> {
        count_invites(&self.pool, from, to, false).await
    }

    async fn count_pending_between(&self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Result<i64, AppError> {
        count_invites(&self.pool, from, to, true).await
    }
}

async fn count_invites(
    pool: &SqlitePool,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
    pending_only: bool,
) -> Result<i64, AppError> {
    let mut sql = String::from("SELECT COUNT(*) FROM invites WHERE 1=1");
    if pending_only {
        sql.push_str(" AND token_disabled = 0");
    }
    if from.is_some() {
        sql.push_str(" AND created_at >= ?");
    }
    if to.is_some() {
        sql.push_str(" AND created_at <= ?");
    }

    let mut query = sqlx::query_scalar::<_, i64>(&sql);
    if let Some(from) = from {
        query = query.bind(from);
    }
    if let Some(to) = to {
        query = query.bind(to);
    }

    query.fetch_one(pool).await.map_err(AppError::Database)
}

use crate::domain::{models::invite::Invite, ports::{InviteFilter, InviteRepository}};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub struct PostgresInviteRepo {
    pool: PgPool,
}

impl PostgresInviteRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn filter_conditions(filter: &InviteFilter, start_idx: usize) -> (String, usize) {
    let mut conditions = String::new();
    let mut idx = start_idx;

    if filter.from.is_some() {
        conditions.push_str(&format!(" AND created_at >= ${}", idx));
        idx += 1;
    }
    if filter.to.is_some() {
        conditions.push_str(&format!(" AND created_at <= ${}", idx));
        idx += 1;
    }
    if filter.client.is_some() {
        conditions.push_str(&format!(" AND client_name ILIKE ${}", idx));
        idx += 1;
    }
    if filter.search.is_some() {
        conditions.push_str(&format!(
            " AND (candidate_name ILIKE ${} OR candidate_mobile ILIKE ${})",
            idx,
            idx + 1
        ));
        idx += 2;
    }

    (conditions, idx)
}

#[async_trait]
impl InviteRepository for PostgresInviteRepo {
    async fn create(&self, invite: &Invite) -> Result<Invite, AppError> {
        sqlx::query_as::<_, Invite>(
            "INSERT INTO invites (id, client_name, organization, candidate_name, candidate_email, candidate_mobile,
                                  full_address, district, pincode, reference_id, token, token_disabled, status,
                                  center_lat, center_lng, radius_m, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
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
        sqlx::query_as::<_, Invite>("SELECT * FROM invites WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Invite>, AppError> {
        sqlx::query_as::<_, Invite>("SELECT * FROM invites WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Invite>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, Invite>("SELECT * FROM invites WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_filtered(&self, filter: &InviteFilter) -> Result<(Vec<Invite>, i64), AppError> {
        let (conditions, next_idx) = filter_conditions(filter, 1);

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
            "SELECT * FROM invites WHERE 1=1{} ORDER BY created_at DESC LIMIT ${} OFFSET ${}",
            conditions,
            next_idx,
            next_idx + 1
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
        sqlx::query_as::<_, Invite>("SELECT * FROM invites ORDER BY created_at DESC LIMIT $1")
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, invite: &Invite) -> Result<Invite, AppError> {
        sqlx::query_as::<_, Invite>(
            "UPDATE invites SET client_name=$1, organization=$2, candidate_name=$3, candidate_email=$4,
                                candidate_mobile=$5, full_address=$6, district=$7, pincode=$8, reference_id=$9,
                                center_lat=$10, center_lng=$11, radius_m=$12, updated_at=$13
             WHERE id=$14
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
        let result = sqlx::query("DELETE FROM invites WHERE id = $1")
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
    pool: &PgPool,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
    pending_only: bool,
) -> Result<i64, AppError> {
    let mut sql = String::from("SELECT COUNT(*) FROM invites WHERE 1=1");
    let mut idx = 1;
    if pending_only {
        sql.push_str(" AND token_disabled = FALSE");
    }
    if from.is_some() {
        sql.push_str(&format!(" AND created_at >= ${}", idx));
        idx += 1;
    }
    if to.is_some() {
        sql.push_str(&format!(" AND created_at <= ${}", idx));
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

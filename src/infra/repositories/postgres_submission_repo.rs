use crate::domain::{
    models::submission::{ContextFields, Submission},
    ports::{SubmissionFilter, SubmissionRepository},
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

const UPSERT_SQL: &str =
    "INSERT INTO submissions (id, invite_id, ownership, address_type, from_month, from_year, to_month, to_year,
                              verified_by_relation, verified_person_name, resolved_address, lat, lng, accuracy,
                              map_image_url, house_entrance_url, selfie_with_house_url, id_photo_url,
                              landmark_photo_url, signature_url, status, reject_reason, accepted_at, rejected_at,
                              regenerated_link, created_at, updated_at)
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21,
             $22, $23, $24, $25, $26, $27)
     ON CONFLICT (invite_id) DO UPDATE SET
        ownership = excluded.ownership,
        address_type = excluded.address_type,
        from_month = excluded.from_month,
        from_year = excluded.from_year,
        to_month = excluded.to_month,
        to_year = excluded.to_year,
        verified_by_relation = excluded.verified_by_relation,
        verified_person_name = excluded.verified_person_name,
        resolved_address = excluded.resolved_address,
        lat = excluded.lat,
        lng = excluded.lng,
        accuracy = excluded.accuracy,
        map_image_url = excluded.map_image_url,
        house_entrance_url = excluded.house_entrance_url,
        selfie_with_house_url = excluded.selfie_with_house_url,
        id_photo_url = excluded.id_photo_url,
        landmark_photo_url = excluded.landmark_photo_url,
        signature_url = excluded.signature_url,
        status = excluded.status,
        reject_reason = NULL,
        accepted_at = NULL,
        rejected_at = NULL,
        regenerated_link = NULL,
        updated_at = excluded.updated_at
     RETURNING *";

pub struct PostgresSubmissionRepo {
    pool: PgPool,
}

impl PostgresSubmissionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn filter_conditions(filter: &SubmissionFilter, start_idx: usize) -> (String, usize) {
    let mut conditions = String::new();
    let mut idx = start_idx;

    if filter.status.is_some() {
        conditions.push_str(&format!(" AND s.status = ${}", idx));
        idx += 1;
    }
    if filter.from.is_some() {
        conditions.push_str(&format!(" AND s.created_at >= ${}", idx));
        idx += 1;
    }
    if filter.to.is_some() {
        conditions.push_str(&format!(" AND s.created_at <= ${}", idx));
        idx += 1;
    }
    if filter.client.is_some() {
        conditions.push_str(&format!(" AND i.client_name ILIKE ${}", idx));
        idx += 1;
    }
    if filter.search.is_some() {
        conditions.push_str(&format!(
            " AND (i.candidate_name ILIKE ${} OR i.candidate_mobile ILIKE ${})",
            idx,
            idx + 1
        ));
        idx += 2;
    }

    (conditions, idx)
}

#[async_trait]
impl SubmissionRepository for PostgresSubmissionRepo {
    async fn upsert_for_invite(&self, submission: &Submission, token: &str) -> Result<Submission, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let result = sqlx::query(
            "UPDATE invites SET token_disabled = TRUE, status = 'submitted', updated_at = $1
             WHERE token = $2 AND token_disabled = FALSE",
        )
            .bind(Utc::now())
            .bind(token)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict("Capture link is no longer active".into()));
        }

        let saved = sqlx::query_as::<_, Submission>(UPSERT_SQL)
            .bind(&submission.id)
            .bind(&submission.invite_id)
            .bind(&submission.ownership)
            .bind(&submission.address_type)
            .bind(&submission.from_month)
            .bind(&submission.from_year)
            .bind(&submission.to_month)
            .bind(&submission.to_year)
            .bind(&submission.verified_by_relation)
            .bind(&submission.verified_person_name)
            .bind(&submission.resolved_address)
            .bind(submission.lat)
            .bind(submission.lng)
            .bind(submission.accuracy)
            .bind(&submission.map_image_url)
            .bind(&submission.house_entrance_url)
            .bind(&submission.selfie_with_house_url)
            .bind(&submission.id_photo_url)
            .bind(&submission.landmark_photo_url)
            .bind(&submission.signature_url)
            .bind(&submission.status)
            .bind(&submission.reject_reason)
            .bind(submission.accepted_at)
            .bind(submission.rejected_at)
            .bind(&submission.regenerated_link)
            .bind(submission.created_at)
            .bind(submission.updated_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(saved)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Submission>, AppError> {
        sqlx::query_as::<_, Submission>("SELECT * FROM submissions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_invite(&self, invite_id: &str) -> Result<Option<Submission>, AppError> {
        sqlx::query_as::<_, Submission>("SELECT * FROM submissions WHERE invite_id = $1")
            .bind(invite_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_filtered(&self, filter: &SubmissionFilter) -> Result<(Vec<Submission>, i64), AppError> {
        let (conditions, next_idx) = filter_conditions(filter, 1);

        let count_sql = format!(
            "SELECT COUNT(*) FROM submissions s LEFT JOIN invites i ON i.id = s.invite_id WHERE 1=1{}",
            conditions
        );
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(status) = &filter.status {
            count_query = count_query.bind(status);
        }
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
            "SELECT s.* FROM submissions s LEFT JOIN invites i ON i.id = s.invite_id WHERE 1=1{}
             ORDER BY s.created_at DESC LIMIT ${} OFFSET ${}",
            conditions,
            next_idx,
            next_idx + 1
        );
        let mut list_query = sqlx::query_as::<_, Submission>(&list_sql);
        if let Some(status) = &filter.status {
            list_query = list_query.bind(status);
        }
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
        let submissions = list_query
            .bind(filter.limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok((submissions, total))
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<Submission>, AppError> {
        sqlx::query_as::<_, Submission>("SELECT * FROM submissions ORDER BY created_at DESC LIMIT $1")
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn accept(&self, id: &str, at: DateTime<Utc>) -> Result<Option<Submission>, AppError> {
        sqlx::query_as::<_, Submission>(
            "UPDATE submissions SET status = 'accepted', accepted_at = $1, updated_at = $2
             WHERE id = $3 AND status = 'submitted'
             RETURNING *",
        )
            .bind(at)
            .bind(at)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn reject(&self, id: &str, invite_id: &str, reason: &str, regenerated_link: &str, at: DateTime<Utc>) -> Result<Option<Submission>, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let rejected = sqlx::query_as::<_, Submission>(
            "UPDATE submissions SET status = 'rejected', reject_reason = $1, rejected_at = $2,
                                    regenerated_link = $3, accepted_at = NULL, updated_at = $4
             WHERE id = $5 AND status = 'submitted'
             RETURNING *",
        )
            .bind(reason)
            .bind(at)
            .bind(regenerated_link)
            .bind(at)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let Some(rejected) = rejected else {
            return Ok(None);
        };

        sqlx::query(
            "UPDATE invites SET token_disabled = FALSE, status = 'pending', updated_at = $1 WHERE id = $2",
        )
            .bind(at)
            .bind(invite_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(Some(rejected))
    }

    async fn update_fields(&self, id: &str, fields: &ContextFields) -> Result<Submission, AppError> {
        sqlx::query_as::<_, Submission>(
            "UPDATE submissions SET ownership=$1, address_type=$2, from_month=$3, from_year=$4, to_month=$5,
                                    to_year=$6, verified_by_relation=$7, verified_person_name=$8,
                                    resolved_address=$9, updated_at=$10
             WHERE id=$11
             RETURNING *",
        )
            .bind(&fields.ownership)
            .bind(&fields.address_type)
            .bind(&fields.from_month)
            .bind(&fields.from_year)
            .bind(&fields.to_month)
            .bind(&fields.to_year)
            .bind(&fields.verified_by_relation)
            .bind(&fields.verified_person_name)
            .bind(&fields.resolved_address)
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Submission not found".into()))
    }

    async fn delete_with_invite(&self, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let invite_id = sqlx::query_scalar::<_, String>("SELECT invite_id FROM submissions WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let Some(invite_id) = invite_id else {
            return Err(AppError::NotFound("Submission not found".into()));
        };

        sqlx::query("DELETE FROM invites WHERE id = $1")
            .bind(&invite_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        sqlx::query("DELETE FROM submissions WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn bulk_delete_with_invites(&self, ids: &[String]) -> Result<(u64, u64), AppError> {
        if ids.is_empty() {
            return Ok((0, 0));
        }

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let invite_ids = sqlx::query_scalar::<_, String>(
            "SELECT invite_id FROM submissions WHERE id = ANY($1)",
        )
            .bind(ids)
            .fetch_all(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let submissions_deleted = sqlx::query("DELETE FROM submissions WHERE id = ANY($1)")
            .bind(ids)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?
            .rows_affected();

        let mut invites_deleted = 0;
        if !invite_ids.is_empty() {
            invites_deleted = sqlx::query("DELETE FROM invites WHERE id = ANY($1)")
                .bind(&invite_ids)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?
                .rows_affected();
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok((submissions_deleted, invites_deleted))
    }

    async fn count_by_status(&self, status: &str) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM submissions WHERE status = $1")
            .bind(status)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn count_between(&self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Result<i64, AppError> {
        let mut sql = String::from("SELECT COUNT(*) FROM submissions WHERE 1=1");
        let mut idx = 1;
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

        query.fetch_one(&self.pool).await.map_err(AppError::Database)
    }
}

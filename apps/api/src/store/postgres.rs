use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{Repository, StoreError};
use crate::models::brand_voice::BrandVoice;
use crate::models::content::ContentItem;
use crate::models::job::{GenerationJob, JobStatus};
use crate::models::profile::BusinessProfile;

/// Postgres-backed repository. Profiles and voices are stored as JSONB documents
/// keyed by user id; content items and jobs get their own columns.
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct JobRow {
    id: Uuid,
    user_id: String,
    status: String,
    result: Option<Json<BrandVoice>>,
    error: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for GenerationJob {
    type Error = StoreError;

    fn try_from(row: JobRow) -> Result<Self, StoreError> {
        let status = JobStatus::parse(&row.status)
            .ok_or_else(|| StoreError::Invalid(format!("unknown job status '{}'", row.status)))?;

        Ok(GenerationJob {
            id: row.id,
            user_id: row.user_id,
            status,
            result: row.result.map(|Json(voice)| voice),
            error: row.error,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn get_profile(&self, user_id: &str) -> Result<Option<BusinessProfile>, StoreError> {
        let row: Option<Json<BusinessProfile>> =
            sqlx::query_scalar("SELECT data FROM business_profiles WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|Json(profile)| profile))
    }

    async fn put_profile(&self, user_id: &str, profile: &BusinessProfile) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO business_profiles (user_id, data, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (user_id) DO UPDATE SET data = EXCLUDED.data, updated_at = now()
            "#,
        )
        .bind(user_id)
        .bind(Json(profile))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn clear_profile(&self, user_id: &str) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;
        let profiles = sqlx::query("DELETE FROM business_profiles WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let voices = sqlx::query("DELETE FROM brand_voices WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;
        Ok(profiles + voices > 0)
    }

    async fn get_brand_voice(&self, user_id: &str) -> Result<Option<BrandVoice>, StoreError> {
        let row: Option<Json<BrandVoice>> =
            sqlx::query_scalar("SELECT data FROM brand_voices WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|Json(voice)| voice))
    }

    async fn put_brand_voice(&self, user_id: &str, voice: &BrandVoice) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO brand_voices (user_id, data, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (user_id) DO UPDATE SET data = EXCLUDED.data, updated_at = now()
            "#,
        )
        .bind(user_id)
        .bind(Json(voice))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_content(&self, item: &ContentItem) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO content_items
                (id, user_id, topic, content_type, length, body, keywords,
                 custom_context, reference_url, outline, word_count, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(item.id)
        .bind(&item.user_id)
        .bind(&item.topic)
        .bind(&item.content_type)
        .bind(&item.length)
        .bind(&item.body)
        .bind(&item.keywords)
        .bind(&item.custom_context)
        .bind(&item.reference_url)
        .bind(&item.outline)
        .bind(item.word_count)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_content(&self, user_id: &str, id: Uuid) -> Result<Option<ContentItem>, StoreError> {
        let item = sqlx::query_as::<_, ContentItem>(
            "SELECT * FROM content_items WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(item)
    }

    async fn update_content(&self, item: &ContentItem) -> Result<bool, StoreError> {
        let updated = sqlx::query(
            r#"
            UPDATE content_items
            SET topic = $3, content_type = $4, length = $5, body = $6, keywords = $7,
                custom_context = $8, reference_url = $9, outline = $10, word_count = $11,
                updated_at = $12
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(item.id)
        .bind(&item.user_id)
        .bind(&item.topic)
        .bind(&item.content_type)
        .bind(&item.length)
        .bind(&item.body)
        .bind(&item.keywords)
        .bind(&item.custom_context)
        .bind(&item.reference_url)
        .bind(&item.outline)
        .bind(item.word_count)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(updated > 0)
    }

    async fn list_content(&self, user_id: &str, limit: i64) -> Result<Vec<ContentItem>, StoreError> {
        let items = sqlx::query_as::<_, ContentItem>(
            "SELECT * FROM content_items WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn count_content(&self, user_id: &str) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM content_items WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn insert_job(&self, job: &GenerationJob) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO generation_jobs (id, user_id, status, result, error, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(job.id)
        .bind(&job.user_id)
        .bind(job.status.as_str())
        .bind(job.result.as_ref().map(Json))
        .bind(&job.error)
        .bind(job.created_at)
        .bind(job.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_job(&self, id: Uuid) -> Result<Option<GenerationJob>, StoreError> {
        let row = sqlx::query_as::<_, JobRow>("SELECT * FROM generation_jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(GenerationJob::try_from).transpose()
    }

    async fn update_job(&self, job: &GenerationJob) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE generation_jobs
            SET status = $2, result = $3, error = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(job.id)
        .bind(job.status.as_str())
        .bind(job.result.as_ref().map(Json))
        .bind(&job.error)
        .bind(job.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn fail_unfinished_jobs(&self, reason: &str) -> Result<u64, StoreError> {
        let failed = sqlx::query(
            r#"
            UPDATE generation_jobs
            SET status = 'failed', result = NULL, error = $1, updated_at = now()
            WHERE status IN ('pending', 'running')
            "#,
        )
        .bind(reason)
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(failed)
    }
}

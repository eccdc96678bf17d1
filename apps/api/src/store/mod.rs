//! Persistence Adapter — per-user storage for profiles, brand voices, content
//! items and generation jobs.
//!
//! `AppState` holds an `Arc<dyn Repository>`: `PgRepository` when `DATABASE_URL`
//! is configured, `MemoryRepository` otherwise (and in tests).

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::brand_voice::BrandVoice;
use crate::models::content::ContentItem;
use crate::models::job::GenerationJob;
use crate::models::profile::BusinessProfile;

pub mod memory;
pub mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

/// Default number of items returned by content history listings.
pub const DEFAULT_HISTORY_LIMIT: i64 = 10;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid stored value: {0}")]
    Invalid(String),
}

#[async_trait]
pub trait Repository: Send + Sync {
    async fn get_profile(&self, user_id: &str) -> Result<Option<BusinessProfile>, StoreError>;

    async fn put_profile(&self, user_id: &str, profile: &BusinessProfile) -> Result<(), StoreError>;

    /// Removes the user's profile and brand voice. Returns whether anything was removed.
    async fn clear_profile(&self, user_id: &str) -> Result<bool, StoreError>;

    async fn get_brand_voice(&self, user_id: &str) -> Result<Option<BrandVoice>, StoreError>;

    async fn put_brand_voice(&self, user_id: &str, voice: &BrandVoice) -> Result<(), StoreError>;

    async fn insert_content(&self, item: &ContentItem) -> Result<(), StoreError>;

    async fn get_content(&self, user_id: &str, id: Uuid) -> Result<Option<ContentItem>, StoreError>;

    /// Returns false when no item with that id belongs to the item's user.
    async fn update_content(&self, item: &ContentItem) -> Result<bool, StoreError>;

    /// Newest first.
    async fn list_content(&self, user_id: &str, limit: i64) -> Result<Vec<ContentItem>, StoreError>;

    async fn count_content(&self, user_id: &str) -> Result<i64, StoreError>;

    async fn insert_job(&self, job: &GenerationJob) -> Result<(), StoreError>;

    async fn get_job(&self, id: Uuid) -> Result<Option<GenerationJob>, StoreError>;

    async fn update_job(&self, job: &GenerationJob) -> Result<(), StoreError>;

    /// Marks every pending or running job as failed with `reason`. Returns the count.
    async fn fail_unfinished_jobs(&self, reason: &str) -> Result<u64, StoreError>;
}

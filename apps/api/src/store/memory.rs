use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Repository, StoreError};
use crate::models::brand_voice::BrandVoice;
use crate::models::content::ContentItem;
use crate::models::job::GenerationJob;
use crate::models::profile::BusinessProfile;

#[derive(Default)]
struct Tables {
    profiles: HashMap<String, BusinessProfile>,
    voices: HashMap<String, BrandVoice>,
    content: HashMap<Uuid, ContentItem>,
    jobs: HashMap<Uuid, GenerationJob>,
}

/// Process-local repository. Data lives as long as the process.
#[derive(Default)]
pub struct MemoryRepository {
    tables: RwLock<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn get_profile(&self, user_id: &str) -> Result<Option<BusinessProfile>, StoreError> {
        Ok(self.tables.read().await.profiles.get(user_id).cloned())
    }

    async fn put_profile(&self, user_id: &str, profile: &BusinessProfile) -> Result<(), StoreError> {
        self.tables
            .write()
            .await
            .profiles
            .insert(user_id.to_string(), profile.clone());
        Ok(())
    }

    async fn clear_profile(&self, user_id: &str) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let had_profile = tables.profiles.remove(user_id).is_some();
        let had_voice = tables.voices.remove(user_id).is_some();
        Ok(had_profile || had_voice)
    }

    async fn get_brand_voice(&self, user_id: &str) -> Result<Option<BrandVoice>, StoreError> {
        Ok(self.tables.read().await.voices.get(user_id).cloned())
    }

    async fn put_brand_voice(&self, user_id: &str, voice: &BrandVoice) -> Result<(), StoreError> {
        self.tables
            .write()
            .await
            .voices
            .insert(user_id.to_string(), voice.clone());
        Ok(())
    }

    async fn insert_content(&self, item: &ContentItem) -> Result<(), StoreError> {
        self.tables.write().await.content.insert(item.id, item.clone());
        Ok(())
    }

    async fn get_content(&self, user_id: &str, id: Uuid) -> Result<Option<ContentItem>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .content
            .get(&id)
            .filter(|item| item.user_id == user_id)
            .cloned())
    }

    async fn update_content(&self, item: &ContentItem) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        match tables.content.get_mut(&item.id) {
            Some(existing) if existing.user_id == item.user_id => {
                *existing = item.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_content(&self, user_id: &str, limit: i64) -> Result<Vec<ContentItem>, StoreError> {
        let tables = self.tables.read().await;
        let mut items: Vec<ContentItem> = tables
            .content
            .values()
            .filter(|item| item.user_id == user_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items.truncate(usize::try_from(limit.max(0)).unwrap_or(usize::MAX));
        Ok(items)
    }

    async fn count_content(&self, user_id: &str) -> Result<i64, StoreError> {
        let tables = self.tables.read().await;
        let count = tables
            .content
            .values()
            .filter(|item| item.user_id == user_id)
            .count();
        i64::try_from(count).map_err(|e| StoreError::Invalid(e.to_string()))
    }

    async fn insert_job(&self, job: &GenerationJob) -> Result<(), StoreError> {
        self.tables.write().await.jobs.insert(job.id, job.clone());
        Ok(())
    }

    async fn get_job(&self, id: Uuid) -> Result<Option<GenerationJob>, StoreError> {
        Ok(self.tables.read().await.jobs.get(&id).cloned())
    }

    async fn update_job(&self, job: &GenerationJob) -> Result<(), StoreError> {
        self.tables.write().await.jobs.insert(job.id, job.clone());
        Ok(())
    }

    async fn fail_unfinished_jobs(&self, reason: &str) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;
        let mut failed = 0;
        for job in tables.jobs.values_mut() {
            if !job.status.is_terminal() {
                job.fail(reason);
                failed += 1;
            }
        }
        Ok(failed)
    }
}

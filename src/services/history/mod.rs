use crate::models::SavedRecommendation;
use anyhow::Result;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Per-user store of past recommendations.
#[async_trait::async_trait]
pub trait RecommendationStore: Send + Sync {
    async fn save(&self, record: SavedRecommendation) -> Result<()>;

    /// All records for `user_id`, newest first.
    async fn list(&self, user_id: Uuid) -> Result<Vec<SavedRecommendation>>;

    async fn latest(&self, user_id: Uuid) -> Result<Option<SavedRecommendation>> {
        Ok(self.list(user_id).await?.into_iter().next())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryRecommendationStore {
    records: Arc<DashMap<Uuid, Vec<SavedRecommendation>>>,
}

impl InMemoryRecommendationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_count(&self) -> usize {
        self.records.len()
    }
}

#[async_trait::async_trait]
impl RecommendationStore for InMemoryRecommendationStore {
    async fn save(&self, record: SavedRecommendation) -> Result<()> {
        info!("Saving recommendation {} for user {}", record.id, record.user_id);
        self.records.entry(record.user_id).or_default().push(record);
        Ok(())
    }

    async fn list(&self, user_id: Uuid) -> Result<Vec<SavedRecommendation>> {
        let mut records = self
            .records
            .get(&user_id)
            .map(|r| r.value().clone())
            .unwrap_or_default();
        records.reverse();
        Ok(records)
    }
}

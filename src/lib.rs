pub mod algorithms;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use error::{RecommendError, RecommendResult};
pub use models::*;

use anyhow::Result;
use services::clothing::ClothingRecommender;
use services::history::{InMemoryRecommendationStore, RecommendationStore};
use services::season::SeasonColorAggregator;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub clothing: Arc<ClothingRecommender>,
    pub seasons: Arc<SeasonColorAggregator>,
    pub history: Arc<dyn RecommendationStore>,
}

impl AppState {
    /// Loads both reference datasets (falling back to the synthetic ones) and
    /// trains the clothing classifiers.
    pub fn new(config: Config) -> Result<Self> {
        let config = Arc::new(config);

        let clothing = Arc::new(ClothingRecommender::from_path(
            &config.data.clothing_path,
            &config.training,
        )?);

        let seasons = Arc::new(SeasonColorAggregator::from_path(
            &config.data.season_path,
            config.recommendation.palette_size,
        )?);

        Ok(Self {
            config,
            clothing,
            seasons,
            history: Arc::new(InMemoryRecommendationStore::new()),
        })
    }
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

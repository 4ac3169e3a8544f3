use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub training: TrainingConfig,
    pub recommendation: RecommendationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

/// Locations of the reference datasets loaded at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub clothing_path: String,
    pub season_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub test_size: f64,
    pub random_state: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationConfig {
    /// Length of the ranked colour and combination lists.
    pub palette_size: usize,
    /// How many colours / combinations are merged into a clothing result.
    pub merged_colors: usize,
    pub merged_combinations: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                workers: num_cpus::get(),
            },
            data: DataConfig {
                clothing_path: "data/clothing_data.csv".to_string(),
                season_path: "data/seasonalcolour.csv".to_string(),
            },
            training: TrainingConfig::default(),
            recommendation: RecommendationConfig {
                palette_size: 5,
                merged_colors: 3,
                merged_combinations: 2,
            },
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            test_size: 0.2,
            random_state: 42,
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Config::default())?)
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("FITREC").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Loads `path` when it exists, otherwise the defaults.
    pub fn load_or_default(path: &str) -> anyhow::Result<Self> {
        if std::path::Path::new(path).exists() {
            Self::from_file(path)
        } else {
            tracing::info!("Config file {} not found, using default configuration", path);
            Ok(Self::default())
        }
    }
}

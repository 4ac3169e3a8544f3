use thiserror::Error;

/// Errors produced by the recommendation core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecommendError {
    #[error("'{0}' is not a valid body shape.")]
    InvalidBodyShape(String),

    #[error("Invalid season '{season}'. Valid options are: {}", valid.join(", "))]
    UnknownSeason { season: String, valid: Vec<String> },

    #[error("No data found for season '{0}'")]
    NoDataForSeason(String),

    #[error("Unknown category '{value}' for column '{column}'")]
    UnknownCategory { column: String, value: String },

    #[error("Failed to load dataset {path}: {reason}")]
    DatasetLoad { path: String, reason: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Training error: {0}")]
    Training(String),
}

impl RecommendError {
    /// Whether the caller can fix the request and try again.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RecommendError::InvalidBodyShape(_)
                | RecommendError::UnknownSeason { .. }
                | RecommendError::NoDataForSeason(_)
                | RecommendError::InvalidInput(_)
        )
    }
}

pub type RecommendResult<T> = Result<T, RecommendError>;

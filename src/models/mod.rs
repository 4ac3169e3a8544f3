use crate::error::RecommendError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// One row of the clothing reference dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceItem {
    #[serde(rename = "Body Shape")]
    pub body_shape: String,
    #[serde(rename = "Clothing Category")]
    pub clothing_category: String,
    #[serde(rename = "Clothing Type")]
    pub clothing_type: String,
    #[serde(rename = "Occasion", default)]
    pub occasion: Option<String>,
}

/// One row of the seasonal colour reference dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceColorItem {
    #[serde(rename = "Seasonal Colour")]
    pub season: String,
    #[serde(rename = "Complimentary Colours")]
    pub complementary_color: String,
    #[serde(rename = "Recommended Colour Combinations")]
    pub color_combination: String,
}

/// How a single clothing category was filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CategoryOutcome {
    Predicted { clothing_type: String },
    Fallback { clothing_type: String, reason: String },
    Skipped { reason: String },
}

impl CategoryOutcome {
    pub fn clothing_type(&self) -> Option<&str> {
        match self {
            CategoryOutcome::Predicted { clothing_type }
            | CategoryOutcome::Fallback { clothing_type, .. } => Some(clothing_type),
            CategoryOutcome::Skipped { .. } => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, CategoryOutcome::Fallback { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub success: bool,
    pub recommendations: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Typed cause when `error` came from the recommendation core.
    #[serde(skip)]
    pub error_kind: Option<RecommendError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occasion: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub outcomes: BTreeMap<String, CategoryOutcome>,
}

impl RecommendationResult {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn from_error(err: RecommendError) -> Self {
        Self {
            error_kind: Some(err.clone()),
            ..Self::failure(err.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonRecommendation {
    pub season: String,
    pub complementary_colors: Vec<String>,
    pub color_combinations: Vec<String>,
}

/// Placeholder palette analysis returned when no image is available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteAnalysis {
    pub success: bool,
    pub season: String,
    pub complementary_colors: Vec<String>,
    pub color_combinations: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyMeasurements {
    pub shoulder: f64,
    pub bust: f64,
    pub waist: f64,
    pub hips: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonDescriptors {
    pub eye_color: String,
    pub hair_color: String,
    pub skin_tone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub body_shape: Option<String>,
    pub occasion: Option<String>,
    pub season: Option<String>,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedRecommendation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub body_shape: String,
    pub occasion: Option<String>,
    pub recommendations: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
}

impl SavedRecommendation {
    pub fn new(
        user_id: Uuid,
        body_shape: String,
        occasion: Option<String>,
        recommendations: BTreeMap<String, String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            body_shape,
            occasion,
            recommendations,
            created_at: Utc::now(),
        }
    }
}

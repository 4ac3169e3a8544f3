//! Rule-based attribute detectors used when no vision model is wired in.

use crate::error::RecommendResult;
use crate::models::{BodyMeasurements, SeasonDescriptors};
use crate::utils::validation::{validate_descriptors, validate_measurements};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyShape {
    Hourglass,
    Pear,
    Apple,
    #[serde(rename = "Inverted Triangle")]
    InvertedTriangle,
    Rectangle,
}

impl BodyShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyShape::Hourglass => "Hourglass",
            BodyShape::Pear => "Pear",
            BodyShape::Apple => "Apple",
            BodyShape::InvertedTriangle => "Inverted Triangle",
            BodyShape::Rectangle => "Rectangle",
        }
    }
}

impl fmt::Display for BodyShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a silhouette from waist/hip and shoulder/hip ratios.
pub fn detect_body_shape(m: &BodyMeasurements) -> RecommendResult<BodyShape> {
    validate_measurements(m)?;

    let waist_to_hip = m.waist / m.hips;
    let shoulder_to_hip = m.shoulder / m.hips;

    let shape = if waist_to_hip <= 0.75 && shoulder_to_hip < 0.95 {
        BodyShape::Pear
    } else if waist_to_hip <= 0.75 {
        BodyShape::Hourglass
    } else if waist_to_hip > 0.8 && shoulder_to_hip > 1.05 {
        BodyShape::InvertedTriangle
    } else if waist_to_hip > 0.8 && shoulder_to_hip < 0.95 {
        BodyShape::Apple
    } else {
        BodyShape::Rectangle
    };
    Ok(shape)
}

/// Maps eye, hair and skin descriptors to a colour season. `None` when the
/// combination matches no rule.
pub fn detect_season(d: &SeasonDescriptors) -> RecommendResult<Option<&'static str>> {
    validate_descriptors(d)?;

    let eye = d.eye_color.to_lowercase();
    let hair = d.hair_color.to_lowercase();
    let skin = d.skin_tone.to_lowercase();
    let any = |text: &str, words: &[&str]| words.iter().any(|w| text.contains(w));

    let season = if any(&eye, &["blue", "green"]) && any(&hair, &["blonde", "golden"]) {
        if any(&skin, &["warm", "golden"]) {
            Some("Spring")
        } else {
            Some("Summer")
        }
    } else if any(&eye, &["brown", "hazel"]) && any(&hair, &["brown", "black"]) {
        if any(&skin, &["olive", "warm"]) {
            Some("Autumn")
        } else {
            Some("Winter")
        }
    } else {
        None
    };
    Ok(season)
}

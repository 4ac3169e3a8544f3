use crate::error::{RecommendError, RecommendResult};
use crate::models::{BodyMeasurements, SeasonDescriptors};

pub const MAX_LABEL_LENGTH: usize = 100;

/// Trims a free-text label and rejects empty or oversized values.
pub fn require_label(field: &str, value: Option<&str>) -> RecommendResult<String> {
    let value = value.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err(RecommendError::InvalidInput(format!("{} is required", field)));
    }
    if value.chars().count() > MAX_LABEL_LENGTH {
        return Err(RecommendError::InvalidInput(format!(
            "{} too long (max {} characters)",
            field, MAX_LABEL_LENGTH
        )));
    }
    Ok(value.to_string())
}

/// Trims an optional label, mapping blank values to `None`.
pub fn optional_label(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn validate_measurements(m: &BodyMeasurements) -> RecommendResult<()> {
    let fields = [
        ("shoulder", m.shoulder),
        ("bust", m.bust),
        ("waist", m.waist),
        ("hips", m.hips),
    ];
    for (name, value) in fields {
        if !value.is_finite() || value <= 0.0 {
            return Err(RecommendError::InvalidInput(format!(
                "{} must be a positive number, got {}",
                name, value
            )));
        }
    }
    Ok(())
}

pub fn validate_descriptors(d: &SeasonDescriptors) -> RecommendResult<()> {
    require_label("eye_color", Some(&d.eye_color))?;
    require_label("hair_color", Some(&d.hair_color))?;
    require_label("skin_tone", Some(&d.skin_tone))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_label() {
        assert_eq!(require_label("body_shape", Some("  Pear ")).unwrap(), "Pear");
        assert!(require_label("body_shape", Some("   ")).is_err());
        assert!(require_label("body_shape", None).is_err());
        assert!(require_label("body_shape", Some(&"x".repeat(101))).is_err());
    }

    #[test]
    fn test_optional_label() {
        assert_eq!(optional_label(Some(" Formal ")), Some("Formal".to_string()));
        assert_eq!(optional_label(Some("")), None);
        assert_eq!(optional_label(None), None);
    }

    #[test]
    fn test_validate_measurements() {
        let valid = BodyMeasurements { shoulder: 38.0, bust: 36.0, waist: 28.0, hips: 38.0 };
        assert!(validate_measurements(&valid).is_ok());

        let zero_hips = BodyMeasurements { hips: 0.0, ..valid };
        assert!(validate_measurements(&zero_hips).is_err());

        let nan_waist = BodyMeasurements { waist: f64::NAN, ..valid };
        assert!(validate_measurements(&nan_waist).is_err());
    }

    #[test]
    fn test_validate_descriptors() {
        let mut d = SeasonDescriptors {
            eye_color: "Blue".to_string(),
            hair_color: "Blonde".to_string(),
            skin_tone: "Warm".to_string(),
        };
        assert!(validate_descriptors(&d).is_ok());
        d.skin_tone.clear();
        assert!(validate_descriptors(&d).is_err());
    }
}

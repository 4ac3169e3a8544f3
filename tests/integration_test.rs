use fitrec::services::clothing::{ClothingRecommender, BODY_SHAPE, CLOTHING_TYPE};
use fitrec::services::dataset::{ClothingDataset, ColorDataset, DatasetSource};
use fitrec::services::detection::{detect_body_shape, detect_season, BodyShape};
use fitrec::services::history::{InMemoryRecommendationStore, RecommendationStore};
use fitrec::services::season::{merge_palette, SeasonColorAggregator};
use fitrec::*;
use std::io::Write;
use uuid::Uuid;

fn fallback_state() -> AppState {
    let mut config = Config::default();
    config.data.clothing_path = "missing/clothing.csv".to_string();
    config.data.season_path = "missing/colours.csv".to_string();
    AppState::new(config).unwrap()
}

#[tokio::test]
async fn test_recommendation_flow() {
    let state = fallback_state();
    assert_eq!(state.clothing.dataset().source(), &DatasetSource::Fallback);

    for shape in state.clothing.get_body_shapes() {
        let result = state.clothing.recommend(shape, None);
        assert!(result.success, "no recommendation for {}", shape);
        assert!(!result.recommendations.is_empty());
    }

    let result = state.clothing.recommend("Hourglass", Some("Formal"));
    assert!(result.success);
    assert_eq!(result.occasion.as_deref(), Some("Formal"));
    assert_eq!(result.recommendations.len(), 5);
    for category in ["Tops", "Bottoms", "Dresses", "Outerwear", "Indian Ethnic Wear"] {
        assert!(result.recommendations.contains_key(category), "missing {}", category);
    }

    let failed = state.clothing.recommend("Triangle", Some("Formal"));
    assert!(!failed.success);
    assert!(matches!(failed.error_kind, Some(RecommendError::InvalidBodyShape(_))));
    assert_eq!(failed.error.as_deref(), Some("'Triangle' is not a valid body shape."));
    assert!(failed.recommendations.is_empty());
}

#[tokio::test]
async fn test_unknown_occasion_matches_missing_occasion() {
    let state = fallback_state();

    let unknown = state.clothing.recommend("Pear", Some("Moon Landing"));
    let missing = state.clothing.recommend("Pear", None);
    assert_eq!(unknown.recommendations, missing.recommendations);
    assert_eq!(unknown.occasion, missing.occasion);

    assert_eq!(
        state.clothing.recommend("Apple", Some("Party")),
        state.clothing.recommend("Apple", Some("Party"))
    );
}

#[tokio::test]
async fn test_encoder_round_trip() {
    let state = fallback_state();
    let encoder = state.clothing.encoder();

    for shape in state.clothing.get_body_shapes() {
        let code = encoder.encode(BODY_SHAPE, shape).unwrap();
        assert_eq!(encoder.decode(BODY_SHAPE, code).unwrap(), shape.as_str());
    }
    for item in state.clothing.dataset().items() {
        let code = encoder.encode(CLOTHING_TYPE, &item.clothing_type).unwrap();
        assert_eq!(encoder.decode(CLOTHING_TYPE, code).unwrap(), item.clothing_type);
    }
    assert!(matches!(
        encoder.encode(BODY_SHAPE, "Triangle"),
        Err(RecommendError::UnknownCategory { .. })
    ));
}

#[tokio::test]
async fn test_season_lookup() {
    let state = fallback_state();

    let winter = state.seasons.get_season_recommendations("Winter").unwrap();
    assert_eq!(winter, state.seasons.get_season_recommendations("wInTeR").unwrap());
    assert_eq!(winter.season, "Winter");
    assert!(winter.complementary_colors.len() <= 5);
    assert!(winter.color_combinations.len() <= 5);

    let winter_rows: Vec<_> = state.seasons.dataset().rows_for_season("Winter").collect();
    for color in &winter.complementary_colors {
        assert!(winter_rows.iter().any(|r| &r.complementary_color == color));
    }
    for combination in &winter.color_combinations {
        assert!(winter_rows.iter().any(|r| &r.color_combination == combination));
    }

    let err = state.seasons.get_season_recommendations("Atlantis").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid season 'Atlantis'. Valid options are: Autumn, Spring, Summer, Winter"
    );
}

#[tokio::test]
async fn test_palette_merge_into_clothing_result() {
    let state = fallback_state();
    let mut result = state.clothing.recommend("Rectangle", Some("Casual"));
    let palette = state.seasons.get_season_recommendations("summer").unwrap();

    merge_palette(&mut result.recommendations, &palette, 3, 2);

    assert_eq!(
        result.recommendations.get("Complementary Colors").map(String::as_str),
        Some("Lavender, Sky Blue, Powder Pink")
    );
    let combinations = result.recommendations.get("Color Combinations").unwrap();
    assert_eq!(combinations.split(", ").count(), 2);
}

#[tokio::test]
async fn test_csv_datasets_end_to_end() {
    let mut clothing_file = tempfile::NamedTempFile::new().unwrap();
    writeln!(clothing_file, "Body Shape,Clothing Category,Clothing Type,Occasion").unwrap();
    for _ in 0..5 {
        writeln!(clothing_file, "Pear,Tops,Peplum top,Casual").unwrap();
        writeln!(clothing_file, "Hourglass,Tops,Wrap top,Formal").unwrap();
    }
    writeln!(clothing_file, "Pear,Shoes,Block heels,Casual").unwrap();

    let mut color_file = tempfile::NamedTempFile::new().unwrap();
    writeln!(color_file, "Seasonal Colour,Complimentary Colours,Recommended Colour Combinations").unwrap();
    writeln!(color_file, "Autumn,Rust,Rust & Teal").unwrap();
    writeln!(color_file, "Autumn,Rust,Mustard & Olive Green").unwrap();
    writeln!(color_file, "Autumn,Olive Green,Rust & Teal").unwrap();
    writeln!(color_file, "Spring,Peach,Peach & Mint").unwrap();

    let mut config = Config::default();
    config.data.clothing_path = clothing_file.path().to_string_lossy().into_owned();
    config.data.season_path = color_file.path().to_string_lossy().into_owned();
    let state = AppState::new(config).unwrap();

    assert!(matches!(state.clothing.dataset().source(), DatasetSource::File(_)));
    assert_eq!(state.clothing.get_body_shapes(), ["Pear", "Hourglass"]);
    assert_eq!(state.seasons.get_seasons(), ["Autumn", "Spring"]);

    let result = state.clothing.recommend("Pear", Some("Casual"));
    assert!(result.success);
    assert_eq!(result.recommendations.get("Tops").map(String::as_str), Some("Peplum top"));
    assert!(!result.recommendations.contains_key("Shoes"));
    assert!(matches!(result.outcomes.get("Shoes"), Some(CategoryOutcome::Skipped { .. })));

    let autumn = state.seasons.get_season_recommendations("autumn").unwrap();
    assert_eq!(autumn.complementary_colors, ["Rust", "Olive Green"]);
    assert_eq!(autumn.color_combinations, ["Rust & Teal", "Mustard & Olive Green"]);
}

#[tokio::test]
async fn test_malformed_csv_falls_back() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "Body Shape,Clothing Category,Clothing Type,Occasion").unwrap();
    writeln!(file, "Pear,,Peplum top,Casual").unwrap();

    assert!(ClothingDataset::from_csv(file.path()).is_err());
    let dataset = ClothingDataset::load_or_fallback(file.path());
    assert_eq!(dataset.source(), &DatasetSource::Fallback);

    let recommender = ClothingRecommender::new(dataset, &Config::default().training).unwrap();
    assert!(recommender.recommend("Hourglass", Some("Formal")).success);
}

#[tokio::test]
async fn test_history_store() {
    let store = InMemoryRecommendationStore::new();
    let state = fallback_state();
    let user_id = Uuid::new_v4();

    for shape in ["Pear", "Apple", "Rectangle"] {
        let result = state.clothing.recommend(shape, None);
        let record = SavedRecommendation::new(
            user_id,
            shape.to_string(),
            result.occasion.clone(),
            result.recommendations.clone(),
        );
        store.save(record).await.unwrap();
    }

    let history = store.list(user_id).await.unwrap();
    let shapes: Vec<_> = history.iter().map(|r| r.body_shape.as_str()).collect();
    assert_eq!(shapes, ["Rectangle", "Apple", "Pear"]);
    assert!(history.iter().all(|r| r.occasion.as_deref() == Some("Formal")));
    assert!(store.list(Uuid::new_v4()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_detectors_feed_lookups() {
    let state = fallback_state();

    let shape = detect_body_shape(&BodyMeasurements {
        shoulder: 39.0,
        bust: 38.0,
        waist: 28.0,
        hips: 40.0,
    })
    .unwrap();
    assert_eq!(shape, BodyShape::Hourglass);
    assert!(state.clothing.recommend(shape.as_str(), None).success);

    let season = detect_season(&SeasonDescriptors {
        eye_color: "Hazel".to_string(),
        hair_color: "Chestnut Brown".to_string(),
        skin_tone: "Warm Olive".to_string(),
    })
    .unwrap()
    .unwrap();
    assert_eq!(season, "Autumn");
    assert!(state.seasons.get_season_recommendations(season).is_ok());

    let analysis = state.seasons.analyze("blue", "blonde", "fair").unwrap();
    assert!(analysis.success);
    assert_eq!(analysis.season, "Spring");
    assert!(state.seasons.analyze("blue", "", "fair").is_err());
}

#[test]
fn test_fallback_color_dataset_is_usable() {
    let aggregator = SeasonColorAggregator::new(ColorDataset::fallback(), 5).unwrap();
    for season in ["Spring", "Summer", "Autumn", "Winter"] {
        let palette = aggregator.get_season_recommendations(season).unwrap();
        assert_eq!(palette.complementary_colors.len(), 5);
    }
}

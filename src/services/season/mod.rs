use crate::algorithms::{feature_matrix, train_test_split, CategoryEncoder, Classifier, RandomForest};
use crate::config::TrainingConfig;
use crate::error::{RecommendError, RecommendResult};
use crate::models::{PaletteAnalysis, SeasonRecommendation};
use crate::services::dataset::ColorDataset;
use crate::utils::metrics::ClassifierReport;
use crate::utils::top_k_by_frequency;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

pub const SEASONAL_COLOUR: &str = "Seasonal Colour";
pub const COMPLIMENTARY_COLOURS: &str = "Complimentary Colours";
pub const COLOUR_COMBINATIONS: &str = "Recommended Colour Combinations";

pub const COMPLEMENTARY_COLORS_KEY: &str = "Complementary Colors";
pub const COLOR_COMBINATIONS_KEY: &str = "Color Combinations";

/// Ranks the complementary colours and combinations recorded for each season.
pub struct SeasonColorAggregator {
    dataset: ColorDataset,
    seasons: Vec<String>,
    palette_size: usize,
}

impl SeasonColorAggregator {
    pub fn new(dataset: ColorDataset, palette_size: usize) -> RecommendResult<Self> {
        Self::with_known_seasons(dataset, &[], palette_size)
    }

    /// Like [`SeasonColorAggregator::new`], but also accepts `extra` seasons
    /// that may have no rows in the dataset.
    pub fn with_known_seasons(
        dataset: ColorDataset,
        extra: &[&str],
        palette_size: usize,
    ) -> RecommendResult<Self> {
        if dataset.is_empty() {
            return Err(RecommendError::Training("colour dataset has no rows".to_string()));
        }

        let mut seasons = dataset.seasons();
        for season in extra {
            if !seasons.iter().any(|s| s.eq_ignore_ascii_case(season)) {
                seasons.push(season.to_string());
            }
        }
        seasons.sort();

        info!("Season colour aggregator ready: {} items, seasons {:?}", dataset.len(), seasons);
        Ok(Self {
            dataset,
            seasons,
            palette_size,
        })
    }

    pub fn from_path<P: AsRef<Path>>(path: P, palette_size: usize) -> RecommendResult<Self> {
        Self::new(ColorDataset::load_or_fallback(path), palette_size)
    }

    /// Valid seasons, sorted.
    pub fn get_seasons(&self) -> &[String] {
        &self.seasons
    }

    pub fn dataset(&self) -> &ColorDataset {
        &self.dataset
    }

    /// Case-insensitive season lookup returning the stored spelling.
    pub fn canonical_season(&self, user_season: &str) -> RecommendResult<&str> {
        let wanted = user_season.trim().to_lowercase();
        self.seasons
            .iter()
            .find(|s| s.to_lowercase() == wanted)
            .map(String::as_str)
            .ok_or_else(|| RecommendError::UnknownSeason {
                season: user_season.to_string(),
                valid: self.seasons.clone(),
            })
    }

    pub fn get_season_recommendations(&self, user_season: &str) -> RecommendResult<SeasonRecommendation> {
        let season = self.canonical_season(user_season)?;

        let rows: Vec<_> = self.dataset.rows_for_season(season).collect();
        if rows.is_empty() {
            return Err(RecommendError::NoDataForSeason(season.to_string()));
        }

        let complementary_colors =
            top_k_by_frequency(rows.iter().map(|r| &r.complementary_color), self.palette_size);
        let color_combinations =
            top_k_by_frequency(rows.iter().map(|r| &r.color_combination), self.palette_size);
        debug!("Season {}: {} reference rows", season, rows.len());

        Ok(SeasonRecommendation {
            season: season.to_string(),
            complementary_colors,
            color_combinations,
        })
    }

    /// Placeholder analysis used when no image is available: any complete set
    /// of descriptors maps to the same Spring palette.
    pub fn analyze(&self, eye_color: &str, hair_color: &str, skin_tone: &str) -> RecommendResult<PaletteAnalysis> {
        if [eye_color, hair_color, skin_tone].iter().any(|v| v.trim().is_empty()) {
            return Err(RecommendError::InvalidInput(
                "eye color, hair color and skin tone are required".to_string(),
            ));
        }

        fn strings(values: &[&str]) -> Vec<String> {
            values.iter().map(|v| v.to_string()).collect()
        }

        Ok(PaletteAnalysis {
            success: true,
            season: "Spring".to_string(),
            complementary_colors: strings(&["Peach", "Coral", "Light Green"]),
            color_combinations: vec![strings(&["Peach", "Light Green"]), strings(&["Coral", "Yellow"])],
        })
    }
}

/// Adds the leading colours and combinations of `palette` to a clothing
/// recommendation map.
pub fn merge_palette(
    recommendations: &mut BTreeMap<String, String>,
    palette: &SeasonRecommendation,
    n_colors: usize,
    n_combinations: usize,
) {
    fn join(values: &[String], n: usize) -> String {
        values.iter().take(n).cloned().collect::<Vec<_>>().join(", ")
    }

    if !palette.complementary_colors.is_empty() && n_colors > 0 {
        recommendations.insert(
            COMPLEMENTARY_COLORS_KEY.to_string(),
            join(&palette.complementary_colors, n_colors),
        );
    }
    if !palette.color_combinations.is_empty() && n_combinations > 0 {
        recommendations.insert(
            COLOR_COMBINATIONS_KEY.to_string(),
            join(&palette.color_combinations, n_combinations),
        );
    }
}

/// Season → colour classifiers. Kept for offline comparison with the
/// frequency ranking; the public lookup goes through [`SeasonColorAggregator`].
pub struct SeasonClassifierBank {
    encoder: CategoryEncoder,
    complementary: RandomForest,
    combinations: RandomForest,
    reports: Vec<ClassifierReport>,
}

impl SeasonClassifierBank {
    pub fn train(dataset: &ColorDataset, training: &TrainingConfig) -> RecommendResult<Self> {
        let items = dataset.items();
        let mut encoder = CategoryEncoder::new();
        encoder.fit_column(SEASONAL_COLOUR, items.iter().map(|i| &i.season));
        encoder.fit_column(COMPLIMENTARY_COLOURS, items.iter().map(|i| &i.complementary_color));
        encoder.fit_column(COLOUR_COMBINATIONS, items.iter().map(|i| &i.color_combination));

        let seasons = items
            .iter()
            .map(|i| -> RecommendResult<Vec<usize>> { Ok(vec![encoder.encode(SEASONAL_COLOUR, &i.season)?]) })
            .collect::<RecommendResult<Vec<_>>>()?;
        let colors = items
            .iter()
            .map(|i| encoder.encode(COMPLIMENTARY_COLOURS, &i.complementary_color))
            .collect::<RecommendResult<Vec<_>>>()?;
        let combos = items
            .iter()
            .map(|i| encoder.encode(COLOUR_COMBINATIONS, &i.color_combination))
            .collect::<RecommendResult<Vec<_>>>()?;

        let (complementary, color_report) = fit_forest("complementary_colors", &seasons, &colors, training)?;
        let (combinations, combo_report) = fit_forest("color_combinations", &seasons, &combos, training)?;

        Ok(Self {
            encoder,
            complementary,
            combinations,
            reports: vec![color_report, combo_report],
        })
    }

    /// Predicted `(complementary colour, colour combination)` for a season
    /// spelled exactly as in the dataset.
    pub fn predict(&self, season: &str) -> RecommendResult<(String, String)> {
        let code = self.encoder.encode(SEASONAL_COLOUR, season)? as f32;
        let sample = ndarray::arr1(&[code]);

        let color = self.complementary.predict_one(sample.view())?;
        let combo = self.combinations.predict_one(sample.view())?;
        Ok((
            self.encoder.decode(COMPLIMENTARY_COLOURS, color)?.to_string(),
            self.encoder.decode(COLOUR_COMBINATIONS, combo)?.to_string(),
        ))
    }

    pub fn reports(&self) -> &[ClassifierReport] {
        &self.reports
    }
}

fn fit_forest(
    name: &str,
    rows: &[Vec<usize>],
    labels: &[usize],
    training: &TrainingConfig,
) -> RecommendResult<(RandomForest, ClassifierReport)> {
    let (train_idx, test_idx) = train_test_split(rows.len(), training.test_size, training.random_state)?;
    let pick_rows = |idx: &[usize]| feature_matrix(&idx.iter().map(|&i| rows[i].clone()).collect::<Vec<_>>());
    let pick_labels = |idx: &[usize]| idx.iter().map(|&i| labels[i]).collect::<Vec<_>>();

    let mut forest = RandomForest::new(training.n_estimators, training.random_state)
        .with_max_depth(training.max_depth);
    forest.fit(&pick_rows(&train_idx)?, &pick_labels(&train_idx))?;

    let holdout_accuracy = if test_idx.is_empty() {
        None
    } else {
        Some(forest.score(&pick_rows(&test_idx)?, &pick_labels(&test_idx))?)
    };

    let report = ClassifierReport {
        name: name.to_string(),
        train_samples: train_idx.len(),
        test_samples: test_idx.len(),
        n_classes: labels.iter().collect::<std::collections::BTreeSet<_>>().len(),
        holdout_accuracy,
    };
    Ok((forest, report))
}

use crate::algorithms::{feature_matrix, train_test_split, CategoryEncoder, Classifier, RandomForest};
use crate::config::TrainingConfig;
use crate::error::{RecommendError, RecommendResult};
use crate::models::{CategoryOutcome, RecommendationResult};
use crate::services::dataset::ClothingDataset;
use crate::utils::metrics::ClassifierReport;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

pub const BODY_SHAPE: &str = "Body Shape";
pub const OCCASION: &str = "Occasion";
pub const CLOTHING_CATEGORY: &str = "Clothing Category";
pub const CLOTHING_TYPE: &str = "Clothing Type";

struct CategoryModel {
    classifier: RandomForest,
    report: ClassifierReport,
}

/// Per-category clothing type classifiers plus the reference data they were
/// trained on. Everything is read-only after [`ClothingRecommender::new`].
pub struct ClothingRecommender {
    dataset: ClothingDataset,
    encoder: CategoryEncoder,
    models: BTreeMap<String, CategoryModel>,
    body_shapes: Vec<String>,
    occasions: Vec<String>,
    categories: Vec<String>,
    default_occasion: Option<String>,
}

impl ClothingRecommender {
    pub fn new(dataset: ClothingDataset, training: &TrainingConfig) -> RecommendResult<Self> {
        if dataset.is_empty() {
            return Err(RecommendError::Training("clothing dataset has no rows".to_string()));
        }

        let body_shapes = dataset.body_shapes();
        let occasions = dataset.occasions();
        let categories = dataset.categories();

        let mut encoder = CategoryEncoder::new();
        encoder.fit_column(BODY_SHAPE, &body_shapes);
        encoder.fit_column(OCCASION, &occasions);
        encoder.fit_column(CLOTHING_CATEGORY, &categories);
        encoder.fit_column(CLOTHING_TYPE, dataset.clothing_types());

        let trained: Vec<(String, RecommendResult<Option<CategoryModel>>)> = categories
            .par_iter()
            .map(|category| {
                let model = train_category(&dataset, &encoder, category, training);
                (category.clone(), model)
            })
            .collect();

        let mut models = BTreeMap::new();
        for (category, model) in trained {
            match model {
                Ok(Some(model)) => {
                    debug!("Trained classifier for {}", model.report);
                    models.insert(category, model);
                }
                Ok(None) => debug!("Not enough rows to train a classifier for '{}'", category),
                Err(RecommendError::Training(reason)) => {
                    warn!("Skipping classifier for '{}': {}", category, reason);
                }
                Err(e) => return Err(e),
            }
        }

        let default_occasion = dataset.most_frequent_occasion();
        info!(
            "Clothing recommender ready: {} items, {} categories, {} classifiers",
            dataset.len(),
            categories.len(),
            models.len()
        );

        Ok(Self {
            dataset,
            encoder,
            models,
            body_shapes,
            occasions,
            categories,
            default_occasion,
        })
    }

    /// Loads the CSV at `path` (or the synthetic fallback) and trains on it.
    pub fn from_path<P: AsRef<Path>>(path: P, training: &TrainingConfig) -> RecommendResult<Self> {
        Self::new(ClothingDataset::load_or_fallback(path), training)
    }

    pub fn get_body_shapes(&self) -> &[String] {
        &self.body_shapes
    }

    pub fn get_occasions(&self) -> &[String] {
        &self.occasions
    }

    pub fn get_clothing_categories(&self) -> &[String] {
        &self.categories
    }

    pub fn default_occasion(&self) -> Option<&str> {
        self.default_occasion.as_deref()
    }

    pub fn dataset(&self) -> &ClothingDataset {
        &self.dataset
    }

    pub fn encoder(&self) -> &CategoryEncoder {
        &self.encoder
    }

    pub fn trained_categories(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    pub fn training_report(&self) -> Vec<ClassifierReport> {
        self.models.values().map(|m| m.report.clone()).collect()
    }

    pub fn recommend(&self, body_shape: &str, occasion: Option<&str>) -> RecommendationResult {
        debug!("Recommendation request: body_shape={}, occasion={:?}", body_shape, occasion);

        if !self.body_shapes.iter().any(|s| s == body_shape) {
            let err = RecommendError::InvalidBodyShape(body_shape.to_string());
            return RecommendationResult::from_error(err);
        }

        let occasion = self.resolve_occasion(occasion);
        let body_code = match self.encoder.encode(BODY_SHAPE, body_shape) {
            Ok(code) => code,
            Err(e) => return RecommendationResult::from_error(e),
        };
        let features = match occasion.as_deref() {
            Some(occasion) => self
                .encoder
                .encode(OCCASION, occasion)
                .map(|occasion_code| [body_code as f32, occasion_code as f32]),
            None => Err(RecommendError::InvalidInput("no occasion available".to_string())),
        };

        let mut result = RecommendationResult {
            success: true,
            occasion: occasion.clone(),
            ..Default::default()
        };

        for category in &self.categories {
            let outcome = self.category_outcome(category, body_shape, &features);
            if let Some(clothing_type) = outcome.clothing_type() {
                result.recommendations.insert(category.clone(), clothing_type.to_string());
            }
            result.outcomes.insert(category.clone(), outcome);
        }

        result
    }

    /// Unknown occasions are dropped rather than rejected; a missing occasion
    /// becomes the most frequent one in the dataset.
    fn resolve_occasion(&self, occasion: Option<&str>) -> Option<String> {
        let requested = occasion.filter(|o| !o.is_empty());
        match requested {
            Some(o) if self.occasions.iter().any(|known| known == o) => Some(o.to_string()),
            Some(o) => {
                warn!("'{}' is not a valid occasion, using default", o);
                self.default_occasion.clone()
            }
            None => self.default_occasion.clone(),
        }
    }

    fn category_outcome(
        &self,
        category: &str,
        body_shape: &str,
        features: &RecommendResult<[f32; 2]>,
    ) -> CategoryOutcome {
        let Some(model) = self.models.get(category) else {
            return CategoryOutcome::Skipped {
                reason: "no trained classifier".to_string(),
            };
        };

        let prediction = features
            .as_ref()
            .map_err(Clone::clone)
            .and_then(|features| self.predict(model, features));

        match prediction {
            Ok(clothing_type) => CategoryOutcome::Predicted { clothing_type },
            Err(e) => {
                warn!("Prediction failed for category {}: {}", category, e);
                match self.fallback_lookup(category, body_shape) {
                    Some(clothing_type) => CategoryOutcome::Fallback {
                        clothing_type,
                        reason: e.to_string(),
                    },
                    None => CategoryOutcome::Skipped { reason: e.to_string() },
                }
            }
        }
    }

    fn predict(&self, model: &CategoryModel, features: &[f32; 2]) -> RecommendResult<String> {
        let code = model.classifier.predict_one(ndarray::ArrayView1::from(&features[..]))?;
        Ok(self.encoder.decode(CLOTHING_TYPE, code)?.to_string())
    }

    /// First reference row for the category and body shape, else the first row
    /// for the category alone.
    fn fallback_lookup(&self, category: &str, body_shape: &str) -> Option<String> {
        let mut in_category = self
            .dataset
            .items()
            .iter()
            .filter(|item| item.clothing_category == category);
        let first = in_category.clone().next()?;

        let matched = in_category
            .find(|item| item.body_shape == body_shape)
            .unwrap_or(first);
        Some(matched.clothing_type.clone())
    }
}

fn train_category(
    dataset: &ClothingDataset,
    encoder: &CategoryEncoder,
    category: &str,
    training: &TrainingConfig,
) -> RecommendResult<Option<CategoryModel>> {
    let mut rows = Vec::new();
    let mut labels = Vec::new();

    for item in dataset.items().iter().filter(|i| i.clothing_category == category) {
        // rows without an occasion only serve the fallback lookup
        let Some(occasion) = item.occasion.as_deref() else {
            continue;
        };
        rows.push(vec![
            encoder.encode(BODY_SHAPE, &item.body_shape)?,
            encoder.encode(OCCASION, occasion)?,
        ]);
        labels.push(encoder.encode(CLOTHING_TYPE, &item.clothing_type)?);
    }

    if rows.len() < 2 {
        return Ok(None);
    }

    let (train_idx, test_idx) = train_test_split(rows.len(), training.test_size, training.random_state)?;
    let select = |idx: &[usize]| -> RecommendResult<(ndarray::Array2<f32>, Vec<usize>)> {
        let x = feature_matrix(&idx.iter().map(|&i| rows[i].clone()).collect::<Vec<_>>())?;
        let y = idx.iter().map(|&i| labels[i]).collect();
        Ok((x, y))
    };

    let (x_train, y_train) = select(&train_idx)?;
    let mut classifier = RandomForest::new(training.n_estimators, training.random_state)
        .with_max_depth(training.max_depth);
    classifier.fit(&x_train, &y_train)?;

    let holdout_accuracy = if test_idx.is_empty() {
        None
    } else {
        let (x_test, y_test) = select(&test_idx)?;
        Some(classifier.score(&x_test, &y_test)?)
    };

    let report = ClassifierReport {
        name: category.to_string(),
        train_samples: train_idx.len(),
        test_samples: test_idx.len(),
        n_classes: labels.iter().collect::<std::collections::BTreeSet<_>>().len(),
        holdout_accuracy,
    };

    Ok(Some(CategoryModel { classifier, report }))
}

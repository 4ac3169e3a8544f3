//! Reference datasets consumed at startup.
//!
//! Both datasets are CSV files keyed by the human-readable column names of the
//! spreadsheets. When a file cannot be read, a built-in synthetic dataset of the
//! same shape is substituted so the service can still start.

use crate::error::{RecommendError, RecommendResult};
use crate::models::{ReferenceColorItem, ReferenceItem};
use crate::utils::{distinct_in_order, most_frequent};
use serde::de::DeserializeOwned;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// Where a dataset's rows came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    File(String),
    Fallback,
    InMemory,
}

#[derive(Debug, Clone)]
pub struct ClothingDataset {
    items: Vec<ReferenceItem>,
    source: DatasetSource,
}

impl ClothingDataset {
    pub fn new(items: Vec<ReferenceItem>) -> Self {
        Self {
            items,
            source: DatasetSource::InMemory,
        }
    }

    pub fn from_csv<P: AsRef<Path>>(path: P) -> RecommendResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| load_error(path, e))?;
        let mut dataset = Self::from_reader(file, &path.display().to_string())?;
        dataset.source = DatasetSource::File(path.display().to_string());
        Ok(dataset)
    }

    pub fn from_reader<R: Read>(reader: R, origin: &str) -> RecommendResult<Self> {
        let rows: Vec<ReferenceItem> = read_rows(reader, origin)?;
        let mut items = Vec::with_capacity(rows.len());

        for (line, row) in rows.into_iter().enumerate() {
            let item = ReferenceItem {
                body_shape: required(origin, line, "Body Shape", &row.body_shape)?,
                clothing_category: required(origin, line, "Clothing Category", &row.clothing_category)?,
                clothing_type: required(origin, line, "Clothing Type", &row.clothing_type)?,
                occasion: crate::utils::validation::optional_label(row.occasion.as_deref()),
            };
            items.push(item);
        }

        Ok(Self::new(items))
    }

    /// Reads `path`, substituting [`ClothingDataset::fallback`] on any failure.
    pub fn load_or_fallback<P: AsRef<Path>>(path: P) -> Self {
        match Self::from_csv(&path) {
            Ok(dataset) => {
                info!("Loaded {} clothing reference items from {}", dataset.len(), path.as_ref().display());
                dataset
            }
            Err(e) => {
                warn!("{}; using synthetic clothing dataset", e);
                Self::fallback()
            }
        }
    }

    /// Five body shapes, categories and occasions cycled ten times over 25
    /// clothing types.
    pub fn fallback() -> Self {
        const SHAPES: [&str; 5] = ["Hourglass", "Pear", "Apple", "Inverted Triangle", "Rectangle"];
        const CATEGORIES: [&str; 5] = ["Tops", "Bottoms", "Dresses", "Outerwear", "Indian Ethnic Wear"];
        const OCCASIONS: [&str; 5] = ["Formal", "Casual", "Party", "Workwear", "Streetwear"];
        const TYPES: [&str; 25] = [
            "Structured blazer",
            "Bootcut jeans",
            "Ruched dress",
            "Embellished blazer",
            "Floor-length gown with dupatta",
            "V-neck top",
            "A-line skirt",
            "Wrap dress",
            "Tailored jacket",
            "Anarkali suit",
            "Peplum top",
            "Wide-leg pants",
            "Fit-and-flare dress",
            "Cropped jacket",
            "Saree with structured blouse",
            "Scoop neck top",
            "Straight leg jeans",
            "Shift dress",
            "Bomber jacket",
            "Sharara suit",
            "Boat neck top",
            "Cigarette pants",
            "Maxi dress",
            "Denim jacket",
            "Lehenga with short choli",
        ];

        let items = (0..50)
            .map(|i| ReferenceItem {
                body_shape: SHAPES[i % 5].to_string(),
                clothing_category: CATEGORIES[i % 5].to_string(),
                clothing_type: TYPES[i % 25].to_string(),
                occasion: Some(OCCASIONS[i % 5].to_string()),
            })
            .collect();

        Self {
            items,
            source: DatasetSource::Fallback,
        }
    }

    pub fn items(&self) -> &[ReferenceItem] {
        &self.items
    }

    pub fn source(&self) -> &DatasetSource {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn body_shapes(&self) -> Vec<String> {
        distinct_in_order(self.items.iter().map(|i| &i.body_shape))
    }

    pub fn occasions(&self) -> Vec<String> {
        distinct_in_order(self.items.iter().filter_map(|i| i.occasion.as_ref()))
    }

    pub fn categories(&self) -> Vec<String> {
        distinct_in_order(self.items.iter().map(|i| &i.clothing_category))
    }

    pub fn clothing_types(&self) -> Vec<String> {
        distinct_in_order(self.items.iter().map(|i| &i.clothing_type))
    }

    /// Most common non-empty occasion; ties go to the one seen first.
    pub fn most_frequent_occasion(&self) -> Option<String> {
        most_frequent(self.items.iter().filter_map(|i| i.occasion.as_ref()))
    }
}

#[derive(Debug, Clone)]
pub struct ColorDataset {
    items: Vec<ReferenceColorItem>,
    source: DatasetSource,
}

impl ColorDataset {
    pub fn new(items: Vec<ReferenceColorItem>) -> Self {
        Self {
            items,
            source: DatasetSource::InMemory,
        }
    }

    pub fn from_csv<P: AsRef<Path>>(path: P) -> RecommendResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| load_error(path, e))?;
        let mut dataset = Self::from_reader(file, &path.display().to_string())?;
        dataset.source = DatasetSource::File(path.display().to_string());
        Ok(dataset)
    }

    pub fn from_reader<R: Read>(reader: R, origin: &str) -> RecommendResult<Self> {
        let rows: Vec<ReferenceColorItem> = read_rows(reader, origin)?;
        let mut items = Vec::with_capacity(rows.len());

        for (line, row) in rows.into_iter().enumerate() {
            items.push(ReferenceColorItem {
                season: required(origin, line, "Seasonal Colour", &row.season)?,
                complementary_color: required(origin, line, "Complimentary Colours", &row.complementary_color)?,
                color_combination: required(
                    origin,
                    line,
                    "Recommended Colour Combinations",
                    &row.color_combination,
                )?,
            });
        }

        Ok(Self::new(items))
    }

    pub fn load_or_fallback<P: AsRef<Path>>(path: P) -> Self {
        match Self::from_csv(&path) {
            Ok(dataset) => {
                info!("Loaded {} seasonal colour items from {}", dataset.len(), path.as_ref().display());
                dataset
            }
            Err(e) => {
                warn!("{}; using synthetic colour dataset", e);
                Self::fallback()
            }
        }
    }

    /// Four seasons cycled ten times over twenty colours and combinations.
    pub fn fallback() -> Self {
        const SEASONS: [&str; 4] = ["Summer", "Winter", "Autumn", "Spring"];
        const COLORS: [&str; 20] = [
            "Lavender", "Crimson", "Mustard", "Coral",
            "Sky Blue", "Royal Blue", "Burnt Orange", "Peach",
            "Powder Pink", "Emerald", "Olive Green", "Mint",
            "Rose", "Fuchsia", "Teal", "Turquoise",
            "Soft Blue", "Charcoal", "Rust", "Light Green",
        ];
        const COMBINATIONS: [&str; 20] = [
            "Lavender & Sky Blue", "Emerald & Charcoal", "Mustard & Olive Green", "Coral & Turquoise",
            "Soft Blue & Powder Pink", "Royal Blue & Silver", "Rust & Teal", "Peach & Mint",
            "Rose & Mint", "Fuchsia & Black", "Burnt Orange & Brown", "Light Green & Yellow",
            "Lavender & Sky Blue", "Fuchsia & Black", "Mustard & Olive Green", "Coral & Turquoise",
            "Soft Blue & Powder Pink", "Royal Blue & Silver", "Burnt Orange & Brown", "Peach & Mint",
        ];

        let items = (0..40)
            .map(|i| ReferenceColorItem {
                season: SEASONS[i % 4].to_string(),
                complementary_color: COLORS[i % 20].to_string(),
                color_combination: COMBINATIONS[i % 20].to_string(),
            })
            .collect();

        Self {
            items,
            source: DatasetSource::Fallback,
        }
    }

    pub fn items(&self) -> &[ReferenceColorItem] {
        &self.items
    }

    pub fn source(&self) -> &DatasetSource {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn seasons(&self) -> Vec<String> {
        distinct_in_order(self.items.iter().map(|i| &i.season))
    }

    pub fn rows_for_season<'a>(&'a self, season: &'a str) -> impl Iterator<Item = &'a ReferenceColorItem> {
        self.items.iter().filter(move |i| i.season == season)
    }
}

fn read_rows<T: DeserializeOwned, R: Read>(reader: R, origin: &str) -> RecommendResult<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let rows = reader
        .deserialize()
        .collect::<Result<Vec<T>, csv::Error>>()
        .map_err(|e| RecommendError::DatasetLoad {
            path: origin.to_string(),
            reason: e.to_string(),
        })?;

    if rows.is_empty() {
        return Err(RecommendError::DatasetLoad {
            path: origin.to_string(),
            reason: "no data rows".to_string(),
        });
    }
    Ok(rows)
}

fn required(origin: &str, line: usize, column: &str, value: &str) -> RecommendResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(RecommendError::DatasetLoad {
            path: origin.to_string(),
            reason: format!("row {}: empty '{}'", line + 1, column),
        });
    }
    Ok(value.to_string())
}

fn load_error(path: &Path, e: std::io::Error) -> RecommendError {
    RecommendError::DatasetLoad {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

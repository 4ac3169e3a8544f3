pub mod encoder;
pub mod forest;

pub use encoder::{CategoryEncoder, EncodingTable};
pub use forest::{DecisionTree, RandomForest};

use crate::error::{RecommendError, RecommendResult};
use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Multi-class classifier over encoded categorical features.
pub trait Classifier: Send + Sync {
    fn fit(&mut self, x: &Array2<f32>, y: &[usize]) -> RecommendResult<()>;

    fn predict_one(&self, sample: ArrayView1<f32>) -> RecommendResult<usize>;

    fn predict(&self, x: &Array2<f32>) -> RecommendResult<Vec<usize>> {
        x.rows().into_iter().map(|row| self.predict_one(row)).collect()
    }

    /// Fraction of rows whose prediction matches `y`.
    fn score(&self, x: &Array2<f32>, y: &[usize]) -> RecommendResult<f32> {
        if y.is_empty() {
            return Err(RecommendError::InvalidInput("cannot score zero samples".to_string()));
        }
        let predictions = self.predict(x)?;
        Ok(crate::utils::metrics::accuracy(&predictions, y))
    }
}

/// Builds a dense feature matrix from rows of category codes.
pub fn feature_matrix(rows: &[Vec<usize>]) -> RecommendResult<Array2<f32>> {
    let n_cols = rows.first().map_or(0, Vec::len);
    let mut data = Vec::with_capacity(rows.len() * n_cols);
    for row in rows {
        if row.len() != n_cols {
            return Err(RecommendError::InvalidInput(format!(
                "ragged feature rows: expected {} columns, got {}",
                n_cols,
                row.len()
            )));
        }
        data.extend(row.iter().map(|&code| code as f32));
    }

    Array2::from_shape_vec((rows.len(), n_cols), data)
        .map_err(|e| RecommendError::InvalidInput(e.to_string()))
}

/// Shuffled train/test index split. The test side gets `ceil(test_size * n)`
/// samples.
pub fn train_test_split(
    n_samples: usize,
    test_size: f64,
    random_state: u64,
) -> RecommendResult<(Vec<usize>, Vec<usize>)> {
    if !(0.0..1.0).contains(&test_size) {
        return Err(RecommendError::InvalidInput(format!(
            "test_size must be in [0, 1), got {}",
            test_size
        )));
    }

    let n_test = (test_size * n_samples as f64).ceil() as usize;
    if n_samples < 2 || n_test >= n_samples {
        return Err(RecommendError::Training(format!(
            "cannot split {} samples with test_size {}",
            n_samples, test_size
        )));
    }

    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = StdRng::seed_from_u64(random_state);
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    Ok((train, indices))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sizes() {
        let (train, test) = train_test_split(10, 0.2, 42).unwrap();
        assert_eq!(train.len(), 8);
        assert_eq!(test.len(), 2);

        let (train, test) = train_test_split(2, 0.2, 42).unwrap();
        assert_eq!((train.len(), test.len()), (1, 1));
    }

    #[test]
    fn test_split_is_seeded_and_disjoint() {
        let a = train_test_split(25, 0.2, 42).unwrap();
        let b = train_test_split(25, 0.2, 42).unwrap();
        assert_eq!(a, b);

        let mut all: Vec<usize> = a.0.iter().chain(a.1.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..25).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_rejects_tiny_inputs() {
        assert!(train_test_split(1, 0.2, 42).is_err());
        assert!(train_test_split(10, 1.5, 42).is_err());
    }

    #[test]
    fn test_feature_matrix() {
        let x = feature_matrix(&[vec![0, 1], vec![2, 3]]).unwrap();
        assert_eq!(x.shape(), &[2, 2]);
        assert_eq!(x[[1, 0]], 2.0);
        assert!(feature_matrix(&[vec![0, 1], vec![2]]).is_err());
    }
}

//! CART decision trees and a seeded random forest over small categorical
//! feature spaces.
//!
//! Trees split on `feature <= threshold` using Gini impurity. The forest trains
//! every tree on a bootstrap sample drawn from `StdRng::seed_from_u64(seed + i)`
//! and lets each split look at a random subset of `sqrt(n_features)` features,
//! so a fixed `random_state` always produces the same model.

use super::Classifier;
use crate::error::{RecommendError, RecommendResult};
use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
enum TreeNode {
    Split {
        feature: usize,
        threshold: f32,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
    Leaf {
        class_label: usize,
    },
}

impl TreeNode {
    fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DecisionTree {
    root: Option<TreeNode>,
    max_depth: Option<usize>,
    max_features: Option<usize>,
    random_state: u64,
    n_features: usize,
}

impl DecisionTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Examine at most `max_features` randomly chosen features per split
    /// (more only when none of them separates the node). `None` examines all
    /// features in column order.
    pub fn with_max_features(mut self, max_features: Option<usize>, random_state: u64) -> Self {
        self.max_features = max_features;
        self.random_state = random_state;
        self
    }

    pub fn depth(&self) -> Option<usize> {
        self.root.as_ref().map(TreeNode::depth)
    }

    fn fit_indices(&mut self, x: &Array2<f32>, y: &[usize], indices: &[usize]) -> RecommendResult<()> {
        if indices.is_empty() {
            return Err(RecommendError::Training("cannot fit a tree with zero samples".to_string()));
        }
        let mut grower = Grower {
            x,
            y,
            max_depth: self.max_depth,
            max_features: self.max_features.map(|m| m.clamp(1, x.ncols().max(1))),
            rng: StdRng::seed_from_u64(self.random_state),
        };
        self.n_features = x.ncols();
        self.root = Some(grower.build(indices, 0));
        Ok(())
    }
}

impl Classifier for DecisionTree {
    fn fit(&mut self, x: &Array2<f32>, y: &[usize]) -> RecommendResult<()> {
        check_training_shape(x, y)?;
        let indices: Vec<usize> = (0..y.len()).collect();
        self.fit_indices(x, y, &indices)
    }

    fn predict_one(&self, sample: ArrayView1<f32>) -> RecommendResult<usize> {
        let root = self
            .root
            .as_ref()
            .ok_or_else(|| RecommendError::Training("decision tree is not fitted".to_string()))?;
        check_sample_width(sample.len(), self.n_features)?;

        let mut node = root;
        loop {
            match node {
                TreeNode::Leaf { class_label, .. } => return Ok(*class_label),
                TreeNode::Split { feature, threshold, left, right } => {
                    node = if sample[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }
}

/// Ensemble of [`DecisionTree`]s, each fit on a bootstrap sample with random
/// feature subsets per split, combined by majority vote.
#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_estimators: usize,
    max_depth: Option<usize>,
    max_features: Option<usize>,
    random_state: u64,
    n_features: usize,
}

impl RandomForest {
    pub fn new(n_estimators: usize, random_state: u64) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators: n_estimators.max(1),
            max_depth: None,
            max_features: None,
            random_state,
            n_features: 0,
        }
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Features examined per split. Defaults to `sqrt(n_features)`.
    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }
}

impl Classifier for RandomForest {
    fn fit(&mut self, x: &Array2<f32>, y: &[usize]) -> RecommendResult<()> {
        check_training_shape(x, y)?;
        let n_samples = y.len();
        let max_features = self.max_features.unwrap_or_else(|| sqrt_features(x.ncols()));

        let trees = (0..self.n_estimators)
            .into_par_iter()
            .map(|i| -> RecommendResult<DecisionTree> {
                let mut rng = StdRng::seed_from_u64(self.random_state.wrapping_add(i as u64));
                let sample = bootstrap_sample(n_samples, &mut rng);
                let mut tree = DecisionTree::new()
                    .with_max_depth(self.max_depth)
                    .with_max_features(Some(max_features), rng.gen());
                tree.fit_indices(x, y, &sample)?;
                Ok(tree)
            })
            .collect::<RecommendResult<Vec<_>>>()?;

        self.trees = trees;
        self.n_features = x.ncols();
        Ok(())
    }

    fn predict_one(&self, sample: ArrayView1<f32>) -> RecommendResult<usize> {
        if self.trees.is_empty() {
            return Err(RecommendError::Training("random forest is not fitted".to_string()));
        }
        check_sample_width(sample.len(), self.n_features)?;

        let mut votes: BTreeMap<usize, usize> = BTreeMap::new();
        for tree in &self.trees {
            *votes.entry(tree.predict_one(sample)?).or_insert(0) += 1;
        }

        Ok(majority(&votes))
    }
}

fn check_training_shape(x: &Array2<f32>, y: &[usize]) -> RecommendResult<()> {
    if x.nrows() != y.len() {
        return Err(RecommendError::Training(format!(
            "feature rows ({}) and labels ({}) differ",
            x.nrows(),
            y.len()
        )));
    }
    if y.is_empty() {
        return Err(RecommendError::Training("cannot fit with zero samples".to_string()));
    }
    Ok(())
}

fn check_sample_width(got: usize, expected: usize) -> RecommendResult<()> {
    if got != expected {
        return Err(RecommendError::InvalidInput(format!(
            "expected {} features, got {}",
            expected, got
        )));
    }
    Ok(())
}

fn sqrt_features(n_features: usize) -> usize {
    ((n_features as f64).sqrt() as usize).max(1)
}

fn bootstrap_sample(n_samples: usize, rng: &mut StdRng) -> Vec<usize> {
    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
}

/// Most common label; ties go to the smallest label.
fn majority(counts: &BTreeMap<usize, usize>) -> usize {
    let mut best = (0, 0);
    for (&label, &count) in counts {
        if count > best.1 {
            best = (label, count);
        }
    }
    best.0
}

fn label_counts(y: &[usize], indices: &[usize]) -> BTreeMap<usize, usize> {
    let mut counts = BTreeMap::new();
    for &idx in indices {
        *counts.entry(y[idx]).or_insert(0) += 1;
    }
    counts
}

fn gini(counts: &BTreeMap<usize, usize>, total: usize) -> f32 {
    if total == 0 {
        return 0.0;
    }
    let n = total as f32;
    1.0 - counts
        .values()
        .map(|&c| {
            let p = c as f32 / n;
            p * p
        })
        .sum::<f32>()
}

fn partition(x: &Array2<f32>, indices: &[usize], feature: usize, threshold: f32) -> (Vec<usize>, Vec<usize>) {
    indices.iter().partition(|&&idx| x[[idx, feature]] <= threshold)
}

/// Best `(threshold, gain)` on one feature; lower thresholds win ties.
fn best_threshold(x: &Array2<f32>, y: &[usize], indices: &[usize], feature: usize, parent: f32) -> Option<(f32, f32)> {
    let n = indices.len() as f32;
    let mut values: Vec<f32> = indices.iter().map(|&idx| x[[idx, feature]]).collect();
    values.sort_by(|a, b| a.total_cmp(b));
    values.dedup();

    let mut best: Option<(f32, f32)> = None;
    for pair in values.windows(2) {
        let threshold = (pair[0] + pair[1]) / 2.0;
        let (left, right) = partition(x, indices, feature, threshold);
        if left.is_empty() || right.is_empty() {
            continue;
        }

        let weighted = (left.len() as f32 / n) * gini(&label_counts(y, &left), left.len())
            + (right.len() as f32 / n) * gini(&label_counts(y, &right), right.len());
        let gain = parent - weighted;

        if gain > best.map_or(0.0, |b| b.1) {
            best = Some((threshold, gain));
        }
    }
    best
}

struct Grower<'a> {
    x: &'a Array2<f32>,
    y: &'a [usize],
    max_depth: Option<usize>,
    max_features: Option<usize>,
    rng: StdRng,
}

impl Grower<'_> {
    /// Best `(feature, threshold)` by Gini gain among the features visited.
    /// Features earlier in the visit order win ties.
    fn find_best_split(&mut self, indices: &[usize]) -> Option<(usize, f32)> {
        let parent = gini(&label_counts(self.y, indices), indices.len());
        let mut order: Vec<usize> = (0..self.x.ncols()).collect();
        if self.max_features.is_some() {
            order.shuffle(&mut self.rng);
        }

        let mut best: Option<(usize, f32, f32)> = None;
        for (visited, &feature) in order.iter().enumerate() {
            if best.is_some() && self.max_features.is_some_and(|m| visited >= m) {
                break;
            }
            if let Some((threshold, gain)) = best_threshold(self.x, self.y, indices, feature, parent) {
                if gain > best.map_or(0.0, |b| b.2) {
                    best = Some((feature, threshold, gain));
                }
            }
        }

        best.map(|(feature, threshold, _)| (feature, threshold))
    }

    fn build(&mut self, indices: &[usize], depth: usize) -> TreeNode {
        let counts = label_counts(self.y, indices);
        let leaf = TreeNode::Leaf {
            class_label: majority(&counts),
        };

        if counts.len() <= 1 || self.max_depth.is_some_and(|max| depth >= max) {
            return leaf;
        }

        let Some((feature, threshold)) = self.find_best_split(indices) else {
            return leaf;
        };

        let (left, right) = partition(self.x, indices, feature, threshold);
        TreeNode::Split {
            feature,
            threshold,
            left: Box::new(self.build(&left, depth + 1)),
            right: Box::new(self.build(&right, depth + 1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn grid_data() -> (Array2<f32>, Vec<usize>) {
        let x = array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
        (x, vec![0, 0, 1, 2])
    }

    #[test]
    fn test_tree_fits_training_data() {
        let (x, y) = grid_data();
        let mut tree = DecisionTree::new();
        tree.fit(&x, &y).unwrap();

        assert_eq!(tree.predict(&x).unwrap(), y);
        assert_eq!(tree.depth(), Some(2));
    }

    #[test]
    fn test_tree_respects_max_depth() {
        let (x, y) = grid_data();
        let mut tree = DecisionTree::new().with_max_depth(Some(0));
        tree.fit(&x, &y).unwrap();

        assert_eq!(tree.depth(), Some(0));
        assert_eq!(tree.predict_one(x.row(3)).unwrap(), 0);
    }

    #[test]
    fn test_feature_subsets_still_fit_training_data() {
        let (x, y) = grid_data();
        for seed in 0..8 {
            let mut tree = DecisionTree::new().with_max_features(Some(1), seed);
            tree.fit(&x, &y).unwrap();
            assert_eq!(tree.predict(&x).unwrap(), y, "seed {}", seed);
        }
    }

    #[test]
    fn test_sqrt_features() {
        assert_eq!(sqrt_features(1), 1);
        assert_eq!(sqrt_features(2), 1);
        assert_eq!(sqrt_features(9), 3);
    }

    #[test]
    fn test_pure_labels_make_a_leaf() {
        let x = array![[3.0, 1.0], [3.0, 1.0], [3.0, 1.0]];
        let mut tree = DecisionTree::new();
        tree.fit(&x, &[7, 7, 7]).unwrap();
        assert_eq!(tree.depth(), Some(0));
        assert_eq!(tree.predict_one(x.row(0)).unwrap(), 7);
    }

    #[test]
    fn test_forest_is_reproducible() {
        let x = array![
            [0.0, 0.0],
            [0.0, 1.0],
            [1.0, 0.0],
            [1.0, 1.0],
            [2.0, 0.0],
            [2.0, 1.0]
        ];
        let y = vec![0, 1, 1, 2, 2, 0];

        let mut a = RandomForest::new(25, 42);
        let mut b = RandomForest::new(25, 42);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();

        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }

    #[test]
    fn test_forest_separable_data() {
        let x = array![[0.0], [0.0], [1.0], [1.0], [2.0], [2.0]];
        let y = vec![4, 4, 5, 5, 6, 6];
        let mut forest = RandomForest::new(50, 7).with_max_features(Some(1));
        forest.fit(&x, &y).unwrap();

        assert!(forest.is_fitted());
        assert!(forest.score(&x, &y).unwrap() > 0.8);
    }

    #[test]
    fn test_unfitted_and_bad_input() {
        let forest = RandomForest::new(10, 1);
        assert!(forest.predict_one(array![0.0, 1.0].view()).is_err());

        let (x, y) = grid_data();
        let mut forest = RandomForest::new(10, 1);
        assert!(forest.fit(&x, &y[..3]).is_err());
        forest.fit(&x, &y).unwrap();
        assert!(matches!(
            forest.predict_one(array![0.0].view()),
            Err(RecommendError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_majority_tie_break() {
        let counts = BTreeMap::from([(3, 2), (1, 2), (2, 1)]);
        assert_eq!(majority(&counts), 1);
    }
}

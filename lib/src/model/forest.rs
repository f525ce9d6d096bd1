//! Random forest: bagged CART trees with averaged leaf distributions.

use super::tree::{DecisionTreeClassifier, MaxFeatures, Tree};
use super::{check_fit_inputs, Classifier, FittedClassifier};
use crate::error::{ObesityError, Result};
use ndarray::Array2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Random forest hyperparameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomForestClassifier {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    /// Draw a bootstrap sample per tree; otherwise every tree sees all rows.
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for RandomForestClassifier {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            seed: 42,
        }
    }
}

impl RandomForestClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n;
        self
    }

    pub fn max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn min_samples_split(mut self, n: usize) -> Self {
        self.min_samples_split = n;
        self
    }

    pub fn min_samples_leaf(mut self, n: usize) -> Self {
        self.min_samples_leaf = n;
        self
    }

    pub fn max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn tree_params(&self) -> DecisionTreeClassifier {
        DecisionTreeClassifier {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            max_features: self.max_features,
            seed: self.seed,
        }
    }
}

impl Classifier for RandomForestClassifier {
    type Fitted = FittedRandomForest;

    fn fit(&self, x: &Array2<f64>, y: &[usize], n_classes: usize) -> Result<Self::Fitted> {
        check_fit_inputs(x, y, n_classes)?;
        if self.n_estimators == 0 {
            return Err(ObesityError::InvalidParameter(
                "n_estimators must be positive".to_string(),
            ));
        }
        let tree_params = self.tree_params();
        tree_params.validate_params()?;

        let n = y.len();
        let mut trees = Vec::with_capacity(self.n_estimators);
        for i in 0..self.n_estimators {
            let tree_seed = self.seed.wrapping_add(i as u64);
            let indices: Vec<usize> = if self.bootstrap {
                let mut rng = ChaCha8Rng::seed_from_u64(tree_seed);
                (0..n).map(|_| rng.gen_range(0..n)).collect()
            } else {
                (0..n).collect()
            };
            // Feature sampling uses its own stream so it does not depend on n.
            let tree = tree_params.grow(x, y, n_classes, indices, tree_seed ^ 0x9E37_79B9);
            log::debug!(
                "Forest tree {}/{}: {} nodes, depth {}",
                i + 1,
                self.n_estimators,
                tree.n_nodes(),
                tree.depth()
            );
            trees.push(tree);
        }

        Ok(FittedRandomForest {
            trees,
            n_features: x.ncols(),
            n_classes,
        })
    }

    fn name(&self) -> &'static str {
        "random_forest"
    }
}

/// Fitted [`RandomForestClassifier`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedRandomForest {
    trees: Vec<Tree>,
    n_features: usize,
    n_classes: usize,
}

impl FittedRandomForest {
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }
}

impl FittedClassifier for FittedRandomForest {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_features(x)?;
        let mut out = Array2::<f64>::zeros((x.nrows(), self.n_classes));
        for (row, mut target) in x.rows().into_iter().zip(out.rows_mut()) {
            for tree in &self.trees {
                for (t, v) in target.iter_mut().zip(tree.leaf_value(row)) {
                    *t += v;
                }
            }
        }
        out /= self.trees.len() as f64;
        Ok(out)
    }

    fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(ObesityError::ArtifactCorrupt(
                "random forest has no trees".to_string(),
            ));
        }
        for tree in &self.trees {
            tree.validate(self.n_features, self.n_classes)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn blobs() -> (Array2<f64>, Vec<usize>) {
        let mut rows = Vec::new();
        let mut y = Vec::new();
        for i in 0..30 {
            let class = i % 3;
            let jitter = (i as f64 * 0.37).sin() * 0.4;
            rows.extend_from_slice(&[class as f64 * 5.0 + jitter, 1.0 - jitter, jitter]);
            y.push(class);
        }
        (Array2::from_shape_vec((30, 3), rows).unwrap(), y)
    }

    #[test]
    fn test_forest_learns_blobs() {
        let (x, y) = blobs();
        let fitted = RandomForestClassifier::new()
            .n_estimators(15)
            .max_features(MaxFeatures::All)
            .fit(&x, &y, 3)
            .unwrap();
        assert_eq!(fitted.n_trees(), 15);
        assert_eq!(fitted.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_forest_proba_rows_sum_to_one() {
        let (x, y) = blobs();
        let fitted = RandomForestClassifier::new()
            .n_estimators(10)
            .fit(&x, &y, 3)
            .unwrap();
        let proba = fitted.predict_proba(&x).unwrap();
        for row in proba.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_forest_is_deterministic_per_seed() {
        let (x, y) = blobs();
        let model = RandomForestClassifier::new().n_estimators(5).seed(9);
        let a = model.fit(&x, &y, 3).unwrap();
        let b = model.fit(&x, &y, 3).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_forest_rejects_zero_estimators() {
        let (x, y) = blobs();
        assert!(matches!(
            RandomForestClassifier::new().n_estimators(0).fit(&x, &y, 3),
            Err(ObesityError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_forest_feature_mismatch() {
        let (x, y) = blobs();
        let fitted = RandomForestClassifier::new()
            .n_estimators(3)
            .fit(&x, &y, 3)
            .unwrap();
        assert!(matches!(
            fitted.predict_proba(&array![[1.0, 2.0]]),
            Err(ObesityError::FeatureMismatch { .. })
        ));
    }
}

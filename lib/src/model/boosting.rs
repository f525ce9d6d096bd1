//! Gradient boosted trees with a softmax objective.
//!
//! Each round fits one regression tree per class on the second-order
//! expansion of the multiclass log loss:
//!
//! ```text
//! g = p_k - [y == k]        h = max(2 p_k (1 - p_k), 1e-16)
//! leaf weight  w = -G / (H + lambda)
//! split gain     = 1/2 [G_L^2/(H_L+lambda) + G_R^2/(H_R+lambda) - G^2/(H+lambda)] - gamma
//! ```
//!
//! Leaf weights are stored already multiplied by the learning rate.

use super::tree::{Node, Tree};
use super::{check_fit_inputs, softmax_in_place, Classifier, FittedClassifier};
use crate::error::{ObesityError, Result};
use ndarray::Array2;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

const MIN_HESSIAN: f64 = 1e-16;

/// Boosting hyperparameters, named after their XGBoost counterparts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientBoostingClassifier {
    pub n_estimators: usize,
    /// Shrinkage applied to every leaf weight (`eta`).
    pub learning_rate: f64,
    pub max_depth: usize,
    /// Minimum hessian sum in each child.
    pub min_child_weight: f64,
    /// L2 regularization on leaf weights.
    pub lambda: f64,
    /// Minimum loss reduction required to split.
    pub gamma: f64,
    /// Fraction of rows sampled (without replacement) per round.
    pub subsample: f64,
    pub seed: u64,
}

impl Default for GradientBoostingClassifier {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.3,
            max_depth: 6,
            min_child_weight: 1.0,
            lambda: 1.0,
            gamma: 0.0,
            subsample: 1.0,
            seed: 42,
        }
    }
}

impl GradientBoostingClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n;
        self
    }

    pub fn learning_rate(mut self, eta: f64) -> Self {
        self.learning_rate = eta;
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn min_child_weight(mut self, w: f64) -> Self {
        self.min_child_weight = w;
        self
    }

    pub fn lambda(mut self, lambda: f64) -> Self {
        self.lambda = lambda;
        self
    }

    pub fn gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn subsample(mut self, fraction: f64) -> Self {
        self.subsample = fraction;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn validate_params(&self) -> Result<()> {
        let invalid = |msg: &str| Err(ObesityError::InvalidParameter(msg.to_string()));
        if self.n_estimators == 0 {
            return invalid("n_estimators must be positive");
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return invalid("learning_rate must be a positive number");
        }
        if self.max_depth == 0 {
            return invalid("max_depth must be positive");
        }
        if !(self.subsample > 0.0 && self.subsample <= 1.0) {
            return invalid("subsample must be in (0, 1]");
        }
        if self.lambda < 0.0 || self.gamma < 0.0 || self.min_child_weight < 0.0 {
            return invalid("lambda, gamma and min_child_weight must be non-negative");
        }
        Ok(())
    }
}

struct BoostBuilder<'a> {
    x: &'a Array2<f64>,
    grad: &'a [f64],
    hess: &'a [f64],
    params: &'a GradientBoostingClassifier,
    nodes: Vec<Node>,
}

impl BoostBuilder<'_> {
    fn score(&self, g: f64, h: f64) -> f64 {
        g * g / (h + self.params.lambda)
    }

    fn build(&mut self, indices: Vec<usize>, depth: usize) -> usize {
        let g: f64 = indices.iter().map(|&i| self.grad[i]).sum();
        let h: f64 = indices.iter().map(|&i| self.hess[i]).sum();
        let node_id = self.nodes.len();
        self.nodes.push(Node::Leaf {
            value: vec![-g / (h + self.params.lambda) * self.params.learning_rate],
        });

        if depth >= self.params.max_depth || indices.len() < 2 {
            return node_id;
        }

        let parent_score = self.score(g, h);
        let mut best: Option<(usize, f64, f64)> = None;
        let mut sorted: Vec<(f64, usize)> = Vec::with_capacity(indices.len());

        for feature in 0..self.x.ncols() {
            sorted.clear();
            sorted.extend(indices.iter().map(|&i| (self.x[[i, feature]], i)));
            sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

            let (mut gl, mut hl) = (0.0, 0.0);
            for pos in 0..sorted.len() - 1 {
                let (value, i) = sorted[pos];
                gl += self.grad[i];
                hl += self.hess[i];

                let next = sorted[pos + 1].0;
                if next.is_nan() {
                    break;
                }
                if value == next {
                    continue;
                }
                let (gr, hr) = (g - gl, h - hl);
                if hl < self.params.min_child_weight || hr < self.params.min_child_weight {
                    continue;
                }
                let gain = 0.5 * (self.score(gl, hl) + self.score(gr, hr) - parent_score)
                    - self.params.gamma;
                if gain > 0.0 && best.map_or(true, |(_, _, b)| gain > b + 1e-12) {
                    let mid = value + (next - value) / 2.0;
                    let threshold = if mid < next { mid } else { value };
                    best = Some((feature, threshold, gain));
                }
            }
        }

        let Some((feature, threshold, _)) = best else {
            return node_id;
        };
        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| self.x[[i, feature]] <= threshold);
        let left = self.build(left_idx, depth + 1);
        let right = self.build(right_idx, depth + 1);
        self.nodes[node_id] = Node::Split {
            feature,
            threshold,
            left,
            right,
        };
        node_id
    }
}

impl Classifier for GradientBoostingClassifier {
    type Fitted = FittedGradientBoosting;

    fn fit(&self, x: &Array2<f64>, y: &[usize], n_classes: usize) -> Result<Self::Fitted> {
        check_fit_inputs(x, y, n_classes)?;
        self.validate_params()?;

        let n = y.len();
        let sample_size = ((n as f64 * self.subsample).ceil() as usize).clamp(1, n);
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut margins = Array2::<f64>::zeros((n, n_classes));
        let mut rounds: Vec<Vec<Tree>> = Vec::with_capacity(self.n_estimators);
        let mut grad = vec![0.0; n];
        let mut hess = vec![0.0; n];

        for round in 0..self.n_estimators {
            let mut proba = margins.clone();
            softmax_in_place(&mut proba);

            let indices: Vec<usize> = if sample_size < n {
                let mut all: Vec<usize> = (0..n).collect();
                all.shuffle(&mut rng);
                all.truncate(sample_size);
                all.sort_unstable();
                all
            } else {
                (0..n).collect()
            };

            let mut class_trees = Vec::with_capacity(n_classes);
            for k in 0..n_classes {
                for i in 0..n {
                    let p = proba[[i, k]];
                    let target = if y[i] == k { 1.0 } else { 0.0 };
                    grad[i] = p - target;
                    hess[i] = (2.0 * p * (1.0 - p)).max(MIN_HESSIAN);
                }
                let mut builder = BoostBuilder {
                    x,
                    grad: &grad,
                    hess: &hess,
                    params: self,
                    nodes: Vec::new(),
                };
                builder.build(indices.clone(), 0);
                let tree = Tree::from_nodes(builder.nodes);

                for (i, row) in x.rows().into_iter().enumerate() {
                    margins[[i, k]] += tree.leaf_value(row)[0];
                }
                class_trees.push(tree);
            }

            log::debug!(
                "Boosting round {}/{}: {} nodes",
                round + 1,
                self.n_estimators,
                class_trees.iter().map(Tree::n_nodes).sum::<usize>()
            );
            rounds.push(class_trees);
        }

        Ok(FittedGradientBoosting {
            rounds,
            n_features: x.ncols(),
            n_classes,
        })
    }

    fn name(&self) -> &'static str {
        "xgb_boosting"
    }
}

/// Fitted [`GradientBoostingClassifier`]: one tree per class per round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedGradientBoosting {
    rounds: Vec<Vec<Tree>>,
    n_features: usize,
    n_classes: usize,
}

impl FittedGradientBoosting {
    pub fn n_rounds(&self) -> usize {
        self.rounds.len()
    }

    /// Raw class margins before the softmax.
    pub fn decision_function(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_features(x)?;
        let mut margins = Array2::<f64>::zeros((x.nrows(), self.n_classes));
        for (row, mut target) in x.rows().into_iter().zip(margins.rows_mut()) {
            for class_trees in &self.rounds {
                for (t, tree) in target.iter_mut().zip(class_trees) {
                    *t += tree.leaf_value(row)[0];
                }
            }
        }
        Ok(margins)
    }
}

impl FittedClassifier for FittedGradientBoosting {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let mut proba = self.decision_function(x)?;
        softmax_in_place(&mut proba);
        Ok(proba)
    }

    fn validate(&self) -> Result<()> {
        if self.rounds.is_empty() {
            return Err(ObesityError::ArtifactCorrupt(
                "boosted model has no rounds".to_string(),
            ));
        }
        for class_trees in &self.rounds {
            if class_trees.len() != self.n_classes {
                return Err(ObesityError::ArtifactCorrupt(format!(
                    "boosting round has {} trees for {} classes",
                    class_trees.len(),
                    self.n_classes
                )));
            }
            for tree in class_trees {
                tree.validate(self.n_features, 1)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn data() -> (Array2<f64>, Vec<usize>) {
        let x = array![
            [0.0, 1.0],
            [0.5, 1.2],
            [1.0, 0.8],
            [5.0, 1.1],
            [5.5, 0.9],
            [6.0, 1.0],
            [10.0, 1.0],
            [10.5, 0.7],
            [11.0, 1.3],
        ];
        (x, vec![0, 0, 0, 1, 1, 1, 2, 2, 2])
    }

    #[test]
    fn test_boosting_fits_training_data() {
        let (x, y) = data();
        let fitted = GradientBoostingClassifier::new()
            .n_estimators(20)
            .min_child_weight(0.0)
            .fit(&x, &y, 3)
            .unwrap();
        assert_eq!(fitted.n_rounds(), 20);
        assert_eq!(fitted.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_boosting_proba_is_softmax() {
        let (x, y) = data();
        let fitted = GradientBoostingClassifier::new()
            .n_estimators(5)
            .min_child_weight(0.0)
            .fit(&x, &y, 3)
            .unwrap();
        let proba = fitted.predict_proba(&x).unwrap();
        for row in proba.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-9);
            assert!(row.iter().all(|&p| p > 0.0 && p < 1.0));
        }
    }

    #[test]
    fn test_boosting_first_leaf_weight() {
        let x = array![[1.0], [1.0]];
        let fitted = GradientBoostingClassifier::new()
            .n_estimators(1)
            .lambda(0.0)
            .learning_rate(1.0)
            .fit(&x, &[0, 0], 2)
            .unwrap();
        let margins = fitted.decision_function(&array![[1.0]]).unwrap();
        // p = 0.5, g = -0.5 per row, h = 0.5 per row -> w = 1.0
        assert!((margins[[0, 0]] - 1.0).abs() < 1e-12);
        assert!((margins[[0, 1]] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_boosting_gamma_prunes_splits() {
        let (x, y) = data();
        let fitted = GradientBoostingClassifier::new()
            .n_estimators(1)
            .gamma(1e6)
            .fit(&x, &y, 3)
            .unwrap();
        assert!(fitted
            .rounds
            .iter()
            .flatten()
            .all(|tree| tree.n_nodes() == 1));
    }

    #[test]
    fn test_boosting_subsample_is_seeded() {
        let (x, y) = data();
        let model = GradientBoostingClassifier::new()
            .n_estimators(4)
            .subsample(0.6)
            .min_child_weight(0.0);
        assert_eq!(model.fit(&x, &y, 3).unwrap(), model.fit(&x, &y, 3).unwrap());
    }

    #[test]
    fn test_boosting_rejects_bad_params() {
        let (x, y) = data();
        for model in [
            GradientBoostingClassifier::new().learning_rate(0.0),
            GradientBoostingClassifier::new().subsample(1.5),
            GradientBoostingClassifier::new().max_depth(0),
            GradientBoostingClassifier::new().lambda(-1.0),
        ] {
            assert!(matches!(
                model.fit(&x, &y, 3),
                Err(ObesityError::InvalidParameter(_))
            ));
        }
    }
}

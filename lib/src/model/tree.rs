//! CART decision trees.
//!
//! [`Tree`] is the flat node table shared by every tree-based estimator. Its
//! leaves hold a value vector: a class distribution for classification trees,
//! a single weight for the boosting regression trees.
//!
//! [`DecisionTreeClassifier`] grows a classification tree with Gini impurity.

use super::{check_fit_inputs, Classifier, FittedClassifier};
use crate::error::{ObesityError, Result};
use ndarray::{Array2, ArrayView1};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// One node of a fitted tree. Samples with `x[feature] <= threshold` go left.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f64>,
    },
}

/// A fitted tree; the root is node 0.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub(crate) fn from_nodes(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Leaf value reached by `row`.
    pub fn leaf_value(&self, row: ArrayView1<f64>) -> &[f64] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                Node::Leaf { value } => return value,
            }
        }
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    /// Length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match &nodes[idx] {
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
                Node::Leaf { .. } => 0,
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }

    /// Check a deserialized node table: children point forward, features and
    /// leaf widths are in range.
    pub fn validate(&self, n_features: usize, value_len: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(ObesityError::ArtifactCorrupt("tree has no nodes".to_string()));
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split {
                    feature,
                    left,
                    right,
                    ..
                } => {
                    let bad_child = |c: usize| c <= idx || c >= self.nodes.len();
                    if *feature >= n_features || bad_child(*left) || bad_child(*right) {
                        return Err(ObesityError::ArtifactCorrupt(format!(
                            "tree node {} is malformed",
                            idx
                        )));
                    }
                }
                Node::Leaf { value } => {
                    if value.len() != value_len {
                        return Err(ObesityError::ArtifactCorrupt(format!(
                            "tree leaf {} has {} values, expected {}",
                            idx,
                            value.len(),
                            value_len
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Number of features considered at each split.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum MaxFeatures {
    #[default]
    All,
    Sqrt,
    Log2,
    Count(usize),
}

impl MaxFeatures {
    pub fn resolve(self, n_features: usize) -> usize {
        let k = match self {
            MaxFeatures::All => n_features,
            MaxFeatures::Sqrt => (n_features as f64).sqrt() as usize,
            MaxFeatures::Log2 => (n_features as f64).log2() as usize,
            MaxFeatures::Count(k) => k,
        };
        k.clamp(1, n_features.max(1))
    }
}

/// CART classifier using Gini impurity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionTreeClassifier {
    /// Maximum depth; `None` grows until leaves are pure or too small.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    /// Seed for feature subsampling.
    pub seed: u64,
}

impl Default for DecisionTreeClassifier {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::All,
            seed: 42,
        }
    }
}

impl DecisionTreeClassifier {
    pub fn new() -> Self {
        Self::default()
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

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub(crate) fn validate_params(&self) -> Result<()> {
        if self.min_samples_split < 2 {
            return Err(ObesityError::InvalidParameter(
                "min_samples_split must be at least 2".to_string(),
            ));
        }
        if self.min_samples_leaf < 1 {
            return Err(ObesityError::InvalidParameter(
                "min_samples_leaf must be at least 1".to_string(),
            ));
        }
        if self.max_depth == Some(0) {
            return Err(ObesityError::InvalidParameter(
                "max_depth must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Grow a tree on the rows named by `indices` (duplicates allowed).
    pub(crate) fn grow(
        &self,
        x: &Array2<f64>,
        y: &[usize],
        n_classes: usize,
        indices: Vec<usize>,
        seed: u64,
    ) -> Tree {
        let mut builder = GiniBuilder {
            x,
            y,
            n_classes,
            params: self,
            max_features: self.max_features.resolve(x.ncols()),
            rng: ChaCha8Rng::seed_from_u64(seed),
            nodes: Vec::new(),
        };
        builder.build(indices, 0);
        Tree::from_nodes(builder.nodes)
    }
}

fn gini(counts: &[f64], total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    1.0 - counts.iter().map(|c| (c / total).powi(2)).sum::<f64>()
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

struct GiniBuilder<'a> {
    x: &'a Array2<f64>,
    y: &'a [usize],
    n_classes: usize,
    params: &'a DecisionTreeClassifier,
    max_features: usize,
    rng: ChaCha8Rng,
    nodes: Vec<Node>,
}

impl GiniBuilder<'_> {
    fn build(&mut self, indices: Vec<usize>, depth: usize) -> usize {
        let mut counts = vec![0.0; self.n_classes];
        for &i in &indices {
            counts[self.y[i]] += 1.0;
        }
        let n = indices.len() as f64;
        let node_id = self.nodes.len();
        self.nodes.push(Node::Leaf {
            value: counts.iter().map(|c| c / n).collect(),
        });

        let pure = counts.iter().filter(|&&c| c > 0.0).count() <= 1;
        let depth_reached = self.params.max_depth.is_some_and(|d| depth >= d);
        if pure || depth_reached || indices.len() < self.params.min_samples_split {
            return node_id;
        }

        let Some(split) = self.best_split(&indices, &counts) else {
            return node_id;
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| self.x[[i, split.feature]] <= split.threshold);

        let left = self.build(left_idx, depth + 1);
        let right = self.build(right_idx, depth + 1);
        self.nodes[node_id] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        node_id
    }

    fn candidate_features(&mut self) -> Vec<usize> {
        let n_features = self.x.ncols();
        let mut features: Vec<usize> = (0..n_features).collect();
        if self.max_features < n_features {
            features.shuffle(&mut self.rng);
            features.truncate(self.max_features);
            features.sort_unstable();
        }
        features
    }

    fn best_split(&mut self, indices: &[usize], counts: &[f64]) -> Option<SplitCandidate> {
        let min_leaf = self.params.min_samples_leaf;
        let n = indices.len();
        let mut best: Option<SplitCandidate> = None;
        let mut sorted: Vec<(f64, usize)> = Vec::with_capacity(n);

        for feature in self.candidate_features() {
            sorted.clear();
            sorted.extend(indices.iter().map(|&i| (self.x[[i, feature]], self.y[i])));
            sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left = vec![0.0; self.n_classes];
            let mut right = counts.to_vec();

            for pos in 0..n - 1 {
                let (value, class) = sorted[pos];
                left[class] += 1.0;
                right[class] -= 1.0;

                let next = sorted[pos + 1].0;
                if next.is_nan() {
                    break;
                }
                if value == next {
                    continue;
                }
                let n_left = pos + 1;
                let n_right = n - n_left;
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }

                let impurity = (n_left as f64 * gini(&left, n_left as f64)
                    + n_right as f64 * gini(&right, n_right as f64))
                    / n as f64;

                if best.as_ref().map_or(true, |b| impurity < b.impurity - 1e-12) {
                    let mid = value + (next - value) / 2.0;
                    let threshold = if mid < next { mid } else { value };
                    best = Some(SplitCandidate {
                        feature,
                        threshold,
                        impurity,
                    });
                }
            }
        }
        best
    }
}

impl Classifier for DecisionTreeClassifier {
    type Fitted = FittedDecisionTree;

    fn fit(&self, x: &Array2<f64>, y: &[usize], n_classes: usize) -> Result<Self::Fitted> {
        check_fit_inputs(x, y, n_classes)?;
        self.validate_params()?;

        let tree = self.grow(x, y, n_classes, (0..y.len()).collect(), self.seed);
        log::debug!(
            "Fitted decision tree: {} nodes, depth {}",
            tree.n_nodes(),
            tree.depth()
        );

        Ok(FittedDecisionTree {
            tree,
            n_features: x.ncols(),
            n_classes,
        })
    }

    fn name(&self) -> &'static str {
        "decision_tree"
    }
}

/// Fitted [`DecisionTreeClassifier`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedDecisionTree {
    tree: Tree,
    n_features: usize,
    n_classes: usize,
}

impl FittedDecisionTree {
    pub fn tree(&self) -> &Tree {
        &self.tree
    }
}

impl FittedClassifier for FittedDecisionTree {
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
            target.assign(&ArrayView1::from(self.tree.leaf_value(row)));
        }
        Ok(out)
    }

    fn validate(&self) -> Result<()> {
        self.tree.validate(self.n_features, self.n_classes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn separable() -> (Array2<f64>, Vec<usize>) {
        let x = array![
            [1.0, 5.0],
            [2.0, 4.0],
            [3.0, 5.0],
            [10.0, 4.0],
            [11.0, 5.0],
            [12.0, 4.0],
            [20.0, 0.0],
            [21.0, 1.0],
        ];
        (x, vec![0, 0, 0, 1, 1, 1, 2, 2])
    }

    #[test]
    fn test_tree_fits_separable_data() {
        let (x, y) = separable();
        let fitted = DecisionTreeClassifier::new().fit(&x, &y, 3).unwrap();
        assert_eq!(fitted.predict(&x).unwrap(), y);
        assert_eq!(fitted.tree().n_leaves(), 3);
    }

    #[test]
    fn test_tree_threshold_is_midpoint() {
        let x = array![[1.0], [3.0]];
        let fitted = DecisionTreeClassifier::new().fit(&x, &[0, 1], 2).unwrap();
        match &fitted.tree().nodes[0] {
            Node::Split { threshold, .. } => assert_eq!(*threshold, 2.0),
            other => panic!("expected split, got {:?}", other),
        }
    }

    #[test]
    fn test_tree_max_depth_limits_growth() {
        let (x, y) = separable();
        let fitted = DecisionTreeClassifier::new()
            .max_depth(Some(1))
            .fit(&x, &y, 3)
            .unwrap();
        assert_eq!(fitted.tree().depth(), 1);
        let proba = fitted.predict_proba(&x).unwrap();
        for row in proba.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_tree_min_samples_leaf() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let fitted = DecisionTreeClassifier::new()
            .min_samples_leaf(2)
            .fit(&x, &[0, 1, 1, 1], 2)
            .unwrap();
        assert_eq!(fitted.tree().n_leaves(), 2);
    }

    #[test]
    fn test_tree_constant_features_make_a_leaf() {
        let x = array![[1.0], [1.0], [1.0]];
        let fitted = DecisionTreeClassifier::new().fit(&x, &[0, 1, 1], 2).unwrap();
        assert_eq!(fitted.tree().n_nodes(), 1);
        let proba = fitted.predict_proba(&array![[1.0]]).unwrap();
        assert!((proba[[0, 1]] - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_tree_rejects_bad_params() {
        let (x, y) = separable();
        assert!(DecisionTreeClassifier::new()
            .min_samples_split(1)
            .fit(&x, &y, 3)
            .is_err());
        assert!(DecisionTreeClassifier::new()
            .max_depth(Some(0))
            .fit(&x, &y, 3)
            .is_err());
    }

    #[test]
    fn test_tree_validate_catches_bad_nodes() {
        let tree = Tree::from_nodes(vec![Node::Split {
            feature: 0,
            threshold: 0.0,
            left: 0,
            right: 5,
        }]);
        assert!(tree.validate(1, 2).is_err());

        let tree = Tree::from_nodes(vec![Node::Leaf {
            value: vec![1.0],
        }]);
        assert!(tree.validate(1, 2).is_err());
        assert!(tree.validate(1, 1).is_ok());
    }

    #[test]
    fn test_max_features_resolve() {
        assert_eq!(MaxFeatures::All.resolve(20), 20);
        assert_eq!(MaxFeatures::Sqrt.resolve(20), 4);
        assert_eq!(MaxFeatures::Log2.resolve(20), 4);
        assert_eq!(MaxFeatures::Count(50).resolve(20), 20);
        assert_eq!(MaxFeatures::Sqrt.resolve(1), 1);
    }
}

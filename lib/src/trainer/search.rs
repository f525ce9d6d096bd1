//! Hyperparameter search over built-in estimator configurations.
//!
//! Candidates are ranked by their mean cross-validated score on one metric.
//! [`grid_search`] tries every candidate; [`random_search`] tries a seeded
//! sample of them.

use super::cross_validation::{cross_validate, CrossValidationOptions};
use crate::dataset::LabeledDataset;
use crate::error::{ObesityError, Result};
use crate::metrics::Metric;
use crate::model::{
    Classifier, EstimatorConfig, GradientBoostingClassifier, MaxFeatures,
    RandomForestClassifier,
};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Cross-validated score of one candidate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub config: EstimatorConfig,
    pub mean: f64,
    pub std: f64,
}

/// Outcome of a search. `ranking` is sorted best first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub metric: Metric,
    pub best: EstimatorConfig,
    pub best_score: f64,
    pub ranking: Vec<CandidateScore>,
}

/// Score every candidate and rank them. Equal scores keep candidate order.
///
/// # Errors
/// Returns [`ObesityError::InvalidParameter`] for an empty candidate list,
/// plus anything [`cross_validate`] returns.
pub fn grid_search(
    dataset: &LabeledDataset,
    candidates: &[EstimatorConfig],
    metric: Metric,
    cv: &CrossValidationOptions,
) -> Result<SearchResult> {
    if candidates.is_empty() {
        return Err(ObesityError::InvalidParameter(
            "search needs at least one candidate".to_string(),
        ));
    }

    let mut ranking = Vec::with_capacity(candidates.len());
    for (i, config) in candidates.iter().enumerate() {
        let result = cross_validate(dataset, config, cv)?;
        let (mean, std) = (result.mean(metric), result.std(metric));
        log::info!(
            "Candidate {}/{} ({}): {} {:.4} ± {:.4}",
            i + 1,
            candidates.len(),
            config.name(),
            metric,
            mean,
            std
        );
        ranking.push(CandidateScore {
            config: config.clone(),
            mean,
            std,
        });
    }

    ranking.sort_by(|a, b| b.mean.total_cmp(&a.mean));
    let best = ranking[0].config.clone();
    let best_score = ranking[0].mean;
    Ok(SearchResult {
        metric,
        best,
        best_score,
        ranking,
    })
}

/// Score `n_iter` candidates drawn without replacement.
pub fn random_search(
    dataset: &LabeledDataset,
    candidates: &[EstimatorConfig],
    n_iter: usize,
    metric: Metric,
    cv: &CrossValidationOptions,
) -> Result<SearchResult> {
    if n_iter == 0 {
        return Err(ObesityError::InvalidParameter(
            "n_iter must be positive".to_string(),
        ));
    }
    let mut rng = ChaCha8Rng::seed_from_u64(cv.seed);
    let sampled: Vec<EstimatorConfig> = candidates
        .choose_multiple(&mut rng, n_iter.min(candidates.len()))
        .cloned()
        .collect();
    grid_search(dataset, &sampled, metric, cv)
}

/// Cartesian product of random forest settings.
pub fn forest_grid(
    n_estimators: &[usize],
    max_depth: &[Option<usize>],
    max_features: &[MaxFeatures],
    seed: u64,
) -> Vec<EstimatorConfig> {
    let mut out = Vec::new();
    for &n in n_estimators {
        for &depth in max_depth {
            for &features in max_features {
                out.push(
                    RandomForestClassifier::new()
                        .n_estimators(n)
                        .max_depth(depth)
                        .max_features(features)
                        .seed(seed)
                        .into(),
                );
            }
        }
    }
    out
}

/// Cartesian product of boosting settings.
pub fn boosting_grid(
    n_estimators: &[usize],
    max_depth: &[usize],
    learning_rate: &[f64],
    seed: u64,
) -> Vec<EstimatorConfig> {
    let mut out = Vec::new();
    for &n in n_estimators {
        for &depth in max_depth {
            for &eta in learning_rate {
                out.push(
                    GradientBoostingClassifier::new()
                        .n_estimators(n)
                        .max_depth(depth)
                        .learning_rate(eta)
                        .seed(seed)
                        .into(),
                );
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::generate_survey;
    use crate::model::DecisionTreeClassifier;

    #[test]
    fn test_grids_are_cartesian() {
        assert_eq!(
            forest_grid(&[10, 20], &[None, Some(5)], &[MaxFeatures::Sqrt], 0).len(),
            4
        );
        assert_eq!(boosting_grid(&[5], &[2, 3, 4], &[0.1, 0.3], 0).len(), 6);
    }

    #[test]
    fn test_grid_search_ranks_best_first() {
        let ds = generate_survey(70, 5);
        let candidates: Vec<EstimatorConfig> = vec![
            DecisionTreeClassifier::new().max_depth(Some(1)).into(),
            DecisionTreeClassifier::new().max_depth(Some(6)).into(),
        ];
        let cv = CrossValidationOptions::new().n_folds(3);
        let result = grid_search(&ds, &candidates, Metric::Accuracy, &cv).unwrap();

        assert_eq!(result.ranking.len(), 2);
        assert!(result.ranking[0].mean >= result.ranking[1].mean);
        assert_eq!(result.best, result.ranking[0].config);
        assert_eq!(result.best_score, result.ranking[0].mean);
    }

    #[test]
    fn test_random_search_samples_subset() {
        let ds = generate_survey(42, 2);
        let candidates = boosting_grid(&[2], &[1, 2, 3], &[0.3], 0);
        let cv = CrossValidationOptions::new().n_folds(2);
        let result = random_search(&ds, &candidates, 2, Metric::F1Weighted, &cv).unwrap();
        assert_eq!(result.ranking.len(), 2);
        assert_eq!(result.metric, Metric::F1Weighted);
    }

    #[test]
    fn test_search_rejects_empty_candidates() {
        let ds = generate_survey(14, 0);
        assert!(matches!(
            grid_search(&ds, &[], Metric::Accuracy, &CrossValidationOptions::new()),
            Err(ObesityError::InvalidParameter(_))
        ));
    }
}

//! Seeded train/test splits and k-fold assignment.

use crate::error::{ObesityError, Result};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

/// Row indices of the two partitions, each sorted ascending.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

fn group_by_class(labels: &[usize]) -> BTreeMap<usize, Vec<usize>> {
    let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (i, &label) in labels.iter().enumerate() {
        groups.entry(label).or_default().push(i);
    }
    groups
}

/// Split `labels.len()` rows into train and test partitions.
///
/// The test partition holds `ceil(test_size * n)` rows. When `stratify` is
/// set, that quota is spread over the classes in proportion to their counts
/// (largest remainder first, lower class index on ties).
///
/// # Errors
/// Returns [`ObesityError::InvalidParameter`] when `test_size` is outside
/// `(0, 1)` or either partition would be empty.
pub fn train_test_split(
    labels: &[usize],
    test_size: f64,
    seed: u64,
    stratify: bool,
) -> Result<SplitIndices> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(ObesityError::InvalidParameter(format!(
            "test_size must be in (0, 1), got {}",
            test_size
        )));
    }
    let n = labels.len();
    let n_test = (test_size * n as f64).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(ObesityError::InvalidParameter(format!(
            "test_size {} leaves an empty partition for {} samples",
            test_size, n
        )));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let (mut train, mut test) = if stratify {
        let mut groups = group_by_class(labels);
        for members in groups.values_mut() {
            members.shuffle(&mut rng);
        }

        // Proportional quotas, then hand out the leftover rows.
        let mut quotas: Vec<(usize, usize, f64)> = groups
            .iter()
            .map(|(&class, members)| {
                let exact = members.len() as f64 * n_test as f64 / n as f64;
                (class, exact.floor() as usize, exact - exact.floor())
            })
            .collect();
        let assigned: usize = quotas.iter().map(|q| q.1).sum();
        let mut order: Vec<usize> = (0..quotas.len()).collect();
        order.sort_by(|&a, &b| quotas[b].2.total_cmp(&quotas[a].2).then(a.cmp(&b)));
        for &q in order.iter().take(n_test.saturating_sub(assigned)) {
            quotas[q].1 += 1;
        }

        let mut train = Vec::with_capacity(n - n_test);
        let mut test = Vec::with_capacity(n_test);
        for (class, quota, _) in quotas {
            let members = &groups[&class];
            let quota = quota.min(members.len());
            test.extend_from_slice(&members[..quota]);
            train.extend_from_slice(&members[quota..]);
        }
        (train, test)
    } else {
        let mut all: Vec<usize> = (0..n).collect();
        all.shuffle(&mut rng);
        let test = all.split_off(n - n_test);
        (all, test)
    };

    if train.is_empty() || test.is_empty() {
        return Err(ObesityError::InvalidParameter(
            "split produced an empty partition".to_string(),
        ));
    }
    train.sort_unstable();
    test.sort_unstable();
    Ok(SplitIndices { train, test })
}

/// Assign rows to `n_folds` test folds.
///
/// Stratified assignment deals each shuffled class round-robin across the
/// folds, continuing where the previous class stopped. Plain assignment
/// shuffles once and cuts contiguous folds whose sizes differ by at most one.
pub fn kfold_indices(
    labels: &[usize],
    n_folds: usize,
    shuffle: bool,
    seed: u64,
    stratify: bool,
) -> Result<Vec<Vec<usize>>> {
    let n = labels.len();
    if n_folds < 2 {
        return Err(ObesityError::InvalidParameter(format!(
            "need at least 2 folds, got {}",
            n_folds
        )));
    }
    if n_folds > n {
        return Err(ObesityError::InvalidParameter(format!(
            "cannot make {} folds from {} samples",
            n_folds, n
        )));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut folds = vec![Vec::new(); n_folds];

    if stratify {
        let mut next = 0;
        for (_, mut members) in group_by_class(labels) {
            if shuffle {
                members.shuffle(&mut rng);
            }
            for i in members {
                folds[next].push(i);
                next = (next + 1) % n_folds;
            }
        }
    } else {
        let mut all: Vec<usize> = (0..n).collect();
        if shuffle {
            all.shuffle(&mut rng);
        }
        let base = n / n_folds;
        let extra = n % n_folds;
        let mut start = 0;
        for (k, fold) in folds.iter_mut().enumerate() {
            let size = base + usize::from(k < extra);
            fold.extend_from_slice(&all[start..start + size]);
            start += size;
        }
    }

    for fold in &mut folds {
        fold.sort_unstable();
    }
    Ok(folds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> Vec<usize> {
        // 20 of class 0, 10 of class 1, 10 of class 2
        (0..40).map(|i| if i < 20 { 0 } else { 1 + i % 2 }).collect()
    }

    #[test]
    fn test_split_sizes_and_disjointness() {
        let y = labels();
        let split = train_test_split(&y, 0.3, 42, true).unwrap();
        assert_eq!(split.test.len(), 12);
        assert_eq!(split.train.len(), 28);

        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..40).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_is_stratified() {
        let y = labels();
        let split = train_test_split(&y, 0.3, 42, true).unwrap();
        let count = |class: usize| split.test.iter().filter(|&&i| y[i] == class).count();
        assert_eq!(count(0), 6);
        assert_eq!(count(1), 3);
        assert_eq!(count(2), 3);
    }

    #[test]
    fn test_split_is_reproducible() {
        let y = labels();
        let a = train_test_split(&y, 0.25, 7, true).unwrap();
        let b = train_test_split(&y, 0.25, 7, true).unwrap();
        let c = train_test_split(&y, 0.25, 8, true).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_split_unstratified() {
        let y = labels();
        let split = train_test_split(&y, 0.5, 1, false).unwrap();
        assert_eq!(split.test.len(), 20);
        assert_eq!(split.train.len(), 20);
    }

    #[test]
    fn test_split_rejects_bad_test_size() {
        let y = labels();
        for size in [0.0, 1.0, -0.1, f64::NAN] {
            assert!(matches!(
                train_test_split(&y, size, 0, true),
                Err(ObesityError::InvalidParameter(_))
            ));
        }
        assert!(train_test_split(&[0], 0.5, 0, true).is_err());
    }

    #[test]
    fn test_kfold_stratified_balance() {
        let y = labels();
        let folds = kfold_indices(&y, 5, true, 42, true).unwrap();
        assert_eq!(folds.len(), 5);
        for fold in &folds {
            assert_eq!(fold.len(), 8);
            assert_eq!(fold.iter().filter(|&&i| y[i] == 0).count(), 4);
        }
    }

    #[test]
    fn test_kfold_plain_sizes() {
        let y = vec![0; 11];
        let folds = kfold_indices(&y, 3, false, 0, false).unwrap();
        let sizes: Vec<_> = folds.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![4, 4, 3]);
        assert_eq!(folds[0], vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_kfold_rejects_bad_fold_count() {
        assert!(kfold_indices(&[0, 1], 1, true, 0, true).is_err());
        assert!(kfold_indices(&[0, 1], 3, true, 0, true).is_err());
    }
}

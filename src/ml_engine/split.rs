//! Stratified train/test split.

use rand::seq::SliceRandom;
use rand::Rng;

/// Row indices of each side of a split, ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Split rows so each class keeps roughly `test_fraction` of its rows in the
/// test side.
///
/// Per class, `round(count * test_fraction)` rows are held out, at least one
/// and never all of them once a class has two rows. A class with a single
/// row stays entirely in training.
pub fn stratified_split<R: Rng>(
    labels: &[usize],
    n_classes: usize,
    test_fraction: f64,
    rng: &mut R,
) -> SplitIndices {
    let mut by_class: Vec<Vec<usize>> = vec![Vec::new(); n_classes];
    for (row, &class) in labels.iter().enumerate() {
        if let Some(rows) = by_class.get_mut(class) {
            rows.push(row);
        }
    }

    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::new();
    for mut rows in by_class {
        rows.shuffle(rng);
        let n_test = held_out_count(rows.len(), test_fraction);
        test.extend_from_slice(&rows[..n_test]);
        train.extend_from_slice(&rows[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    SplitIndices { train, test }
}

fn held_out_count(count: usize, test_fraction: f64) -> usize {
    if count < 2 {
        return 0;
    }
    let n = (count as f64 * test_fraction).round() as usize;
    n.clamp(1, count - 1)
}

//! Random forest classifier (bagged CART trees, Gini impurity).
//!
//! Each tree is fit on a bootstrap sample and considers a random subset of
//! features at every split. Trees are fit in parallel, each with its own
//! `StdRng` derived from the forest seed and the tree index, so a given seed
//! always produces the same forest regardless of thread scheduling.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::TrainingError;
use crate::config::ForestConfig;
use crate::features::{FeatureVector, NUM_FEATURES};

/// Minimum impurity decrease for a split to be kept.
const MIN_IMPURITY_DECREASE: f64 = 1e-12;

/// Golden-ratio increment used to spread per-tree seeds.
const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Class probabilities of the training samples that reached this leaf
    Leaf { distribution: Vec<f64> },
}

/// Growth limits shared by every tree of a forest.
#[derive(Debug, Clone, Copy)]
struct TreeLimits {
    max_depth: usize,
    min_samples_split: usize,
    max_features: usize,
    n_classes: usize,
}

/// A single CART classification tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    fn fit(x: &[FeatureVector], y: &[usize], limits: TreeLimits, rng: &mut StdRng) -> Self {
        // Bootstrap sample (with replacement)
        let mut indices: Vec<usize> = (0..x.len()).map(|_| rng.gen_range(0..x.len())).collect();
        let mut tree = Self { nodes: Vec::new() };
        tree.grow(x, y, &mut indices, 0, limits, rng);
        tree
    }

    /// Grow the subtree for `indices`, returning its node index.
    fn grow(
        &mut self,
        x: &[FeatureVector],
        y: &[usize],
        indices: &mut [usize],
        depth: usize,
        limits: TreeLimits,
        rng: &mut StdRng,
    ) -> usize {
        let counts = class_counts(y, indices, limits.n_classes);
        let parent_gini = gini(&counts, indices.len());

        let splittable = depth < limits.max_depth
            && indices.len() >= limits.min_samples_split
            && parent_gini > 0.0;

        let best = if splittable {
            best_split(x, y, indices, &counts, parent_gini, limits, rng)
        } else {
            None
        };

        let Some((feature, threshold)) = best else {
            return self.push(Node::Leaf { distribution: normalize(&counts, indices.len()) });
        };

        // Partition in place: left side holds values <= threshold
        let mut boundary = 0;
        for i in 0..indices.len() {
            if x[indices[i]][feature] <= threshold {
                indices.swap(i, boundary);
                boundary += 1;
            }
        }

        let node = self.push(Node::Split { feature, threshold, left: 0, right: 0 });
        let (left_idx, right_idx) = indices.split_at_mut(boundary);
        let left = self.grow(x, y, left_idx, depth + 1, limits, rng);
        let right = self.grow(x, y, right_idx, depth + 1, limits, rng);
        if let Node::Split { left: l, right: r, .. } = &mut self.nodes[node] {
            *l = left;
            *r = right;
        }
        node
    }

    fn push(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Class distribution of the leaf `features` falls into.
    fn leaf_distribution(&self, features: &FeatureVector) -> &[f64] {
        let mut current = 0;
        loop {
            match &self.nodes[current] {
                Node::Split { feature, threshold, left, right } => {
                    current = if features[*feature] <= *threshold { *left } else { *right };
                }
                Node::Leaf { distribution } => return distribution,
            }
        }
    }

    /// Number of nodes (splits + leaves).
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Depth of the deepest leaf (root alone is depth 0).
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], at: usize) -> usize {
            match &nodes[at] {
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
}

/// Best (feature, threshold) over a random feature subset, if any split
/// lowers impurity.
fn best_split(
    x: &[FeatureVector],
    y: &[usize],
    indices: &[usize],
    parent_counts: &[usize],
    parent_gini: f64,
    limits: TreeLimits,
    rng: &mut StdRng,
) -> Option<(usize, f64)> {
    let n = indices.len();
    let mut best: Option<(usize, f64, f64)> = None;
    let mut sorted: Vec<usize> = indices.to_vec();
    let mut left_counts = vec![0usize; limits.n_classes];
    let mut right_counts = vec![0usize; limits.n_classes];

    for feature in index::sample(rng, NUM_FEATURES, limits.max_features).into_iter() {
        sorted.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]));
        left_counts.iter_mut().for_each(|c| *c = 0);
        right_counts.copy_from_slice(parent_counts);

        for pos in 0..n - 1 {
            let class = y[sorted[pos]];
            left_counts[class] += 1;
            right_counts[class] -= 1;

            let here = x[sorted[pos]][feature];
            let next = x[sorted[pos + 1]][feature];
            if here >= next {
                continue;
            }

            let n_left = pos + 1;
            let n_right = n - n_left;
            let weighted = (n_left as f64 * gini(&left_counts, n_left)
                + n_right as f64 * gini(&right_counts, n_right))
                / n as f64;

            if best.map_or(true, |(_, _, score)| weighted < score) {
                best = Some((feature, (here + next) / 2.0, weighted));
            }
        }
    }

    best.filter(|&(_, _, score)| parent_gini - score > MIN_IMPURITY_DECREASE)
        .map(|(feature, threshold, _)| (feature, threshold))
}

fn class_counts(y: &[usize], indices: &[usize], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0usize; n_classes];
    for &i in indices {
        counts[y[i]] += 1;
    }
    counts
}

fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let t = total as f64;
    1.0 - counts.iter().map(|&c| (c as f64 / t).powi(2)).sum::<f64>()
}

fn normalize(counts: &[usize], total: usize) -> Vec<f64> {
    let t = total.max(1) as f64;
    counts.iter().map(|&c| c as f64 / t).collect()
}

/// Bagged ensemble of decision trees over string class labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    classes: Vec<String>,
}

impl RandomForest {
    /// Fit a forest on feature rows `x` with class indices `y` into `classes`.
    pub fn fit(
        x: &[FeatureVector],
        y: &[usize],
        classes: Vec<String>,
        params: &ForestConfig,
        seed: u64,
    ) -> Result<Self, TrainingError> {
        if x.is_empty() {
            return Err(TrainingError::EmptyTrainingSet);
        }
        if x.len() != y.len() {
            return Err(TrainingError::ShapeMismatch { rows: x.len(), labels: y.len() });
        }
        if let Some(&bad) = y.iter().find(|&&c| c >= classes.len()) {
            return Err(TrainingError::ClassOutOfRange { class: bad, n_classes: classes.len() });
        }

        let limits = TreeLimits {
            max_depth: params.max_depth,
            min_samples_split: params.min_samples_split.max(2),
            max_features: params.features_per_split(NUM_FEATURES),
            n_classes: classes.len(),
        };

        let trees: Vec<DecisionTree> = (0..params.n_trees)
            .into_par_iter()
            .map(|t| {
                let mut rng = StdRng::seed_from_u64(seed ^ (t as u64 + 1).wrapping_mul(SEED_STRIDE));
                DecisionTree::fit(x, y, limits, &mut rng)
            })
            .collect();

        debug!(
            trees = trees.len(),
            avg_nodes = trees.iter().map(DecisionTree::n_nodes).sum::<usize>() / trees.len().max(1),
            max_features = limits.max_features,
            "Random forest fitted"
        );

        Ok(Self { trees, classes })
    }

    /// Mean class probabilities across trees, in `classes()` order.
    pub fn predict_proba(&self, features: &FeatureVector) -> Vec<f64> {
        let mut proba = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            for (p, leaf) in proba.iter_mut().zip(tree.leaf_distribution(features)) {
                *p += leaf;
            }
        }
        let n = self.trees.len().max(1) as f64;
        proba.iter_mut().for_each(|p| *p /= n);
        proba
    }

    /// Most probable class label. Ties go to the earliest class.
    pub fn predict(&self, features: &FeatureVector) -> &str {
        let proba = self.predict_proba(features);
        let mut best = 0;
        for (i, &p) in proba.iter().enumerate() {
            if p > proba[best] {
                best = i;
            }
        }
        &self.classes[best]
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(n_trees: usize) -> ForestConfig {
        ForestConfig { n_trees, max_depth: 8, min_samples_split: 2, max_features: Some(NUM_FEATURES) }
    }

    /// Two well-separated classes along feature 3.
    fn separable() -> (Vec<FeatureVector>, Vec<usize>) {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..60 {
            let mut row = [0.0; NUM_FEATURES];
            row[3] = i as f64;
            row[0] = (i % 7) as f64;
            x.push(row);
            y.push(usize::from(i >= 30));
        }
        (x, y)
    }

    #[test]
    fn test_gini() {
        assert_eq!(gini(&[5, 0], 5), 0.0);
        assert!((gini(&[5, 5], 10) - 0.5).abs() < 1e-12);
        assert_eq!(gini(&[], 0), 0.0);
    }

    #[test]
    fn test_learns_separable_classes() {
        let (x, y) = separable();
        let forest = RandomForest::fit(&x, &y, vec!["A".into(), "B".into()], &params(15), 42).unwrap();
        let mut low = [0.0; NUM_FEATURES];
        low[3] = 3.0;
        let mut high = [0.0; NUM_FEATURES];
        high[3] = 55.0;
        assert_eq!(forest.predict(&low), "A");
        assert_eq!(forest.predict(&high), "B");

        let proba = forest.predict_proba(&high);
        assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(proba[1] > 0.9);
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (x, y) = separable();
        let classes = vec!["A".to_string(), "B".to_string()];
        let a = RandomForest::fit(&x, &y, classes.clone(), &params(10), 7).unwrap();
        let b = RandomForest::fit(&x, &y, classes, &params(10), 7).unwrap();
        for probe in &x {
            assert_eq!(a.predict_proba(probe), b.predict_proba(probe));
        }
    }

    #[test]
    fn test_depth_limit_respected() {
        let (x, y) = separable();
        let mut p = params(5);
        p.max_depth = 1;
        let forest = RandomForest::fit(&x, &y, vec!["A".into(), "B".into()], &p, 1).unwrap();
        assert!(forest.trees().iter().all(|t| t.depth() <= 1));
        assert_eq!(forest.trees().len(), 5);
    }

    #[test]
    fn test_pure_node_is_single_leaf() {
        let x = vec![[1.0; NUM_FEATURES]; 10];
        let y = vec![0; 10];
        let forest = RandomForest::fit(&x, &y, vec!["Only".into()], &params(3), 3).unwrap();
        assert!(forest.trees().iter().all(|t| t.n_nodes() == 1));
        assert_eq!(forest.predict(&[0.0; NUM_FEATURES]), "Only");
    }

    #[test]
    fn test_rejects_empty_and_mismatched_input() {
        let classes = vec!["A".to_string()];
        assert!(matches!(
            RandomForest::fit(&[], &[], classes.clone(), &params(1), 0),
            Err(TrainingError::EmptyTrainingSet)
        ));
        assert!(matches!(
            RandomForest::fit(&[[0.0; NUM_FEATURES]], &[0, 0], classes, &params(1), 0),
            Err(TrainingError::ShapeMismatch { .. })
        ));
    }
}

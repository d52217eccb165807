use rand::Rng;
use tracing::trace;

use crate::error::{AnomalyError, Result};
use crate::models::path_length::isolation_score;
use crate::utils::dataset::Dataset;

/// Depth assigned to the root node.
pub const ROOT_DEPTH: usize = 1;

/// Terminal node statistics: how many training rows ended here and how deep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Leaf {
    pub size: usize,
    pub depth: usize,
}

/// Outcome of routing a sample through a tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Isolation {
    pub size: usize,
    pub depth: usize,
    pub score: f64,
}

#[derive(Debug, Clone)]
enum Node {
    Split {
        feature: usize,
        value: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
    Leaf(Leaf),
}

/// A randomized binary tree that isolates samples by splitting on random
/// features at random values.
#[derive(Debug, Clone)]
pub struct IsolationTree {
    max_depth: usize,
    min_samples: usize,
    n_samples: usize,
    n_features: usize,
    root: Option<Node>,
}

impl IsolationTree {
    pub fn new(max_depth: usize) -> Result<Self> {
        if max_depth < 1 {
            return Err(AnomalyError::InvalidArgument(format!(
                "max depth must be at least 1, {} given",
                max_depth
            )));
        }

        Ok(IsolationTree {
            max_depth,
            min_samples: 1,
            n_samples: 0,
            n_features: 0,
            root: None,
        })
    }

    /// Nodes holding this many rows or fewer are not split further.
    pub fn with_min_samples(mut self, min_samples: usize) -> Result<Self> {
        if min_samples < 1 {
            return Err(AnomalyError::InvalidArgument(format!(
                "min samples per node must be at least 1, {} given",
                min_samples
            )));
        }
        self.min_samples = min_samples;
        Ok(self)
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn min_samples(&self) -> usize {
        self.min_samples
    }

    /// Size of the subsample the tree was grown on.
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    pub fn is_trained(&self) -> bool {
        self.root.is_some()
    }

    /// Grow the tree on a subsample. Any previous structure is discarded.
    pub fn train<R: Rng + ?Sized>(&mut self, dataset: &Dataset, rng: &mut R) -> Result<()> {
        let rows = dataset.continuous_rows()?;
        if rows.is_empty() {
            return Err(AnomalyError::InvalidArgument(
                "cannot grow a tree on an empty subsample".to_string(),
            ));
        }

        let subset: Vec<&[f64]> = rows.iter().map(Vec::as_slice).collect();
        let root = self.isolate(subset, ROOT_DEPTH, rng);

        self.n_samples = rows.len();
        self.n_features = dataset.num_columns();
        self.root = Some(root);

        trace!(
            n_samples = self.n_samples,
            leaves = self.leaves().len(),
            height = self.height(),
            "isolation tree grown"
        );

        Ok(())
    }

    fn isolate<R: Rng + ?Sized>(&self, subset: Vec<&[f64]>, depth: usize, rng: &mut R) -> Node {
        let size = subset.len();

        if depth >= self.max_depth || size <= self.min_samples {
            return Node::Leaf(Leaf { size, depth });
        }

        let n_features = subset[0].len();
        if n_features == 0 {
            return Node::Leaf(Leaf { size, depth });
        }

        let feature = rng.gen_range(0..n_features);

        let mut min_val = subset[0][feature];
        let mut max_val = min_val;
        for row in subset.iter() {
            min_val = min_val.min(row[feature]);
            max_val = max_val.max(row[feature]);
        }

        // constant column, nothing left to isolate on
        if min_val == max_val {
            return Node::Leaf(Leaf { size, depth });
        }

        // strictly above the minimum, so the left side is never empty
        let value = loop {
            let candidate = rng.gen::<f64>() * (max_val - min_val) + min_val;
            if candidate > min_val {
                break candidate;
            }
        };

        let (left, right): (Vec<&[f64]>, Vec<&[f64]>) =
            subset.into_iter().partition(|row| row[feature] < value);

        if left.is_empty() || right.is_empty() {
            return Node::Leaf(Leaf { size, depth });
        }

        Node::Split {
            feature,
            value,
            left: Box::new(self.isolate(left, depth + 1, rng)),
            right: Box::new(self.isolate(right, depth + 1, rng)),
        }
    }

    fn leaf_for(&self, sample: &[f64]) -> Result<Leaf> {
        let mut node = self.root.as_ref().ok_or_else(|| {
            AnomalyError::NotFitted("isolation tree has not been trained".to_string())
        })?;

        if sample.len() != self.n_features {
            return Err(AnomalyError::InvalidArgument(format!(
                "sample has {} features, tree was trained on {}",
                sample.len(),
                self.n_features
            )));
        }

        loop {
            match node {
                Node::Split {
                    feature,
                    value,
                    left,
                    right,
                } => {
                    node = if sample[*feature] < *value {
                        left.as_ref()
                    } else {
                        right.as_ref()
                    };
                }
                Node::Leaf(leaf) => return Ok(*leaf),
            }
        }
    }

    /// Route a sample to its leaf and compute its isolation score.
    pub fn search(&self, sample: &[f64]) -> Result<Isolation> {
        let leaf = self.leaf_for(sample)?;

        Ok(Isolation {
            size: leaf.size,
            depth: leaf.depth,
            score: isolation_score(leaf.depth, leaf.size, self.n_samples),
        })
    }

    /// Every terminal node, in depth-first order.
    pub fn leaves(&self) -> Vec<Leaf> {
        let mut leaves = Vec::new();
        let mut stack: Vec<&Node> = self.root.iter().collect();

        while let Some(node) = stack.pop() {
            match node {
                Node::Split { left, right, .. } => {
                    stack.push(right);
                    stack.push(left);
                }
                Node::Leaf(leaf) => leaves.push(*leaf),
            }
        }

        leaves
    }

    /// Depth of the deepest leaf, 0 for an untrained tree.
    pub fn height(&self) -> usize {
        self.leaves().iter().map(|l| l.depth).max().unwrap_or(0)
    }
}

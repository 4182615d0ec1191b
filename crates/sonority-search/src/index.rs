//! Exact nearest-neighbor index over normalized feature vectors.
//!
//! A ball tree: every node covers a contiguous range of a row permutation
//! and stores the centroid and radius of the points in that range. Queries
//! descend closer child first and prune any ball whose nearest possible
//! point is farther than the current k-th best.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use sonority_core::model::{FeatureVector, FEATURE_COUNT};

/// Default number of points at which a node stops splitting.
pub const DEFAULT_LEAF_SIZE: usize = 40;

/// Slack applied when pruning, so rounding in the triangle-inequality bound
/// never discards a true neighbor.
const PRUNE_EPSILON: f64 = 1e-9;

/// One query result: the row in the indexed matrix and its distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub row: usize,
    pub distance: f64,
}

impl Eq for Neighbor {}

impl Ord for Neighbor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.row.cmp(&other.row))
    }
}

impl PartialOrd for Neighbor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone)]
struct Node {
    start: usize,
    end: usize,
    center: FeatureVector,
    radius: f64,
    children: Option<(usize, usize)>,
}

/// Ball tree over a fixed set of points.
///
/// Results are exact Euclidean nearest neighbors in ascending distance;
/// equal distances are ordered by ascending row.
#[derive(Debug, Clone)]
pub struct BallTree {
    points: Vec<FeatureVector>,
    order: Vec<usize>,
    nodes: Vec<Node>,
}

impl BallTree {
    /// Build with [`DEFAULT_LEAF_SIZE`].
    #[must_use]
    pub fn build(points: Vec<FeatureVector>) -> Self {
        Self::with_leaf_size(points, DEFAULT_LEAF_SIZE)
    }

    /// Build with a custom leaf size (clamped to at least 1).
    #[must_use]
    pub fn with_leaf_size(points: Vec<FeatureVector>, leaf_size: usize) -> Self {
        let mut tree = Self {
            order: (0..points.len()).collect(),
            points,
            nodes: Vec::new(),
        };
        if !tree.points.is_empty() {
            tree.split(0, tree.points.len(), leaf_size.max(1));
        }
        tree
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The indexed point at `row`.
    #[must_use]
    pub fn point(&self, row: usize) -> Option<&FeatureVector> {
        self.points.get(row)
    }

    /// Up to `k` nearest rows to `query`, closest first.
    #[must_use]
    pub fn query(&self, query: &FeatureVector, k: usize) -> Vec<Neighbor> {
        let k = k.min(self.points.len());
        if k == 0 {
            return Vec::new();
        }

        let mut best = BinaryHeap::with_capacity(k + 1);
        self.search(0, query, k, &mut best);
        best.into_sorted_vec()
    }

    /// Linear scan with the same ordering as [`query`](Self::query).
    #[must_use]
    pub fn brute_force(&self, query: &FeatureVector, k: usize) -> Vec<Neighbor> {
        let mut all: Vec<Neighbor> = self
            .points
            .iter()
            .enumerate()
            .map(|(row, p)| Neighbor {
                row,
                distance: euclidean(p, query),
            })
            .collect();
        all.sort_unstable();
        all.truncate(k);
        all
    }

    fn split(&mut self, start: usize, end: usize, leaf_size: usize) -> usize {
        let center = self.centroid(start, end);
        let radius = self.order[start..end]
            .iter()
            .map(|&row| euclidean(&self.points[row], &center))
            .fold(0.0, f64::max);

        let id = self.nodes.len();
        self.nodes.push(Node {
            start,
            end,
            center,
            radius,
            children: None,
        });

        if end - start <= leaf_size {
            return id;
        }

        let dim = self.widest_dimension(start, end);
        let mid = start + (end - start) / 2;
        let points = &self.points;
        self.order[start..end].select_nth_unstable_by(mid - start, |&a, &b| {
            points[a][dim]
                .total_cmp(&points[b][dim])
                .then_with(|| a.cmp(&b))
        });

        let left = self.split(start, mid, leaf_size);
        let right = self.split(mid, end, leaf_size);
        self.nodes[id].children = Some((left, right));
        id
    }

    fn centroid(&self, start: usize, end: usize) -> FeatureVector {
        let mut sum = [0.0; FEATURE_COUNT];
        for &row in &self.order[start..end] {
            for (s, v) in sum.iter_mut().zip(self.points[row]) {
                *s += v;
            }
        }
        let count = (end - start) as f64;
        sum.map(|s| s / count)
    }

    fn widest_dimension(&self, start: usize, end: usize) -> usize {
        let mut lo = [f64::INFINITY; FEATURE_COUNT];
        let mut hi = [f64::NEG_INFINITY; FEATURE_COUNT];
        for &row in &self.order[start..end] {
            for (i, &v) in self.points[row].iter().enumerate() {
                lo[i] = lo[i].min(v);
                hi[i] = hi[i].max(v);
            }
        }
        (0..FEATURE_COUNT)
            .max_by(|&a, &b| (hi[a] - lo[a]).total_cmp(&(hi[b] - lo[b])).then(b.cmp(&a)))
            .unwrap_or(0)
    }

    fn search(&self, id: usize, query: &FeatureVector, k: usize, best: &mut BinaryHeap<Neighbor>) {
        let node = &self.nodes[id];
        let lower_bound = (euclidean(query, &node.center) - node.radius).max(0.0);
        if best.len() == k {
            if let Some(worst) = best.peek() {
                if lower_bound > worst.distance + PRUNE_EPSILON {
                    return;
                }
            }
        }

        match node.children {
            None => {
                for &row in &self.order[node.start..node.end] {
                    let candidate = Neighbor {
                        row,
                        distance: euclidean(&self.points[row], query),
                    };
                    if best.len() < k {
                        best.push(candidate);
                    } else if best.peek().is_some_and(|worst| candidate < *worst) {
                        best.pop();
                        best.push(candidate);
                    }
                }
            }
            Some((left, right)) => {
                let dl = euclidean(query, &self.nodes[left].center);
                let dr = euclidean(query, &self.nodes[right].center);
                let (first, second) = if dl <= dr { (left, right) } else { (right, left) };
                self.search(first, query, k, best);
                self.search(second, query, k, best);
            }
        }
    }
}

/// Euclidean distance between two feature vectors.
#[must_use]
pub fn euclidean(a: &FeatureVector, b: &FeatureVector) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

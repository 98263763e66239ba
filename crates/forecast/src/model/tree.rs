//! Regression tree shared by the bagged forest and the boosted ensemble.
//!
//! Splits maximise the regularised squared-error gain
//!
//! ```text
//! S_L² / (n_L + λ) + S_R² / (n_R + λ) − S² / (n + λ)
//! ```
//!
//! where `S` is the target sum of a node. With `λ = 0` this is plain variance
//! reduction and leaves predict the mean; with `λ > 0` it is the second-order
//! boosting gain for squared loss and leaves predict `S / (n + λ)`.

/// Minimum gain for a split to be kept.
const MIN_GAIN: f64 = 1e-12;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TreeParams {
    /// Root is at depth 0; nodes at `max_depth` are always leaves.
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    pub l2_regularization: f64,
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Fitted binary regression tree (nodes stored in a flat arena, root at 0).
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    left: Vec<usize>,
    right: Vec<usize>,
}

impl RegressionTree {
    /// Fit on the rows of `x` selected by `sample` (indices may repeat, as in a
    /// bootstrap sample). `targets` is indexed like `x`.
    pub fn fit(x: &[Vec<f64>], targets: &[f64], sample: &[usize], params: &TreeParams) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.grow(x, targets, sample.to_vec(), 0, params);
        tree
    }

    pub fn predict_row(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    fn grow(
        &mut self,
        x: &[Vec<f64>],
        targets: &[f64],
        sample: Vec<usize>,
        depth: usize,
        params: &TreeParams,
    ) -> usize {
        let id = self.nodes.len();
        let sum: f64 = sample.iter().map(|&i| targets[i]).sum();
        let value = sum / (sample.len() as f64 + params.l2_regularization);
        self.nodes.push(Node::Leaf { value });

        if depth >= params.max_depth || sample.len() < 2 * params.min_samples_leaf.max(1) {
            return id;
        }

        let Some(best) = best_split(x, targets, &sample, sum, params) else {
            return id;
        };

        let left = self.grow(x, targets, best.left, depth + 1, params);
        let right = self.grow(x, targets, best.right, depth + 1, params);
        self.nodes[id] = Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
        };
        id
    }
}

fn best_split(
    x: &[Vec<f64>],
    targets: &[f64],
    sample: &[usize],
    total: f64,
    params: &TreeParams,
) -> Option<BestSplit> {
    let n = sample.len();
    let lambda = params.l2_regularization;
    let min_leaf = params.min_samples_leaf.max(1);
    let parent_score = total * total / (n as f64 + lambda);
    let width = x.first().map_or(0, Vec::len);

    let mut best: Option<(usize, f64, f64)> = None;
    let mut order = sample.to_vec();

    for feature in 0..width {
        order.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]));

        let mut left_sum = 0.0;
        for pos in 0..n - 1 {
            left_sum += targets[order[pos]];
            let n_left = pos + 1;
            let n_right = n - n_left;
            if n_left < min_leaf || n_right < min_leaf {
                continue;
            }

            let here = x[order[pos]][feature];
            let next = x[order[pos + 1]][feature];
            if here >= next {
                continue;
            }

            let right_sum = total - left_sum;
            let gain = left_sum * left_sum / (n_left as f64 + lambda)
                + right_sum * right_sum / (n_right as f64 + lambda)
                - parent_score;

            if gain > MIN_GAIN && best.is_none_or(|(_, _, g)| gain > g) {
                let mid = here + (next - here) / 2.0;
                let threshold = if mid < next { mid } else { here };
                best = Some((feature, threshold, gain));
            }
        }
    }

    let (feature, threshold, _) = best?;
    let (left, right): (Vec<usize>, Vec<usize>) =
        sample.iter().partition(|&&i| x[i][feature] <= threshold);

    Some(BestSplit {
        feature,
        threshold,
        left,
        right,
    })
}

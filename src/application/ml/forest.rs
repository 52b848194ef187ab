use crate::domain::errors::ValuationError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_regressor::{
    DecisionTreeRegressor, DecisionTreeRegressorParameters,
};
use std::fmt;
use tracing::debug;

type Tree = DecisionTreeRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Shape of the bagged ensemble.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestParameters {
    pub n_trees: usize,
    pub max_depth: Option<u16>,
    pub min_samples_split: usize,
    pub seed: u64,
}

impl Default for ForestParameters {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            seed: 42,
        }
    }
}

/// Bagged regression trees.
///
/// Each tree is fitted on its own bootstrap resample and considers every
/// feature at every split. Individual tree outputs stay available because the
/// confidence band is built from their spread.
pub struct RandomForest {
    trees: Vec<Tree>,
}

impl fmt::Debug for RandomForest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomForest")
            .field("n_trees", &self.trees.len())
            .finish()
    }
}

fn to_matrix(rows: &[Vec<f64>]) -> Result<DenseMatrix<f64>, ValuationError> {
    DenseMatrix::from_2d_vec(&rows.to_vec())
        .map_err(|e| ValuationError::internal(format!("Matrix creation failed: {}", e)))
}

impl RandomForest {
    /// Trees are fitted in parallel; tree `i` draws its bootstrap from `seed + i`,
    /// so the result does not depend on thread scheduling.
    pub fn fit(
        x: &[Vec<f64>],
        y: &[f64],
        params: &ForestParameters,
    ) -> Result<Self, ValuationError> {
        if x.is_empty() || x.len() != y.len() {
            return Err(ValuationError::internal(format!(
                "cannot fit forest on {} rows and {} targets",
                x.len(),
                y.len()
            )));
        }
        if params.n_trees == 0 {
            return Err(ValuationError::internal("forest needs at least one tree"));
        }

        let mut tree_params = DecisionTreeRegressorParameters::default()
            .with_min_samples_split(params.min_samples_split)
            .with_min_samples_leaf(1);
        if let Some(depth) = params.max_depth {
            tree_params = tree_params.with_max_depth(depth);
        }

        let n = x.len();
        let trees = (0..params.n_trees)
            .into_par_iter()
            .map(|i| {
                let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(i as u64));
                let mut rows = Vec::with_capacity(n);
                let mut targets = Vec::with_capacity(n);
                for _ in 0..n {
                    let idx = rng.random_range(0..n);
                    rows.push(x[idx].clone());
                    targets.push(y[idx]);
                }

                let matrix = to_matrix(&rows)?;
                Tree::fit(&matrix, &targets, tree_params.clone()).map_err(|e| {
                    ValuationError::internal(format!("Tree {} fitting failed: {}", i, e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(n_trees = trees.len(), rows = n, "Forest fitted");
        Ok(Self { trees })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// One prediction per tree for a single scaled row.
    pub fn tree_predictions(&self, row: &[f64]) -> Result<Vec<f64>, ValuationError> {
        let matrix = to_matrix(&[row.to_vec()])?;
        self.trees
            .iter()
            .map(|tree| {
                let predictions = tree
                    .predict(&matrix)
                    .map_err(|e| ValuationError::internal(format!("Prediction failed: {}", e)))?;
                predictions
                    .first()
                    .copied()
                    .ok_or_else(|| ValuationError::internal("No prediction returned"))
            })
            .collect()
    }

    /// Per-row tree predictions for a batch: `result[row][tree]`.
    pub fn tree_predictions_batch(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, ValuationError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let matrix = to_matrix(rows)?;
        let mut per_row = vec![Vec::with_capacity(self.trees.len()); rows.len()];
        for tree in &self.trees {
            let predictions = tree
                .predict(&matrix)
                .map_err(|e| ValuationError::internal(format!("Prediction failed: {}", e)))?;
            if predictions.len() != rows.len() {
                return Err(ValuationError::internal(format!(
                    "expected {} predictions, got {}",
                    rows.len(),
                    predictions.len()
                )));
            }
            for (slot, p) in per_row.iter_mut().zip(predictions) {
                slot.push(p);
            }
        }
        Ok(per_row)
    }
}

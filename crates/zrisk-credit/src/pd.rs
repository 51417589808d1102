//! Marginal and cumulative default probabilities.

use serde::Serialize;
use zrisk_core::{EclError, EclResult};
use zrisk_math::StochasticMatrix;

use crate::propagation::StateDistribution;

/// Probability of entering Default in each period.
///
/// `marginal[t]` for `t ≥ 1` is `Σ_r dist[t−1][r]·P_t[r][D]` over performing source
/// states `r`. `marginal[0]` is zero so the series aligns index-for-index with the state
/// distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefaultProbabilities {
    marginal: Vec<f64>,
}

impl DefaultProbabilities {
    /// Computes default-entry probabilities from a trajectory and the matrices that
    /// produced it.
    pub fn from_trajectory(
        distribution: &StateDistribution,
        matrices: &[StochasticMatrix],
    ) -> EclResult<Self> {
        if matrices.len() != distribution.periods() {
            return Err(EclError::configuration(format!(
                "{} matrices supplied for a {}-period trajectory",
                matrices.len(),
                distribution.periods()
            )));
        }
        let scale = distribution.scale();
        let d = scale.default_index();
        let performing: Vec<usize> = scale.performing_indices().collect();

        let mut marginal = Vec::with_capacity(matrices.len() + 1);
        marginal.push(0.0);
        for (k, matrix) in matrices.iter().enumerate() {
            let previous = distribution.at(k);
            marginal.push(performing.iter().map(|&r| previous[r] * matrix.get(r, d)).sum());
        }
        Ok(Self { marginal })
    }

    /// Default-entry probability per period, index 0 being the observation date.
    #[must_use]
    pub fn marginal(&self) -> &[f64] {
        &self.marginal
    }

    /// Number of forecast periods.
    #[must_use]
    pub fn periods(&self) -> usize {
        self.marginal.len().saturating_sub(1)
    }

    /// Running sum of the marginal series.
    ///
    /// With cures this counts re-defaults again, so it can exceed the probability of
    /// ever defaulting.
    #[must_use]
    pub fn cumulative(&self) -> Vec<f64> {
        self.marginal
            .iter()
            .scan(0.0, |acc, p| {
                *acc += p;
                Some(*acc)
            })
            .collect()
    }

    /// Sum of the marginal series over periods `1..=horizon`.
    #[must_use]
    pub fn total_over(&self, horizon: usize) -> f64 {
        self.marginal.iter().skip(1).take(horizon).sum()
    }
}

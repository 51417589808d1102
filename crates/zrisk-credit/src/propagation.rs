//! Markov propagation of rating-state distributions.

use std::sync::Arc;

use nalgebra::RowDVector;
use serde::Serialize;
use zrisk_core::{EclError, EclResult, RatingScale};
use zrisk_math::StochasticMatrix;

/// Per-period probability vectors over the rating states.
///
/// `at(0)` is the unit vector on the starting state; `at(t)` is the distribution after
/// `t` periods. Every vector sums to one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateDistribution {
    #[serde(skip)]
    scale: Arc<RatingScale>,
    vectors: Vec<Vec<f64>>,
}

impl StateDistribution {
    /// The rating scale indexing each vector.
    #[must_use]
    pub fn scale(&self) -> &RatingScale {
        &self.scale
    }

    /// Number of propagated periods (one less than the number of vectors).
    #[must_use]
    pub fn periods(&self) -> usize {
        self.vectors.len().saturating_sub(1)
    }

    /// Distribution at period `t`.
    #[must_use]
    pub fn at(&self, t: usize) -> &[f64] {
        &self.vectors[t]
    }

    /// All vectors, period 0 first.
    #[must_use]
    pub fn vectors(&self) -> &[Vec<f64>] {
        &self.vectors
    }

    /// Probability of being in `state` at each period.
    #[must_use]
    pub fn column(&self, state: usize) -> Vec<f64> {
        self.vectors.iter().map(|v| v[state]).collect()
    }

    /// Probability of being in the named state at each period.
    pub fn column_by_name(&self, name: &str) -> EclResult<Vec<f64>> {
        Ok(self.column(self.scale.resolve(name)?))
    }

    /// Probability of being in Default at each period.
    #[must_use]
    pub fn default_column(&self) -> Vec<f64> {
        self.column(self.scale.default_index())
    }

    /// Probability of having been written off by each period; zeros without a write-off
    /// state.
    #[must_use]
    pub fn write_off_column(&self) -> Vec<f64> {
        match self.scale.write_off_index() {
            Some(w) => self.column(w),
            None => vec![0.0; self.vectors.len()],
        }
    }

    /// Probability of being in a performing state at each period.
    #[must_use]
    pub fn performing_column(&self) -> Vec<f64> {
        self.vectors
            .iter()
            .map(|v| self.scale.performing_indices().map(|i| v[i]).sum())
            .collect()
    }

    /// Total mass of each vector.
    #[must_use]
    pub fn sums(&self) -> Vec<f64> {
        self.vectors.iter().map(|v| v.iter().sum()).collect()
    }
}

/// Advances a state vector through a sequence of PiT matrices.
///
/// `v[t+1] = v[t] · P[t+1]`. The write-off row of every consumed matrix is treated as
/// absorbing whatever its stored entries. Propagation always runs for every supplied
/// matrix.
#[derive(Debug, Clone)]
pub struct MarkovPropagator {
    scale: Arc<RatingScale>,
}

impl MarkovPropagator {
    /// Creates a propagator over `scale`.
    #[must_use]
    pub fn new(scale: Arc<RatingScale>) -> Self {
        Self { scale }
    }

    /// The rating scale.
    #[must_use]
    pub fn scale(&self) -> &RatingScale {
        &self.scale
    }

    /// Propagates unit mass on the named starting state.
    pub fn propagate_from_state(
        &self,
        start: &str,
        matrices: &[StochasticMatrix],
    ) -> EclResult<StateDistribution> {
        let index = self.scale.resolve(start)?;
        self.propagate_from_index(index, matrices)
    }

    /// Propagates unit mass on the starting state at `start`.
    pub fn propagate_from_index(
        &self,
        start: usize,
        matrices: &[StochasticMatrix],
    ) -> EclResult<StateDistribution> {
        if start >= self.scale.len() {
            return Err(EclError::configuration(format!(
                "start state index {start} is outside the rating scale"
            )));
        }
        let mut initial = vec![0.0; self.scale.len()];
        initial[start] = 1.0;
        self.propagate(initial, matrices)
    }

    /// Propagates an arbitrary initial distribution.
    pub fn propagate(
        &self,
        initial: Vec<f64>,
        matrices: &[StochasticMatrix],
    ) -> EclResult<StateDistribution> {
        let n = self.scale.len();
        if initial.len() != n {
            return Err(EclError::configuration(format!(
                "initial distribution has {} entries, rating scale has {n}",
                initial.len()
            )));
        }
        let mut vectors = Vec::with_capacity(matrices.len() + 1);
        let mut v = RowDVector::from_vec(initial.clone());
        vectors.push(initial);

        for (k, matrix) in matrices.iter().enumerate() {
            if matrix.scale() != self.scale.as_ref() {
                return Err(EclError::invalid_matrix(
                    "PiT matrix is defined on a different rating scale",
                )
                .with_period(k + 1));
            }
            let next = &v * matrix.with_absorbing_write_off().values();
            vectors.push(next.iter().copied().collect());
            v = next;
        }

        Ok(StateDistribution {
            scale: Arc::clone(&self.scale),
            vectors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::DMatrix;
    use zrisk_math::WriteOffSplit;

    fn ttc() -> StochasticMatrix {
        let scale = Arc::new(RatingScale::from_names(&["A", "B"], "D").unwrap());
        StochasticMatrix::from_rows(
            scale,
            &[
                vec![0.90, 0.08, 0.02],
                vec![0.10, 0.80, 0.10],
                vec![0.00, 0.00, 1.00],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_trajectory_shape_and_first_step() {
        let m = ttc();
        let propagator = MarkovPropagator::new(Arc::clone(m.scale_handle()));
        let dist = propagator
            .propagate_from_state("A", &[m.clone(), m.clone(), m.clone()])
            .unwrap();

        assert_eq!(dist.periods(), 3);
        assert_eq!(dist.at(0), &[1.0, 0.0, 0.0]);
        assert_eq!(dist.at(1), m.row(0).as_slice());
        for s in dist.sums() {
            assert_relative_eq!(s, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_matches_matrix_power() {
        let m = ttc();
        let propagator = MarkovPropagator::new(Arc::clone(m.scale_handle()));
        let dist = propagator
            .propagate_from_index(1, &vec![m.clone(); 5])
            .unwrap();
        let p5 = m.power(5).unwrap();
        for j in 0..3 {
            assert_relative_eq!(dist.at(5)[j], p5.get(1, j), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_empty_sequence_gives_initial_only() {
        let m = ttc();
        let propagator = MarkovPropagator::new(Arc::clone(m.scale_handle()));
        let dist = propagator.propagate_from_state("B", &[]).unwrap();
        assert_eq!(dist.periods(), 0);
        assert_eq!(dist.default_column(), vec![0.0]);
    }

    #[test]
    fn test_write_off_is_absorbing_even_if_matrix_leaks() {
        let split = WriteOffSplit::new(0.0, 2.0).unwrap();
        let augmented = ttc().augment_with_write_off(&split, None).unwrap();
        let scale = Arc::clone(augmented.scale_handle());

        // a matrix whose write-off row leaks back to A
        let mut values: DMatrix<f64> = augmented.values().clone();
        values[(3, 3)] = 0.5;
        values[(3, 0)] = 0.5;
        let leaky = StochasticMatrix::new(Arc::clone(&scale), values).unwrap();

        let propagator = MarkovPropagator::new(scale);
        let dist = propagator
            .propagate(vec![0.0, 0.0, 0.0, 1.0], &[leaky.clone(), leaky])
            .unwrap();
        assert_eq!(dist.write_off_column(), vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_rejects_foreign_scale() {
        let m = ttc();
        let other = Arc::new(RatingScale::from_names(&["X", "Y"], "D").unwrap());
        let err = MarkovPropagator::new(other)
            .propagate_from_index(0, &[m])
            .unwrap_err();
        assert_eq!(err.context().period, Some(1));
    }

    #[test]
    fn test_cure_flows_through_default_row() {
        let scale = Arc::new(RatingScale::from_names(&["A"], "D").unwrap());
        let m = StochasticMatrix::from_rows(
            Arc::clone(&scale),
            &[vec![0.9, 0.1], vec![0.5, 0.5]],
        )
        .unwrap();
        let dist = MarkovPropagator::new(scale)
            .propagate_from_state("A", &[m.clone(), m])
            .unwrap();
        // 0.9*0.9 + 0.1*0.5
        assert_relative_eq!(dist.at(2)[0], 0.86, epsilon = 1e-12);
        assert_relative_eq!(dist.performing_column()[2], 0.86, epsilon = 1e-12);
    }
}

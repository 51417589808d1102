//! Marginal-loss aggregation.
//!
//! The marginal loss of period `t` is the probability of entering Default during `t`
//! times the exposure and the severity for a default in `t`:
//!
//! ```text
//! ML(t) = PD(t) · EAD(t) · LGD(t) [· DF(t)]
//! ```
//!
//! The 12-month ECL sums `ML(1..=min(12, T))` and the lifetime ECL sums `ML(1..=T)`;
//! both read the same per-period terms.

use zrisk_config::policy::{Horizon, TWELVE_MONTH_PERIODS};
use zrisk_config::ModelConfig;
use zrisk_core::types::check_weights;
use zrisk_core::{EclError, EclResult};
use zrisk_credit::{DefaultProbabilities, StageProbabilities};
use zrisk_models::{ExposureTrajectory, LossTrajectory};

/// Combines PD, EAD and LGD trajectories into expected losses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EclAggregator {
    horizon: Horizon,
    discount: bool,
}

impl Default for EclAggregator {
    fn default() -> Self {
        Self::new(Horizon::default(), false)
    }
}

impl EclAggregator {
    /// Creates an aggregator reporting over `horizon`.
    #[must_use]
    pub fn new(horizon: Horizon, discount: bool) -> Self {
        Self { horizon, discount }
    }

    /// Creates the aggregator described by a model configuration.
    #[must_use]
    pub fn from_config(config: &ModelConfig) -> Self {
        Self::new(config.horizon, config.discount)
    }

    /// Reported horizon.
    #[must_use]
    pub fn horizon(&self) -> Horizon {
        self.horizon
    }

    /// Returns true if marginal losses are discounted.
    #[must_use]
    pub fn discounts(&self) -> bool {
        self.discount
    }

    /// Marginal loss per period, index 0 being the observation date (always zero).
    ///
    /// `discount_factors` is only read when discounting is enabled.
    pub fn marginal_losses(
        &self,
        pd: &DefaultProbabilities,
        exposure: &ExposureTrajectory,
        loss: &LossTrajectory,
        discount_factors: &[f64],
    ) -> EclResult<Vec<f64>> {
        let n = pd.marginal().len();
        if exposure.at_default.len() != n || loss.lgd.len() != n {
            return Err(EclError::configuration(format!(
                "trajectory lengths differ: PD {n}, EAD {}, LGD {}",
                exposure.at_default.len(),
                loss.lgd.len()
            )));
        }
        if self.discount && discount_factors.len() < n {
            return Err(EclError::configuration(format!(
                "{} discount factors for {n} periods",
                discount_factors.len()
            )));
        }

        Ok((0..n)
            .map(|t| {
                let ml = pd.marginal()[t] * exposure.at_default[t] * loss.lgd[t];
                if self.discount {
                    ml * discount_factors[t]
                } else {
                    ml
                }
            })
            .collect())
    }

    /// Sum of marginal losses over periods `1..=periods`.
    #[must_use]
    pub fn ecl_over(marginal: &[f64], periods: usize) -> f64 {
        marginal.iter().skip(1).take(periods).sum()
    }

    /// 12-month ECL.
    #[must_use]
    pub fn twelve_month(marginal: &[f64]) -> f64 {
        Self::ecl_over(marginal, TWELVE_MONTH_PERIODS)
    }

    /// Lifetime ECL.
    #[must_use]
    pub fn lifetime(marginal: &[f64]) -> f64 {
        Self::ecl_over(marginal, marginal.len())
    }

    /// ECL over the configured horizon.
    #[must_use]
    pub fn reported(&self, marginal: &[f64]) -> f64 {
        Self::ecl_over(marginal, self.horizon.periods(marginal.len().saturating_sub(1)))
    }

    /// Forward provision series under the stage probabilities.
    ///
    /// At each period `t` the stage-1 provision is the 12-month ECL from `t`, stage 2
    /// the remaining lifetime ECL from `t`, and stage 3 the loss on the current
    /// exposure. When discounting, forward losses are restated to period `t` values.
    pub fn provision(
        &self,
        marginal: &[f64],
        stages: &StageProbabilities,
        exposure: &ExposureTrajectory,
        loss: &LossTrajectory,
        discount_factors: &[f64],
    ) -> EclResult<Vec<f64>> {
        let n = marginal.len();
        if stages.len() != n || exposure.at_default.len() != n || loss.lgd.len() != n {
            return Err(EclError::configuration(
                "stage, exposure and loss trajectories must align with the marginal losses",
            ));
        }

        // suffix[t] = Σ_{u ≥ t} ML(u)
        let mut suffix = vec![0.0; n + 1];
        for t in (0..n).rev() {
            suffix[t] = suffix[t + 1] + marginal[t];
        }

        let provision = (0..n)
            .map(|t| {
                let restate = if self.discount {
                    discount_factors.get(t).copied().filter(|df| *df > 0.0).unwrap_or(1.0)
                } else {
                    1.0
                };
                let end = (t + TWELVE_MONTH_PERIODS + 1).min(n);
                let stage1 = (suffix[t + 1] - suffix[end]) / restate;
                let stage2 = suffix[t + 1] / restate;
                let stage3 = exposure.at_default[t] * loss.lgd[t];
                let [p1, p2, p3] = stages.at(t);
                p1 * stage1 + p2 * stage2 + p3 * stage3
            })
            .collect();
        Ok(provision)
    }

    /// Probability-weighted ECL, `Σ w·ECL`.
    ///
    /// Fails if the weights do not sum to one within `tolerance`.
    pub fn weighted(
        weighted_ecls: impl IntoIterator<Item = (f64, f64)>,
        tolerance: f64,
    ) -> EclResult<f64> {
        let pairs: Vec<(f64, f64)> = weighted_ecls.into_iter().collect();
        check_weights(pairs.iter().map(|(w, _)| *w), tolerance)?;
        Ok(pairs.iter().map(|(w, ecl)| w * ecl).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::sync::Arc;
    use zrisk_config::staging::StageMapConfig;
    use zrisk_core::{ErrorKind, RatingScale};
    use zrisk_credit::{MarkovPropagator, StageMap};
    use zrisk_math::StochasticMatrix;

    fn exposure(values: Vec<f64>) -> ExposureTrajectory {
        ExposureTrajectory {
            balance: values.clone(),
            exposure: values.clone(),
            at_default: values,
        }
    }

    fn run(periods: usize) -> (DefaultProbabilities, StageProbabilities) {
        let scale = Arc::new(RatingScale::from_names(&["A", "B"], "D").unwrap());
        let m = StochasticMatrix::from_rows(
            Arc::clone(&scale),
            &[
                vec![0.90, 0.08, 0.02],
                vec![0.10, 0.80, 0.10],
                vec![0.00, 0.00, 1.00],
            ],
        )
        .unwrap();
        let matrices = vec![m; periods];
        let dist = MarkovPropagator::new(Arc::clone(&scale))
            .propagate_from_state("A", &matrices)
            .unwrap();
        let pd = DefaultProbabilities::from_trajectory(&dist, &matrices).unwrap();
        let stages = StageMap::new(&scale, &StageMapConfig::default())
            .unwrap()
            .stage_probabilities(&dist, 0, false);
        (pd, stages)
    }

    #[test]
    fn test_weighted_ecl() {
        let ecl = EclAggregator::weighted([(0.2, 100.0), (0.5, 200.0), (0.3, 300.0)], 1e-9).unwrap();
        assert_relative_eq!(ecl, 230.0, epsilon = 1e-9);

        let err = EclAggregator::weighted([(0.2, 100.0), (0.5, 200.0), (0.29, 300.0)], 1e-6)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_marginal_losses_and_horizons() {
        let (pd, _) = run(15);
        let ead = exposure(vec![100.0; 16]);
        let lgd = LossTrajectory { lgd: vec![0.5; 16] };
        let agg = EclAggregator::default();
        let ml = agg.marginal_losses(&pd, &ead, &lgd, &[]).unwrap();

        assert_eq!(ml[0], 0.0);
        assert_relative_eq!(ml[1], 0.02 * 50.0, epsilon = 1e-12);
        assert_relative_eq!(EclAggregator::twelve_month(&ml), pd.total_over(12) * 50.0, epsilon = 1e-10);
        assert_relative_eq!(EclAggregator::lifetime(&ml), pd.total_over(15) * 50.0, epsilon = 1e-10);
        assert_relative_eq!(agg.reported(&ml), EclAggregator::lifetime(&ml));

        let twelve = EclAggregator::new(Horizon::TwelveMonth, false);
        assert_relative_eq!(twelve.reported(&ml), EclAggregator::twelve_month(&ml));
    }

    #[test]
    fn test_discounting() {
        let (pd, _) = run(2);
        let ead = exposure(vec![100.0; 3]);
        let lgd = LossTrajectory { lgd: vec![1.0; 3] };
        let df = vec![1.0, 0.5, 0.25];
        let plain = EclAggregator::default().marginal_losses(&pd, &ead, &lgd, &df).unwrap();
        let discounted = EclAggregator::new(Horizon::Lifetime, true)
            .marginal_losses(&pd, &ead, &lgd, &df)
            .unwrap();
        assert_relative_eq!(discounted[2], plain[2] * 0.25, epsilon = 1e-12);

        assert!(EclAggregator::new(Horizon::Lifetime, true)
            .marginal_losses(&pd, &ead, &lgd, &[1.0])
            .is_err());
    }

    #[test]
    fn test_length_mismatch() {
        let (pd, _) = run(2);
        let err = EclAggregator::default()
            .marginal_losses(&pd, &exposure(vec![1.0; 2]), &LossTrajectory { lgd: vec![1.0; 3] }, &[])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_provision_at_origin_is_twelve_month_for_stage_one() {
        let (pd, stages) = run(20);
        let ead = exposure(vec![100.0; 21]);
        let lgd = LossTrajectory { lgd: vec![0.4; 21] };
        let agg = EclAggregator::default();
        let ml = agg.marginal_losses(&pd, &ead, &lgd, &[]).unwrap();
        let provision = agg.provision(&ml, &stages, &ead, &lgd, &[]).unwrap();

        assert_eq!(provision.len(), 21);
        assert_relative_eq!(provision[0], EclAggregator::twelve_month(&ml), epsilon = 1e-12);
        // nothing left to lose after the final period except on defaulted mass
        let [_, _, p3] = stages.at(20);
        assert_relative_eq!(provision[20], p3 * 40.0, epsilon = 1e-12);
    }
}

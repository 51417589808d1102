//! Single-factor credit-cycle transform.
//!
//! Each row of a TtC matrix is read as a distribution over a standard normal latent
//! credit-quality variable. With states ordered best to worst, the default-ward
//! cumulative probabilities `C[j] = Σ_{k ≥ j} p[k]` are mapped to cut-points
//! `Φ⁻¹(C[j])`, shifted by `√ρ·Z`, and mapped back through `Φ`. Differencing the shifted
//! cumulative values gives the PiT row. A larger `Z` moves every cut-point towards the
//! good end, so default-ward mass never decreases with `Z`, and since `Φ` is monotone the
//! ordinal structure of the row is preserved.
//!
//! With [`ShiftMethod::Barrier`] only the default cut-point `x_D` is transformed; every
//! other cut-point moves by the same amount `x'_D − x_D`, so the distances between
//! barriers are kept. In calibrated form both methods coincide.

use std::sync::Arc;

use nalgebra::DMatrix;
use zrisk_config::policy::{ShiftMethod, ZTransform};
use zrisk_config::ModelConfig;
use zrisk_core::{EclError, EclResult, RatingScale, Scenario};
use zrisk_math::normal::{cdf, clamp_probability, inverse_cdf};
use zrisk_math::{StochasticMatrix, WriteOffSplit, ROW_SUM_TOLERANCE};

/// Maps a TtC matrix and a per-period Z value to a PiT matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CreditCycleAdjuster {
    correlation: f64,
    transform: ZTransform,
    method: ShiftMethod,
    loading: f64,
    divisor: f64,
}

impl CreditCycleAdjuster {
    /// Creates an adjuster for asset correlation `correlation` in `(0, 1)`.
    pub fn new(correlation: f64, transform: ZTransform) -> EclResult<Self> {
        if !(correlation > 0.0 && correlation < 1.0) {
            return Err(EclError::calibration(format!(
                "asset correlation {correlation} must lie strictly between 0 and 1"
            )));
        }
        let divisor = match transform {
            ZTransform::Calibrated => 1.0,
            ZTransform::Conditional => (1.0 - correlation).sqrt(),
        };
        Ok(Self {
            correlation,
            transform,
            method: ShiftMethod::CutPoint,
            loading: correlation.sqrt(),
            divisor,
        })
    }

    /// Creates the adjuster described by a model configuration.
    pub fn from_config(config: &ModelConfig) -> EclResult<Self> {
        Ok(Self::new(config.correlation, config.transform)?.with_method(config.shift_method))
    }

    /// Sets how Z moves the cut-points.
    #[must_use]
    pub fn with_method(mut self, method: ShiftMethod) -> Self {
        self.method = method;
        self
    }

    /// Asset correlation ρ.
    #[must_use]
    pub fn correlation(&self) -> f64 {
        self.correlation
    }

    /// Transform form.
    #[must_use]
    pub fn transform(&self) -> ZTransform {
        self.transform
    }

    /// Shift method.
    #[must_use]
    pub fn method(&self) -> ShiftMethod {
        self.method
    }

    fn transform_cut_point(&self, x: f64, z: f64) -> f64 {
        (x + self.loading * z) / self.divisor
    }

    /// Shifted default-ward cumulative probabilities of one row.
    fn shift_row(&self, cumulative: &[f64], default: usize, z: f64) -> Vec<f64> {
        let offset = match self.method {
            ShiftMethod::CutPoint => None,
            ShiftMethod::Barrier => {
                let x_d = inverse_cdf(clamp_probability(cumulative[default]));
                Some(self.transform_cut_point(x_d, z) - x_d)
            }
        };
        cumulative
            .iter()
            .map(|&c| {
                if c <= 0.0 {
                    0.0
                } else if c >= 1.0 {
                    1.0
                } else {
                    let x = inverse_cdf(clamp_probability(c));
                    cdf(offset.map_or_else(|| self.transform_cut_point(x, z), |d| x + d))
                }
            })
            .collect()
    }

    /// Transforms one row given its default-ward cumulative probabilities.
    fn adjust_row(&self, cumulative: &[f64], default: usize, z: f64) -> EclResult<Vec<f64>> {
        let n = cumulative.len();
        let mut shifted = self.shift_row(cumulative, default, z);
        // the first column holds the whole row mass
        if let Some(first) = shifted.first_mut() {
            *first = 1.0;
        }
        shifted.push(0.0);

        let mut row = Vec::with_capacity(n);
        for j in 0..n {
            let p = shifted[j] - shifted[j + 1];
            if p < 0.0 {
                if p < -ROW_SUM_TOLERANCE {
                    return Err(EclError::calibration(format!(
                        "transform produced probability {p} in column {j}"
                    )));
                }
                row.push(0.0);
            } else {
                row.push(p);
            }
        }
        Ok(row)
    }

    /// PiT matrix for one period's Z value.
    pub fn adjust(&self, ttc: &StochasticMatrix, z: f64) -> EclResult<StochasticMatrix> {
        if !z.is_finite() {
            return Err(EclError::calibration(format!("Z value {z} is not finite")));
        }
        let n = ttc.dim();
        let default = ttc.scale().default_index();
        let mut values = DMatrix::zeros(n, n);
        for i in 0..n {
            let row = self
                .adjust_row(&ttc.cumulative_default_ward(i), default, z)
                .map_err(|e| match e {
                    EclError::Calibration { reason, context } => EclError::Calibration {
                        reason: format!("row {i}: {reason}"),
                        context,
                    },
                    other => other,
                })?;
            for (j, p) in row.into_iter().enumerate() {
                values[(i, j)] = p;
            }
        }
        StochasticMatrix::new(Arc::clone(ttc.scale_handle()), values).map_err(|e| match e {
            EclError::InvalidMatrix { reason, context } => EclError::Calibration {
                reason: format!("transformed matrix is invalid: {reason}"),
                context,
            },
            other => other,
        })
    }

    /// PiT matrices for periods `1..=periods` of a scenario.
    ///
    /// The transform is applied to the TtC matrix independently each period. When a
    /// write-off split is given, each PiT matrix is then augmented with the write-off
    /// state. Errors carry the scenario id and the failing period.
    pub fn pit_path(
        &self,
        ttc: &StochasticMatrix,
        scenario: &Scenario,
        periods: usize,
        write_off: Option<(&WriteOffSplit, Option<usize>)>,
    ) -> EclResult<Vec<StochasticMatrix>> {
        (1..=periods)
            .map(|t| {
                let z = scenario.z_at(t)?;
                let pit = self.adjust(ttc, z)?;
                match write_off {
                    Some((split, cure)) => pit.augment_with_write_off(split, cure),
                    None => Ok(pit),
                }
                .map_err(|e| e.with_period(t))
            })
            .collect::<EclResult<Vec<_>>>()
            .map_err(|e| e.with_scenario(scenario.id.clone()))
    }
}

/// Resolves the cure state: the configured name if given, otherwise the scale's cure state.
pub fn resolve_cure_index(scale: &RatingScale, cure_state: Option<&str>) -> EclResult<Option<usize>> {
    match cure_state {
        Some(name) => {
            let index = scale.resolve(name)?;
            if !scale.is_performing(index) {
                return Err(EclError::configuration(format!(
                    "cure state '{name}' is not a performing state"
                )));
            }
            Ok(Some(index))
        }
        None => Ok(scale.cure_index()),
    }
}

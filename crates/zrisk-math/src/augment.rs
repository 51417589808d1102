//! Write-off augmentation of transition matrices.
//!
//! Adds a terminal write-off state after Default. Each period, mass in Default leaves
//! with intensity `1 / time_to_sale`; of the leaving mass a fraction `probability_of_cure`
//! returns to the cure state and the rest is written off. The remaining Default row
//! keeps the shape of the input row, so cure paths already present in the matrix survive.

use std::sync::Arc;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use zrisk_core::{EclError, EclResult};

use crate::matrix::StochasticMatrix;

/// Split of the Default exit between cure and write-off.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WriteOffSplit {
    /// Probability that an account leaving Default cures rather than being written off.
    pub probability_of_cure: f64,
    /// Expected number of periods from default to sale or write-off.
    pub time_to_sale: f64,
}

impl WriteOffSplit {
    /// Creates a validated split.
    pub fn new(probability_of_cure: f64, time_to_sale: f64) -> EclResult<Self> {
        let split = Self {
            probability_of_cure,
            time_to_sale,
        };
        split.validate()?;
        Ok(split)
    }

    /// Checks the parameter domain.
    pub fn validate(&self) -> EclResult<()> {
        if !(0.0..=1.0).contains(&self.probability_of_cure) {
            return Err(EclError::configuration(format!(
                "probability of cure {} must lie in [0, 1]",
                self.probability_of_cure
            )));
        }
        if !self.time_to_sale.is_finite() || self.time_to_sale < 1.0 {
            return Err(EclError::configuration(format!(
                "time to sale {} must be at least one period",
                self.time_to_sale
            )));
        }
        Ok(())
    }

    /// Per-period probability of leaving Default.
    #[must_use]
    pub fn exit_probability(&self) -> f64 {
        1.0 / self.time_to_sale
    }

    /// Per-period probability of moving from Default to write-off.
    #[must_use]
    pub fn write_off_probability(&self) -> f64 {
        self.exit_probability() * (1.0 - self.probability_of_cure)
    }

    /// Per-period probability of moving from Default to the cure state.
    #[must_use]
    pub fn cure_probability(&self) -> f64 {
        self.exit_probability() * self.probability_of_cure
    }
}

impl StochasticMatrix {
    /// Returns a copy with a trailing absorbing write-off state.
    ///
    /// With a `cure` index the Default row becomes
    /// `old * (1 - exit) + exit * pcure` at the cure state plus `exit * (1 - pcure)` at
    /// write-off. Without one, only the write-off share is carved out of the row. A matrix
    /// whose scale already has a write-off state is returned unchanged.
    pub fn augment_with_write_off(
        &self,
        split: &WriteOffSplit,
        cure: Option<usize>,
    ) -> EclResult<Self> {
        if self.scale().has_write_off() {
            return Ok(self.clone());
        }
        split.validate()?;

        let n = self.dim();
        let d = self.scale().default_index();
        if let Some(c) = cure {
            if c >= n || !self.scale().is_performing(c) {
                return Err(EclError::configuration(format!(
                    "cure state index {c} is not a performing state"
                )));
            }
        }

        let scale = Arc::new(self.scale().with_write_off()?);
        let wo = n;
        let mut values = DMatrix::zeros(n + 1, n + 1);
        values.view_mut((0, 0), (n, n)).copy_from(self.values());

        let w = split.write_off_probability();
        match cure {
            Some(c) => {
                let exit = split.exit_probability();
                for j in 0..n {
                    values[(d, j)] *= 1.0 - exit;
                }
                values[(d, c)] += split.cure_probability();
            }
            None => {
                for j in 0..n {
                    values[(d, j)] *= 1.0 - w;
                }
            }
        }
        values[(d, wo)] = w;
        values[(wo, wo)] = 1.0;

        Self::new(scale, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use zrisk_core::{RatingScale, RatingState, StateKind};

    fn absorbing() -> StochasticMatrix {
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
    fn test_split_domain() {
        assert!(WriteOffSplit::new(1.2, 12.0).is_err());
        assert!(WriteOffSplit::new(0.3, 0.5).is_err());
        let split = WriteOffSplit::new(0.25, 4.0).unwrap();
        assert_relative_eq!(split.write_off_probability(), 0.1875);
        assert_relative_eq!(split.cure_probability(), 0.0625);
    }

    #[test]
    fn test_augment_without_cure() {
        let split = WriteOffSplit::new(0.25, 4.0).unwrap();
        let m = absorbing().augment_with_write_off(&split, None).unwrap();

        assert_eq!(m.dim(), 4);
        assert_eq!(m.scale().write_off_index(), Some(3));
        assert_relative_eq!(m.get(2, 2), 1.0 - 0.1875, epsilon = 1e-12);
        assert_relative_eq!(m.get(2, 3), 0.1875, epsilon = 1e-12);
        assert_eq!(m.row(3), vec![0.0, 0.0, 0.0, 1.0]);
        // performing rows untouched, no direct route to write-off
        assert_eq!(m.row(0), vec![0.90, 0.08, 0.02, 0.0]);
    }

    #[test]
    fn test_augment_with_cure() {
        let split = WriteOffSplit::new(0.25, 4.0).unwrap();
        let m = absorbing().augment_with_write_off(&split, Some(1)).unwrap();

        assert_relative_eq!(m.get(2, 1), 0.0625, epsilon = 1e-12);
        assert_relative_eq!(m.get(2, 2), 0.75, epsilon = 1e-12);
        assert_relative_eq!(m.get(2, 3), 0.1875, epsilon = 1e-12);
    }

    #[test]
    fn test_augment_is_idempotent() {
        let split = WriteOffSplit::new(0.5, 6.0).unwrap();
        let once = absorbing().augment_with_write_off(&split, None).unwrap();
        let twice = once.augment_with_write_off(&split, None).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_cure_must_be_performing() {
        let split = WriteOffSplit::new(0.5, 6.0).unwrap();
        assert!(absorbing().augment_with_write_off(&split, Some(2)).is_err());
    }

    #[test]
    fn test_keeps_existing_default_row_shape() {
        let states = vec![
            RatingState::performing("A"),
            RatingState::new("CURED", StateKind::Cure),
            RatingState::default_state("D"),
        ];
        let scale = Arc::new(RatingScale::new(states).unwrap());
        let m = StochasticMatrix::from_rows(
            scale,
            &[
                vec![0.95, 0.00, 0.05],
                vec![0.20, 0.70, 0.10],
                vec![0.00, 0.10, 0.90],
            ],
        )
        .unwrap();
        let split = WriteOffSplit::new(0.0, 10.0).unwrap();
        let cure = m.scale().cure_index();
        let a = m.augment_with_write_off(&split, cure).unwrap();

        assert_relative_eq!(a.get(2, 1), 0.09, epsilon = 1e-12);
        assert_relative_eq!(a.get(2, 2), 0.81, epsilon = 1e-12);
        assert_relative_eq!(a.get(2, 3), 0.10, epsilon = 1e-12);
    }
}

//! Loss-given-default configuration.

use serde::{Deserialize, Serialize};
use zrisk_core::{EclError, EclResult};

use crate::error::{check_range, Validate, ValidationError};
use crate::policy::LgdKind;

/// Collateral-backed loss severity.
///
/// `LGD(t) = pcure·LGC + (1 − pcure)·max(floor, 1 − min(1, C(t)·haircut·df / EAD(t)))`
/// where `C(t)` is the collateral value moved by the index path shifted by the sale lag,
/// `haircut = (1 − forced_sale_discount)·(1 − sale_cost)` and `df` discounts over the
/// sale lag at the effective interest rate. With every parameter at its default this is
/// `max(0, 1 − min(1, C(t)/EAD(t)))`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SecuredLgd {
    /// Scenario series re-basing the collateral value; flat when absent.
    #[serde(default)]
    pub index_series: Option<String>,
    /// Discount achieved on a forced sale.
    #[serde(default)]
    pub forced_sale_discount: f64,
    /// Costs of sale as a fraction of proceeds.
    #[serde(default)]
    pub sale_cost: f64,
    /// Probability that a defaulted account cures.
    #[serde(default)]
    pub probability_of_cure: f64,
    /// Loss severity on cure.
    #[serde(default)]
    pub loss_given_cure: f64,
    /// Periods between default and sale of the collateral.
    #[serde(default)]
    pub time_to_sale: usize,
    /// Minimum loss given possession.
    #[serde(default)]
    pub floor: f64,
}

impl SecuredLgd {
    /// Fraction of the indexed collateral value realised on sale.
    #[must_use]
    pub fn haircut(&self) -> f64 {
        (1.0 - self.forced_sale_discount) * (1.0 - self.sale_cost)
    }
}

/// Unsecured loss severity, given directly or from cure and write-off components.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UnsecuredLgd {
    /// Flat loss severity.
    #[serde(default)]
    pub loss_given_default: Option<f64>,
    /// Probability that a defaulted account cures.
    #[serde(default)]
    pub probability_of_cure: f64,
    /// Loss severity on cure.
    #[serde(default)]
    pub loss_given_cure: f64,
    /// Loss severity on write-off.
    #[serde(default)]
    pub loss_given_write_off: Option<f64>,
}

impl UnsecuredLgd {
    /// Flat severity.
    #[must_use]
    pub fn constant(lgd: f64) -> Self {
        Self {
            loss_given_default: Some(lgd),
            ..Self::default()
        }
    }

    /// `pcure·LGC + (1 − pcure)·LGWO`.
    #[must_use]
    pub fn from_components(
        probability_of_cure: f64,
        loss_given_cure: f64,
        loss_given_write_off: f64,
    ) -> Self {
        Self {
            loss_given_default: None,
            probability_of_cure,
            loss_given_cure,
            loss_given_write_off: Some(loss_given_write_off),
        }
    }

    /// The severity, preferring the flat value when both forms are given.
    pub fn value(&self) -> EclResult<f64> {
        if let Some(lgd) = self.loss_given_default {
            return Ok(lgd);
        }
        let lgwo = self.loss_given_write_off.ok_or_else(|| {
            EclError::configuration(
                "unsecured LGD needs loss_given_default or loss_given_write_off",
            )
        })?;
        Ok(self.probability_of_cure * self.loss_given_cure
            + (1.0 - self.probability_of_cure) * lgwo)
    }
}

/// Loss-given-default policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum LgdModel {
    /// Collateral-index adjusted severity.
    #[serde(alias = "SECURED")]
    Secured(SecuredLgd),
    /// Constant severity.
    #[serde(alias = "UNSECURED", alias = "constant", alias = "CONSTANT")]
    Unsecured(UnsecuredLgd),
    /// `base·(1 + growth_rate)^t`.
    #[serde(
        alias = "constant-growth",
        alias = "CONSTANT-GROWTH",
        alias = "CONSTANT_GROWTH"
    )]
    ConstantGrowth {
        /// Severity at the observation date.
        base: f64,
        /// Growth per period.
        growth_rate: f64,
    },
    /// `base·index(t)/index(0)`.
    #[serde(alias = "INDEXED")]
    Indexed {
        /// Severity at the observation date.
        base: f64,
        /// Scenario series providing the index.
        index_series: String,
    },
}

impl Default for LgdModel {
    fn default() -> Self {
        Self::Unsecured(UnsecuredLgd::constant(1.0))
    }
}

impl LgdModel {
    /// Flat unsecured severity.
    #[must_use]
    pub fn constant(lgd: f64) -> Self {
        Self::Unsecured(UnsecuredLgd::constant(lgd))
    }

    /// Secured severity on the given collateral index.
    #[must_use]
    pub fn secured(index_series: impl Into<String>) -> Self {
        Self::Secured(SecuredLgd {
            index_series: Some(index_series.into()),
            ..SecuredLgd::default()
        })
    }

    /// Policy family.
    #[must_use]
    pub fn kind(&self) -> LgdKind {
        match self {
            Self::Secured(_) => LgdKind::Secured,
            Self::Unsecured(_) => LgdKind::Unsecured,
            Self::ConstantGrowth { .. } => LgdKind::ConstantGrowth,
            Self::Indexed { .. } => LgdKind::Indexed,
        }
    }
}

impl Validate for LgdModel {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        match self {
            Self::Secured(s) => {
                check_range(&mut errors, "lgd.forced_sale_discount", s.forced_sale_discount, 0.0, 1.0);
                check_range(&mut errors, "lgd.sale_cost", s.sale_cost, 0.0, 1.0);
                check_range(&mut errors, "lgd.probability_of_cure", s.probability_of_cure, 0.0, 1.0);
                check_range(&mut errors, "lgd.loss_given_cure", s.loss_given_cure, 0.0, 1.0);
                check_range(&mut errors, "lgd.floor", s.floor, 0.0, 1.0);
            }
            Self::Unsecured(u) => match u.value() {
                Ok(lgd) => check_range(&mut errors, "lgd.loss_given_default", lgd, 0.0, 1.0),
                Err(e) => errors.push(ValidationError::new("lgd", e.to_string())),
            },
            Self::ConstantGrowth { base, growth_rate } => {
                check_range(&mut errors, "lgd.base", *base, 0.0, 1.0);
                if !growth_rate.is_finite() || *growth_rate <= -1.0 {
                    errors.push(ValidationError::new(
                        "lgd.growth_rate",
                        "must be finite and greater than -1",
                    ));
                }
            }
            Self::Indexed { base, index_series } => {
                check_range(&mut errors, "lgd.base", *base, 0.0, 1.0);
                if index_series.is_empty() {
                    errors.push(ValidationError::new("lgd.index_series", "is empty"));
                }
            }
        }
        errors
    }
}

//! Exposure-at-default configuration.

use serde::{Deserialize, Serialize};

use crate::error::{check_range, Validate, ValidationError};
use crate::policy::{CcfMethod, EadModel};

/// Credit conversion factor, constant or indexed by time to default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CcfCurve {
    /// Same factor for every period.
    Constant(f64),
    /// `values[k]` applies to a default `k + 1` periods after the observation date; the
    /// last value extends beyond the end.
    TermStructure(Vec<f64>),
}

impl CcfCurve {
    /// Factor for a default `time_to_default` periods after the observation date.
    #[must_use]
    pub fn at(&self, time_to_default: usize) -> f64 {
        match self {
            Self::Constant(ccf) => *ccf,
            Self::TermStructure(values) => {
                let k = time_to_default.saturating_sub(1).min(values.len().saturating_sub(1));
                values.get(k).copied().unwrap_or(0.0)
            }
        }
    }

    fn values(&self) -> &[f64] {
        match self {
            Self::Constant(ccf) => std::slice::from_ref(ccf),
            Self::TermStructure(values) => values,
        }
    }
}

impl Default for CcfCurve {
    fn default() -> Self {
        Self::Constant(1.0)
    }
}

/// Credit conversion factor settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CcfConfig {
    /// Quantity the factor applies to.
    #[serde(default)]
    pub method: CcfMethod,
    /// The factor.
    #[serde(default)]
    pub curve: CcfCurve,
}

/// Exposure-at-default policy and its adjustments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EadConfig {
    /// Base exposure policy.
    #[serde(default)]
    pub model: EadModel,

    /// CCF settings, used by [`EadModel::Ccf`].
    #[serde(default)]
    pub ccf: CcfConfig,

    /// Fraction of the pre-default exposure added on default entry.
    #[serde(default)]
    pub default_penalty_pct: f64,

    /// Flat amount added on default entry.
    #[serde(default)]
    pub default_penalty_amount: f64,

    /// 1-based periods in which the contractual payment is not collected.
    #[serde(default)]
    pub payment_holiday_periods: Vec<usize>,

    /// Constant unscheduled prepayment rate per period.
    #[serde(default)]
    pub prepayment_rate: f64,
}

impl Default for EadConfig {
    fn default() -> Self {
        Self::new(EadModel::default())
    }
}

impl EadConfig {
    /// Creates a configuration for the given policy with no adjustments.
    #[must_use]
    pub fn new(model: EadModel) -> Self {
        Self {
            model,
            ccf: CcfConfig::default(),
            default_penalty_pct: 0.0,
            default_penalty_amount: 0.0,
            payment_holiday_periods: Vec::new(),
            prepayment_rate: 0.0,
        }
    }

    /// Credit conversion factor policy.
    #[must_use]
    pub fn ccf(method: CcfMethod, curve: CcfCurve) -> Self {
        Self {
            ccf: CcfConfig { method, curve },
            ..Self::new(EadModel::Ccf)
        }
    }

    /// Sets the default penalty.
    #[must_use]
    pub fn with_default_penalty(mut self, pct: f64, amount: f64) -> Self {
        self.default_penalty_pct = pct;
        self.default_penalty_amount = amount;
        self
    }

    /// Sets the payment holiday periods.
    #[must_use]
    pub fn with_payment_holidays(mut self, periods: Vec<usize>) -> Self {
        self.payment_holiday_periods = periods;
        self
    }

    /// Sets the prepayment rate.
    #[must_use]
    pub fn with_prepayment_rate(mut self, rate: f64) -> Self {
        self.prepayment_rate = rate;
        self
    }

    /// Returns true if `period` is a payment holiday.
    #[must_use]
    pub fn is_holiday(&self, period: usize) -> bool {
        self.payment_holiday_periods.contains(&period)
    }
}

impl Validate for EadConfig {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if !self.default_penalty_pct.is_finite() || self.default_penalty_pct < 0.0 {
            errors.push(ValidationError::new(
                "ead.default_penalty_pct",
                "must be finite and non-negative",
            ));
        }
        if !self.default_penalty_amount.is_finite() || self.default_penalty_amount < 0.0 {
            errors.push(ValidationError::new(
                "ead.default_penalty_amount",
                "must be finite and non-negative",
            ));
        }
        if self.payment_holiday_periods.contains(&0) {
            errors.push(ValidationError::new(
                "ead.payment_holiday_periods",
                "periods are 1-based",
            ));
        }
        check_range(&mut errors, "ead.prepayment_rate", self.prepayment_rate, 0.0, 1.0);

        if self.model == EadModel::Ccf {
            let values = self.ccf.curve.values();
            if values.is_empty() {
                errors.push(ValidationError::new("ead.ccf.curve", "term structure is empty"));
            }
            if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
                errors.push(ValidationError::new(
                    "ead.ccf.curve",
                    "factors must be finite and non-negative",
                ));
            }
        }

        errors
    }
}

//! Monthly effective interest rates.
//!
//! A nominal rate `R` compounded `f` times a year converts to the monthly rate
//! `(1 + R/f)^(f/12) − 1`. Floating accounts add the monthly equivalent of the annual
//! base rate, `(1 + B_t)^(1/12) − 1`, read from a scenario series.

use serde::Serialize;
use zrisk_config::model::EirConfig;
use zrisk_core::{Account, EclError, EclResult, InterestRate, Scenario};

/// Monthly rate equivalent to a nominal annual rate.
#[must_use]
pub fn monthly_rate(nominal: f64, compounding_frequency: u32) -> f64 {
    let f = f64::from(compounding_frequency);
    (1.0 + nominal / f).powf(f / 12.0) - 1.0
}

/// Monthly rate equivalent to an effective annual rate.
#[must_use]
pub fn monthly_from_annual(annual: f64) -> f64 {
    (1.0 + annual).powf(1.0 / 12.0) - 1.0
}

/// Per-period effective interest rates of one account under one scenario.
///
/// `rate(t)` accrues over period `t`; index 0 holds the rate at the observation date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveInterestRate {
    rates: Vec<f64>,
}

impl EffectiveInterestRate {
    /// Builds the rate path for `periods` forecast periods.
    pub fn for_account(
        account: &Account,
        scenario: &Scenario,
        config: &EirConfig,
        periods: usize,
    ) -> EclResult<Self> {
        let rates = match account.interest_rate {
            InterestRate::Fixed {
                rate,
                compounding_frequency,
            } => {
                check_frequency(compounding_frequency)?;
                vec![monthly_rate(rate, compounding_frequency); periods + 1]
            }
            InterestRate::Floating {
                spread,
                compounding_frequency,
            } => {
                check_frequency(compounding_frequency)?;
                let spread = monthly_rate(spread, compounding_frequency);
                (0..=periods)
                    .map(|t| {
                        scenario
                            .series_value(&config.base_rate_series, t)
                            .map(|base| spread + monthly_from_annual(base))
                    })
                    .collect::<EclResult<Vec<_>>>()?
            }
        };
        if let Some((t, r)) = rates.iter().enumerate().find(|(_, r)| **r <= -1.0 || !r.is_finite()) {
            return Err(EclError::configuration(format!("effective interest rate {r} is invalid"))
                .with_period(t));
        }
        Ok(Self { rates })
    }

    /// A flat monthly rate.
    #[must_use]
    pub fn flat(monthly: f64, periods: usize) -> Self {
        Self {
            rates: vec![monthly; periods + 1],
        }
    }

    /// Rate accruing over period `t`; the last rate extends beyond the path.
    #[must_use]
    pub fn rate(&self, t: usize) -> f64 {
        self.rates
            .get(t)
            .or_else(|| self.rates.last())
            .copied()
            .unwrap_or(0.0)
    }

    /// All rates, index 0 first.
    #[must_use]
    pub fn rates(&self) -> &[f64] {
        &self.rates
    }

    /// Discount factors `DF(t) = Π_{i=1..t} 1/(1 + rate(i))`, with `DF(0) = 1`.
    #[must_use]
    pub fn discount_factors(&self) -> Vec<f64> {
        let mut df = Vec::with_capacity(self.rates.len());
        let mut acc = 1.0;
        df.push(acc);
        for r in self.rates.iter().skip(1) {
            acc /= 1.0 + r;
            df.push(acc);
        }
        df
    }
}

fn check_frequency(frequency: u32) -> EclResult<()> {
    if frequency == 0 {
        return Err(EclError::configuration(
            "interest compounding frequency must be positive",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn account(rate: InterestRate) -> Account {
        Account::builder("ACC")
            .balance(1000.0)
            .remaining_term(3)
            .interest_rate(rate)
            .current_state("A")
            .build()
            .unwrap()
    }

    #[test]
    fn test_monthly_conversion() {
        assert_relative_eq!(monthly_rate(0.12, 12), 0.01, epsilon = 1e-15);
        assert_relative_eq!(monthly_rate(0.06, 2), 1.03f64.powf(1.0 / 6.0) - 1.0);
        assert_relative_eq!(monthly_from_annual(0.0), 0.0);
    }

    #[test]
    fn test_fixed_rate_path() {
        let eir = EffectiveInterestRate::for_account(
            &account(InterestRate::fixed(0.12)),
            &Scenario::new("BASE", 1.0, vec![0.0; 3]),
            &EirConfig::default(),
            3,
        )
        .unwrap();
        assert_eq!(eir.rates().len(), 4);
        assert_relative_eq!(eir.rate(2), 0.01, epsilon = 1e-15);
        assert_relative_eq!(eir.rate(10), 0.01, epsilon = 1e-15);

        let df = eir.discount_factors();
        assert_eq!(df[0], 1.0);
        assert_relative_eq!(df[3], 1.01f64.powi(-3), epsilon = 1e-15);
    }

    #[test]
    fn test_floating_rate_reads_base_series() {
        let scenario = Scenario::new("BASE", 1.0, vec![0.0; 2])
            .with_series("BASE_RATE", vec![0.03, 0.04, 0.05]);
        let eir = EffectiveInterestRate::for_account(
            &account(InterestRate::floating(0.012)),
            &scenario,
            &EirConfig::default(),
            2,
        )
        .unwrap();
        assert_relative_eq!(
            eir.rate(2),
            monthly_rate(0.012, 12) + monthly_from_annual(0.05),
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_floating_without_series_fails() {
        let err = EffectiveInterestRate::for_account(
            &account(InterestRate::floating(0.012)),
            &Scenario::new("BASE", 1.0, vec![0.0; 2]),
            &EirConfig::default(),
            2,
        )
        .unwrap_err();
        assert!(err.to_string().contains("BASE_RATE"));
        assert_eq!(err.context().scenario_id.as_deref(), Some("BASE"));
    }
}

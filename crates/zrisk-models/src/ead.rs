//! Exposure at default.
//!
//! The exposure used at period `t` is what would be owed on a default during that
//! period: for an amortising loan, the balance carried into the period plus the interest
//! accrued over it, before that period's payment. Exposure is zero after maturity.

use serde::Serialize;
use zrisk_config::ead::EadConfig;
use zrisk_config::policy::{CcfMethod, EadModel};
use zrisk_core::{Account, EclError, EclResult, StateKind};

use crate::eir::EffectiveInterestRate;

/// Per-period exposure of one account under one scenario.
///
/// All vectors have `periods + 1` entries aligned with the state distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExposureTrajectory {
    /// Outstanding balance at the end of each period, after payments.
    pub balance: Vec<f64>,
    /// Exposure on a default during each period.
    pub exposure: Vec<f64>,
    /// Exposure with the default penalty applied.
    pub at_default: Vec<f64>,
}

impl ExposureTrajectory {
    /// Number of forecast periods.
    #[must_use]
    pub fn periods(&self) -> usize {
        self.exposure.len().saturating_sub(1)
    }
}

/// Exposure policy bound to its configuration.
#[derive(Debug, Clone, Copy)]
pub struct ExposureModel<'a> {
    config: &'a EadConfig,
}

impl<'a> ExposureModel<'a> {
    /// Creates the model.
    #[must_use]
    pub fn new(config: &'a EadConfig) -> Self {
        Self { config }
    }

    /// Policy in use.
    #[must_use]
    pub fn policy(&self) -> EadModel {
        self.config.model
    }

    /// Adds the default penalty to an exposure.
    #[must_use]
    pub fn apply_default_penalty(&self, exposure: f64) -> f64 {
        (exposure * (1.0 + self.config.default_penalty_pct) + self.config.default_penalty_amount)
            .max(0.0)
    }

    /// Full exposure trajectory over `periods` forecast periods.
    pub fn trajectory(
        &self,
        account: &Account,
        eir: &EffectiveInterestRate,
        periods: usize,
    ) -> EclResult<ExposureTrajectory> {
        let (balance, exposure) = match self.config.model {
            EadModel::Amortising => self.amortising(account, eir, periods),
            EadModel::Constant => {
                let flat = flat(account, periods, |_| account.outstanding_balance);
                (flat.clone(), flat)
            }
            EadModel::Ccf => {
                let ccf = self.ccf(account, periods)?;
                (ccf.clone(), ccf)
            }
        };
        let at_default = exposure
            .iter()
            .map(|e| {
                if *e > 0.0 {
                    self.apply_default_penalty(*e)
                } else {
                    0.0
                }
            })
            .collect();
        Ok(ExposureTrajectory {
            balance,
            exposure,
            at_default,
        })
    }

    /// Exposure at the last period of a state path.
    ///
    /// `states[t]` is the account's state at period `t`, so the path covers periods
    /// `0..=states.len() - 1`. A performing account carries its scheduled exposure. An
    /// account in Default (or written off) carries the penalised exposure of the period
    /// its current default spell began, so the penalty is added once on entry and the
    /// exposure stops following the payment schedule.
    pub fn exposure_at(
        &self,
        account: &Account,
        eir: &EffectiveInterestRate,
        states: &[StateKind],
    ) -> EclResult<f64> {
        let Some(current) = states.last() else {
            return Err(EclError::configuration("state path is empty")
                .with_account(account.id.clone()));
        };
        let period = states.len() - 1;
        let trajectory = self.trajectory(account, eir, period)?;
        if current.is_performing() {
            return Ok(trajectory.exposure[period]);
        }
        let entry = states
            .iter()
            .rposition(|s| s.is_performing())
            .map_or(0, |last| last + 1);
        log::trace!(
            "account {} in default at period {period} since period {entry}",
            account.id
        );
        Ok(trajectory.at_default[entry])
    }

    fn ccf(&self, account: &Account, periods: usize) -> EclResult<Vec<f64>> {
        let ccf = &self.config.ccf;
        let limit = || {
            account.limit.ok_or_else(|| {
                EclError::configuration(format!(
                    "CCF method '{}' needs a facility limit",
                    ccf.method
                ))
                .with_account(account.id.clone())
            })
        };
        let exposure = match ccf.method {
            CcfMethod::Balance => {
                flat(account, periods, |t| ccf.curve.at(t) * account.outstanding_balance)
            }
            CcfMethod::Limit => {
                let limit = limit()?;
                flat(account, periods, |t| ccf.curve.at(t) * limit)
            }
            CcfMethod::Undrawn => {
                limit()?;
                let undrawn = account.undrawn();
                flat(account, periods, |t| {
                    account.outstanding_balance + ccf.curve.at(t) * undrawn
                })
            }
        };
        Ok(exposure)
    }

    /// Annuity schedule re-amortised at every payment date.
    ///
    /// At a payment date with `k` payments left (this one included) and balance `B`
    /// after accrual, the payment is `B·i / ((1 − (1+i)^−k)(1+i))`, `i` being the rate
    /// compounded over one payment interval. Payment holidays skip the payment while
    /// interest still accrues, so later payments rise.
    fn amortising(
        &self,
        account: &Account,
        eir: &EffectiveInterestRate,
        periods: usize,
    ) -> (Vec<f64>, Vec<f64>) {
        let term = account.remaining_term;
        let interval = account.payment_interval;
        let mut balance = Vec::with_capacity(periods + 1);
        let mut exposure = Vec::with_capacity(periods + 1);
        let mut b = account.outstanding_balance;
        balance.push(b);
        exposure.push(b);

        for t in 1..=periods {
            if t > term {
                balance.push(0.0);
                exposure.push(0.0);
                continue;
            }
            let r = eir.rate(t);
            let accrued = b * (1.0 + r);
            exposure.push(accrued);

            b = if account.is_payment_period(t) && !self.config.is_holiday(t) {
                let k = (term - t) / interval + 1;
                accrued - annuity_due_payment(accrued, r, interval, k)
            } else {
                accrued
            };
            b = (b * (1.0 - self.config.prepayment_rate)).max(0.0);
            balance.push(b);
        }
        (balance, exposure)
    }
}

fn flat(account: &Account, periods: usize, value: impl Fn(usize) -> f64) -> Vec<f64> {
    (0..=periods)
        .map(|t| {
            if t <= account.remaining_term {
                value(t)
            } else {
                0.0
            }
        })
        .collect()
}

fn annuity_due_payment(balance: f64, monthly_rate: f64, interval: usize, payments: usize) -> f64 {
    let i = (1.0 + monthly_rate).powi(interval as i32) - 1.0;
    let k = payments as f64;
    if i.abs() < 1e-14 {
        balance / k
    } else {
        balance * i / ((1.0 - (1.0 + i).powf(-k)) * (1.0 + i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use zrisk_config::ead::CcfCurve;
    use zrisk_core::InterestRate;

    const P: StateKind = StateKind::Performing;
    const D: StateKind = StateKind::Default;
    const W: StateKind = StateKind::WriteOff;

    fn loan(balance: f64, term: usize) -> Account {
        Account::builder("LOAN")
            .balance(balance)
            .remaining_term(term)
            .current_state("A")
            .build()
            .unwrap()
    }

    #[test]
    fn test_zero_rate_amortisation() {
        let config = EadConfig::default();
        let model = ExposureModel::new(&config);
        let t = model
            .trajectory(&loan(1000.0, 3), &EffectiveInterestRate::flat(0.0, 3), 3)
            .unwrap();

        assert_relative_eq!(t.exposure[1], 1000.0, epsilon = 1e-9);
        assert_relative_eq!(t.exposure[2], 2000.0 / 3.0, epsilon = 1e-9);
        assert_relative_eq!(t.exposure[3], 1000.0 / 3.0, epsilon = 1e-9);
        assert_relative_eq!(t.balance[3], 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_level_payment_with_interest() {
        let config = EadConfig::default();
        let model = ExposureModel::new(&config);
        let account = Account::builder("LOAN")
            .balance(1000.0)
            .remaining_term(12)
            .interest_rate(InterestRate::fixed(0.12))
            .current_state("A")
            .build()
            .unwrap();
        let eir = EffectiveInterestRate::flat(0.01, 12);
        let t = model.trajectory(&account, &eir, 12).unwrap();

        // balances after payment match an ordinary annuity on the opening balance
        let pmt = 1000.0 * 0.01 / (1.0 - 1.01f64.powi(-12));
        assert_relative_eq!(t.balance[1], 1010.0 - pmt, epsilon = 1e-9);
        assert_relative_eq!(t.balance[12], 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_payment_holiday_raises_later_exposure() {
        let base_config = EadConfig::default();
        let holiday_config = EadConfig::default().with_payment_holidays(vec![1, 2]);
        let account = loan(1200.0, 6);
        let eir = EffectiveInterestRate::flat(0.005, 6);

        let base = ExposureModel::new(&base_config)
            .trajectory(&account, &eir, 6)
            .unwrap();
        let holiday = ExposureModel::new(&holiday_config)
            .trajectory(&account, &eir, 6)
            .unwrap();

        for t in 2..=6 {
            assert!(holiday.exposure[t] > base.exposure[t]);
        }
        assert_relative_eq!(holiday.balance[6], 0.0, epsilon = 1e-9);
        assert_relative_eq!(holiday.balance[2], 1200.0 * 1.005f64.powi(2), epsilon = 1e-9);
    }

    #[test]
    fn test_quarterly_payments() {
        let config = EadConfig::default();
        let account = Account::builder("LOAN")
            .balance(900.0)
            .remaining_term(9)
            .payment_interval(3)
            .current_state("A")
            .build()
            .unwrap();
        let t = ExposureModel::new(&config)
            .trajectory(&account, &EffectiveInterestRate::flat(0.0, 9), 9)
            .unwrap();
        assert_relative_eq!(t.balance[2], 900.0);
        assert_relative_eq!(t.balance[3], 600.0, epsilon = 1e-9);
        assert_relative_eq!(t.balance[9], 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_constant_and_maturity() {
        let config = EadConfig::new(EadModel::Constant);
        let t = ExposureModel::new(&config)
            .trajectory(&loan(500.0, 2), &EffectiveInterestRate::flat(0.01, 4), 4)
            .unwrap();
        assert_eq!(t.exposure, vec![500.0, 500.0, 500.0, 0.0, 0.0]);
    }

    #[test]
    fn test_ccf_methods() {
        let account = Account::builder("CARD")
            .balance(400.0)
            .limit(1000.0)
            .remaining_term(12)
            .current_state("A")
            .build()
            .unwrap();
        let eir = EffectiveInterestRate::flat(0.0, 2);

        let undrawn = EadConfig::ccf(CcfMethod::Undrawn, CcfCurve::Constant(0.5));
        let t = ExposureModel::new(&undrawn).trajectory(&account, &eir, 2).unwrap();
        assert_relative_eq!(t.exposure[1], 700.0);

        let limit = EadConfig::ccf(CcfMethod::Limit, CcfCurve::TermStructure(vec![0.8, 0.9]));
        let t = ExposureModel::new(&limit).trajectory(&account, &eir, 2).unwrap();
        assert_relative_eq!(t.exposure[1], 800.0);
        assert_relative_eq!(t.exposure[2], 900.0);

        let balance = EadConfig::ccf(CcfMethod::Balance, CcfCurve::Constant(1.1));
        let t = ExposureModel::new(&balance).trajectory(&account, &eir, 2).unwrap();
        assert_relative_eq!(t.exposure[2], 440.0, epsilon = 1e-12);
    }

    #[test]
    fn test_ccf_without_limit_is_configuration_error() {
        let config = EadConfig::ccf(CcfMethod::Undrawn, CcfCurve::Constant(0.5));
        let err = ExposureModel::new(&config)
            .trajectory(&loan(100.0, 12), &EffectiveInterestRate::flat(0.0, 1), 1)
            .unwrap_err();
        assert_eq!(err.context().account_id.as_deref(), Some("LOAN"));
    }

    #[test]
    fn test_default_penalty_applied_once() {
        let config = EadConfig::new(EadModel::Constant).with_default_penalty(0.1, 25.0);
        let model = ExposureModel::new(&config);
        let account = loan(1000.0, 3);
        let eir = EffectiveInterestRate::flat(0.0, 3);

        let performing = model.exposure_at(&account, &eir, &[P, P, P]).unwrap();
        let entering = model.exposure_at(&account, &eir, &[P, P, D]).unwrap();
        let staying = model.exposure_at(&account, &eir, &[P, P, D, D]).unwrap();
        assert_relative_eq!(performing, 1000.0);
        assert_relative_eq!(entering, 1125.0);
        assert_relative_eq!(staying, 1125.0);
    }

    #[test]
    fn test_defaulted_amortising_exposure_is_frozen_at_entry() {
        let config = EadConfig::default().with_default_penalty(0.1, 25.0);
        let model = ExposureModel::new(&config);
        let account = loan(1200.0, 4);
        let eir = EffectiveInterestRate::flat(0.0, 4);

        // scheduled exposure at t=2 is 900, so the penalised exposure is 1015
        let entering = model.exposure_at(&account, &eir, &[P, P, D]).unwrap();
        let staying = model.exposure_at(&account, &eir, &[P, P, D, D]).unwrap();
        let written_off = model.exposure_at(&account, &eir, &[P, P, D, D, W]).unwrap();
        assert_relative_eq!(entering, 1015.0, epsilon = 1e-9);
        assert_relative_eq!(staying, 1015.0, epsilon = 1e-9);
        assert_relative_eq!(written_off, 1015.0, epsilon = 1e-9);

        // a cured account that defaults again is penalised on the new entry
        let redefault = model.exposure_at(&account, &eir, &[P, D, P, D, D]).unwrap();
        assert_relative_eq!(redefault, 600.0 * 1.1 + 25.0, epsilon = 1e-9);

        // an account already in default at the reporting date keeps its opening exposure
        let opening = model.exposure_at(&account, &eir, &[D, D, D]).unwrap();
        assert_relative_eq!(opening, 1200.0 * 1.1 + 25.0, epsilon = 1e-9);

        assert!(model.exposure_at(&account, &eir, &[]).is_err());
    }

    #[test]
    fn test_prepayment_reduces_balance() {
        let config = EadConfig::default().with_prepayment_rate(0.01);
        let t = ExposureModel::new(&config)
            .trajectory(&loan(1000.0, 10), &EffectiveInterestRate::flat(0.0, 10), 10)
            .unwrap();
        assert_relative_eq!(t.balance[1], 900.0 * 0.99, epsilon = 1e-9);
        assert_relative_eq!(t.balance[10], 0.0, epsilon = 1e-9);
    }
}

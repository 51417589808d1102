//! Loss given default.

use serde::Serialize;
use zrisk_config::lgd::{LgdModel, SecuredLgd};
use zrisk_core::{Account, EclError, EclResult, Scenario};

use crate::ead::ExposureTrajectory;
use crate::eir::EffectiveInterestRate;

/// Per-period loss severity of one account under one scenario, `periods + 1` entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LossTrajectory {
    /// Loss given default for a default in each period, in `[0, 1]`.
    pub lgd: Vec<f64>,
}

impl LossTrajectory {
    /// Severity at period `t`.
    #[must_use]
    pub fn at(&self, t: usize) -> f64 {
        self.lgd[t]
    }
}

/// Loss-severity policy bound to its configuration.
#[derive(Debug, Clone, Copy)]
pub struct LossModel<'a> {
    model: &'a LgdModel,
}

impl<'a> LossModel<'a> {
    /// Creates the model.
    #[must_use]
    pub fn new(model: &'a LgdModel) -> Self {
        Self { model }
    }

    /// Severity path over `periods` forecast periods.
    ///
    /// The secured policy reads the exposure at default for each period; the other
    /// policies depend only on the scenario.
    pub fn trajectory(
        &self,
        account: &Account,
        scenario: &Scenario,
        exposure: &ExposureTrajectory,
        eir: &EffectiveInterestRate,
        periods: usize,
    ) -> EclResult<LossTrajectory> {
        let lgd = match self.model {
            LgdModel::Secured(secured) => {
                secured_path(secured, account, scenario, exposure, eir, periods)?
            }
            LgdModel::Unsecured(unsecured) => vec![clamp_unit(unsecured.value()?); periods + 1],
            LgdModel::ConstantGrowth { base, growth_rate } => (0..=periods)
                .map(|t| clamp_unit(base * (1.0 + growth_rate).powi(t as i32)))
                .collect(),
            LgdModel::Indexed { base, index_series } => {
                let index = scenario.series(index_series)?;
                let origin = index.first().copied().unwrap_or(0.0);
                if origin <= 0.0 {
                    return Err(EclError::configuration(format!(
                        "index series '{index_series}' must start positive"
                    ))
                    .with_scenario(scenario.id.clone()));
                }
                if index.len() <= periods {
                    return Err(EclError::configuration(format!(
                        "index series '{index_series}' has {} points, {} needed",
                        index.len(),
                        periods + 1
                    ))
                    .with_scenario(scenario.id.clone())
                    .with_period(index.len()));
                }
                index[..=periods]
                    .iter()
                    .map(|x| clamp_unit(base * x / origin))
                    .collect()
            }
        };
        Ok(LossTrajectory { lgd })
    }
}

fn secured_path(
    config: &SecuredLgd,
    account: &Account,
    scenario: &Scenario,
    exposure: &ExposureTrajectory,
    eir: &EffectiveInterestRate,
    periods: usize,
) -> EclResult<Vec<f64>> {
    let collateral = account.collateral_value.ok_or_else(|| {
        EclError::configuration("secured LGD needs a collateral value")
            .with_account(account.id.clone())
    })?;

    let index = match &config.index_series {
        Some(name) => {
            let series = scenario.series(name)?;
            let origin = series.first().copied().unwrap_or(0.0);
            if origin <= 0.0 {
                return Err(EclError::configuration(format!(
                    "collateral index '{name}' must start positive"
                ))
                .with_scenario(scenario.id.clone()));
            }
            Some((series, origin))
        }
        None => None,
    };

    let tts = config.time_to_sale;
    let haircut = config.haircut();
    let pcure = config.probability_of_cure;

    let lgd = (0..=periods)
        .map(|t| {
            let ead = exposure.at_default.get(t).copied().unwrap_or(0.0);
            let lgp = if ead <= 0.0 {
                config.floor
            } else {
                let growth = index.map_or(1.0, |(series, origin)| index_at(series, t + tts) / origin);
                let df = (1.0 + eir.rate(t)).powi(-(tts as i32));
                let recovery = collateral * growth * haircut * df;
                config.floor.max(1.0 - (recovery / ead).min(1.0))
            };
            clamp_unit(pcure * config.loss_given_cure + (1.0 - pcure) * lgp)
        })
        .collect();
    Ok(lgd)
}

/// Series value at `t`, held flat beyond its last entry.
///
/// Sale-lagged collateral lookups read up to `time_to_sale` periods past the horizon.
fn index_at(series: &[f64], t: usize) -> f64 {
    series
        .get(t)
        .or_else(|| series.last())
        .copied()
        .unwrap_or(1.0)
}

fn clamp_unit(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

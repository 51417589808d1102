//! Run results.

use std::collections::BTreeMap;

use serde::Serialize;
use uuid::Uuid;
use zrisk_config::staging::Stage;
use zrisk_core::{EclError, ErrorKind};
use zrisk_credit::{DefaultProbabilities, StageProbabilities, StateDistribution};
use zrisk_models::{ExposureTrajectory, LossTrajectory};

/// Staging outputs of one unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StagedEcl {
    /// Stage at the observation date; `None` for a written-off account.
    pub reporting_stage: Option<Stage>,
    /// Probability of each stage per period.
    pub probabilities: StageProbabilities,
    /// Expected provision per period.
    pub provision: Vec<f64>,
    /// Provision at the observation date.
    pub ecl: f64,
}

/// Outputs of one (account, scenario) unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitResult {
    /// Account identifier.
    pub account_id: String,
    /// Scenario identifier.
    pub scenario_id: String,
    /// Scenario probability weight.
    pub weight: f64,
    /// Rating-state trajectory.
    pub distribution: StateDistribution,
    /// Default-entry probabilities.
    pub default_probabilities: DefaultProbabilities,
    /// Exposure trajectory.
    pub exposure: ExposureTrajectory,
    /// Loss-severity trajectory.
    pub loss: LossTrajectory,
    /// Discount factors at the effective interest rate.
    pub discount_factors: Vec<f64>,
    /// Marginal loss per period.
    pub marginal_loss: Vec<f64>,
    /// Probability of having been written off, read from the write-off column.
    pub probability_of_write_off: Vec<f64>,
    /// 12-month ECL.
    pub ecl_12m: f64,
    /// Lifetime ECL.
    pub ecl_lifetime: f64,
    /// ECL over the configured horizon.
    pub ecl: f64,
    /// Staging outputs when a stage map is configured.
    pub staging: Option<StagedEcl>,
}

impl UnitResult {
    /// Number of forecast periods.
    #[must_use]
    pub fn periods(&self) -> usize {
        self.marginal_loss.len().saturating_sub(1)
    }
}

/// A unit that failed; its trajectories were discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitFailure {
    /// Account identifier.
    pub account_id: String,
    /// Scenario identifier.
    pub scenario_id: String,
    /// The error that stopped the unit.
    pub error: EclError,
}

impl UnitFailure {
    /// Error category.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

/// Outcome of a portfolio run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Run identifier.
    pub run_id: Uuid,
    /// Successful units in (account, scenario) input order.
    pub results: Vec<UnitResult>,
    /// Failed units.
    pub failures: Vec<UnitFailure>,
    /// Sum of unit ECLs per scenario over successful units.
    pub scenario_totals: BTreeMap<String, f64>,
    /// Scenario-weighted ECL per account, for accounts whose every scenario succeeded.
    pub weighted_ecl: BTreeMap<String, f64>,
}

impl RunReport {
    /// Returns true if no unit failed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of units attempted.
    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.results.len() + self.failures.len()
    }

    /// Result of one unit.
    #[must_use]
    pub fn result(&self, account_id: &str, scenario_id: &str) -> Option<&UnitResult> {
        self.results
            .iter()
            .find(|r| r.account_id == account_id && r.scenario_id == scenario_id)
    }

    /// Failure of one unit.
    #[must_use]
    pub fn failure(&self, account_id: &str, scenario_id: &str) -> Option<&UnitFailure> {
        self.failures
            .iter()
            .find(|f| f.account_id == account_id && f.scenario_id == scenario_id)
    }

    /// Scenario-weighted ECL of one account.
    #[must_use]
    pub fn weighted(&self, account_id: &str) -> Option<f64> {
        self.weighted_ecl.get(account_id).copied()
    }

    /// Portfolio total of the weighted ECL over accounts with a weighted figure.
    #[must_use]
    pub fn total_weighted_ecl(&self) -> f64 {
        self.weighted_ecl.values().sum()
    }
}

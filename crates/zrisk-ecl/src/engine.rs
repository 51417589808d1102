//! Portfolio ECL engine.
//!
//! Every (account, scenario) pair is an independent unit: PiT path, state trajectory,
//! exposure, loss severity and marginal losses are computed from shared read-only
//! inputs and owned by the unit. Units may run on separate threads; the final
//! reduction into scenario totals and weighted figures is single-threaded.

use std::collections::BTreeMap;
use std::sync::Arc;

use uuid::Uuid;
use zrisk_config::{ModelConfig, Validate};
use zrisk_core::types::check_weights;
use zrisk_core::{Account, EclResult, RatingScale, Scenario, ScenarioSet};
use zrisk_credit::{
    resolve_cure_index, CreditCycleAdjuster, DefaultProbabilities, MarkovPropagator, StageMap,
};
use zrisk_math::StochasticMatrix;
use zrisk_models::{EffectiveInterestRate, ExposureModel, LossModel};

use crate::aggregator::EclAggregator;
use crate::parallel::maybe_parallel_map;
use crate::results::{RunReport, StagedEcl, UnitFailure, UnitResult};

/// Computes ECL for accounts under scenarios from one TtC matrix and configuration.
#[derive(Debug, Clone)]
pub struct EclEngine {
    ttc: StochasticMatrix,
    config: ModelConfig,
    adjuster: CreditCycleAdjuster,
    cure: Option<usize>,
    propagator: MarkovPropagator,
    stage_map: Option<StageMap>,
    aggregator: EclAggregator,
}

impl EclEngine {
    /// Creates an engine after validating the configuration against the TtC matrix.
    pub fn new(ttc: StochasticMatrix, config: ModelConfig) -> EclResult<Self> {
        config.validate_or_error()?;
        let adjuster = CreditCycleAdjuster::from_config(&config)?;
        let cure = resolve_cure_index(ttc.scale(), config.cure_state.as_deref())?;

        let scale = if config.write_off.is_some() {
            Arc::new(ttc.scale().with_write_off()?)
        } else {
            Arc::clone(ttc.scale_handle())
        };
        let stage_map = config
            .stage_map
            .as_ref()
            .map(|rules| StageMap::new(&scale, rules))
            .transpose()?;

        tracing::debug!(
            states = scale.len(),
            correlation = config.correlation,
            transform = %config.transform,
            shift_method = %config.shift_method,
            write_off = config.write_off.is_some(),
            "ECL engine configured"
        );

        Ok(Self {
            aggregator: EclAggregator::from_config(&config),
            propagator: MarkovPropagator::new(scale),
            ttc,
            config,
            adjuster,
            cure,
            stage_map,
        })
    }

    /// The model configuration.
    #[must_use]
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// The TtC matrix.
    #[must_use]
    pub fn ttc(&self) -> &StochasticMatrix {
        &self.ttc
    }

    /// Rating scale of the PiT matrices and state trajectories.
    #[must_use]
    pub fn scale(&self) -> &RatingScale {
        self.propagator.scale()
    }

    /// Computes one (account, scenario) unit over the account's remaining lifetime.
    ///
    /// Errors carry the account and scenario identifiers.
    pub fn run_unit(&self, account: &Account, scenario: &Scenario) -> EclResult<UnitResult> {
        self.compute_unit(account, scenario).map_err(|e| {
            e.with_account(account.id.clone())
                .with_scenario(scenario.id.clone())
        })
    }

    fn compute_unit(&self, account: &Account, scenario: &Scenario) -> EclResult<UnitResult> {
        let periods = account.remaining_term;
        let scale = self.propagator.scale();

        let write_off = self.config.write_off.as_ref().map(|split| (split, self.cure));
        let path = self
            .adjuster
            .pit_path(&self.ttc, scenario, periods, write_off)?;
        let start = scale.resolve(&account.current_state)?;
        let distribution = self.propagator.propagate_from_index(start, &path)?;
        let default_probabilities = DefaultProbabilities::from_trajectory(&distribution, &path)?;

        let (ead_config, lgd_model) = self.config.policies_for(&account.product);
        let eir = EffectiveInterestRate::for_account(account, scenario, &self.config.eir, periods)?;
        let exposure = ExposureModel::new(ead_config).trajectory(account, &eir, periods)?;
        let loss = LossModel::new(lgd_model).trajectory(account, scenario, &exposure, &eir, periods)?;
        let discount_factors = eir.discount_factors();

        let marginal_loss = self.aggregator.marginal_losses(
            &default_probabilities,
            &exposure,
            &loss,
            &discount_factors,
        )?;

        let staging = match &self.stage_map {
            Some(map) => {
                let origination = scale.resolve(&account.origination_state)?;
                let probabilities =
                    map.stage_probabilities(&distribution, origination, account.watchlist);
                let provision = self.aggregator.provision(
                    &marginal_loss,
                    &probabilities,
                    &exposure,
                    &loss,
                    &discount_factors,
                )?;
                Some(StagedEcl {
                    reporting_stage: map.reporting_stage(origination, start, account.watchlist),
                    ecl: provision.first().copied().unwrap_or(0.0),
                    probabilities,
                    provision,
                })
            }
            None => None,
        };

        let result = UnitResult {
            account_id: account.id.clone(),
            scenario_id: scenario.id.clone(),
            weight: scenario.weight,
            probability_of_write_off: distribution.write_off_column(),
            ecl_12m: EclAggregator::twelve_month(&marginal_loss),
            ecl_lifetime: EclAggregator::lifetime(&marginal_loss),
            ecl: self.aggregator.reported(&marginal_loss),
            distribution,
            default_probabilities,
            exposure,
            loss,
            discount_factors,
            marginal_loss,
            staging,
        };

        tracing::debug!(
            account = %result.account_id,
            scenario = %result.scenario_id,
            periods,
            ecl = result.ecl,
            "unit complete"
        );
        Ok(result)
    }

    /// Scenario-weighted ECL of one account; fails on the first failing scenario.
    pub fn weighted_ecl(&self, account: &Account, scenarios: &ScenarioSet) -> EclResult<f64> {
        let pairs = scenarios
            .iter()
            .map(|s| self.run_unit(account, s).map(|r| (s.weight, r.ecl)))
            .collect::<EclResult<Vec<_>>>()?;
        EclAggregator::weighted(pairs, self.config.weight_tolerance)
    }

    /// Runs every account under every scenario.
    ///
    /// A failing unit is reported in [`RunReport::failures`] and does not affect other
    /// units. Only inconsistent scenario weights fail the whole run.
    pub fn run(&self, accounts: &[Account], scenarios: &ScenarioSet) -> EclResult<RunReport> {
        check_weights(
            scenarios.iter().map(|s| s.weight),
            self.config.weight_tolerance,
        )?;

        let run_id = Uuid::new_v4();
        let units: Vec<(&Account, &Scenario)> = accounts
            .iter()
            .flat_map(|a| scenarios.iter().map(move |s| (a, s)))
            .collect();
        tracing::info!(
            %run_id,
            accounts = accounts.len(),
            scenarios = scenarios.len(),
            units = units.len(),
            "ECL run started"
        );

        let outcomes = maybe_parallel_map(&units, &self.config.parallel, |(account, scenario)| {
            self.run_unit(account, scenario)
                .map_err(|error| UnitFailure {
                    account_id: account.id.clone(),
                    scenario_id: scenario.id.clone(),
                    error,
                })
        });

        let mut results = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(result) => results.push(result),
                Err(failure) => {
                    tracing::warn!(
                        %run_id,
                        account = %failure.account_id,
                        scenario = %failure.scenario_id,
                        error = %failure.error,
                        "unit failed"
                    );
                    failures.push(failure);
                }
            }
        }

        let mut scenario_totals: BTreeMap<String, f64> = scenarios
            .iter()
            .map(|s| (s.id.clone(), 0.0))
            .collect();
        let mut per_account: BTreeMap<&str, Vec<(f64, f64)>> = BTreeMap::new();
        for result in &results {
            *scenario_totals.entry(result.scenario_id.clone()).or_insert(0.0) += result.ecl;
            per_account
                .entry(result.account_id.as_str())
                .or_default()
                .push((result.weight, result.ecl));
        }

        let mut weighted_ecl = BTreeMap::new();
        for (account_id, pairs) in per_account {
            if pairs.len() == scenarios.len() {
                let ecl = EclAggregator::weighted(pairs, self.config.weight_tolerance)?;
                weighted_ecl.insert(account_id.to_string(), ecl);
            }
        }

        tracing::info!(
            %run_id,
            succeeded = results.len(),
            failed = failures.len(),
            "ECL run finished"
        );

        Ok(RunReport {
            run_id,
            results,
            failures,
            scenario_totals,
            weighted_ecl,
        })
    }
}

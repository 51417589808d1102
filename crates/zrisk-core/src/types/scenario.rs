//! Macroeconomic scenario paths.
//!
//! A [`Scenario`] is a single path of systematic risk factors (one Z value per forecast
//! period) together with any named macro series the loss and rate models read, such as a
//! collateral price index or a base rate. Sampling of paths happens outside the engine;
//! scenarios arrive here fully materialised.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{EclError, EclResult};

/// Default tolerance when checking that scenario weights sum to one.
pub const DEFAULT_WEIGHT_TOLERANCE: f64 = 1e-6;

/// One macroeconomic scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario identifier.
    pub id: String,
    /// Probability weight.
    pub weight: f64,
    /// Systematic risk factor per forecast period; `z[0]` drives period 1.
    pub z: Vec<f64>,
    /// Named macro series; index 0 is the observation date.
    #[serde(default)]
    pub series: BTreeMap<String, Vec<f64>>,
}

impl Scenario {
    /// Creates a scenario from its Z path.
    #[must_use]
    pub fn new(id: impl Into<String>, weight: f64, z: Vec<f64>) -> Self {
        Self {
            id: id.into(),
            weight,
            z,
            series: BTreeMap::new(),
        }
    }

    /// Adds a named macro series.
    #[must_use]
    pub fn with_series(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.series.insert(name.into(), values);
        self
    }

    /// Number of forecast periods covered by the Z path.
    #[must_use]
    pub fn horizon(&self) -> usize {
        self.z.len()
    }

    /// Z value for a 1-based forecast period.
    pub fn z_at(&self, period: usize) -> EclResult<f64> {
        period
            .checked_sub(1)
            .and_then(|i| self.z.get(i))
            .copied()
            .ok_or_else(|| {
                EclError::configuration(format!(
                    "Z path has {} periods, period {period} requested",
                    self.z.len()
                ))
                .with_scenario(self.id.clone())
                .with_period(period)
            })
    }

    /// Returns the named macro series.
    pub fn series(&self, name: &str) -> EclResult<&[f64]> {
        self.series.get(name).map(Vec::as_slice).ok_or_else(|| {
            EclError::configuration(format!("scenario has no series named '{name}'"))
                .with_scenario(self.id.clone())
        })
    }

    /// Value of a named series at period `t` (0 is the observation date).
    pub fn series_value(&self, name: &str, t: usize) -> EclResult<f64> {
        let values = self.series(name)?;
        values.get(t).copied().ok_or_else(|| {
            EclError::configuration(format!(
                "series '{name}' has {} points, index {t} requested",
                values.len()
            ))
            .with_scenario(self.id.clone())
            .with_period(t)
        })
    }
}

/// A probability-weighted set of scenarios.
///
/// Weights are non-negative and sum to one within tolerance; identifiers are unique.
/// Deserialisation checks weights against [`DEFAULT_WEIGHT_TOLERANCE`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Scenario>", into = "Vec<Scenario>")]
pub struct ScenarioSet {
    scenarios: Vec<Scenario>,
}

impl ScenarioSet {
    /// Creates a validated scenario set.
    pub fn new(scenarios: Vec<Scenario>, tolerance: f64) -> EclResult<Self> {
        if scenarios.is_empty() {
            return Err(EclError::configuration("scenario set is empty"));
        }
        for (i, scenario) in scenarios.iter().enumerate() {
            if !scenario.weight.is_finite() || scenario.weight < 0.0 {
                return Err(EclError::configuration(format!(
                    "scenario weight {} is not a probability",
                    scenario.weight
                ))
                .with_scenario(scenario.id.clone()));
            }
            if scenarios[..i].iter().any(|s| s.id == scenario.id) {
                return Err(EclError::configuration("duplicate scenario id")
                    .with_scenario(scenario.id.clone()));
            }
        }
        check_weights(scenarios.iter().map(|s| s.weight), tolerance)?;
        Ok(Self { scenarios })
    }

    /// Wraps a single scenario with full weight.
    #[must_use]
    pub fn single(mut scenario: Scenario) -> Self {
        scenario.weight = 1.0;
        Self {
            scenarios: vec![scenario],
        }
    }

    /// The scenarios.
    #[must_use]
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Number of scenarios.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    /// Always false for a constructed set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Looks up a scenario by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id == id)
    }

    /// Iterates over the scenarios.
    pub fn iter(&self) -> std::slice::Iter<'_, Scenario> {
        self.scenarios.iter()
    }
}

impl<'a> IntoIterator for &'a ScenarioSet {
    type Item = &'a Scenario;
    type IntoIter = std::slice::Iter<'a, Scenario>;

    fn into_iter(self) -> Self::IntoIter {
        self.scenarios.iter()
    }
}

impl TryFrom<Vec<Scenario>> for ScenarioSet {
    type Error = EclError;

    fn try_from(scenarios: Vec<Scenario>) -> EclResult<Self> {
        Self::new(scenarios, DEFAULT_WEIGHT_TOLERANCE)
    }
}

impl From<ScenarioSet> for Vec<Scenario> {
    fn from(set: ScenarioSet) -> Self {
        set.scenarios
    }
}

/// Checks that probability weights sum to one within `tolerance`.
pub fn check_weights(weights: impl IntoIterator<Item = f64>, tolerance: f64) -> EclResult<()> {
    let total: f64 = weights.into_iter().sum();
    if (total - 1.0).abs() > tolerance {
        return Err(EclError::configuration(format!(
            "scenario weights sum to {total}, expected 1 (tolerance {tolerance:e})"
        )));
    }
    Ok(())
}

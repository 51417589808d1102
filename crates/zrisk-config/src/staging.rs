//! IFRS 9 stage allocation rules.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use zrisk_core::EclError;

use crate::error::{Validate, ValidationError};

/// IFRS 9 impairment stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Stage {
    /// Performing, 12-month ECL.
    One,
    /// Significant increase in credit risk, lifetime ECL.
    Two,
    /// Credit impaired.
    Three,
}

impl Stage {
    /// All stages in order.
    pub const ALL: [Stage; 3] = [Stage::One, Stage::Two, Stage::Three];

    /// Zero-based position, for indexing per-stage arrays.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
            Self::Three => 2,
        }
    }
}

impl TryFrom<u8> for Stage {
    type Error = EclError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            other => Err(EclError::configuration(format!(
                "stage {other} is not one of 1, 2, 3"
            ))),
        }
    }
}

impl From<Stage> for u8 {
    fn from(stage: Stage) -> Self {
        match stage {
            Stage::One => 1,
            Stage::Two => 2,
            Stage::Three => 3,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Stage {}", u8::from(*self))
    }
}

/// Stage allocation rules.
///
/// `map[origination][current]` gives the stage explicitly. Pairs not listed fall back to
/// a notch rule: Default is stage 3, a downgrade of at least `significant_downgrade`
/// notches from origination is stage 2, anything else stage 1. Write-off carries no stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageMapConfig {
    /// Explicit stage per origination state and current state.
    #[serde(default)]
    pub map: BTreeMap<String, BTreeMap<String, Stage>>,

    /// Downgrade in notches that moves a performing account to stage 2.
    #[serde(default = "default_significant_downgrade")]
    pub significant_downgrade: usize,

    /// Periods from the observation date during which a watchlisted account is at
    /// least stage 2.
    #[serde(default = "default_time_in_watchlist")]
    pub time_in_watchlist: usize,
}

fn default_significant_downgrade() -> usize {
    2
}

fn default_time_in_watchlist() -> usize {
    1
}

impl Default for StageMapConfig {
    fn default() -> Self {
        Self {
            map: BTreeMap::new(),
            significant_downgrade: default_significant_downgrade(),
            time_in_watchlist: default_time_in_watchlist(),
        }
    }
}

impl StageMapConfig {
    /// Sets the stage for one origination/current pair.
    #[must_use]
    pub fn with_entry(
        mut self,
        origination: impl Into<String>,
        current: impl Into<String>,
        stage: Stage,
    ) -> Self {
        self.map
            .entry(origination.into())
            .or_default()
            .insert(current.into(), stage);
        self
    }

    /// Sets the downgrade threshold.
    #[must_use]
    pub fn with_significant_downgrade(mut self, notches: usize) -> Self {
        self.significant_downgrade = notches;
        self
    }
}

impl Validate for StageMapConfig {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if self.significant_downgrade == 0 {
            errors.push(ValidationError::new(
                "stage_map.significant_downgrade",
                "must be at least one notch",
            ));
        }
        errors
    }
}

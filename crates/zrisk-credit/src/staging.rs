//! IFRS 9 stage allocation over a state trajectory.

use serde::Serialize;
use zrisk_config::staging::{Stage, StageMapConfig};
use zrisk_core::{EclError, EclResult, RatingScale, StateKind};

use crate::propagation::StateDistribution;

/// Resolved stage table for one rating scale.
#[derive(Debug, Clone, PartialEq)]
pub struct StageMap {
    /// `table[origination][current]`.
    table: Vec<Vec<Option<Stage>>>,
    time_in_watchlist: usize,
}

impl StageMap {
    /// Resolves the configured rules against `scale`.
    pub fn new(scale: &RatingScale, config: &StageMapConfig) -> EclResult<Self> {
        let n = scale.len();
        let mut table: Vec<Vec<Option<Stage>>> = (0..n)
            .map(|o| {
                (0..n)
                    .map(|c| default_stage(scale, o, c, config.significant_downgrade))
                    .collect()
            })
            .collect();

        for (origination, row) in &config.map {
            let o = scale.resolve(origination)?;
            for (current, stage) in row {
                let c = scale.resolve(current)?;
                if scale.write_off_index() == Some(c) {
                    return Err(EclError::configuration(format!(
                        "write-off state '{current}' cannot be given a stage"
                    )));
                }
                table[o][c] = Some(*stage);
            }
        }

        Ok(Self {
            table,
            time_in_watchlist: config.time_in_watchlist,
        })
    }

    /// Stage of an account that originated in `origination` and is now in `current`.
    #[must_use]
    pub fn stage(&self, origination: usize, current: usize) -> Option<Stage> {
        self.table
            .get(origination)
            .and_then(|row| row.get(current))
            .copied()
            .flatten()
    }

    /// Stage at the observation date, with the watchlist override applied.
    #[must_use]
    pub fn reporting_stage(
        &self,
        origination: usize,
        current: usize,
        watchlist: bool,
    ) -> Option<Stage> {
        let stage = self.stage(origination, current)?;
        Some(if watchlist && self.time_in_watchlist > 0 {
            stage.max(Stage::Two)
        } else {
            stage
        })
    }

    /// Probability of each stage at every period of a trajectory.
    ///
    /// A watchlisted account has its stage-1 mass moved to stage 2 for the first
    /// `time_in_watchlist` periods, starting at the observation date.
    #[must_use]
    pub fn stage_probabilities(
        &self,
        distribution: &StateDistribution,
        origination: usize,
        watchlist: bool,
    ) -> StageProbabilities {
        let per_period = distribution
            .vectors()
            .iter()
            .enumerate()
            .map(|(t, v)| {
                let mut p = [0.0; 3];
                for (current, mass) in v.iter().enumerate() {
                    if let Some(stage) = self.stage(origination, current) {
                        p[stage.index()] += mass;
                    }
                }
                if watchlist && t < self.time_in_watchlist {
                    p[1] += p[0];
                    p[0] = 0.0;
                }
                p
            })
            .collect();
        StageProbabilities { per_period }
    }
}

fn default_stage(
    scale: &RatingScale,
    origination: usize,
    current: usize,
    significant_downgrade: usize,
) -> Option<Stage> {
    match scale.state(current)?.kind {
        StateKind::WriteOff => None,
        StateKind::Default => Some(Stage::Three),
        StateKind::Performing | StateKind::Cure => {
            if current.saturating_sub(origination) >= significant_downgrade {
                Some(Stage::Two)
            } else {
                Some(Stage::One)
            }
        }
    }
}

/// Per-period stage probabilities; written-off mass belongs to no stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageProbabilities {
    per_period: Vec<[f64; 3]>,
}

impl StageProbabilities {
    /// Probabilities of stages 1, 2 and 3 at period `t`.
    #[must_use]
    pub fn at(&self, t: usize) -> [f64; 3] {
        self.per_period[t]
    }

    /// Probability of `stage` at each period.
    #[must_use]
    pub fn series(&self, stage: Stage) -> Vec<f64> {
        self.per_period.iter().map(|p| p[stage.index()]).collect()
    }

    /// Number of entries (periods plus the observation date).
    #[must_use]
    pub fn len(&self) -> usize {
        self.per_period.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.per_period.is_empty()
    }
}

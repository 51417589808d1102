//! # ZRisk Credit
//!
//! Rating-migration side of the ECL calculation.
//!
//! - **Credit cycle**: [`CreditCycleAdjuster`] turns a TtC matrix and a Z value into a
//!   PiT matrix, and builds the per-period PiT path of a scenario
//! - **Propagation**: [`MarkovPropagator`] produces the [`StateDistribution`] trajectory
//! - **Default probabilities**: [`DefaultProbabilities`] from a trajectory
//! - **Staging**: [`StageMap`] and per-period [`StageProbabilities`]
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use zrisk_config::policy::ZTransform;
//! use zrisk_core::{RatingScale, Scenario};
//! use zrisk_credit::prelude::*;
//! use zrisk_math::StochasticMatrix;
//!
//! let scale = Arc::new(RatingScale::from_names(&["A"], "D").unwrap());
//! let ttc = StochasticMatrix::from_rows(scale.clone(), &[vec![0.98, 0.02], vec![0.0, 1.0]])
//!     .unwrap();
//! let adjuster = CreditCycleAdjuster::new(0.12, ZTransform::Calibrated).unwrap();
//! let scenario = Scenario::new("BASE", 1.0, vec![0.0; 12]);
//!
//! let path = adjuster.pit_path(&ttc, &scenario, 12, None).unwrap();
//! let dist = MarkovPropagator::new(scale).propagate_from_state("A", &path).unwrap();
//! assert_eq!(dist.periods(), 12);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::float_cmp)]
#![allow(clippy::needless_range_loop)]

pub mod credit_cycle;
pub mod pd;
pub mod propagation;
pub mod staging;

#[cfg(test)]
mod proptests;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::credit_cycle::{resolve_cure_index, CreditCycleAdjuster};
    pub use crate::pd::DefaultProbabilities;
    pub use crate::propagation::{MarkovPropagator, StateDistribution};
    pub use crate::staging::{StageMap, StageProbabilities};
}

pub use credit_cycle::{resolve_cure_index, CreditCycleAdjuster};
pub use pd::DefaultProbabilities;
pub use propagation::{MarkovPropagator, StateDistribution};
pub use staging::{StageMap, StageProbabilities};

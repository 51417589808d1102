//! # ZRisk ECL
//!
//! Expected credit loss for loan portfolios under IFRS 9 and stress scenarios.
//!
//! [`EclEngine`] ties the pipeline together for each (account, scenario) unit:
//!
//! 1. TtC matrix and Z path → PiT matrices ([`zrisk_credit::CreditCycleAdjuster`])
//! 2. PiT matrices → state trajectory ([`zrisk_credit::MarkovPropagator`])
//! 3. Account terms and scenario → exposure and severity ([`zrisk_models`])
//! 4. Trajectories → marginal losses, 12-month and lifetime ECL ([`EclAggregator`])
//!
//! [`EclEngine::run`] evaluates a whole portfolio, in parallel when the `parallel`
//! feature is enabled, and returns a [`RunReport`] with per-unit results, failures,
//! scenario totals and per-account weighted ECL.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use zrisk_config::ModelConfig;
//! use zrisk_core::{Account, RatingScale, Scenario, ScenarioSet};
//! use zrisk_ecl::prelude::*;
//! use zrisk_math::StochasticMatrix;
//!
//! let scale = Arc::new(RatingScale::from_names(&["A", "B"], "D").unwrap());
//! let ttc = StochasticMatrix::from_rows(
//!     scale,
//!     &[vec![0.90, 0.08, 0.02], vec![0.10, 0.80, 0.10], vec![0.0, 0.0, 1.0]],
//! )
//! .unwrap();
//! let engine = EclEngine::new(ttc, ModelConfig::new(0.12)).unwrap();
//!
//! let account = Account::builder("L1")
//!     .balance(1000.0)
//!     .remaining_term(24)
//!     .current_state("A")
//!     .build()
//!     .unwrap();
//! let scenarios = ScenarioSet::new(
//!     vec![
//!         Scenario::new("BASE", 0.7, vec![0.0; 24]),
//!         Scenario::new("DOWN", 0.3, vec![1.0; 24]),
//!     ],
//!     1e-9,
//! )
//! .unwrap();
//!
//! let report = engine.run(&[account], &scenarios).unwrap();
//! assert!(report.is_complete());
//! assert!(report.weighted("L1").unwrap() > 0.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::needless_range_loop)]

pub mod aggregator;
pub mod engine;
pub mod parallel;
pub mod results;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::aggregator::EclAggregator;
    pub use crate::engine::EclEngine;
    pub use crate::parallel::{maybe_parallel_map, should_parallelize};
    pub use crate::results::{RunReport, StagedEcl, UnitFailure, UnitResult};
}

pub use aggregator::EclAggregator;
pub use engine::EclEngine;
pub use results::{RunReport, StagedEcl, UnitFailure, UnitResult};

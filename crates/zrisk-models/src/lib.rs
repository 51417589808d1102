//! # ZRisk Models
//!
//! Exposure and loss-severity models feeding the ECL aggregation.
//!
//! - [`EffectiveInterestRate`]: monthly rate path of an account under a scenario
//! - [`ExposureModel`]: amortising, constant and CCF exposure trajectories
//! - [`LossModel`]: secured, unsecured, constant-growth and indexed LGD
//!
//! ## Example
//!
//! ```rust
//! use zrisk_config::ead::EadConfig;
//! use zrisk_core::Account;
//! use zrisk_models::prelude::*;
//!
//! let account = Account::builder("L1")
//!     .balance(1000.0)
//!     .remaining_term(3)
//!     .current_state("A")
//!     .build()
//!     .unwrap();
//! let config = EadConfig::default();
//! let eir = EffectiveInterestRate::flat(0.0, 3);
//!
//! let ead = ExposureModel::new(&config).trajectory(&account, &eir, 3).unwrap();
//! assert!((ead.exposure[2] - 2000.0 / 3.0).abs() < 1e-9);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_precision_loss)]

pub mod ead;
pub mod eir;
pub mod lgd;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::ead::{ExposureModel, ExposureTrajectory};
    pub use crate::eir::{monthly_from_annual, monthly_rate, EffectiveInterestRate};
    pub use crate::lgd::{LossModel, LossTrajectory};
}

pub use ead::{ExposureModel, ExposureTrajectory};
pub use eir::EffectiveInterestRate;
pub use lgd::{LossModel, LossTrajectory};

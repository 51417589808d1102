//! # ZRisk Config
//!
//! The immutable model configuration passed into every ZRisk component.
//!
//! - **Policies**: closed enumerations for the Z transform and shift method, horizon, EAD model, CCF
//!   method and LGD model, parsed case-insensitively
//! - **Model configuration**: [`ModelConfig`] with per-product overrides, loadable from
//!   TOML or JSON
//! - **Validation**: the [`Validate`] trait collecting every problem before a run
//!
//! ## Example
//!
//! ```rust
//! use zrisk_config::prelude::*;
//!
//! let config = ModelConfig::from_toml_str(
//!     r#"
//!     correlation = 0.15
//!     horizon = "lifetime"
//!
//!     [lgd]
//!     model = "unsecured"
//!     loss_given_default = 0.45
//!     "#,
//! )
//! .unwrap();
//! assert!(config.is_valid());
//! assert_eq!(config.horizon, Horizon::Lifetime);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::float_cmp)]

pub mod ead;
pub mod error;
pub mod lgd;
pub mod model;
pub mod policy;
pub mod staging;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::ead::{CcfConfig, CcfCurve, EadConfig};
    pub use crate::error::{Validate, ValidationError};
    pub use crate::lgd::{LgdModel, SecuredLgd, UnsecuredLgd};
    pub use crate::model::{EirConfig, ModelConfig, ParallelConfig, ProductPolicies};
    pub use crate::policy::{
        CcfMethod, EadModel, Horizon, LgdKind, ShiftMethod, ZTransform, TWELVE_MONTH_PERIODS,
    };
    pub use crate::staging::{Stage, StageMapConfig};
}

pub use error::{Validate, ValidationError};
pub use model::ModelConfig;

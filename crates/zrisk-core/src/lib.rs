//! # ZRisk Core
//!
//! Core types and the error taxonomy shared by every ZRisk crate.
//!
//! - **Errors**: [`EclError`] with the three failure categories and location context
//! - **Rating states**: [`RatingScale`], the ordered state set indexing every matrix
//! - **Accounts**: [`Account`] records and their builder
//! - **Scenarios**: [`Scenario`] Z paths with named macro series, [`ScenarioSet`] weights
//!
//! ## Example
//!
//! ```rust
//! use zrisk_core::prelude::*;
//!
//! let scale = RatingScale::from_names(&["A", "B"], "D").unwrap();
//! assert_eq!(scale.default_index(), 2);
//!
//! let account = Account::builder("LOAN-1")
//!     .balance(10_000.0)
//!     .remaining_term(24)
//!     .current_state("A")
//!     .build()
//!     .unwrap();
//! assert_eq!(account.remaining_term, 24);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]

pub mod error;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{EclError, EclResult, ErrorContext, ErrorKind};
    pub use crate::types::{
        Account, AccountBuilder, InterestRate, RatingScale, RatingState, Scenario, ScenarioSet,
        StateKind,
    };
}

pub use error::{EclError, EclResult, ErrorContext, ErrorKind};
pub use types::{
    Account, InterestRate, RatingScale, RatingState, Scenario, ScenarioSet, StateKind,
};

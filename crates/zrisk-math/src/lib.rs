//! # ZRisk Math
//!
//! Numerical building blocks for the ZRisk engine.
//!
//! This crate provides:
//!
//! - **Stochastic matrices**: [`StochasticMatrix`], a validated row-stochastic matrix
//!   over a [`RatingScale`](zrisk_core::RatingScale), with products, powers and row views
//! - **Write-off augmentation**: [`WriteOffSplit`] and
//!   [`StochasticMatrix::augment_with_write_off`]
//! - **Normal distribution**: CDF, quantile and the probability clamp used before inversion
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use zrisk_core::RatingScale;
//! use zrisk_math::prelude::*;
//!
//! let scale = Arc::new(RatingScale::from_names(&["A"], "D").unwrap());
//! let ttc = StochasticMatrix::from_rows(scale, &[vec![0.99, 0.01], vec![0.0, 1.0]]).unwrap();
//! let two_step = ttc.power(2).unwrap();
//! assert!((two_step.get(0, 1) - 0.0199).abs() < 1e-12);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::unreadable_literal)]
#![allow(clippy::float_cmp)]

pub mod augment;
pub mod matrix;
pub mod normal;

#[cfg(test)]
mod proptests;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::augment::WriteOffSplit;
    pub use crate::matrix::{StochasticMatrix, ROW_SUM_TOLERANCE};
    pub use crate::normal::{cdf, clamp_probability, inverse_cdf};
}

pub use augment::WriteOffSplit;
pub use matrix::{StochasticMatrix, ROW_SUM_TOLERANCE};

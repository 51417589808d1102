//! Standard normal distribution helpers.
//!
//! The credit-cycle transform maps cumulative probabilities to latent cut-points and
//! back. Inversion at exactly 0 or 1 would give infinite cut-points, so callers go
//! through [`clamp_probability`] first.

use std::f64::consts::SQRT_2;

use statrs::function::erf::{erfc, erfc_inv};

/// Smallest probability passed to [`inverse_cdf`] (smallest positive normal `f64`).
pub const PROBABILITY_LOWER_BOUND: f64 = f64::MIN_POSITIVE;

/// Largest probability passed to [`inverse_cdf`] (largest `f64` below one).
pub const PROBABILITY_UPPER_BOUND: f64 = 1.0 - f64::EPSILON / 2.0;

/// Standard normal cumulative distribution function.
#[must_use]
pub fn cdf(x: f64) -> f64 {
    0.5 * erfc(-x / SQRT_2)
}

/// Standard normal quantile function.
///
/// Returns `-inf` at 0 and `+inf` at 1.
#[must_use]
pub fn inverse_cdf(p: f64) -> f64 {
    -SQRT_2 * erfc_inv(2.0 * p)
}

/// Clamps a probability into the range where [`inverse_cdf`] is finite.
#[must_use]
pub fn clamp_probability(p: f64) -> f64 {
    p.clamp(PROBABILITY_LOWER_BOUND, PROBABILITY_UPPER_BOUND)
}

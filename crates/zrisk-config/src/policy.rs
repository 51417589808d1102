//! Policy name enumerations.
//!
//! Every policy is a closed set of variants. Names parse case-insensitively, with `-`
//! and spaces treated as `_`, both from strings and when deserializing. An unknown name
//! is a configuration error.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use zrisk_core::EclError;

use crate::error::normalise_name;

/// Number of monthly periods in the 12-month ECL horizon.
pub const TWELVE_MONTH_PERIODS: usize = 12;

fn unknown(kind: &str, name: &str, expected: &[&str]) -> EclError {
    EclError::configuration(format!(
        "unsupported {kind} '{name}', expected one of: {}",
        expected.join(", ")
    ))
}

/// Form of the single-factor credit-cycle transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ZTransform {
    /// `Φ(Φ⁻¹(C) + √ρ·Z)`: reproduces the TtC matrix at `Z = 0`.
    #[default]
    Calibrated,
    /// `Φ((Φ⁻¹(C) + √ρ·Z) / √(1−ρ))`: the Vasicek conditional distribution.
    Conditional,
}

impl ZTransform {
    /// Canonical name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Calibrated => "calibrated",
            Self::Conditional => "conditional",
        }
    }
}

impl FromStr for ZTransform {
    type Err = EclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise_name(s).as_str() {
            "calibrated" => Ok(Self::Calibrated),
            "conditional" | "vasicek" => Ok(Self::Conditional),
            _ => Err(unknown("Z transform", s, &["calibrated", "conditional"])),
        }
    }
}

/// How the systematic factor moves a row's cut-points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ShiftMethod {
    /// Every cut-point is shifted and rescaled on its own.
    #[default]
    CutPoint,
    /// The default barrier is shifted and the other barriers move with it, keeping their
    /// distance to default.
    Barrier,
}

impl ShiftMethod {
    /// Canonical name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::CutPoint => "cut_point",
            Self::Barrier => "barrier",
        }
    }
}

impl FromStr for ShiftMethod {
    type Err = EclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise_name(s).as_str() {
            "cut_point" | "cutpoint" | "z_shift" | "method_1" => Ok(Self::CutPoint),
            "barrier" | "default_barrier" | "distance_to_default" | "method_2" => {
                Ok(Self::Barrier)
            }
            _ => Err(unknown("shift method", s, &["cut_point", "barrier"])),
        }
    }
}

/// ECL summation horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Horizon {
    /// First twelve monthly periods.
    TwelveMonth,
    /// Full remaining contractual lifetime.
    #[default]
    Lifetime,
}

impl Horizon {
    /// Canonical name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::TwelveMonth => "twelve_month",
            Self::Lifetime => "lifetime",
        }
    }

    /// Number of periods summed for an account with `lifetime` remaining periods.
    #[must_use]
    pub fn periods(self, lifetime: usize) -> usize {
        match self {
            Self::TwelveMonth => lifetime.min(TWELVE_MONTH_PERIODS),
            Self::Lifetime => lifetime,
        }
    }
}

impl FromStr for Horizon {
    type Err = EclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise_name(s).as_str() {
            "twelve_month" | "12_month" | "12_months" | "12m" => Ok(Self::TwelveMonth),
            "lifetime" => Ok(Self::Lifetime),
            _ => Err(unknown("horizon", s, &["twelve_month", "lifetime"])),
        }
    }
}

/// Exposure-at-default policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EadModel {
    /// Contractual amortisation schedule.
    #[default]
    Amortising,
    /// Balance at the observation date for every period.
    Constant,
    /// Drawn balance plus a credit conversion factor on the facility.
    Ccf,
}

impl EadModel {
    /// Canonical name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Amortising => "amortising",
            Self::Constant => "constant",
            Self::Ccf => "ccf",
        }
    }
}

impl FromStr for EadModel {
    type Err = EclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise_name(s).as_str() {
            "amortising" | "amortizing" | "amortisation" | "amortization" => Ok(Self::Amortising),
            "constant" => Ok(Self::Constant),
            "ccf" | "credit_conversion_factor" => Ok(Self::Ccf),
            _ => Err(unknown("EAD model", s, &["amortising", "constant", "ccf"])),
        }
    }
}

/// Quantity the credit conversion factor is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CcfMethod {
    /// `EAD = CCF × balance`.
    Balance,
    /// `EAD = CCF × limit`.
    Limit,
    /// `EAD = balance + CCF × (limit − balance)`.
    #[default]
    Undrawn,
}

impl CcfMethod {
    /// Canonical name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Balance => "balance",
            Self::Limit => "limit",
            Self::Undrawn => "undrawn",
        }
    }
}

impl FromStr for CcfMethod {
    type Err = EclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise_name(s).as_str() {
            "balance" => Ok(Self::Balance),
            "limit" => Ok(Self::Limit),
            "undrawn" | "undrawn_limit" => Ok(Self::Undrawn),
            _ => Err(unknown("CCF method", s, &["balance", "limit", "undrawn"])),
        }
    }
}

/// Loss-given-default policy family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LgdKind {
    /// Collateral-index adjusted.
    Secured,
    /// Constant severity.
    Unsecured,
    /// Constant growth from a base severity.
    ConstantGrowth,
    /// Base severity scaled by a macro index.
    Indexed,
}

impl LgdKind {
    /// Canonical name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Secured => "secured",
            Self::Unsecured => "unsecured",
            Self::ConstantGrowth => "constant_growth",
            Self::Indexed => "indexed",
        }
    }
}

impl FromStr for LgdKind {
    type Err = EclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise_name(s).as_str() {
            "secured" => Ok(Self::Secured),
            "unsecured" | "constant" => Ok(Self::Unsecured),
            "constant_growth" => Ok(Self::ConstantGrowth),
            "indexed" | "index" => Ok(Self::Indexed),
            _ => Err(unknown(
                "LGD model",
                s,
                &["secured", "unsecured", "constant_growth", "indexed"],
            )),
        }
    }
}

macro_rules! impl_name_conversions {
    ($($ty:ty),* $(,)?) => {$(
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl TryFrom<String> for $ty {
            type Error = EclError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.name().to_string()
            }
        }
    )*};
}

impl_name_conversions!(ZTransform, ShiftMethod, Horizon, EadModel, CcfMethod, LgdKind);

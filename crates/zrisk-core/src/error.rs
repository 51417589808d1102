//! Error types for the ZRisk engine.
//!
//! Every failure in the engine falls into one of three categories:
//!
//! - [`EclError::InvalidMatrix`]: a stochastic matrix violates non-negativity or row sums
//! - [`EclError::Calibration`]: the credit-cycle transform was given out-of-domain parameters
//!   or produced an invalid matrix
//! - [`EclError::Configuration`]: unsupported model names, missing per-model inputs or
//!   scenario weights that do not sum to one
//!
//! All of them carry an [`ErrorContext`] so a failure can be traced back to the account,
//! scenario and period that produced it.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A specialized Result type for ZRisk operations.
pub type EclResult<T> = Result<T, EclError>;

/// Location of a failure inside a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Account identifier.
    pub account_id: Option<String>,
    /// Scenario identifier.
    pub scenario_id: Option<String>,
    /// Forecast period index.
    pub period: Option<usize>,
}

impl ErrorContext {
    /// Returns true if no location information has been attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.account_id.is_none() && self.scenario_id.is_none() && self.period.is_none()
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        let mut parts = Vec::with_capacity(3);
        if let Some(ref id) = self.account_id {
            parts.push(format!("account={id}"));
        }
        if let Some(ref id) = self.scenario_id {
            parts.push(format!("scenario={id}"));
        }
        if let Some(period) = self.period {
            parts.push(format!("period={period}"));
        }
        write!(f, " [{}]", parts.join(", "))
    }
}

/// The error type for ZRisk operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EclError {
    /// Malformed stochastic matrix.
    #[error("Invalid matrix: {reason}{context}")]
    InvalidMatrix {
        /// What is wrong with the matrix.
        reason: String,
        /// Where the matrix was encountered.
        context: ErrorContext,
    },

    /// Credit-cycle transform parameter out of domain, or transform output invalid.
    #[error("Calibration error: {reason}{context}")]
    Calibration {
        /// Description of the failure.
        reason: String,
        /// Where the failure occurred.
        context: ErrorContext,
    },

    /// Unsupported model, missing model input or inconsistent scenario weights.
    #[error("Configuration error: {reason}{context}")]
    Configuration {
        /// Description of the failure.
        reason: String,
        /// Where the failure occurred.
        context: ErrorContext,
    },
}

/// Coarse classification of an [`EclError`], useful for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// See [`EclError::InvalidMatrix`].
    InvalidMatrix,
    /// See [`EclError::Calibration`].
    Calibration,
    /// See [`EclError::Configuration`].
    Configuration,
}

impl EclError {
    /// Creates an invalid matrix error.
    #[must_use]
    pub fn invalid_matrix(reason: impl Into<String>) -> Self {
        Self::InvalidMatrix {
            reason: reason.into(),
            context: ErrorContext::default(),
        }
    }

    /// Creates a calibration error.
    #[must_use]
    pub fn calibration(reason: impl Into<String>) -> Self {
        Self::Calibration {
            reason: reason.into(),
            context: ErrorContext::default(),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
            context: ErrorContext::default(),
        }
    }

    /// Returns the category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidMatrix { .. } => ErrorKind::InvalidMatrix,
            Self::Calibration { .. } => ErrorKind::Calibration,
            Self::Configuration { .. } => ErrorKind::Configuration,
        }
    }

    /// Returns the failure location.
    #[must_use]
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::InvalidMatrix { context, .. }
            | Self::Calibration { context, .. }
            | Self::Configuration { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::InvalidMatrix { context, .. }
            | Self::Calibration { context, .. }
            | Self::Configuration { context, .. } => context,
        }
    }

    /// Attaches the account identifier, keeping any identifier already present.
    #[must_use]
    pub fn with_account(mut self, account_id: impl Into<String>) -> Self {
        let context = self.context_mut();
        if context.account_id.is_none() {
            context.account_id = Some(account_id.into());
        }
        self
    }

    /// Attaches the scenario identifier, keeping any identifier already present.
    #[must_use]
    pub fn with_scenario(mut self, scenario_id: impl Into<String>) -> Self {
        let context = self.context_mut();
        if context.scenario_id.is_none() {
            context.scenario_id = Some(scenario_id.into());
        }
        self
    }

    /// Attaches the period index, keeping any period already present.
    #[must_use]
    pub fn with_period(mut self, period: usize) -> Self {
        let context = self.context_mut();
        if context.period.is_none() {
            context.period = Some(period);
        }
        self
    }
}

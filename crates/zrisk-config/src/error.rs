//! Configuration validation.

use std::fmt;

use zrisk_core::{EclError, EclResult};

/// A single validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Field that failed validation.
    pub field: String,
    /// Validation error message.
    pub message: String,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Trait for validatable configurations.
pub trait Validate {
    /// Validates the configuration.
    ///
    /// Returns a list of validation errors, or an empty vector if valid.
    fn validate(&self) -> Vec<ValidationError>;

    /// Returns true if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Validates and returns a configuration error listing every failure.
    fn validate_or_error(&self) -> EclResult<()> {
        let errors = self.validate();
        if errors.is_empty() {
            return Ok(());
        }
        let reasons: Vec<String> = errors.iter().map(ToString::to_string).collect();
        Err(EclError::configuration(reasons.join("; ")))
    }
}

/// Pushes a validation error unless `value` lies in `[lo, hi]`.
pub(crate) fn check_range(
    errors: &mut Vec<ValidationError>,
    field: &str,
    value: f64,
    lo: f64,
    hi: f64,
) {
    if !(lo..=hi).contains(&value) {
        errors.push(ValidationError::new(
            field,
            format!("{value} must lie in [{lo}, {hi}]"),
        ));
    }
}

/// Canonical form of a policy name: lower case with `-` and spaces folded to `_`.
pub(crate) fn normalise_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

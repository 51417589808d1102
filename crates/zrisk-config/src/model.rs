//! The model configuration value.
//!
//! A [`ModelConfig`] is built once per run and shared read-only by every
//! (account, scenario) unit.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use zrisk_core::types::DEFAULT_WEIGHT_TOLERANCE;
use zrisk_core::{EclError, EclResult};
use zrisk_math::WriteOffSplit;

use crate::ead::EadConfig;
use crate::error::{Validate, ValidationError};
use crate::lgd::LgdModel;
use crate::policy::{Horizon, ShiftMethod, ZTransform};
use crate::staging::StageMapConfig;

/// Effective interest rate settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EirConfig {
    /// Scenario series holding the annual base rate for floating-rate accounts.
    #[serde(default = "default_base_rate_series")]
    pub base_rate_series: String,
}

fn default_base_rate_series() -> String {
    "BASE_RATE".to_string()
}

impl Default for EirConfig {
    fn default() -> Self {
        Self {
            base_rate_series: default_base_rate_series(),
        }
    }
}

/// Parallel execution settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelConfig {
    /// Enable parallel processing (requires the engine's `parallel` feature).
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Minimum unit count to trigger parallel processing.
    #[serde(default = "default_parallel_threshold")]
    pub threshold: usize,
}

fn default_true() -> bool {
    true
}

fn default_parallel_threshold() -> usize {
    64
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: default_parallel_threshold(),
        }
    }
}

impl ParallelConfig {
    /// Always sequential.
    #[must_use]
    pub fn sequential() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Returns true if `count` units are enough to go parallel.
    #[must_use]
    pub fn allows(&self, count: usize) -> bool {
        self.enabled && count >= self.threshold
    }
}

/// Exposure and loss policy overrides for one product.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductPolicies {
    /// Exposure policy; the model default when absent.
    #[serde(default)]
    pub ead: Option<EadConfig>,
    /// Loss policy; the model default when absent.
    #[serde(default)]
    pub lgd: Option<LgdModel>,
}

/// Complete model configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Asset correlation ρ of the single-factor transform.
    pub correlation: f64,

    /// Form of the credit-cycle transform.
    #[serde(default)]
    pub transform: ZTransform,

    /// How Z moves the cut-points of each row.
    #[serde(default)]
    pub shift_method: ShiftMethod,

    /// Name of the state cured defaults return to; the scale's cure state when absent.
    #[serde(default)]
    pub cure_state: Option<String>,

    /// Default exit split; no write-off state is added when absent.
    #[serde(default)]
    pub write_off: Option<WriteOffSplit>,

    /// Default loss policy.
    #[serde(default)]
    pub lgd: LgdModel,

    /// Default exposure policy.
    #[serde(default)]
    pub ead: EadConfig,

    /// Per-product overrides keyed by the account product tag.
    #[serde(default)]
    pub products: BTreeMap<String, ProductPolicies>,

    /// Effective interest rate settings.
    #[serde(default)]
    pub eir: EirConfig,

    /// Horizon reported as the scalar ECL.
    #[serde(default)]
    pub horizon: Horizon,

    /// Discount marginal losses at the effective interest rate.
    #[serde(default)]
    pub discount: bool,

    /// IFRS 9 staging rules; staging is skipped when absent.
    #[serde(default)]
    pub stage_map: Option<StageMapConfig>,

    /// Parallel execution settings.
    #[serde(default)]
    pub parallel: ParallelConfig,

    /// Tolerance on scenario weights summing to one.
    #[serde(default = "default_weight_tolerance")]
    pub weight_tolerance: f64,
}

fn default_weight_tolerance() -> f64 {
    DEFAULT_WEIGHT_TOLERANCE
}

impl ModelConfig {
    /// Creates a configuration with the given asset correlation and default policies.
    #[must_use]
    pub fn new(correlation: f64) -> Self {
        Self {
            correlation,
            transform: ZTransform::default(),
            shift_method: ShiftMethod::default(),
            cure_state: None,
            write_off: None,
            lgd: LgdModel::default(),
            ead: EadConfig::default(),
            products: BTreeMap::new(),
            eir: EirConfig::default(),
            horizon: Horizon::default(),
            discount: false,
            stage_map: None,
            parallel: ParallelConfig::default(),
            weight_tolerance: default_weight_tolerance(),
        }
    }

    /// Parses a TOML document.
    pub fn from_toml_str(s: &str) -> EclResult<Self> {
        toml::from_str(s).map_err(|e| EclError::configuration(format!("invalid TOML: {e}")))
    }

    /// Parses a JSON document.
    pub fn from_json_str(s: &str) -> EclResult<Self> {
        serde_json::from_str(s).map_err(|e| EclError::configuration(format!("invalid JSON: {e}")))
    }

    /// Sets the transform form.
    #[must_use]
    pub fn with_transform(mut self, transform: ZTransform) -> Self {
        self.transform = transform;
        self
    }

    /// Sets the shift method.
    #[must_use]
    pub fn with_shift_method(mut self, method: ShiftMethod) -> Self {
        self.shift_method = method;
        self
    }

    /// Sets the cure state.
    #[must_use]
    pub fn with_cure_state(mut self, state: impl Into<String>) -> Self {
        self.cure_state = Some(state.into());
        self
    }

    /// Adds a write-off state with the given split.
    #[must_use]
    pub fn with_write_off(mut self, split: WriteOffSplit) -> Self {
        self.write_off = Some(split);
        self
    }

    /// Sets the default loss policy.
    #[must_use]
    pub fn with_lgd(mut self, lgd: LgdModel) -> Self {
        self.lgd = lgd;
        self
    }

    /// Sets the default exposure policy.
    #[must_use]
    pub fn with_ead(mut self, ead: EadConfig) -> Self {
        self.ead = ead;
        self
    }

    /// Overrides policies for one product.
    #[must_use]
    pub fn with_product(mut self, product: impl Into<String>, policies: ProductPolicies) -> Self {
        self.products.insert(product.into(), policies);
        self
    }

    /// Sets the reported horizon.
    #[must_use]
    pub fn with_horizon(mut self, horizon: Horizon) -> Self {
        self.horizon = horizon;
        self
    }

    /// Enables or disables discounting.
    #[must_use]
    pub fn with_discount(mut self, discount: bool) -> Self {
        self.discount = discount;
        self
    }

    /// Sets the staging rules.
    #[must_use]
    pub fn with_stage_map(mut self, stage_map: StageMapConfig) -> Self {
        self.stage_map = Some(stage_map);
        self
    }

    /// Sets the parallel execution settings.
    #[must_use]
    pub fn with_parallel(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }

    /// Exposure and loss policies for a product tag.
    #[must_use]
    pub fn policies_for(&self, product: &str) -> (&EadConfig, &LgdModel) {
        let overrides = self.products.get(product);
        (
            overrides.and_then(|p| p.ead.as_ref()).unwrap_or(&self.ead),
            overrides.and_then(|p| p.lgd.as_ref()).unwrap_or(&self.lgd),
        )
    }
}

impl Validate for ModelConfig {
    /// Checks policy parameters.
    ///
    /// The correlation is checked by the credit-cycle adjuster, which reports it as a
    /// calibration error.
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if let Some(split) = &self.write_off {
            if let Err(e) = split.validate() {
                errors.push(ValidationError::new("write_off", e.to_string()));
            }
        }
        errors.extend(self.ead.validate());
        errors.extend(self.lgd.validate());
        for (product, policies) in &self.products {
            let prefix = |e: ValidationError| {
                ValidationError::new(format!("products.{product}.{}", e.field), e.message)
            };
            if let Some(ead) = &policies.ead {
                errors.extend(ead.validate().into_iter().map(prefix));
            }
            if let Some(lgd) = &policies.lgd {
                errors.extend(lgd.validate().into_iter().map(prefix));
            }
        }
        if let Some(stage_map) = &self.stage_map {
            errors.extend(stage_map.validate());
        }
        if self.eir.base_rate_series.is_empty() {
            errors.push(ValidationError::new("eir.base_rate_series", "is empty"));
        }
        if !self.weight_tolerance.is_finite() || self.weight_tolerance < 0.0 {
            errors.push(ValidationError::new(
                "weight_tolerance",
                "must be finite and non-negative",
            ));
        }

        errors
    }
}

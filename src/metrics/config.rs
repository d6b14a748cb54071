//! Metrics configuration v1.
//!
//! ## Float Normalization for Deterministic Hashing
//!
//! Floats are quantized to integers before hashing to avoid cross-platform
//! serialization differences. The quantization factor is 1e6 (multiply by
//! 1,000,000 and round to i64).

use serde::{Deserialize, Serialize};

use crate::canonical::canonical_hash_hex;
use crate::encoder::DEFAULT_MAX_FEATURES;
use crate::preflight::ALLOWED_EVAL_MODE;
use crate::types::ReducedView;
use crate::DEFAULT_CONFIG_VERSION;

/// Quantization factor for float normalization.
const FLOAT_QUANTIZATION_FACTOR: f64 = 1_000_000.0;

/// Quantize a float to an i64 for deterministic hashing.
fn quantize_float(value: f64) -> i64 {
    (value * FLOAT_QUANTIZATION_FACTOR).round() as i64
}

/// Default Q1 target rates: nine evenly spaced values in [0.1, 0.9].
pub fn default_rate_grid() -> Vec<f64> {
    (1..=9).map(|i| i as f64 / 10.0).collect()
}

/// Quantized configuration for deterministic hashing.
#[derive(Debug, Clone, Serialize)]
struct QuantizedConfig {
    version: String,
    alpha: i64,
    beta: i64,
    rate_grid: Vec<i64>,
    reduced_view: ReducedView,
    missing_path_default: i64,
    max_features: usize,
    eval_mode: String,
}

/// Parameters shared by the four metric engines.
///
/// ## Parameters
///
/// - `alpha`, `beta`: Q2 weights, `A_sa = alpha * coverage - beta * mean_path_norm`
/// - `rate_grid`: Q1 target rates for the distortion curve
/// - `reduced_view`: composition of the Q1 reduced view B
/// - `missing_path_default`: Q2 raw mean path when no anchor reaches a key node
/// - `max_features`: encoder vocabulary cap
/// - `eval_mode`: evaluation mode recorded in reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Config version identifier.
    pub version: String,
    /// Weight of anchor coverage in Q2.
    pub alpha: f64,
    /// Weight of normalized mean path in Q2.
    pub beta: f64,
    /// Q1 target rates.
    pub rate_grid: Vec<f64>,
    /// Composition of the reduced view B.
    pub reduced_view: ReducedView,
    /// Q2 mean path when no anchor-to-key-node path exists.
    pub missing_path_default: f64,
    /// Encoder vocabulary cap.
    pub max_features: usize,
    /// Evaluation mode recorded in reports.
    pub eval_mode: String,
}

impl MetricsConfig {
    /// Override the Q2 weights.
    pub fn with_weights(mut self, alpha: f64, beta: f64) -> Self {
        self.alpha = alpha;
        self.beta = beta;
        self
    }

    /// Override the reduced view.
    pub fn with_reduced_view(mut self, view: ReducedView) -> Self {
        self.reduced_view = view;
        self
    }

    /// Override the Q1 target rates.
    pub fn with_rate_grid(mut self, rates: Vec<f64>) -> Self {
        self.rate_grid = rates;
        self
    }

    /// Get the config ID.
    pub fn config_id(&self) -> &str {
        &self.version
    }

    /// Hash of the configuration over quantized floats.
    pub fn params_hash(&self) -> String {
        canonical_hash_hex(&self.to_quantized())
    }

    fn to_quantized(&self) -> QuantizedConfig {
        QuantizedConfig {
            version: self.version.clone(),
            alpha: quantize_float(self.alpha),
            beta: quantize_float(self.beta),
            rate_grid: self.rate_grid.iter().copied().map(quantize_float).collect(),
            reduced_view: self.reduced_view,
            missing_path_default: quantize_float(self.missing_path_default),
            max_features: self.max_features,
            eval_mode: self.eval_mode.clone(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            version: DEFAULT_CONFIG_VERSION.to_string(),
            alpha: 0.7,
            beta: 0.3,
            rate_grid: default_rate_grid(),
            reduced_view: ReducedView::GistOnly,
            missing_path_default: 0.0,
            max_features: DEFAULT_MAX_FEATURES,
            eval_mode: ALLOWED_EVAL_MODE.to_string(),
        }
    }
}

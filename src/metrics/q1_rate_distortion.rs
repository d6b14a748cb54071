//! Q1: rate-distortion of the reduced view.
//!
//! Compares a reduced view B against the full view T in the shared vector
//! space. One observed point `(rho, D)` calibrates an exponential decay model,
//! which is then evaluated over a grid of target rates:
//!
//! ```text
//! rho     = |terms(B)| / max(1, |terms(T)|)
//! L_U     = clamp(cos(U_B, U_T), 0, 1)          U_X = max(K_gist(X), K_detail(X))
//! D       = 1 - L_U
//! ratio   = (D - D_min) / (D_max - D_min)
//! beta    = -ln(ratio) / rho                     (1.0 if rho or ratio <= eps)
//! D_est(r)= clamp(D_min + (D_max - D_min) * exp(-beta * r), 0, 1)
//! ```
//!
//! The exponential shape is a modelling assumption calibrated from a single
//! observation, not an information-theoretic bound.

use serde::{Deserialize, Serialize};

use crate::encoder::{cosine_similarity, EncoderError, VocabularyEncoder};
use crate::types::TextPair;

/// Distortion floor of the decay model.
pub const D_MIN: f64 = 0.05;
/// Distortion ceiling of the decay model.
pub const D_MAX: f64 = 1.0;
/// Threshold below which rate or ratio are treated as zero.
pub const CURVE_EPS: f64 = 1e-12;

/// Q1 output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateDistortion {
    /// Realized compression ratio of B relative to T.
    pub rho: f64,
    /// Clamped cosine similarity between the union vectors of B and T.
    #[serde(rename = "L_U")]
    pub l_u: f64,
    /// Observed distortion `1 - L_U`.
    #[serde(rename = "D")]
    pub distortion: f64,
    /// Decay constant fitted from the observed point.
    pub beta: f64,
    /// `(target_rate, estimated_distortion)` pairs.
    pub curve: Vec<(f64, f64)>,
}

/// Decay constant calibrated from one observed `(rho, D)` point. Always >= 0.
pub fn decay_constant(rho_actual: f64, distortion: f64) -> f64 {
    let ratio = (distortion - D_MIN) / (D_MAX - D_MIN).max(CURVE_EPS);
    if rho_actual <= CURVE_EPS || ratio <= CURVE_EPS {
        1.0
    } else {
        -ratio.ln() / rho_actual
    }
}

/// Estimated distortion at a target rate, clamped into `[0, 1]`.
pub fn estimate_distortion(rate: f64, beta: f64) -> f64 {
    (D_MIN + (D_MAX - D_MIN) * (-beta * rate).exp()).clamp(0.0, 1.0)
}

/// Compute Q1 for a reduced view `b` against a full view `t`.
///
/// Fails only if the encoder is not fitted.
pub fn compute_q1(
    b: &TextPair,
    t: &TextPair,
    encoder: &VocabularyEncoder,
    rates: &[f64],
) -> Result<RateDistortion, EncoderError> {
    let len_b = encoder.token_count(&b.joined());
    let len_t = encoder.token_count(&t.joined());
    let rho = len_b as f64 / len_t.max(1) as f64;

    let union_b = encoder.encode_union(&b.gist, &b.detail)?;
    let union_t = encoder.encode_union(&t.gist, &t.detail)?;

    let l_u = cosine_similarity(&union_b, &union_t);
    let distortion = 1.0 - l_u;

    let beta = decay_constant(rho, distortion);
    let curve = rates
        .iter()
        .map(|&r| (r, estimate_distortion(r, beta)))
        .collect();

    Ok(RateDistortion {
        rho,
        l_u,
        distortion,
        beta,
        curve,
    })
}

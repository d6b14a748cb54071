//! Document-level orchestration.
//!
//! [`DocumentEvaluator`] owns the per-document encoder: it builds it from the
//! document language, fits it once on the skeleton corpus, and hands it
//! read-only to the four metric engines.
//!
//! ```text
//! raw tree -> Preflight -> DocumentInput -> fit encoder -> Q1..Q4 -> MetricsReport
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::canonical::canonical_hash_hex;
use crate::encoder::{EncoderError, VocabularyEncoder};
use crate::io::{decode_document, LoadError};
use crate::metrics::{
    compute_q1, compute_q2, compute_q3, compute_q4, AnchorGuidance, ChangeVisibility,
    MetricsConfig, RateDistortion, SkeletonAnchorAgreement,
};
use crate::preflight::{Preflight, PreflightError};
use crate::types::{DocumentInput, RunLog};
use crate::{GOR_KERNEL_SCHEMA_VERSION, REPORT_VERSION};

/// Seed used when the run log carries none.
pub const DEFAULT_SEED: u64 = 42;

/// Errors from evaluating a document.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Input rejected by the validation gate.
    #[error(transparent)]
    Preflight(#[from] PreflightError),

    /// Encoder misuse or unsupported language.
    #[error("Encoder error: {0}")]
    Encoder(#[from] EncoderError),

    /// Input could not be read or decoded.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),
}

impl PipelineError {
    /// Preflight code, if this is a validation failure.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::Preflight(e) => Some(e.code()),
            _ => None,
        }
    }
}

/// The four metric results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSet {
    /// Rate-distortion.
    #[serde(rename = "Q1")]
    pub q1: RateDistortion,
    /// Skeleton-anchor agreement.
    #[serde(rename = "Q2")]
    pub q2: SkeletonAnchorAgreement,
    /// Change visibility.
    #[serde(rename = "Q3")]
    pub q3: ChangeVisibility,
    /// Anchor guidance.
    #[serde(rename = "Q4")]
    pub q4: AnchorGuidance,
}

/// How the metrics were evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalInfo {
    /// Evaluation mode.
    pub mode: String,
    /// Encoder identifier.
    #[serde(rename = "encoder")]
    pub encoder_id: String,
    /// Document language tag.
    pub lang: String,
    /// Hash of the metrics configuration.
    pub params_hash: String,
    /// Content hash of the skeleton.
    pub skeleton_hash: String,
}

/// Run log fields carried into the report.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LogSubset {
    /// Producer seed.
    pub seed: Option<u64>,
    /// Producer model.
    pub model_id: Option<String>,
    /// Producer hash.
    pub hash: Option<String>,
}

impl From<&RunLog> for LogSubset {
    fn from(log: &RunLog) -> Self {
        Self {
            seed: log.seed,
            model_id: log.model_id.clone(),
            hash: log.hash.clone(),
        }
    }
}

/// Output record for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    /// Document identifier.
    pub doc_id: String,
    /// Report format version.
    pub version: String,
    /// Schema version of the report records.
    pub schema_version: String,
    /// Metric results.
    pub metrics: MetricSet,
    /// Evaluation settings.
    pub eval: EvalInfo,
    /// Producer log subset.
    pub log: LogSubset,
}

impl MetricsReport {
    /// xxh64 over the canonical JSON of the report.
    pub fn report_hash(&self) -> String {
        canonical_hash_hex(self)
    }
}

/// Evaluates one document at a time.
#[derive(Debug, Clone, Default)]
pub struct DocumentEvaluator {
    config: MetricsConfig,
    preflight: Preflight,
}

impl DocumentEvaluator {
    /// Create an evaluator with a metrics configuration.
    pub fn new(config: MetricsConfig) -> Self {
        Self {
            config,
            preflight: Preflight::new(),
        }
    }

    /// Replace the validation gate.
    pub fn with_preflight(mut self, preflight: Preflight) -> Self {
        self.preflight = preflight;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    /// Build and fit the encoder for a document.
    pub fn fit_encoder(&self, doc: &DocumentInput) -> Result<VocabularyEncoder, EncoderError> {
        let seed = doc.log.seed.unwrap_or(DEFAULT_SEED);
        let mut encoder =
            VocabularyEncoder::new(&doc.document.lang, seed)?.with_max_features(self.config.max_features);
        encoder.fit(&doc.skeleton.corpus())?;
        tracing::info!(
            doc_id = %doc.document.id,
            lang = %encoder.language(),
            vocabulary = encoder.vocabulary_len(),
            "encoder fitted"
        );
        Ok(encoder)
    }

    /// Evaluate a decoded document. Does not run the validation gate.
    pub fn evaluate(&self, doc: &DocumentInput) -> Result<MetricsReport, PipelineError> {
        let encoder = self.fit_encoder(doc)?;
        self.evaluate_with_encoder(doc, &encoder)
    }

    /// Evaluate with an already fitted encoder.
    pub fn evaluate_with_encoder(
        &self,
        doc: &DocumentInput,
        encoder: &VocabularyEncoder,
    ) -> Result<MetricsReport, PipelineError> {
        let doc_id = doc.document.id.as_str();
        let skeleton = &doc.skeleton;
        let (reduced, full) = self.config.reduced_view.views(skeleton);

        let q1 = compute_q1(&reduced, &full, encoder, &self.config.rate_grid)?;
        tracing::info!(doc_id, rho = q1.rho, l_u = q1.l_u, distortion = q1.distortion, "Q1 rate-distortion");

        let q2 = compute_q2(skeleton, &doc.anchors, &self.config);
        tracing::info!(
            doc_id,
            a_sa = q2.a_sa,
            coverage = q2.coverage,
            mean_path = q2.mean_path_norm,
            "Q2 skeleton-anchor agreement"
        );

        let q3 = compute_q3(&doc.anchors, skeleton, encoder)?;
        tracing::info!(doc_id, v_ch = q3.v_ch, transitions = q3.num_transitions, "Q3 change visibility");

        let q4 = compute_q4(skeleton, &doc.anchors);
        tracing::info!(
            doc_id,
            g_a = q4.g_a,
            baseline = q4.baseline,
            with_anchors = q4.with_anchors,
            "Q4 anchor guidance"
        );

        Ok(MetricsReport {
            doc_id: doc_id.to_string(),
            version: REPORT_VERSION.to_string(),
            schema_version: GOR_KERNEL_SCHEMA_VERSION.to_string(),
            metrics: MetricSet { q1, q2, q3, q4 },
            eval: EvalInfo {
                mode: self.config.eval_mode.clone(),
                encoder_id: encoder.encoder_id().to_string(),
                lang: doc.document.lang.clone(),
                params_hash: self.config.params_hash(),
                skeleton_hash: skeleton.content_hash(),
            },
            log: LogSubset::from(&doc.log),
        })
    }

    /// Validate, decode and evaluate a raw input tree.
    ///
    /// The typed decode sees the normalized log, so log fields the gate
    /// accepts (quoted seeds, numeric ids) never fail decoding.
    pub fn run(&self, mut raw: Value) -> Result<MetricsReport, PipelineError> {
        let checked = self.preflight.check(&raw).map_err(|e| {
            tracing::warn!(code = e.code(), error = %e, "preflight rejected input");
            e
        })?;
        tracing::info!(prompt_defaulted = checked.prompt_defaulted, "preflight passed");

        if let Some(fields) = raw.as_object_mut() {
            let log = serde_json::to_value(&checked.log).map_err(LoadError::from)?;
            fields.insert("log".to_string(), log);
        }
        let doc = decode_document(raw)?;
        self.evaluate(&doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw() -> Value {
        json!({
            "document": {"id": "doc-1", "lang": "en"},
            "preregister": {"eval_mode": "union_k", "phi_preserve": []},
            "log": {"seed": 3, "model_id": "m", "hash": "h"},
            "skeleton": {
                "nodes": [
                    {"id": "A", "type": "premise", "gist": "costs fall", "detail": "automation scales production"},
                    {"id": "B", "type": "claim", "gist": "margins widen", "detail": "competitors cannot follow"},
                    {"id": "C", "type": "evidence", "gist": "quarterly data", "detail": "three consecutive quarters"}
                ],
                "edges": [{"from": "A", "to": "B"}, {"from": "B", "to": "C"}]
            },
            "anchors": {"transitions": [{"at": "A"}]}
        })
    }

    #[test]
    fn test_run_produces_full_report() {
        let report = DocumentEvaluator::default().run(raw()).unwrap();
        assert_eq!(report.doc_id, "doc-1");
        assert_eq!(report.version, REPORT_VERSION);
        assert_eq!(report.eval.mode, "union_k");
        assert_eq!(report.eval.encoder_id, "tfidf-v1");
        assert_eq!(report.log.seed, Some(3));
        assert!((report.metrics.q2.a_sa - 0.55).abs() < 1e-12);
        assert_eq!(report.metrics.q1.curve.len(), 9);
    }

    #[test]
    fn test_run_accepts_loosely_typed_log() {
        let mut loose = raw();
        loose["log"] = json!({"seed": "7", "model_id": 3, "hash": 99});
        let report = DocumentEvaluator::default().run(loose).unwrap();
        assert_eq!(report.log.seed, Some(7));
        assert_eq!(report.log.model_id.as_deref(), Some("3"));
        assert_eq!(report.log.hash.as_deref(), Some("99"));
    }

    #[test]
    fn test_report_carries_schema_version() {
        let report = DocumentEvaluator::default().run(raw()).unwrap();
        assert_eq!(report.schema_version, GOR_KERNEL_SCHEMA_VERSION);
    }

    #[test]
    fn test_run_rejects_before_evaluating() {
        let mut bad = raw();
        bad["preregister"]["eval_mode"] = json!("other");
        let err = DocumentEvaluator::default().run(bad).unwrap_err();
        assert_eq!(err.code(), Some("E110"));
    }

    #[test]
    fn test_unsupported_language() {
        let mut bad = raw();
        bad["document"]["lang"] = json!("fr");
        let err = DocumentEvaluator::default().run(bad).unwrap_err();
        assert!(matches!(err, PipelineError::Encoder(EncoderError::UnsupportedLanguage(_))));
        assert_eq!(err.code(), None);
    }

    #[test]
    fn test_report_serializes_metric_keys() {
        let report = DocumentEvaluator::default().run(raw()).unwrap();
        let v = serde_json::to_value(&report).unwrap();
        for key in ["Q1", "Q2", "Q3", "Q4"] {
            assert!(v["metrics"].get(key).is_some(), "missing {key}");
        }
        assert!(v["metrics"]["Q1"].get("L_U").is_some());
        assert!(v["metrics"]["Q2"].get("A_sa").is_some());
        assert!(v["metrics"]["Q3"].get("V_ch").is_some());
        assert!(v["metrics"]["Q4"].get("G_a").is_some());
        assert_eq!(v["eval"]["encoder"], "tfidf-v1");
    }

    #[test]
    fn test_full_view_has_no_distortion() {
        let config = MetricsConfig::default().with_reduced_view(crate::types::ReducedView::GistAndDetail);
        let report = DocumentEvaluator::new(config).run(raw()).unwrap();
        assert!(report.metrics.q1.distortion.abs() < 1e-12);
        assert_eq!(report.metrics.q1.rho, 1.0);
    }
}

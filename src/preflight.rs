//! Validation gate run on the raw input tree before any metric is computed.
//!
//! | Code | Condition |
//! |------|-----------|
//! | E100 | no `preregister` block and no preregistration manifest |
//! | E110 | `preregister.eval_mode` is not `union_k` |
//! | E120 | `phi_preserve` names a non-reversible post-processing op |
//! | E130 | `log` lacks `seed`, `model_id` or `hash` |
//! | E140 | an email-like or phone-like string appears anywhere in the input |
//!
//! Checks run in code order and the first violation aborts. A missing
//! `log.prompt` is not a violation: the returned log carries `"N/A"`.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex_lite::Regex;
use serde_json::Value;

use crate::types::RunLog;

/// The only evaluation mode this metric family accepts.
pub const ALLOWED_EVAL_MODE: &str = "union_k";

/// Reversible post-processing operations.
pub const ALLOWED_POSTPROCESS_OPS: [&str; 4] = [
    "normalize_case",
    "strip_punct",
    "lexicon_isomorph",
    "date_normalize",
];

/// Prompt recorded when the log has none.
pub const DEFAULT_PROMPT: &str = "N/A";

/// Default manifest looked up when the input has no `preregister` block.
pub const DEFAULT_MANIFEST: &str = "manifest.yaml";

const REQUIRED_LOG_FIELDS: [&str; 3] = ["seed", "model_id", "hash"];

/// Kind of personal information detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PiiKind {
    /// `local@domain.tld`
    Email,
    /// `dd(dd)-dd(dd)-dddd`
    Phone,
}

impl PiiKind {
    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }
}

impl std::fmt::Display for PiiKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation failures. Each variant carries a stable code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreflightError {
    /// No preregistration block or manifest.
    #[error("E100: preregistration not found")]
    MissingPreregistration,

    /// Evaluation mode other than `union_k`.
    #[error("E110: eval_mode {0:?} is not allowed")]
    DisallowedEvalMode(Option<String>),

    /// Post-processing ops outside the reversible set (sorted).
    #[error("E120: disallowed post-processing: {0:?}")]
    DisallowedPostprocessing(Vec<String>),

    /// Required log fields that are absent.
    #[error("E130: incomplete log, missing {0:?}")]
    IncompleteLog(Vec<String>),

    /// Personal information found in the serialized input.
    #[error("E140: personal information detected ({0})")]
    PiiDetected(PiiKind),
}

impl PreflightError {
    /// Stable error code (`E100`..`E140`).
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingPreregistration => "E100",
            Self::DisallowedEvalMode(_) => "E110",
            Self::DisallowedPostprocessing(_) => "E120",
            Self::IncompleteLog(_) => "E130",
            Self::PiiDetected(_) => "E140",
        }
    }
}

/// Outcome of a passed gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreflightReport {
    /// Run log with the prompt defaulted if absent.
    pub log: RunLog,
    /// Whether the prompt was filled in.
    pub prompt_defaulted: bool,
}

/// The validation gate.
#[derive(Debug, Clone, Default)]
pub struct Preflight {
    manifest_path: Option<PathBuf>,
}

impl Preflight {
    /// Gate with no manifest fallback: `preregister` must be in the input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a manifest file at `path` in place of an inline `preregister` block.
    pub fn with_manifest(path: impl Into<PathBuf>) -> Self {
        Self {
            manifest_path: Some(path.into()),
        }
    }

    /// Manifest fallback path, if any.
    pub fn manifest_path(&self) -> Option<&Path> {
        self.manifest_path.as_deref()
    }

    /// Validate a raw input tree.
    pub fn check(&self, raw: &Value) -> Result<PreflightReport, PreflightError> {
        let prereg = raw.get("preregister");
        if prereg.is_none() && !self.manifest_exists() {
            return Err(PreflightError::MissingPreregistration);
        }

        let eval_mode = prereg
            .and_then(|p| p.get("eval_mode"))
            .and_then(Value::as_str);
        if eval_mode != Some(ALLOWED_EVAL_MODE) {
            return Err(PreflightError::DisallowedEvalMode(eval_mode.map(str::to_string)));
        }

        let invalid: BTreeSet<String> = prereg
            .and_then(|p| p.get("phi_preserve"))
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .map(|op| op.as_str().map(str::to_string).unwrap_or_else(|| op.to_string()))
            .filter(|op| !ALLOWED_POSTPROCESS_OPS.contains(&op.as_str()))
            .collect();
        if !invalid.is_empty() {
            return Err(PreflightError::DisallowedPostprocessing(invalid.into_iter().collect()));
        }

        let log = raw.get("log");
        let missing: Vec<String> = REQUIRED_LOG_FIELDS
            .iter()
            .filter(|field| log.and_then(|l| l.get(**field)).map_or(true, Value::is_null))
            .map(|field| field.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(PreflightError::IncompleteLog(missing));
        }

        if let Some(kind) = scan_pii(&raw.to_string()) {
            return Err(PreflightError::PiiDetected(kind));
        }

        let (log, prompt_defaulted) = normalized_log(log);
        tracing::debug!(prompt_defaulted, "preflight passed");
        Ok(PreflightReport { log, prompt_defaulted })
    }

    fn manifest_exists(&self) -> bool {
        self.manifest_path.as_deref().is_some_and(Path::exists)
    }
}

/// First kind of personal information found in `text`, if any.
pub fn scan_pii(text: &str) -> Option<PiiKind> {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    static PHONE: OnceLock<Regex> = OnceLock::new();

    let email = EMAIL.get_or_init(|| {
        Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("email pattern")
    });
    let phone = PHONE.get_or_init(|| Regex::new(r"\b\d{2,4}-\d{2,4}-\d{4}\b").expect("phone pattern"));

    if email.is_match(text) {
        Some(PiiKind::Email)
    } else if phone.is_match(text) {
        Some(PiiKind::Phone)
    } else {
        None
    }
}

/// Lenient extraction of the run log: numbers or strings accepted for every field.
fn normalized_log(log: Option<&Value>) -> (RunLog, bool) {
    let field = |name: &str| log.and_then(|l| l.get(name)).filter(|v| !v.is_null());
    let text = |v: &Value| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string());

    let seed = field("seed").and_then(|v| v.as_u64().or_else(|| v.as_str()?.trim().parse().ok()));
    let prompt = field("prompt").map(text);
    let prompt_defaulted = prompt.is_none();

    let log = RunLog {
        seed,
        model_id: field("model_id").map(text),
        hash: field("hash").map(text),
        prompt: Some(prompt.unwrap_or_else(|| DEFAULT_PROMPT.to_string())),
    };
    (log, prompt_defaulted)
}

//! Loading input documents and writing metric reports.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::pipeline::MetricsReport;
use crate::types::DocumentInput;

/// Suffix appended to the input stem for the results file.
pub const RESULTS_SUFFIX: &str = "_results.json";

/// Errors from reading or writing documents.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Filesystem error.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Malformed JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed YAML.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Extension other than `.json`, `.yaml`, `.yml`.
    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),

    /// Well-formed tree that does not decode into a document.
    #[error("Invalid document: {0}")]
    Schema(String),
}

/// Input formats, selected by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// `.json`
    Json,
    /// `.yaml` / `.yml`
    Yaml,
}

impl InputFormat {
    /// Detect the format of a path.
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(LoadError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Parse document text into a raw tree.
pub fn parse_value(text: &str, format: InputFormat) -> Result<Value, LoadError> {
    Ok(match format {
        InputFormat::Json => serde_json::from_str(text)?,
        InputFormat::Yaml => serde_yaml::from_str(text)?,
    })
}

/// Read a file into a raw tree, for validation before typed decoding.
pub fn load_value(path: impl AsRef<Path>) -> Result<Value, LoadError> {
    let path = path.as_ref();
    let format = InputFormat::from_path(path)?;
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_value(&text, format)
}

/// Decode a raw tree into a typed document.
pub fn decode_document(raw: Value) -> Result<DocumentInput, LoadError> {
    DocumentInput::from_value(raw).map_err(|e| LoadError::Schema(e.to_string()))
}

/// Read and decode a document file.
pub fn load_document(path: impl AsRef<Path>) -> Result<DocumentInput, LoadError> {
    decode_document(load_value(path)?)
}

/// `<dir>/<stem>_results.json` next to the input.
pub fn results_path_for(input: impl AsRef<Path>) -> PathBuf {
    let input = input.as_ref();
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}{RESULTS_SUFFIX}"))
}

/// Write a report as pretty-printed JSON.
pub fn write_report(path: impl AsRef<Path>, report: &MetricsReport) -> Result<(), LoadError> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML_DOC: &str = r#"
document:
  id: doc-yaml
  lang: en
preregister:
  eval_mode: union_k
  phi_preserve: [normalize_case]
log:
  seed: 42
  model_id: tfidf-v1
  hash: abc
skeleton:
  nodes:
    - {id: n1, type: claim, gist: "prices rise", detail: "inflation persists"}
    - {id: n2, gist: "wages lag"}
  edges:
    - {from: n1, to: n2}
anchors:
  transitions:
    - {at: n1}
"#;

    #[test]
    fn test_format_detection() {
        assert_eq!(InputFormat::from_path(Path::new("a.JSON")).unwrap(), InputFormat::Json);
        assert_eq!(InputFormat::from_path(Path::new("a.yml")).unwrap(), InputFormat::Yaml);
        assert!(matches!(
            InputFormat::from_path(Path::new("a.toml")),
            Err(LoadError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_load_yaml_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.yaml");
        fs::write(&path, YAML_DOC).unwrap();

        let doc = load_document(&path).unwrap();
        assert_eq!(doc.document.id, "doc-yaml");
        assert_eq!(doc.skeleton.nodes.len(), 2);
        assert_eq!(doc.skeleton.edges[0].dep, crate::types::DEFAULT_DEPENDENCY_KIND);
        assert_eq!(doc.log.seed, Some(42));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_value("/nonexistent/doc.json").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_schema_error() {
        let raw = parse_value(r#"{"skeleton": {}}"#, InputFormat::Json).unwrap();
        assert!(matches!(decode_document(raw), Err(LoadError::Schema(_))));
    }

    #[test]
    fn test_results_path() {
        assert_eq!(
            results_path_for("data/report.yaml"),
            PathBuf::from("data/report_results.json")
        );
    }
}

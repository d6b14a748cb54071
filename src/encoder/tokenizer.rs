//! Language-specific tokenizers.
//!
//! Tokenization is a capability: anything that turns text into a token
//! sequence. The variant is picked once from the document's language tag.

use std::fmt;
use std::sync::Arc;

use unicode_segmentation::UnicodeSegmentation;

use super::EncoderError;

/// Minimum token length (in characters) kept by the word-boundary tokenizer.
const MIN_TOKEN_CHARS: usize = 2;

/// Turns text into a sequence of tokens.
///
/// Implementations receive already lowercased text.
pub trait Tokenizer: Send + Sync {
    /// Split text into tokens.
    fn tokenize(&self, text: &str) -> Vec<String>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

/// Default tokenizer for space-delimited scripts.
///
/// Splits on Unicode word boundaries and keeps words of at least two characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordBoundaryTokenizer;

impl Tokenizer for WordBoundaryTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.unicode_words()
            .filter(|w| w.chars().count() >= MIN_TOKEN_CHARS)
            .map(str::to_string)
            .collect()
    }

    fn name(&self) -> &'static str {
        "word_boundary"
    }
}

/// One unit of morphological analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Morpheme {
    /// Surface form as it appears in the text.
    pub surface: String,
    /// Dictionary form, when the analyzer provides one.
    pub lemma: Option<String>,
}

impl Morpheme {
    /// Create a morpheme.
    pub fn new(surface: impl Into<String>, lemma: Option<String>) -> Self {
        Self {
            surface: surface.into(),
            lemma,
        }
    }

    /// The token this morpheme contributes: lemma if present, else surface.
    pub fn token(&self) -> &str {
        match self.lemma.as_deref() {
            Some(l) if !l.is_empty() => l,
            _ => &self.surface,
        }
    }
}

/// Error reported by a morphological analyzer.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Morphological analysis failed: {0}")]
pub struct AnalyzerError(pub String);

/// A morphological analyzer for agglutinative scripts (e.g. a MeCab/UniDic binding).
pub trait MorphAnalyzer: Send + Sync {
    /// Segment text into morphemes.
    fn analyze(&self, text: &str) -> Result<Vec<Morpheme>, AnalyzerError>;
}

/// Tokenizer for agglutinative scripts.
///
/// Delegates to an optional [`MorphAnalyzer`]. Without an analyzer, or when the
/// analyzer fails, it falls back to whitespace splitting and never errors.
#[derive(Clone, Default)]
pub struct MorphologicalTokenizer {
    analyzer: Option<Arc<dyn MorphAnalyzer>>,
}

impl MorphologicalTokenizer {
    /// Create a tokenizer with no analyzer (whitespace fallback only).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tokenizer backed by an analyzer.
    pub fn with_analyzer(analyzer: Arc<dyn MorphAnalyzer>) -> Self {
        Self {
            analyzer: Some(analyzer),
        }
    }

    /// Whether an analyzer is attached.
    pub fn has_analyzer(&self) -> bool {
        self.analyzer.is_some()
    }

    fn whitespace(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }
}

impl fmt::Debug for MorphologicalTokenizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MorphologicalTokenizer")
            .field("has_analyzer", &self.has_analyzer())
            .finish()
    }
}

impl Tokenizer for MorphologicalTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        let Some(analyzer) = &self.analyzer else {
            return Self::whitespace(text);
        };

        match analyzer.analyze(text) {
            Ok(morphemes) => morphemes
                .iter()
                .map(Morpheme::token)
                .filter(|t| !t.trim().is_empty())
                .map(str::to_string)
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, "morphological analyzer failed, falling back to whitespace");
                Self::whitespace(text)
            }
        }
    }

    fn name(&self) -> &'static str {
        if self.has_analyzer() {
            "morphological"
        } else {
            "whitespace_fallback"
        }
    }
}

/// Supported document languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    /// English (word-boundary tokenizer).
    English,
    /// Japanese (morphological tokenizer).
    Japanese,
}

impl Language {
    /// Parse a language tag. Unsupported tags fail immediately.
    pub fn from_tag(tag: &str) -> Result<Self, EncoderError> {
        match tag.to_lowercase().as_str() {
            "en" => Ok(Self::English),
            "ja" => Ok(Self::Japanese),
            _ => Err(EncoderError::UnsupportedLanguage(tag.to_string())),
        }
    }

    /// The canonical tag.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Japanese => "ja",
        }
    }

    /// The default tokenizer for this language.
    pub fn default_tokenizer(&self) -> Box<dyn Tokenizer> {
        match self {
            Self::English => Box::new(WordBoundaryTokenizer),
            Self::Japanese => Box::new(MorphologicalTokenizer::new()),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

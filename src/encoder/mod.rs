//! Shared-vocabulary TF-IDF encoder ("Union-K").
//!
//! The encoder is a two-phase object: it is built unfit from a language tag,
//! fitted exactly once on the whole-document corpus, and then used read-only to
//! encode gist and detail texts into one shared vector space.
//!
//! ## Weighting
//!
//! ```text
//! terms(text) = unigrams(tokenize(lowercase(text))) ++ bigrams(...)
//! idf(t)      = ln((1 + n_docs) / (1 + df(t))) + 1
//! w(t)        = (1 + ln(count(t))) * idf(t)          // count(t) > 0
//! vector      = w / ||w||_2
//! ```
//!
//! Once fitted the encoder holds no interior mutability and can be shared
//! across threads by reference.

pub mod tokenizer;
pub mod vector;

use std::collections::BTreeMap;
use std::fmt;

pub use tokenizer::{
    AnalyzerError, Language, MorphAnalyzer, Morpheme, MorphologicalTokenizer, Tokenizer,
    WordBoundaryTokenizer,
};
pub use vector::{cosine_similarity, EncodedVector};

/// Identifier recorded in reports for this encoder family.
pub const ENCODER_ID: &str = "tfidf-v1";

/// Default vocabulary cap.
pub const DEFAULT_MAX_FEATURES: usize = 50_000;

/// Encoder state and configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncoderError {
    /// Encoding attempted before `fit`.
    #[error("Encoder not fitted")]
    NotFitted,
    /// `fit` called on an already fitted encoder.
    #[error("Encoder already fitted")]
    AlreadyFitted,
    /// Language tag has no tokenizer.
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),
}

/// Fitted vocabulary: term -> column, plus per-column idf.
#[derive(Debug, Clone)]
struct Vocabulary {
    index: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

/// Term statistics gathered while fitting.
#[derive(Debug, Default, Clone, Copy)]
struct TermStats {
    total: usize,
    doc_freq: usize,
}

/// TF-IDF encoder over unigrams and bigrams with a fixed, shared vocabulary.
pub struct VocabularyEncoder {
    language: Language,
    seed: u64,
    max_features: usize,
    tokenizer: Box<dyn Tokenizer>,
    vocabulary: Option<Vocabulary>,
}

impl VocabularyEncoder {
    /// Create an unfit encoder for a language tag (`en`, `ja`).
    ///
    /// Unsupported tags fail with [`EncoderError::UnsupportedLanguage`].
    pub fn new(lang: &str, seed: u64) -> Result<Self, EncoderError> {
        let language = Language::from_tag(lang)?;
        Ok(Self::with_tokenizer(language, seed, language.default_tokenizer()))
    }

    /// Create an unfit encoder with an explicit tokenizer (e.g. a morphological
    /// tokenizer backed by a real analyzer).
    pub fn with_tokenizer(language: Language, seed: u64, tokenizer: Box<dyn Tokenizer>) -> Self {
        Self {
            language,
            seed,
            max_features: DEFAULT_MAX_FEATURES,
            tokenizer,
            vocabulary: None,
        }
    }

    /// Set the vocabulary cap. Only meaningful before `fit`.
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = max_features;
        self
    }

    /// Language this encoder tokenizes.
    pub fn language(&self) -> Language {
        self.language
    }

    /// Seed recorded for provenance. Fitting is deterministic regardless.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Encoder family identifier.
    pub fn encoder_id(&self) -> &'static str {
        ENCODER_ID
    }

    /// Whether `fit` has completed.
    pub fn is_fitted(&self) -> bool {
        self.vocabulary.is_some()
    }

    /// Size of the fitted vocabulary (0 before fitting).
    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.as_ref().map(|v| v.idf.len()).unwrap_or(0)
    }

    /// Column of a term in the fitted vocabulary.
    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.as_ref()?.index.get(term).copied()
    }

    /// Full analyzer output: lowercased tokens followed by adjacent bigrams.
    pub fn analyze(&self, text: &str) -> Vec<String> {
        let tokens = self.tokenizer.tokenize(&text.to_lowercase());
        let mut terms = Vec::with_capacity(tokens.len() * 2);
        terms.extend(tokens.iter().cloned());
        terms.extend(tokens.windows(2).map(|w| format!("{} {}", w[0], w[1])));
        terms
    }

    /// Number of analyzer terms in a text. Does not require fitting.
    pub fn token_count(&self, text: &str) -> usize {
        self.analyze(text).len()
    }

    /// Build the vocabulary and idf weights from a corpus.
    ///
    /// Must be called exactly once. Beyond `max_features`, the terms with the
    /// lowest total corpus count are dropped (ties resolved lexicographically).
    pub fn fit<S: AsRef<str>>(&mut self, corpus: &[S]) -> Result<(), EncoderError> {
        if self.is_fitted() {
            return Err(EncoderError::AlreadyFitted);
        }

        let n_docs = corpus.len();
        let mut stats: BTreeMap<String, TermStats> = BTreeMap::new();

        for doc in corpus {
            let mut counts: BTreeMap<String, usize> = BTreeMap::new();
            for term in self.analyze(doc.as_ref()) {
                *counts.entry(term).or_insert(0) += 1;
            }
            for (term, count) in counts {
                let entry = stats.entry(term).or_default();
                entry.total += count;
                entry.doc_freq += 1;
            }
        }

        if stats.len() > self.max_features {
            let mut ranked: Vec<(String, TermStats)> = stats.into_iter().collect();
            // Highest total first, then lexicographic for determinism
            ranked.sort_by(|a, b| b.1.total.cmp(&a.1.total).then_with(|| a.0.cmp(&b.0)));
            ranked.truncate(self.max_features);
            stats = ranked.into_iter().collect();
        }

        // BTreeMap iteration gives lexicographic column order
        let mut index = BTreeMap::new();
        let mut idf = Vec::with_capacity(stats.len());
        for (col, (term, s)) in stats.into_iter().enumerate() {
            idf.push(((1.0 + n_docs as f64) / (1.0 + s.doc_freq as f64)).ln() + 1.0);
            index.insert(term, col);
        }

        if idf.is_empty() {
            tracing::warn!(documents = n_docs, "encoder fitted with an empty vocabulary");
        } else {
            tracing::debug!(
                documents = n_docs,
                vocabulary = idf.len(),
                tokenizer = self.tokenizer.name(),
                "encoder fitted"
            );
        }

        self.vocabulary = Some(Vocabulary { index, idf });
        Ok(())
    }

    /// Encode one text against the fitted vocabulary.
    pub fn transform(&self, text: &str) -> Result<EncodedVector, EncoderError> {
        let vocab = self.vocabulary.as_ref().ok_or(EncoderError::NotFitted)?;

        let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
        for term in self.analyze(text) {
            if let Some(&col) = vocab.index.get(&term) {
                *counts.entry(col).or_insert(0) += 1;
            }
        }

        let mut values = vec![0.0; vocab.idf.len()];
        for (col, count) in counts {
            values[col] = (1.0 + (count as f64).ln()) * vocab.idf[col];
        }

        let mut vector = EncodedVector::new(values);
        vector.l2_normalize();
        Ok(vector)
    }

    /// Encode gist and detail independently.
    pub fn encode(
        &self,
        gist: &str,
        detail: &str,
    ) -> Result<(EncodedVector, EncodedVector), EncoderError> {
        Ok((self.transform(gist)?, self.transform(detail)?))
    }

    /// Union vector: elementwise maximum of the gist and detail vectors.
    pub fn encode_union(&self, gist: &str, detail: &str) -> Result<EncodedVector, EncoderError> {
        let (g, d) = self.encode(gist, detail)?;
        Ok(g.union(&d))
    }
}

impl fmt::Debug for VocabularyEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VocabularyEncoder")
            .field("language", &self.language)
            .field("seed", &self.seed)
            .field("max_features", &self.max_features)
            .field("tokenizer", &self.tokenizer.name())
            .field("vocabulary_len", &self.vocabulary_len())
            .finish()
    }
}

//! Canonical text transformation for deterministic content hashing.
//!
//! The skeleton hash recorded in every report is computed over canonical text,
//! so that encoding artifacts (CRLF line endings, stray surrounding whitespace)
//! never change the identity of a document:
//!
//! ```text
//! canonical_content(text) = UTF-8(trim(normalize_newlines(text)))
//! ```
//!
//! Where:
//! - `normalize_newlines`: CRLF -> LF, CR -> LF
//! - `trim`: remove leading and trailing whitespace

use sha2::{Digest, Sha256};

/// Version of the canonical content format.
///
/// Changes to this version invalidate all previously recorded skeleton hashes.
pub const CANONICAL_CONTENT_VERSION: &str = "1.0.0";

/// Normalize text to canonical form.
///
/// # Example
///
/// ```rust
/// use gor_kernel::canonical_content::normalize_text;
///
/// let detail = "  costs fell\r\nmargins widened  ";
/// assert_eq!(normalize_text(detail), "costs fell\nmargins widened");
/// ```
pub fn normalize_text(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .trim()
        .to_string()
}

/// Convert text to canonical bytes for hashing.
pub fn canonical_content(text: &str) -> Vec<u8> {
    normalize_text(text).into_bytes()
}

/// SHA-256 of the canonical content as a 64-character lowercase hex string.
///
/// ```rust
/// use gor_kernel::canonical_content::compute_content_hash;
///
/// let hash = compute_content_hash("node\tA\tclaim\tmargins widen\t");
/// assert_eq!(hash.len(), 64);
/// ```
pub fn compute_content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_content(text));
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_line_endings_normalized() {
        assert_eq!(normalize_text("prices rose\r\nwages lagged"), "prices rose\nwages lagged");
        assert_eq!(normalize_text("prices rose\rwages lagged"), "prices rose\nwages lagged");
    }

    #[test]
    fn test_gist_padding_trimmed() {
        assert_eq!(normalize_text("  margins widen \n"), "margins widen");
        assert_eq!(normalize_text("   "), "");
    }

    #[test]
    fn test_skeleton_hash_format() {
        let hash = compute_content_hash("node\tA\tclaim\tmargins widen\t\n");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_hash_ignores_line_ending_style() {
        assert_eq!(
            compute_content_hash("line one\r\nline two"),
            compute_content_hash("line one\nline two\n"),
        );
    }

    #[test]
    fn test_hash_changes_with_content() {
        assert_ne!(compute_content_hash("報告の幾何学"), compute_content_hash("理論"));
    }
}

//! Structured error types for org chart updates.
//!
//! Every failure a batch can recover from has its own variant so callers can
//! decide between "skip this document" and "report and exit non-zero".

use std::path::PathBuf;

use thiserror::Error;

/// The unified error type returned by all public `orgchart` functions.
#[derive(Debug, Error)]
pub enum OrgchartError {
    /// A base document, snapshot or template file does not exist.
    #[error("File not found: {}", .path.display())]
    MissingFile { path: PathBuf },

    /// The search text is absent from the snapshot or the document.
    #[error("Text '{search}' not found in {scope}")]
    TextNotFound { search: String, scope: String },

    /// The org id has no entry in the position snapshot.
    #[error("Org chart '{org_id}' not found in snapshot (available: {})", .available.join(", "))]
    UnknownOrg {
        org_id: String,
        available: Vec<String>,
    },

    /// A template or merge targets a page the document does not have.
    #[error("Page index {index} out of range: document has {page_count} page(s)")]
    PageIndexOutOfRange { index: usize, page_count: usize },

    /// A JSON config (template, snapshot, settings) failed to parse.
    #[error("Failed to parse {}: {source}{}", .path.display(), format_hint(.hint))]
    MalformedConfig {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
        hint: String,
    },

    /// A template parsed but violates a structural rule.
    #[error("Invalid template {}: {reason}", .path.display())]
    InvalidTemplate { path: PathBuf, reason: String },

    /// lopdf failed to open, interpret or save a document.
    #[error("PDF error: {0}")]
    Pdf(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn format_hint(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl OrgchartError {
    /// Wrap a serde_json failure for `path`, attaching an operator hint.
    pub fn malformed(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        let hint = match source.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the expected schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input, is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        OrgchartError::MalformedConfig {
            path: path.into(),
            source,
            hint,
        }
    }

    pub(crate) fn pdf(context: &str, err: impl std::fmt::Display) -> Self {
        OrgchartError::Pdf(format!("{}: {}", context, err))
    }
}

pub type Result<T> = std::result::Result<T, OrgchartError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_hint_for_syntax_error() {
        let err = serde_json::from_str::<serde_json::Value>("{ \"a\": 1, }").unwrap_err();
        let wrapped = OrgchartError::malformed("t.json", err);
        let msg = wrapped.to_string();
        assert!(msg.contains("t.json"));
        assert!(msg.contains("trailing commas"));
    }

    #[test]
    fn test_unknown_org_lists_available() {
        let err = OrgchartError::UnknownOrg {
            org_id: "X".into(),
            available: vec!["A".into(), "B".into()],
        };
        assert_eq!(
            err.to_string(),
            "Org chart 'X' not found in snapshot (available: A, B)"
        );
    }
}

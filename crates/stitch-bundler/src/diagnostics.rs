//! Diagnostic extraction from bundling engine errors.
//!
//! Engines report failures in their own error types. This module flattens
//! them into [`ExtractedDiagnostic`] values that are cloneable, serializable
//! and stable across engine versions, so an invocation failure can be passed
//! to the caller without losing its content.

use serde::{Deserialize, Serialize};

/// Extracted diagnostic information from a bundling engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedDiagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub file: Option<String>,
    pub help: Option<String>,
}

impl ExtractedDiagnostic {
    /// Diagnostic with only a kind and message.
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            file: None,
            help: None,
        }
    }
}

/// Diagnostic kind (mirrors the engine's event kinds).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    ParseError,
    UnresolvedEntry,
    UnresolvedImport,
    InvalidOption,
    Transform,
    Other(String),
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticKind::ParseError => write!(f, "ParseError"),
            DiagnosticKind::UnresolvedEntry => write!(f, "UnresolvedEntry"),
            DiagnosticKind::UnresolvedImport => write!(f, "UnresolvedImport"),
            DiagnosticKind::InvalidOption => write!(f, "InvalidOption"),
            DiagnosticKind::Transform => write!(f, "Transform"),
            DiagnosticKind::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Extract diagnostics from Rolldown error types.
///
/// Rolldown's batched diagnostics have no stable structured accessor, so the
/// debug rendering is parsed instead.
pub fn extract_from_rolldown_error(error: &dyn std::fmt::Debug) -> Vec<ExtractedDiagnostic> {
    extract_from_message(&format!("{error:?}"))
}

/// Split a rendered error message into one diagnostic per batched entry.
pub(crate) fn extract_from_message(error_str: &str) -> Vec<ExtractedDiagnostic> {
    let parts: Vec<&str> = error_str
        .split("BatchedBuildDiagnostic")
        .filter(|s| !s.trim().is_empty())
        .collect();

    if parts.len() > 1 {
        parts.iter().map(|part| extract_single(part)).collect()
    } else {
        vec![extract_single(error_str)]
    }
}

fn extract_single(error_str: &str) -> ExtractedDiagnostic {
    let kind = if error_str.contains("Parse error")
        || error_str.contains("Syntax")
        || error_str.contains("Expected")
    {
        DiagnosticKind::ParseError
    } else if error_str.contains("UnresolvedEntry") {
        DiagnosticKind::UnresolvedEntry
    } else if error_str.contains("UnresolvedImport") || error_str.contains("Cannot resolve") {
        DiagnosticKind::UnresolvedImport
    } else if error_str.contains("InvalidOption") {
        DiagnosticKind::InvalidOption
    } else if error_str.contains("Transform") || error_str.contains("transform") {
        DiagnosticKind::Transform
    } else {
        DiagnosticKind::Other("BundlerError".to_string())
    };

    ExtractedDiagnostic {
        kind,
        message: error_str.trim().to_string(),
        file: extract_file_path(error_str),
        help: extract_help_text(error_str),
    }
}

/// Extract file path from error message.
fn extract_file_path(text: &str) -> Option<String> {
    for ext in &[".ts", ".js", ".mjs", ".css", ".json"] {
        if let Some(pos) = text.find(ext) {
            let before = &text[..pos + ext.len()];
            for indicator in &["in ", "at ", "file: ", "path: ", "\"", "'"] {
                if let Some(start) = before.rfind(indicator) {
                    let path_str = before[start + indicator.len()..]
                        .trim()
                        .trim_matches(|c| c == '"' || c == '\'' || c == '\\');
                    if !path_str.is_empty() && !path_str.contains(char::is_whitespace) {
                        return Some(path_str.to_string());
                    }
                }
            }
        }
    }
    None
}

/// Extract help text from error message.
fn extract_help_text(text: &str) -> Option<String> {
    for indicator in &["help: ", "Help: ", "hint: ", "Hint: "] {
        if let Some(pos) = text.find(indicator) {
            let after = &text[pos + indicator.len()..];
            let help_str = after.lines().next().unwrap_or("").trim();
            if !help_str.is_empty() {
                return Some(help_str.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_unresolved_import() {
        let diags = extract_from_message("Cannot resolve './missing' in \"src/a.ts\"");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::UnresolvedImport);
        assert_eq!(diags[0].file.as_deref(), Some("src/a.ts"));
    }

    #[test]
    fn test_extract_batched() {
        let diags = extract_from_message(
            "BatchedBuildDiagnostic Parse error at 'a.js' BatchedBuildDiagnostic Transform failed",
        );
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].kind, DiagnosticKind::ParseError);
        assert_eq!(diags[1].kind, DiagnosticKind::Transform);
    }

    #[test]
    fn test_extract_help() {
        let diags = extract_from_message("something broke\nhelp: check the import");
        assert_eq!(diags[0].help.as_deref(), Some("check the import"));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(DiagnosticKind::ParseError.to_string(), "ParseError");
        assert_eq!(DiagnosticKind::Other("X".into()).to_string(), "X");
    }
}

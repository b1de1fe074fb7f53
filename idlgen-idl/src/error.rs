//! Error types for AST loading and reference resolution

use crate::search::Suggestion;

/// Structured error type for AST loading and lookup operations.
#[derive(Debug, Clone)]
pub enum IdlError {
    /// A referenced declaration does not exist in the file it should live in.
    NotFound {
        input: String,
        scope: String,
        suggestions: Vec<Suggestion>,
    },
    /// A namespace qualifier does not match any file included by `file`.
    UnknownNamespace {
        namespace: String,
        file: String,
        available: Vec<String>,
    },
    ParseError {
        path: String,
        source: String,
    },
    InvalidPath {
        path: String,
    },
}

impl std::fmt::Display for IdlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdlError::NotFound {
                input,
                scope,
                suggestions,
            } => {
                write!(f, "Not found: '{}' in {}", input, scope)?;
                if !suggestions.is_empty() {
                    write!(f, ". Did you mean: {}?", suggestions[0].candidate)?;
                }
                Ok(())
            }
            IdlError::UnknownNamespace {
                namespace,
                file,
                available,
            } => {
                write!(f, "Unknown namespace '{}' referenced from {}", namespace, file)?;
                if !available.is_empty() {
                    write!(f, " (included: {})", available.join(", "))?;
                }
                Ok(())
            }
            IdlError::ParseError { path, source } => {
                write!(f, "Parse error in {}: {}", path, source)
            }
            IdlError::InvalidPath { path } => write!(f, "Invalid path: {}", path),
        }
    }
}

impl std::error::Error for IdlError {}

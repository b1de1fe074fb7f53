//! Loading parser output
//!
//! The IDL grammar is handled by an external parser which dumps its result as
//! a JSON array of [`ParseResultItem`]. Several dumps can be merged into one
//! AST set.

use crate::error::IdlError;
use crate::types::ParseResultItem;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

pub fn parse_ast_file<P: AsRef<Path>>(path: P) -> Result<Vec<ParseResultItem>, IdlError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| IdlError::ParseError {
        path: path.display().to_string(),
        source: format!("failed to read AST file: {}", e),
    })?;

    serde_json::from_str(&content).map_err(|e| IdlError::ParseError {
        path: path.display().to_string(),
        source: e.to_string(),
    })
}

pub fn parse_ast_content(content: &str) -> Result<Vec<ParseResultItem>, IdlError> {
    serde_json::from_str(content).map_err(|e| IdlError::ParseError {
        path: "<inline>".to_string(),
        source: e.to_string(),
    })
}

/// Load and merge several AST dumps.
///
/// A file present in more than one dump is kept once; an entry flag set in
/// any dump wins.
pub fn parse_ast_files<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<ParseResultItem>, IdlError> {
    let mut merged: Vec<ParseResultItem> = Vec::new();
    let mut seen = HashSet::new();

    for path in paths {
        for item in parse_ast_file(path)? {
            if seen.insert(item.idl_path.clone()) {
                merged.push(item);
            } else if item.is_entry {
                if let Some(existing) = merged.iter_mut().find(|f| f.idl_path == item.idl_path) {
                    existing.is_entry = true;
                }
            } else {
                tracing::debug!(idl_path = %item.idl_path, "skipping duplicate AST entry");
            }
        }
    }

    Ok(merged)
}

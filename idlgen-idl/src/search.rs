//! Name search across parsed IDL files with fuzzy matching

use crate::types::{ParseResultItem, StatementKind};
use strsim::levenshtein;

/// A fuzzy match suggestion with candidate name and edit distance.
#[derive(Debug, Clone)]
pub struct Suggestion {
    pub candidate: String,
    pub distance: usize,
}

/// How a search result was matched.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchType {
    Exact,
    CaseInsensitive,
    Contains,
}

/// A single declaration found by [`search_ast`].
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub name: String,
    pub idl_path: String,
    pub kind: StatementKind,
    pub match_type: MatchType,
}

/// Suggest similar names from a list of candidates using fuzzy matching.
///
/// Returns candidates sorted by edit distance (closest first).
/// Exact matches are excluded. Case-insensitive matches get distance 0,
/// substring matches get distance 1, and Levenshtein matches use their
/// actual edit distance.
pub fn suggest_similar(name: &str, candidates: &[&str], max_distance: usize) -> Vec<Suggestion> {
    let name_lower = name.to_lowercase();
    let mut suggestions: Vec<Suggestion> = candidates
        .iter()
        .filter_map(|&candidate| {
            if candidate == name {
                return None;
            }
            let candidate_lower = candidate.to_lowercase();
            let distance = if candidate_lower == name_lower {
                0
            } else if candidate_lower.contains(&name_lower) || name_lower.contains(&candidate_lower)
            {
                1
            } else {
                levenshtein(name, candidate)
            };
            (distance <= max_distance).then(|| Suggestion {
                candidate: candidate.to_string(),
                distance,
            })
        })
        .collect();
    suggestions.sort_by_key(|s| s.distance);
    suggestions
}

/// Suggest declarations of `file` whose names resemble `name`.
pub fn suggest_definitions(file: &ParseResultItem, name: &str) -> Vec<Suggestion> {
    let names: Vec<&str> = file
        .statements
        .iter()
        .filter(|s| !s.is_opaque())
        .map(|s| s.name())
        .collect();
    suggest_similar(name, &names, 3)
}

/// Search every declaration of every file for names matching the query.
///
/// Results keep file order, then declaration order.
pub fn search_ast(files: &[ParseResultItem], query: &str) -> Vec<SearchResult> {
    let q = query.to_lowercase();
    let mut results = Vec::new();

    for file in files {
        for statement in file.statements.iter().filter(|s| !s.is_opaque()) {
            let name = statement.name();
            let match_type = if name == query {
                MatchType::Exact
            } else if name.to_lowercase() == q {
                MatchType::CaseInsensitive
            } else if name.to_lowercase().contains(&q) {
                MatchType::Contains
            } else {
                continue;
            };
            results.push(SearchResult {
                name: name.to_string(),
                idl_path: file.idl_path.clone(),
                kind: statement.kind(),
                match_type,
            });
        }
    }
    results
}

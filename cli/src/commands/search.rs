use anyhow::{Context, Result};
use colored::Colorize;
use idlgen_idl::parse::parse_ast_files;
use idlgen_idl::search::{search_ast, MatchType, SearchResult};
use idlgen_idl::types::StatementKind;
use serde::Serialize;

use crate::config::{config_dir, IdlgenConfig};

#[derive(Serialize)]
struct SearchResultJson {
    api: String,
    name: String,
    kind: String,
    idl_path: String,
    match_type: String,
}

fn format_match_type(mt: &MatchType) -> &'static str {
    match mt {
        MatchType::Exact => "exact",
        MatchType::CaseInsensitive => "case-insensitive",
        MatchType::Contains => "contains",
    }
}

pub fn search(config_path: &str, query: &str, api_name: Option<&str>, json: bool) -> Result<()> {
    let config = IdlgenConfig::load(config_path)
        .context("Failed to load configuration. Create an idlgen.toml listing your APIs.")?;
    let base_dir = config_dir(config_path)?;

    let mut found: Vec<(String, SearchResult)> = Vec::new();
    for api in config.select_apis(api_name)? {
        let files = parse_ast_files(&api.ast_paths(&base_dir))
            .with_context(|| format!("Failed to load AST files of API '{}'", api.name))?;
        found.extend(
            search_ast(&files, query)
                .into_iter()
                .map(|r| (api.name.clone(), r)),
        );
    }

    if json {
        let json_results: Vec<SearchResultJson> = found
            .iter()
            .map(|(api, r)| SearchResultJson {
                api: api.clone(),
                name: r.name.clone(),
                kind: r.kind.to_string(),
                idl_path: r.idl_path.clone(),
                match_type: format_match_type(&r.match_type).to_string(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&json_results)?);
        return Ok(());
    }

    if found.is_empty() {
        println!("  {} '{}'", "No results found for".dimmed(), query);
        return Ok(());
    }

    let sections = [
        ("Services", StatementKind::Service),
        ("Structs", StatementKind::Struct),
        ("Enums", StatementKind::Enum),
        ("Typedefs", StatementKind::Typedef),
        ("Constants", StatementKind::Const),
    ];
    for (label, kind) in &sections {
        let section_results: Vec<&(String, SearchResult)> =
            found.iter().filter(|(_, r)| r.kind == *kind).collect();
        if section_results.is_empty() {
            continue;
        }
        println!("{}", label.bold());
        for (api, r) in section_results {
            println!(
                "  {} {} {}",
                r.name.green(),
                format!("({})", format_match_type(&r.match_type)).dimmed(),
                format!("[{}] {}", api, r.idl_path).dimmed()
            );
        }
    }

    Ok(())
}

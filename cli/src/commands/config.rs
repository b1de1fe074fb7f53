use anyhow::{Context, Result};
use colored::Colorize;

use crate::config::{config_dir, IdlgenConfig};
use crate::ui;

pub fn validate(config_path: &str) -> Result<()> {
    ui::print_step("Validating configuration...");

    let config = IdlgenConfig::load(config_path)
        .context("Failed to load configuration. Create an idlgen.toml listing your APIs.")?;
    let base_dir = config_dir(config_path)?;

    ui::print_success("Configuration is valid!");
    println!();
    println!("  Project: {}", config.project.name.bold());
    println!();

    if config.apis.is_empty() {
        ui::print_warning("No APIs defined");
        println!("  Add an {} table to {}", "[[apis]]".cyan(), config_path);
        return Ok(());
    }

    println!("  {} APIs ({}):", ui::symbols::BULLET.dimmed(), config.apis.len());
    for api in &config.apis {
        let filter = if api.methods.is_empty() {
            "all types".to_string()
        } else {
            let count: usize = api.methods.values().map(Vec::len).sum();
            format!("{} method(s)", count)
        };
        println!(
            "    {} {} -> {} ({}{})",
            ui::symbols::BULLET.dimmed(),
            api.name.bold(),
            api.output_dir,
            filter,
            if api.mock { ", mock" } else { "" }
        );
        for path in api.ast_paths(&base_dir) {
            if !path.is_file() {
                ui::print_warning(&format!("AST file not found: {}", path.display()));
            }
        }
    }

    Ok(())
}

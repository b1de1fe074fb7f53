use anyhow::{Context, Result};
use colored::Colorize;
use idlgen_generator::gen_client;
use std::slice;

use crate::config::{config_dir, IdlgenConfig};
use crate::ui;

pub fn generate(config_path: &str, api_name: Option<&str>, dry_run: bool) -> Result<()> {
    let config = IdlgenConfig::load(config_path)
        .context("Failed to load configuration. Create an idlgen.toml listing your APIs.")?;
    let base_dir = config_dir(config_path)?;
    let apis = config.select_apis(api_name)?;
    tracing::debug!(config = %config_path, base_dir = %base_dir.display(), apis = apis.len(), "loaded configuration");

    if apis.is_empty() {
        ui::print_warning("No APIs defined, nothing to generate");
        return Ok(());
    }

    ui::print_step(&format!(
        "Generating {} API(s) for {}{}",
        apis.len(),
        config.project.name.bold(),
        if dry_run { " (dry run)" } else { "" }
    ));

    for api in apis {
        let client = api.to_client_config(&base_dir, dry_run);
        let spinner = ui::create_spinner(&format!("Generating {}...", api.name));
        let result = gen_client(slice::from_ref(&client));
        spinner.finish_and_clear();

        let reports = result.with_context(|| format!("Failed to generate API '{}'", api.name))?;
        for report in reports {
            let verb = if report.written { "Generated" } else { "Would generate" };
            ui::print_success(&format!(
                "{} {} file(s) for {}",
                verb,
                report.files.len(),
                report.name.bold()
            ));
            for file in &report.files {
                ui::print_item(&file.display().to_string());
            }
        }
    }

    Ok(())
}

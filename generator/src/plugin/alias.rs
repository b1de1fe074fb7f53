//! Renames the services of entry files

use super::Plugin;
use crate::context::ParseEntry;
use crate::program::{on, Program};
use idlgen_idl::types::Statement;
use std::collections::HashMap;

/// Renames every service of an entry file listed in `alias` (keyed by the
/// file's absolute IDL path). Must be installed before
/// [`FilterTypesPlugin`](super::FilterTypesPlugin), whose method whitelist is
/// keyed by the final service names.
pub struct AliasPlugin {
    alias: HashMap<String, String>,
}

impl AliasPlugin {
    pub fn new(alias: HashMap<String, String>) -> Self {
        Self { alias }
    }
}

impl Plugin for AliasPlugin {
    fn name(&self) -> &'static str {
        "alias"
    }

    fn apply(self: Box<Self>, program: &mut Program) {
        let alias = self.alias;
        program.register(on::<ParseEntry>(), move |mut ctx| {
            for file in ctx.ast.iter_mut().filter(|f| f.is_entry) {
                let Some(new_name) = alias.get(&file.idl_path) else {
                    continue;
                };
                for statement in &mut file.statements {
                    if let Statement::ServiceDefinition(service) = statement {
                        tracing::debug!(
                            file = %file.idl_path,
                            from = %service.name,
                            to = %new_name,
                            "aliasing service"
                        );
                        service.name = new_name.clone();
                    }
                }
            }
            Ok(ctx)
        });
    }
}

//! Enum artifact rendering
//!
//! Enums removed from the declarations by the type filter are published as
//! `{ value, label }` tables, one TypeScript namespace per IDL namespace.

use idlgen_idl::namespace::uniform_namespace;
use idlgen_idl::types::EnumDefinition;
use std::collections::BTreeMap;

pub const ENUM_FILE_NAME: &str = "enums.ts";

pub const GENERATED_HEADER: &str = "// Code generated by idlgen. DO NOT EDIT.";

/// Enums collected per namespace, each bucket de-duplicated by name and kept
/// in insertion order.
#[derive(Debug, Clone, Default)]
pub struct EnumRegistry {
    buckets: BTreeMap<String, Vec<EnumDefinition>>,
}

impl EnumRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when an enum of the same name is already registered
    /// under `namespace`.
    pub fn insert(&mut self, namespace: &str, definition: &EnumDefinition) -> bool {
        let bucket = self.buckets.entry(namespace.to_string()).or_default();
        if bucket.iter().any(|e| e.name == definition.name) {
            return false;
        }
        bucket.push(definition.clone());
        true
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(Vec::is_empty)
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    pub fn get(&self, namespace: &str) -> &[EnumDefinition] {
        self.buckets.get(namespace).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn render(&self) -> String {
        let mut output = String::new();
        output.push_str(GENERATED_HEADER);
        output.push_str("\n\n");

        for (namespace, enums) in &self.buckets {
            if enums.is_empty() {
                continue;
            }
            output.push_str(&format!(
                "export namespace {} {{\n",
                uniform_namespace(namespace)
            ));
            for definition in enums {
                output.push_str(&render_enum_table(definition));
            }
            output.push_str("}\n\n");
        }

        output.truncate(output.trim_end().len());
        output.push('\n');
        output
    }
}

fn render_enum_table(definition: &EnumDefinition) -> String {
    let rows: Vec<String> = definition
        .members
        .iter()
        .zip(definition.values())
        .map(|(member, value)| {
            format!(
                "    {{ value: {}, label: '{}' }},",
                value,
                escape_single_quoted(&member.name)
            )
        })
        .collect();

    if rows.is_empty() {
        return format!("  export const {} = [];\n", definition.name);
    }
    format!(
        "  export const {} = [\n{}\n  ];\n",
        definition.name,
        rows.join("\n")
    )
}

fn escape_single_quoted(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use idlgen_idl::types::{ConstValue, EnumMember};

    fn member(name: &str, initializer: Option<&str>) -> EnumMember {
        EnumMember {
            name: name.to_string(),
            initializer: initializer.map(|v| ConstValue::IntConstant {
                value: v.to_string(),
            }),
            comments: vec![],
        }
    }

    fn status() -> EnumDefinition {
        EnumDefinition {
            name: "Status".to_string(),
            members: vec![member("ACTIVE", None), member("BLOCKED", Some("5"))],
            comments: vec![],
        }
    }

    #[test]
    fn test_insert_deduplicates_by_name() {
        let mut registry = EnumRegistry::new();
        assert!(registry.insert("user", &status()));
        assert!(!registry.insert("user", &status()));
        assert!(registry.insert("base", &status()));
        assert_eq!(registry.get("user").len(), 1);
        assert_eq!(registry.namespaces().collect::<Vec<_>>(), vec!["base", "user"]);
    }

    #[test]
    fn test_render_enum_tables() {
        let mut registry = EnumRegistry::new();
        registry.insert("flow.user", &status());

        let rendered = registry.render();
        assert_eq!(
            rendered,
            "// Code generated by idlgen. DO NOT EDIT.\n\n\
             export namespace flow_user {\n  \
             export const Status = [\n    \
             { value: 0, label: 'ACTIVE' },\n    \
             { value: 5, label: 'BLOCKED' },\n  \
             ];\n\
             }\n"
        );
    }

    #[test]
    fn test_empty_registry() {
        let registry = EnumRegistry::new();
        assert!(registry.is_empty());
    }
}

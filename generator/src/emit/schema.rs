//! JSON schema emitter
//!
//! Writes one `<file>.schema.json` per remaining IDL file. Its `$id` is the
//! file's schema root, so request functions and other schemas can point at
//! `<root>#/definitions/<Name>`.

use crate::context::ProcessIdlAst;
use crate::error::GenError;
use crate::plugin::Plugin;
use crate::program::{on, Program};
use idlgen_idl::namespace::{namespace_by_path, split_identifier};
use idlgen_idl::types::*;
use idlgen_idl::utils::{output_path, schema_root};
use serde_json::{json, Map, Value};
use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct SchemaConfig {
    pub idl_root: PathBuf,
    pub output_dir: PathBuf,
}

/// Build the schema document of one file.
pub fn generate_schema(file: &ParseResultItem, config: &SchemaConfig) -> Result<Value, GenError> {
    let mut definitions = Map::new();
    for statement in &file.statements {
        match statement {
            Statement::StructDefinition(def) => {
                definitions.insert(def.name.clone(), struct_schema(def, file, config)?);
            }
            Statement::EnumDefinition(def) => {
                let values = def.values();
                let values = if values.is_empty() { vec![0] } else { values };
                definitions.insert(def.name.clone(), json!({ "enum": values }));
            }
            Statement::TypedefDefinition(def) => {
                definitions.insert(def.name.clone(), value_schema(&def.definition_type, file, config)?);
            }
            Statement::ConstDefinition(def) => {
                definitions.insert(def.name.clone(), const_schema(&def.initializer));
            }
            Statement::ServiceDefinition(def) => {
                for function in &def.functions {
                    let request = match function.request_type() {
                        Some(field_type) => value_schema(field_type, file, config)?,
                        None => json!({}),
                    };
                    definitions.insert(format!("{}.req", function.name), request);
                    definitions.insert(
                        format!("{}.res", function.name),
                        value_schema(&function.return_type, file, config)?,
                    );
                }
            }
            Statement::Other(_) => {}
        }
    }

    Ok(json!({
        "$id": schema_root(&file.idl_path, &config.idl_root),
        "definitions": definitions,
    }))
}

fn struct_schema(
    def: &StructDefinition,
    file: &ParseResultItem,
    config: &SchemaConfig,
) -> Result<Value, GenError> {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for field in &def.fields {
        let name = field.wire_name();
        if properties.contains_key(name) {
            continue;
        }
        if !field.is_optional() {
            required.push(name.to_string());
        }
        properties.insert(name.to_string(), value_schema(&field.field_type, file, config)?);
    }
    Ok(json!({
        "type": "object",
        "properties": properties,
        "required": required,
    }))
}

fn value_schema(field_type: &FieldType, file: &ParseResultItem, config: &SchemaConfig) -> Result<Value, GenError> {
    let schema = match field_type {
        FieldType::Base(base) => match base.category() {
            BaseCategory::Number if *base == BaseType::Double => json!({ "type": "number" }),
            BaseCategory::Number => json!({ "type": "integer" }),
            BaseCategory::String => json!({ "type": "string" }),
            BaseCategory::Boolean => json!({ "type": "boolean" }),
            BaseCategory::Binary => json!({ "type": "object", "properties": {} }),
            BaseCategory::Void => json!({ "type": "null" }),
        },
        FieldType::List(value) | FieldType::Set(value) => {
            json!({ "type": "array", "items": value_schema(value, file, config)? })
        }
        FieldType::Map { value, .. } => {
            json!({ "type": "object", "additionalProperties": value_schema(value, file, config)? })
        }
        FieldType::Identifier(identifier) => reference_schema(identifier, file, config),
        FieldType::Unsupported(tag) => return Err(GenError::UnknownFieldType(tag.clone())),
    };
    Ok(schema)
}

fn reference_schema(identifier: &str, file: &ParseResultItem, config: &SchemaConfig) -> Value {
    match split_identifier(identifier) {
        (None, name) => json!({ "$ref": format!("#/definitions/{}", name) }),
        (Some(namespace), name) => {
            let include = file
                .includes
                .iter()
                .find(|include| namespace_by_path(include) == namespace);
            match include {
                Some(include) => json!({
                    "$ref": format!("{}#/definitions/{}", schema_root(include, &config.idl_root), name)
                }),
                None => {
                    tracing::debug!(
                        file = %file.idl_path,
                        identifier = %identifier,
                        "no include matches the namespace, leaving the schema open"
                    );
                    json!({})
                }
            }
        }
    }
}

fn const_schema(value: &ConstValue) -> Value {
    if let Some(text) = value.as_str() {
        return json!({ "const": text });
    }
    if let Some(number) = value.as_int() {
        return json!({ "const": number });
    }
    json!({})
}

/// Emits `.schema.json` files on `on(PROCESS_IDL_AST)`.
pub struct SchemaPlugin {
    config: SchemaConfig,
}

impl SchemaPlugin {
    pub fn new(config: SchemaConfig) -> Self {
        Self { config }
    }
}

impl Plugin for SchemaPlugin {
    fn name(&self) -> &'static str {
        "schema"
    }

    fn apply(self: Box<Self>, program: &mut Program) {
        let config = self.config;
        program.register(on::<ProcessIdlAst>(), move |mut ctx| {
            let target = output_path(&ctx.ast.idl_path, &config.idl_root, &config.output_dir, ".schema.json");
            let schema = generate_schema(&ctx.ast, &config)?;
            ctx.output.insert(target, serde_json::to_string_pretty(&schema)?);
            Ok(ctx)
        });
    }
}

//! Mock data files
//!
//! Builds one sample object per struct of a file. Scalar values come from the
//! `GEN_MOCK_FIELD` hook; composite shapes are assembled here so the hook
//! callbacks never need to re-enter the program.

use crate::context::{FieldContext, GenMockField, GenMockFieldContext};
use crate::error::GenError;
use crate::program::Program;
use idlgen_idl::namespace::{NamespaceTable, StatementId};
use idlgen_idl::types::{BaseCategory, ConstValue, FieldType, ParseResultItem, Statement};
use serde_json::{Map, Value};

/// Nesting limit for struct values, on top of the cycle guard.
const MAX_DEPTH: usize = 8;

pub struct MockDataBuilder<'a> {
    program: &'a mut Program,
    files: &'a [ParseResultItem],
    table: NamespaceTable,
    stack: Vec<StatementId>,
}

impl<'a> MockDataBuilder<'a> {
    pub fn new(program: &'a mut Program, files: &'a [ParseResultItem]) -> Self {
        Self {
            program,
            files,
            table: NamespaceTable::build(files),
            stack: Vec::new(),
        }
    }

    /// Sample objects for every struct of the file at `file_idx`, keyed by
    /// struct name.
    pub fn build_file(&mut self, file_idx: usize) -> Result<Value, GenError> {
        let mut objects = Map::new();
        let Some(file) = self.files.get(file_idx) else {
            return Ok(Value::Object(objects));
        };
        for (statement_idx, statement) in file.statements.iter().enumerate() {
            if let Statement::StructDefinition(def) = statement {
                let id = StatementId {
                    file: file_idx,
                    statement: statement_idx,
                };
                objects.insert(def.name.clone(), self.struct_value(id)?);
            }
        }
        Ok(Value::Object(objects))
    }

    fn struct_value(&mut self, id: StatementId) -> Result<Value, GenError> {
        let files = self.files;
        let Statement::StructDefinition(def) = &files[id.file].statements[id.statement] else {
            return Ok(Value::Null);
        };
        if self.stack.contains(&id) || self.stack.len() >= MAX_DEPTH {
            return Ok(Value::Null);
        }

        self.stack.push(id);
        let mut object = Map::new();
        for field in &def.fields {
            let value = self.field_value(
                id.file,
                &field.field_type,
                field.default_value.as_ref(),
                Some(&field.name),
            );
            match value {
                Ok(value) => {
                    object.insert(field.name.clone(), value);
                }
                Err(err) => {
                    self.stack.pop();
                    return Err(err);
                }
            }
        }
        self.stack.pop();
        Ok(Value::Object(object))
    }

    fn field_value(
        &mut self,
        current: usize,
        field_type: &FieldType,
        default_value: Option<&ConstValue>,
        name: Option<&str>,
    ) -> Result<Value, GenError> {
        let ctx = self.program.trigger::<GenMockField>(GenMockFieldContext {
            field_type: field_type.clone(),
            default_value: default_value.cloned(),
            context: name.map(|name| FieldContext {
                name: name.to_string(),
            }),
            output: None,
        })?;
        if let Some(output) = ctx.output {
            return Ok(output);
        }

        match field_type {
            FieldType::Base(base) => Ok(match base.category() {
                BaseCategory::Boolean => match default_value {
                    Some(ConstValue::BooleanLiteral { value }) => Value::Bool(*value),
                    _ => Value::Bool(false),
                },
                BaseCategory::Number => Value::from(0),
                BaseCategory::String | BaseCategory::Binary => Value::from(""),
                BaseCategory::Void => Value::Null,
            }),
            FieldType::List(value) | FieldType::Set(value) => {
                let item = self.field_value(current, value, None, name)?;
                Ok(Value::Array(vec![item]))
            }
            FieldType::Map { key, value } => {
                let key = match self.field_value(current, key, None, None)? {
                    Value::String(key) => key,
                    other => other.to_string(),
                };
                let value = self.field_value(current, value, None, name)?;
                let mut object = Map::new();
                object.insert(key, value);
                Ok(Value::Object(object))
            }
            FieldType::Identifier(identifier) => self.reference_value(current, identifier, name),
            FieldType::Unsupported(tag) => Err(GenError::UnknownFieldType(tag.clone())),
        }
    }

    fn reference_value(
        &mut self,
        current: usize,
        identifier: &str,
        name: Option<&str>,
    ) -> Result<Value, GenError> {
        let files = self.files;
        let (resolved, statement) = match self.table.lookup(files, current, identifier) {
            Ok(found) => found,
            Err(err) => {
                tracing::debug!(identifier = %identifier, "no mock for unresolved reference: {}", err);
                return Ok(Value::Null);
            }
        };

        match statement {
            Statement::StructDefinition(_) => self.struct_value(resolved.id),
            Statement::EnumDefinition(def) => Ok(def
                .values()
                .first()
                .map(|v| Value::from(*v))
                .unwrap_or(Value::Null)),
            Statement::TypedefDefinition(def) => {
                self.field_value(resolved.id.file, &def.definition_type, None, name)
            }
            Statement::ConstDefinition(def) => Ok(const_value(&def.initializer)),
            Statement::ServiceDefinition(_) | Statement::Other(_) => Ok(Value::Null),
        }
    }
}

fn const_value(value: &ConstValue) -> Value {
    match value {
        ConstValue::StringLiteral { value } => Value::from(value.as_str()),
        ConstValue::IntConstant { .. } => value.as_int().map(Value::from).unwrap_or(Value::Null),
        ConstValue::DoubleConstant { value } => value
            .parse::<f64>()
            .ok()
            .map(Value::from)
            .unwrap_or(Value::Null),
        ConstValue::BooleanLiteral { value } => Value::Bool(*value),
        ConstValue::ConstList { elements } => Value::Array(elements.iter().map(const_value).collect()),
        ConstValue::ConstMap { properties } => Value::Object(
            properties
                .iter()
                .map(|p| {
                    let key = match const_value(&p.name) {
                        Value::String(key) => key,
                        other => other.to_string(),
                    };
                    (key, const_value(&p.initializer))
                })
                .collect(),
        ),
        ConstValue::Identifier { .. } => Value::Null,
    }
}

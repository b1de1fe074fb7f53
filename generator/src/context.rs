//! Hooks fired by the driver and the contexts they carry

use crate::program::{Hook, Hooks, Registry};
use idlgen_idl::types::{ConstValue, FieldType, ParseResultItem};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Generated files keyed by target path.
pub type OutputMap = BTreeMap<PathBuf, String>;

/// Fired once with the whole AST set, before any file is processed.
pub struct ParseEntry;

/// Fired once per remaining file.
pub struct ProcessIdlAst;

/// Fired once per mock value request.
pub struct GenMockField;

/// Fired once with every generated file.
pub struct GenFileAst;

/// Fired once per generated file, right before it is written.
pub struct WriteFile;

#[derive(Debug, Clone)]
pub struct ParseEntryContext {
    pub ast: Vec<ParseResultItem>,
    /// Paths of the files requested directly by the configuration.
    pub entries: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ProcessIdlAstContext {
    pub ast: ParseResultItem,
    pub output: OutputMap,
}

/// The field a mock value is requested for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldContext {
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct GenMockFieldContext {
    pub field_type: FieldType,
    pub default_value: Option<ConstValue>,
    pub context: Option<FieldContext>,
    /// Synthesized value; `None` until a callback provides one.
    pub output: Option<serde_json::Value>,
}

impl GenMockFieldContext {
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            default_value: None,
            context: None,
            output: None,
        }
    }

    pub fn field_name(&self) -> Option<&str> {
        self.context.as_ref().map(|c| c.name.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct GenFileAstContext {
    pub files: OutputMap,
}

#[derive(Debug, Clone)]
pub struct WriteFileContext {
    pub filename: PathBuf,
    pub content: String,
}

impl Hook for ParseEntry {
    type Context = ParseEntryContext;
    const NAME: &'static str = "PARSE_ENTRY";

    fn registry(hooks: &mut Hooks) -> &mut Registry<Self::Context> {
        &mut hooks.parse_entry
    }
}

impl Hook for ProcessIdlAst {
    type Context = ProcessIdlAstContext;
    const NAME: &'static str = "PROCESS_IDL_AST";

    fn registry(hooks: &mut Hooks) -> &mut Registry<Self::Context> {
        &mut hooks.process_idl_ast
    }
}

impl Hook for GenMockField {
    type Context = GenMockFieldContext;
    const NAME: &'static str = "GEN_MOCK_FIELD";

    fn registry(hooks: &mut Hooks) -> &mut Registry<Self::Context> {
        &mut hooks.gen_mock_field
    }
}

impl Hook for GenFileAst {
    type Context = GenFileAstContext;
    const NAME: &'static str = "GEN_FILE_AST";

    fn registry(hooks: &mut Hooks) -> &mut Registry<Self::Context> {
        &mut hooks.gen_file_ast
    }
}

impl Hook for WriteFile {
    type Context = WriteFileContext;
    const NAME: &'static str = "WRITE_FILE";

    fn registry(hooks: &mut Hooks) -> &mut Registry<Self::Context> {
        &mut hooks.write_file
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hook_names() {
        assert_eq!(ParseEntry::NAME, "PARSE_ENTRY");
        assert_eq!(ProcessIdlAst::NAME, "PROCESS_IDL_AST");
        assert_eq!(GenMockField::NAME, "GEN_MOCK_FIELD");
        assert_eq!(GenFileAst::NAME, "GEN_FILE_AST");
        assert_eq!(WriteFile::NAME, "WRITE_FILE");
    }
}

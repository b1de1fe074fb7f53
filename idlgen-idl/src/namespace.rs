//! Namespace helpers and the cross-file reference table
//!
//! An identifier such as `base.Role` names the declaration `Role` inside the
//! file included under the namespace `base`. The namespace of an included
//! file is its file name without the `.thrift` / `.proto` extension.

use crate::error::IdlError;
use crate::search::suggest_definitions;
use crate::types::{ParseResultItem, Statement};
use std::collections::HashMap;

/// Names that cannot be used as a bare namespace identifier in generated code.
const RESERVED_WORDS: &[&str] = &[
    "abstract", "arguments", "await", "boolean", "break", "byte", "case", "catch", "char",
    "class", "const", "continue", "debugger", "default", "delete", "do", "double", "else",
    "enum", "eval", "export", "extends", "false", "final", "finally", "float", "for",
    "function", "goto", "if", "implements", "import", "in", "instanceof", "int", "interface",
    "let", "long", "native", "new", "null", "package", "private", "protected", "public",
    "return", "short", "static", "super", "switch", "synchronized", "this", "throw", "throws",
    "transient", "true", "try", "typeof", "var", "void", "volatile", "while", "with", "yield",
];

/// Split an identifier into its optional namespace and the bare name.
///
/// `a.b.Foo` becomes `(Some("a.b"), "Foo")`, `Foo` becomes `(None, "Foo")`.
pub fn split_identifier(value: &str) -> (Option<&str>, &str) {
    match value.rsplit_once('.') {
        Some((namespace, ref_name)) if !namespace.is_empty() => (Some(namespace), ref_name),
        Some((_, ref_name)) => (None, ref_name),
        None => (None, value),
    }
}

/// Namespace under which a file is referenced by the files including it.
pub fn namespace_by_path(idl_path: &str) -> &str {
    let file_name = idl_path.rsplit(['/', '\\']).next().unwrap_or(idl_path);
    file_name
        .strip_suffix(".thrift")
        .or_else(|| file_name.strip_suffix(".proto"))
        .unwrap_or(file_name)
}

/// Turn a namespace into a valid identifier for generated code.
pub fn uniform_namespace(namespace: &str) -> String {
    if RESERVED_WORDS.contains(&namespace) {
        return format!("_{}", namespace);
    }
    namespace.replace('.', "_")
}

/// Stable identity of a declaration: file position plus statement position
/// inside the original AST set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatementId {
    pub file: usize,
    pub statement: usize,
}

/// A successfully resolved identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub id: StatementId,
    /// Whether the identifier carried a namespace qualifier.
    pub qualified: bool,
}

/// Lookup table from `(file, namespace)` to the included file, built once per
/// AST set.
#[derive(Debug, Default, Clone)]
pub struct NamespaceTable {
    by_path: HashMap<String, usize>,
    includes: Vec<HashMap<String, usize>>,
}

impl NamespaceTable {
    pub fn build(files: &[ParseResultItem]) -> Self {
        let by_path: HashMap<String, usize> = files
            .iter()
            .enumerate()
            .map(|(idx, file)| (file.idl_path.clone(), idx))
            .collect();

        let includes = files
            .iter()
            .map(|file| {
                let mut table = HashMap::new();
                for include in &file.includes {
                    match by_path.get(include) {
                        Some(&target) => {
                            table
                                .entry(namespace_by_path(include).to_string())
                                .or_insert(target);
                        }
                        None => tracing::debug!(
                            file = %file.idl_path,
                            include = %include,
                            "included file is not part of the AST set"
                        ),
                    }
                }
                table
            })
            .collect();

        Self { by_path, includes }
    }

    pub fn file_index(&self, idl_path: &str) -> Option<usize> {
        self.by_path.get(idl_path).copied()
    }

    /// File included by `current` under `namespace`.
    pub fn resolve_namespace(&self, current: usize, namespace: &str) -> Option<usize> {
        self.includes.get(current)?.get(namespace).copied()
    }

    /// Resolve `identifier` as seen from the file at `current`.
    pub fn resolve(
        &self,
        files: &[ParseResultItem],
        current: usize,
        identifier: &str,
    ) -> Result<Resolved, IdlError> {
        let (namespace, ref_name) = split_identifier(identifier);
        let file = match namespace {
            Some(namespace) => self.resolve_namespace(current, namespace).ok_or_else(|| {
                let mut available: Vec<String> = self
                    .includes
                    .get(current)
                    .map(|table| table.keys().cloned().collect())
                    .unwrap_or_default();
                available.sort();
                IdlError::UnknownNamespace {
                    namespace: namespace.to_string(),
                    file: files
                        .get(current)
                        .map(|f| f.idl_path.clone())
                        .unwrap_or_default(),
                    available,
                }
            })?,
            None => current,
        };

        let target = files.get(file).ok_or_else(|| IdlError::InvalidPath {
            path: format!("file #{}", file),
        })?;
        match target.find_definition(ref_name) {
            Some(statement) => Ok(Resolved {
                id: StatementId { file, statement },
                qualified: namespace.is_some(),
            }),
            None => Err(IdlError::NotFound {
                input: identifier.to_string(),
                scope: target.idl_path.clone(),
                suggestions: suggest_definitions(target, ref_name),
            }),
        }
    }

    /// Resolve and borrow the referenced statement.
    pub fn lookup<'a>(
        &self,
        files: &'a [ParseResultItem],
        current: usize,
        identifier: &str,
    ) -> Result<(Resolved, &'a Statement), IdlError> {
        let resolved = self.resolve(files, current, identifier)?;
        let statement = &files[resolved.id.file].statements[resolved.id.statement];
        Ok((resolved, statement))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_ast_content;

    fn fixture() -> Vec<ParseResultItem> {
        parse_ast_content(
            r#"[
                {
                    "idlPath": "/idl/user.thrift",
                    "isEntry": true,
                    "unifyNamespace": "user",
                    "includes": ["/idl/common/base.thrift", "/idl/missing.thrift"],
                    "statements": [
                        { "type": "StructDefinition", "name": "User" }
                    ]
                },
                {
                    "idlPath": "/idl/common/base.thrift",
                    "unifyNamespace": "base",
                    "statements": [
                        { "type": "EnumDefinition", "name": "Role", "members": [] }
                    ]
                }
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_split_identifier() {
        assert_eq!(split_identifier("Foo"), (None, "Foo"));
        assert_eq!(split_identifier("base.Foo"), (Some("base"), "Foo"));
        assert_eq!(split_identifier("a.b.Foo"), (Some("a.b"), "Foo"));
    }

    #[test]
    fn test_namespace_by_path() {
        assert_eq!(namespace_by_path("/idl/common/base.thrift"), "base");
        assert_eq!(namespace_by_path("api.proto"), "api");
        assert_eq!(namespace_by_path("/idl/plain"), "plain");
    }

    #[test]
    fn test_uniform_namespace() {
        assert_eq!(uniform_namespace("flow.marketplace"), "flow_marketplace");
        assert_eq!(uniform_namespace("delete"), "_delete");
        assert_eq!(uniform_namespace("user"), "user");
    }

    #[test]
    fn test_resolve_local_and_qualified() {
        let files = fixture();
        let table = NamespaceTable::build(&files);

        let local = table.resolve(&files, 0, "User").unwrap();
        assert_eq!(local.id, StatementId { file: 0, statement: 0 });
        assert!(!local.qualified);

        let (remote, statement) = table.lookup(&files, 0, "base.Role").unwrap();
        assert_eq!(remote.id, StatementId { file: 1, statement: 0 });
        assert!(remote.qualified);
        assert_eq!(statement.name(), "Role");
    }

    #[test]
    fn test_resolve_failures() {
        let files = fixture();
        let table = NamespaceTable::build(&files);

        match table.resolve(&files, 0, "Usr") {
            Err(IdlError::NotFound { suggestions, .. }) => {
                assert_eq!(suggestions[0].candidate, "User");
            }
            other => panic!("expected NotFound, got {:?}", other),
        }

        match table.resolve(&files, 0, "missing.Thing") {
            Err(IdlError::UnknownNamespace { available, .. }) => {
                assert_eq!(available, vec!["base".to_string()]);
            }
            other => panic!("expected UnknownNamespace, got {:?}", other),
        }
    }
}

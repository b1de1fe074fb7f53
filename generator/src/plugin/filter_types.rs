//! Prunes the AST set down to the types used by whitelisted service methods
//!
//! Starting from the request and response types of the configured methods,
//! every reachable declaration is collected by a depth-first walk over
//! `(file, statement)` nodes. Enum references are not kept as declarations:
//! the referencing field is re-typed to `i32`, annotated with `@see <Enum>`,
//! and the enum is published through the enum artifact instead. Typedefs are
//! followed to their target the same way.

use super::Plugin;
use crate::context::{GenFileAst, OutputMap, ParseEntry, ProcessIdlAst};
use crate::enums::{EnumRegistry, ENUM_FILE_NAME};
use crate::error::GenError;
use crate::program::{after, Program};
use idlgen_idl::namespace::{NamespaceTable, Resolved, StatementId};
use idlgen_idl::types::{BaseType, Comment, FieldType, ParseResultItem, Statement};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;

pub struct FilterTypesPlugin {
    methods: HashMap<String, Vec<String>>,
    output_dir: PathBuf,
}

impl FilterTypesPlugin {
    pub fn new(methods: HashMap<String, Vec<String>>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            methods,
            output_dir: output_dir.into(),
        }
    }
}

impl Plugin for FilterTypesPlugin {
    fn name(&self) -> &'static str {
        "filter-types"
    }

    fn apply(self: Box<Self>, program: &mut Program) {
        let FilterTypesPlugin {
            methods,
            output_dir,
        } = *self;
        let enums = Rc::new(RefCell::new(EnumRegistry::new()));

        let collected = Rc::clone(&enums);
        program.register(after::<ParseEntry>(), move |mut ctx| {
            let registry = filter_types(&mut ctx.ast, &methods)?;
            *collected.borrow_mut() = registry;
            Ok(ctx)
        });

        let enum_path = output_dir.join(ENUM_FILE_NAME);
        let per_file = Rc::clone(&enums);
        let per_file_path = enum_path.clone();
        program.register(after::<ProcessIdlAst>(), move |mut ctx| {
            write_enum_artifact(&per_file.borrow(), &per_file_path, &mut ctx.output);
            Ok(ctx)
        });

        // No PROCESS_IDL_AST fires when every file was pruned.
        program.register(after::<GenFileAst>(), move |mut ctx| {
            write_enum_artifact(&enums.borrow(), &enum_path, &mut ctx.files);
            Ok(ctx)
        });
    }
}

fn write_enum_artifact(enums: &EnumRegistry, path: &Path, output: &mut OutputMap) {
    if enums.is_empty() {
        return;
    }
    output.insert(path.to_path_buf(), enums.render());
}

/// Reduce `files` to the closure of the whitelisted methods.
///
/// Each remaining file keeps exactly its reachable statements, in discovery
/// order; files with nothing reachable are removed. Returns the enums that
/// were referenced along the way.
pub fn filter_types(
    files: &mut Vec<ParseResultItem>,
    methods: &HashMap<String, Vec<String>>,
) -> Result<EnumRegistry, GenError> {
    let table = NamespaceTable::build(files);
    let mut closure = Closure::new(&table);

    for (file_idx, identifier) in seeds(files, methods) {
        closure.lookup_types(files, file_idx, &identifier)?;
    }

    let Closure { kept, enums, .. } = closure;
    retain_closure(files, kept);

    tracing::info!(
        files = files.len(),
        statements = files.iter().map(|f| f.statements.len()).sum::<usize>(),
        "filtered AST to method closure"
    );
    Ok(enums)
}

/// Identifier-typed return and first-request types of every whitelisted
/// function of every entry file.
fn seeds(files: &[ParseResultItem], methods: &HashMap<String, Vec<String>>) -> Vec<(usize, String)> {
    let mut seeds = Vec::new();
    for (file_idx, file) in files.iter().enumerate().filter(|(_, f)| f.is_entry) {
        for service in file.services() {
            let Some(allowed) = methods.get(&service.name) else {
                continue;
            };
            for function in &service.functions {
                if !allowed.iter().any(|m| m == &function.name) {
                    continue;
                }
                if let Some(identifier) = function.return_type.as_identifier() {
                    seeds.push((file_idx, identifier.to_string()));
                }
                if let Some(identifier) = function.request_type().and_then(FieldType::as_identifier) {
                    seeds.push((file_idx, identifier.to_string()));
                }
            }
        }
    }
    seeds
}

fn retain_closure(files: &mut Vec<ParseResultItem>, mut kept: BTreeMap<usize, Vec<usize>>) {
    let mut file_idx = 0;
    files.retain_mut(|file| {
        let indices = kept.remove(&file_idx).unwrap_or_default();
        file_idx += 1;
        if indices.is_empty() {
            tracing::debug!(file = %file.idl_path, "dropping file without reachable types");
            return false;
        }

        let mut slots: Vec<Option<Statement>> =
            std::mem::take(&mut file.statements).into_iter().map(Some).collect();
        file.statements = indices
            .into_iter()
            .filter_map(|idx| slots.get_mut(idx).and_then(Option::take))
            .collect();
        true
    });
}

/// What an identifier field type turned out to reference.
enum Target {
    Enum { namespace: String, name: String },
    Declaration(Resolved),
    Unresolved,
}

struct Closure<'t> {
    table: &'t NamespaceTable,
    visited: HashSet<StatementId>,
    /// Statement positions kept per file, in insertion order.
    kept: BTreeMap<usize, Vec<usize>>,
    enums: EnumRegistry,
}

impl<'t> Closure<'t> {
    fn new(table: &'t NamespaceTable) -> Self {
        Self {
            table,
            visited: HashSet::new(),
            kept: BTreeMap::new(),
            enums: EnumRegistry::new(),
        }
    }

    fn lookup_types(
        &mut self,
        files: &mut [ParseResultItem],
        current: usize,
        identifier: &str,
    ) -> Result<(), GenError> {
        match self.classify(files, current, identifier) {
            Target::Enum { .. } | Target::Unresolved => Ok(()),
            Target::Declaration(resolved) => self.visit(files, resolved.id),
        }
    }

    /// Resolve `identifier`, registering it in the enum registry when it
    /// names an enum.
    fn classify(&mut self, files: &[ParseResultItem], current: usize, identifier: &str) -> Target {
        match self.table.lookup(files, current, identifier) {
            Ok((resolved, Statement::EnumDefinition(definition))) => {
                let namespace = if resolved.qualified {
                    &files[resolved.id.file].unify_namespace
                } else {
                    &files[current].unify_namespace
                };
                if self.enums.insert(namespace, definition) {
                    tracing::debug!(namespace = %namespace, name = %definition.name, "collected enum");
                }
                Target::Enum {
                    namespace: namespace.clone(),
                    name: definition.name.clone(),
                }
            }
            Ok((resolved, _)) => Target::Declaration(resolved),
            Err(err) => {
                tracing::warn!(
                    file = %files[current].idl_path,
                    identifier = %identifier,
                    "skipping unresolved reference: {}",
                    err
                );
                Target::Unresolved
            }
        }
    }

    fn visit(&mut self, files: &mut [ParseResultItem], id: StatementId) -> Result<(), GenError> {
        if !self.visited.insert(id) {
            return Ok(());
        }
        self.kept.entry(id.file).or_default().push(id.statement);

        let field_count = match &files[id.file].statements[id.statement] {
            Statement::StructDefinition(def) => def.fields.len(),
            Statement::TypedefDefinition(_) => return self.process_typedef(files, id),
            _ => return Ok(()),
        };
        for field_idx in 0..field_count {
            self.process_field(files, id, field_idx)?;
        }
        Ok(())
    }

    fn process_field(
        &mut self,
        files: &mut [ParseResultItem],
        owner: StatementId,
        field_idx: usize,
    ) -> Result<(), GenError> {
        let Statement::StructDefinition(def) = &files[owner.file].statements[owner.statement] else {
            return Ok(());
        };
        let mut field_type = def.fields[field_idx].field_type.clone();
        let mut see_also = Vec::new();

        self.process_field_type(files, owner.file, &mut field_type, &mut see_also)?;

        if let Statement::StructDefinition(def) = &mut files[owner.file].statements[owner.statement] {
            let field = &mut def.fields[field_idx];
            field.field_type = field_type;
            for name in see_also {
                field.comments.push(Comment::line(format!("@see {}", name)));
            }
        }
        Ok(())
    }

    fn process_typedef(&mut self, files: &mut [ParseResultItem], id: StatementId) -> Result<(), GenError> {
        let Statement::TypedefDefinition(def) = &files[id.file].statements[id.statement] else {
            return Ok(());
        };
        let mut definition_type = def.definition_type.clone();
        let mut see_also = Vec::new();

        self.process_field_type(files, id.file, &mut definition_type, &mut see_also)?;

        if let Statement::TypedefDefinition(def) = &mut files[id.file].statements[id.statement] {
            def.definition_type = definition_type;
            for name in see_also {
                def.comments.push(Comment::line(format!("@see {}", name)));
            }
        }
        Ok(())
    }

    fn process_field_type(
        &mut self,
        files: &mut [ParseResultItem],
        current: usize,
        field_type: &mut FieldType,
        see_also: &mut Vec<String>,
    ) -> Result<(), GenError> {
        match field_type {
            FieldType::Base(_) => Ok(()),
            FieldType::List(value) | FieldType::Set(value) => {
                self.process_field_type(files, current, value, see_also)
            }
            FieldType::Map { value, .. } => self.process_field_type(files, current, value, see_also),
            FieldType::Identifier(identifier) => {
                match self.classify(files, current, identifier) {
                    Target::Enum { namespace, name } => {
                        tracing::debug!(enum_name = %name, namespace = %namespace, "re-typing enum reference as i32");
                        *field_type = FieldType::Base(BaseType::I32);
                        see_also.push(name);
                        Ok(())
                    }
                    Target::Declaration(resolved) => self.visit(files, resolved.id),
                    Target::Unresolved => Ok(()),
                }
            }
            FieldType::Unsupported(tag) => Err(GenError::UnknownFieldType(tag.clone())),
        }
    }
}

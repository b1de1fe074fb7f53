//! Generation driver
//!
//! Installs a fresh set of plugins per API configuration and fires the hooks
//! in order: `PARSE_ENTRY`, `PROCESS_IDL_AST` per file, `GEN_MOCK_FIELD` per
//! mocked field, `GEN_FILE_AST`, then `WRITE_FILE` per generated file.

use crate::context::{
    GenFileAst, GenFileAstContext, OutputMap, ParseEntry, ParseEntryContext, ProcessIdlAst,
    ProcessIdlAstContext, WriteFile, WriteFileContext,
};
use crate::emit::{
    MockDataBuilder, SchemaConfig, SchemaPlugin, TypeScriptConfig, TypeScriptPlugin, DEFAULT_REQUEST_MODULE,
};
use crate::error::GenError;
use crate::plugin::{AliasPlugin, FilterTypesPlugin, MockOptions, MockPlugin, Plugin};
use crate::program::Program;
use idlgen_idl::parse::parse_ast_files;
use idlgen_idl::types::ParseResultItem;
use idlgen_idl::utils::output_path;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct GenOptions {
    /// Label used in logs and errors.
    pub name: String,
    pub idl_root: PathBuf,
    pub output_dir: PathBuf,
    /// Service name -> whitelisted function names. Empty disables filtering.
    pub methods: HashMap<String, Vec<String>>,
    /// Absolute IDL path -> new service name.
    pub alias: HashMap<String, String>,
    pub mock: bool,
    pub mock_seed: Option<u64>,
    pub i64_as_string: bool,
    /// Also emit a `.schema.json` per file.
    pub schema: bool,
    /// Extension-less module exporting `createAPI`. Defaults to
    /// `<output_dir>/api/config`.
    pub request_module: Option<PathBuf>,
    /// Run every hook but write nothing.
    pub dry_run: bool,
}

/// One API configuration: where its AST dumps live and how to generate it.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub ast_files: Vec<PathBuf>,
    pub options: GenOptions,
}

#[derive(Debug, Clone)]
pub struct GenReport {
    pub name: String,
    /// Generated files, in write order.
    pub files: Vec<PathBuf>,
    pub written: bool,
}

/// Generate every configuration in turn. The first failure stops the run.
pub fn gen_client(configs: &[ClientConfig]) -> Result<Vec<GenReport>, GenError> {
    let mut reports = Vec::with_capacity(configs.len());
    for config in configs {
        if config.ast_files.is_empty() {
            return Err(GenError::MissingAst(config.options.name.clone()));
        }
        let ast = parse_ast_files(&config.ast_files)?;
        reports.push(gen_single(ast, &config.options)?);
    }
    Ok(reports)
}

fn plugins(options: &GenOptions) -> Vec<Box<dyn Plugin>> {
    let mut plugins: Vec<Box<dyn Plugin>> = vec![
        Box::new(MockPlugin::new(MockOptions {
            seed: options.mock_seed,
        })),
        Box::new(AliasPlugin::new(options.alias.clone())),
    ];
    if !options.methods.is_empty() {
        plugins.push(Box::new(FilterTypesPlugin::new(
            options.methods.clone(),
            options.output_dir.clone(),
        )));
    }
    plugins.push(Box::new(TypeScriptPlugin::new(TypeScriptConfig {
        idl_root: options.idl_root.clone(),
        output_dir: options.output_dir.clone(),
        i64_as_string: options.i64_as_string,
        request_module: options
            .request_module
            .clone()
            .unwrap_or_else(|| options.output_dir.join(DEFAULT_REQUEST_MODULE)),
    })));
    if options.schema {
        plugins.push(Box::new(SchemaPlugin::new(SchemaConfig {
            idl_root: options.idl_root.clone(),
            output_dir: options.output_dir.clone(),
        })));
    }
    plugins
}

pub fn gen_single(ast: Vec<ParseResultItem>, options: &GenOptions) -> Result<GenReport, GenError> {
    let mut program = Program::new();
    for plugin in plugins(options) {
        program.install(plugin);
    }

    let entries = ast
        .iter()
        .filter(|f| f.is_entry)
        .map(|f| f.idl_path.clone())
        .collect();
    let ParseEntryContext { ast, .. } =
        program.trigger::<ParseEntry>(ParseEntryContext { ast, entries })?;

    let mut output = OutputMap::new();
    for file in &ast {
        let ctx = program.trigger::<ProcessIdlAst>(ProcessIdlAstContext {
            ast: file.clone(),
            output,
        })?;
        output = ctx.output;
    }

    if options.mock {
        let mut builder = MockDataBuilder::new(&mut program, &ast);
        for (file_idx, file) in ast.iter().enumerate() {
            let data = builder.build_file(file_idx)?;
            let target = output_path(
                &file.idl_path,
                &options.idl_root,
                &options.output_dir,
                ".mock.json",
            );
            output.insert(target, serde_json::to_string_pretty(&data)?);
        }
    }

    let GenFileAstContext { files } =
        program.trigger::<GenFileAst>(GenFileAstContext { files: output })?;

    let mut written = Vec::with_capacity(files.len());
    for (filename, content) in files {
        let ctx = program.trigger::<WriteFile>(WriteFileContext { filename, content })?;
        if !options.dry_run {
            write_file(&ctx.filename, &ctx.content)?;
        }
        written.push(ctx.filename);
    }

    tracing::info!(
        api = %options.name,
        files = written.len(),
        dry_run = options.dry_run,
        "generation finished"
    );
    Ok(GenReport {
        name: options.name.clone(),
        files: written,
        written: !options.dry_run,
    })
}

fn write_file(path: &Path, content: &str) -> Result<(), GenError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| GenError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, content).map_err(|source| GenError::Io {
        path: path.to_path_buf(),
        source,
    })
}

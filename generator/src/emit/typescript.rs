//! TypeScript declaration emitter
//!
//! Renders one `.ts` file per remaining IDL file: interfaces for structs and
//! services, enums, type aliases for typedefs and constants. Entry files also
//! get one `createAPI` request function per HTTP-annotated service method.

use crate::context::{ParseEntry, ProcessIdlAst};
use crate::enums::GENERATED_HEADER;
use crate::error::GenError;
use crate::plugin::Plugin;
use crate::program::{after, on, Program};
use idlgen_idl::namespace::{namespace_by_path, split_identifier, uniform_namespace, NamespaceTable};
use idlgen_idl::types::*;
use idlgen_idl::utils::{output_path, relative_module_path, schema_root};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::rc::Rc;

/// Module exporting `createAPI`, relative to the output directory.
pub const DEFAULT_REQUEST_MODULE: &str = "api/config";

/// Configuration for TypeScript generation
#[derive(Debug, Clone, Default)]
pub struct TypeScriptConfig {
    pub idl_root: PathBuf,
    pub output_dir: PathBuf,
    /// Emit `i64` as `string` to avoid precision loss in JavaScript numbers.
    pub i64_as_string: bool,
    /// Extension-less path of the module exporting `createAPI`.
    pub request_module: PathBuf,
}

impl TypeScriptConfig {
    pub fn output_path(&self, idl_path: &str) -> PathBuf {
        output_path(idl_path, &self.idl_root, &self.output_dir, ".ts")
    }
}

/// The files generated in this run.
///
/// Includes outside of it get no import; request types are resolved through
/// it to find their fields.
#[derive(Debug, Default)]
pub struct AstIndex {
    files: Vec<ParseResultItem>,
    table: NamespaceTable,
}

impl AstIndex {
    pub fn new(files: Vec<ParseResultItem>) -> Self {
        let table = NamespaceTable::build(&files);
        Self { files, table }
    }

    pub fn contains(&self, idl_path: &str) -> bool {
        self.table.file_index(idl_path).is_some()
    }

    /// Struct named by `field_type` as seen from the file at `idl_path`.
    fn resolve_struct(&self, idl_path: &str, field_type: &FieldType) -> Option<&StructDefinition> {
        let identifier = field_type.as_identifier()?;
        let current = self.table.file_index(idl_path)?;
        match self.table.lookup(&self.files, current, identifier) {
            Ok((_, Statement::StructDefinition(def))) => Some(def),
            _ => None,
        }
    }
}

/// Trait for generating TypeScript type mappings
pub trait TypeScriptTypeMapper {
    fn to_typescript_type(&self, config: &TypeScriptConfig) -> String;
}

impl TypeScriptTypeMapper for BaseType {
    fn to_typescript_type(&self, config: &TypeScriptConfig) -> String {
        let ts = match self.category() {
            BaseCategory::Number if *self == BaseType::I64 && config.i64_as_string => "string",
            BaseCategory::Number => "number",
            BaseCategory::String => "string",
            BaseCategory::Boolean => "boolean",
            BaseCategory::Binary => "Blob",
            BaseCategory::Void => "void",
        };
        ts.to_string()
    }
}

impl TypeScriptTypeMapper for FieldType {
    fn to_typescript_type(&self, config: &TypeScriptConfig) -> String {
        match self {
            FieldType::Base(base) => base.to_typescript_type(config),
            FieldType::List(value) | FieldType::Set(value) => match value.as_ref() {
                FieldType::Base(_) | FieldType::Identifier(_) => {
                    format!("{}[]", value.to_typescript_type(config))
                }
                _ => format!("Array<{}>", value.to_typescript_type(config)),
            },
            FieldType::Map { key, value } => format!(
                "Record<{}, {}>",
                key.to_typescript_type(config),
                value.to_typescript_type(config)
            ),
            FieldType::Identifier(identifier) => typescript_reference(identifier),
            FieldType::Unsupported(_) => "unknown".to_string(),
        }
    }
}

fn typescript_reference(identifier: &str) -> String {
    match split_identifier(identifier) {
        (Some(namespace), name) => format!("{}.{}", uniform_namespace(namespace), name),
        (None, name) => name.to_string(),
    }
}

/// Render a whole file.
pub fn generate_file(
    file: &ParseResultItem,
    index: &AstIndex,
    config: &TypeScriptConfig,
) -> Result<String, GenError> {
    let mut sections = vec![GENERATED_HEADER.to_string()];

    let requests = generate_requests(file, index, config)?;

    let mut imports = generate_imports(file, index, config);
    if !requests.is_empty() {
        let module = relative_module_path(&config.output_path(&file.idl_path), &config.request_module);
        imports.push(format!("import {{ createAPI }} from '{}';", module));
    }
    if !imports.is_empty() {
        sections.push(imports.join("\n"));
    }

    for statement in &file.statements {
        let rendered = match statement {
            Statement::StructDefinition(def) => generate_interface(def, config),
            Statement::EnumDefinition(def) => generate_enum(def),
            Statement::TypedefDefinition(def) => generate_typedef(def, config),
            Statement::ConstDefinition(def) => generate_const(def, config),
            Statement::ServiceDefinition(def) => generate_service(def, config),
            Statement::Other(_) => continue,
        };
        sections.push(rendered);
    }
    sections.extend(requests);

    let mut output = sections.join("\n\n");
    output.push('\n');
    Ok(output)
}

fn generate_imports(file: &ParseResultItem, index: &AstIndex, config: &TypeScriptConfig) -> Vec<String> {
    let from = config.output_path(&file.idl_path);
    let mut seen = HashSet::new();
    file.includes
        .iter()
        .filter(|include| index.contains(include))
        .filter_map(|include| {
            let alias = uniform_namespace(namespace_by_path(include));
            if !seen.insert(alias.clone()) {
                return None;
            }
            let module = relative_module_path(&from, &config.output_path(include));
            Some(format!("import * as {} from '{}';", alias, module))
        })
        .collect()
}

fn generate_comments(comments: &[Comment], indent: &str) -> String {
    comments
        .iter()
        .map(|comment| match comment.kind {
            CommentKind::CommentLine => format!("{}// {}\n", indent, comment.value.trim()),
            CommentKind::CommentBlock => format!("{}/** {} */\n", indent, comment.value.trim()),
        })
        .collect()
}

fn generate_interface(def: &StructDefinition, config: &TypeScriptConfig) -> String {
    let mut output = generate_comments(&def.comments, "");
    output.push_str(&format!("export interface {} {{\n", def.name));
    for field in &def.fields {
        let optional = if field.is_optional() { "?" } else { "" };
        output.push_str(&format!(
            "  {}{}: {};",
            field.name,
            optional,
            field.field_type.to_typescript_type(config)
        ));
        if !field.comments.is_empty() {
            let trailing: Vec<&str> = field.comments.iter().map(|c| c.value.trim()).collect();
            output.push_str(&format!(" // {}", trailing.join(" ")));
        }
        output.push('\n');
    }
    output.push('}');
    output
}

fn generate_enum(def: &EnumDefinition) -> String {
    let mut output = generate_comments(&def.comments, "");
    output.push_str(&format!("export enum {} {{\n", def.name));
    for (member, value) in def.members.iter().zip(def.values()) {
        output.push_str(&generate_comments(&member.comments, "  "));
        output.push_str(&format!("  {} = {},\n", member.name, value));
    }
    output.push('}');
    output
}

fn generate_typedef(def: &TypedefDefinition, config: &TypeScriptConfig) -> String {
    format!(
        "{}export type {} = {};",
        generate_comments(&def.comments, ""),
        def.name,
        def.definition_type.to_typescript_type(config)
    )
}

fn generate_const(def: &ConstDefinition, config: &TypeScriptConfig) -> String {
    format!(
        "{}export const {}: {} = {};",
        generate_comments(&def.comments, ""),
        def.name,
        def.field_type.to_typescript_type(config),
        const_literal(&def.initializer)
    )
}

fn const_literal(value: &ConstValue) -> String {
    match value {
        ConstValue::StringLiteral { value } => serde_json::Value::from(value.as_str()).to_string(),
        ConstValue::IntConstant { value } => parse_int_literal(value)
            .map(|v| v.to_string())
            .unwrap_or_else(|| value.clone()),
        ConstValue::DoubleConstant { value } => value.clone(),
        ConstValue::BooleanLiteral { value } => value.to_string(),
        ConstValue::ConstList { elements } => format!(
            "[{}]",
            elements.iter().map(const_literal).collect::<Vec<_>>().join(", ")
        ),
        ConstValue::ConstMap { properties } => {
            if properties.is_empty() {
                return "{}".to_string();
            }
            let entries: Vec<String> = properties
                .iter()
                .map(|p| format!("[{}]: {}", const_literal(&p.name), const_literal(&p.initializer)))
                .collect();
            format!("{{ {} }}", entries.join(", "))
        }
        ConstValue::Identifier { value } => typescript_reference(value),
    }
}

fn generate_service(def: &ServiceDefinition, config: &TypeScriptConfig) -> String {
    let mut output = generate_comments(&def.comments, "");
    output.push_str(&format!("export interface {} {{\n", def.name));
    for function in &def.functions {
        output.push_str(&generate_comments(&function.comments, "  "));
        let params: Vec<String> = function
            .fields
            .iter()
            .map(|f| {
                let optional = if f.is_optional() { "?" } else { "" };
                format!("{}{}: {}", f.name, optional, f.field_type.to_typescript_type(config))
            })
            .collect();
        output.push_str(&format!(
            "  {}({}): Promise<{}>;\n",
            function.name,
            params.join(", "),
            function.return_type.to_typescript_type(config)
        ));
    }
    output.push('}');
    output
}

/// Request metadata handed to `createAPI`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestMeta<'a> {
    url: String,
    method: String,
    name: &'a str,
    req_type: String,
    /// Wire names of the request fields, grouped by position.
    req_mapping: BTreeMap<String, Vec<String>>,
    res_type: String,
    schema_root: String,
    service: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    serializer: Option<&'a str>,
}

/// One `export const <Method> = createAPI<Req, Res>({...})` per function of
/// an entry file carrying an HTTP method. Other files get none.
fn generate_requests(
    file: &ParseResultItem,
    index: &AstIndex,
    config: &TypeScriptConfig,
) -> Result<Vec<String>, GenError> {
    if !file.is_entry {
        return Ok(Vec::new());
    }

    let mut requests = Vec::new();
    for service in file.services() {
        let prefix = service.extension_config.uri_prefix.as_deref().unwrap_or_default();
        for function in &service.functions {
            let Some(method) = function.extension_config.method.as_deref() else {
                continue;
            };
            let method = method.to_uppercase();
            let req_type = function
                .request_type()
                .map(|t| t.to_typescript_type(config))
                .unwrap_or_else(|| "void".to_string());
            let res_type = function.return_type.to_typescript_type(config);
            let request_struct = function
                .request_type()
                .and_then(|t| index.resolve_struct(&file.idl_path, t));

            let meta = RequestMeta {
                url: format!("{}{}", prefix, function.extension_config.uri.as_deref().unwrap_or_default()),
                req_mapping: request_mapping(request_struct, &method),
                method,
                name: &function.name,
                req_type: req_type.clone(),
                res_type: res_type.clone(),
                schema_root: schema_root(&file.idl_path, &config.idl_root),
                service: &service.name,
                serializer: function.extension_config.serializer.as_deref(),
            };
            requests.push(format!(
                "{}export const {} = /*#__PURE__*/createAPI<{}, {}>({});",
                generate_comments(&function.comments, ""),
                function.name,
                req_type,
                res_type,
                serde_json::to_string_pretty(&meta)?
            ));
        }
    }
    Ok(requests)
}

/// Group request fields by `api.position`. Unannotated fields go to the
/// query string for GET and DELETE, to the body otherwise.
fn request_mapping(request: Option<&StructDefinition>, method: &str) -> BTreeMap<String, Vec<String>> {
    let default_position = match method {
        "GET" | "DELETE" => "query",
        _ => "body",
    };
    let mut mapping: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for field in request.map(|def| def.fields.as_slice()).unwrap_or_default() {
        let position = field
            .extension_config
            .position
            .as_deref()
            .filter(|p| !p.is_empty())
            .unwrap_or(default_position);
        mapping
            .entry(position.to_string())
            .or_default()
            .push(field.wire_name().to_string());
    }
    mapping
}

/// Emits declarations on `on(PROCESS_IDL_AST)`.
pub struct TypeScriptPlugin {
    config: TypeScriptConfig,
}

impl TypeScriptPlugin {
    pub fn new(config: TypeScriptConfig) -> Self {
        Self { config }
    }
}

impl Plugin for TypeScriptPlugin {
    fn name(&self) -> &'static str {
        "typescript"
    }

    fn apply(self: Box<Self>, program: &mut Program) {
        let index = Rc::new(RefCell::new(AstIndex::default()));

        // Runs after the filter, which is installed first.
        let remaining = Rc::clone(&index);
        program.register(after::<ParseEntry>(), move |ctx| {
            *remaining.borrow_mut() = AstIndex::new(ctx.ast.clone());
            Ok(ctx)
        });

        let config = self.config;
        program.register(on::<ProcessIdlAst>(), move |mut ctx| {
            let target = config.output_path(&ctx.ast.idl_path);
            let content = generate_file(&ctx.ast, &index.borrow(), &config)?;
            tracing::debug!(file = %ctx.ast.idl_path, target = %target.display(), "rendered declarations");
            ctx.output.insert(target, content);
            Ok(ctx)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idlgen_idl::parse::parse_ast_content;

    fn config() -> TypeScriptConfig {
        TypeScriptConfig {
            idl_root: PathBuf::from("/idl"),
            output_dir: PathBuf::from("/out"),
            i64_as_string: false,
            request_module: PathBuf::from("/out/api/config"),
        }
    }

    fn files() -> Vec<ParseResultItem> {
        parse_ast_content(
            r#"[
                {
                    "idlPath": "/idl/user/user.thrift",
                    "isEntry": true,
                    "includes": ["/idl/base/base.thrift", "/idl/gone.thrift"],
                    "statements": [
                        {
                            "type": "StructDefinition",
                            "name": "User",
                            "comments": [ { "type": "CommentLine", "value": " A user" } ],
                            "fields": [
                                { "name": "id", "fieldType": { "type": "I64Keyword" } },
                                {
                                    "name": "status",
                                    "fieldType": { "type": "I32Keyword" },
                                    "comments": [ { "type": "CommentLine", "value": "@see Status" } ]
                                },
                                {
                                    "name": "tags",
                                    "requiredness": "optional",
                                    "fieldType": { "type": "ListType", "valueType": { "type": "StringKeyword" } }
                                },
                                {
                                    "name": "extra",
                                    "fieldType": {
                                        "type": "MapType",
                                        "keyType": { "type": "StringKeyword" },
                                        "valueType": { "type": "Identifier", "value": "base.Info" }
                                    }
                                }
                            ]
                        },
                        {
                            "type": "EnumDefinition",
                            "name": "Status",
                            "members": [ { "name": "ON" }, { "name": "OFF", "initializer": { "type": "IntConstant", "value": "3" } } ]
                        },
                        { "type": "TypedefDefinition", "name": "Users", "definitionType": { "type": "ListType", "valueType": { "type": "Identifier", "value": "User" } } },
                        {
                            "type": "ConstDefinition",
                            "name": "DEFAULT_NAME",
                            "fieldType": { "type": "StringKeyword" },
                            "initializer": { "type": "StringLiteral", "value": "guest" }
                        },
                        {
                            "type": "ServiceDefinition",
                            "name": "UserService",
                            "functions": [
                                {
                                    "name": "GetUser",
                                    "returnType": { "type": "Identifier", "value": "User" },
                                    "fields": [ { "name": "req", "fieldType": { "type": "Identifier", "value": "base.Info" } } ]
                                }
                            ]
                        }
                    ]
                }
            ]"#,
        )
        .unwrap()
    }

    fn base_file() -> ParseResultItem {
        parse_ast_content(
            r#"[ { "idlPath": "/idl/base/base.thrift", "unifyNamespace": "base", "statements": [] } ]"#,
        )
        .unwrap()
        .remove(0)
    }

    #[test]
    fn test_generate_file() {
        let mut files = files();
        files.push(base_file());
        let index = AstIndex::new(files.clone());
        let output = generate_file(&files[0], &index, &config()).unwrap();

        assert!(output.starts_with(GENERATED_HEADER));
        assert!(output.contains("import * as base from '../base/base';"));
        assert!(!output.contains("gone"), "missing includes are not imported");
        assert!(output.contains("// A user\nexport interface User {\n"));
        assert!(output.contains("  id: number;\n"));
        assert!(output.contains("  status: number; // @see Status\n"));
        assert!(output.contains("  tags?: string[];\n"));
        assert!(output.contains("  extra: Record<string, base.Info>;\n"));
        assert!(output.contains("export enum Status {\n  ON = 0,\n  OFF = 3,\n}"));
        assert!(output.contains("export type Users = User[];"));
        assert!(output.contains("export const DEFAULT_NAME: string = \"guest\";"));
        assert!(output.contains("  GetUser(req: base.Info): Promise<User>;\n"));
        assert!(
            !output.contains("createAPI"),
            "functions without an HTTP method get no request function"
        );
    }

    const HTTP_SERVICE: &str = r#"[
        {
            "idlPath": "/idl/user/user.thrift",
            "isEntry": true,
            "unifyNamespace": "user",
            "statements": [
                {
                    "type": "StructDefinition",
                    "name": "GetUserRequest",
                    "fields": [
                        { "name": "user_id", "fieldType": { "type": "I64Keyword" } },
                        {
                            "name": "token",
                            "fieldType": { "type": "StringKeyword" },
                            "extensionConfig": { "position": "header", "key": "X-Token" }
                        }
                    ]
                },
                {
                    "type": "StructDefinition",
                    "name": "GetUserResponse",
                    "fields": [ { "name": "code", "fieldType": { "type": "I32Keyword" } } ]
                },
                { "type": "ExceptionDefinition", "name": "UserError" },
                {
                    "type": "ServiceDefinition",
                    "name": "UserService",
                    "extensionConfig": { "uri_prefix": "/gateway" },
                    "functions": [
                        {
                            "name": "GetUser",
                            "comments": [ { "type": "CommentLine", "value": "Fetch one user" } ],
                            "returnType": { "type": "Identifier", "value": "GetUserResponse" },
                            "fields": [ { "name": "req", "fieldType": { "type": "Identifier", "value": "GetUserRequest" } } ],
                            "extensionConfig": { "method": "get", "uri": "/api/user/get" }
                        },
                        {
                            "name": "UpdateUser",
                            "returnType": { "type": "Identifier", "value": "GetUserResponse" },
                            "fields": [ { "name": "req", "fieldType": { "type": "Identifier", "value": "GetUserRequest" } } ],
                            "extensionConfig": { "method": "POST", "uri": "/api/user/update", "serializer": "json" }
                        },
                        {
                            "name": "Internal",
                            "returnType": { "type": "VoidKeyword" },
                            "fields": []
                        }
                    ]
                }
            ]
        }
    ]"#;

    #[test]
    fn test_request_functions() {
        let files = parse_ast_content(HTTP_SERVICE).unwrap();
        let index = AstIndex::new(files.clone());
        let output = generate_file(&files[0], &index, &config()).unwrap();

        assert!(output.contains("import { createAPI } from '../api/config';"));
        assert!(output.contains(
            "// Fetch one user\nexport const GetUser = /*#__PURE__*/createAPI<GetUserRequest, GetUserResponse>({\n"
        ));
        assert!(output.contains("  \"url\": \"/gateway/api/user/get\",\n  \"method\": \"GET\",\n"));
        assert!(output.contains("\"schemaRoot\": \"api://schemas/user_user\""));
        assert!(output.contains("\"service\": \"UserService\""));
        assert!(output.contains("export const UpdateUser = /*#__PURE__*/createAPI<GetUserRequest, GetUserResponse>"));
        assert!(output.contains("\"serializer\": \"json\""));
        assert!(!output.contains("export const Internal"));
        assert!(!output.contains("UserError"), "opaque statements are not rendered");
    }

    #[test]
    fn test_request_mapping_positions() {
        let files = parse_ast_content(HTTP_SERVICE).unwrap();
        let Some(Statement::StructDefinition(request)) = files[0].definition("GetUserRequest") else {
            panic!("GetUserRequest should be a struct");
        };

        let get = request_mapping(Some(request), "GET");
        assert_eq!(get["query"], vec!["user_id".to_string()]);
        assert_eq!(get["header"], vec!["X-Token".to_string()]);

        let post = request_mapping(Some(request), "POST");
        assert_eq!(post["body"], vec!["user_id".to_string()]);
        assert!(!post.contains_key("query"));

        assert!(request_mapping(None, "GET").is_empty());
    }

    #[test]
    fn test_included_files_get_no_request_functions() {
        let mut files = parse_ast_content(HTTP_SERVICE).unwrap();
        files[0].is_entry = false;
        let index = AstIndex::new(files.clone());
        let output = generate_file(&files[0], &index, &config()).unwrap();
        assert!(!output.contains("createAPI"));
        assert!(output.contains("export interface UserService {"));
    }

    #[test]
    fn test_i64_as_string() {
        let config = TypeScriptConfig {
            i64_as_string: true,
            ..config()
        };
        assert_eq!(BaseType::I64.to_typescript_type(&config), "string");
        assert_eq!(BaseType::I32.to_typescript_type(&config), "number");
        assert_eq!(BaseType::Binary.to_typescript_type(&config), "Blob");
    }

    #[test]
    fn test_reserved_namespace_reference() {
        let field_type = FieldType::Identifier("delete.Item".to_string());
        assert_eq!(field_type.to_typescript_type(&config()), "_delete.Item");
    }
}

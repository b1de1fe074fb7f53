//! Core AST definitions for parsed IDL files
//!
//! These mirror the unified document produced by the external Thrift/Protobuf
//! parser. Every file of a generation run becomes one [`ParseResultItem`].

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Namespace given to files that declare none.
pub const DEFAULT_NAMESPACE: &str = "root";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResultItem {
    pub idl_path: String,
    #[serde(default)]
    pub is_entry: bool,
    #[serde(default = "default_namespace")]
    pub unify_namespace: String,
    /// Resolved paths of the files this one includes.
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default)]
    pub statements: Vec<Statement>,
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

impl ParseResultItem {
    /// Position of the first typed statement declaring `name`.
    pub fn find_definition(&self, name: &str) -> Option<usize> {
        self.statements
            .iter()
            .position(|s| !s.is_opaque() && s.name() == name)
    }

    pub fn definition(&self, name: &str) -> Option<&Statement> {
        self.find_definition(name).map(|idx| &self.statements[idx])
    }

    pub fn services(&self) -> impl Iterator<Item = &ServiceDefinition> {
        self.statements.iter().filter_map(|s| match s {
            Statement::ServiceDefinition(service) => Some(service),
            _ => None,
        })
    }

    pub fn structs(&self) -> impl Iterator<Item = &StructDefinition> {
        self.statements.iter().filter_map(|s| match s {
            Statement::StructDefinition(st) => Some(st),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Service,
    Struct,
    Enum,
    Typedef,
    Const,
    Other,
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StatementKind::Service => "service",
            StatementKind::Struct => "struct",
            StatementKind::Enum => "enum",
            StatementKind::Typedef => "typedef",
            StatementKind::Const => "const",
            StatementKind::Other => "other",
        };
        f.write_str(label)
    }
}

/// Statement tags with a typed representation.
const TYPED_STATEMENTS: &[&str] = &[
    "ServiceDefinition",
    "StructDefinition",
    "EnumDefinition",
    "TypedefDefinition",
    "ConstDefinition",
];

/// Top-level declaration of an IDL file.
///
/// Unions are delivered by the parser as `StructDefinition`. Any other tag
/// (exceptions, namespaces, ...) is kept verbatim as [`Statement::Other`].
#[derive(Debug, Clone)]
pub enum Statement {
    ServiceDefinition(ServiceDefinition),
    StructDefinition(StructDefinition),
    EnumDefinition(EnumDefinition),
    TypedefDefinition(TypedefDefinition),
    ConstDefinition(ConstDefinition),
    Other(OpaqueStatement),
}

/// A statement the generators do not interpret.
#[derive(Debug, Clone, PartialEq)]
pub struct OpaqueStatement {
    /// The `type` tag as written by the parser.
    pub kind: String,
    /// Declared name, empty when the statement has none.
    pub name: String,
    pub raw: serde_json::Value,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum TaggedStatement {
    ServiceDefinition(ServiceDefinition),
    StructDefinition(StructDefinition),
    EnumDefinition(EnumDefinition),
    TypedefDefinition(TypedefDefinition),
    ConstDefinition(ConstDefinition),
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum TaggedStatementRef<'a> {
    ServiceDefinition(&'a ServiceDefinition),
    StructDefinition(&'a StructDefinition),
    EnumDefinition(&'a EnumDefinition),
    TypedefDefinition(&'a TypedefDefinition),
    ConstDefinition(&'a ConstDefinition),
}

impl From<TaggedStatement> for Statement {
    fn from(tagged: TaggedStatement) -> Self {
        match tagged {
            TaggedStatement::ServiceDefinition(def) => Statement::ServiceDefinition(def),
            TaggedStatement::StructDefinition(def) => Statement::StructDefinition(def),
            TaggedStatement::EnumDefinition(def) => Statement::EnumDefinition(def),
            TaggedStatement::TypedefDefinition(def) => Statement::TypedefDefinition(def),
            TaggedStatement::ConstDefinition(def) => Statement::ConstDefinition(def),
        }
    }
}

impl<'de> Deserialize<'de> for Statement {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = serde_json::Value::deserialize(deserializer)?;
        let kind = raw
            .get("type")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| de::Error::missing_field("type"))?
            .to_string();

        if TYPED_STATEMENTS.contains(&kind.as_str()) {
            let tagged: TaggedStatement = serde_json::from_value(raw).map_err(de::Error::custom)?;
            return Ok(tagged.into());
        }

        let name = raw
            .get("name")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_string();
        Ok(Statement::Other(OpaqueStatement { kind, name, raw }))
    }
}

impl Serialize for Statement {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let tagged = match self {
            Statement::ServiceDefinition(def) => TaggedStatementRef::ServiceDefinition(def),
            Statement::StructDefinition(def) => TaggedStatementRef::StructDefinition(def),
            Statement::EnumDefinition(def) => TaggedStatementRef::EnumDefinition(def),
            Statement::TypedefDefinition(def) => TaggedStatementRef::TypedefDefinition(def),
            Statement::ConstDefinition(def) => TaggedStatementRef::ConstDefinition(def),
            Statement::Other(opaque) => return opaque.raw.serialize(serializer),
        };
        tagged.serialize(serializer)
    }
}

impl Statement {
    pub fn name(&self) -> &str {
        match self {
            Statement::ServiceDefinition(s) => &s.name,
            Statement::StructDefinition(s) => &s.name,
            Statement::EnumDefinition(s) => &s.name,
            Statement::TypedefDefinition(s) => &s.name,
            Statement::ConstDefinition(s) => &s.name,
            Statement::Other(s) => &s.name,
        }
    }

    pub fn kind(&self) -> StatementKind {
        match self {
            Statement::ServiceDefinition(_) => StatementKind::Service,
            Statement::StructDefinition(_) => StatementKind::Struct,
            Statement::EnumDefinition(_) => StatementKind::Enum,
            Statement::TypedefDefinition(_) => StatementKind::Typedef,
            Statement::ConstDefinition(_) => StatementKind::Const,
            Statement::Other(_) => StatementKind::Other,
        }
    }

    pub fn is_opaque(&self) -> bool {
        matches!(self, Statement::Other(_))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDefinition {
    pub name: String,
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub functions: Vec<FunctionDefinition>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default, skip_serializing_if = "ServiceExtensionConfig::is_empty")]
    pub extension_config: ServiceExtensionConfig,
}

/// `api.*` / `agw.*` annotations of a service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServiceExtensionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri_prefix: Option<String>,
}

impl ServiceExtensionConfig {
    pub fn is_empty(&self) -> bool {
        self.uri_prefix.is_none()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDefinition {
    pub name: String,
    pub return_type: FieldType,
    /// Request parameters, in declaration order.
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default, skip_serializing_if = "FunctionExtensionConfig::is_empty")]
    pub extension_config: FunctionExtensionConfig,
}

/// HTTP binding of a function, from its `api.*` / `agw.*` annotations.
///
/// The parser already folds `api.get = '/x'` style shorthands into
/// `method` + `uri`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct FunctionExtensionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serializer: Option<String>,
}

impl FunctionExtensionConfig {
    pub fn is_empty(&self) -> bool {
        self.method.is_none() && self.uri.is_none() && self.serializer.is_none()
    }
}

impl FunctionDefinition {
    /// Type of the first request parameter, if any.
    pub fn request_type(&self) -> Option<&FieldType> {
        self.fields.first().map(|f| &f.field_type)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StructDefinition {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Requiredness {
    Required,
    Optional,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub name: String,
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<ConstValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requiredness: Option<Requiredness>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default, skip_serializing_if = "FieldExtensionConfig::is_empty")]
    pub extension_config: FieldExtensionConfig,
}

impl FieldDefinition {
    pub fn is_optional(&self) -> bool {
        self.requiredness == Some(Requiredness::Optional)
    }

    /// Name of the field on the wire: the `api.key` override or the
    /// declared name.
    pub fn wire_name(&self) -> &str {
        self.extension_config.key.as_deref().unwrap_or(&self.name)
    }
}

/// Where a request field travels (`api.position`) and under which key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct FieldExtensionConfig {
    /// `query`, `body`, `path`, `header`, ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl FieldExtensionConfig {
    pub fn is_empty(&self) -> bool {
        self.position.is_none() && self.key.is_none() && self.tag.is_none()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnumDefinition {
    pub name: String,
    #[serde(default)]
    pub members: Vec<EnumMember>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl EnumDefinition {
    /// Numeric value of every member, in declaration order.
    ///
    /// A member without initializer takes the previous value plus one,
    /// starting from zero.
    pub fn values(&self) -> Vec<i64> {
        let mut current = 0i64;
        let mut values = Vec::with_capacity(self.members.len());
        for member in &self.members {
            if let Some(value) = member.initializer.as_ref().and_then(ConstValue::as_int) {
                current = value;
            }
            values.push(current);
            current += 1;
        }
        values
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnumMember {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initializer: Option<ConstValue>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedefDefinition {
    pub name: String,
    pub definition_type: FieldType,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstDefinition {
    pub name: String,
    pub field_type: FieldType,
    pub initializer: ConstValue,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum CommentKind {
    CommentLine,
    CommentBlock,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Comment {
    #[serde(rename = "type")]
    pub kind: CommentKind,
    pub value: String,
}

impl Comment {
    pub fn line(value: impl Into<String>) -> Self {
        Self {
            kind: CommentKind::CommentLine,
            value: value.into(),
        }
    }
}

/// Literal values used for field defaults, enum initializers and consts.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum ConstValue {
    StringLiteral { value: String },
    /// Decimal or `0x` hexadecimal text.
    IntConstant { value: String },
    DoubleConstant { value: String },
    BooleanLiteral { value: bool },
    ConstList { elements: Vec<ConstValue> },
    ConstMap { properties: Vec<ConstProperty> },
    Identifier { value: String },
}

impl ConstValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConstValue::IntConstant { value } => parse_int_literal(value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConstValue::StringLiteral { value } => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ConstProperty {
    pub name: ConstValue,
    pub initializer: ConstValue,
}

/// Parse an integer literal as written in the IDL source.
pub fn parse_int_literal(text: &str) -> Option<i64> {
    let text = text.trim();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let magnitude = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => i64::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<i64>().ok()?,
    };
    Some(if negative { -magnitude } else { magnitude })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    Bool,
    Byte,
    I8,
    I16,
    I32,
    I64,
    Double,
    String,
    Binary,
    Void,
}

/// How a base type is represented in generated client code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseCategory {
    Number,
    String,
    Boolean,
    Binary,
    Void,
}

impl BaseType {
    pub fn keyword(&self) -> &'static str {
        match self {
            BaseType::Bool => "BoolKeyword",
            BaseType::Byte => "ByteKeyword",
            BaseType::I8 => "I8Keyword",
            BaseType::I16 => "I16Keyword",
            BaseType::I32 => "I32Keyword",
            BaseType::I64 => "I64Keyword",
            BaseType::Double => "DoubleKeyword",
            BaseType::String => "StringKeyword",
            BaseType::Binary => "BinaryKeyword",
            BaseType::Void => "VoidKeyword",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let base = match keyword {
            "BoolKeyword" => BaseType::Bool,
            "ByteKeyword" => BaseType::Byte,
            "I8Keyword" => BaseType::I8,
            "I16Keyword" => BaseType::I16,
            "I32Keyword" => BaseType::I32,
            "I64Keyword" => BaseType::I64,
            "DoubleKeyword" => BaseType::Double,
            "StringKeyword" => BaseType::String,
            "BinaryKeyword" => BaseType::Binary,
            "VoidKeyword" => BaseType::Void,
            _ => return None,
        };
        Some(base)
    }

    pub fn category(&self) -> BaseCategory {
        match self {
            BaseType::Byte
            | BaseType::I8
            | BaseType::I16
            | BaseType::I32
            | BaseType::I64
            | BaseType::Double => BaseCategory::Number,
            BaseType::String => BaseCategory::String,
            BaseType::Bool => BaseCategory::Boolean,
            BaseType::Binary => BaseCategory::Binary,
            BaseType::Void => BaseCategory::Void,
        }
    }
}

/// Type of a field, parameter, typedef target or function result.
///
/// Tags the loader does not understand are kept as [`FieldType::Unsupported`]
/// so consumers can decide whether they are fatal.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "RawFieldType", into = "RawFieldType")]
pub enum FieldType {
    Base(BaseType),
    List(Box<FieldType>),
    Set(Box<FieldType>),
    Map {
        key: Box<FieldType>,
        value: Box<FieldType>,
    },
    /// Reference to a declaration, optionally namespace-qualified (`base.Base`).
    Identifier(String),
    Unsupported(String),
}

impl FieldType {
    pub fn tag(&self) -> &str {
        match self {
            FieldType::Base(base) => base.keyword(),
            FieldType::List(_) => "ListType",
            FieldType::Set(_) => "SetType",
            FieldType::Map { .. } => "MapType",
            FieldType::Identifier(_) => "Identifier",
            FieldType::Unsupported(tag) => tag,
        }
    }

    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            FieldType::Identifier(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct RawFieldType {
    #[serde(rename = "type")]
    tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    key_type: Option<Box<FieldType>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value_type: Option<Box<FieldType>>,
}

impl TryFrom<RawFieldType> for FieldType {
    type Error = String;

    fn try_from(raw: RawFieldType) -> Result<Self, Self::Error> {
        let missing = |what: &str| format!("{} is missing '{}'", raw.tag, what);
        let field_type = match raw.tag.as_str() {
            "ListType" => FieldType::List(raw.value_type.ok_or_else(|| missing("valueType"))?),
            "SetType" => FieldType::Set(raw.value_type.ok_or_else(|| missing("valueType"))?),
            "MapType" => FieldType::Map {
                key: raw.key_type.ok_or_else(|| missing("keyType"))?,
                value: raw.value_type.ok_or_else(|| missing("valueType"))?,
            },
            "Identifier" => FieldType::Identifier(raw.value.ok_or_else(|| missing("value"))?),
            tag => match BaseType::from_keyword(tag) {
                Some(base) => FieldType::Base(base),
                None => FieldType::Unsupported(tag.to_string()),
            },
        };
        Ok(field_type)
    }
}

impl From<FieldType> for RawFieldType {
    fn from(field_type: FieldType) -> Self {
        let raw = |tag: &str| RawFieldType {
            tag: tag.to_string(),
            value: None,
            key_type: None,
            value_type: None,
        };
        match field_type {
            FieldType::Base(base) => raw(base.keyword()),
            FieldType::List(value) => RawFieldType {
                value_type: Some(value),
                ..raw("ListType")
            },
            FieldType::Set(value) => RawFieldType {
                value_type: Some(value),
                ..raw("SetType")
            },
            FieldType::Map { key, value } => RawFieldType {
                key_type: Some(key),
                value_type: Some(value),
                ..raw("MapType")
            },
            FieldType::Identifier(value) => RawFieldType {
                value: Some(value),
                ..raw("Identifier")
            },
            FieldType::Unsupported(tag) => raw(&tag),
        }
    }
}

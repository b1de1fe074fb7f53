use idlgen_idl::IdlError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenError {
    #[error("unknown type:{0}")]
    UnknownFieldType(String),

    #[error("No AST files configured for '{0}'")]
    MissingAst(String),

    #[error("Failed to load AST: {0}")]
    Idl(#[from] IdlError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

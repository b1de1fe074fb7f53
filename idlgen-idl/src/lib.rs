//! AST model and loading for idlgen
//!
//! This crate provides the types produced by the external IDL parser, the
//! loader for its JSON output, and the cross-file namespace resolution used by
//! the code generators.

pub mod error;
pub mod namespace;
pub mod parse;
pub mod search;
pub mod types;
pub mod utils;

pub use error::*;
pub use namespace::*;
pub use search::*;
pub use types::*;

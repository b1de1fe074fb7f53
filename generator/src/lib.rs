//! Plugin pipeline generating TypeScript clients from parsed IDL files
//!
//! A [`Program`] hosts hook callbacks; plugins attach to it and transform the
//! AST, the generated files, or synthesized mock values. The [`driver`]
//! fires the hooks in order for one or more API configurations.

pub mod context;
pub mod driver;
pub mod emit;
pub mod enums;
pub mod error;
pub mod plugin;
pub mod program;

pub use context::*;
pub use driver::{gen_client, gen_single, ClientConfig, GenOptions, GenReport};
pub use error::GenError;
pub use plugin::Plugin;
pub use program::{after, before, on, Hook, HookDescriptor, Phase, Program};

//! Output renderers

pub mod mock_data;
pub mod schema;
pub mod typescript;

pub use mock_data::MockDataBuilder;
pub use schema::{SchemaConfig, SchemaPlugin};
pub use typescript::{TypeScriptConfig, TypeScriptPlugin, DEFAULT_REQUEST_MODULE};

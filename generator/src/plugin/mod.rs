//! Plugins shipped with the generator

pub mod alias;
pub mod filter_types;
pub mod mock;

pub use alias::AliasPlugin;
pub use filter_types::FilterTypesPlugin;
pub use mock::{MockOptions, MockPlugin};

use crate::program::Program;

/// A unit of behavior attached to a [`Program`] through hook callbacks.
///
/// State shared between a plugin's callbacks lives behind `Rc<RefCell<_>>`
/// owned by the closures; a plugin value is consumed when applied.
pub trait Plugin {
    fn name(&self) -> &'static str;

    fn apply(self: Box<Self>, program: &mut Program);
}

pub mod config;
pub mod gen;
pub mod search;

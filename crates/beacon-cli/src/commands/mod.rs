//! Command implementations for beacon-cli

pub mod query;
pub mod track;

pub use query::{interactive, query};
pub use track::track;

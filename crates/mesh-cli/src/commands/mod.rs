//! Subcommand implementations.

pub mod grid;
pub mod info;
pub mod merge;
pub mod validate;

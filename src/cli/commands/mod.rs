//! CLI command implementations

pub mod comments;
pub mod completions;
pub mod config;
pub mod merge;
pub mod validate;

//! Shared helper functions for CLI commands

use miette::{IntoDiagnostic, Result, WrapErr};
use std::fs;
use std::path::Path;

use crate::core::Workspace;

/// Read and parse a document, labelling errors with its path
pub fn load_workspace(path: &Path) -> Result<Workspace> {
    let source = fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;

    Workspace::parse(&source, &path.display().to_string())
        .wrap_err_with(|| format!("Failed to load {}", path.display()))
}

/// Author column value; unattributed comments show as `-`
pub fn display_user(user_name: Option<&str>) -> &str {
    match user_name {
        Some(name) if !name.is_empty() => name,
        _ => "-",
    }
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Collapse line breaks so a value stays on one line of tab-separated output
pub fn single_line(s: &str) -> String {
    s.split(&['\r', '\n', '\t'][..])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

//! XML error diagnostics with source locations

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// XML syntax error with source location
#[derive(Debug, Error, Diagnostic)]
#[error("XML syntax error at line {line}, column {column}: {message}")]
#[diagnostic(code(chemprov::xml::syntax))]
pub struct XmlSyntaxError {
    #[source_code]
    src: NamedSource<String>,

    #[label("error here")]
    span: SourceSpan,

    #[help]
    help: Option<String>,

    /// The underlying error message
    message: String,

    line: usize,

    column: usize,
}

impl XmlSyntaxError {
    /// Create a syntax error at a byte offset into the source
    pub fn at_offset(message: impl Into<String>, source: &str, filename: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let (line, column) = offset_to_line_col(source, offset);
        let message = message.into();
        let help = generate_help(&message);

        Self {
            src: NamedSource::new(filename, source.to_string()),
            span: SourceSpan::from(offset..offset.saturating_add(1).min(source.len().max(1))),
            help,
            message,
            line,
            column,
        }
    }

    /// The underlying parser message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// 1-based line and column of the error
    pub fn location(&self) -> (usize, usize) {
        (self.line, self.column)
    }
}

/// Errors produced while loading or saving a ChemProV document
#[derive(Debug, Error, Diagnostic)]
pub enum DocumentError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] XmlSyntaxError),

    #[error("expected root element <{expected}>, found <{found}>")]
    #[diagnostic(
        code(chemprov::document::root),
        help("ChemProV documents start with <ProcessFlowDiagram>")
    )]
    UnexpectedRoot { expected: &'static str, found: String },

    #[error("missing element <{path}>")]
    #[diagnostic(code(chemprov::document::missing_element))]
    MissingElement { path: String },

    #[error("<{element}> is missing the `{attribute}` attribute")]
    #[diagnostic(code(chemprov::document::missing_attribute))]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },

    #[error("invalid {field} `{value}` in <{element}>")]
    #[diagnostic(code(chemprov::document::invalid_value))]
    InvalidValue {
        element: String,
        field: &'static str,
        value: String,
    },

    #[error("no equation id left to assign; ids already reach {}", u32::MAX)]
    #[diagnostic(
        code(chemprov::document::equation_ids_exhausted),
        help("renumber the equations so the largest id leaves room for new rows")
    )]
    EquationIdsExhausted,

    #[error("failed to write document: {0}")]
    #[diagnostic(code(chemprov::document::write))]
    Write(String),

    #[error("IO error: {0}")]
    #[diagnostic(code(chemprov::document::io))]
    Io(#[from] std::io::Error),
}

impl DocumentError {
    pub(crate) fn missing(path: &[&str]) -> Self {
        DocumentError::MissingElement {
            path: path.join("/"),
        }
    }
}

/// Convert a byte offset to a 1-based line/column pair
fn offset_to_line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;

    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }

    (line, column)
}

/// Generate helpful suggestions based on error message
fn generate_help(message: &str) -> Option<String> {
    let msg_lower = message.to_lowercase();

    if msg_lower.contains("expected `</") || msg_lower.contains("mismatch") {
        return Some("Every opening tag needs a matching closing tag with the same name.".to_string());
    }

    if msg_lower.contains("unexpected end") || msg_lower.contains("eof") || msg_lower.contains("unclosed") {
        return Some("The document ends before all elements are closed. The file may be truncated.".to_string());
    }

    if msg_lower.contains("escape") || msg_lower.contains("entity") || msg_lower.contains("reference") {
        return Some("Use &amp; &lt; &gt; &quot; or &apos; for special characters in text.".to_string());
    }

    if msg_lower.contains("utf-8") {
        return Some("ChemProV documents must be saved as UTF-8.".to_string());
    }

    None
}

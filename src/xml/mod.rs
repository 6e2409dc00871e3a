//! XML document handling for `.cpml` files

pub mod diagnostics;
pub mod tree;

pub use diagnostics::{DocumentError, XmlSyntaxError};
pub use tree::{parse, write_document, Element, Node};

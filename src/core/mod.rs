//! Core module - workspace model, merge engine and supporting types

pub mod attribution;
pub mod checks;
pub mod config;
pub mod entity;
pub mod identity;
pub mod merge;
pub mod workspace;

pub use checks::{check, Issue};
pub use config::Config;
pub use entity::{Attributed, Commentable};
pub use identity::{EquationId, EquationIdSequence, IdParseError, StreamId, UnitId};
pub use merge::{merge, CategoryReport, CommentMerger, MergeError, MergeReport, MergeRequest, Side};
pub use workspace::Workspace;

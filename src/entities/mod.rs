//! Entity type definitions
//!
//! A ChemProV document holds the following commentable entities:
//!
//! - [`ProcessUnit`] - Mixers, separators, reactors and other units, keyed by `GPU_<n>`
//! - [`Stream`] - Chemical and heat streams between units, keyed by `S_<n>`
//! - [`Equation`] - Rows of the equation editor, keyed by integer id
//! - [`DegreesOfFreedom`] - The single free-text analysis section
//!
//! plus free-floating [`StickyNote`]s that belong to no entity.

pub mod comment;
pub mod degrees_of_freedom;
pub mod equation;
pub mod process_unit;
pub mod stream;

pub use comment::{Comment, Geometry, StickyNote};
pub use degrees_of_freedom::DegreesOfFreedom;
pub use equation::Equation;
pub use process_unit::ProcessUnit;
pub use stream::Stream;

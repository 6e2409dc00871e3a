//! ChemProV: process-flow diagram documents
//!
//! Loads and saves ChemProV `.cpml` documents and merges reviewer comments
//! between independently edited copies of the same document.

pub mod cli;
pub mod core;
pub mod entities;
pub mod xml;

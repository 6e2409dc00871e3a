//! Entity identity: string ids for process units and streams, integer ids
//! for equations

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error parsing an entity ID
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdParseError {
    #[error("ID is empty")]
    Empty,

    #[error("equation ID must be a non-negative integer, got '{0}'")]
    InvalidEquationId(String),
}

/// Identifier of a process unit, `GPU_<n>` in saved documents
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct UnitId(String);

impl UnitId {
    pub const PREFIX: &'static str = "GPU";

    /// Build the conventional id for a numbered unit
    pub fn numbered(n: u32) -> Self {
        UnitId(format!("{}_{}", Self::PREFIX, n))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for UnitId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(IdParseError::Empty);
        }
        Ok(UnitId(s.to_string()))
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a stream, `S_<n>` in saved documents
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct StreamId(String);

impl StreamId {
    pub const PREFIX: &'static str = "S";

    pub fn numbered(n: u32) -> Self {
        StreamId(format!("{}_{}", Self::PREFIX, n))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for StreamId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(IdParseError::Empty);
        }
        Ok(StreamId(s.to_string()))
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of an equation
///
/// Zero is never a valid id; documents use it to mean "not yet assigned".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EquationId(u32);

impl EquationId {
    pub fn get(self) -> u32 {
        self.0
    }

    /// Parse an `Id` attribute; `Ok(None)` for the unassigned id `0`
    pub fn parse_assigned(s: &str) -> Result<Option<Self>, IdParseError> {
        let n: u32 = s
            .trim()
            .parse()
            .map_err(|_| IdParseError::InvalidEquationId(s.to_string()))?;
        Ok((n != 0).then_some(EquationId(n)))
    }
}

impl fmt::Display for EquationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out equation ids for one document
///
/// Every id the document already uses must be passed to [`observe`] before
/// new ids are requested; after that, [`next_id`] never repeats one. Once
/// `u32::MAX` is in use the sequence is exhausted and hands out nothing.
///
/// [`observe`]: EquationIdSequence::observe
/// [`next_id`]: EquationIdSequence::next_id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquationIdSequence {
    next: Option<u32>,
}

impl Default for EquationIdSequence {
    fn default() -> Self {
        Self { next: Some(1) }
    }
}

impl EquationIdSequence {
    /// Record an id that is already in use
    pub fn observe(&mut self, id: EquationId) {
        if let Some(next) = self.next {
            if id.0 >= next {
                self.next = id.0.checked_add(1);
            }
        }
    }

    /// Allocate a fresh id; `None` once every id is taken
    pub fn next_id(&mut self) -> Option<EquationId> {
        let id = self.next?;
        self.next = id.checked_add(1);
        Some(EquationId(id))
    }

    /// The id the next call to [`EquationIdSequence::next_id`] will return
    pub fn peek(&self) -> Option<EquationId> {
        self.next.map(EquationId)
    }
}

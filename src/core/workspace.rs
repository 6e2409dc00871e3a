//! The in-memory form of one ChemProV document
//!
//! A [`Workspace`] is built from a `.cpml` byte stream, holds the typed
//! entities the comment merge works on, and writes itself back out. The
//! rest of the document (properties windows, feedback window, unit
//! locations, stream endpoints, equation scope and type, ...) is kept as an
//! opaque element tree so that saving reproduces it unchanged.

use std::io::{Read, Write};

use tracing::debug;

use crate::core::entity::Commentable;
use crate::core::identity::{EquationId, EquationIdSequence, StreamId, UnitId};
use crate::entities::{DegreesOfFreedom, Equation, ProcessUnit, StickyNote, Stream};
use crate::xml::{self, DocumentError, Element};

const ROOT: &str = "ProcessFlowDiagram";
const PROCESS_UNITS: [&str; 2] = ["DrawingCanvas", "ProcessUnits"];
const STREAMS: [&str; 2] = ["DrawingCanvas", "Streams"];
const STICKY_NOTES: [&str; 2] = ["DrawingCanvas", "StickyNotes"];
const EQUATIONS: [&str; 2] = ["EquationEditor", "Equations"];

/// One loaded document
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Document tree with the typed entities lifted out
    document: Element,
    pub(crate) process_units: Vec<ProcessUnit>,
    pub(crate) streams: Vec<Stream>,
    pub(crate) equations: Vec<Equation>,
    pub(crate) sticky_notes: Vec<StickyNote>,
    pub(crate) degrees_of_freedom: DegreesOfFreedom,
    equation_ids: EquationIdSequence,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    /// An empty document at the material-balance difficulty
    pub fn new() -> Self {
        let document = Element::new(ROOT)
            .with_attr("ChemProV.version", env!("CARGO_PKG_VERSION"))
            .with_attr("DifficultySetting", "MaterialBalance")
            .with_child(
                Element::new("DrawingCanvas")
                    .with_child(Element::new("ProcessUnits"))
                    .with_child(Element::new("Streams"))
                    .with_child(Element::new("PropertiesWindows"))
                    .with_child(Element::new("StickyNotes")),
            )
            .with_child(Element::new("EquationEditor").with_child(Element::new("Equations")))
            .with_child(Element::new("FeedbackWindow"))
            .with_child(Element::new(DegreesOfFreedom::TAG));

        Self {
            document,
            process_units: Vec::new(),
            streams: Vec::new(),
            equations: Vec::new(),
            sticky_notes: Vec::new(),
            degrees_of_freedom: DegreesOfFreedom::default(),
            equation_ids: EquationIdSequence::default(),
        }
    }

    /// Read a complete document from a byte stream
    ///
    /// `name` is only used to label syntax errors.
    pub fn load(mut reader: impl Read, name: &str) -> Result<Self, DocumentError> {
        let mut source = String::new();
        reader.read_to_string(&mut source)?;
        Self::parse(&source, name)
    }

    /// Parse a complete document held in memory
    pub fn parse(source: &str, name: &str) -> Result<Self, DocumentError> {
        let root = xml::parse(source, name)?;
        let workspace = Self::from_document(root)?;
        debug!(
            document = name,
            units = workspace.process_units.len(),
            streams = workspace.streams.len(),
            equations = workspace.equations.len(),
            notes = workspace.sticky_notes.len(),
            comments = workspace.comment_count(),
            "loaded workspace"
        );
        Ok(workspace)
    }

    fn from_document(mut root: Element) -> Result<Self, DocumentError> {
        if root.name != ROOT {
            return Err(DocumentError::UnexpectedRoot {
                expected: ROOT,
                found: root.name,
            });
        }

        let process_units = section(&mut root, &PROCESS_UNITS)?
            .take_children_named(ProcessUnit::TAG)
            .into_iter()
            .map(ProcessUnit::from_element)
            .collect::<Result<Vec<_>, _>>()?;

        let streams = section(&mut root, &STREAMS)?
            .take_children_named(Stream::TAG)
            .into_iter()
            .map(Stream::from_element)
            .collect::<Result<Vec<_>, _>>()?;

        // Every child is a note; earlier merges wrote them as <Comment>
        let sticky_notes = section(&mut root, &STICKY_NOTES)?
            .take_elements()
            .iter()
            .map(StickyNote::from_element)
            .collect::<Result<Vec<_>, _>>()?;

        // Explicit ids first, so the ones handed to unassigned equations
        // never collide with a later row
        let mut equation_ids = EquationIdSequence::default();
        let mut rows = Vec::new();
        for el in section(&mut root, &EQUATIONS)?.take_children_named(Equation::TAG) {
            let id = Equation::parse_id(&el)?;
            if let Some(id) = id {
                equation_ids.observe(id);
            }
            rows.push((el, id));
        }
        let mut equations = Vec::with_capacity(rows.len());
        for (el, id) in rows {
            let equation = match id {
                Some(id) => Equation::from_element(el, id)?,
                None => {
                    let id = equation_ids
                        .next_id()
                        .ok_or(DocumentError::EquationIdsExhausted)?;
                    Equation::from_element(el, id)?.with_provisional_id()
                }
            };
            equations.push(equation);
        }

        // Leave an empty placeholder so the analysis is written back in place
        let degrees_of_freedom = match root.child_mut(DegreesOfFreedom::TAG) {
            Some(slot) => DegreesOfFreedom::from_element(std::mem::replace(
                slot,
                Element::new(DegreesOfFreedom::TAG),
            ))?,
            None => DegreesOfFreedom::default(),
        };

        Ok(Self {
            document: root,
            process_units,
            streams,
            equations,
            sticky_notes,
            degrees_of_freedom,
            equation_ids,
        })
    }

    /// Rebuild the full document tree
    pub fn to_document(&self) -> Element {
        let mut root = self.document.clone();

        let units = root.path_or_insert(&PROCESS_UNITS);
        for unit in &self.process_units {
            units.push(unit.to_element());
        }

        let streams = root.path_or_insert(&STREAMS);
        for stream in &self.streams {
            streams.push(stream.to_element());
        }

        let notes = root.path_or_insert(&STICKY_NOTES);
        for note in &self.sticky_notes {
            notes.push(note.to_element());
        }

        let equations = root.path_or_insert(&EQUATIONS);
        for equation in &self.equations {
            equations.push(equation.to_element());
        }

        match root.child_mut(DegreesOfFreedom::TAG) {
            Some(slot) => *slot = self.degrees_of_freedom.to_element(),
            None => root.push(self.degrees_of_freedom.to_element()),
        }

        root
    }

    /// Serialize the document as UTF-8 XML
    pub fn to_bytes(&self) -> Result<Vec<u8>, DocumentError> {
        xml::write_document(&self.to_document())
    }

    /// Write the complete document to a byte stream
    pub fn save(&self, mut writer: impl Write) -> Result<(), DocumentError> {
        let bytes = self.to_bytes()?;
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }

    /// `DifficultySetting` of the document, if recorded
    pub fn difficulty(&self) -> Option<&str> {
        self.document.attr("DifficultySetting")
    }

    pub fn process_units(&self) -> &[ProcessUnit] {
        &self.process_units
    }

    pub fn streams(&self) -> &[Stream] {
        &self.streams
    }

    pub fn equations(&self) -> &[Equation] {
        &self.equations
    }

    pub fn sticky_notes(&self) -> &[StickyNote] {
        &self.sticky_notes
    }

    pub fn degrees_of_freedom(&self) -> &DegreesOfFreedom {
        &self.degrees_of_freedom
    }

    pub fn degrees_of_freedom_mut(&mut self) -> &mut DegreesOfFreedom {
        &mut self.degrees_of_freedom
    }

    pub fn process_unit(&self, id: &UnitId) -> Option<&ProcessUnit> {
        self.process_units.iter().find(|unit| unit.id() == id)
    }

    pub fn process_unit_mut(&mut self, id: &UnitId) -> Option<&mut ProcessUnit> {
        self.process_units.iter_mut().find(|unit| unit.id() == id)
    }

    pub fn stream(&self, id: &StreamId) -> Option<&Stream> {
        self.streams.iter().find(|stream| stream.id() == id)
    }

    pub fn stream_mut(&mut self, id: &StreamId) -> Option<&mut Stream> {
        self.streams.iter_mut().find(|stream| stream.id() == id)
    }

    pub fn equation(&self, id: EquationId) -> Option<&Equation> {
        self.equations.iter().find(|equation| equation.id() == id)
    }

    pub fn equation_mut(&mut self, id: EquationId) -> Option<&mut Equation> {
        self.equations.iter_mut().find(|equation| equation.id() == id)
    }

    pub fn add_process_unit(&mut self, unit: ProcessUnit) {
        self.process_units.push(unit);
    }

    pub fn add_stream(&mut self, stream: Stream) {
        self.streams.push(stream);
    }

    /// Append a new equation row with the next free id
    pub fn add_equation(&mut self, equation: &str) -> Result<EquationId, DocumentError> {
        let id = self
            .equation_ids
            .next_id()
            .ok_or(DocumentError::EquationIdsExhausted)?;
        self.equations.push(Equation::new(id, equation));
        Ok(id)
    }

    pub fn add_sticky_note(&mut self, note: StickyNote) {
        self.sticky_notes.push(note);
    }

    /// Number of entity comments plus sticky notes
    pub fn comment_count(&self) -> usize {
        self.process_units.iter().map(|u| u.comments().len()).sum::<usize>()
            + self.streams.iter().map(|s| s.comments().len()).sum::<usize>()
            + self.equations.iter().map(|e| e.comments().len()).sum::<usize>()
            + self.degrees_of_freedom.comments().len()
            + self.sticky_notes.len()
    }
}

/// A section every document must have
fn section<'a>(root: &'a mut Element, path: &[&str]) -> Result<&'a mut Element, DocumentError> {
    root.path_mut(path).ok_or_else(|| {
        let mut full = vec![ROOT];
        full.extend_from_slice(path);
        DocumentError::missing(&full)
    })
}

//! Equation entity type

use tracing::trace;

use crate::core::entity::Commentable;
use crate::core::identity::EquationId;
use crate::entities::comment::Comment;
use crate::xml::{DocumentError, Element};

/// Tag used for equation comments. Older files held a single annotation
/// under this name; it now repeats, one element per comment.
const ANNOTATION_TAG: &str = "Annotation";

/// An equation row from the equation editor
#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    id: EquationId,
    /// The document left the id unassigned and it was handed out on load
    provisional: bool,
    comments: Vec<Comment>,
    element: Element,
}

impl Equation {
    pub const TAG: &'static str = "EquationModel";

    /// Create an equation with overall scope and total type
    pub fn new(id: EquationId, equation: &str) -> Self {
        let element = Element::new(Self::TAG)
            .with_attr("Id", id.to_string())
            .with_child(
                Element::new("Scope")
                    .with_attr("Name", "Unknown")
                    .with_attr("ClassificationId", "3"),
            )
            .with_child(
                Element::new("Type")
                    .with_attr("Name", "Total")
                    .with_attr("ClassificationId", "0"),
            )
            .with_child(Element::new("Equation").with_text(equation));

        Self {
            id,
            provisional: false,
            comments: Vec::new(),
            element,
        }
    }

    pub fn id(&self) -> EquationId {
        self.id
    }

    /// Mark the id as assigned by this process rather than read from the file
    pub fn with_provisional_id(mut self) -> Self {
        self.provisional = true;
        self
    }

    /// Provisional ids are local to one loaded document and never match
    /// an equation in another
    pub fn has_provisional_id(&self) -> bool {
        self.provisional
    }

    /// The equation text as typed by the student
    pub fn equation(&self) -> String {
        self.element.child_text("Equation").unwrap_or_default()
    }

    /// Read the `Id` attribute; `None` means the document left it unassigned
    pub fn parse_id(element: &Element) -> Result<Option<EquationId>, DocumentError> {
        let raw = element
            .attr("Id")
            .ok_or_else(|| DocumentError::MissingAttribute {
                element: element.name.clone(),
                attribute: "Id",
            })?;
        EquationId::parse_assigned(raw).map_err(|_| DocumentError::InvalidValue {
            element: element.name.clone(),
            field: "Id",
            value: raw.to_string(),
        })
    }

    /// Build from a saved element with its resolved id
    pub fn from_element(mut element: Element, id: EquationId) -> Result<Self, DocumentError> {
        if element.child("Equation").is_none() {
            return Err(DocumentError::missing(&[Self::TAG, "Equation"]));
        }

        let comments: Vec<Comment> = element
            .take_children_named(ANNOTATION_TAG)
            .iter()
            .map(Comment::from_attributed_text)
            .filter(|comment| !comment.text.is_empty())
            .collect();
        trace!(equation = %id, comments = comments.len(), "loaded equation");

        Ok(Self {
            id,
            provisional: false,
            comments,
            element,
        })
    }

    pub fn to_element(&self) -> Element {
        let mut el = self.element.clone();
        el.set_attr("Id", self.id.to_string());

        if self.comments.is_empty() {
            // Older readers require the element to be present
            el.push(Element::new(ANNOTATION_TAG));
        }
        for comment in &self.comments {
            el.push(comment.to_attributed_text(ANNOTATION_TAG));
        }
        el
    }
}

impl Commentable for Equation {
    type Key = EquationId;
    const KIND: &'static str = "equation";

    fn key(&self) -> &EquationId {
        &self.id
    }

    fn comments(&self) -> &[Comment] {
        &self.comments
    }

    fn comments_mut(&mut self) -> &mut Vec<Comment> {
        &mut self.comments
    }

    fn into_comments(self) -> Vec<Comment> {
        self.comments
    }

    fn is_matchable(&self) -> bool {
        !self.provisional
    }

    /// Rows with no equation text never contribute comments
    fn contributes_comments(&self) -> bool {
        self.is_matchable() && !self.equation().is_empty()
    }
}

//! Process unit entity type

use tracing::trace;

use crate::core::entity::Commentable;
use crate::core::identity::UnitId;
use crate::entities::comment::{canvas_comments_element, take_canvas_comments, Comment};
use crate::xml::{DocumentError, Element};

/// A process unit (mixer, separator, reactor, ...) on the drawing canvas
///
/// Only the id and the comments are interpreted; location, label, subgroup
/// and anything else in the saved element is carried through unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessUnit {
    id: UnitId,
    comments: Vec<Comment>,
    element: Element,
}

impl ProcessUnit {
    pub const TAG: &'static str = "GenericProcessUnit";

    /// Create a unit at the canvas origin
    pub fn new(id: UnitId, unit_type: &str, label: &str) -> Self {
        let element = Element::new(Self::TAG)
            .with_attr("Id", id.as_str())
            .with_attr("ProcessUnitType", unit_type)
            .with_attr("Name", label)
            .with_child(
                Element::new("Location")
                    .with_child(Element::new("X").with_text("0"))
                    .with_child(Element::new("Y").with_text("0")),
            )
            .with_child(Element::new("Subgroup").with_attr("Color", "#FFffFFff"));

        Self {
            id,
            comments: Vec::new(),
            element,
        }
    }

    pub fn id(&self) -> &UnitId {
        &self.id
    }

    /// Display label (`Name` attribute)
    pub fn label(&self) -> Option<&str> {
        self.element.attr("Name")
    }

    pub fn unit_type(&self) -> Option<&str> {
        self.element.attr("ProcessUnitType")
    }

    pub fn from_element(mut element: Element) -> Result<Self, DocumentError> {
        let id = required_id(&element)?;
        let comments = take_canvas_comments(&mut element)?;
        trace!(unit = %id, comments = comments.len(), "loaded process unit");

        Ok(Self {
            id,
            comments,
            element,
        })
    }

    pub fn to_element(&self) -> Element {
        let mut el = self.element.clone();
        el.set_attr("Id", self.id.as_str());
        if let Some(comments) = canvas_comments_element(&self.comments) {
            el.push(comments);
        }
        el
    }
}

impl Commentable for ProcessUnit {
    type Key = UnitId;
    const KIND: &'static str = "unit";

    fn key(&self) -> &UnitId {
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
}

fn required_id(element: &Element) -> Result<UnitId, DocumentError> {
    let raw = element
        .attr("Id")
        .ok_or_else(|| DocumentError::MissingAttribute {
            element: element.name.clone(),
            attribute: "Id",
        })?;
    raw.parse().map_err(|_| DocumentError::InvalidValue {
        element: element.name.clone(),
        field: "Id",
        value: raw.to_string(),
    })
}

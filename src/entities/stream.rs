//! Stream entity type

use tracing::trace;

use crate::core::entity::Commentable;
use crate::core::identity::{StreamId, UnitId};
use crate::entities::comment::{canvas_comments_element, take_canvas_comments, Comment};
use crate::xml::{DocumentError, Element};

/// A material or energy stream between process units
#[derive(Debug, Clone, PartialEq)]
pub struct Stream {
    id: StreamId,
    comments: Vec<Comment>,
    element: Element,
}

impl Stream {
    pub const TAG: &'static str = "AbstractStream";

    /// Create a stream between two units
    pub fn new(id: StreamId, stream_type: &str, source: &UnitId, destination: &UnitId) -> Self {
        let element = Element::new(Self::TAG)
            .with_attr("Id", id.as_str())
            .with_attr("StreamType", stream_type)
            .with_child(Element::new("Source").with_text(source.as_str()))
            .with_child(Element::new("Destination").with_text(destination.as_str()));

        Self {
            id,
            comments: Vec::new(),
            element,
        }
    }

    pub fn id(&self) -> &StreamId {
        &self.id
    }

    /// `Chemical` or `Heat`
    pub fn stream_type(&self) -> Option<&str> {
        self.element.attr("StreamType")
    }

    /// Unit the stream leaves from, if attached
    pub fn source(&self) -> Option<UnitId> {
        self.endpoint("Source")
    }

    /// Unit the stream flows into, if attached
    pub fn destination(&self) -> Option<UnitId> {
        self.endpoint("Destination")
    }

    fn endpoint(&self, tag: &str) -> Option<UnitId> {
        self.element.child_text(tag).and_then(|id| id.parse().ok())
    }

    pub fn from_element(mut element: Element) -> Result<Self, DocumentError> {
        let raw = element
            .attr("Id")
            .ok_or_else(|| DocumentError::MissingAttribute {
                element: element.name.clone(),
                attribute: "Id",
            })?;
        let id: StreamId = raw.parse().map_err(|_| DocumentError::InvalidValue {
            element: element.name.clone(),
            field: "Id",
            value: raw.to_string(),
        })?;
        let comments = take_canvas_comments(&mut element)?;
        trace!(stream = %id, comments = comments.len(), "loaded stream");

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

impl Commentable for Stream {
    type Key = StreamId;
    const KIND: &'static str = "stream";

    fn key(&self) -> &StreamId {
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

//! Degrees-of-freedom analysis

use crate::core::entity::Commentable;
use crate::entities::comment::Comment;
use crate::xml::{DocumentError, Element};

/// The free-text degrees-of-freedom analysis and its comment thread
///
/// The analysis has no id of its own. Its text is its key, so comments from
/// another document only match when both analyses read exactly the same.
#[derive(Debug, Clone, PartialEq)]
pub struct DegreesOfFreedom {
    text: String,
    comments: Vec<Comment>,
    element: Element,
}

impl Default for DegreesOfFreedom {
    fn default() -> Self {
        Self::new("")
    }
}

impl DegreesOfFreedom {
    pub const TAG: &'static str = "DegreesOfFreedomAnalysis";

    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            comments: Vec::new(),
            element: Element::new(Self::TAG),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn from_element(mut element: Element) -> Result<Self, DocumentError> {
        let text = element
            .take_children_named("Text")
            .first()
            .map(Element::text)
            .ok_or_else(|| DocumentError::missing(&[Self::TAG, "Text"]))?;

        let comments = element
            .take_children_named("Comment")
            .iter()
            .map(Comment::from_attributed_text)
            .filter(|comment| !comment.text.is_empty())
            .collect();

        Ok(Self {
            text,
            comments,
            element,
        })
    }

    pub fn to_element(&self) -> Element {
        let mut el = self.element.clone();
        el.children.insert(
            0,
            crate::xml::Node::Element(Element::new("Text").with_text(self.text.clone())),
        );
        for comment in &self.comments {
            el.push(comment.to_attributed_text("Comment"));
        }
        el
    }
}

impl Commentable for DegreesOfFreedom {
    type Key = String;
    const KIND: &'static str = "dof";

    fn key(&self) -> &String {
        &self.text
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

//! Comments, annotations and free-floating sticky notes

use serde::Serialize;

use crate::core::entity::Attributed;
use crate::xml::{DocumentError, Element};

/// Size used when a note is saved without one, or with one we cannot read
pub const DEFAULT_NOTE_SIZE: f64 = 100.0;

/// On-canvas placement of a note
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Geometry {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            width: DEFAULT_NOTE_SIZE,
            height: DEFAULT_NOTE_SIZE,
        }
    }

    fn from_element(el: &Element) -> Result<Self, DocumentError> {
        let location = el
            .child("Location")
            .ok_or_else(|| DocumentError::missing(&[el.name.as_str(), "Location"]))?;
        let x = parse_coordinate(location, "X", &el.name)?;
        let y = parse_coordinate(location, "Y", &el.name)?;

        let (width, height) = el
            .child_text("Size")
            .and_then(|size| parse_pair(&size))
            .unwrap_or((DEFAULT_NOTE_SIZE, DEFAULT_NOTE_SIZE));

        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::at(0.0, 0.0)
    }
}

/// A user-attributed comment on a process unit, stream, equation or the
/// degrees-of-freedom analysis
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub text: String,
    pub user_name: Option<String>,
    /// Canvas placement for unit and stream comments; `None` for equation
    /// and analysis comments
    pub geometry: Option<Geometry>,
}

impl Comment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            user_name: None,
            geometry: None,
        }
    }

    pub fn by(mut self, user_name: impl Into<String>) -> Self {
        self.user_name = Some(user_name.into());
        self
    }

    pub fn placed(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Read a `<Comment>` attached to a process unit or stream
    pub fn from_canvas_element(el: &Element) -> Result<Self, DocumentError> {
        let (text, user_name, geometry) = read_canvas_note(el)?;
        Ok(Self {
            text,
            user_name,
            geometry: Some(geometry),
        })
    }

    pub fn to_canvas_element(&self) -> Element {
        write_canvas_note(
            "Comment",
            &self.text,
            self.user_name.as_deref(),
            &self.geometry.unwrap_or_default(),
        )
    }

    /// Read a text comment whose author is a `UserName` attribute
    /// (`<Annotation>` on equations, `<Comment>` on the analysis)
    pub fn from_attributed_text(el: &Element) -> Self {
        Self {
            text: el.text(),
            user_name: el.attr("UserName").map(str::to_string),
            geometry: None,
        }
    }

    pub fn to_attributed_text(&self, tag: &str) -> Element {
        let mut el = Element::new(tag);
        if let Some(user) = self.user_name.as_deref().filter(|u| !u.is_empty()) {
            el.set_attr("UserName", user);
        }
        el.with_text(self.text.clone())
    }
}

impl Attributed for Comment {
    fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    fn set_user_name(&mut self, user_name: &str) {
        self.user_name = Some(user_name.to_string());
    }
}

/// A free-floating note on the drawing canvas
#[derive(Debug, Clone, PartialEq)]
pub struct StickyNote {
    pub text: String,
    pub user_name: Option<String>,
    pub geometry: Geometry,
}

impl StickyNote {
    pub fn new(text: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            text: text.into(),
            user_name: None,
            geometry: Geometry::at(x, y),
        }
    }

    /// Two notes are the same note when text and location match exactly
    pub fn same_note(&self, other: &StickyNote) -> bool {
        self.text == other.text
            && self.geometry.x == other.geometry.x
            && self.geometry.y == other.geometry.y
    }

    pub fn from_element(el: &Element) -> Result<Self, DocumentError> {
        let (text, user_name, geometry) = read_canvas_note(el)?;
        Ok(Self {
            text,
            user_name,
            geometry,
        })
    }

    pub fn to_element(&self) -> Element {
        write_canvas_note(
            "StickyNote",
            &self.text,
            self.user_name.as_deref(),
            &self.geometry,
        )
    }
}

impl Attributed for StickyNote {
    fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    fn set_user_name(&mut self, user_name: &str) {
        self.user_name = Some(user_name.to_string());
    }
}

/// Lift the `<Comments>` container out of a unit or stream element
pub(crate) fn take_canvas_comments(owner: &mut Element) -> Result<Vec<Comment>, DocumentError> {
    let mut comments = Vec::new();
    for container in owner.take_children_named("Comments") {
        for el in container.elements() {
            comments.push(Comment::from_canvas_element(el)?);
        }
    }
    Ok(comments)
}

/// Build the `<Comments>` container; `None` when there is nothing to write
pub(crate) fn canvas_comments_element(comments: &[Comment]) -> Option<Element> {
    if comments.is_empty() {
        return None;
    }
    let mut container = Element::new("Comments");
    for comment in comments {
        container.push(comment.to_canvas_element());
    }
    Some(container)
}

fn read_canvas_note(el: &Element) -> Result<(String, Option<String>, Geometry), DocumentError> {
    let text = el
        .child_text("Content")
        .ok_or_else(|| DocumentError::missing(&[el.name.as_str(), "Content"]))?;
    let geometry = Geometry::from_element(el)?;
    let user_name = el.child_text("UserName");
    Ok((text, user_name, geometry))
}

fn write_canvas_note(tag: &str, text: &str, user_name: Option<&str>, geometry: &Geometry) -> Element {
    let mut el = Element::new(tag)
        .with_child(
            Element::new("Location")
                .with_child(Element::new("X").with_text(geometry.x.to_string()))
                .with_child(Element::new("Y").with_text(geometry.y.to_string())),
        )
        .with_child(Element::new("Content").with_text(text))
        .with_child(
            Element::new("Size").with_text(format!("{},{}", geometry.width, geometry.height)),
        );

    if let Some(user) = user_name.filter(|u| !u.is_empty()) {
        el.push(Element::new("UserName").with_text(user));
    }

    el
}

fn parse_coordinate(location: &Element, axis: &'static str, owner: &str) -> Result<f64, DocumentError> {
    let raw = location
        .child_text(axis)
        .ok_or_else(|| DocumentError::missing(&[owner, "Location", axis]))?;
    raw.trim().parse().map_err(|_| DocumentError::InvalidValue {
        element: format!("{owner}/Location"),
        field: axis,
        value: raw,
    })
}

/// Parse an `"A,B"` pair of numbers
pub(crate) fn parse_pair(raw: &str) -> Option<(f64, f64)> {
    let (a, b) = raw.split_once(',')?;
    Some((a.trim().parse().ok()?, b.trim().parse().ok()?))
}

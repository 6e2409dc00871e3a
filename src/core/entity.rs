//! Capabilities shared by document entities

use std::fmt;
use std::hash::Hash;

use crate::entities::comment::Comment;

/// An entity that owns an ordered comment list and can be matched across
/// documents by a stable key
pub trait Commentable {
    /// Key used to find the same entity in another document
    type Key: Clone + Eq + Hash + fmt::Display;

    /// Entity kind used in listings and logs (e.g., "unit", "stream")
    const KIND: &'static str;

    fn key(&self) -> &Self::Key;

    fn comments(&self) -> &[Comment];

    fn comments_mut(&mut self) -> &mut Vec<Comment>;

    /// Consume the entity, keeping only its comments
    fn into_comments(self) -> Vec<Comment>
    where
        Self: Sized;

    /// Whether the key identifies this entity in other documents
    fn is_matchable(&self) -> bool {
        true
    }

    /// Whether this entity's comments may be merged into another document
    fn contributes_comments(&self) -> bool {
        self.is_matchable()
    }

    /// Whether a comment with exactly this text is already attached
    fn has_comment_text(&self, text: &str) -> bool {
        self.comments().iter().any(|c| c.text == text)
    }
}

/// Anything carrying an optional author name
pub trait Attributed {
    fn user_name(&self) -> Option<&str>;

    fn set_user_name(&mut self, user_name: &str);

    /// True when a non-empty author is recorded
    fn is_attributed(&self) -> bool {
        self.user_name().is_some_and(|name| !name.is_empty())
    }

    /// Set the author to `default` if none is recorded; returns whether it
    /// changed. An empty default never changes anything.
    fn attribute_if_absent(&mut self, default: &str) -> bool {
        if default.is_empty() || self.is_attributed() {
            return false;
        }
        self.set_user_name(default);
        true
    }
}

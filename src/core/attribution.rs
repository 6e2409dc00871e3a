//! Default author backfill
//!
//! Comments typed before a user name was set are saved without one. Before
//! two documents are merged, each side's unattributed comments are credited
//! to that side's default user so authorship survives the merge.

use tracing::debug;

use crate::core::entity::{Attributed, Commentable};
use crate::core::workspace::Workspace;
use crate::entities::Comment;

impl Workspace {
    /// Credit every unattributed comment and sticky note to `default_user`
    ///
    /// Existing names are never overwritten, and a missing or empty default
    /// leaves the workspace untouched. Returns the number of items changed.
    pub fn backfill_user_names(&mut self, default_user: Option<&str>) -> usize {
        let Some(default_user) = default_user.filter(|name| !name.is_empty()) else {
            return 0;
        };

        let mut changed = 0;
        for note in &mut self.sticky_notes {
            changed += usize::from(note.attribute_if_absent(default_user));
        }
        for unit in &mut self.process_units {
            changed += backfill(unit.comments_mut(), default_user);
        }
        for stream in &mut self.streams {
            changed += backfill(stream.comments_mut(), default_user);
        }
        for equation in &mut self.equations {
            changed += backfill(equation.comments_mut(), default_user);
        }
        changed += backfill(self.degrees_of_freedom.comments_mut(), default_user);

        debug!(user = default_user, changed, "backfilled user names");
        changed
    }
}

fn backfill(comments: &mut [Comment], default_user: &str) -> usize {
    comments
        .iter_mut()
        .map(|comment| comment.attribute_if_absent(default_user))
        .filter(|changed| *changed)
        .count()
}

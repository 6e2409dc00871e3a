//! Comment merging between two copies of a document
//!
//! Merging is not commutative. One document is the parent and everything it
//! holds is kept as is. The child only contributes comments attached to
//! entities the parent also has (matched by id), plus free-floating sticky
//! notes the parent does not already show at the same place. Units, streams
//! and equations are never created or removed.

use std::collections::HashMap;
use std::fmt;
use std::io::{Read, Write};

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::core::entity::Commentable;
use crate::core::workspace::Workspace;
use crate::entities::StickyNote;
use crate::xml::DocumentError;

/// Which input of a merge a document came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Parent,
    Child,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Parent => f.write_str("parent"),
            Side::Child => f.write_str("child"),
        }
    }
}

/// Merge failures
#[derive(Debug, Error, Diagnostic)]
pub enum MergeError {
    #[error("no {argument} stream was supplied")]
    #[diagnostic(
        code(chemprov::merge::invalid_argument),
        help("a merge needs a parent, a child and an output")
    )]
    InvalidArgument { argument: &'static str },

    #[error("failed to load the {side} document")]
    #[diagnostic(code(chemprov::merge::load))]
    Load {
        side: Side,
        #[source]
        #[diagnostic_source]
        source: DocumentError,
    },

    #[error("failed to write the merged document")]
    #[diagnostic(code(chemprov::merge::save))]
    Save {
        #[source]
        #[diagnostic_source]
        source: DocumentError,
    },
}

/// Outcome of merging one kind of comment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryReport {
    /// Child comments appended to the parent
    pub added: usize,
    /// Child comments dropped because the parent already had the text
    pub duplicates: usize,
    /// Child entities with no counterpart in the parent
    pub unmatched: usize,
}

impl CategoryReport {
    fn accumulate(&mut self, other: CategoryReport) {
        self.added += other.added;
        self.duplicates += other.duplicates;
        self.unmatched += other.unmatched;
    }
}

/// What a merge did to the parent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// Child documents merged in
    pub children: usize,
    /// Comments and notes given a default author, both sides
    pub backfilled: usize,
    pub sticky_notes: CategoryReport,
    pub process_units: CategoryReport,
    pub streams: CategoryReport,
    pub equations: CategoryReport,
    pub degrees_of_freedom: CategoryReport,
    /// Child analysis comments thrown away because the analysis text differed
    pub dof_discarded: usize,
}

impl MergeReport {
    /// Comments and notes added to the parent across all categories
    pub fn total_added(&self) -> usize {
        self.sticky_notes.added
            + self.process_units.added
            + self.streams.added
            + self.equations.added
            + self.degrees_of_freedom.added
    }

    pub fn accumulate(&mut self, other: &MergeReport) {
        self.children += other.children;
        self.backfilled += other.backfilled;
        self.sticky_notes.accumulate(other.sticky_notes);
        self.process_units.accumulate(other.process_units);
        self.streams.accumulate(other.streams);
        self.equations.accumulate(other.equations);
        self.degrees_of_freedom.accumulate(other.degrees_of_freedom);
        self.dof_discarded += other.dof_discarded;
    }
}

/// Merges one or more child workspaces into a parent
#[derive(Debug)]
pub struct CommentMerger {
    parent: Workspace,
    report: MergeReport,
}

impl CommentMerger {
    /// Take ownership of the parent, crediting its unattributed comments to
    /// `parent_user`
    pub fn new(mut parent: Workspace, parent_user: Option<&str>) -> Self {
        let backfilled = parent.backfill_user_names(parent_user);
        Self {
            parent,
            report: MergeReport {
                backfilled,
                ..MergeReport::default()
            },
        }
    }

    /// Merge one child into the parent and return what changed
    pub fn absorb(&mut self, mut child: Workspace, child_user: Option<&str>) -> MergeReport {
        let mut report = MergeReport {
            children: 1,
            backfilled: child.backfill_user_names(child_user),
            ..MergeReport::default()
        };

        let Workspace {
            process_units,
            streams,
            equations,
            sticky_notes,
            degrees_of_freedom,
            ..
        } = child;

        report.sticky_notes = merge_sticky_notes(&mut self.parent.sticky_notes, sticky_notes);
        report.process_units = merge_comments(&mut self.parent.process_units, process_units);
        report.streams = merge_comments(&mut self.parent.streams, streams);
        report.equations = merge_comments(&mut self.parent.equations, equations);

        // The analysis has no id, so its text stands in for one
        let parent_dof = &mut self.parent.degrees_of_freedom;
        if parent_dof.key() == degrees_of_freedom.key() {
            report.degrees_of_freedom =
                merge_comments(std::slice::from_mut(parent_dof), vec![degrees_of_freedom]);
        } else {
            report.dof_discarded = degrees_of_freedom.comments().len();
            if report.dof_discarded > 0 {
                debug!(
                    discarded = report.dof_discarded,
                    "degrees-of-freedom text differs, child comments discarded"
                );
            }
        }

        self.report.accumulate(&report);
        report
    }

    /// Totals across every child merged so far
    pub fn report(&self) -> &MergeReport {
        &self.report
    }

    pub fn finish(self) -> (Workspace, MergeReport) {
        (self.parent, self.report)
    }
}

/// Append child comments to matching parent entities
///
/// Child entities are visited in document order and their comments appended
/// in order. A comment whose text the parent entity already holds, including
/// one appended earlier in this pass, is dropped.
pub fn merge_comments<E: Commentable>(parent: &mut [E], child: Vec<E>) -> CategoryReport {
    let mut index: HashMap<E::Key, usize> = HashMap::with_capacity(parent.len());
    for (i, entity) in parent.iter().enumerate() {
        if entity.is_matchable() {
            index.entry(entity.key().clone()).or_insert(i);
        }
    }

    let mut report = CategoryReport::default();
    for entity in child {
        let key = entity.key().clone();
        if !entity.contributes_comments() {
            debug!(kind = E::KIND, key = %key, "not comparable across documents, skipping");
            report.unmatched += 1;
            continue;
        }
        let Some(&i) = index.get(&key) else {
            debug!(kind = E::KIND, key = %key, "no counterpart in parent, skipping");
            report.unmatched += 1;
            continue;
        };

        let target = &mut parent[i];
        for comment in entity.into_comments() {
            if target.has_comment_text(&comment.text) {
                report.duplicates += 1;
            } else {
                debug!(kind = E::KIND, key = %key, text = %comment.text, "adding comment");
                target.comments_mut().push(comment);
                report.added += 1;
            }
        }
    }
    report
}

/// Append child notes not already present at the same place with the same text
pub fn merge_sticky_notes(parent: &mut Vec<StickyNote>, child: Vec<StickyNote>) -> CategoryReport {
    let mut report = CategoryReport::default();
    for note in child {
        if parent.iter().any(|existing| existing.same_note(&note)) {
            report.duplicates += 1;
        } else {
            debug!(text = %note.text, x = note.geometry.x, y = note.geometry.y, "adding sticky note");
            parent.push(note);
            report.added += 1;
        }
    }
    report
}

/// Merge the comments of `child` into `parent` and write the result
///
/// Both documents are read completely before anything is written, so a
/// malformed input leaves `output` untouched.
pub fn merge(
    parent: impl Read,
    parent_user: Option<&str>,
    child: impl Read,
    child_user: Option<&str>,
    output: impl Write,
) -> Result<MergeReport, MergeError> {
    let parent = Workspace::load(parent, "parent").map_err(|source| MergeError::Load {
        side: Side::Parent,
        source,
    })?;
    let child = Workspace::load(child, "child").map_err(|source| MergeError::Load {
        side: Side::Child,
        source,
    })?;

    let mut merger = CommentMerger::new(parent, parent_user);
    merger.absorb(child, child_user);
    let (merged, report) = merger.finish();

    merged
        .save(output)
        .map_err(|source| MergeError::Save { source })?;

    info!(
        added = report.total_added(),
        backfilled = report.backfilled,
        "merge complete"
    );
    Ok(report)
}

/// Builder form of [`merge`] for callers that collect the streams piecemeal
#[derive(Default)]
pub struct MergeRequest<'a> {
    parent: Option<Box<dyn Read + 'a>>,
    parent_user: Option<String>,
    child: Option<Box<dyn Read + 'a>>,
    child_user: Option<String>,
    output: Option<Box<dyn Write + 'a>>,
}

impl<'a> MergeRequest<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parent(mut self, reader: impl Read + 'a) -> Self {
        self.parent = Some(Box::new(reader));
        self
    }

    pub fn parent_user(mut self, name: impl Into<String>) -> Self {
        self.parent_user = Some(name.into());
        self
    }

    pub fn child(mut self, reader: impl Read + 'a) -> Self {
        self.child = Some(Box::new(reader));
        self
    }

    pub fn child_user(mut self, name: impl Into<String>) -> Self {
        self.child_user = Some(name.into());
        self
    }

    pub fn output(mut self, writer: impl Write + 'a) -> Self {
        self.output = Some(Box::new(writer));
        self
    }

    /// Check every stream is present, then merge
    pub fn run(self) -> Result<MergeReport, MergeError> {
        let parent = self
            .parent
            .ok_or(MergeError::InvalidArgument { argument: "parent" })?;
        let child = self
            .child
            .ok_or(MergeError::InvalidArgument { argument: "child" })?;
        let output = self
            .output
            .ok_or(MergeError::InvalidArgument { argument: "output" })?;

        merge(
            parent,
            self.parent_user.as_deref(),
            child,
            self.child_user.as_deref(),
            output,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::{StreamId, UnitId};
    use crate::entities::{Comment, DegreesOfFreedom, Geometry, ProcessUnit, Stream};

    fn unit(n: u32, comments: &[&str]) -> ProcessUnit {
        let mut unit = ProcessUnit::new(UnitId::numbered(n), "Mixer", &format!("M{n}"));
        for text in comments {
            unit.comments_mut()
                .push(Comment::new(*text).placed(Geometry::default()));
        }
        unit
    }

    fn texts<E: Commentable>(entity: &E) -> Vec<&str> {
        entity.comments().iter().map(|c| c.text.as_str()).collect()
    }

    fn with_units(units: Vec<ProcessUnit>) -> Workspace {
        let mut ws = Workspace::new();
        for unit in units {
            ws.add_process_unit(unit);
        }
        ws
    }

    fn run(parent: Workspace, child: Workspace) -> (Workspace, MergeReport) {
        let mut merger = CommentMerger::new(parent, None);
        merger.absorb(child, None);
        merger.finish()
    }

    // =========================================================================
    // Entity comments
    // =========================================================================

    #[test]
    fn test_duplicate_text_is_not_added_again() {
        let parent = with_units(vec![unit(1, &["A"])]);
        let child = with_units(vec![unit(1, &["A", "B"])]);

        let (merged, report) = run(parent, child);

        assert_eq!(texts(&merged.process_units()[0]), vec!["A", "B"]);
        assert_eq!(report.process_units.added, 1);
        assert_eq!(report.process_units.duplicates, 1);
    }

    #[test]
    fn test_unit_missing_from_parent_is_dropped() {
        let parent = with_units(vec![unit(1, &[])]);
        let child = with_units(vec![unit(9, &["orphan"])]);

        let (merged, report) = run(parent, child);

        assert!(merged.process_unit(&UnitId::numbered(9)).is_none());
        assert!(merged.process_units()[0].comments().is_empty());
        assert_eq!(report.process_units.unmatched, 1);
        let saved = String::from_utf8(merged.to_bytes().unwrap()).unwrap();
        assert!(!saved.contains("orphan"));
        assert!(!saved.contains("GPU_9"));
    }

    #[test]
    fn test_author_is_not_part_of_equality() {
        let mut parent = with_units(vec![unit(1, &[])]);
        parent.process_units[0]
            .comments_mut()
            .push(Comment::new("same").by("alice"));
        let mut child = with_units(vec![unit(1, &[])]);
        child.process_units[0]
            .comments_mut()
            .push(Comment::new("same").by("bob"));

        let (merged, _) = run(parent, child);

        let comments = merged.process_units()[0].comments();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].user_name.as_deref(), Some("alice"));
    }

    #[test]
    fn test_repeated_child_text_is_added_once() {
        let parent = with_units(vec![unit(1, &[])]);
        let child = with_units(vec![unit(1, &["B", "C", "B"])]);

        let (merged, _) = run(parent, child);
        assert_eq!(texts(&merged.process_units()[0]), vec!["B", "C"]);
    }

    #[test]
    fn test_existing_parent_duplicates_are_kept() {
        let parent = with_units(vec![unit(1, &["A", "A"])]);
        let child = with_units(vec![unit(1, &["A", "B"])]);

        let (merged, _) = run(parent, child);
        assert_eq!(texts(&merged.process_units()[0]), vec!["A", "A", "B"]);
    }

    #[test]
    fn test_appended_in_child_order() {
        let parent = with_units(vec![unit(1, &["x"]), unit(2, &[])]);
        let child = with_units(vec![unit(2, &["p", "q"]), unit(1, &["z", "y", "x"])]);

        let (merged, _) = run(parent, child);
        assert_eq!(texts(&merged.process_units()[0]), vec!["x", "z", "y"]);
        assert_eq!(texts(&merged.process_units()[1]), vec!["p", "q"]);
    }

    #[test]
    fn test_stream_comments_merge_by_id() {
        let mut parent = with_units(vec![unit(1, &[]), unit(2, &[])]);
        let mut child = parent.clone();
        let mut stream = Stream::new(
            StreamId::numbered(1),
            "Chemical",
            &UnitId::numbered(1),
            &UnitId::numbered(2),
        );
        parent.add_stream(stream.clone());
        stream
            .comments_mut()
            .push(Comment::new("flow rate?").by("bob").placed(Geometry::at(4.0, 4.0)));
        child.add_stream(stream);

        let (merged, report) = run(parent, child);

        let merged_stream = merged.stream(&StreamId::numbered(1)).unwrap();
        assert_eq!(texts(merged_stream), vec!["flow rate?"]);
        assert_eq!(merged_stream.comments()[0].geometry, Some(Geometry::at(4.0, 4.0)));
        assert_eq!(report.streams.added, 1);
    }

    #[test]
    fn test_equation_comments_merge_by_id() {
        let mut parent = Workspace::new();
        let first = parent.add_equation("F1 = F2").unwrap();
        parent.add_equation("F2 = 10").unwrap();

        let mut child = Workspace::new();
        child.add_equation("F1 = F2").unwrap();
        let second = child.add_equation("F2 = 10").unwrap();
        child.add_equation("F3 = 0").unwrap();
        for eq in child.equations.iter_mut() {
            let text = format!("check {}", eq.id());
            eq.comments_mut().push(Comment::new(text));
        }

        let (merged, report) = run(parent, child);

        assert_eq!(merged.equations().len(), 2);
        assert_eq!(texts(merged.equation(first).unwrap()), vec!["check 1"]);
        assert_eq!(texts(merged.equation(second).unwrap()), vec!["check 2"]);
        assert_eq!(report.equations.unmatched, 1);
    }

    fn with_equation_rows(rows: &str) -> Workspace {
        let source = format!(
            "<ProcessFlowDiagram><DrawingCanvas><ProcessUnits/><Streams/><StickyNotes/></DrawingCanvas>\
             <EquationEditor><Equations>{rows}</Equations></EquationEditor></ProcessFlowDiagram>"
        );
        Workspace::parse(&source, "equations.cpml").unwrap()
    }

    #[test]
    fn test_unassigned_equation_ids_never_match_across_documents() {
        let parent = with_equation_rows(r#"<EquationModel Id="0"><Equation>A = B</Equation></EquationModel>"#);
        let child = with_equation_rows(
            r#"<EquationModel Id="0"><Equation>C = D</Equation><Annotation>about C = D</Annotation></EquationModel>"#,
        );
        // Both rows get id 1 locally
        assert_eq!(parent.equations()[0].id(), child.equations()[0].id());

        let (merged, report) = run(parent, child);

        assert!(merged.equations()[0].comments().is_empty());
        assert_eq!(report.equations.added, 0);
        assert_eq!(report.equations.unmatched, 1);
        let saved = String::from_utf8(merged.to_bytes().unwrap()).unwrap();
        assert!(!saved.contains("about C = D"));
    }

    #[test]
    fn test_saved_equation_ids_match_after_reload() {
        let parent = with_equation_rows(r#"<EquationModel Id="0"><Equation>A = B</Equation></EquationModel>"#);
        let saved = String::from_utf8(parent.to_bytes().unwrap()).unwrap();
        let parent = Workspace::parse(&saved, "parent.cpml").unwrap();
        let child = with_equation_rows(
            r#"<EquationModel Id="1"><Equation>A = B</Equation><Annotation>fine</Annotation></EquationModel>"#,
        );

        let (merged, report) = run(parent, child);

        assert_eq!(texts(&merged.equations()[0]), vec!["fine"]);
        assert_eq!(report.equations.added, 1);
    }

    #[test]
    fn test_child_equation_without_text_contributes_nothing() {
        let parent = with_equation_rows(r#"<EquationModel Id="4"><Equation>A = B</Equation></EquationModel>"#);
        let child = with_equation_rows(
            r#"<EquationModel Id="4"><Equation/><Annotation>stale note</Annotation></EquationModel>"#,
        );

        let (merged, report) = run(parent, child);

        assert!(merged.equations()[0].comments().is_empty());
        assert_eq!(report.equations.unmatched, 1);
    }

    // =========================================================================
    // Degrees of freedom
    // =========================================================================

    fn with_dof(text: &str, comments: &[&str]) -> Workspace {
        let mut ws = Workspace::new();
        *ws.degrees_of_freedom_mut() = DegreesOfFreedom::new(text);
        for c in comments {
            ws.degrees_of_freedom_mut().comments_mut().push(Comment::new(*c));
        }
        ws
    }

    #[test]
    fn test_dof_comments_merge_when_text_matches() {
        let (merged, report) = run(
            with_dof("Balanced", &["ok"]),
            with_dof("Balanced", &["ok", "nice work"]),
        );
        assert_eq!(texts(merged.degrees_of_freedom()), vec!["ok", "nice work"]);
        assert_eq!(report.dof_discarded, 0);
    }

    #[test]
    fn test_dof_comments_discarded_when_text_differs() {
        let (merged, report) = run(
            with_dof("Balanced", &[]),
            with_dof("Unbalanced", &["nice work"]),
        );
        assert!(merged.degrees_of_freedom().comments().is_empty());
        assert_eq!(merged.degrees_of_freedom().text(), "Balanced");
        assert_eq!(report.dof_discarded, 1);
    }

    #[test]
    fn test_dof_text_must_match_exactly() {
        let (merged, _) = run(
            with_dof("Balanced", &[]),
            with_dof("Balanced ", &["trailing space"]),
        );
        assert!(merged.degrees_of_freedom().comments().is_empty());
    }

    // =========================================================================
    // Sticky notes
    // =========================================================================

    #[test]
    fn test_sticky_note_dedup_by_text_and_location() {
        let mut parent = Workspace::new();
        parent.add_sticky_note(StickyNote::new("x", 10.0, 10.0));
        let mut child = Workspace::new();
        child.add_sticky_note(StickyNote::new("x", 10.0, 10.0));
        child.add_sticky_note(StickyNote::new("y", 20.0, 20.0));

        let (merged, report) = run(parent, child);

        let notes: Vec<(&str, f64, f64)> = merged
            .sticky_notes()
            .iter()
            .map(|n| (n.text.as_str(), n.geometry.x, n.geometry.y))
            .collect();
        assert_eq!(notes, vec![("x", 10.0, 10.0), ("y", 20.0, 20.0)]);
        assert_eq!(report.sticky_notes.added, 1);
        assert_eq!(report.sticky_notes.duplicates, 1);
    }

    #[test]
    fn test_note_saved_as_comment_element_is_not_duplicated() {
        let doc = |note: &str| {
            format!(
                "<ProcessFlowDiagram><DrawingCanvas><ProcessUnits/><Streams/><StickyNotes>{note}</StickyNotes></DrawingCanvas>\
                 <EquationEditor><Equations/></EquationEditor></ProcessFlowDiagram>"
            )
        };
        let location = "<Location><X>10</X><Y>10</Y></Location><Content>x</Content><Size>100,100</Size>";
        let parent = Workspace::parse(&doc(&format!("<Comment>{location}</Comment>")), "parent.cpml").unwrap();
        let child = Workspace::parse(&doc(&format!("<StickyNote>{location}</StickyNote>")), "child.cpml").unwrap();

        let (merged, report) = run(parent, child);

        assert_eq!(merged.sticky_notes().len(), 1);
        assert_eq!(report.sticky_notes.duplicates, 1);
        let saved = String::from_utf8(merged.to_bytes().unwrap()).unwrap();
        assert_eq!(saved.matches("<Content>x</Content>").count(), 1);
    }

    #[test]
    fn test_moved_note_is_a_new_note() {
        let mut parent = Workspace::new();
        parent.add_sticky_note(StickyNote::new("x", 10.0, 10.0));
        let mut child = Workspace::new();
        child.add_sticky_note(StickyNote::new("x", 15.0, 10.0));

        let (merged, _) = run(parent, child);
        assert_eq!(merged.sticky_notes().len(), 2);
    }

    // =========================================================================
    // Attribution
    // =========================================================================

    #[test]
    fn test_each_side_backfilled_with_its_own_default() {
        let parent = with_units(vec![unit(1, &["A"])]);
        let child = with_units(vec![unit(1, &["B"])]);

        let mut merger = CommentMerger::new(parent, Some("teacher"));
        merger.absorb(child, Some("student"));
        let (merged, report) = merger.finish();

        let authors: Vec<Option<&str>> = merged.process_units()[0]
            .comments()
            .iter()
            .map(|c| c.user_name.as_deref())
            .collect();
        assert_eq!(authors, vec![Some("teacher"), Some("student")]);
        assert_eq!(report.backfilled, 2);
    }

    #[test]
    fn test_empty_default_leaves_names_empty() {
        let parent = with_units(vec![unit(1, &[])]);
        let child = with_units(vec![unit(1, &["B"])]);

        let mut merger = CommentMerger::new(parent, Some(""));
        merger.absorb(child, Some(""));
        let (merged, _) = merger.finish();

        assert_eq!(merged.process_units()[0].comments()[0].user_name, None);
    }

    // =========================================================================
    // Whole-merge properties
    // =========================================================================

    #[test]
    fn test_merge_is_additive() {
        let mut parent = with_units(vec![unit(1, &["A", "B"]), unit(2, &["C"])]);
        parent.add_equation("x = 1").unwrap();
        let mut child = with_units(vec![unit(2, &["C", "D"]), unit(3, &["E"])]);
        child.add_equation("x = 1").unwrap();
        child.add_equation("y = 2").unwrap();
        let before = parent.clone();

        let (merged, _) = run(parent, child);

        assert_eq!(merged.process_units().len(), before.process_units().len());
        assert_eq!(merged.streams().len(), before.streams().len());
        assert_eq!(merged.equations().len(), before.equations().len());
        for (old, new) in before.process_units().iter().zip(merged.process_units()) {
            assert_eq!(old.id(), new.id());
            assert!(new.comments().len() >= old.comments().len());
            assert!(new.comments().starts_with(old.comments()));
        }
    }

    #[test]
    fn test_multiple_children_accumulate() {
        let parent = with_units(vec![unit(1, &["A"])]);
        let mut merger = CommentMerger::new(parent, None);
        merger.absorb(with_units(vec![unit(1, &["B"])]), None);
        merger.absorb(with_units(vec![unit(1, &["B", "C"])]), None);

        assert_eq!(merger.report().children, 2);
        assert_eq!(merger.report().process_units.added, 2);
        assert_eq!(merger.report().process_units.duplicates, 1);
        let (merged, _) = merger.finish();
        assert_eq!(texts(&merged.process_units()[0]), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_merging_twice_adds_nothing_new() {
        let parent = with_units(vec![unit(1, &["A"])]);
        let child = with_units(vec![unit(1, &["B"])]);

        let (once, _) = run(parent, child.clone());
        let once_bytes = once.to_bytes().unwrap();
        let (twice, report) = run(once, child);

        assert_eq!(twice.to_bytes().unwrap(), once_bytes);
        assert_eq!(report.total_added(), 0);
    }

    // =========================================================================
    // Stream API
    // =========================================================================

    #[test]
    fn test_merge_streams() {
        let parent = with_units(vec![unit(1, &["A"])]).to_bytes().unwrap();
        let child = with_units(vec![unit(1, &["A", "B"])]).to_bytes().unwrap();
        let mut output = Vec::new();

        let report = merge(
            parent.as_slice(),
            Some("p"),
            child.as_slice(),
            Some("c"),
            &mut output,
        )
        .unwrap();

        assert_eq!(report.process_units.added, 1);
        let merged = Workspace::load(output.as_slice(), "out").unwrap();
        let comments = merged.process_units()[0].comments();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[1].user_name.as_deref(), Some("c"));
    }

    #[test]
    fn test_malformed_child_names_side_and_writes_nothing() {
        let parent = Workspace::new().to_bytes().unwrap();
        let mut output = Vec::new();

        let err = merge(
            parent.as_slice(),
            None,
            "<ProcessFlowDiagram>".as_bytes(),
            None,
            &mut output,
        )
        .unwrap_err();

        assert!(matches!(err, MergeError::Load { side: Side::Child, .. }));
        assert!(err.to_string().contains("child"));
        assert!(output.is_empty());
    }

    #[test]
    fn test_malformed_parent_is_reported() {
        let child = Workspace::new().to_bytes().unwrap();
        let err = merge(
            "<Other/>".as_bytes(),
            None,
            child.as_slice(),
            None,
            Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, MergeError::Load { side: Side::Parent, .. }));
    }

    #[test]
    fn test_request_requires_every_stream() {
        let doc = Workspace::new().to_bytes().unwrap();

        let err = MergeRequest::new()
            .child(doc.as_slice())
            .output(Vec::new())
            .run()
            .unwrap_err();
        assert!(matches!(err, MergeError::InvalidArgument { argument: "parent" }));

        let err = MergeRequest::new()
            .parent(doc.as_slice())
            .child(doc.as_slice())
            .run()
            .unwrap_err();
        assert!(matches!(err, MergeError::InvalidArgument { argument: "output" }));
    }

    #[test]
    fn test_request_runs_merge() {
        let parent = with_units(vec![unit(1, &[])]).to_bytes().unwrap();
        let child = with_units(vec![unit(1, &["hello"])]).to_bytes().unwrap();
        let mut output = Vec::new();

        let report = MergeRequest::new()
            .parent(parent.as_slice())
            .child(child.as_slice())
            .child_user("sam")
            .output(&mut output)
            .run()
            .unwrap();

        assert_eq!(report.total_added(), 1);
        assert!(String::from_utf8(output).unwrap().contains("<UserName>sam</UserName>"));
    }
}

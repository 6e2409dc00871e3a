//! Structural checks on a loaded workspace
//!
//! The merge matches entities by id and assumes streams connect units that
//! exist. Documents edited by hand or by older versions can break either
//! assumption; these checks report where.

use std::collections::HashSet;

use thiserror::Error;

use crate::core::identity::{EquationId, StreamId, UnitId};
use crate::core::workspace::Workspace;

/// A problem found in a workspace
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Issue {
    #[error("process unit id {0} is used more than once")]
    DuplicateUnitId(UnitId),

    #[error("stream id {0} is used more than once")]
    DuplicateStreamId(StreamId),

    #[error("equation id {0} is used more than once")]
    DuplicateEquationId(EquationId),

    #[error("stream {stream} {end} references missing process unit {unit}")]
    DanglingEndpoint {
        stream: StreamId,
        end: &'static str,
        unit: UnitId,
    },
}

/// Run every check, returning issues in document order
pub fn check(workspace: &Workspace) -> Vec<Issue> {
    let mut issues = Vec::new();

    let mut units = HashSet::new();
    for unit in workspace.process_units() {
        if !units.insert(unit.id()) {
            issues.push(Issue::DuplicateUnitId(unit.id().clone()));
        }
    }

    let mut streams = HashSet::new();
    for stream in workspace.streams() {
        if !streams.insert(stream.id()) {
            issues.push(Issue::DuplicateStreamId(stream.id().clone()));
        }

        let endpoints = [("source", stream.source()), ("destination", stream.destination())];
        for (end, unit) in endpoints {
            if let Some(unit) = unit.filter(|unit| !units.contains(unit)) {
                issues.push(Issue::DanglingEndpoint {
                    stream: stream.id().clone(),
                    end,
                    unit,
                });
            }
        }
    }

    let mut equations = HashSet::new();
    for equation in workspace.equations() {
        if !equations.insert(equation.id()) {
            issues.push(Issue::DuplicateEquationId(equation.id()));
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{ProcessUnit, Stream};

    fn unit(n: u32) -> ProcessUnit {
        ProcessUnit::new(UnitId::numbered(n), "Mixer", "M")
    }

    #[test]
    fn test_clean_workspace_has_no_issues() {
        let mut ws = Workspace::new();
        ws.add_process_unit(unit(1));
        ws.add_process_unit(unit(2));
        ws.add_stream(Stream::new(
            StreamId::numbered(1),
            "Chemical",
            &UnitId::numbered(1),
            &UnitId::numbered(2),
        ));
        ws.add_equation("a = b").unwrap();
        assert!(check(&ws).is_empty());
    }

    #[test]
    fn test_duplicate_unit_id() {
        let mut ws = Workspace::new();
        ws.add_process_unit(unit(1));
        ws.add_process_unit(unit(1));
        assert_eq!(check(&ws), vec![Issue::DuplicateUnitId(UnitId::numbered(1))]);
    }

    #[test]
    fn test_dangling_endpoint() {
        let mut ws = Workspace::new();
        ws.add_process_unit(unit(1));
        ws.add_stream(Stream::new(
            StreamId::numbered(4),
            "Heat",
            &UnitId::numbered(1),
            &UnitId::numbered(7),
        ));

        let issues = check(&ws);
        assert_eq!(
            issues,
            vec![Issue::DanglingEndpoint {
                stream: StreamId::numbered(4),
                end: "destination",
                unit: UnitId::numbered(7),
            }]
        );
        assert_eq!(
            issues[0].to_string(),
            "stream S_4 destination references missing process unit GPU_7"
        );
    }

    #[test]
    fn test_duplicate_equation_id_from_document() {
        let source = r#"<ProcessFlowDiagram>
            <DrawingCanvas><ProcessUnits/><Streams/><StickyNotes/></DrawingCanvas>
            <EquationEditor><Equations>
                <EquationModel Id="3"><Equation>a</Equation></EquationModel>
                <EquationModel Id="3"><Equation>b</Equation></EquationModel>
            </Equations></EquationEditor>
        </ProcessFlowDiagram>"#;
        let ws = Workspace::parse(source, "dup.cpml").unwrap();

        let issues = check(&ws);
        assert_eq!(issues.len(), 1);
        assert!(matches!(issues[0], Issue::DuplicateEquationId(id) if id.get() == 3));
    }
}

//! `chemprov comments` command - List the comments in a document

use clap::ValueEnum;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{display_user, load_workspace, single_line, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Commentable, Config, Workspace};

#[derive(clap::Args, Debug)]
pub struct CommentsArgs {
    /// Document to read
    pub file: PathBuf,

    /// Only list comments of this kind
    #[arg(long, short = 'k', value_enum)]
    pub kind: Option<CommentKind>,

    /// Only list comments by this author
    #[arg(long, short = 'a')]
    pub author: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommentKind {
    /// Comments on process units
    Unit,
    /// Comments on streams
    Stream,
    /// Equation annotations
    Equation,
    /// Comments on the degrees-of-freedom analysis
    Dof,
    /// Free-floating sticky notes
    Note,
}

impl CommentKind {
    fn as_str(self) -> &'static str {
        match self {
            CommentKind::Unit => "unit",
            CommentKind::Stream => "stream",
            CommentKind::Equation => "equation",
            CommentKind::Dof => "dof",
            CommentKind::Note => "note",
        }
    }
}

/// One listed comment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentRow {
    pub kind: &'static str,
    /// Id of the commented entity; empty for sticky notes and the analysis
    pub owner: String,
    pub author: Option<String>,
    pub text: String,
}

pub fn run(args: CommentsArgs, global: &GlobalOpts) -> Result<()> {
    let workspace = load_workspace(&args.file)?;
    let config = Config::load();

    let rows: Vec<CommentRow> = collect_rows(&workspace)
        .into_iter()
        .filter(|row| args.kind.map_or(true, |kind| row.kind == kind.as_str()))
        .filter(|row| {
            args.author
                .as_deref()
                .map_or(true, |author| row.author.as_deref() == Some(author))
        })
        .collect();

    let format = global
        .format
        .resolve(config.default_format.as_deref(), OutputFormat::Tsv);
    let mut stdout = std::io::stdout().lock();

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&rows).into_diagnostic()?;
            writeln!(stdout, "{json}").into_diagnostic()?;
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&rows).into_diagnostic()?;
            write!(stdout, "{yaml}").into_diagnostic()?;
        }
        OutputFormat::Csv => write_csv(&rows, &mut stdout)?,
        OutputFormat::Md => {
            writeln!(stdout, "{}", markdown_table(&rows)).into_diagnostic()?;
        }
        OutputFormat::Tsv | OutputFormat::Auto => {
            writeln!(
                stdout,
                "{}",
                style(format!("{:<9}\t{:<8}\t{:<12}\tTEXT", "KIND", "OWNER", "AUTHOR")).bold()
            )
            .into_diagnostic()?;
            for row in &rows {
                writeln!(
                    stdout,
                    "{:<9}\t{:<8}\t{:<12}\t{}",
                    row.kind,
                    row.owner,
                    display_user(row.author.as_deref()),
                    single_line(&row.text)
                )
                .into_diagnostic()?;
            }
            if !global.quiet {
                writeln!(
                    stdout,
                    "\n{} comment(s) found",
                    style(rows.len()).cyan()
                )
                .into_diagnostic()?;
            }
        }
    }

    Ok(())
}

/// Every comment and sticky note in document order
pub fn collect_rows(workspace: &Workspace) -> Vec<CommentRow> {
    let mut rows = Vec::new();
    entity_rows(workspace.process_units(), &mut rows);
    entity_rows(workspace.streams(), &mut rows);
    entity_rows(workspace.equations(), &mut rows);

    for comment in workspace.degrees_of_freedom().comments() {
        rows.push(CommentRow {
            kind: CommentKind::Dof.as_str(),
            owner: String::new(),
            author: comment.user_name.clone(),
            text: comment.text.clone(),
        });
    }

    for note in workspace.sticky_notes() {
        rows.push(CommentRow {
            kind: CommentKind::Note.as_str(),
            owner: String::new(),
            author: note.user_name.clone(),
            text: note.text.clone(),
        });
    }

    rows
}

fn entity_rows<E: Commentable>(entities: &[E], rows: &mut Vec<CommentRow>) {
    for entity in entities {
        for comment in entity.comments() {
            rows.push(CommentRow {
                kind: E::KIND,
                owner: entity.key().to_string(),
                author: comment.user_name.clone(),
                text: comment.text.clone(),
            });
        }
    }
}

fn write_csv(rows: &[CommentRow], out: impl Write) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for row in rows {
        writer.serialize(row).into_diagnostic()?;
    }
    writer.flush().into_diagnostic()?;
    Ok(())
}

fn markdown_table(rows: &[CommentRow]) -> String {
    let mut table = Builder::default();
    table.push_record(["Kind", "Owner", "Author", "Comment"]);
    for row in rows {
        table.push_record([
            row.kind.to_string(),
            row.owner.clone(),
            display_user(row.author.as_deref()).to_string(),
            truncate_str(&single_line(&row.text), 60),
        ]);
    }
    table.build().with(Style::markdown()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::UnitId;
    use crate::entities::{Comment, Geometry, ProcessUnit, StickyNote};

    fn workspace() -> Workspace {
        let mut ws = Workspace::new();
        let mut unit = ProcessUnit::new(UnitId::numbered(1), "Mixer", "M1");
        unit.comments_mut().push(
            Comment::new("Check the split, please")
                .by("alice")
                .placed(Geometry::default()),
        );
        ws.add_process_unit(unit);

        let id = ws.add_equation("F1 = F2").unwrap();
        ws.equation_mut(id)
            .unwrap()
            .comments_mut()
            .push(Comment::new("Units?"));

        let mut note = StickyNote::new("Basis: 100 mol", 0.0, 0.0);
        note.user_name = Some("ta".to_string());
        ws.add_sticky_note(note);
        ws
    }

    #[test]
    fn test_rows_in_document_order() {
        let rows = collect_rows(&workspace());
        let kinds: Vec<&str> = rows.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec!["unit", "equation", "note"]);
        assert_eq!(rows[0].owner, "GPU_1");
        assert_eq!(rows[1].owner, "1");
        assert_eq!(rows[1].author, None);
    }

    #[test]
    fn test_csv_output() {
        let mut buf = Vec::new();
        write_csv(&collect_rows(&workspace()), &mut buf).unwrap();

        insta::assert_snapshot!(String::from_utf8(buf).unwrap(), @r#"
        kind,owner,author,text
        unit,GPU_1,alice,"Check the split, please"
        equation,1,,Units?
        note,,ta,Basis: 100 mol
        "#);
    }

    #[test]
    fn test_markdown_table_has_header() {
        let table = markdown_table(&collect_rows(&workspace()));
        assert!(table.contains("| Kind"));
        assert!(table.contains("GPU_1"));
        assert!(table.lines().count() >= 5);
    }
}

//! `chemprov merge` command - Merge comments between document copies

use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

use crate::cli::helpers::load_workspace;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{CategoryReport, CommentMerger, Config, MergeError, MergeReport};

#[derive(clap::Args, Debug)]
pub struct MergeArgs {
    /// Parent document; everything in it is kept
    pub parent: PathBuf,

    /// Child documents to take comments from, merged in order
    #[arg(required = true)]
    pub children: Vec<PathBuf>,

    /// Write the merged document to this file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Author for unattributed parent comments (default: config user_name)
    #[arg(long)]
    pub parent_user: Option<String>,

    /// Author for unattributed child comments (default: config child_user_name)
    #[arg(long)]
    pub child_user: Option<String>,

    /// Merge and report without writing the result
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: MergeArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let parent_user = args.parent_user.clone().or(config.user_name);
    let child_user = args.child_user.clone().or(config.child_user_name);

    // Every document is loaded before anything is written
    let parent = load_workspace(&args.parent)?;
    let mut merger = CommentMerger::new(parent, parent_user.as_deref());
    for path in &args.children {
        let child = load_workspace(path)?;
        let report = merger.absorb(child, child_user.as_deref());
        info!(
            child = %path.display(),
            added = report.total_added(),
            "merged child document"
        );
    }
    let (merged, report) = merger.finish();

    let summary = render_report(&report, &args, global)?;

    if args.dry_run {
        if !global.quiet {
            print!("{summary}");
        }
        return Ok(());
    }

    let bytes = merged
        .to_bytes()
        .map_err(|source| MergeError::Save { source })?;

    match &args.output {
        Some(path) => {
            fs::write(path, &bytes).into_diagnostic()?;
            if !global.quiet {
                print!("{summary}");
            }
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes).into_diagnostic()?;
            stdout.flush().into_diagnostic()?;
            // stdout carries the document, so the report goes to stderr
            if !global.quiet {
                eprint!("{summary}");
            }
        }
    }

    Ok(())
}

fn render_report(report: &MergeReport, args: &MergeArgs, global: &GlobalOpts) -> Result<String> {
    match global.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report).into_diagnostic()?;
            Ok(format!("{json}\n"))
        }
        OutputFormat::Yaml => serde_yml::to_string(report).into_diagnostic(),
        _ => Ok(render_summary(report, args)),
    }
}

fn render_summary(report: &MergeReport, args: &MergeArgs) -> String {
    let mut out = String::new();

    let verb = if args.dry_run { "Would merge" } else { "Merged" };
    out.push_str(&format!(
        "{} {} {} child document(s) into {}\n",
        style("✓").green(),
        verb,
        report.children,
        style(args.parent.display()).cyan()
    ));

    let rows: [(&str, &CategoryReport); 5] = [
        ("Sticky notes", &report.sticky_notes),
        ("Process units", &report.process_units),
        ("Streams", &report.streams),
        ("Equations", &report.equations),
        ("DOF analysis", &report.degrees_of_freedom),
    ];
    for (label, category) in rows {
        out.push_str(&format!(
            "  {:<15} {} added, {} duplicate(s), {} unmatched\n",
            label,
            style(category.added).green(),
            category.duplicates,
            category.unmatched
        ));
    }

    if report.backfilled > 0 {
        out.push_str(&format!(
            "  {} unattributed comment(s) credited to a default author\n",
            style(report.backfilled).cyan()
        ));
    }
    if report.dof_discarded > 0 {
        out.push_str(&format!(
            "{} {} degrees-of-freedom comment(s) discarded: analysis text differs\n",
            style("!").yellow(),
            report.dof_discarded
        ));
    }

    out.push_str(&format!(
        "  {} {} comment(s) added in total\n",
        style("→").blue(),
        report.total_added()
    ));
    out
}

//! `chemprov validate` command - Check documents load and hold consistent ids

use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::load_workspace;
use crate::cli::GlobalOpts;
use crate::core::check;

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Documents to validate
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Continue validation after first error
    #[arg(long)]
    pub keep_going: bool,

    /// Show summary only, don't show individual errors
    #[arg(long)]
    pub summary: bool,
}

/// Validation statistics
#[derive(Default)]
struct ValidationStats {
    files_checked: usize,
    files_passed: usize,
    files_failed: usize,
    total_issues: usize,
}

pub fn run(args: ValidateArgs, global: &GlobalOpts) -> Result<()> {
    let mut stats = ValidationStats::default();
    let quiet = global.quiet || args.summary;

    if !global.quiet {
        println!(
            "{} Validating {} file(s)...\n",
            style("→").blue(),
            args.paths.len()
        );
    }

    for path in &args.paths {
        stats.files_checked += 1;

        let workspace = match load_workspace(path) {
            Ok(ws) => ws,
            Err(report) => {
                stats.files_failed += 1;
                stats.total_issues += 1;
                if !quiet {
                    println!("{} {}", style("✗").red(), path.display());
                    // Print detailed error using miette
                    println!("{:?}", report);
                }
                if !args.keep_going {
                    break;
                }
                continue;
            }
        };

        let issues = check(&workspace);
        if issues.is_empty() {
            stats.files_passed += 1;
            if !quiet {
                println!("{} {}", style("✓").green(), path.display());
            }
            continue;
        }

        stats.files_failed += 1;
        stats.total_issues += issues.len();
        if !quiet {
            println!(
                "{} {} - {} issue(s)",
                style("✗").red(),
                path.display(),
                issues.len()
            );
            for issue in &issues {
                println!("    {}", style(issue).yellow());
            }
        }
        if !args.keep_going {
            break;
        }
    }

    if !global.quiet {
        println!();
        println!("{}", style("─".repeat(60)).dim());
        println!("{}", style("Validation Summary").bold());
        println!("{}", style("─".repeat(60)).dim());
        println!("  Files checked:  {}", style(stats.files_checked).cyan());
        println!("  Files passed:   {}", style(stats.files_passed).green());
        println!("  Files failed:   {}", style(stats.files_failed).red());
        println!("  Total issues:   {}", style(stats.total_issues).red());
        println!();
    }

    match stats.files_failed {
        0 => {
            if !global.quiet {
                println!("{} All files passed validation!", style("✓").green().bold());
            }
            Ok(())
        }
        1 => Err(miette::miette!("Validation failed: 1 file has errors")),
        n => Err(miette::miette!("Validation failed: {} files have errors", n)),
    }
}

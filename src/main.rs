use clap::Parser;
use miette::Result;
use chemprov::cli::{logging, Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    logging::init(&global);

    match cli.command {
        Commands::Merge(args) => chemprov::cli::commands::merge::run(args, &global),
        Commands::Comments(args) => chemprov::cli::commands::comments::run(args, &global),
        Commands::Validate(args) => chemprov::cli::commands::validate::run(args, &global),
        Commands::Config(cmd) => chemprov::cli::commands::config::run(cmd),
        Commands::Completions(args) => chemprov::cli::commands::completions::run(args),
    }
}

#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use lineage_core::config::{self, ProjectConfig};
use output::{CliError, OutputMode, Reported, fail, render_error, resolve_output_mode};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "lineage: resolve every account's full chain of parents",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format: pretty, text or json.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Project config file (defaults to ./lineage.toml when present).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Resolve",
        about = "Print every entity with its ancestors",
        long_about = "Read one sheet, build the child to parent relation and print each entity's full set of ancestors as `id : a,b,c`.",
        after_help = "EXAMPLES:\n    # Resolve the only sheet of a workbook\n    lineage resolve accounts.csv\n\n    # Pick a sheet from a directory workbook\n    lineage resolve book/ --sheet \"Sales Hierarchy File\"\n\n    # Show why rows were skipped\n    lineage resolve accounts.csv --diagnostics\n\n    # Emit machine-readable output\n    lineage resolve accounts.csv --format json"
    )]
    Resolve(cmd::resolve::ResolveArgs),

    #[command(
        next_help_heading = "Resolve",
        about = "Walk one entity up to its root",
        long_about = "Print the ancestors of a single entity: the chain through its current parent, nearest first, followed by any ancestors contributed only by earlier rows for the same id. The full list matches the entity's line in `lineage resolve`.",
        after_help = "EXAMPLES:\n    # Show the chain above entity 1003\n    lineage ancestors accounts.csv 1003\n\n    # Emit machine-readable output\n    lineage ancestors accounts.csv 1003 --format json"
    )]
    Ancestors(cmd::ancestors::AncestorsArgs),

    #[command(
        next_help_heading = "Inspect",
        about = "List parent loops",
        long_about = "List every group of entities whose parents form a loop.",
        after_help = "EXAMPLES:\n    # Report loops instead of failing on the first one\n    lineage cycles accounts.csv"
    )]
    Cycles(cmd::cycles::CyclesArgs),

    #[command(
        next_help_heading = "Inspect",
        about = "List the sheets of a workbook",
        after_help = "EXAMPLES:\n    # List sheets of a directory workbook\n    lineage sheets book/"
    )]
    Sheets(cmd::sheets::SheetsArgs),

    #[command(
        next_help_heading = "Inspect",
        about = "Find a row by its leading cell",
        long_about = "Locate the first unmarked row whose leading cell equals KEY and print its cells.",
        after_help = "EXAMPLES:\n    # Show the row for an account name\n    lineage find accounts.csv \"Acme Corp\"\n\n    # Show only the next two cells\n    lineage find accounts.csv \"Acme Corp\" --width 2"
    )]
    Find(cmd::find::FindArgs),

    #[command(
        next_help_heading = "Setup",
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n    # Install bash completions\n    lineage completions bash > ~/.local/share/bash-completion/completions/lineage"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("LINEAGE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "lineage=debug,info"
        } else {
            "lineage=info,warn"
        })
    });

    let format = env::var("LINEAGE_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn load_project_config(cli: &Cli, output: OutputMode) -> anyhow::Result<ProjectConfig> {
    let project_root = env::current_dir()?;
    config::load_project_config(&project_root, cli.config.as_deref())
        .map_err(|err| fail(output, err.error_code(), &err))
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let user = config::load_user_config().unwrap_or_else(|err| {
        tracing::warn!(%err, "ignoring unreadable user config");
        config::UserConfig::default()
    });
    let output = resolve_output_mode(cli.format, cli.json, user.output.as_deref());

    let result = match &cli.command {
        Commands::Resolve(args) => {
            let project = load_project_config(cli, output)?;
            cmd::resolve::run_resolve(args, &project, output)
        }
        Commands::Ancestors(args) => {
            let project = load_project_config(cli, output)?;
            cmd::ancestors::run_ancestors(args, &project, output)
        }
        Commands::Cycles(args) => {
            let project = load_project_config(cli, output)?;
            cmd::cycles::run_cycles(args, &project, output)
        }
        Commands::Find(args) => {
            let project = load_project_config(cli, output)?;
            cmd::find::run_find(args, &project, output)
        }
        Commands::Sheets(args) => cmd::sheets::run_sheets(args, output),
        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args, &mut command)
        }
    };

    result.map_err(|err| {
        if err.is::<Reported>() {
            return err;
        }
        if let Err(render_err) = render_error(output, &CliError::new(format!("{err:#}"))) {
            return render_err;
        }
        anyhow::Error::new(Reported)
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if err.is::<Reported>() => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

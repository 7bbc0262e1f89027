//! `codemap` CLI: the data surface as JSON on stdout. The interactive
//! treemap lives in the `codemap-tui` binary.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use codemap::api::{Service, TreeQuery};
use codemap::error::Result;
use codemap::remote::RepoRef;
use codemap::scanner::default_ignore_list;

#[derive(Parser)]
#[command(name = "codemap", version, about = "Git-aware codebase treemap data")]
struct Cli {
    /// Local repository path.
    #[arg(long, global = true, default_value = ".")]
    repo: PathBuf,

    /// GitHub repository (owner/repo, owner/repo@branch, or URL). Overrides
    /// --repo. Set GITHUB_TOKEN to raise the API rate limit.
    #[arg(long, global = true)]
    github: Option<String>,

    /// Log filter, e.g. `debug` or `codemap=trace`. CODEMAP_LOG also works.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct QueryArgs {
    /// Snapshot at this commit instead of the working tree.
    #[arg(long)]
    commit: Option<String>,

    /// Diff base; statuses come from base..commit.
    #[arg(long, requires = "commit")]
    base: Option<String>,

    /// Range start (YYYY-MM-DD, inclusive).
    #[arg(long, requires = "end_date")]
    start_date: Option<NaiveDate>,

    /// Range end (YYYY-MM-DD, inclusive).
    #[arg(long, requires = "start_date")]
    end_date: Option<NaiveDate>,

    /// Folder names to exclude, replacing the built-in list.
    #[arg(long)]
    ignore: Vec<String>,
}

impl QueryArgs {
    fn into_query(self) -> TreeQuery {
        TreeQuery {
            commit: self.commit,
            base: self.base,
            range: self.start_date.zip(self.end_date),
            ignore: if self.ignore.is_empty() {
                default_ignore_list()
            } else {
                self.ignore
            },
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// List recent commits.
    Commits,
    /// Print the raw file tree, with git statuses.
    Data(QueryArgs),
    /// Per-file change counts over a trailing day window.
    Activity {
        #[arg(long, default_value_t = 30)]
        days: u32,
    },
    /// Per-file added/removed line counts.
    FileStats(QueryArgs),
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_env("CODEMAP_LOG")
            .unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .with_writer(std::io::stderr)
        .init();
}

fn service_for(cli: &Cli) -> Result<Service> {
    match &cli.github {
        Some(spec) => {
            let repo: RepoRef = spec.parse()?;
            Service::remote(repo, std::env::var("GITHUB_TOKEN").ok())
        }
        None => Ok(Service::local(&cli.repo)),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let service = service_for(&cli)?;
    match cli.command {
        Command::Commits => print_json(&service.commits()?),
        Command::Data(args) => print_json(&service.data(&args.into_query())),
        Command::Activity { days } => print_json(&service.activity(days)?),
        Command::FileStats(args) => print_json(&service.file_stats(&args.into_query())?),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

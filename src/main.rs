//! snap-staging: command-line front end for the staging guard.
//!
//! Every command prints one JSON document on stdout. Rejected requests print
//! the `{"error", "message"}` body and exit with status 1; configuration and
//! local I/O problems go to stderr with status 2.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::warn;

use snap_staging::config::Config;
use snap_staging::constants::STAGING_DISPLAY_PREFIX;
use snap_staging::logging;
use snap_staging::request::{RepoFetchRequest, SnapshotQuery};
use snap_staging::security::{ValidationError, validate_project_id};
use snap_staging::staging::{self, StagingArea};

#[derive(Parser, Debug)]
#[command(name = "snap-staging")]
#[command(version, about = "Per-project staging area with path-escape protection")]
struct Cli {
    /// Config file (defaults to ./snap.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload one file into a project's staging directory
    Upload {
        /// Project identifier
        #[arg(short, long)]
        project: String,

        /// Relative filename inside the project (e.g. src/main.py)
        #[arg(short, long)]
        file: String,

        /// Inline content
        #[arg(long, conflicts_with = "from", required_unless_present = "from")]
        content: Option<String>,

        /// Read content from a local file (sent base64-encoded)
        #[arg(long)]
        from: Option<PathBuf>,

        /// Content encoding for --content: utf-8 or base64
        #[arg(short, long, default_value = "utf-8")]
        encoding: String,
    },
    /// List files staged for a project
    Info {
        #[arg(short, long)]
        project: String,
    },
    /// Remove every staged file of a project
    Clear {
        #[arg(short, long)]
        project: String,
    },
    /// Delete a project's staging directory
    Delete {
        #[arg(short, long)]
        project: String,
    },
    /// Validate a request without touching the staging tree
    #[command(subcommand)]
    Check(CheckCommand),
}

#[derive(Subcommand, Debug)]
enum CheckCommand {
    /// Repository fetch request
    Repo {
        #[arg(long)]
        url: String,
        #[arg(short, long)]
        project: String,
        #[arg(short, long)]
        vendor: String,
        #[arg(short, long)]
        branch: Option<String>,
    },
    /// Snapshot query filter
    Query {
        #[arg(short, long)]
        project: String,
        #[arg(short = 't', long)]
        snapshot_type: Option<String>,
        #[arg(short, long)]
        file_path: Option<String>,
    },
    /// Staging path for a project and filename
    Path {
        #[arg(short, long)]
        project: String,
        #[arg(short, long)]
        file: String,
    },
}

/// Outcome of a command: printed on stdout either way.
enum Outcome {
    Ok(Value),
    Rejected(staging::Error),
}

impl Outcome {
    fn from_result<T: Serialize>(result: staging::Result<T>) -> Result<Self> {
        match result {
            Ok(value) => Ok(Self::Ok(
                serde_json::to_value(value).context("Failed to serialize result")?,
            )),
            Err(e) => Ok(Self::Rejected(e)),
        }
    }

    fn from_validation(result: Result<Value, ValidationError>, operation: &'static str) -> Self {
        match result {
            Ok(value) => Self::Ok(value),
            Err(e) => {
                let e = staging::Error::from(e);
                e.log(operation);
                Self::Rejected(e)
            },
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.json_logs);

    match run(cli).await {
        Ok(Outcome::Ok(value)) => {
            println!("{value:#}");
            ExitCode::SUCCESS
        },
        Ok(Outcome::Rejected(e)) => {
            println!("{:#}", e.to_json());
            ExitCode::FAILURE
        },
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        },
    }
}

async fn run(cli: Cli) -> Result<Outcome> {
    let Cli {
        config, command, ..
    } = cli;

    match command {
        Command::Upload {
            project,
            file,
            content,
            from,
            encoding,
        } => {
            let area = open_area(config.as_deref())?;
            let (content, encoding) = match from {
                Some(path) => {
                    let bytes = std::fs::read(&path)
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    (STANDARD.encode(bytes), "base64".to_string())
                },
                None => (content.unwrap_or_default(), encoding),
            };
            Outcome::from_result(area.upload_async(project, file, content, encoding).await)
        },
        Command::Info { project } => {
            let area = open_area(config.as_deref())?;
            Outcome::from_result(area.info_async(project).await)
        },
        Command::Clear { project } => {
            let area = open_area(config.as_deref())?;
            Outcome::from_result(area.clear_async(project).await)
        },
        Command::Delete { project } => {
            let area = open_area(config.as_deref())?;
            Outcome::from_result(area.delete_async(project).await)
        },
        Command::Check(CheckCommand::Path { project, file }) => {
            let area = open_area(config.as_deref())?;
            Outcome::from_result(check_path(&area, &project, &file))
        },
        Command::Check(CheckCommand::Repo {
            url,
            project,
            vendor,
            branch,
        }) => Ok(check_repo(&url, &project, &vendor, branch.as_deref())),
        Command::Check(CheckCommand::Query {
            project,
            snapshot_type,
            file_path,
        }) => Ok(check_query(
            &project,
            snapshot_type.as_deref(),
            file_path.as_deref(),
        )),
    }
}

/// Loads and validates the config, then opens the staging area it names.
fn open_area(path: Option<&Path>) -> Result<StagingArea> {
    let config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let validation = config.validate()?;
    for warning in &validation.warnings {
        warn!("{warning}");
    }

    StagingArea::open(&config.staging)
}

/// Runs the full guard chain without writing. Only the display path is
/// printed; the staging root stays private.
fn check_path(area: &StagingArea, project: &str, file: &str) -> staging::Result<Value> {
    let result = validate_project_id(project).and_then(|pid| {
        let filename = area.guard().sanitize_filename(file)?;
        area.guard().resolve(&pid, &filename)?;
        Ok(json!({
            "status": "valid",
            "path": format!("{STAGING_DISPLAY_PREFIX}/{pid}/{filename}"),
        }))
    });
    result.map_err(staging::Error::from).inspect_err(|e| e.log("check_path"))
}

/// Validates a repository fetch request. Never touches the staging tree.
fn check_repo(url: &str, project: &str, vendor: &str, branch: Option<&str>) -> Outcome {
    let result = RepoFetchRequest::new(url, project, vendor, branch).map(|req| {
        req.audit();
        json!({ "status": "valid", "request": req })
    });
    Outcome::from_validation(result, "check_repo")
}

fn check_query(project: &str, snapshot_type: Option<&str>, file_path: Option<&str>) -> Outcome {
    let result = SnapshotQuery::new(project, snapshot_type, file_path)
        .map(|query| json!({ "status": "valid", "query": query }));
    Outcome::from_validation(result, "check_query")
}

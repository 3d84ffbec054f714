use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use report::{covered_lines, TestResult};
use selector::{
    git, ProcessRunner, SelectionContext, SelectorConfig, SelectorError, SelectorResult,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "selector")]
#[command(about = "Run the Jest suites affected by a set of changed files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Select the affected suites, run them and report the results
    Run {
        #[command(flatten)]
        selection: SelectionArgs,
        /// Runner binary (default: node_modules/.bin/jest)
        #[arg(long)]
        bin: Option<PathBuf>,
        /// Kill the runner after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
        /// Run every suite instead of the affected ones
        #[arg(long)]
        all: bool,
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Show the affected suites without running them
    Affected {
        #[command(flatten)]
        selection: SelectionArgs,
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Args)]
struct SelectionArgs {
    /// Changed files, relative to the project root or absolute
    paths: Vec<PathBuf>,
    /// Project root (default: current directory)
    #[arg(long)]
    root: Option<PathBuf>,
    /// Config file (default: <root>/.selector.toml)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Include pattern, overriding the config file
    #[arg(long)]
    include: Option<String>,
    /// Test directory name; repeat for several
    #[arg(long = "test-dir")]
    test_dirs: Vec<String>,
    /// Add files changed in the git working copy
    #[arg(long)]
    from_git: bool,
    /// Add files changed since this git revision
    #[arg(long)]
    base: Option<String>,
    /// Force coverage collection on
    #[arg(long, conflicts_with = "no_coverage")]
    coverage: bool,
    /// Turn coverage collection off
    #[arg(long)]
    no_coverage: bool,
    /// Increase log verbosity
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

impl Commands {
    fn verbosity(&self) -> u8 {
        match self {
            Commands::Run { selection, .. } | Commands::Affected { selection, .. } => {
                selection.verbose
            }
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = match cli.command.verbosity() {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let code = match execute(cli.command).await {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            if let SelectorError::MalformedReport { stderr, .. } = &e {
                if !stderr.is_empty() {
                    eprintln!("Runner stderr:\n{}", stderr);
                }
            }
            2
        }
    };

    std::process::exit(code);
}

async fn execute(command: Commands) -> SelectorResult<i32> {
    match command {
        Commands::Run {
            selection,
            bin,
            timeout,
            all,
            format,
        } => {
            let (root, mut config, paths) = prepare(&selection)?;
            if let Some(bin) = bin {
                config.bin = Some(bin);
            }
            if timeout.is_some() {
                config.timeout_secs = timeout;
            }
            if all {
                config.run_all = true;
            }

            let runner = ProcessRunner::new().with_timeout(config.timeout());
            let mut context = SelectionContext::new(root, config)?;
            match context.run(&paths, &runner).await {
                Ok(results) => {
                    print_results(&results, format)?;
                    Ok(if results.iter().all(TestResult::is_pass) { 0 } else { 1 })
                }
                Err(e) if e.is_no_effect() => {
                    print_no_effect(&e, format);
                    Ok(0)
                }
                Err(e) => Err(e),
            }
        }
        Commands::Affected { selection, format } => {
            let (root, config, paths) = prepare(&selection)?;
            let mut context = SelectionContext::new(root, config)?;
            match context.select(&paths) {
                Ok(_) => {
                    print_affected(&context, format)?;
                    Ok(0)
                }
                Err(e) if e.is_no_effect() => {
                    print_no_effect(&e, format);
                    Ok(0)
                }
                Err(e) => Err(e),
            }
        }
    }
}

fn prepare(selection: &SelectionArgs) -> SelectorResult<(PathBuf, SelectorConfig, Vec<PathBuf>)> {
    let root = match &selection.root {
        Some(root) => root.clone(),
        None => std::env::current_dir()?,
    };

    let mut config = SelectorConfig::load(&root, selection.config.as_deref())?;
    if let Some(include) = &selection.include {
        config.include = Some(include.clone());
    }
    if !selection.test_dirs.is_empty() {
        config.test_dirs = selection.test_dirs.clone();
    }
    if selection.coverage {
        config.coverage = Some(true);
    } else if selection.no_coverage {
        config.coverage = Some(false);
    }

    let mut paths = selection.paths.clone();
    if selection.from_git || selection.base.is_some() {
        paths.extend(git_changes(&root, selection)?);
    }
    let mut seen = std::collections::HashSet::new();
    paths.retain(|p| seen.insert(p.clone()));

    info!("{} changed paths", paths.len());
    Ok((root, config, paths))
}

fn git_changes(root: &Path, selection: &SelectionArgs) -> SelectorResult<Vec<PathBuf>> {
    let repo_root = git::repository_root(root)
        .and_then(|p| p.canonicalize().ok())
        .unwrap_or_else(|| root.to_path_buf());
    let mut changes = Vec::new();
    if selection.from_git {
        changes.extend(git::working_copy_changes(root)?);
    }
    if let Some(base) = &selection.base {
        changes.extend(git::changes_since(root, base)?);
    }
    Ok(changes.into_iter().map(|p| repo_root.join(p)).collect())
}

fn print_no_effect(e: &SelectorError, format: OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", e),
        OutputFormat::Json => println!("[]"),
    }
}

fn print_results(results: &[TestResult], format: OutputFormat) -> SelectorResult<()> {
    if format == OutputFormat::Json {
        println!("{}", to_json(results)?);
        return Ok(());
    }

    for result in results {
        println!(
            "{} {} ({:.2}s)",
            result.status.as_str(),
            result.name,
            result.duration_seconds
        );
        for line in &result.detail_lines {
            println!("{}", line);
        }
        if !result.failure_message.is_empty() {
            println!("{}", result.failure_message);
        }
    }

    if let Some(coverage) = results.first().and_then(|r| r.coverage.as_ref()) {
        println!("\nCoverage:");
        for (file, markers) in coverage {
            println!("  {}: {}/{} lines", file, covered_lines(markers), markers.len());
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct AffectedOutput<'a> {
    entries: &'a [selector::AffectedTestEntry],
    suites: Vec<String>,
    command: String,
}

fn print_affected(context: &SelectionContext, format: OutputFormat) -> SelectorResult<()> {
    let affected = context.affected();
    let command = context.command();

    if format == OutputFormat::Json {
        let output = AffectedOutput {
            entries: affected.entries(),
            suites: affected.suite_ids(),
            command: command.to_string(),
        };
        println!("{}", to_json(&output)?);
        return Ok(());
    }

    for entry in affected.entries() {
        let path = entry
            .path
            .strip_prefix(context.root())
            .unwrap_or(&entry.path);
        println!("{} -> {}", path.display(), entry.suite);
    }
    println!("\n{}", command);
    Ok(())
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> SelectorResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

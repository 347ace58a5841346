//! Domain Probe CLI Application
//!
//! A command-line interface for checking domain availability through DNS
//! resolution. This CLI application provides a user-friendly interface to the
//! domain-probe-lib library.

mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Parser, Subcommand};
use domain_probe_lib::{
    load_env_config, parse_timeout, Availability, ConfigManager, DomainChecker, DomainProbeError,
    FileConfig, ProbeConfig,
};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// CLI arguments for domain-probe
#[derive(Parser, Debug)]
#[command(name = "domain-probe")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Check domain availability through DNS resolution")]
#[command(
    long_about = "Check whether domain names are registered by resolving them against public DNS servers with failover.\n\nChecks single names, batches, or one name against every known extension, and can stream live progress as JSON lines."
)]
#[command(styles = STYLES)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Use specific config file instead of automatic discovery
    #[arg(long = "config", value_name = "FILE", global = true, help_heading = "Configuration")]
    pub config: Option<PathBuf>,

    /// Extension list file (one extension per line)
    #[arg(long = "extensions", value_name = "FILE", global = true, help_heading = "Configuration")]
    pub extensions: Option<PathBuf>,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose", global = true, help_heading = "Configuration")]
    pub verbose: bool,

    /// Output results in JSON format
    #[arg(short = 'j', long = "json", global = true, help_heading = "Output Format")]
    pub json: bool,

    /// Print the probe history after the command
    #[arg(long = "history", global = true, help_heading = "Output Format")]
    pub history: bool,

    /// Max concurrent probes (default: 10, max: 100)
    #[arg(short = 'c', long = "concurrency", global = true, help_heading = "Performance")]
    pub concurrency: Option<usize>,

    /// Overall per-domain timeout, e.g. "5s", "500ms", "1m"
    #[arg(long = "timeout", value_name = "DURATION", global = true, help_heading = "Performance")]
    pub timeout: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check a single fully-qualified domain
    Check {
        /// Domain to check, e.g. example.com
        domain: String,
    },

    /// Check several domains concurrently
    Bulk {
        /// Domains to check
        domains: Vec<String>,

        /// Input file with domains (one per line)
        #[arg(short = 'f', long = "file", value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Check one name against every known extension
    All {
        /// Base name, e.g. "mybrand" (any extension is ignored)
        name: String,
    },

    /// List known extensions
    Extensions {
        /// Re-read the extension file before listing
        #[arg(long)]
        reload: bool,
    },

    /// Serve a live session: JSON frames in on stdin, out on stdout
    Session,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Install the tracing subscriber. Logs go to stderr so stdout stays clean.
fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(args: Args) -> CliResult<()> {
    let file_config = load_file_config(&args)?;
    let json = args.json
        || file_config
            .defaults
            .as_ref()
            .and_then(|d| d.json)
            .unwrap_or(false);
    let config = build_config(&args, &file_config)?;
    let checker = DomainChecker::new(config)?;

    match &args.command {
        Command::Check { domain } => {
            let check = checker.check_domain(domain).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&check)?);
            } else {
                ui::print_check(&check);
            }
        }
        Command::Bulk { domains, file } => {
            let mut all = domains.clone();
            if let Some(path) = file {
                all.extend(read_domains_from_file(path)?);
            }
            run_bulk(&checker, &all, json).await?;
        }
        Command::All { name } => run_all(&checker, name, json).await?,
        Command::Extensions { reload } => {
            if *reload {
                let count = checker.reload_extensions()?;
                tracing::info!(count, "extensions reloaded");
            }
            let mut extensions = checker.extensions();
            extensions.sort();
            if json {
                println!("{}", serde_json::to_string_pretty(&extensions)?);
            } else {
                ui::print_extensions(&extensions);
            }
        }
        Command::Session => run_session(&checker).await?,
    }

    if args.history {
        let page = checker.history(1, 20);
        if json {
            println!("{}", serde_json::to_string_pretty(&page)?);
        } else {
            ui::print_history(&page);
        }
    }

    Ok(())
}

async fn run_bulk(checker: &DomainChecker, domains: &[String], json: bool) -> CliResult<()> {
    let started = Instant::now();
    if !json {
        ui::print_header(
            &format!("checking {} domains", domains.len()),
            checker.config().concurrency,
        );
    }

    let spinner = if json {
        None
    } else {
        ui::Spinner::start(format!("Checking {} domains...", domains.len()))
    };
    let outcome = checker.check_domains(domains).await;
    if let Some(spinner) = spinner {
        spinner.stop().await;
    }
    let outcome = outcome?;

    if json {
        let body = serde_json::json!({
            "results": outcome.results,
            "failures": outcome.failures,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        ui::print_grouped_results(&outcome.results);
        ui::print_failures(&outcome.failures);

        let count = |status: Availability| {
            outcome.results.iter().filter(|r| r.status == status).count()
        };
        ui::print_summary(
            outcome.total(),
            count(Availability::Available),
            count(Availability::Registered),
            count(Availability::Error) + outcome.failures.len(),
            started.elapsed(),
        );
    }

    // Partial failures make the command fail after everything was shown.
    outcome.into_result()?;
    Ok(())
}

async fn run_all(checker: &DomainChecker, name: &str, json: bool) -> CliResult<()> {
    let total = checker.extensions().len();
    if !json {
        ui::print_header(
            &format!("checking {} extensions", total),
            checker.config().concurrency,
        );
    }

    let spinner = if json {
        None
    } else {
        ui::Spinner::start(format!("Checking {} extensions...", total))
    };
    let report = checker.check_all_extensions(name).await;
    if let Some(spinner) = spinner {
        spinner.stop().await;
    }
    let report = report?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        ui::print_report(&report);
    }
    Ok(())
}

/// Bridge a live session to stdin/stdout, one JSON frame per line.
///
/// Returns once stdin is closed and every check it started has finished.
async fn run_session(checker: &DomainChecker) -> CliResult<()> {
    let (in_tx, in_rx) = mpsc::channel::<String>(16);
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();

    let server = tokio::spawn(checker.session().run(in_rx, out_tx));

    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(frame) = out_rx.recv().await {
            stdout.write_all(frame.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }
        Ok::<(), std::io::Error>(())
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        if in_tx.send(line).await.is_err() {
            break;
        }
    }
    drop(in_tx);

    server.await?;
    writer.await??;
    Ok(())
}

/// Build the checker configuration: CLI > environment > config files > defaults.
fn build_config(args: &Args, file_config: &FileConfig) -> CliResult<ProbeConfig> {
    let mut config = file_config.apply_to(ProbeConfig::default());

    config = load_env_config().apply_to(config);

    if let Some(concurrency) = args.concurrency {
        if concurrency == 0 || concurrency > 100 {
            return Err(DomainProbeError::config("Concurrency must be between 1 and 100").into());
        }
        config = config.with_concurrency(concurrency);
    }
    if let Some(timeout) = &args.timeout {
        let timeout = parse_timeout(timeout).ok_or_else(|| {
            DomainProbeError::config(format!(
                "Invalid timeout '{}'. Use format like '5s', '500ms', '2m'",
                timeout
            ))
        })?;
        config = config.with_timeout(timeout);
    }
    if let Some(path) = &args.extensions {
        config = config.with_extensions_file(path.clone());
    }

    tracing::debug!(?config, "effective configuration");
    Ok(config)
}

/// Explicit `--config`, then `DP_CONFIG`, then automatic discovery.
fn load_file_config(args: &Args) -> CliResult<FileConfig> {
    let manager = ConfigManager::new(args.verbose);

    let explicit = args.config.clone().or_else(|| load_env_config().config);
    match explicit {
        Some(path) => {
            tracing::info!(path = %path.display(), "using explicit config file");
            Ok(manager.load_file(&path)?)
        }
        None => Ok(manager.discover_and_load().unwrap_or_default()),
    }
}

/// Read domains from a file: one per line, `#` starts a comment.
fn read_domains_from_file(path: &Path) -> CliResult<Vec<String>> {
    if !path.exists() {
        return Err(format!("File not found: {}", path.display()).into());
    }

    let content = std::fs::read_to_string(path)?;
    let domains: Vec<String> = content
        .lines()
        .filter_map(|line| line.split('#').next())
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    if domains.is_empty() {
        return Err(format!("No domains found in {}", path.display()).into());
    }
    Ok(domains)
}

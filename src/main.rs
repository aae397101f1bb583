use clap::{Parser, Subcommand};
use colored::*;
use rayon::prelude::*;
use std::env;
use std::path::PathBuf;
use tracing::{debug, info, Level};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

mod ansi;
mod args;
mod config;
mod error;
mod format;
mod report;
mod runner;
mod scan;
mod sources;

use config::Config;
use error::{Error, Result};
use format::Format;
use report::{Record, Report};

/// Recover the javac arguments of every compilation task from a Gradle or
/// Maven build log.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Reduce each argument string to the flags needed to recompile.
    #[arg(long, global = true)]
    filter: bool,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a Gradle project at debug level and scrape its output.
    Gradle {
        /// Project checkout to build.
        project: PathBuf,
        /// Pair `Compiler arguments:` with the line right above it.
        #[arg(long)]
        legacy: bool,
        /// Drop tasks whose source set has no java files.
        #[arg(long)]
        require_sources: bool,
    },
    /// Install a Maven project at debug level and scrape its output.
    Maven {
        /// Project checkout to build.
        project: PathBuf,
        /// Read the arguments after `Command line options:`. Builds serially.
        #[arg(long)]
        options: bool,
    },
    /// Scrape logs captured earlier.
    Scan {
        #[arg(long, value_enum)]
        format: Format,
        #[arg(required = true)]
        logs: Vec<PathBuf>,
    },
}

fn main() {
    let cli = Args::parse();
    init_logging(&cli);
    debug!("arguments: {:?}", cli);

    if let Err(e) = run(&cli) {
        eprintln!("{} {}", "error".red(), e);
        std::process::exit(1);
    }
}

fn run(cli: &Args) -> Result<()> {
    let config = match &cli.config {
        Some(path) => config::read_config(path)?,
        None => Config::default(),
    };

    let records = match &cli.command {
        Commands::Gradle {
            project,
            legacy,
            require_sources,
        } => {
            let format = if *legacy {
                Format::GradleLegacy
            } else {
                Format::Gradle
            };
            let mut records = Vec::new();
            for output in runner::gradle(project, &config.gradle)? {
                records.extend(scrape(format, &output, &config.skip_tasks)?);
            }
            if *require_sources {
                records = sources::retain_with_sources(project, records)?;
            }
            records
        }
        Commands::Maven { project, options } => {
            let format = if *options {
                Format::MavenOptions
            } else {
                Format::Maven
            };
            let parallel = !format.build().serialized();
            let output = runner::maven(project, &config, parallel)?;
            scrape(format, &output, &config.skip_tasks)?
        }
        Commands::Scan { format, logs } => {
            scan_logs(*format, logs, &config.skip_tasks)?
        }
    };

    let mut report = Report { records };
    if cli.filter {
        for r in &mut report.records {
            r.args = args::filter(&r.args).join(" ");
        }
    }
    info!(tasks = report.records.len(), "scraped compiler arguments");
    report.print()
}

/// Strip and scan one captured build output.
fn scrape(format: Format, output: &str, skip: &[String]) -> Result<Vec<Record>> {
    let lines = ansi::lines(output);
    debug!(?format, lines = lines.len(), "scanning build output");
    format::extract_all(format.build().as_mut(), &lines, skip)
}

/// Scrape several captured logs in parallel, keeping their order.
fn scan_logs(
    format: Format,
    logs: &[PathBuf],
    skip: &[String],
) -> Result<Vec<Record>> {
    let per_log = logs
        .par_iter()
        .map(|path| -> Result<Vec<Record>> {
            let data = std::fs::read(path).map_err(|source| Error::File {
                path: path.clone(),
                source,
            })?;
            scrape(format, &String::from_utf8_lossy(&data), skip)
        })
        .collect::<Result<Vec<_>>>()?;

    let mut records: Vec<Record> = per_log.into_iter().flatten().collect();
    if format == Format::Maven {
        format::renumber_blobs(&mut records);
    }
    Ok(records)
}

fn init_logging(cli: &Args) {
    let level = match &cli.log_level {
        Some(level) => parse_level(level),
        None if cli.verbose => Level::DEBUG,
        None => {
            let level = env::var("JAVAC_ARGS_LOG_LEVEL")
                .unwrap_or_else(|_| "info".to_string());
            parse_level(&level)
        }
    };

    let mut filter = EnvFilter::from_default_env();
    if env::var("RUST_LOG").is_err() {
        if let Ok(directive) = format!("javac_args={}", level).parse() {
            filter = filter.add_directive(directive);
        }
    }

    // stdout carries the report
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "{} invalid log level '{}', using info",
                "warning".yellow(),
                level
            );
            Level::INFO
        }
    }
}

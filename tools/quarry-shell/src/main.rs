///
/// quarry shell - Script driver for quarry modules
///
/// Runs a script of SQLite module calls, one JSON object per line, and
/// prints one JSON result per call:
/// - quarry-shell script.jsonl
/// - quarry-shell --config quarry.toml --fail-fast < script.jsonl
///
/// Logging goes to stderr; -v enables debug output, -vv trace output.
///

mod script;

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use quarry_std_sqlite3::{SqliteConfig, SqliteModule};
use tracing::{Level, info};

use script::{Outcome, Runner, ShellError};

#[derive(Parser)]
#[command(name = "quarry-shell")]
#[command(author, version, about = "Run quarry module calls from a script", long_about = None)]
struct Cli {
    /// Script to run; reads stdin when omitted
    script: Option<PathBuf>,

    /// TOML file with a [sqlite] table
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stop at the first failing call with a non-zero exit status
    #[arg(long)]
    fail_fast: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_max_level(level)
        .init();

    match run(&cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(2),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Returns false when `--fail-fast` stopped the run at a failing call
fn run(cli: &Cli) -> Result<bool, ShellError> {
    let config = match &cli.config {
        Some(path) => SqliteConfig::load(path)?,
        None => SqliteConfig::default(),
    };
    let reader: Box<dyn BufRead> = match &cli.script {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut runner = Runner::new(SqliteModule::new(config));
    let mut calls = 0;
    let mut failures = 0;
    for (index, line) in reader.lines().enumerate() {
        match runner.run_line(index + 1, &line?)? {
            Outcome::Skipped => continue,
            Outcome::Value(value) => println!("{}", value),
            Outcome::Failed(error) => {
                println!("{}", error);
                failures += 1;
                if cli.fail_fast {
                    return Ok(false);
                }
            }
        }
        calls += 1;
    }
    info!(calls, failures, "script finished");
    Ok(true)
}

mod debug_report;

use capcollect::{Options, create_collection_with_metrics, summarize};
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "CAPCOLLECT_LOG";

fn main() {
    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    init_tracing();

    let built = match create_collection_with_metrics(&config.options) {
        Ok(built) => built,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    let mut collection = built.collection;
    let summary = summarize(&mut collection);

    if config.json {
        match serde_json::to_string_pretty(&summary) {
            Ok(out) => println!("{out}"),
            Err(err) => {
                eprintln!("error: failed to encode summary: {err}");
                std::process::exit(1);
            }
        }
    } else {
        debug_report::print_build(&summary, &built.metrics, config.color);
    }

    if !summary.unresolved.is_empty() {
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

struct CliConfig {
    options: Options,
    json: bool,
    color: bool,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut options = Options::default();
    let mut resources: Option<PathBuf> = None;
    let mut json = false;
    let mut color = io::stdout().is_terminal();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("capcollect {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--json" => json = true,
            "--no-parent-check" => options.check_parents = false,
            "--version-label" => {
                options.version = args.next().ok_or_else(|| "error: --version-label expects a value".to_string())?;
            }
            _ if arg.starts_with("--version-label=") => {
                options.version = arg.trim_start_matches("--version-label=").to_string();
            }
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                if resources.is_some() {
                    return Err("error: resources directory provided multiple times".to_string());
                }
                resources = Some(PathBuf::from(arg));
            }
        }
    }

    match resources {
        Some(dir) => options.resources_dir = dir,
        None => return Err(format!("error: no resources directory provided\n\n{}", help_text())),
    }

    Ok(CliConfig { options, json, color })
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "capcollect {version}

Loads and validates a capability resource directory.

Usage:
  capcollect [OPTIONS] <resources-dir>

The directory must contain platforms.json, engines.json,
core/default-properties.json, core/default-browser.json and a
user-agents/ tree of division files.

Options:
  --version-label <label>    Version label of the collection.
                             Default: {version}
  --no-parent-check          Skip the check that every Parent is a known key.
  --json                     Print the summary as JSON.
  --color                    Force ANSI color output.
  --no-color                 Disable ANSI color output.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Environment:
  {log_env}             Log filter (tracing EnvFilter syntax). Default: warn

Exit codes:
  0  Success.
  1  Build failed or records failed to resolve.
  2  Invalid arguments.
",
        version = env!("CARGO_PKG_VERSION"),
        log_env = LOG_ENV,
    )
}

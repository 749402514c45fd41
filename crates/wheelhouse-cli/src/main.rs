#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

mod commands;
mod logging;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use wheelhouse_core::{paths, Config};

#[derive(Parser, Debug)]
#[command(name = "wheelhouse")]
#[command(author, version, about = "Resolve releases and dependencies from a PEP 503 simple index", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v INFO, -vv DEBUG, -vvv TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Load configuration from a JSON file (default: user config dir)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Simple index URL (overrides config and WHEELHOUSE_INDEX_URL)
    #[arg(long, global = true, value_name = "URL")]
    index: Option<String>,

    /// Override the cache directory
    #[arg(long, global = true, value_name = "PATH")]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// List the releases of a package, newest first
    Releases {
        /// Package name
        name: String,

        /// Include prereleases
        #[arg(long)]
        pre: bool,

        /// Extra being resolved for
        #[arg(long, value_name = "EXTRA")]
        extra: Option<String>,
    },

    /// Show the declared dependencies of one release
    Deps {
        /// Package name
        name: String,

        /// Exact version
        version: String,

        /// Only show the requirements this extra adds
        #[arg(long, value_name = "EXTRA")]
        extra: Option<String>,
    },

    /// Search the index
    Search {
        /// Search terms
        #[arg(required = true)]
        query: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Explicit --config must exist; the user-level file is optional
    let config = match cli.config.clone().or_else(paths::config_file) {
        Some(path) if cli.config.is_some() || path.is_file() => {
            Config::load(&path).into_diagnostic()?
        }
        _ => Config::default(),
    };
    let mut config = config
        .with_env_overrides()
        .with_verbosity(cli.verbose)
        .with_json_logs(cli.json);
    if let Some(index) = cli.index {
        config = config.with_index_url(index);
    }
    if let Some(dir) = cli.cache_dir {
        config = config.with_cache_dir(dir);
    }

    logging::init(config.log_level(), config.json_logs);
    tracing::debug!(
        index = %config.index_url,
        cache = %config.cache_root().display(),
        "Loaded config"
    );

    match cli.command {
        Some(Commands::Version) | None => commands::version::run(),
        Some(Commands::Releases { name, pre, extra }) => {
            commands::releases::run(&config, &name, pre, extra, cli.json)
        }
        Some(Commands::Deps {
            name,
            version,
            extra,
        }) => commands::deps::run(&config, &name, &version, extra.as_deref(), cli.json),
        Some(Commands::Search { query }) => commands::search::run(&config, &query, cli.json),
    }
}

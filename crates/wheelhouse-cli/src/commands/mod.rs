pub mod deps;
pub mod releases;
pub mod search;
pub mod version;

use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use wheelhouse_core::{Config, RepoError, SimpleRepository};

/// Error info for JSON output.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl From<&RepoError> for ErrorInfo {
    fn from(err: &RepoError) -> Self {
        Self {
            code: err.code(),
            message: err.message().to_string(),
            package: err.package().map(String::from),
            url: err.url().map(String::from),
        }
    }
}

/// Failure result for JSON output (locked format: { ok, error }).
#[derive(Debug, Serialize)]
struct FailureResult {
    ok: bool,
    error: ErrorInfo,
}

/// Report a repository error and exit with code 2.
pub fn fail(err: &RepoError, json: bool) -> ! {
    if json {
        let result = FailureResult {
            ok: false,
            error: ErrorInfo::from(err),
        };
        println!("{}", serde_json::to_string_pretty(&result).unwrap_or_default());
    } else {
        eprintln!("error: {err}");
        if let Some(url) = err.url() {
            eprintln!("  url: {url}");
        }
    }
    std::process::exit(2);
}

/// Open the configured repository, exiting on invalid configuration.
pub fn open_repo(config: &Config, json: bool) -> SimpleRepository {
    SimpleRepository::from_config(config).unwrap_or_else(|e| fail(&e, json))
}

/// Runtime for commands that talk to the index.
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .into_diagnostic()
}

/// Print a JSON result to stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).into_diagnostic()?;
    println!("{json}");
    Ok(())
}

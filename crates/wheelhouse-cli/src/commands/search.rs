use super::{fail, open_repo};
use miette::Result;
use wheelhouse_core::Config;

/// The simple API has no search endpoint; this reports that as a failure.
pub fn run(config: &Config, query: &[String], json: bool) -> Result<()> {
    let repo = open_repo(config, json);
    let terms: Vec<&str> = query.iter().map(String::as_str).collect();

    if let Err(e) = repo.search(&terms) {
        fail(&e, json);
    }
    Ok(())
}

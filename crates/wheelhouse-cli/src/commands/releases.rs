use super::{fail, open_repo, print_json, runtime};
use miette::Result;
use serde::Serialize;
use wheelhouse_core::repo::Release;
use wheelhouse_core::{Config, ReleaseQuery};

/// One release for JSON output.
#[derive(Debug, Serialize)]
struct ReleaseInfo {
    name: String,
    version: String,
    prerelease: bool,
    python: String,
    hashes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    extra: Option<String>,
}

impl From<&Release> for ReleaseInfo {
    fn from(release: &Release) -> Self {
        Self {
            name: release.display_name.clone(),
            version: release.version.to_string(),
            prerelease: release.is_prerelease(),
            python: release.python.to_string(),
            hashes: release.hashes.clone(),
            extra: release.extra.clone(),
        }
    }
}

/// Releases result for JSON output (locked format: { ok, repo, releases }).
#[derive(Debug, Serialize)]
struct ReleasesResult {
    ok: bool,
    repo: String,
    releases: Vec<ReleaseInfo>,
}

pub fn run(
    config: &Config,
    name: &str,
    pre: bool,
    extra: Option<String>,
    json: bool,
) -> Result<()> {
    let repo = open_repo(config, json);

    let mut query = ReleaseQuery::new(name).with_prereleases(pre);
    if let Some(extra) = extra {
        query = query.with_extra(extra);
    }

    let releases = match runtime()?.block_on(repo.get_releases(&query)) {
        Ok(releases) => releases,
        Err(e) => fail(&e, json),
    };

    if json {
        return print_json(&ReleasesResult {
            ok: true,
            repo: repo.pretty_url().to_string(),
            releases: releases.iter().map(ReleaseInfo::from).collect(),
        });
    }

    if releases.is_empty() {
        println!("No releases of {name} on {}", repo.pretty_url());
        return Ok(());
    }
    for release in &releases {
        let marker = if release.is_prerelease() { " (pre)" } else { "" };
        println!(
            "{} {}{marker}  python {}",
            release.display_name, release.version, release.python
        );
    }
    Ok(())
}

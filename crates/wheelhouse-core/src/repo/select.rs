//! Artifact selection for dependency extraction.

use super::convert::ConverterKind;
use super::error::{ExtractError, RepoError};
use super::filename::{canonicalize_name, parse_name};
use super::links::LinkRecord;
use pep440_rs::Version;
use std::future::Future;
use std::str::FromStr;
use tracing::{debug, warn};

/// Artifact preference, most preferred first.
pub const RULES: &[(ConverterKind, &str)] = &[
    (ConverterKind::Wheel, "py3-none-any.whl"),
    (ConverterKind::Wheel, "-none-any.whl"),
    (ConverterKind::Wheel, ".whl"),
    (ConverterKind::Sdist, ".tar.gz"),
    (ConverterKind::Sdist, ".zip"),
];

/// An artifact to try, paired with the converter that reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate<'a> {
    pub kind: ConverterKind,
    pub link: &'a LinkRecord,
}

/// Links whose filename parses to `name` (canonicalized) at `version`.
///
/// Versions are compared under PEP 440, so `1.0` matches `1.0.0`. A version
/// that does not parse only matches the identical string.
#[must_use]
pub fn matching_links<'a>(
    links: &'a [LinkRecord],
    name: &str,
    version: &str,
) -> Vec<&'a LinkRecord> {
    let target = canonicalize_name(name);
    let target_version = Version::from_str(version).ok();

    links
        .iter()
        .filter(|link| {
            let (link_name, link_version) = parse_name(&link.name);
            if canonicalize_name(&link_name) != target {
                return false;
            }
            match (&target_version, Version::from_str(&link_version)) {
                (Some(target), Ok(parsed)) => *target == parsed,
                _ => link_version == version,
            }
        })
        .collect()
}

/// Order `links` by [`RULES`].
///
/// Each link appears once, under the first rule it matches; links matching no
/// rule are left out. Within a rule, listing order is kept.
#[must_use]
pub fn plan<'a>(links: &[&'a LinkRecord]) -> Vec<Candidate<'a>> {
    let mut planned: Vec<Candidate<'a>> = Vec::new();

    for &(kind, suffix) in RULES {
        for &link in links {
            if !link.name.ends_with(suffix) {
                continue;
            }
            if planned.iter().any(|c| std::ptr::eq(c.link, link)) {
                continue;
            }
            planned.push(Candidate { kind, link });
        }
    }

    planned
}

/// Try `candidates` in order and return the first successful extraction.
///
/// `NotFound` failures are logged and skipped; any other failure stops the
/// search. Running out of candidates yields an empty list.
///
/// # Errors
/// Returns the first non-recoverable failure.
pub async fn extract_first<'a, F, Fut>(
    candidates: &[Candidate<'a>],
    mut attempt: F,
) -> Result<Vec<String>, RepoError>
where
    F: FnMut(Candidate<'a>) -> Fut,
    Fut: Future<Output = Result<Vec<String>, ExtractError>>,
{
    for &candidate in candidates {
        debug!(file = %candidate.link.name, kind = %candidate.kind, "Trying artifact");
        match attempt(candidate).await {
            Ok(deps) => {
                debug!(file = %candidate.link.name, count = deps.len(), "Extracted dependencies");
                return Ok(deps);
            }
            Err(ExtractError::NotFound(reason)) => {
                warn!(file = %candidate.link.name, reason = %reason, "Skipping artifact");
            }
            Err(ExtractError::Failed(e)) => return Err(e),
        }
    }

    Ok(Vec::new())
}

//! Requirement parsing and extra filtering for cached dependency lists.

use super::error::RepoError;
use pep508_rs::{ExtraName, Requirement};
use std::str::FromStr;
use tracing::warn;

/// Parse an extra name as given on the command line or in a query.
///
/// # Errors
/// `PKG_INVALID_EXTRA` if `extra` is not a valid PEP 685 name.
pub fn parse_extra(extra: &str) -> Result<ExtraName, RepoError> {
    ExtraName::from_str(extra).map_err(|e| RepoError::invalid_extra(extra, e))
}

/// Parse raw requirement strings and keep the ones that apply to `extra`.
///
/// Without an extra, requirements gated on any extra are dropped. With an
/// extra, only the requirements that extra adds are kept. Environment
/// markers other than `extra` are left for the resolver and do not filter.
/// Strings that do not parse are logged and skipped.
#[must_use]
pub fn convert_deps(
    deps: &[String],
    name: &str,
    version: &str,
    extra: Option<&ExtraName>,
) -> Vec<Requirement> {
    let mut requirements = Vec::with_capacity(deps.len());

    for dep in deps {
        let requirement = match dep.parse::<Requirement>() {
            Ok(requirement) => requirement,
            Err(e) => {
                warn!(
                    package = %name,
                    version = %version,
                    requirement = %dep,
                    error = %e,
                    "Skipping unparsable requirement"
                );
                continue;
            }
        };

        let base = requirement.marker.evaluate_optional_environment(None, &[]);
        let keep = match extra {
            None => base,
            Some(extra) => {
                !base
                    && requirement
                        .marker
                        .evaluate_optional_environment(None, std::slice::from_ref(extra))
            }
        };

        if keep {
            requirements.push(requirement);
        }
    }

    requirements
}

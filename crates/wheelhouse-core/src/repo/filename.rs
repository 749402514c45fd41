//! Package names and artifact filenames.

use regex_lite::Regex;
use std::sync::LazyLock;

static NAME_SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-_.]+").unwrap());

const WHEEL_SUFFIX: &str = ".whl";

/// Normalize a package name for comparison (PEP 503).
///
/// Runs of `-`, `_` and `.` collapse to a single `-` and the result is lowercased.
#[must_use]
pub fn canonicalize_name(name: &str) -> String {
    NAME_SEPARATORS.replace_all(name, "-").to_lowercase()
}

/// Split an artifact filename into `(name, version)`.
///
/// Wheels follow `{name}-{version}(-{build})?-{python}-{abi}-{platform}.whl`.
/// Everything else is treated as a source archive named `{name}-{version}.{ext}`,
/// where the name is the leading run of hyphen-separated tokens that start with
/// a letter. Unrecognised shapes yield empty strings, never an error.
#[must_use]
pub fn parse_name(filename: &str) -> (String, String) {
    let filename = filename.trim();

    if let Some(stem) = filename.strip_suffix(WHEEL_SUFFIX) {
        // Drop python, abi and platform tags
        let head = stem.rsplitn(4, '-').last().unwrap_or_default();
        let (name, version) = head.split_once('-').unwrap_or((head, ""));
        return (name.to_string(), version.to_string());
    }

    let stem = filename.rsplit_once('.').map_or(filename, |(stem, _)| stem);
    let stem = stem.strip_suffix(".tar").unwrap_or(stem);

    let parts: Vec<&str> = stem.split('-').collect();
    let name_len = parts
        .iter()
        .take_while(|part| part.starts_with(|c: char| c.is_ascii_alphabetic()))
        .count();

    (parts[..name_len].join("-"), parts[name_len..].join("-"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(filename: &str) -> (String, String) {
        parse_name(filename)
    }

    #[test]
    fn test_canonicalize_name() {
        assert_eq!(canonicalize_name("Django"), "django");
        assert_eq!(canonicalize_name("zope.interface"), "zope-interface");
        assert_eq!(canonicalize_name("typing__extensions"), "typing-extensions");
        assert_eq!(canonicalize_name("A-_.B"), "a-b");
    }

    #[test]
    fn test_wheel_pure_python() {
        assert_eq!(
            parsed("foo-1.2.3-py3-none-any.whl"),
            ("foo".into(), "1.2.3".into())
        );
    }

    #[test]
    fn test_wheel_with_platform_tags() {
        assert_eq!(
            parsed("numpy-1.26.4-cp312-cp312-manylinux_2_17_x86_64.manylinux2014_x86_64.whl"),
            ("numpy".into(), "1.26.4".into())
        );
    }

    #[test]
    fn test_wheel_with_build_tag() {
        assert_eq!(
            parsed("foo-1.0-1-py3-none-any.whl"),
            ("foo".into(), "1.0-1".into())
        );
    }

    #[test]
    fn test_wheel_underscore_name() {
        assert_eq!(
            parsed("typing_extensions-4.9.0-py3-none-any.whl"),
            ("typing_extensions".into(), "4.9.0".into())
        );
    }

    #[test]
    fn test_wheel_round_trip_is_stable() {
        let (name, version) = parse_name("black-24.1.0-py3-none-any.whl");
        let rebuilt = format!("{name}-{version}-py3-none-any.whl");
        assert_eq!(parse_name(&rebuilt), (name.clone(), version.clone()));
        let again = format!("{name}-{version}-py3-none-any.whl");
        assert_eq!(parse_name(&again), (name, version));
    }

    #[test]
    fn test_sdist_tar_gz() {
        assert_eq!(parsed("foo-2.0a1.tar.gz"), ("foo".into(), "2.0a1".into()));
    }

    #[test]
    fn test_sdist_zip() {
        assert_eq!(parsed("foo-1.0.zip"), ("foo".into(), "1.0".into()));
    }

    #[test]
    fn test_sdist_tar_bz2() {
        assert_eq!(parsed("foo-1.0.tar.bz2"), ("foo".into(), "1.0".into()));
    }

    #[test]
    fn test_sdist_hyphenated_name() {
        assert_eq!(
            parsed("django-rest-framework-3.14.0.tar.gz"),
            ("django-rest-framework".into(), "3.14.0".into())
        );
    }

    #[test]
    fn test_sdist_hyphenated_version() {
        assert_eq!(
            parsed("foo-bar-1.0-dev-2.tar.gz"),
            ("foo-bar".into(), "1.0-dev-2".into())
        );
    }

    #[test]
    fn test_sdist_without_version() {
        assert_eq!(parsed("foo.tar.gz"), ("foo".into(), String::new()));
    }

    #[test]
    fn test_sdist_numeric_name_token() {
        assert_eq!(parsed("1.0.tar.gz"), (String::new(), "1.0".into()));
    }

    #[test]
    fn test_whitespace_trimmed() {
        assert_eq!(parsed("  foo-1.0.zip\n"), ("foo".into(), "1.0".into()));
    }

    #[test]
    fn test_empty_filename() {
        assert_eq!(parsed(""), (String::new(), String::new()));
    }
}

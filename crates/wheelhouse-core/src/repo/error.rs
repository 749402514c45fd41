//! Repository error types.

use std::fmt;
use std::io;

/// Repository error codes.
pub mod codes {
    pub const PKG_NOT_FOUND: &str = "PKG_NOT_FOUND";
    pub const PKG_REGISTRY_ERROR: &str = "PKG_REGISTRY_ERROR";
    pub const PKG_DOWNLOAD_FAILED: &str = "PKG_DOWNLOAD_FAILED";
    pub const PKG_EXTRACT_FAILED: &str = "PKG_EXTRACT_FAILED";
    pub const PKG_CACHE_ERROR: &str = "PKG_CACHE_ERROR";
    pub const PKG_CONFIG_INVALID: &str = "PKG_CONFIG_INVALID";
    pub const PKG_SEARCH_UNSUPPORTED: &str = "PKG_SEARCH_UNSUPPORTED";
    pub const PKG_INVALID_EXTRA: &str = "PKG_INVALID_EXTRA";
}

/// Repository error.
#[derive(Debug)]
pub struct RepoError {
    code: &'static str,
    message: String,
    package: Option<String>,
    url: Option<String>,
}

impl RepoError {
    /// Create a new error with the given code and message.
    #[must_use]
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            package: None,
            url: None,
        }
    }

    /// Get the error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Package the error is about, when known.
    #[must_use]
    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    /// URL that was requested, when known.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Whether the index reported the package as missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.code == codes::PKG_NOT_FOUND
    }

    /// Create a package not found error for the index page at `url`.
    #[must_use]
    pub fn not_found(package: &str, url: &str) -> Self {
        Self {
            code: codes::PKG_NOT_FOUND,
            message: format!("Package not found: {package} ({url})"),
            package: Some(package.to_string()),
            url: Some(url.to_string()),
        }
    }

    /// Create a registry error.
    pub fn registry(msg: impl Into<String>) -> Self {
        Self::new(codes::PKG_REGISTRY_ERROR, msg)
    }

    /// Create a download failed error.
    pub fn download_failed(msg: impl Into<String>) -> Self {
        Self::new(codes::PKG_DOWNLOAD_FAILED, msg)
    }

    /// Create an extraction failed error.
    pub fn extract_failed(msg: impl Into<String>) -> Self {
        Self::new(codes::PKG_EXTRACT_FAILED, msg)
    }

    /// Create a cache error.
    pub fn cache_error(msg: impl Into<String>) -> Self {
        Self::new(codes::PKG_CACHE_ERROR, msg)
    }

    /// Create a config invalid error.
    pub fn config_invalid(msg: impl Into<String>) -> Self {
        Self::new(codes::PKG_CONFIG_INVALID, msg)
    }

    /// Create a search unsupported error.
    #[must_use]
    pub fn search_unsupported(repo: &str) -> Self {
        Self::new(
            codes::PKG_SEARCH_UNSUPPORTED,
            format!("Search is not implemented for simple index '{repo}'"),
        )
    }

    /// Create an invalid extra name error.
    #[must_use]
    pub fn invalid_extra(extra: &str, reason: impl fmt::Display) -> Self {
        Self::new(
            codes::PKG_INVALID_EXTRA,
            format!("Invalid extra name '{extra}': {reason}"),
        )
    }
}

impl fmt::Display for RepoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for RepoError {}

impl From<io::Error> for RepoError {
    fn from(e: io::Error) -> Self {
        Self::new(codes::PKG_CACHE_ERROR, e.to_string())
    }
}

impl From<reqwest::Error> for RepoError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::new(codes::PKG_REGISTRY_ERROR, format!("Request timed out: {e}"))
        } else if e.is_connect() {
            Self::new(codes::PKG_REGISTRY_ERROR, format!("Connection failed: {e}"))
        } else {
            Self::new(codes::PKG_REGISTRY_ERROR, e.to_string())
        }
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(codes::PKG_CACHE_ERROR, format!("Invalid JSON: {e}"))
    }
}

/// Failure while downloading an artifact or reading its metadata.
///
/// `NotFound` covers artifacts that are missing or unreadable; the selector
/// moves on to the next candidate. `Failed` aborts extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Failed(#[from] RepoError),
}

impl ExtractError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

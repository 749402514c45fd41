use std::fmt::Write;

/// The current version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Schema version for the on-disk cache layout.
/// Bump this when changing formats that would break compatibility.
pub const SCHEMA_VERSION: u32 = 1;

/// User agent sent with every index and artifact request.
pub const USER_AGENT: &str = concat!("wheelhouse/", env!("CARGO_PKG_VERSION"));

/// Returns a formatted version string including build metadata if available.
#[must_use]
pub fn version_string() -> String {
    let mut s = format!("wheelhouse {VERSION}");

    if let Some(hash) = option_env!("WHEELHOUSE_BUILD_GIT_HASH") {
        let _ = write!(s, " ({hash})");
    }

    let _ = write!(s, " [cache schema v{SCHEMA_VERSION}]");
    s
}

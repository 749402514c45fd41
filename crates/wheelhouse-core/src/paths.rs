use crate::config::Channel;
use crate::version::SCHEMA_VERSION;
use std::path::PathBuf;

/// Get the cache directory for wheelhouse.
///
/// Uses platform-appropriate locations with versioning:
/// - Linux: `$XDG_CACHE_HOME/wheelhouse/v{N}/{channel}` or `~/.cache/wheelhouse/v{N}/{channel}`
/// - macOS: `~/Library/Caches/wheelhouse/v{N}/{channel}`
/// - Windows: `%LOCALAPPDATA%\wheelhouse\v{N}\{channel}`
#[must_use]
pub fn cache_dir(channel: Channel) -> PathBuf {
    let base = dirs_next::cache_dir().map_or_else(
        || {
            dirs_next::home_dir().map_or_else(
                || PathBuf::from(".wheelhouse-cache"),
                |p| p.join(".cache").join("wheelhouse"),
            )
        },
        |p| p.join("wheelhouse"),
    );

    base.join(format!("v{SCHEMA_VERSION}"))
        .join(channel.as_str())
}

/// File name of the user-level config file.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Default location of the user-level config file, if the platform has a
/// config directory: `<config_dir>/wheelhouse/config.json`.
#[must_use]
pub fn config_file() -> Option<PathBuf> {
    dirs_next::config_dir().map(|dir| dir.join("wheelhouse").join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_dir_contains_version() {
        let dir = cache_dir(Channel::Stable);
        let dir_str = dir.to_string_lossy();
        assert!(dir_str.contains(&format!("v{SCHEMA_VERSION}")));
        assert!(dir_str.contains("stable"));
    }

    #[test]
    fn test_different_channels_different_dirs() {
        let stable = cache_dir(Channel::Stable);
        let nightly = cache_dir(Channel::Nightly);
        let dev = cache_dir(Channel::Dev);

        assert_ne!(stable, nightly);
        assert_ne!(stable, dev);
        assert_ne!(nightly, dev);
    }

    #[test]
    fn test_config_file_name() {
        if let Some(path) = config_file() {
            assert!(path.ends_with("wheelhouse/config.json"));
        }
    }
}

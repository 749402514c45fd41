//! Dependency metadata readers for wheels and source archives.

use super::error::ExtractError;
use flate2::read::GzDecoder;
use std::fmt;
use std::io::{Cursor, Read};
use std::path::{Component, Path};
use std::sync::Arc;
use tar::Archive;
use zip::ZipArchive;

/// Which reader handles an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConverterKind {
    Wheel,
    Sdist,
}

impl fmt::Display for ConverterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Wheel => "wheel",
            Self::Sdist => "sdist",
        })
    }
}

/// Reads the declared requirements out of a downloaded archive.
///
/// Runs on a blocking thread. A missing or unreadable metadata file must be
/// reported as [`ExtractError::NotFound`] so the caller can try another artifact.
pub trait Converter: Send + Sync {
    /// # Errors
    /// `NotFound` if the archive or its metadata is missing or unreadable.
    fn requirements(&self, filename: &str, archive: &[u8]) -> Result<Vec<String>, ExtractError>;
}

/// Converter pair used by the selector.
#[derive(Clone)]
pub struct Converters {
    wheel: Arc<dyn Converter>,
    sdist: Arc<dyn Converter>,
}

impl Converters {
    #[must_use]
    pub fn new(wheel: Arc<dyn Converter>, sdist: Arc<dyn Converter>) -> Self {
        Self { wheel, sdist }
    }

    #[must_use]
    pub fn get(&self, kind: ConverterKind) -> Arc<dyn Converter> {
        match kind {
            ConverterKind::Wheel => Arc::clone(&self.wheel),
            ConverterKind::Sdist => Arc::clone(&self.sdist),
        }
    }
}

impl Default for Converters {
    fn default() -> Self {
        Self::new(Arc::new(WheelConverter), Arc::new(SdistConverter))
    }
}

impl fmt::Debug for Converters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converters").finish_non_exhaustive()
    }
}

/// Reads `Requires-Dist` from `<name>.dist-info/METADATA`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WheelConverter;

impl Converter for WheelConverter {
    fn requirements(&self, filename: &str, archive: &[u8]) -> Result<Vec<String>, ExtractError> {
        let mut zip = ZipArchive::new(Cursor::new(archive))
            .map_err(|e| ExtractError::not_found(format!("Cannot open wheel {filename}: {e}")))?;

        let metadata_name = zip
            .file_names()
            .find(|name| {
                let mut parts = name.split('/');
                matches!(
                    (parts.next(), parts.next(), parts.next()),
                    (Some(dir), Some("METADATA"), None) if dir.ends_with(".dist-info")
                )
            })
            .map(String::from)
            .ok_or_else(|| ExtractError::not_found(format!("METADATA not found in {filename}")))?;

        let mut text = String::new();
        zip.by_name(&metadata_name)
            .map_err(|e| ExtractError::not_found(format!("Cannot open {metadata_name}: {e}")))?
            .read_to_string(&mut text)
            .map_err(|e| ExtractError::not_found(format!("Cannot read {metadata_name}: {e}")))?;

        Ok(requires_dist(&text))
    }
}

/// Reads `PKG-INFO`, falling back to `<name>.egg-info/requires.txt`.
///
/// Handles `.tar.gz` and `.zip` source archives.
#[derive(Debug, Clone, Copy, Default)]
pub struct SdistConverter;

impl Converter for SdistConverter {
    fn requirements(&self, filename: &str, archive: &[u8]) -> Result<Vec<String>, ExtractError> {
        let members = if filename.ends_with(".zip") {
            Self::zip_members(filename, archive)?
        } else {
            Self::tar_members(filename, archive)?
        };

        if let Some(pkg_info) = &members.pkg_info {
            let deps = requires_dist(pkg_info);
            if !deps.is_empty() {
                return Ok(deps);
            }
        }
        if let Some(requires) = &members.requires_txt {
            return Ok(parse_requires_txt(requires));
        }
        if members.pkg_info.is_some() {
            return Ok(Vec::new());
        }

        Err(ExtractError::not_found(format!(
            "Neither PKG-INFO nor requires.txt found in {filename}"
        )))
    }
}

#[derive(Debug, Default)]
struct SdistMembers {
    pkg_info: Option<String>,
    requires_txt: Option<String>,
}

impl SdistMembers {
    /// Record `path` if it is `<root>/PKG-INFO` or `<root>/<x>.egg-info/requires.txt`.
    fn wants(&self, path: &Path) -> Option<SdistMember> {
        let parts: Vec<&str> = path
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => part.to_str(),
                _ => None,
            })
            .collect();

        match parts.as_slice() {
            [_, "PKG-INFO"] if self.pkg_info.is_none() => Some(SdistMember::PkgInfo),
            [_, dir, "requires.txt"] if dir.ends_with(".egg-info") && self.requires_txt.is_none() => {
                Some(SdistMember::RequiresTxt)
            }
            _ => None,
        }
    }

    fn store(&mut self, member: SdistMember, text: String) {
        match member {
            SdistMember::PkgInfo => self.pkg_info = Some(text),
            SdistMember::RequiresTxt => self.requires_txt = Some(text),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum SdistMember {
    PkgInfo,
    RequiresTxt,
}

impl SdistConverter {
    fn tar_members(filename: &str, archive: &[u8]) -> Result<SdistMembers, ExtractError> {
        let unreadable = |e: std::io::Error| {
            ExtractError::not_found(format!("Cannot read source archive {filename}: {e}"))
        };

        let mut tar = Archive::new(GzDecoder::new(archive));
        let mut members = SdistMembers::default();

        for entry in tar.entries().map_err(unreadable)? {
            let mut entry = entry.map_err(unreadable)?;
            if !entry.header().entry_type().is_file() {
                continue;
            }
            let path = entry.path().map_err(unreadable)?.into_owned();
            if let Some(member) = members.wants(&path) {
                let mut text = String::new();
                entry.read_to_string(&mut text).map_err(unreadable)?;
                members.store(member, text);
            }
        }

        Ok(members)
    }

    fn zip_members(filename: &str, archive: &[u8]) -> Result<SdistMembers, ExtractError> {
        let mut zip = ZipArchive::new(Cursor::new(archive)).map_err(|e| {
            ExtractError::not_found(format!("Cannot open source archive {filename}: {e}"))
        })?;
        let mut members = SdistMembers::default();

        for index in 0..zip.len() {
            let mut file = zip.by_index(index).map_err(|e| {
                ExtractError::not_found(format!("Cannot read source archive {filename}: {e}"))
            })?;
            if !file.is_file() {
                continue;
            }
            let path = Path::new(file.name()).to_path_buf();
            if let Some(member) = members.wants(&path) {
                let mut text = String::new();
                file.read_to_string(&mut text).map_err(|e| {
                    ExtractError::not_found(format!("Cannot read {}: {e}", path.display()))
                })?;
                members.store(member, text);
            }
        }

        Ok(members)
    }
}

/// `Requires-Dist` values from a core metadata document.
///
/// Only the header block is scanned; the description body after the first
/// empty line is ignored. Indented lines continue the previous header and
/// are never read as keys.
#[must_use]
pub fn requires_dist(metadata: &str) -> Vec<String> {
    metadata
        .lines()
        .take_while(|line| !line.is_empty())
        .filter(|line| !line.starts_with([' ', '\t']))
        .filter_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case("Requires-Dist")
                .then(|| value.trim().to_string())
        })
        .filter(|value| !value.is_empty())
        .collect()
}

/// Requirements from a setuptools `requires.txt`.
///
/// `[extra]`, `[:marker]` and `[extra:marker]` sections become environment
/// markers on each requirement in the section.
#[must_use]
pub fn parse_requires_txt(text: &str) -> Vec<String> {
    let mut marker: Option<String> = None;
    let mut deps = Vec::new();

    for line in text.lines() {
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }

        if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let (extra, env) = section.split_once(':').unwrap_or((section, ""));
            let (extra, env) = (extra.trim(), env.trim());
            marker = match (extra.is_empty(), env.is_empty()) {
                (true, true) => None,
                (true, false) => Some(env.to_string()),
                (false, true) => Some(format!("extra == \"{extra}\"")),
                (false, false) => Some(format!("({env}) and extra == \"{extra}\"")),
            };
            continue;
        }

        match &marker {
            Some(marker) => deps.push(format!("{line}; {marker}")),
            None => deps.push(line.to_string()),
        }
    }

    deps
}

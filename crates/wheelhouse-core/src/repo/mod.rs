//! PEP 503 simple index resolution.
//!
//! Provides:
//! - Fetching and parsing simple index pages into link records
//! - Parsing package name and version out of artifact filenames
//! - Aggregating links into releases with a prerelease policy
//! - Choosing an artifact and extracting its declared requirements
//! - Filtering requirements by extra
//! - Caching link listings and dependency lists on disk

pub mod cache;
pub mod config;
pub mod convert;
pub mod download;
pub mod error;
pub mod filename;
pub mod links;
pub mod release;
pub mod repository;
pub mod requires;
pub mod select;

pub use cache::{CacheKey, CacheStore, FsCacheStore, JsonCache, TextCache};
pub use config::{RepoConfig, INDEX_URL_ENV};
pub use convert::{Converter, ConverterKind, Converters, SdistConverter, WheelConverter};
pub use download::{download_artifact, MAX_ARTIFACT_SIZE};
pub use error::{codes, ExtractError, RepoError};
pub use filename::{canonicalize_name, parse_name};
pub use links::{fetch_links, parse_links, LinkRecord};
pub use release::{aggregate, PythonConstraint, Release, ReleaseQuery};
pub use repository::SimpleRepository;
pub use requires::{convert_deps, parse_extra};
pub use select::{extract_first, matching_links, plan, Candidate, RULES};

//! Facade crate for the Destiny 2 manifest manager.
//!
//! This crate re-exports the domain types from `destiny-core` and the
//! manifest cache, source, and reader from `destiny-data`.

#![forbid(unsafe_code)]

pub use destiny_core::{
    Category, HISTORICAL_STATS_CATEGORY, HashKey, HashKeyError, Locale, LocaleError,
    LocaleRegistry, bump_hash,
};

pub use destiny_data::manifest::{
    DownloadLog, HttpManifestSource, HttpManifestSourceConfig, ManifestCache, ManifestCacheConfig,
    ManifestError, ManifestReader, ManifestSource, SourceBuildError, TransportError,
};

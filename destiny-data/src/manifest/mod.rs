//! Facilities for resolving, downloading, extracting and querying Destiny 2
//! manifest databases.
#![forbid(unsafe_code)]

mod archive;
mod cache;
mod download_log;
mod error;
mod ops;
mod reader;
mod source;
mod types;
mod util;

#[doc(hidden)]
pub mod test_support;

pub use archive::extract_archive;
pub use cache::{ARCHIVE_FILE_NAME, ManifestCache, ManifestCacheConfig};
pub use download_log::DownloadLog;
pub use error::{ManifestError, SourceBuildError, TransportError};
pub use ops::{download_manifest, resolve_descriptor};
pub use reader::{IDENTIFIER_COLUMN, JSON_COLUMN, ManifestReader, RawDefinition, build_query};
pub use source::{
    API_KEY_HEADER, DEFAULT_CONTENT_BASE, DEFAULT_PLATFORM_BASE, DEFAULT_USER_AGENT,
    HttpManifestSource, HttpManifestSourceConfig, ManifestSource,
};
pub use types::{
    BaseUrl, DownloadReport, ManifestDescriptor, ManifestFileName, ManifestIndex, ManifestUrl,
};

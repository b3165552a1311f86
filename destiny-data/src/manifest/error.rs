//! Error types produced by the manifest helpers.

use std::{error::Error as StdError, io};

use camino::Utf8PathBuf;
use destiny_core::{HashKeyError, Locale, LocaleError};
use thiserror::Error;

/// Errors produced while resolving, downloading, or reading a manifest.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ManifestError {
    /// The requested locale is not part of the supported set.
    #[error(transparent)]
    Locale(#[from] LocaleError),
    /// The hash could not be turned into a lookup key.
    #[error("invalid definition hash: {0}")]
    InvalidHash(#[from] HashKeyError),
    /// The HTTP source could not be constructed.
    #[error(transparent)]
    BuildSource(#[from] SourceBuildError),
    /// The blocking runtime driving HTTP requests could not be created.
    #[error("failed to build Tokio runtime: {source}")]
    Runtime { source: io::Error },
    /// The manifest index could not be fetched.
    #[error("failed to fetch manifest index: {source}")]
    IndexFetch { source: TransportError },
    /// The manifest index was not valid JSON or lacked the expected fields.
    #[error("failed to parse manifest index: {source}")]
    ParseIndex { source: serde_json::Error },
    /// Bungie answered the index request with an error envelope.
    #[error("manifest index request failed with {status} ({code}): {message}")]
    Api {
        /// Numeric `ErrorCode` from the envelope.
        code: i64,
        /// `ErrorStatus` from the envelope.
        status: String,
        /// `Message` from the envelope.
        message: String,
    },
    /// The index did not list a database for the locale.
    #[error("manifest index does not list a database for locale '{locale}'")]
    MissingLocale { locale: Locale },
    /// The relative path from the index did not form a valid URL.
    #[error("manifest path {path:?} does not form a valid URL: {source}")]
    InvalidUrl {
        path: String,
        source: url::ParseError,
    },
    /// The manifest URL had no final path segment to name the database.
    #[error("manifest URL {url} has no file name")]
    MissingFileName { url: String },
    /// The archive could not be downloaded.
    #[error("failed to download manifest archive: {source}")]
    Download { source: TransportError },
    /// Preparing the storage directory failed.
    #[error("failed to create storage directory {path:?}: {source}")]
    CreateDir { source: io::Error, path: Utf8PathBuf },
    /// Checking whether a file exists failed.
    #[error("failed to inspect {path:?}: {source}")]
    Inspect { source: io::Error, path: Utf8PathBuf },
    /// Writing the archive to disk failed.
    #[error("failed to write manifest archive to {path:?}: {source}")]
    WriteArchive { source: io::Error, path: Utf8PathBuf },
    /// Opening the downloaded archive failed.
    #[error("failed to open manifest archive {path:?}: {source}")]
    OpenArchive {
        source: zip::result::ZipError,
        path: Utf8PathBuf,
    },
    /// Extracting the archive failed.
    #[error("failed to extract manifest archive {path:?}: {source}")]
    Extract {
        source: zip::result::ZipError,
        path: Utf8PathBuf,
    },
    /// Opening the manifest database failed.
    #[error("failed to open manifest database {path:?}: {source}")]
    OpenDatabase {
        source: rusqlite::Error,
        path: Utf8PathBuf,
    },
    /// Closing the manifest database failed.
    #[error("failed to close manifest database {path:?}: {source}")]
    CloseDatabase {
        source: rusqlite::Error,
        path: Utf8PathBuf,
    },
    /// Running a lookup against the manifest database failed.
    #[error("failed to query {category}: {source}")]
    Query {
        source: rusqlite::Error,
        category: String,
    },
    /// A stored definition was not valid JSON.
    #[error("failed to decode definition from {category}: {source}")]
    DecodeDefinition {
        source: serde_json::Error,
        category: String,
    },
    /// Initialising the download log failed.
    #[error("failed to initialise download log at {path:?}: {source}")]
    InitialiseLog {
        source: rusqlite::Error,
        path: Utf8PathBuf,
    },
    /// Recording metadata failed when interacting with SQLite.
    #[error("failed to record download metadata: {source}")]
    RecordLogSql { source: rusqlite::Error },
    /// Serialising metadata into SQLite-compatible values failed.
    #[error("failed to prepare download metadata for persistence ({what}): {source}")]
    RecordLogValue {
        /// Description of the value that failed to serialise.
        what: String,
        /// Underlying conversion error.
        source: Box<dyn StdError + Send + Sync>,
    },
}

/// Transport-level errors encountered while issuing HTTP requests.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransportError {
    /// The server returned an HTTP error status.
    #[error("request to {url} failed with status {status}: {message}")]
    Http {
        /// Fully qualified request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Short error description supplied by the server.
        message: String,
    },
    /// The request failed due to an I/O error.
    #[error("network error contacting {url}: {source}")]
    Network {
        /// Fully qualified request URL.
        url: String,
        /// I/O error reported by the transport.
        source: io::Error,
    },
}

/// Errors raised while constructing an HTTP manifest source.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SourceBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// A caller-supplied header name was not valid HTTP.
    #[error("invalid header name {name:?}")]
    InvalidHeaderName {
        name: String,
        source: reqwest::header::InvalidHeaderName,
    },
    /// A caller-supplied header value was not valid HTTP.
    #[error("invalid value for header {name:?}")]
    InvalidHeaderValue {
        name: String,
        source: reqwest::header::InvalidHeaderValue,
    },
}

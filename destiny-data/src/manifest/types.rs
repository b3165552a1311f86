//! Domain wrappers for manifest endpoints, file names, and descriptors.
//! Provides small, typed newtypes with ergonomic trait impls and Rustdoc examples.

use std::{collections::BTreeMap, fmt, ops::Deref};

use camino::Utf8PathBuf;
use destiny_core::Locale;
use url::Url;

/// Base URL of a Bungie endpoint, without a trailing slash.
///
/// # Examples
/// ```
/// # use destiny_data::manifest::BaseUrl;
/// let url = BaseUrl::new("https://www.bungie.net/Platform");
/// assert_eq!(url.as_str(), "https://www.bungie.net/Platform");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl(String);

impl BaseUrl {
    /// Construct a new [`BaseUrl`] from an owned or borrowed string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the wrapped string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BaseUrl {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for BaseUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for BaseUrl {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of the manifest database, taken from the final segment of its URL.
///
/// # Examples
/// ```
/// # use destiny_data::manifest::ManifestFileName;
/// let file = ManifestFileName::new("world_sql_content_abc123.content");
/// assert!(file.as_str().ends_with(".content"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestFileName(String);

impl ManifestFileName {
    /// Construct a new [`ManifestFileName`] from an owned or borrowed string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the wrapped string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ManifestFileName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for ManifestFileName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for ManifestFileName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for ManifestFileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fully qualified URL pointing to a manifest archive.
///
/// # Examples
/// ```
/// # use destiny_data::manifest::ManifestUrl;
/// let url = ManifestUrl::new("https://www.bungie.net/common/sqlite/en/a.content");
/// assert!(url.as_str().starts_with("https://"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestUrl(String);

impl ManifestUrl {
    /// Construct a new [`ManifestUrl`] from an owned or borrowed string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the wrapped string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Final non-empty path segment, used as the local database name.
    ///
    /// # Examples
    /// ```
    /// # use destiny_data::manifest::ManifestUrl;
    /// let url = ManifestUrl::new("https://example.org/sqlite/fr/abc123.content/");
    /// assert_eq!(url.file_name().as_deref(), Some("abc123.content"));
    /// ```
    pub fn file_name(&self) -> Option<ManifestFileName> {
        let path = Url::parse(&self.0)
            .map(|url| url.path().to_owned())
            .unwrap_or_else(|_| self.0.clone());
        path.split('/')
            .rev()
            .find(|segment| !segment.is_empty())
            .map(ManifestFileName::from)
    }
}

impl AsRef<str> for ManifestUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for ManifestUrl {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for ManifestUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Url> for ManifestUrl {
    fn from(value: Url) -> Self {
        Self(value.into())
    }
}

impl TryFrom<&str> for ManifestUrl {
    type Error = url::ParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Url::parse(value).map(Into::into)
    }
}

/// Contents of the manifest index relevant to downloads.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ManifestIndex {
    /// Manifest version string reported by Bungie.
    pub version: Option<String>,
    /// Relative database paths keyed by lowercase locale code.
    pub paths: BTreeMap<String, String>,
}

impl ManifestIndex {
    /// Relative path of the database published for `locale`.
    pub fn path_for(&self, locale: Locale) -> Option<&str> {
        self.paths.get(locale.code()).map(String::as_str)
    }
}

/// Describes the manifest archive that should be downloaded for a locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestDescriptor {
    /// Locale the manifest was resolved for.
    pub locale: Locale,
    /// Database file name derived from the URL.
    pub file_name: ManifestFileName,
    /// Absolute download URL.
    pub url: ManifestUrl,
    /// Manifest version reported by the index, if any.
    pub version: Option<String>,
}

/// Summary of a downloaded archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReport {
    /// Descriptor derived from the index.
    pub descriptor: ManifestDescriptor,
    /// Number of bytes written to disk.
    pub bytes_written: u64,
    /// Location of the saved archive.
    pub archive_path: Utf8PathBuf,
}

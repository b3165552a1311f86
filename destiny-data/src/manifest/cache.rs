//! Per-locale cache of manifest databases with blocking entry points.

use camino::{Utf8Path, Utf8PathBuf};
use destiny_core::{Category, HashKey, Locale, LocaleRegistry};
use log::{debug, info, warn};
use tokio::runtime::{Builder, Handle, Runtime, RuntimeFlavor};

use super::archive::extract_archive;
use super::ops::{download_manifest, resolve_descriptor};
use super::reader::{IDENTIFIER_COLUMN, ManifestReader};
use super::source::{HttpManifestSource, HttpManifestSourceConfig, ManifestSource};
use super::{DownloadLog, ManifestError};

/// Working file name the archive is downloaded to inside the storage
/// directory.
pub const ARCHIVE_FILE_NAME: &str = "manifest";

/// Settings for [`ManifestCache::open`].
///
/// # Examples
/// ```
/// use destiny_data::manifest::{API_KEY_HEADER, ManifestCacheConfig};
///
/// let config = ManifestCacheConfig::new("manifests")
///     .with_api_key("secret")
///     .with_download_log("manifests/downloads.sqlite");
/// assert_eq!(config.storage_dir.as_str(), "manifests");
/// assert_eq!(config.source.headers[0].0, API_KEY_HEADER);
/// assert!(config.download_log.is_some());
/// ```
#[derive(Debug, Clone)]
pub struct ManifestCacheConfig {
    /// Directory archives are downloaded to and extracted into.
    pub storage_dir: Utf8PathBuf,
    /// HTTP settings for the Bungie endpoints.
    pub source: HttpManifestSourceConfig,
    /// Optional SQLite file recording every manifest install.
    pub download_log: Option<Utf8PathBuf>,
}

impl ManifestCacheConfig {
    /// Configuration storing manifests under `storage_dir` with default
    /// endpoints and no extra headers.
    pub fn new(storage_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            storage_dir: storage_dir.into(),
            source: HttpManifestSourceConfig::default(),
            download_log: None,
        }
    }

    /// Replace the HTTP settings.
    #[must_use]
    pub fn with_source(mut self, source: HttpManifestSourceConfig) -> Self {
        self.source = source;
        self
    }

    /// Attach a header to every request.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.source = self.source.with_header(name, value);
        self
    }

    /// Send `key` as the Bungie API key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.source = self.source.with_api_key(key);
        self
    }

    /// Record downloads in the SQLite file at `path`.
    #[must_use]
    pub fn with_download_log(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.download_log = Some(path.into());
        self
    }
}

/// Tracks one manifest database per locale and answers definition lookups.
///
/// All operations block. HTTP requests are driven to completion by a Tokio
/// runtime owned by the cache. When called from inside a multi-threaded
/// runtime the cache borrows that runtime through
/// [`tokio::task::block_in_place`] instead and never builds its own; a
/// `current_thread` caller runtime is not supported. An owned runtime is shut
/// down without blocking when the cache is dropped, so the cache may be
/// dropped from async code.
///
/// A locale is resolved once per cache instance. Later calls reuse the
/// recorded path without contacting Bungie, so a stale database is kept
/// until a new cache is constructed.
///
/// # Examples
/// ```
/// # use camino::Utf8PathBuf;
/// # use destiny_data::manifest::{ManifestCache, ManifestError};
/// # use destiny_data::manifest::test_support::{
/// #     StubSource, index_document, manifest_archive, manifest_database,
/// # };
/// # fn example() -> Result<(), ManifestError> {
/// # let temp = tempfile::tempdir().expect("temp dir");
/// # let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("UTF-8 path");
/// # let fixture = root.join("fixture.content");
/// # let row = ("-413471533", r#"{"hash":3881495763}"#);
/// # manifest_database(&fixture, "DestinyActivityDefinition", &[row]);
/// # let bytes = std::fs::read(&fixture).expect("fixture bytes");
/// # let archive = manifest_archive("world.content", &bytes);
/// # let path = "/common/destiny2_content/sqlite/en/world.content";
/// # let index = index_document("1.0", &[("en", path)]);
/// # let source = StubSource::with_index(index, archive);
/// # let storage_dir = root.join("manifests");
/// let mut cache = ManifestCache::with_source(storage_dir, source)?;
/// let definition = cache.decode("3881495763", "DestinyActivityDefinition", "EN")?;
/// assert_eq!(definition, Some(serde_json::json!({ "hash": 3881495763u32 })));
/// # Ok(())
/// # }
/// # example().expect("lookup should succeed");
/// ```
#[derive(Debug)]
pub struct ManifestCache<S = HttpManifestSource> {
    source: S,
    storage_dir: Utf8PathBuf,
    registry: LocaleRegistry,
    runtime: Option<Runtime>,
    log: Option<DownloadLog>,
}

impl ManifestCache<HttpManifestSource> {
    /// Build a cache talking to Bungie with the supplied settings.
    pub fn open(config: &ManifestCacheConfig) -> Result<Self, ManifestError> {
        let source = HttpManifestSource::with_config(&config.source)?;
        let cache = Self::with_source(config.storage_dir.clone(), source)?;
        match &config.download_log {
            Some(path) => Ok(cache.with_download_log(DownloadLog::initialise(path)?)),
            None => Ok(cache),
        }
    }

    /// Build a cache under `storage_dir` using the default Bungie endpoints.
    pub fn new(storage_dir: impl Into<Utf8PathBuf>) -> Result<Self, ManifestError> {
        Self::open(&ManifestCacheConfig::new(storage_dir))
    }
}

impl<S: ManifestSource> ManifestCache<S> {
    /// Build a cache backed by an arbitrary [`ManifestSource`].
    pub fn with_source(
        storage_dir: impl Into<Utf8PathBuf>,
        source: S,
    ) -> Result<Self, ManifestError> {
        let runtime = match multi_thread_handle() {
            Some(_) => None,
            None => Some(build_runtime()?),
        };
        Ok(Self {
            source,
            storage_dir: storage_dir.into(),
            registry: LocaleRegistry::new(),
            runtime,
            log: None,
        })
    }

    /// Record every downloaded and unpacked archive in `log`.
    #[must_use]
    pub fn with_download_log(mut self, log: DownloadLog) -> Self {
        self.log = Some(log);
        self
    }

    /// Directory manifests are stored in.
    pub fn storage_dir(&self) -> &Utf8Path {
        &self.storage_dir
    }

    /// Per-locale resolution state.
    pub fn registry(&self) -> &LocaleRegistry {
        &self.registry
    }

    /// Source used for index and archive requests.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Download log attached to the cache, if any.
    pub fn download_log(&self) -> Option<&DownloadLog> {
        self.log.as_ref()
    }

    /// Path recorded for `locale`, if it has been resolved.
    pub fn manifest_path(&self, locale: Locale) -> Option<&Utf8Path> {
        self.registry.path(locale)
    }

    /// Make sure a database for `language` is available locally and return
    /// its path.
    ///
    /// The locale is matched case-insensitively and rejected before any
    /// request when unsupported. A locale resolved earlier returns its
    /// recorded path without contacting the source. Otherwise the index is
    /// fetched and, unless the database file already exists, the archive is
    /// downloaded to [`ARCHIVE_FILE_NAME`] and extracted into the storage
    /// directory.
    pub fn ensure_locale(&mut self, language: &str) -> Result<Utf8PathBuf, ManifestError> {
        let locale: Locale = language.parse()?;
        self.ensure(locale)
    }

    /// Alias of [`ManifestCache::ensure_locale`].
    pub fn update_manifest(&mut self, language: &str) -> Result<Utf8PathBuf, ManifestError> {
        self.ensure_locale(language)
    }

    /// Look up the definition identified by `hash` in the `category` table of
    /// the `language` manifest.
    ///
    /// Numeric hashes are converted to the signed form stored in the `id`
    /// column; historical stat keys are matched as text. The locale and the
    /// hash are validated before any request is made. Returns `Ok(None)` when
    /// no row matches.
    pub fn decode(
        &mut self,
        hash: &str,
        category: &str,
        language: &str,
    ) -> Result<Option<serde_json::Value>, ManifestError> {
        let locale: Locale = language.parse()?;
        let category = Category::from(category);
        let key = HashKey::for_category(hash, &category)?;
        let path = self.ensure(locale)?;

        let reader = ManifestReader::open(&path)?;
        let rows = reader.query(&key, &category, IDENTIFIER_COLUMN)?;
        reader.close()?;

        let Some(first) = rows.first() else {
            debug!("no {category} row for {key} in {path}");
            return Ok(None);
        };
        first
            .parse()
            .map(Some)
            .map_err(|source| ManifestError::DecodeDefinition {
                source,
                category: category.into_inner(),
            })
    }

    fn ensure(&mut self, locale: Locale) -> Result<Utf8PathBuf, ManifestError> {
        if let Some(path) = self.registry.path(locale) {
            debug!("{locale} manifest already resolved to {path}");
            return Ok(path.to_path_buf());
        }
        let path = self.fetch_blocking(locale)?;
        self.registry.set(locale, path.clone());
        Ok(path)
    }

    fn fetch_blocking(&mut self, locale: Locale) -> Result<Utf8PathBuf, ManifestError> {
        // block_in_place requires a multi-threaded runtime; anything else
        // runs on the runtime owned by the cache.
        if let Some(handle) = multi_thread_handle() {
            return tokio::task::block_in_place(|| handle.block_on(self.fetch(locale)));
        }
        let runtime = match self.runtime.take() {
            Some(runtime) => runtime,
            None => build_runtime()?,
        };
        let outcome = runtime.block_on(self.fetch(locale));
        self.runtime = Some(runtime);
        outcome
    }

    async fn fetch(&self, locale: Locale) -> Result<Utf8PathBuf, ManifestError> {
        let descriptor = resolve_descriptor(&self.source, locale).await?;
        let database_path = self.storage_dir.join(descriptor.file_name.as_str());
        let present = destiny_fs::regular_file_exists(&database_path).map_err(|source| {
            ManifestError::Inspect {
                source,
                path: database_path.clone(),
            }
        })?;
        if present {
            info!("{locale} manifest already present at {database_path}");
            return Ok(database_path);
        }

        destiny_fs::ensure_dir(&self.storage_dir).map_err(|source| ManifestError::CreateDir {
            source,
            path: self.storage_dir.clone(),
        })?;
        let archive_path = self.storage_dir.join(ARCHIVE_FILE_NAME);
        let report = download_manifest(&self.source, descriptor, &archive_path).await?;
        let entries = extract_archive(&archive_path, &self.storage_dir)?;
        let expected = report.descriptor.file_name.as_str();
        if !entries.iter().any(|entry| entry == expected) {
            warn!("archive {archive_path} did not contain {expected}");
        }
        if let Some(log) = &self.log {
            log.record(&report, &entries)?;
        }
        Ok(database_path)
    }
}

impl<S> Drop for ManifestCache<S> {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

fn multi_thread_handle() -> Option<Handle> {
    Handle::try_current()
        .ok()
        .filter(|handle| handle.runtime_flavor() == RuntimeFlavor::MultiThread)
}

fn build_runtime() -> Result<Runtime, ManifestError> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|source| ManifestError::Runtime { source })
}

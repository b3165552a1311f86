//! Transport seam for the manifest index and archives, with the reqwest
//! implementation used against Bungie.

use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};
use std::io::{self, BufRead, Cursor, Write};
use std::time::Duration;

use super::util::sanitise_base_url;
use super::{BaseUrl, SourceBuildError, TransportError};

/// User agent sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = "destiny-manifest/0.1";
/// Root of the Bungie platform API serving the manifest index.
pub const DEFAULT_PLATFORM_BASE: &str = "https://www.bungie.net/Platform";
/// Host the index's relative database paths are resolved against.
pub const DEFAULT_CONTENT_BASE: &str = "https://www.bungie.net";
/// Header Bungie reads the application API key from.
pub const API_KEY_HEADER: &str = "X-API-Key";
const MANIFEST_PATH: &str = "/Destiny2/Manifest/";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;
const INDEX_TIMEOUT_SECS: u64 = 15;

/// Supplies the manifest index and archive bytes.
///
/// The cache only talks to Bungie through this trait, so tests substitute a
/// canned implementation.
#[async_trait(?Send)]
pub trait ManifestSource {
    /// Host that relative manifest paths are resolved against.
    fn content_base(&self) -> &BaseUrl;
    /// Fetch the manifest index document.
    async fn fetch_index(&self) -> Result<Box<dyn BufRead + Send>, TransportError>;
    /// Stream the archive identified by `url` into `sink`.
    async fn download_archive(
        &self,
        url: &str,
        sink: &mut dyn Write,
    ) -> Result<u64, TransportError>;
}

/// Configuration for [`HttpManifestSource`].
#[derive(Debug, Clone)]
pub struct HttpManifestSourceConfig {
    /// Platform API root, e.g. `https://www.bungie.net/Platform`.
    pub platform_base: String,
    /// Host serving the manifest archives.
    pub content_base: String,
    /// Headers attached verbatim to every request.
    pub headers: Vec<(String, String)>,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for HttpManifestSourceConfig {
    fn default() -> Self {
        Self {
            platform_base: DEFAULT_PLATFORM_BASE.to_owned(),
            content_base: DEFAULT_CONTENT_BASE.to_owned(),
            headers: Vec::new(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpManifestSourceConfig {
    /// Override the platform API root.
    #[must_use]
    pub fn with_platform_base(mut self, platform_base: impl Into<String>) -> Self {
        self.platform_base = platform_base.into();
        self
    }

    /// Override the host serving manifest archives.
    #[must_use]
    pub fn with_content_base(mut self, content_base: impl Into<String>) -> Self {
        self.content_base = content_base.into();
        self
    }

    /// Attach a header to every request.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Attach every header yielded by `headers`.
    #[must_use]
    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers.extend(
            headers
                .into_iter()
                .map(|(name, value)| (name.into(), value.into())),
        );
        self
    }

    /// Send `key` in the [`API_KEY_HEADER`] header.
    #[must_use]
    pub fn with_api_key(self, key: impl Into<String>) -> Self {
        self.with_header(API_KEY_HEADER, key)
    }

    /// Set the connection timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// HTTP implementation of [`ManifestSource`] talking to Bungie.
#[derive(Debug)]
pub struct HttpManifestSource {
    client: Client,
    platform_base: BaseUrl,
    content_base: BaseUrl,
}

impl HttpManifestSource {
    /// Construct a source from explicit configuration.
    pub fn with_config(config: &HttpManifestSourceConfig) -> Result<Self, SourceBuildError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(build_headers(&config.headers)?)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(SourceBuildError::HttpClient)?;
        Ok(Self {
            client,
            platform_base: sanitise_base_url(config.platform_base.as_str(), DEFAULT_PLATFORM_BASE),
            content_base: sanitise_base_url(config.content_base.as_str(), DEFAULT_CONTENT_BASE),
        })
    }

    fn index_url(&self) -> String {
        format!("{}{}", self.platform_base.as_str(), MANIFEST_PATH)
    }

    async fn call(&self, url: &str, timeout: Option<Duration>) -> Result<Response, TransportError> {
        let mut request = self.client.get(url);
        if let Some(limit) = timeout {
            request = request.timeout(limit);
        }
        request
            .send()
            .await
            .map_err(|err| convert_reqwest_error(err, url))?
            .error_for_status()
            .map_err(|err| convert_reqwest_error(err, url))
    }
}

#[async_trait(?Send)]
impl ManifestSource for HttpManifestSource {
    fn content_base(&self) -> &BaseUrl {
        &self.content_base
    }

    async fn fetch_index(&self) -> Result<Box<dyn BufRead + Send>, TransportError> {
        let url = self.index_url();
        debug!("fetching manifest index from {url}");
        let response = self
            .call(&url, Some(Duration::from_secs(INDEX_TIMEOUT_SECS)))
            .await?;
        let body = response
            .bytes()
            .await
            .map_err(|err| convert_reqwest_error(err, &url))?;
        Ok(Box::new(Cursor::new(body)))
    }

    async fn download_archive(
        &self,
        url: &str,
        sink: &mut dyn Write,
    ) -> Result<u64, TransportError> {
        let mut response = self.call(url, None).await?;
        let mut written: u64 = 0;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|err| convert_reqwest_error(err, url))?
        {
            sink.write_all(&chunk)
                .map_err(|source| TransportError::Network {
                    url: url.to_owned(),
                    source,
                })?;
            written = written.saturating_add(chunk.len() as u64);
        }
        Ok(written)
    }
}

fn build_headers(pairs: &[(String, String)]) -> Result<HeaderMap, SourceBuildError> {
    let mut headers = HeaderMap::new();
    for (name, value) in pairs {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|source| {
            SourceBuildError::InvalidHeaderName {
                name: name.clone(),
                source,
            }
        })?;
        let header_value =
            HeaderValue::from_str(value).map_err(|source| SourceBuildError::InvalidHeaderValue {
                name: name.clone(),
                source,
            })?;
        headers.append(header_name, header_value);
    }
    Ok(headers)
}

fn convert_reqwest_error(error: reqwest::Error, url: &str) -> TransportError {
    if let Some(status) = error.status() {
        return TransportError::Http {
            url: url.to_owned(),
            status: status.as_u16(),
            message: error.to_string(),
        };
    }

    let kind = if error.is_timeout() {
        io::ErrorKind::TimedOut
    } else {
        io::ErrorKind::Other
    };
    TransportError::Network {
        url: url.to_owned(),
        source: io::Error::new(kind, error),
    }
}

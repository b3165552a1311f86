use std::{collections::BTreeMap, io::BufRead, io::Write};

use camino::Utf8Path;
use destiny_core::Locale;
use log::{debug, info};
use serde::Deserialize;

use super::source::ManifestSource;
use super::util::normalise_url;
use super::{BaseUrl, DownloadReport, ManifestDescriptor, ManifestError, ManifestIndex};

/// `ErrorCode` Bungie reports for a successful request.
const SUCCESS_CODE: i64 = 1;

/// Fetch the manifest index and resolve the archive published for `locale`.
///
/// # Examples
/// ```
/// # use destiny_core::Locale;
/// # use destiny_data::manifest::{resolve_descriptor, ManifestError};
/// # use destiny_data::manifest::test_support::{StubSource, block_on_for_tests, index_document};
/// # fn example() -> Result<(), ManifestError> {
/// let index = index_document(
///     "1.0",
///     &[("fr", "/common/destiny2_content/sqlite/fr/abc123.content")],
/// );
/// let source = StubSource::with_index(index, Vec::new());
/// let descriptor = block_on_for_tests(resolve_descriptor(&source, Locale::French))?;
/// assert_eq!(descriptor.file_name.as_str(), "abc123.content");
/// assert_eq!(
///     descriptor.url.as_str(),
///     "https://www.bungie.net/common/destiny2_content/sqlite/fr/abc123.content",
/// );
/// # Ok(())
/// # }
/// # example().expect("descriptor should resolve");
/// ```
pub async fn resolve_descriptor<S: ManifestSource + ?Sized>(
    source: &S,
    locale: Locale,
) -> Result<ManifestDescriptor, ManifestError> {
    let mut reader = source
        .fetch_index()
        .await
        .map_err(|source| ManifestError::IndexFetch { source })?;
    let index = parse_index(reader.as_mut())?;
    select_locale(&index, locale, source.content_base())
}

/// Download the archive described by `descriptor` to `archive_path`.
///
/// Any existing file at the archive path is truncated and missing parent
/// directories are created.
pub async fn download_manifest<S: ManifestSource + ?Sized>(
    source: &S,
    descriptor: ManifestDescriptor,
    archive_path: &Utf8Path,
) -> Result<DownloadReport, ManifestError> {
    if let Some(parent) = archive_path.parent()
        && !parent.as_str().is_empty()
    {
        destiny_fs::ensure_dir(parent).map_err(|source| ManifestError::CreateDir {
            source,
            path: parent.to_path_buf(),
        })?;
    }
    let mut file = destiny_fs::create_utf8_file(archive_path).map_err(|source| {
        ManifestError::WriteArchive {
            source,
            path: archive_path.to_path_buf(),
        }
    })?;
    info!("downloading {} manifest from {}", descriptor.locale, descriptor.url);
    let bytes_written = source
        .download_archive(&descriptor.url, &mut file)
        .await
        .map_err(|source| ManifestError::Download { source })?;
    file.flush().map_err(|source| ManifestError::WriteArchive {
        source,
        path: archive_path.to_path_buf(),
    })?;
    debug!("wrote {bytes_written} bytes to {archive_path}");
    Ok(DownloadReport {
        descriptor,
        bytes_written,
        archive_path: archive_path.to_path_buf(),
    })
}

/// Parse the manifest index envelope returned by `/Destiny2/Manifest/`.
pub(crate) fn parse_index(reader: &mut dyn BufRead) -> Result<ManifestIndex, ManifestError> {
    let envelope: IndexEnvelope =
        serde_json::from_reader(reader).map_err(|source| ManifestError::ParseIndex { source })?;
    if let Some(code) = envelope.error_code
        && code != SUCCESS_CODE
    {
        return Err(ManifestError::Api {
            code,
            status: envelope.error_status.unwrap_or_default(),
            message: envelope.message.unwrap_or_default(),
        });
    }
    let response = envelope.response.unwrap_or_default();
    Ok(ManifestIndex {
        version: response.version,
        paths: response
            .mobile_world_content_paths
            .into_iter()
            .map(|(code, path)| (code.to_ascii_lowercase(), path))
            .collect(),
    })
}

pub(crate) fn select_locale(
    index: &ManifestIndex,
    locale: Locale,
    content_base: &BaseUrl,
) -> Result<ManifestDescriptor, ManifestError> {
    let relative = index
        .path_for(locale)
        .ok_or(ManifestError::MissingLocale { locale })?;
    let url = normalise_url(content_base, relative).map_err(|source| ManifestError::InvalidUrl {
        path: relative.to_owned(),
        source,
    })?;
    let file_name = url.file_name().ok_or_else(|| ManifestError::MissingFileName {
        url: url.to_string(),
    })?;
    Ok(ManifestDescriptor {
        locale,
        file_name,
        url,
        version: index.version.clone(),
    })
}

#[derive(Debug, Deserialize)]
struct IndexEnvelope {
    #[serde(rename = "Response", default)]
    response: Option<IndexResponse>,
    #[serde(rename = "ErrorCode", default)]
    error_code: Option<i64>,
    #[serde(rename = "ErrorStatus", default)]
    error_status: Option<String>,
    #[serde(rename = "Message", default)]
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexResponse {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    mobile_world_content_paths: BTreeMap<String, String>,
}

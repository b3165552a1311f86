//! Extraction of downloaded manifest archives.

use camino::Utf8Path;
use log::{debug, info};
use zip::{ZipArchive, result::ZipError};

use super::ManifestError;

/// Extract every entry of the ZIP at `archive_path` into `target_dir`.
///
/// Returns the entry names in archive order. Existing files with the same
/// names are overwritten.
///
/// # Examples
/// ```
/// # use camino::Utf8PathBuf;
/// # use destiny_data::manifest::extract_archive;
/// # use destiny_data::manifest::test_support::manifest_archive;
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let temp = tempfile::tempdir()?;
/// let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("UTF-8 path");
/// let archive = root.join("manifest");
/// std::fs::write(&archive, manifest_archive("abc123.content", b"sqlite"))?;
/// let entries = extract_archive(&archive, &root)?;
/// assert_eq!(entries, vec!["abc123.content".to_owned()]);
/// assert!(root.join("abc123.content").is_file());
/// # Ok(())
/// # }
/// # example().expect("archive should extract");
/// ```
pub fn extract_archive(
    archive_path: &Utf8Path,
    target_dir: &Utf8Path,
) -> Result<Vec<String>, ManifestError> {
    let file = destiny_fs::open_utf8_file(archive_path)
        .map_err(|err| ManifestError::OpenArchive {
            source: ZipError::Io(err),
            path: archive_path.to_path_buf(),
        })?
        .into_std();
    let mut archive = ZipArchive::new(file).map_err(|source| ManifestError::OpenArchive {
        source,
        path: archive_path.to_path_buf(),
    })?;
    let entries: Vec<String> = archive.file_names().map(str::to_owned).collect();
    debug!("extracting {} entries from {archive_path}", entries.len());
    archive
        .extract(target_dir)
        .map_err(|source| ManifestError::Extract {
            source,
            path: archive_path.to_path_buf(),
        })?;
    info!("extracted {archive_path} into {target_dir}");
    Ok(entries)
}

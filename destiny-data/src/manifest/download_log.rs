//! SQLite record of the manifest databases installed by a cache.

use std::time::{SystemTime, UNIX_EPOCH};

use camino::Utf8Path;
use rusqlite::{Connection, params};

use super::{DownloadReport, ManifestError};

/// One row per archive that was fetched and unpacked into the storage
/// directory. Databases adopted from disk are never recorded.
const CREATE_INSTALLS: &str = "CREATE TABLE IF NOT EXISTS manifest_installs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    locale TEXT NOT NULL,
    version TEXT,
    database_file TEXT NOT NULL,
    source_url TEXT NOT NULL,
    archive_bytes INTEGER NOT NULL,
    archive_entries INTEGER NOT NULL,
    database_extracted INTEGER NOT NULL,
    installed_at INTEGER NOT NULL
)";

/// Persisted history of manifest installs, keyed by locale and version.
#[derive(Debug)]
pub struct DownloadLog {
    connection: Connection,
}

impl DownloadLog {
    /// Open (or create) the log at `path`.
    pub fn initialise(path: &Utf8Path) -> Result<Self, ManifestError> {
        let initialise_err = |source| ManifestError::InitialiseLog {
            source,
            path: path.to_path_buf(),
        };
        let connection = Connection::open(path).map_err(initialise_err)?;
        connection.execute(CREATE_INSTALLS, []).map_err(initialise_err)?;
        Ok(Self { connection })
    }

    /// Record that the archive described by `report` was unpacked into
    /// `entries`.
    ///
    /// `database_extracted` is stored as true only when one of the entries is
    /// the database file named by the manifest index.
    pub fn record(
        &self,
        report: &DownloadReport,
        entries: &[String],
    ) -> Result<(), ManifestError> {
        let descriptor = &report.descriptor;
        let database_extracted = entries
            .iter()
            .any(|entry| entry == descriptor.file_name.as_str());
        self.connection
            .execute(
                "INSERT INTO manifest_installs (
                    locale,
                    version,
                    database_file,
                    source_url,
                    archive_bytes,
                    archive_entries,
                    database_extracted,
                    installed_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    descriptor.locale.code(),
                    descriptor.version.as_deref(),
                    descriptor.file_name.as_str(),
                    descriptor.url.as_str(),
                    sql_integer("archive size", report.bytes_written)?,
                    sql_integer("archive entry count", entries.len())?,
                    database_extracted,
                    unix_timestamp()?
                ],
            )
            .map_err(|source| ManifestError::RecordLogSql { source })?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.connection
    }
}

fn sql_integer<T>(what: &str, value: T) -> Result<i64, ManifestError>
where
    i64: TryFrom<T>,
    <i64 as TryFrom<T>>::Error: std::error::Error + Send + Sync + 'static,
{
    i64::try_from(value).map_err(|err| ManifestError::RecordLogValue {
        what: what.to_owned(),
        source: Box::new(err),
    })
}

fn unix_timestamp() -> Result<i64, ManifestError> {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|err| ManifestError::RecordLogValue {
            what: "install timestamp".to_owned(),
            source: Box::new(err),
        })?;
    sql_integer("install timestamp", elapsed.as_secs())
}

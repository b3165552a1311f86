//! Read-only lookups against an extracted manifest database.

use camino::{Utf8Path, Utf8PathBuf};
use destiny_core::{Category, HashKey};
use log::debug;
use rusqlite::{Connection, OpenFlags, types::ValueRef};

use super::ManifestError;

/// Column holding the JSON document of every definition table.
pub const JSON_COLUMN: &str = "json";

/// Identifier column the cache queries against.
pub const IDENTIFIER_COLUMN: &str = "id";

/// Build the lookup statement for `key` in `table`.
///
/// `table` and `identifier` are interpolated into the statement text as-is.
/// Only pass names that come from trusted callers: a crafted table name can
/// inject arbitrary SQL. The key is rendered with
/// [`HashKey::to_sql_literal`], which quotes text keys.
///
/// # Examples
/// ```
/// use destiny_core::HashKey;
/// use destiny_data::manifest::build_query;
///
/// let query = build_query(&HashKey::Numeric(-413471533), "DestinyActivityDefinition", "id");
/// assert_eq!(query, "SELECT json FROM DestinyActivityDefinition WHERE id=-413471533");
/// ```
#[must_use]
pub fn build_query(key: &HashKey, table: &str, identifier: &str) -> String {
    format!(
        "SELECT {JSON_COLUMN} FROM {table} WHERE {identifier}={}",
        key.to_sql_literal()
    )
}

/// Raw JSON payload of one definition row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDefinition(Vec<u8>);

impl RawDefinition {
    /// Bytes of the stored document.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Parse the stored document.
    pub fn parse(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_slice(&self.0)
    }
}

/// Read-only handle to a manifest database.
///
/// The connection is released when the reader is dropped.
#[derive(Debug)]
pub struct ManifestReader {
    connection: Connection,
    path: Utf8PathBuf,
}

impl ManifestReader {
    /// Open the database at `path` without write access.
    pub fn open(path: &Utf8Path) -> Result<Self, ManifestError> {
        let connection = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| ManifestError::OpenDatabase {
            source,
            path: path.to_path_buf(),
        })?;
        Ok(Self {
            connection,
            path: path.to_path_buf(),
        })
    }

    /// Return every row of `category` whose `identifier` equals `key`, in
    /// the order SQLite yields them.
    pub fn query(
        &self,
        key: &HashKey,
        category: &Category,
        identifier: &str,
    ) -> Result<Vec<RawDefinition>, ManifestError> {
        let sql = build_query(key, category, identifier);
        debug!("querying {}: {sql}", self.path);
        let query_error = |source| ManifestError::Query {
            source,
            category: category.to_string(),
        };
        let mut statement = self.connection.prepare(&sql).map_err(query_error)?;
        let rows = statement
            .query_map([], |row| match row.get_ref(0)? {
                ValueRef::Text(bytes) | ValueRef::Blob(bytes) => Ok(RawDefinition(bytes.to_vec())),
                other => Err(rusqlite::Error::InvalidColumnType(
                    0,
                    JSON_COLUMN.to_owned(),
                    other.data_type(),
                )),
            })
            .map_err(query_error)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(query_error)
    }

    /// Names of the tables in the database, sorted.
    pub fn tables(&self) -> Result<Vec<String>, ManifestError> {
        let query_error = |source| ManifestError::Query {
            source,
            category: "sqlite_master".to_owned(),
        };
        let mut statement = self
            .connection
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .map_err(query_error)?;
        let names = statement
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(query_error)?;
        names.collect::<Result<Vec<_>, _>>().map_err(query_error)
    }

    /// Close the connection, surfacing any error SQLite reports.
    pub fn close(self) -> Result<(), ManifestError> {
        let Self { connection, path } = self;
        connection
            .close()
            .map_err(|(_, source)| ManifestError::CloseDatabase { source, path })
    }
}

//! Shared fixtures for manifest tests: an in-memory source and builders for
//! index documents, manifest databases and archives.
use std::cell::Cell;
use std::future::Future;
use std::io::{self, BufRead, Cursor, Write};

use async_trait::async_trait;
use camino::Utf8Path;
use rusqlite::{Connection, params, types::Value};
use zip::{ZipWriter, write::SimpleFileOptions};

use super::source::DEFAULT_CONTENT_BASE;
use super::{BaseUrl, ManifestSource, TransportError};

/// Stub [`ManifestSource`] serving an index and an archive from memory.
///
/// Request counters let tests assert that no network traffic happened.
#[derive(Debug, Clone)]
pub struct StubSource {
    content_base: BaseUrl,
    index: Vec<u8>,
    archive: Vec<u8>,
    unreachable: bool,
    index_requests: Cell<usize>,
    archive_requests: Cell<usize>,
}

impl StubSource {
    /// Construct a stub source with an explicit content host.
    pub fn new(content_base: BaseUrl, index: Vec<u8>, archive: Vec<u8>) -> Self {
        Self {
            content_base,
            index,
            archive,
            unreachable: false,
            index_requests: Cell::new(0),
            archive_requests: Cell::new(0),
        }
    }

    /// Construct a stub source serving `index` and `archive` from the Bungie
    /// content host.
    pub fn with_index(index: Vec<u8>, archive: Vec<u8>) -> Self {
        Self::new(BaseUrl::from(DEFAULT_CONTENT_BASE), index, archive)
    }

    /// Stub whose every request fails with a network error.
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::with_index(Vec::new(), Vec::new())
        }
    }

    /// Archive bytes served for every download.
    pub fn archive(&self) -> &[u8] {
        &self.archive
    }

    /// Number of index requests received.
    pub fn index_requests(&self) -> usize {
        self.index_requests.get()
    }

    /// Number of archive downloads received.
    pub fn archive_requests(&self) -> usize {
        self.archive_requests.get()
    }

    /// Total requests received.
    pub fn requests(&self) -> usize {
        self.index_requests() + self.archive_requests()
    }

    fn refuse(&self, url: &str) -> Result<(), TransportError> {
        if self.unreachable {
            return Err(TransportError::Network {
                url: url.to_owned(),
                source: io::Error::new(io::ErrorKind::ConnectionRefused, "stub is unreachable"),
            });
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl ManifestSource for StubSource {
    fn content_base(&self) -> &BaseUrl {
        &self.content_base
    }

    async fn fetch_index(&self) -> Result<Box<dyn BufRead + Send>, TransportError> {
        self.index_requests.set(self.index_requests.get() + 1);
        self.refuse("stub://index")?;
        Ok(Box::new(Cursor::new(self.index.clone())))
    }

    async fn download_archive(
        &self,
        url: &str,
        sink: &mut dyn Write,
    ) -> Result<u64, TransportError> {
        self.archive_requests.set(self.archive_requests.get() + 1);
        self.refuse(url)?;
        sink.write_all(&self.archive)
            .map_err(|source| TransportError::Network {
                url: url.to_owned(),
                source,
            })?;
        let length = u64::try_from(self.archive.len()).expect("archive length should fit in u64");
        Ok(length)
    }
}

/// Drive `future` to completion on a fresh current-thread runtime.
pub fn block_on_for_tests<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build Tokio runtime")
        .block_on(future)
}

/// Serialise a successful manifest index envelope listing `paths`.
pub fn index_document(version: &str, paths: &[(&str, &str)]) -> Vec<u8> {
    let paths: serde_json::Map<String, serde_json::Value> = paths
        .iter()
        .map(|(code, path)| ((*code).to_owned(), serde_json::Value::from(*path)))
        .collect();
    serde_json::json!({
        "Response": {
            "version": version,
            "mobileWorldContentPaths": paths,
        },
        "ErrorCode": 1,
        "ThrottleSeconds": 0,
        "ErrorStatus": "Success",
        "Message": "Ok",
    })
    .to_string()
    .into_bytes()
}

/// Create a manifest database at `path` with one definition table.
///
/// Identifiers that parse as integers are stored as integers, everything else
/// as text. Documents are stored as blobs, as Bungie ships them.
pub fn manifest_database(path: &Utf8Path, table: &str, rows: &[(&str, &str)]) {
    let connection = Connection::open(path).expect("failed to create manifest database");
    connection
        .execute(&format!("CREATE TABLE {table} (id PRIMARY KEY, json BLOB)"), [])
        .expect("failed to create definition table");
    for (id, json) in rows {
        let id = id
            .parse::<i64>()
            .map_or_else(|_| Value::Text((*id).to_owned()), Value::Integer);
        connection
            .execute(
                &format!("INSERT INTO {table} (id, json) VALUES (?1, ?2)"),
                params![id, json.as_bytes()],
            )
            .expect("failed to insert definition");
    }
}

/// Build a ZIP archive holding a single entry.
pub fn manifest_archive(entry_name: &str, contents: &[u8]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file(entry_name, SimpleFileOptions::default())
        .expect("failed to start archive entry");
    writer
        .write_all(contents)
        .expect("failed to write archive entry");
    writer
        .finish()
        .expect("failed to finish archive")
        .into_inner()
}

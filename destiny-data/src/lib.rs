//! Data access for Destiny 2 manifests.
//!
//! Responsibilities:
//! - Fetch the manifest index and download per-locale archives over HTTP.
//! - Extract archives and run definition lookups against the SQLite files.
//! - Keep a per-locale cache of resolved database paths.
//!
//! Boundaries:
//! - Locale, hash and category rules live in `destiny-core`.
//! - No retries, freshness checks or cache eviction.
//!
//! Invariants:
//! - Unsupported locales and malformed hashes are rejected before any request.
//! - No global mutable state.

pub mod manifest;

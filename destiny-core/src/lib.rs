//! Core domain types for the Destiny manifest manager.
//!
//! Nothing here performs I/O: the crate models the supported locales, the
//! per-locale record of downloaded manifest databases, category names, and
//! the keys used to look up definitions. Constructors and parsers return
//! `Result` so invalid input is rejected before any network or disk access.

#![forbid(unsafe_code)]

mod category;
mod hash;
mod locale;
mod registry;

pub use category::{Category, HISTORICAL_STATS_CATEGORY};
pub use hash::{HashKey, HashKeyError, bump_hash};
pub use locale::{Locale, LocaleError};
pub use registry::LocaleRegistry;

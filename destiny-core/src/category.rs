//! Manifest categories: the definition tables inside a manifest database.

use std::{fmt, ops::Deref};

/// Table holding historical stat definitions, keyed by text rather than hash.
pub const HISTORICAL_STATS_CATEGORY: &str = "DestinyHistoricalStatsDefinition";

/// Name of a definition table such as `DestinyActivityDefinition`.
///
/// The name is used verbatim in query text; it is not validated or escaped.
///
/// # Examples
/// ```
/// use destiny_core::Category;
///
/// let category = Category::from("DestinyHistoricalStatsDefinition");
/// assert!(category.has_text_identifier());
/// assert!(!Category::from("DestinyActivityDefinition").has_text_identifier());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Category(String);

impl Category {
    /// Construct a new [`Category`] from an owned or borrowed string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Whether rows in this table are identified by a text key instead of a
    /// numeric hash.
    #[must_use]
    pub fn has_text_identifier(&self) -> bool {
        self.0 == HISTORICAL_STATS_CATEGORY
    }

    /// Consume the wrapper and return the inner [`String`].
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<&str> for Category {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for Category {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for Category {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

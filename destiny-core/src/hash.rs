//! Lookup keys for manifest definitions.
//!
//! Bungie publishes definition hashes as unsigned 32-bit integers, while the
//! `id` column of each manifest table stores the same bits as a signed 32-bit
//! integer. Converting between the two is the "bump" applied before every
//! numeric lookup. Historical stat definitions are keyed by text instead and
//! are quoted as string literals.

use std::{fmt, num::ParseIntError};

use thiserror::Error;

use crate::Category;

/// Key used to look up a row in a manifest category table.
///
/// # Examples
/// ```
/// use destiny_core::{Category, HashKey};
///
/// let activity = Category::from("DestinyActivityDefinition");
/// let key = HashKey::for_category("3881495763", &activity)?;
/// assert_eq!(key, HashKey::Numeric(-413471533));
/// assert_eq!(key.to_sql_literal(), "-413471533");
///
/// let stats = Category::from("DestinyHistoricalStatsDefinition");
/// let key = HashKey::for_category("activitiesCleared", &stats)?;
/// assert_eq!(key.to_sql_literal(), "'activitiesCleared'");
/// # Ok::<(), destiny_core::HashKeyError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HashKey {
    /// Signed 32-bit identifier as stored in the `id` column.
    Numeric(i32),
    /// Text identifier, quoted when rendered into a query.
    Text(String),
}

/// Errors raised when a hash cannot be converted into a [`HashKey`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HashKeyError {
    /// The hash was not an integer.
    #[error("hash {raw:?} is not an integer: {source}")]
    NotNumeric {
        /// Input supplied by the caller.
        raw: String,
        /// Parse failure reported by the standard library.
        #[source]
        source: ParseIntError,
    },
    /// The hash did not fit in 32 bits, signed or unsigned.
    #[error("hash {value} does not fit in 32 bits")]
    OutOfRange {
        /// Parsed integer value.
        value: i64,
    },
}

impl HashKey {
    /// Build the key for `raw` according to the identifier type of `category`.
    ///
    /// Text-keyed categories take `raw` verbatim; every other category parses
    /// and bumps it with [`bump_hash`].
    pub fn for_category(raw: &str, category: &Category) -> Result<Self, HashKeyError> {
        if category.has_text_identifier() {
            Ok(Self::Text(raw.to_owned()))
        } else {
            parse_hash(raw).map(Self::Numeric)
        }
    }

    /// Render the key as a SQL literal.
    ///
    /// Text keys are wrapped in single quotes with embedded quotes doubled.
    #[must_use]
    pub fn to_sql_literal(&self) -> String {
        match self {
            Self::Numeric(value) => value.to_string(),
            Self::Text(text) => format!("'{}'", text.replace('\'', "''")),
        }
    }
}

impl From<u32> for HashKey {
    fn from(value: u32) -> Self {
        Self::Numeric(value.cast_signed())
    }
}

impl fmt::Display for HashKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// Convert a published hash into the signed value stored in manifest tables.
///
/// Values above `i32::MAX` but within `u32` wrap to their two's complement
/// representation; values already within `i32` are returned unchanged.
///
/// # Examples
/// ```
/// use destiny_core::bump_hash;
///
/// assert_eq!(bump_hash(4_294_967_295), Ok(-1));
/// assert_eq!(bump_hash(1_234), Ok(1_234));
/// assert_eq!(bump_hash(-5), Ok(-5));
/// assert!(bump_hash(4_294_967_296).is_err());
/// ```
pub fn bump_hash(value: i64) -> Result<i32, HashKeyError> {
    i32::try_from(value)
        .or_else(|_| u32::try_from(value).map(u32::cast_signed))
        .map_err(|_| HashKeyError::OutOfRange { value })
}

fn parse_hash(raw: &str) -> Result<i32, HashKeyError> {
    let value = raw
        .trim()
        .parse::<i64>()
        .map_err(|source| HashKeyError::NotNumeric {
            raw: raw.to_owned(),
            source,
        })?;
    bump_hash(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HISTORICAL_STATS_CATEGORY;
    use rstest::{fixture, rstest};

    #[fixture]
    fn activity() -> Category {
        Category::from("DestinyActivityDefinition")
    }

    #[rstest]
    #[case("2147483647", 2_147_483_647)]
    #[case("2147483648", -2_147_483_648)]
    #[case("4294967295", -1)]
    #[case("-1", -1)]
    #[case(" 17 ", 17)]
    fn bumps_numeric_hashes(activity: Category, #[case] raw: &str, #[case] expected: i32) {
        assert_eq!(
            HashKey::for_category(raw, &activity),
            Ok(HashKey::Numeric(expected))
        );
    }

    #[rstest]
    #[case("4294967296")]
    #[case("-2147483649")]
    fn rejects_hashes_wider_than_32_bits(activity: Category, #[case] raw: &str) {
        let err = HashKey::for_category(raw, &activity).expect_err("hash should overflow");
        assert!(matches!(err, HashKeyError::OutOfRange { .. }));
    }

    #[rstest]
    fn rejects_non_numeric_hash_for_numeric_category(activity: Category) {
        let err = HashKey::for_category("abc", &activity).expect_err("hash should be rejected");
        assert!(matches!(err, HashKeyError::NotNumeric { raw, .. } if raw == "abc"));
    }

    #[rstest]
    fn historical_stats_keys_are_quoted_not_bumped() {
        let category = Category::from(HISTORICAL_STATS_CATEGORY);
        let key = HashKey::for_category("4294967295", &category).expect("text key");
        assert_eq!(key, HashKey::Text("4294967295".to_owned()));
        assert_eq!(key.to_sql_literal(), "'4294967295'");
    }

    #[rstest]
    fn text_literals_double_embedded_quotes() {
        let key = HashKey::Text("it's".to_owned());
        assert_eq!(key.to_sql_literal(), "'it''s'");
    }

    #[rstest]
    fn converts_unsigned_hashes() {
        assert_eq!(HashKey::from(3_881_495_763_u32), HashKey::Numeric(-413_471_533));
    }
}

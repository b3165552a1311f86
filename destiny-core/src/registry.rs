//! Per-locale record of which manifest database is available on disk.

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};

use crate::Locale;

/// Maps every supported [`Locale`] to the local manifest database, if known.
///
/// All locales are present from construction with an unset path; the key set
/// never grows or shrinks.
///
/// # Examples
/// ```
/// use camino::Utf8PathBuf;
/// use destiny_core::{Locale, LocaleRegistry};
///
/// let mut registry = LocaleRegistry::new();
/// assert!(registry.path(Locale::French).is_none());
/// registry.set(Locale::French, Utf8PathBuf::from("manifests/world_sql_content_fr.content"));
/// assert!(registry.is_resolved(Locale::French));
/// assert_eq!(registry.iter().count(), Locale::ALL.len());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleRegistry {
    slots: BTreeMap<Locale, Option<Utf8PathBuf>>,
}

impl Default for LocaleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LocaleRegistry {
    /// Construct a registry with every supported locale unresolved.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Locale::ALL.into_iter().map(|locale| (locale, None)).collect(),
        }
    }

    /// Path of the manifest database recorded for `locale`.
    #[must_use]
    pub fn path(&self, locale: Locale) -> Option<&Utf8Path> {
        self.slots
            .get(&locale)
            .and_then(Option::as_deref)
    }

    /// Whether a manifest database has been recorded for `locale`.
    #[must_use]
    pub fn is_resolved(&self, locale: Locale) -> bool {
        self.path(locale).is_some()
    }

    /// Record `path` as the manifest database for `locale`, returning the
    /// previously recorded path.
    pub fn set(&mut self, locale: Locale, path: Utf8PathBuf) -> Option<Utf8PathBuf> {
        self.slots
            .get_mut(&locale)
            .and_then(|slot| slot.replace(path))
    }

    /// Iterate over every locale and its recorded path in [`Locale::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Locale, Option<&Utf8Path>)> + '_ {
        self.slots
            .iter()
            .map(|(locale, path)| (*locale, path.as_deref()))
    }
}

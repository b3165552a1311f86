//! Locales in which Bungie publishes the Destiny 2 manifest.
//!
//! The set is closed: every manifest index lists exactly these codes under
//! `mobileWorldContentPaths`, so parsing anything else is an error.
//!
//! # Examples
//! ```
//! use destiny_core::Locale;
//!
//! let locale: Locale = "PT-BR".parse()?;
//! assert_eq!(locale, Locale::BrazilianPortuguese);
//! assert_eq!(locale.code(), "pt-br");
//! # Ok::<(), destiny_core::LocaleError>(())
//! ```

use std::{fmt, str::FromStr};

use thiserror::Error;

/// A supported manifest locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub enum Locale {
    /// `en`
    English,
    /// `fr`
    French,
    /// `es`
    Spanish,
    /// `de`
    German,
    /// `it`
    Italian,
    /// `ja`
    Japanese,
    /// `pt-br`
    BrazilianPortuguese,
    /// `es-mx`
    MexicanSpanish,
    /// `ru`
    Russian,
    /// `pl`
    Polish,
    /// `ko`
    Korean,
    /// `zh-cht`
    TraditionalChinese,
    /// `zh-chs`
    SimplifiedChinese,
}

impl Locale {
    /// Every supported locale, in the order Bungie lists them.
    pub const ALL: [Self; 13] = [
        Self::English,
        Self::French,
        Self::Spanish,
        Self::German,
        Self::Italian,
        Self::Japanese,
        Self::BrazilianPortuguese,
        Self::MexicanSpanish,
        Self::Russian,
        Self::Polish,
        Self::Korean,
        Self::TraditionalChinese,
        Self::SimplifiedChinese,
    ];

    /// Return the lowercase code used as the key in the manifest index.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::French => "fr",
            Self::Spanish => "es",
            Self::German => "de",
            Self::Italian => "it",
            Self::Japanese => "ja",
            Self::BrazilianPortuguese => "pt-br",
            Self::MexicanSpanish => "es-mx",
            Self::Russian => "ru",
            Self::Polish => "pl",
            Self::Korean => "ko",
            Self::TraditionalChinese => "zh-cht",
            Self::SimplifiedChinese => "zh-chs",
        }
    }
}

/// Errors returned when a locale code is not part of the supported set.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LocaleError {
    /// The code did not match any supported locale after case folding.
    #[error("the '{code}' locale could not be found")]
    Unsupported {
        /// Lowercased code supplied by the caller.
        code: String,
    },
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|locale| locale.code() == code)
            .ok_or(LocaleError::Unsupported { code })
    }
}

impl TryFrom<String> for Locale {
    type Error = LocaleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Locale> for String {
    fn from(value: Locale) -> Self {
        value.code().to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("en", Locale::English)]
    #[case("EN", Locale::English)]
    #[case("Es-MX", Locale::MexicanSpanish)]
    #[case("zh-CHS", Locale::SimplifiedChinese)]
    fn parses_codes_ignoring_case(#[case] raw: &str, #[case] expected: Locale) {
        assert_eq!(raw.parse::<Locale>(), Ok(expected));
    }

    #[rstest]
    #[case("EN-GB", "en-gb")]
    #[case("", "")]
    #[case(" en", " en")]
    fn rejects_unknown_codes(#[case] raw: &str, #[case] reported: &str) {
        let err = raw.parse::<Locale>().expect_err("code should be rejected");
        assert_eq!(
            err,
            LocaleError::Unsupported {
                code: reported.to_owned()
            }
        );
    }

    #[rstest]
    fn codes_round_trip_through_display() {
        for locale in Locale::ALL {
            assert_eq!(locale.to_string().parse::<Locale>(), Ok(locale));
        }
    }

    #[rstest]
    fn error_message_names_the_locale() {
        let err = "klingon".parse::<Locale>().expect_err("unknown locale");
        assert_eq!(err.to_string(), "the 'klingon' locale could not be found");
    }
}

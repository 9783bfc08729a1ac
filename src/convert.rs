//! Convert identifiers between country code representations and apply letter case.

use std::fmt;

use serde::Deserialize;

use crate::catalog::{CatalogEntry, ReferenceCatalog};

/// Target representation for a converted identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputForm {
    /// Two-letter country code (ISO 3166-1 alpha-2), e.g. US
    #[default]
    Alpha2,
    /// Three-letter country code (ISO 3166-1 alpha-3), e.g. USA
    Alpha3,
    /// Complete country name, e.g. United States
    #[serde(alias = "full-name")]
    #[value(alias = "full_name")]
    FullName,
    /// Primary language code (ISO 639-1), e.g. EN
    Language,
}

/// Letter case applied to the converted identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CaseMode {
    /// lowercase
    #[default]
    Lower,
    /// Capitalise every word
    Title,
    /// UPPERCASE
    Upper,
}

impl OutputForm {
    /// Pick the representation from a catalog entry.
    /// Returns `None` for `Language` when the entry has no language codes.
    #[must_use]
    pub fn select(self, entry: &CatalogEntry) -> Option<&str> {
        match self {
            Self::Alpha2 => Some(entry.alpha2.as_str()),
            Self::Alpha3 => Some(entry.alpha3.as_str()),
            Self::FullName => Some(entry.country_name.as_str()),
            Self::Language => entry.primary_language(),
        }
    }
}

impl fmt::Display for OutputForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Alpha2 => "alpha2",
            Self::Alpha3 => "alpha3",
            Self::FullName => "full_name",
            Self::Language => "language",
        };
        write!(f, "{name}")
    }
}

impl CaseMode {
    /// Apply the case mode. Applying it again gives the same result.
    #[must_use]
    pub fn apply(self, value: &str) -> String {
        match self {
            Self::Lower => value.to_lowercase(),
            Self::Upper => value.to_uppercase(),
            Self::Title => capitalize_words(value),
        }
    }
}

impl fmt::Display for CaseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Lower => "lower",
            Self::Title => "title",
            Self::Upper => "upper",
        };
        write!(f, "{name}")
    }
}

/// Uppercase the first letter of every run of letters and lowercase the rest,
/// so `côte d'ivoire` becomes `Côte D'Ivoire`.
fn capitalize_words(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut previous_is_letter = false;
    for c in value.chars() {
        if previous_is_letter {
            result.extend(c.to_lowercase());
        } else {
            result.extend(c.to_uppercase());
        }
        previous_is_letter = c.is_alphabetic();
    }
    result
}

/// Find the catalog entry for an identifier of any kind.
///
/// The value is compared against each entry's country name and codes in catalog order,
/// so an identifier shared by several entries resolves to the first one.
#[must_use]
pub fn resolve<'a>(catalog: &'a ReferenceCatalog, identifier: &str) -> Option<&'a CatalogEntry> {
    let value = identifier.trim().to_lowercase();
    if value.is_empty() {
        return None;
    }
    catalog
        .entries()
        .iter()
        .find(|entry| entry.country_name == value || entry.has_code(&value))
}

/// Convert an identifier to the requested representation.
///
/// Letter case is left as stored in the catalog; use [`CaseMode::apply`] on the result.
/// Returns `None` if the identifier does not resolve to a catalog entry.
#[must_use]
pub fn convert(catalog: &ReferenceCatalog, identifier: &str, form: OutputForm) -> Option<String> {
    resolve(catalog, identifier)
        .and_then(|entry| form.select(entry))
        .map(ToString::to_string)
}

#[cfg(test)]
mod convert_tests {
    use super::*;

    fn catalog() -> ReferenceCatalog {
        ReferenceCatalog::from_json_str(
            r#"{
                "united states": {"alpha2": "us", "alpha3": "usa", "languages": "en"},
                "switzerland": {"alpha2": "CH", "alpha3": "CHE", "languages": "de,fr,it"},
                "germany": {"alpha2": "de", "alpha3": "deu", "languages": "de"},
                "vatican": {"alpha2": "va", "alpha3": "vat", "languages": ""}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn converts_between_all_forms() {
        let catalog = catalog();
        assert_eq!(convert(&catalog, "united states", OutputForm::Alpha2).as_deref(), Some("us"));
        assert_eq!(convert(&catalog, "US", OutputForm::Alpha3).as_deref(), Some("usa"));
        assert_eq!(convert(&catalog, "usa", OutputForm::FullName).as_deref(), Some("united states"));
        assert_eq!(convert(&catalog, "che", OutputForm::Language).as_deref(), Some("de"));
        assert_eq!(convert(&catalog, "it", OutputForm::Alpha3).as_deref(), Some("CHE"));
    }

    #[test]
    fn shared_code_resolves_to_first_entry() {
        // "de" is a language of switzerland before it is germany's alpha-2
        let catalog = catalog();
        let entry = resolve(&catalog, "DE").unwrap();
        assert_eq!(entry.country_name, "switzerland");
    }

    #[test]
    fn first_entry_in_catalog_order_wins() {
        let catalog = ReferenceCatalog::from_json_str(
            r#"{
                "alpha": {"alpha2": "al", "alpha3": "alp", "languages": "beta"},
                "beta": {"alpha2": "be", "alpha3": "bet", "languages": "xx"}
            }"#,
        )
        .unwrap();
        // "beta" is a language of alpha before it is a country name
        assert_eq!(resolve(&catalog, "Beta").unwrap().country_name, "alpha");
        assert_eq!(resolve(&catalog, "bet").unwrap().country_name, "beta");
    }

    #[test]
    fn unknown_identifier_returns_none() {
        let catalog = catalog();
        assert!(convert(&catalog, "atlantis", OutputForm::Alpha2).is_none());
        assert!(convert(&catalog, "", OutputForm::Alpha2).is_none());
        assert!(resolve(&catalog, "  ").is_none());
    }

    #[test]
    fn language_without_codes_returns_none() {
        let catalog = catalog();
        assert!(convert(&catalog, "vatican", OutputForm::Language).is_none());
        assert_eq!(convert(&catalog, "vatican", OutputForm::Alpha2).as_deref(), Some("va"));
    }

    #[test]
    fn round_trip_through_alpha2_returns_same_country() {
        let catalog = ReferenceCatalog::from_json_str(
            r#"{
                "united states": {"alpha2": "us", "alpha3": "usa", "languages": "en"},
                "switzerland": {"alpha2": "CH", "alpha3": "CHE", "languages": "de,fr,it"},
                "finland": {"alpha2": "fi", "alpha3": "fin", "languages": "fi,sv"},
                "japan": {"alpha2": "jp", "alpha3": "jpn", "languages": "ja"}
            }"#,
        )
        .unwrap();
        for entry in catalog.entries() {
            for (_, identifier) in entry.identifiers() {
                let direct = resolve(&catalog, identifier).unwrap();
                let alpha2 = convert(&catalog, identifier, OutputForm::Alpha2).unwrap();
                let full_name = convert(&catalog, &alpha2, OutputForm::FullName).unwrap();
                assert_eq!(resolve(&catalog, &full_name), Some(direct), "identifier: {identifier}");
                assert_eq!(direct, entry);
            }
        }
    }

    #[test]
    fn case_modes() {
        assert_eq!(CaseMode::Lower.apply("United States"), "united states");
        assert_eq!(CaseMode::Upper.apply("us"), "US");
        assert_eq!(CaseMode::Title.apply("united states"), "United States");
        assert_eq!(CaseMode::Title.apply("USA"), "Usa");
    }

    #[test]
    fn title_case_capitalizes_every_word() {
        assert_eq!(CaseMode::Title.apply("bosnia and herzegovina"), "Bosnia And Herzegovina");
        assert_eq!(CaseMode::Title.apply("isle of man"), "Isle Of Man");
        assert_eq!(CaseMode::Title.apply("united states of america"), "United States Of America");
        assert_eq!(CaseMode::Title.apply("côte d'ivoire"), "Côte D'Ivoire");
        assert_eq!(CaseMode::Title.apply("GUINEA-BISSAU"), "Guinea-Bissau");
        assert_eq!(CaseMode::Title.apply("timor_leste2x"), "Timor_Leste2X");
    }

    #[test]
    fn case_modes_are_idempotent() {
        for mode in [CaseMode::Lower, CaseMode::Title, CaseMode::Upper] {
            for value in ["united states", "USA", "de", "Côte d'Ivoire", "bosnia and herzegovina"] {
                let once = mode.apply(value);
                assert_eq!(mode.apply(&once), once, "mode: {mode}, value: {value}");
            }
        }
    }

    #[test]
    fn display_names() {
        assert_eq!(OutputForm::FullName.to_string(), "full_name");
        assert_eq!(CaseMode::Title.to_string(), "title");
    }
}

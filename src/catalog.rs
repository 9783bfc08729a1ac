//! Country and language reference catalog.
//!
//! The catalog is loaded once from a JSON mapping keyed by country name:
//!
//! ```json
//! { "united states": { "alpha2": "us", "alpha3": "usa", "languages": "en" } }
//! ```
//!
//! Iteration order follows the order of the source file,
//! which makes identifier tie-breaks reproducible.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use itertools::Itertools;
use serde::Deserialize;

use crate::error::CatalogError;
use crate::identifier::IdentifierKind;

/// Separator used for language code lists in the catalog source.
pub const LANGUAGE_SEPARATOR: char = ',';

/// Immutable record for one country.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Canonical lowercase country name.
    pub country_name: String,
    pub alpha2: String,
    pub alpha3: String,
    /// Language codes, primary language first.
    pub language_codes: Vec<String>,
}

/// Entry as it appears in the JSON source.
#[derive(Debug, Deserialize)]
struct RawEntry {
    alpha2: String,
    alpha3: String,
    #[serde(default)]
    languages: String,
}

/// Maps a lowercase language code to the catalog entries using it, in catalog order.
#[derive(Debug, Default, Clone)]
pub struct LanguageIndex {
    index: HashMap<String, Vec<usize>>,
}

/// Lookup table of all known countries.
#[derive(Debug, Clone)]
pub struct ReferenceCatalog {
    entries: Vec<CatalogEntry>,
    by_name: HashMap<String, usize>,
    language_index: LanguageIndex,
    alternation: String,
}

/// Split a language list from the catalog source into trimmed, non-empty codes.
#[must_use]
pub fn parse_language_codes(languages: &str) -> Vec<String> {
    languages
        .split(LANGUAGE_SEPARATOR)
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(ToString::to_string)
        .collect()
}

impl CatalogEntry {
    /// Create an entry from its source fields.
    #[must_use]
    pub fn new(country_name: &str, alpha2: &str, alpha3: &str, languages: &str) -> Self {
        Self {
            country_name: country_name.trim().to_lowercase(),
            alpha2: alpha2.trim().to_string(),
            alpha3: alpha3.trim().to_string(),
            language_codes: parse_language_codes(languages),
        }
    }

    /// First language code, if the entry has any.
    #[must_use]
    pub fn primary_language(&self) -> Option<&str> {
        self.language_codes.first().map(String::as_str)
    }

    /// All identifier strings of this entry in scan order:
    /// country name, alpha-2, alpha-3, then each language code.
    pub fn identifiers(&self) -> impl Iterator<Item = (IdentifierKind, &str)> {
        [
            (IdentifierKind::CountryName, self.country_name.as_str()),
            (IdentifierKind::Alpha2, self.alpha2.as_str()),
            (IdentifierKind::Alpha3, self.alpha3.as_str()),
        ]
        .into_iter()
        .chain(
            self.language_codes
                .iter()
                .map(|code| (IdentifierKind::Language, code.as_str())),
        )
    }

    /// Check if the lowercase value equals one of the entry's codes (alpha-2, alpha-3 or a language).
    #[must_use]
    pub fn has_code(&self, value_lower: &str) -> bool {
        self.alpha2.to_lowercase() == value_lower
            || self.alpha3.to_lowercase() == value_lower
            || self.language_codes.iter().any(|code| code.to_lowercase() == value_lower)
    }
}

impl LanguageIndex {
    fn build(entries: &[CatalogEntry]) -> Self {
        let mut index: HashMap<String, Vec<usize>> = HashMap::new();
        for (position, entry) in entries.iter().enumerate() {
            for code in &entry.language_codes {
                let positions = index.entry(code.to_lowercase()).or_default();
                if !positions.contains(&position) {
                    positions.push(position);
                }
            }
        }
        Self { index }
    }

    /// Catalog positions of the entries that list the given language code.
    #[must_use]
    pub fn positions(&self, code: &str) -> &[usize] {
        self.index.get(&code.to_lowercase()).map_or(&[][..], Vec::as_slice)
    }

    /// All indexed language codes in sorted order.
    #[must_use]
    pub fn codes(&self) -> Vec<&str> {
        self.index.keys().map(String::as_str).sorted_unstable().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl ReferenceCatalog {
    /// Build a catalog from entries in iteration order.
    ///
    /// Entries whose country name repeats an earlier one are dropped.
    #[must_use]
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        let mut by_name = HashMap::new();
        let mut unique = Vec::with_capacity(entries.len());
        for entry in entries {
            if by_name.contains_key(&entry.country_name) {
                crate::print_warning!("Ignoring duplicate catalog entry: {}", entry.country_name);
                continue;
            }
            by_name.insert(entry.country_name.clone(), unique.len());
            unique.push(entry);
        }

        let language_index = LanguageIndex::build(&unique);
        let alternation = Self::build_alternation(&unique);
        Self {
            entries: unique,
            by_name,
            language_index,
            alternation,
        }
    }

    /// Minimal catalog used when the catalog source is unavailable.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(vec![CatalogEntry::new("united states", "us", "usa", "en")])
    }

    /// Parse a catalog from JSON text.
    ///
    /// # Errors
    /// Returns an error if the JSON is invalid or an entry is missing its codes.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let raw: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)?;
        let mut entries = Vec::with_capacity(raw.len());
        for (country, value) in raw {
            let raw_entry: RawEntry = serde_json::from_value(value).map_err(|e| CatalogError::InvalidEntry {
                country: country.clone(),
                reason: e.to_string(),
            })?;
            let entry = CatalogEntry::new(&country, &raw_entry.alpha2, &raw_entry.alpha3, &raw_entry.languages);
            if entry.country_name.is_empty() || entry.alpha2.is_empty() || entry.alpha3.is_empty() {
                return Err(CatalogError::InvalidEntry {
                    country,
                    reason: "country name, alpha2 and alpha3 must not be empty".to_string(),
                });
            }
            entries.push(entry);
        }
        Ok(Self::new(entries))
    }

    /// Read and parse a catalog JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Load the catalog from the given file,
    /// falling back to the built-in catalog if it cannot be read, parsed, or is empty.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        match Self::from_file(path) {
            Ok(catalog) if !catalog.is_empty() => catalog,
            Ok(_) => {
                crate::print_warning!(
                    "Catalog {} has no entries, using built-in catalog",
                    path.display()
                );
                Self::builtin()
            }
            Err(error) => {
                crate::print_warning!("{error}\nUsing built-in catalog");
                Self::builtin()
            }
        }
    }

    /// All entries in catalog order.
    #[must_use]
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive lookup by country name.
    #[must_use]
    pub fn get(&self, country_name: &str) -> Option<&CatalogEntry> {
        self.by_name
            .get(&country_name.trim().to_lowercase())
            .map(|&position| &self.entries[position])
    }

    #[must_use]
    pub const fn language_index(&self) -> &LanguageIndex {
        &self.language_index
    }

    /// Entries that list the given language code, in catalog order.
    #[must_use]
    pub fn countries_for_language(&self, code: &str) -> Vec<&CatalogEntry> {
        self.language_index
            .positions(code)
            .iter()
            .map(|&position| &self.entries[position])
            .collect()
    }

    /// Regex alternation of every identifier in the catalog, longest first, each escaped.
    #[must_use]
    pub fn alternation(&self) -> &str {
        &self.alternation
    }

    /// All identifiers, case-insensitively deduplicated and stably sorted longest first.
    ///
    /// Names come before codes so that equal-length alternatives keep the order
    /// country names, then alpha-2, alpha-3 and languages per entry.
    fn identifier_alternatives(entries: &[CatalogEntry]) -> Vec<&str> {
        let names = entries.iter().map(|entry| entry.country_name.as_str());
        let codes = entries.iter().flat_map(|entry| {
            [entry.alpha2.as_str(), entry.alpha3.as_str()]
                .into_iter()
                .chain(entry.language_codes.iter().map(String::as_str))
        });

        let mut seen = HashSet::new();
        let mut alternatives: Vec<&str> = names
            .chain(codes)
            .filter(|value| !value.is_empty() && seen.insert(value.to_lowercase()))
            .collect();

        alternatives.sort_by_key(|value| std::cmp::Reverse(value.chars().count()));
        alternatives
    }

    fn build_alternation(entries: &[CatalogEntry]) -> String {
        Self::identifier_alternatives(entries)
            .into_iter()
            .map(regex::escape)
            .join("|")
    }
}

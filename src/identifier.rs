//! Locate a country or language identifier inside a filename.

use std::fmt;

use crate::catalog::ReferenceCatalog;

/// The kind of identifier that was found.
///
/// Declared from lowest to highest priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IdentifierKind {
    Language,
    Alpha2,
    Alpha3,
    CountryName,
}

/// A located identifier. Offsets are byte offsets into the scanned text
/// and always fall on character boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierMatch {
    pub start: usize,
    pub end: usize,
    /// The exact substring of the scanned text.
    pub value: String,
    pub kind: IdentifierKind,
}

/// Lowercased copy of a string that remembers where each original character starts.
struct FoldedText {
    folded: String,
    /// Original byte offset for each folded byte offset that begins a folded character sequence.
    boundaries: Vec<Option<usize>>,
}

impl IdentifierKind {
    /// Higher value wins when several identifiers are found.
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::CountryName => 3,
            Self::Alpha3 => 2,
            Self::Alpha2 => 1,
            Self::Language => 0,
        }
    }
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CountryName => "country name",
            Self::Alpha3 => "alpha-3",
            Self::Alpha2 => "alpha-2",
            Self::Language => "language",
        };
        write!(f, "{name}")
    }
}

impl IdentifierMatch {
    /// Match length in characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.value.chars().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Ranking key: kind priority first, then length.
    #[must_use]
    pub fn rank(&self) -> (u8, usize) {
        (self.kind.priority(), self.len())
    }
}

impl fmt::Display for IdentifierMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' ({}) at {}..{}", self.value, self.kind, self.start, self.end)
    }
}

impl FoldedText {
    fn new(text: &str) -> Self {
        let mut folded = String::with_capacity(text.len());
        let mut boundaries = Vec::with_capacity(text.len() + 1);
        for (index, c) in text.char_indices() {
            let before = folded.len();
            folded.extend(c.to_lowercase());
            boundaries.push(Some(index));
            boundaries.resize(folded.len(), None);
            debug_assert!(folded.len() > before);
        }
        boundaries.push(Some(text.len()));
        Self { folded, boundaries }
    }

    /// Find the leftmost occurrence of `needle` (already lowercase)
    /// that maps back to whole characters in the original text.
    fn find(&self, needle: &str) -> Option<(usize, usize)> {
        if needle.is_empty() {
            return None;
        }
        self.folded.match_indices(needle).find_map(|(position, _)| {
            let start = self.boundaries.get(position).copied().flatten()?;
            let end = self.boundaries.get(position + needle.len()).copied().flatten()?;
            Some((start, end))
        })
    }
}

/// Collect every identifier occurrence in `text`.
///
/// Each identifier form of each entry contributes at most its leftmost occurrence.
/// Candidates are returned in scan order: catalog order,
/// and within an entry country name, alpha-2, alpha-3, then language codes.
#[must_use]
pub fn candidates(catalog: &ReferenceCatalog, text: &str) -> Vec<IdentifierMatch> {
    let folded = FoldedText::new(text);
    catalog
        .entries()
        .iter()
        .flat_map(|entry| entry.identifiers())
        .filter_map(|(kind, identifier)| {
            let (start, end) = folded.find(&identifier.to_lowercase())?;
            Some(IdentifierMatch {
                start,
                end,
                value: text[start..end].to_string(),
                kind,
            })
        })
        .collect()
}

/// Find the best identifier in `text`.
///
/// The highest `(kind priority, length)` wins and ties go to the first candidate in scan order.
/// Returns `None` if the text contains no known identifier.
#[must_use]
pub fn locate(catalog: &ReferenceCatalog, text: &str) -> Option<IdentifierMatch> {
    select_best(candidates(catalog, text))
}

fn select_best(candidates: Vec<IdentifierMatch>) -> Option<IdentifierMatch> {
    let mut best: Option<IdentifierMatch> = None;
    for candidate in candidates {
        if best.as_ref().is_none_or(|current| candidate.rank() > current.rank()) {
            best = Some(candidate);
        }
    }
    best
}

#[cfg(test)]
mod identifier_tests {
    use super::*;

    use crate::catalog::CatalogEntry;

    fn catalog() -> ReferenceCatalog {
        ReferenceCatalog::new(vec![
            CatalogEntry::new("united states", "us", "usa", "en"),
            CatalogEntry::new("germany", "de", "deu", "de"),
            CatalogEntry::new("united kingdom", "gb", "gbr", "en"),
        ])
    }

    #[test]
    fn locates_country_name() {
        let found = locate(&catalog(), "report_united states_2024").unwrap();
        assert_eq!(found.kind, IdentifierKind::CountryName);
        assert_eq!(found.start, 7);
        assert_eq!(found.end, 20);
        assert_eq!(found.value, "united states");
    }

    #[test]
    fn alpha3_beats_alpha2_prefix() {
        let found = locate(&catalog(), "invoice_usa").unwrap();
        assert_eq!(found.kind, IdentifierKind::Alpha3);
        assert_eq!(found.value, "usa");
        assert_eq!((found.start, found.end), (8, 11));
    }

    #[test]
    fn alpha3_beats_alpha2_regardless_of_position() {
        // alpha-2 "us" occurs earlier in the text than alpha-3 "usa"
        let found = locate(&catalog(), "us-notes-usa").unwrap();
        assert_eq!(found.kind, IdentifierKind::Alpha3);
        assert_eq!(found.start, 9);
    }

    #[test]
    fn preserves_original_case_in_value() {
        let found = locate(&catalog(), "Report_GERMANY_Q1").unwrap();
        assert_eq!(found.value, "GERMANY");
        assert_eq!(found.kind, IdentifierKind::CountryName);
    }

    #[test]
    fn equal_rank_resolves_to_first_in_scan_order() {
        // "de" is both the alpha-2 and the language of germany: alpha-2 ranks higher
        let found = locate(&catalog(), "manual_de").unwrap();
        assert_eq!(found.kind, IdentifierKind::Alpha2);

        // "en" is a language of two entries: the first entry wins
        let candidates = candidates(&catalog(), "doc_en");
        assert_eq!(candidates.len(), 2);
        assert_eq!(select_best(candidates).unwrap().kind, IdentifierKind::Language);
    }

    #[test]
    fn longer_match_wins_within_same_kind() {
        let catalog = ReferenceCatalog::new(vec![
            CatalogEntry::new("niger", "ne", "ner", "fr"),
            CatalogEntry::new("nigeria", "ng", "nga", "en"),
        ]);
        let found = locate(&catalog, "data_nigeria").unwrap();
        assert_eq!(found.value, "nigeria");
        assert_eq!(found.len(), 7);
    }

    #[test]
    fn no_identifier_returns_none() {
        assert!(locate(&catalog(), "quarterly_zzz_2024").is_none());
        assert!(locate(&catalog(), "").is_none());
    }

    #[test]
    fn offsets_map_back_through_non_ascii_text() {
        let found = locate(&catalog(), "Ärzte_GERMANY").unwrap();
        assert_eq!(found.value, "GERMANY");
        assert_eq!(&"Ärzte_GERMANY"[found.start..found.end], "GERMANY");
    }

    #[test]
    fn kind_priority_order() {
        assert!(IdentifierKind::CountryName > IdentifierKind::Alpha3);
        assert!(IdentifierKind::Alpha3 > IdentifierKind::Alpha2);
        assert!(IdentifierKind::Alpha2 > IdentifierKind::Language);
        assert_eq!(IdentifierKind::CountryName.priority(), 3);
        assert_eq!(IdentifierKind::Language.priority(), 0);
    }

    #[test]
    fn stress_catalog_with_overlapping_codes_is_deterministic() {
        // Every entry's alpha-2 equals the next entry's language code.
        let entries: Vec<CatalogEntry> = (0..250)
            .map(|i| {
                let alpha2 = format!("{}{}", char::from(b'a' + (i / 26) as u8), char::from(b'a' + (i % 26) as u8));
                let language = format!(
                    "{}{}",
                    char::from(b'a' + (((i + 249) % 250) / 26) as u8),
                    char::from(b'a' + (((i + 249) % 250) % 26) as u8)
                );
                CatalogEntry::new(&format!("country number {i}"), &alpha2, &format!("{alpha2}x"), &language)
            })
            .collect();
        let catalog = ReferenceCatalog::new(entries);
        assert_eq!(catalog.len(), 250);

        let first = locate(&catalog, "file_bc_end").unwrap();
        let second = locate(&catalog, "file_bc_end").unwrap();
        assert_eq!(first, second);
        assert_eq!(first.kind, IdentifierKind::Alpha2);
        assert_eq!(first.value, "bc");

        let found = locate(&catalog, "file_country number 12_end").unwrap();
        assert_eq!(found.kind, IdentifierKind::CountryName);
        assert_eq!(found.value, "country number 12");
    }
}

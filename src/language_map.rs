//! Language table for the catalog's search facet
//!
//! feliratok.eu filters search results by language using its own Hungarian
//! labels ("Angol" for English, "Német" for German, ...). This module maps
//! two-letter ISO 639-1 codes onto those labels.

use thiserror::Error;

/// Errors that can occur while resolving a language code
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LanguageError {
    /// The code is not part of the catalog's language table
    #[error("Unsupported language code: {0}")]
    UnsupportedLanguage(String),
}

/// A language the catalog can filter by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogLanguage {
    /// ISO 639-1 code, e.g. "hu"
    pub code: &'static str,
    /// ISO 639-2/B code, e.g. "hun"
    pub three_letter_code: &'static str,
    /// The label the catalog uses in its `nyelv` search parameter
    pub facet_label: &'static str,
}

const fn language(
    code: &'static str,
    three_letter_code: &'static str,
    facet_label: &'static str,
) -> CatalogLanguage {
    CatalogLanguage {
        code,
        three_letter_code,
        facet_label,
    }
}

/// Every language the catalog's search facet accepts
pub const CATALOG_LANGUAGES: &[CatalogLanguage] = &[
    language("hu", "hun", "Magyar"),
    language("en", "eng", "Angol"),
    language("sq", "alb", "Albán"),
    language("ar", "ara", "Arab"),
    language("bg", "bul", "Bolgár"),
    language("pt", "por", "Brazíliai portugál"),
    language("cs", "cze", "Cseh"),
    language("da", "dan", "Dán"),
    language("fi", "fin", "Finn"),
    // Dutch / Flemish
    language("nl", "dut", "Holland / Flamand"),
    language("fr", "fre", "Francia"),
    language("el", "gre", "Görög"),
    language("he", "heb", "Héber"),
    language("hr", "hrv", "Horvát"),
    language("ko", "kor", "Koreai"),
    language("pl", "pol", "Lengyel"),
    language("de", "ger", "Német"),
    language("no", "nor", "Norvég"),
    language("it", "ita", "Olasz"),
    language("ru", "rus", "Orosz"),
    language("ro", "rum", "Román"),
    language("es", "spa", "Spanyol"),
    language("sv", "swe", "Svéd"),
    language("sr", "srp", "Szerb"),
    language("sl", "slv", "Szlovén"),
    language("sk", "slo", "Szlovák"),
    language("tr", "tur", "Török"),
];

/// Looks up the table entry for a two-letter language code
///
/// The lookup is case-sensitive and exact: "EN" or "en-US" are not found.
pub fn lookup_language(code: &str) -> Result<&'static CatalogLanguage, LanguageError> {
    CATALOG_LANGUAGES
        .iter()
        .find(|language| language.code == code)
        .ok_or_else(|| LanguageError::UnsupportedLanguage(code.to_string()))
}

/// Cuts a language tag such as "en-US" down to its first two characters
pub fn two_letter_prefix(tag: &str) -> &str {
    tag.char_indices().nth(2).map_or(tag, |(end, _)| &tag[..end])
}

/// Resolves a two-letter language code to the catalog's facet label
///
/// # Examples
///
/// ```
/// use feliratok::resolve_facet_label;
///
/// assert_eq!(resolve_facet_label("hu").unwrap(), "Magyar");
/// assert!(resolve_facet_label("xx").is_err());
/// ```
pub fn resolve_facet_label(code: &str) -> Result<&'static str, LanguageError> {
    lookup_language(code).map(|language| language.facet_label)
}

//! Title filtering for catalog search results
//!
//! The catalog search is a loose substring search, so a query for "Dune"
//! also returns "Dune: Part Two". With exact matching enabled only rows whose
//! title equals the requested title are kept.

use super::catalog_parser::SubtitleCandidate;
use regex::Regex;
use std::sync::LazyLock;

/// Format marker the catalog appends to some titles
static SUBRIP_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\(SubRip\)").expect("marker pattern should be valid"));

/// Decides whether a candidate belongs in the results for `search_title`.
///
/// Without `exact_match` every candidate is kept. With it, the candidate's
/// title (minus any "(SubRip)" marker and surrounding whitespace) must equal
/// `search_title` ignoring case; candidates without a title are dropped.
pub fn title_matches(candidate: &SubtitleCandidate, search_title: &str, exact_match: bool) -> bool {
    if !exact_match {
        return true;
    }

    match candidate.title.as_deref() {
        Some(title) if !title.is_empty() => {
            let title = SUBRIP_MARKER.replace_all(title, "");
            title.trim().to_lowercase() == search_title.to_lowercase()
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titled(title: &str) -> SubtitleCandidate {
        SubtitleCandidate {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_non_exact_keeps_everything() {
        assert!(title_matches(&titled("Inception 2"), "Inception", false));
        assert!(title_matches(&SubtitleCandidate::default(), "Inception", false));
        assert!(title_matches(&titled(""), "", false));
    }

    #[test]
    fn test_exact_strips_subrip_marker() {
        assert!(title_matches(&titled("Inception (SubRip)"), "Inception", true));
        assert!(title_matches(&titled("Inception (subrip) "), "Inception", true));
    }

    #[test]
    fn test_exact_ignores_case_and_outer_whitespace() {
        assert!(title_matches(&titled("  DUNE: part two "), "Dune: Part Two", true));
        assert!(title_matches(&titled("Árvíztűrő"), "ÁRVÍZTŰRŐ", true));
    }

    #[test]
    fn test_exact_rejects_other_titles() {
        assert!(!title_matches(&titled("Inception 2"), "Inception", true));
        assert!(!title_matches(&titled("Dune: Part Two"), "Dune", true));
    }

    #[test]
    fn test_exact_rejects_missing_title() {
        assert!(!title_matches(&SubtitleCandidate::default(), "Inception", true));
        assert!(!title_matches(&titled(""), "", true));
    }
}

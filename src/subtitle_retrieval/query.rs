//! URL construction for the catalog's search and download endpoints

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters left as-is in query values: the RFC 3986 unreserved set
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

fn encode_value(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}

/// Builds the search URL for a title filtered by a language facet label.
///
/// The title is not validated; an empty title produces an empty `search`
/// parameter.
///
/// # Examples
///
/// ```
/// use feliratok::build_search_url;
///
/// assert_eq!(
///     build_search_url("https://feliratok.eu", "Dune: Part Two", "Angol"),
///     "https://feliratok.eu/?search=Dune%3A%20Part%20Two&nyelv=Angol&tab=film"
/// );
/// ```
pub fn build_search_url(base_url: &str, title: &str, facet_label: &str) -> String {
    format!(
        "{}/?search={}&nyelv={}&tab=film",
        base_url.trim_end_matches('/'),
        encode_value(title),
        encode_value(facet_label)
    )
}

/// Builds the download URL for a catalog subtitle id
pub fn build_download_url(base_url: &str, catalog_id: &str) -> String {
    format!(
        "{}/index.php?action=letolt&felirat={}",
        base_url.trim_end_matches('/'),
        encode_value(catalog_id)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://feliratok.eu";

    #[test]
    fn test_search_url() {
        assert_eq!(
            build_search_url(BASE, "Inception", "Magyar"),
            "https://feliratok.eu/?search=Inception&nyelv=Magyar&tab=film"
        );
    }

    #[test]
    fn test_search_url_encodes_non_ascii_labels() {
        assert_eq!(
            build_search_url(BASE, "Amélie", "Holland / Flamand"),
            "https://feliratok.eu/?search=Am%C3%A9lie&nyelv=Holland%20%2F%20Flamand&tab=film"
        );
    }

    #[test]
    fn test_search_url_escapes_query_syntax() {
        assert_eq!(
            build_search_url(BASE, "Fast & Furious 7?", "Német"),
            "https://feliratok.eu/?search=Fast%20%26%20Furious%207%3F&nyelv=N%C3%A9met&tab=film"
        );
    }

    #[test]
    fn test_search_url_passes_empty_title_through() {
        assert_eq!(
            build_search_url(BASE, "", "Angol"),
            "https://feliratok.eu/?search=&nyelv=Angol&tab=film"
        );
    }

    #[test]
    fn test_trailing_slash_in_base_url() {
        assert_eq!(
            build_search_url("http://localhost:8080/", "x", "Angol"),
            build_search_url("http://localhost:8080", "x", "Angol")
        );
    }

    #[test]
    fn test_download_url() {
        assert_eq!(
            build_download_url(BASE, "998877"),
            "https://feliratok.eu/index.php?action=letolt&felirat=998877"
        );
    }
}

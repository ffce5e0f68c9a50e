//! Extraction of subtitle rows from catalog result pages
//!
//! The catalog has no API; results come back as an HTML table in which every
//! subtitle is a `<tr id="vilagit">` row. Cells are located by position and
//! class the same way the site's template lays them out:
//!
//! ```text
//! <tr id="vilagit">
//!   <td>..</td>
//!   <td class="lang"><small>Angol</small></td>
//!   <td onclick="adatlapnyitas('a_123')">
//!     <div class="magyar">Title</div>
//!     <div class="eredeti">Original title / release</div>
//!   </td>
//!   <td>..</td>
//!   <td>2024-05-01</td>
//!   <td><a href="/index.php?action=letolt&felirat=998877">..</a></td>
//! </tr>
//! ```
//!
//! Scanning is tolerant: attribute order, quoting, case and surrounding markup
//! do not matter, and every field is extracted independently.

use regex::Regex;
use std::sync::LazyLock;

/// Opening tag of a subtitle row, wherever its `id` attribute sits
static ROW_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<tr\b[^>]*?\sid\s*=\s*["']?vilagit["']?(?:\s[^>]*)?/?>"#)
        .expect("row pattern should be valid")
});

/// Anything that ends a row body: its closing tag or the next row
static ROW_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?tr\b").expect("row end pattern should be valid"));

static CELL_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<td\b([^>]*)>").expect("cell pattern should be valid"));

static CELL_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?t[dr]\b").expect("cell end pattern should be valid"));

static DIV: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<div\b([^>]*)>(.*?)</div>").expect("div pattern should be valid")
});

static SMALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<small\b[^>]*>(.*?)</small>").expect("small pattern should be valid")
});

static ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<a\b([^>]*)>").expect("anchor pattern should be valid"));

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag pattern should be valid"));

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("attribute pattern should be valid")
});

/// A subtitle row as extracted from the catalog page.
///
/// Every field is optional: the page may omit or mangle any cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubtitleCandidate {
    /// Display title (the Hungarian title line)
    pub title: Option<String>,
    /// Secondary title line, usually the original title and release name
    pub description: Option<String>,
    /// The catalog's language label, e.g. "Angol"
    pub language_label: Option<String>,
    /// Id used by the catalog's download endpoint
    pub catalog_download_id: Option<String>,
    /// Id of the catalog's detail page for this subtitle
    pub catalog_detail_id: Option<String>,
    /// The publication date exactly as printed on the page
    pub published_date_raw: Option<String>,
}

/// A `<td>` inside a row: its raw attribute string and inner HTML
struct Cell<'a> {
    attributes: &'a str,
    body: &'a str,
}

/// Extracts every subtitle row from a catalog result page, in document order.
///
/// Rows are never dropped here, even when they carry no download link. A page
/// without any subtitle rows yields an empty list.
pub fn parse_catalog_page(html: &str) -> Vec<SubtitleCandidate> {
    row_bodies(html)
        .map(|row| parse_row(&cells(row)))
        .collect()
}

fn parse_row(cells: &[Cell<'_>]) -> SubtitleCandidate {
    let title_cell = cells.get(2);

    SubtitleCandidate {
        title: title_cell.and_then(|cell| div_text(cell.body, "magyar")),
        description: title_cell.and_then(|cell| div_text(cell.body, "eredeti")),
        language_label: cells
            .iter()
            .find(|cell| attribute(cell.attributes, "class").as_deref() == Some("lang"))
            .and_then(|cell| SMALL.captures(cell.body))
            .and_then(|captures| inner_text(&captures[1])),
        catalog_download_id: cells
            .get(5)
            .and_then(|cell| link_target(cell.body))
            .and_then(|href| download_id(&href)),
        catalog_detail_id: title_cell
            .and_then(|cell| attribute(cell.attributes, "onclick"))
            .and_then(|handler| detail_id(&handler)),
        published_date_raw: cells.get(4).and_then(|cell| inner_text(cell.body)),
    }
}

/// Yields the inner HTML of every subtitle row
fn row_bodies(html: &str) -> impl Iterator<Item = &str> {
    ROW_START.find_iter(html).map(move |start| {
        let rest = &html[start.end()..];
        let end = ROW_END.find(rest).map_or(rest.len(), |m| m.start());
        &rest[..end]
    })
}

/// Splits a row body into its cells
fn cells(row: &str) -> Vec<Cell<'_>> {
    CELL_START
        .captures_iter(row)
        .filter_map(|captures| {
            let tag = captures.get(0)?;
            let attributes = captures.get(1)?.as_str();
            let rest = &row[tag.end()..];
            let end = CELL_END.find(rest).map_or(rest.len(), |m| m.start());
            Some(Cell {
                attributes,
                body: &rest[..end],
            })
        })
        .collect()
}

/// Reads the value of attribute `name` from a raw attribute string
fn attribute(attributes: &str, name: &str) -> Option<String> {
    ATTRIBUTE
        .captures_iter(attributes)
        .find(|captures| captures[1].eq_ignore_ascii_case(name))
        .and_then(|captures| {
            captures
                .get(2)
                .or_else(|| captures.get(3))
                .or_else(|| captures.get(4))
                .map(|value| value.as_str().to_string())
        })
}

/// Text of the first `<div>` whose class is exactly `class`
fn div_text(html: &str, class: &str) -> Option<String> {
    DIV.captures_iter(html)
        .find(|captures| attribute(&captures[1], "class").as_deref() == Some(class))
        .and_then(|captures| inner_text(&captures[2]))
}

/// Target of the first link in a cell
fn link_target(html: &str) -> Option<String> {
    ANCHOR
        .captures_iter(html)
        .find_map(|captures| attribute(&captures[1], "href"))
}

/// The download id is whatever follows the last `=` of the link target
fn download_id(href: &str) -> Option<String> {
    let id = href.rsplit('=').next()?.trim();
    (!id.is_empty()).then(|| id.to_string())
}

/// Pulls the id out of an event handler such as `adatlapnyitas('a_123')`
fn detail_id(handler: &str) -> Option<String> {
    let start = handler.find("('")? + 2;
    let end = start + handler[start..].find("')")?;
    (end > start).then(|| handler[start..end].to_string())
}

/// Visible text of an HTML fragment with runs of whitespace collapsed;
/// `None` when nothing is left.
///
/// Tags are dropped before entities are decoded, so a link contributes its
/// text and never its target.
fn inner_text(html: &str) -> Option<String> {
    let without_tags = TAG.replace_all(html, "");
    let text = nanohtml2text::html2text(&without_tags);
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}

//! Search and download orchestration for the feliratok.eu catalog.
use super::catalog_parser::{SubtitleCandidate, parse_catalog_page};
use super::identifier::SubtitleIdentifier;
use super::query::{build_download_url, build_search_url};
use super::title_matcher::title_matches;
use super::{
    DownloadedSubtitle, PROVIDER_NAME, PublishedDate, SUBTITLE_FORMAT, SearchQuery, SubtitleInfo,
    SubtitleRetrievalError,
};
use crate::http::{HttpFetcher, TransportError};
use crate::language_map::resolve_facet_label;
use crate::transcode::{SourceEncoding, transcode_to_utf8};
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Where the catalog lives
pub const DEFAULT_BASE_URL: &str = "https://feliratok.eu";

/// Runs catalog searches and downloads over an [`HttpFetcher`].
///
/// The retriever holds no state besides the fetcher and the catalog address,
/// so a single instance can serve any number of concurrent calls.
pub struct SubtitleRetriever<F>
where
    F: HttpFetcher,
{
    /// The transport used for every request
    fetcher: F,
    /// Catalog address without trailing slash
    base_url: String,
}

impl<F> SubtitleRetriever<F>
where
    F: HttpFetcher,
{
    /// Creates a retriever for the public catalog
    pub fn new(fetcher: F) -> Self {
        Self::with_base_url(fetcher, DEFAULT_BASE_URL)
    }

    /// Creates a retriever for a catalog served from `base_url`
    pub fn with_base_url(fetcher: F, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { fetcher, base_url }
    }

    /// The transport this retriever sends requests through
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Searches the catalog for subtitles matching `query`.
    ///
    /// Results keep the order of the catalog page. Rows without a download
    /// link, or whose link cannot be turned into an identifier, are left out.
    ///
    /// # Errors
    ///
    /// - `Language` if the two-letter code has no catalog facet
    /// - `Transport` if the page cannot be fetched
    /// - `Cancelled` if `cancel` fires before the page arrives
    pub async fn search(
        &self,
        query: &SearchQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<SubtitleInfo>, SubtitleRetrievalError> {
        let facet_label = resolve_facet_label(&query.two_letter_language)?;
        let url = build_search_url(&self.base_url, &query.title, facet_label);

        info!(title = %query.title, language = facet_label, %url, "Searching catalog");

        let page = until_cancelled(cancel, self.fetcher.get_text(&url)).await?;
        let candidates = parse_catalog_page(&page);

        if candidates.is_empty() {
            warn!(%url, "No subtitle rows found on catalog page");
            return Ok(Vec::new());
        }

        let results: Vec<SubtitleInfo> = candidates
            .into_iter()
            .inspect(log_candidate)
            .filter(|candidate| title_matches(candidate, &query.title, query.exact_match))
            .filter_map(|candidate| to_subtitle_info(candidate, &query.three_letter_language))
            .collect();

        info!(count = results.len(), "Search finished");
        Ok(results)
    }

    /// Downloads the subtitle behind an identifier returned by [`Self::search`].
    ///
    /// The file is converted from `source_encoding` to UTF-8.
    ///
    /// # Errors
    ///
    /// - `Identifier` if `id` is not a valid subtitle identifier
    /// - `Transport` if the file cannot be fetched
    /// - `Cancelled` if `cancel` fires before the file arrives
    pub async fn download(
        &self,
        id: &str,
        source_encoding: SourceEncoding,
        cancel: &CancellationToken,
    ) -> Result<DownloadedSubtitle, SubtitleRetrievalError> {
        let identifier = SubtitleIdentifier::decode(id)?;
        let url = build_download_url(&self.base_url, identifier.catalog_id());

        info!(id, %url, encoding = %source_encoding, "Downloading subtitle");

        let raw = until_cancelled(cancel, self.fetcher.get_bytes(&url)).await?;

        Ok(DownloadedSubtitle {
            content: transcode_to_utf8(&raw, source_encoding),
            format: SUBTITLE_FORMAT,
            language_code: identifier.language().to_string(),
        })
    }
}

/// Waits for a transport request unless `cancel` fires first
async fn until_cancelled<T>(
    cancel: &CancellationToken,
    request: impl Future<Output = Result<T, TransportError>>,
) -> Result<T, SubtitleRetrievalError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(SubtitleRetrievalError::Cancelled),
        result = request => Ok(result?),
    }
}

fn log_candidate(candidate: &SubtitleCandidate) {
    debug!(
        title = ?candidate.title,
        description = ?candidate.description,
        language = ?candidate.language_label,
        download_id = ?candidate.catalog_download_id,
        detail_id = ?candidate.catalog_detail_id,
        date = ?candidate.published_date_raw,
        "Catalog row"
    );
}

/// Turns a matching row into a search result, if it can be downloaded
fn to_subtitle_info(candidate: SubtitleCandidate, language_code: &str) -> Option<SubtitleInfo> {
    let download_id = candidate.catalog_download_id?;

    let id = match SubtitleIdentifier::new(SUBTITLE_FORMAT, language_code, download_id) {
        Ok(identifier) => identifier.encode(),
        Err(e) => {
            warn!(error = %e, "Skipping catalog row with unusable identifier");
            return None;
        }
    };

    Some(SubtitleInfo {
        id,
        display_name: candidate.title,
        provider_name: PROVIDER_NAME,
        language_code: language_code.to_string(),
        published_date: PublishedDate::from_catalog(candidate.published_date_raw.as_deref()),
        format: SUBTITLE_FORMAT,
        comment: candidate.description,
    })
}

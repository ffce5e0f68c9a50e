//! feliratok - Search and download subtitles from feliratok.eu
//!
//! This library finds subtitles for a movie title in the feliratok.eu catalog
//! and downloads them as UTF-8 text. The catalog has no API, so searches
//! scrape its result pages.

mod config;
mod http;
mod language_map;
mod subtitle_retrieval;
mod transcode;

// Re-export error types
pub use config::ConfigError;
pub use http::TransportError;
pub use language_map::LanguageError;
pub use subtitle_retrieval::{IdentifierError, SubtitleRetrievalError};
pub use transcode::UnknownEncodingError;

// Re-export the pipeline building blocks
pub use config::{CONFIG_PATH_ENV, Settings, default_config_path};
pub use http::{HttpFetcher, ReqwestFetcher};
pub use language_map::{
    CATALOG_LANGUAGES, CatalogLanguage, lookup_language, resolve_facet_label, two_letter_prefix,
};
pub use subtitle_retrieval::{
    DEFAULT_BASE_URL, DownloadedSubtitle, PROVIDER_NAME, PublishedDate, SUBTITLE_FORMAT,
    SearchQuery, SubtitleCandidate, SubtitleIdentifier, SubtitleInfo, SubtitleRetriever,
    build_download_url, build_search_url, parse_catalog_page, title_matches,
};
pub use transcode::{SourceEncoding, transcode_to_utf8};

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Kinds of media a host may ask subtitles for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoContentType {
    Movie,
    Episode,
}

/// A search as issued by a host application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleSearchRequest {
    /// The title of the media item
    pub name: String,
    /// ISO 639-1 language code; regional tags such as "en-US" are accepted
    pub two_letter_language: String,
    /// ISO 639-2 language code
    pub three_letter_language: String,
    /// What kind of media the subtitles are for
    pub content_type: VideoContentType,
}

/// A downloaded subtitle as returned to a host application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleResponse {
    pub format: &'static str,
    /// ISO 639-2 language code
    pub language: String,
    /// UTF-8 encoded subtitle file
    pub content: Vec<u8>,
}

/// Top-level error type for feliratok operations
#[derive(Debug, Error)]
pub enum FeliratokError {
    /// A search failed
    #[error("No results available: {0}")]
    NoResultsAvailable(#[source] SubtitleRetrievalError),

    /// A download failed
    #[error("Subtitle unavailable: {0}")]
    SubtitleUnavailable(#[source] SubtitleRetrievalError),

    /// The HTTP client could not be set up
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Settings could not be loaded
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// The feliratok.eu subtitle provider.
///
/// Bundles a [`SubtitleRetriever`] with the user's [`Settings`] and exposes the
/// two operations a host application needs: search and download.
///
/// # Examples
///
/// ```no_run
/// use feliratok::{FeliratokEu, Settings, SubtitleSearchRequest, VideoContentType};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn run() -> Result<(), feliratok::FeliratokError> {
/// let provider = FeliratokEu::from_settings(Settings::load(None)?)?;
/// let cancel = CancellationToken::new();
///
/// let request = SubtitleSearchRequest {
///     name: "Dune: Part Two".to_string(),
///     two_letter_language: "hu".to_string(),
///     three_letter_language: "hun".to_string(),
///     content_type: VideoContentType::Movie,
/// };
///
/// for subtitle in provider.search(&request, &cancel).await? {
///     let response = provider.get_subtitles(&subtitle.id, &cancel).await?;
///     println!("{}: {} bytes", subtitle.id, response.content.len());
/// }
/// # Ok(())
/// # }
/// ```
pub struct FeliratokEu<F>
where
    F: HttpFetcher,
{
    retriever: SubtitleRetriever<F>,
    settings: Settings,
}

impl FeliratokEu<ReqwestFetcher> {
    /// Creates a provider talking to the catalog over HTTP
    ///
    /// # Arguments
    ///
    /// * `settings` - User settings; the user agent, timeout and base URL
    ///   configure the HTTP client and the retriever
    ///
    /// # Returns
    ///
    /// A Result containing the provider, or `FeliratokError::Transport` when
    /// the HTTP client cannot be built
    pub fn from_settings(settings: Settings) -> Result<Self, FeliratokError> {
        let fetcher = ReqwestFetcher::new(&settings.user_agent, settings.request_timeout())?;
        Ok(Self::new(fetcher, settings))
    }
}

impl<F> FeliratokEu<F>
where
    F: HttpFetcher,
{
    /// Creates a provider using the given transport
    ///
    /// # Arguments
    ///
    /// * `fetcher` - The transport every catalog request goes through
    /// * `settings` - User settings; `base_url` is passed on to the retriever
    pub fn new(fetcher: F, settings: Settings) -> Self {
        let retriever = SubtitleRetriever::with_base_url(fetcher, settings.base_url.clone());
        Self {
            retriever,
            settings,
        }
    }

    /// The provider name shown to users
    pub fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    /// The catalog only carries movie subtitles in the searched section
    pub fn supported_media_types(&self) -> &'static [VideoContentType] {
        &[VideoContentType::Movie]
    }

    /// The settings this provider was created with
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Searches the catalog for subtitles for the requested media item.
    ///
    /// Requests for unsupported media types return no results without
    /// contacting the catalog. Regional language tags such as "en-US" are
    /// cut to their first two characters before the facet lookup.
    ///
    /// # Arguments
    ///
    /// * `request` - The media item and languages to search for
    /// * `cancel` - Aborts the search while it waits for the catalog
    ///
    /// # Returns
    ///
    /// The matching subtitles in catalog order, or
    /// `FeliratokError::NoResultsAvailable` wrapping the cause
    pub async fn search(
        &self,
        request: &SubtitleSearchRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<SubtitleInfo>, FeliratokError> {
        if !self.supported_media_types().contains(&request.content_type) {
            debug!(content_type = ?request.content_type, "Unsupported content type");
            return Ok(Vec::new());
        }

        let query = SearchQuery::new(
            request.name.clone(),
            two_letter_prefix(&request.two_letter_language),
            request.three_letter_language.clone(),
            self.settings.exact_match,
        );

        self.retriever
            .search(&query, cancel)
            .await
            .map_err(FeliratokError::NoResultsAvailable)
    }

    /// Downloads the subtitle behind an id from a previous search
    ///
    /// The file is converted from the configured `source_encoding` to UTF-8.
    ///
    /// # Arguments
    ///
    /// * `id` - An id returned by [`FeliratokEu::search`], e.g. `srt-hun-123456`
    /// * `cancel` - Aborts the download while it waits for the catalog
    ///
    /// # Returns
    ///
    /// The subtitle file, or `FeliratokError::SubtitleUnavailable` wrapping
    /// the cause
    pub async fn get_subtitles(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<SubtitleResponse, FeliratokError> {
        let subtitle = self
            .retriever
            .download(id, self.settings.source_encoding, cancel)
            .await
            .map_err(FeliratokError::SubtitleUnavailable)?;

        Ok(SubtitleResponse {
            format: subtitle.format,
            language: subtitle.language_code,
            content: subtitle.content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    const PAGE: &str = r#"<table><tr id="vilagit"><td></td>
        <td class="lang"><small>Magyar</small></td>
        <td><div class="magyar">Inception (SubRip)</div><div class="eredeti">Inception</div></td>
        <td></td><td>2010-12-03</td>
        <td><a href="index.php?action=letolt&felirat=4242">le</a></td></tr></table>"#;

    #[derive(Default)]
    struct RecordingFetcher {
        body: Vec<u8>,
        requested: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl HttpFetcher for RecordingFetcher {
        async fn get_text(&self, url: &str) -> Result<String, TransportError> {
            self.requested.lock().unwrap().push(url.to_string());
            Ok(String::from_utf8_lossy(&self.body).into_owned())
        }

        async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, TransportError> {
            self.requested.lock().unwrap().push(url.to_string());
            Ok(self.body.clone())
        }
    }

    fn provider(body: &[u8], settings: Settings) -> FeliratokEu<RecordingFetcher> {
        let fetcher = RecordingFetcher {
            body: body.to_vec(),
            ..Default::default()
        };
        FeliratokEu::new(fetcher, settings)
    }

    fn request(name: &str, two_letter_language: &str) -> SubtitleSearchRequest {
        SubtitleSearchRequest {
            name: name.to_string(),
            two_letter_language: two_letter_language.to_string(),
            three_letter_language: "hun".to_string(),
            content_type: VideoContentType::Movie,
        }
    }

    #[tokio::test]
    async fn test_search_uses_exact_match_setting() {
        let cancel = CancellationToken::new();

        let strict = provider(PAGE.as_bytes(), Settings::default());
        assert_eq!(strict.search(&request("Incep", "hu"), &cancel).await.unwrap().len(), 0);
        assert_eq!(strict.search(&request("Inception", "hu"), &cancel).await.unwrap().len(), 1);

        let loose = provider(
            PAGE.as_bytes(),
            Settings {
                exact_match: false,
                ..Settings::default()
            },
        );
        let results = loose.search(&request("Incep", "hu"), &cancel).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "srt-hun-4242");
        assert_eq!(results[0].provider_name, "FeliratokEu");
    }

    #[tokio::test]
    async fn test_search_truncates_regional_language_tags() {
        let provider = provider(PAGE.as_bytes(), Settings::default());
        let results = provider
            .search(&request("Inception", "hu-HU"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        let requested = provider.retriever_requests();
        assert_eq!(requested.len(), 1);
        assert!(requested[0].contains("nyelv=Magyar"));
    }

    #[tokio::test]
    async fn test_search_unsupported_language_is_no_results() {
        let provider = provider(PAGE.as_bytes(), Settings::default());
        let error = provider
            .search(&request("Inception", "xx"), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            FeliratokError::NoResultsAvailable(SubtitleRetrievalError::Language(_))
        ));
        assert_eq!(
            error.to_string(),
            "No results available: Language error: Unsupported language code: xx"
        );
    }

    #[tokio::test]
    async fn test_search_skips_unsupported_media() {
        let provider = provider(PAGE.as_bytes(), Settings::default());
        let mut episode_request = request("Inception", "hu");
        episode_request.content_type = VideoContentType::Episode;

        let results = provider
            .search(&episode_request, &CancellationToken::new())
            .await
            .unwrap();

        assert!(results.is_empty());
        assert!(provider.retriever_requests().is_empty());
    }

    #[tokio::test]
    async fn test_get_subtitles_uses_source_encoding_setting() {
        let settings = Settings {
            source_encoding: SourceEncoding::Latin1,
            ..Settings::default()
        };
        let provider = provider(b"Caf\xE9", settings);

        let response = provider
            .get_subtitles("srt-fre-77", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(response.format, "srt");
        assert_eq!(response.language, "fre");
        assert_eq!(response.content, "Café".as_bytes());
    }

    #[tokio::test]
    async fn test_get_subtitles_malformed_id_is_unavailable() {
        let provider = provider(b"", Settings::default());
        let error = provider
            .get_subtitles("not-an-id-at-all", &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            FeliratokError::SubtitleUnavailable(SubtitleRetrievalError::Identifier(_))
        ));
    }

    #[test]
    fn test_provider_metadata() {
        let provider = provider(b"", Settings::default());
        assert_eq!(provider.name(), "FeliratokEu");
        assert_eq!(provider.supported_media_types(), &[VideoContentType::Movie]);
    }

    impl FeliratokEu<RecordingFetcher> {
        fn retriever_requests(&self) -> Vec<String> {
            self.retriever.fetcher().requested.lock().unwrap().clone()
        }
    }
}

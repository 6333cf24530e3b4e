use serde::Deserialize;
use tracing::{debug, info};

use pahelink_core::{
    EpisodeCandidate, ListingParser, PageKind, PageMetadata, PageWindow, extract_metadata,
};

use crate::context::RequestKind;
use crate::errors::{PaheError, Result};
use crate::http::{HttpSource, PageSource};
use crate::link::{PaheLink, play_url, release_url};

#[derive(Debug, Deserialize)]
struct ReleasePage {
    #[serde(default)]
    total: u32,
    #[serde(default)]
    data: Vec<ReleaseItem>,
}

#[derive(Debug, Deserialize)]
struct ReleaseItem {
    #[serde(default)]
    session: String,
}

/// animepahe client over any [`PageSource`].
#[derive(Debug)]
pub struct PaheClient<S = HttpSource> {
    base_domain: String,
    source: S,
    parser: ListingParser,
}

impl<S: PageSource> PaheClient<S> {
    pub fn with_source(base_domain: impl Into<String>, source: S, parser: ListingParser) -> Self {
        Self {
            base_domain: base_domain.into(),
            source,
            parser,
        }
    }

    pub fn base_domain(&self) -> &str {
        &self.base_domain
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// fetches the landing page of `link` and scrapes its display metadata.
    pub async fn get_metadata(&self, link: &PaheLink) -> Result<PageMetadata> {
        let url = link.url(&self.base_domain);
        info!(%url, "requesting page metadata");

        let body = self.source.fetch(&url, RequestKind::Page).await?;
        let kind = if link.is_series() {
            PageKind::Series
        } else {
            PageKind::Episode
        };

        Ok(extract_metadata(&body, kind))
    }

    async fn fetch_release_page(&self, anime_id: &str, page: u32) -> Result<ReleasePage> {
        let url = release_url(&self.base_domain, anime_id, page);
        let body = self.source.fetch(&url, RequestKind::Api).await?;

        serde_json::from_str(&body).map_err(|source| PaheError::Json {
            context: format!("parsing release page {page} json"),
            source,
        })
    }

    /// returns the total number of episodes reported by animepahe for a series.
    pub async fn get_series_episode_count(&self, anime_id: &str) -> Result<u32> {
        let page = self.fetch_release_page(anime_id, 1).await?;
        debug!(anime_id, total = page.total, "release api reported episode count");
        Ok(page.total)
    }

    /// play page links for every item on the window's pages, in server order.
    ///
    /// items without a session id keep their slot as `None` so positions
    /// still line up with episode numbers.
    pub async fn fetch_series_episode_links(
        &self,
        anime_id: &str,
        window: &PageWindow,
    ) -> Result<Vec<Option<String>>> {
        let mut links = Vec::new();

        for &page in &window.pages {
            info!(anime_id, page, "loading release page");
            let parsed = self.fetch_release_page(anime_id, page).await?;

            links.extend(parsed.data.into_iter().map(|item| {
                let session = item.session.trim();
                (!session.is_empty()).then(|| play_url(&self.base_domain, anime_id, session))
            }));
        }

        debug!(anime_id, links = links.len(), "collected play links");
        Ok(links)
    }

    /// fetches a play page and parses its download mirrors.
    pub async fn fetch_episode_candidates(&self, play_link: &str) -> Result<Vec<EpisodeCandidate>> {
        let body = self.source.fetch(play_link, RequestKind::Page).await?;
        Ok(self.parser.parse(&body))
    }

    /// fetches a play page once and parses both its heading and its mirrors.
    pub async fn fetch_episode_page(
        &self,
        play_link: &str,
    ) -> Result<(PageMetadata, Vec<EpisodeCandidate>)> {
        let body = self.source.fetch(play_link, RequestKind::Page).await?;
        Ok((
            extract_metadata(&body, PageKind::Episode),
            self.parser.parse(&body),
        ))
    }
}

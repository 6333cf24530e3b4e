use std::fmt;

use tracing::{info, warn};

use pahelink_core::{
    CoreError, EpisodeCandidate, EpisodeRange, PageMetadata, PageWindow, SelectionPolicy, select,
};

use crate::client::PaheClient;
use crate::errors::{PaheError, Result};
use crate::http::PageSource;
use crate::link::PaheLink;

/// the mirror picked for one episode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChosenEpisode {
    /// absolute episode number; unknown when a single play link was given.
    pub episode: Option<u32>,
    pub play_link: String,
    pub candidate: EpisodeCandidate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// the release api pages had no item at this position.
    MissingListing,
    /// the release api item carried an empty session id.
    MissingSession,
    /// the play page had no download mirrors.
    NoCandidates,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MissingListing => "not listed by the release api",
            Self::MissingSession => "release api item has no session id",
            Self::NoCandidates => "no download mirrors on play page",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEpisode {
    pub episode: u32,
    pub reason: SkipReason,
}

/// outcome of resolving a series, in episode order.
///
/// an empty `chosen` list is a valid outcome: nothing matched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeriesReport {
    /// episode count reported by the release api.
    pub total: u32,
    pub chosen: Vec<ChosenEpisode>,
    pub skipped: Vec<SkippedEpisode>,
}

impl SeriesReport {
    pub fn is_empty(&self) -> bool {
        self.chosen.is_empty()
    }
}

/// per-episode notification emitted while a series is being resolved.
#[derive(Debug, Clone, Copy)]
pub enum EpisodeEvent<'a> {
    Chosen(&'a ChosenEpisode),
    Skipped(&'a SkippedEpisode),
}

impl<S: PageSource> PaheClient<S> {
    /// resolves `link` into chosen mirrors.
    ///
    /// series links go through [`PaheClient::resolve_series`]; play links are
    /// fetched, parsed and selected once and `range` is ignored.
    pub async fn resolve(
        &self,
        link: &PaheLink,
        range: EpisodeRange,
        policy: &SelectionPolicy,
        mut on_event: impl FnMut(EpisodeEvent<'_>),
    ) -> Result<SeriesReport> {
        match link {
            PaheLink::Series { anime_id } => {
                self.resolve_series(anime_id, range, policy, on_event).await
            }
            PaheLink::Episode { .. } => {
                let chosen = self
                    .resolve_episode(&link.url(self.base_domain()), policy)
                    .await?;
                on_event(EpisodeEvent::Chosen(&chosen));
                Ok(SeriesReport {
                    total: 1,
                    chosen: vec![chosen],
                    skipped: Vec::new(),
                })
            }
        }
    }

    /// walks the requested episodes of a series in order and selects one
    /// mirror per episode.
    ///
    /// episodes without mirrors are skipped and reported; http failures and
    /// an out-of-bounds range abort the whole run.
    pub async fn resolve_series(
        &self,
        anime_id: &str,
        range: EpisodeRange,
        policy: &SelectionPolicy,
        mut on_event: impl FnMut(EpisodeEvent<'_>),
    ) -> Result<SeriesReport> {
        let total = self.get_series_episode_count(anime_id).await?;
        let episodes = range.bounds(total)?;

        let mut report = SeriesReport {
            total,
            ..SeriesReport::default()
        };

        if episodes.is_empty() {
            info!(anime_id, "series has no episodes");
            return Ok(report);
        }

        let window = PageWindow::plan(&episodes);
        info!(anime_id, pages = ?window.pages, offset = window.offset, "planned release pages");
        let links = self.fetch_series_episode_links(anime_id, &window).await?;

        for episode in episodes {
            let slot = window.position_of(episode).and_then(|pos| links.get(pos));

            let outcome = match slot {
                None => Err(SkipReason::MissingListing),
                Some(None) => Err(SkipReason::MissingSession),
                Some(Some(play_link)) => {
                    info!(episode, %play_link, "processing episode");
                    let candidates = self.fetch_episode_candidates(play_link).await?;
                    match select(&candidates, policy) {
                        Ok(candidate) => Ok(ChosenEpisode {
                            episode: Some(episode),
                            play_link: play_link.clone(),
                            candidate,
                        }),
                        Err(CoreError::NoCandidates) => Err(SkipReason::NoCandidates),
                        Err(err) => return Err(err.into()),
                    }
                }
            };

            match outcome {
                Ok(chosen) => {
                    on_event(EpisodeEvent::Chosen(&chosen));
                    report.chosen.push(chosen);
                }
                Err(reason) => {
                    warn!(episode, %reason, "skipping episode");
                    let skipped = SkippedEpisode { episode, reason };
                    on_event(EpisodeEvent::Skipped(&skipped));
                    report.skipped.push(skipped);
                }
            }
        }

        Ok(report)
    }

    /// single play page flow: fetch once, parse once, select once.
    pub async fn resolve_episode(
        &self,
        play_link: &str,
        policy: &SelectionPolicy,
    ) -> Result<ChosenEpisode> {
        let (_, chosen) = self.resolve_episode_page(play_link, policy).await?;
        Ok(chosen)
    }

    /// like [`PaheClient::resolve_episode`], also handing back the heading
    /// scraped from the same body.
    pub async fn resolve_episode_page(
        &self,
        play_link: &str,
        policy: &SelectionPolicy,
    ) -> Result<(PageMetadata, ChosenEpisode)> {
        let (metadata, candidates) = self.fetch_episode_page(play_link).await?;
        if candidates.is_empty() {
            return Err(PaheError::NoCandidates {
                link: play_link.to_string(),
            });
        }

        let candidate = select(&candidates, policy)?;
        let chosen = ChosenEpisode {
            episode: None,
            play_link: play_link.to_string(),
            candidate,
        };
        Ok((metadata, chosen))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use reqwest::StatusCode;
    use serde_json::json;

    use pahelink_core::{AudioLanguage, ListingParser, QualityTarget};

    use super::*;
    use crate::context::RequestKind;
    use crate::http::status_error;
    use crate::link::{play_url, release_url};

    const DOMAIN: &str = "animepahe.si";
    const ANIME_ID: &str = "4a9abc55-0a54-c544-3e14-736c79ddafe7";
    const PLAY_PAGE: &str = include_str!("../crates/core/tests/fixtures/play_page.html");

    #[derive(Default)]
    struct CannedSource {
        pages: HashMap<String, std::result::Result<String, StatusCode>>,
        requests: Mutex<Vec<String>>,
    }

    impl CannedSource {
        fn page(mut self, url: String, body: impl Into<String>) -> Self {
            self.pages.insert(url, Ok(body.into()));
            self
        }

        fn failing(mut self, url: String, status: StatusCode) -> Self {
            self.pages.insert(url, Err(status));
            self
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().expect("request log poisoned").clone()
        }
    }

    impl PageSource for CannedSource {
        async fn fetch(&self, url: &str, _kind: RequestKind) -> Result<String> {
            self.requests
                .lock()
                .expect("request log poisoned")
                .push(url.to_string());

            match self.pages.get(url) {
                Some(Ok(body)) => Ok(body.clone()),
                Some(Err(status)) => Err(status_error(url.to_string(), *status, String::new(), false)),
                None => Err(status_error(url.to_string(), StatusCode::NOT_FOUND, String::new(), false)),
            }
        }
    }

    fn session(episode: u32) -> String {
        format!("{episode:064x}")
    }

    fn release_page(total: u32, episodes: std::ops::RangeInclusive<u32>) -> String {
        let data: Vec<_> = episodes
            .map(|ep| json!({ "episode": ep, "session": session(ep) }))
            .collect();
        json!({ "total": total, "data": data }).to_string()
    }

    fn mirror_page(rows: &[(&str, u32, Option<&str>)]) -> String {
        rows.iter()
            .map(|(id, res, tag)| {
                let badge = tag
                    .map(|t| format!(r#"<span class="badge">{t}</span>"#))
                    .unwrap_or_default();
                format!(
                    r#"<a href="https://pahe.win/{id}" class="dropdown-item" target="_blank">Group &middot; {res}p {badge}</a>"#
                )
            })
            .collect()
    }

    fn episode_url(episode: u32) -> String {
        play_url(DOMAIN, ANIME_ID, &session(episode))
    }

    fn client(source: CannedSource) -> PaheClient<CannedSource> {
        PaheClient::with_source(DOMAIN, source, ListingParser::default())
    }

    fn jp_highest() -> SelectionPolicy {
        SelectionPolicy::new(QualityTarget::Highest, AudioLanguage::Japanese)
    }

    fn picked_links(report: &SeriesReport) -> Vec<(Option<u32>, String)> {
        report
            .chosen
            .iter()
            .map(|c| (c.episode, c.candidate.source_link.clone()))
            .collect()
    }

    #[tokio::test]
    async fn all_episodes_are_resolved_in_order() {
        let source = CannedSource::default()
            .page(release_url(DOMAIN, ANIME_ID, 1), release_page(3, 1..=3))
            .page(episode_url(1), mirror_page(&[("e1-360", 360, None), ("e1-1080", 1080, None)]))
            .page(episode_url(2), mirror_page(&[("e2-720", 720, None), ("e2-dub", 1080, Some("eng"))]))
            .page(episode_url(3), mirror_page(&[("e3-480", 480, None)]));
        let pahe = client(source);

        let mut events = Vec::new();
        let report = pahe
            .resolve_series(ANIME_ID, EpisodeRange::All, &jp_highest(), |event| {
                if let EpisodeEvent::Chosen(chosen) = event {
                    events.push(chosen.episode);
                }
            })
            .await
            .expect("series should resolve");

        assert_eq!(report.total, 3);
        assert!(report.skipped.is_empty());
        assert_eq!(
            picked_links(&report),
            vec![
                (Some(1), "https://pahe.win/e1-1080".to_string()),
                (Some(2), "https://pahe.win/e2-720".to_string()),
                (Some(3), "https://pahe.win/e3-480".to_string()),
            ]
        );
        assert_eq!(events, vec![Some(1), Some(2), Some(3)]);
        assert_eq!(
            pahe.source().requests(),
            vec![
                release_url(DOMAIN, ANIME_ID, 1),
                release_url(DOMAIN, ANIME_ID, 1),
                episode_url(1),
                episode_url(2),
                episode_url(3),
            ]
        );
    }

    #[tokio::test]
    async fn later_range_fetches_only_its_page_and_applies_offset() {
        let source = CannedSource::default()
            .page(release_url(DOMAIN, ANIME_ID, 1), release_page(45, 1..=30))
            .page(release_url(DOMAIN, ANIME_ID, 2), release_page(45, 31..=45))
            .page(episode_url(31), mirror_page(&[("e31", 720, None)]))
            .page(episode_url(32), mirror_page(&[("e32", 1080, None)]));
        let pahe = client(source);

        let report = pahe
            .resolve_series(
                ANIME_ID,
                EpisodeRange::Range { start: 31, end: 32 },
                &jp_highest(),
                |_| {},
            )
            .await
            .expect("range should resolve");

        assert_eq!(
            picked_links(&report),
            vec![
                (Some(31), "https://pahe.win/e31".to_string()),
                (Some(32), "https://pahe.win/e32".to_string()),
            ]
        );
        let requests = pahe.source().requests();
        assert_eq!(requests[1], release_url(DOMAIN, ANIME_ID, 2));
        assert!(!requests[1..].contains(&release_url(DOMAIN, ANIME_ID, 1)));
    }

    #[tokio::test]
    async fn range_crossing_pages_concatenates_listings() {
        let source = CannedSource::default()
            .page(release_url(DOMAIN, ANIME_ID, 1), release_page(45, 1..=30))
            .page(release_url(DOMAIN, ANIME_ID, 2), release_page(45, 31..=45))
            .page(episode_url(30), mirror_page(&[("e30", 720, None)]))
            .page(episode_url(31), mirror_page(&[("e31", 720, None)]));
        let pahe = client(source);

        let report = pahe
            .resolve_series(
                ANIME_ID,
                EpisodeRange::Range { start: 30, end: 31 },
                &jp_highest(),
                |_| {},
            )
            .await
            .expect("range should resolve");

        let episodes: Vec<_> = report.chosen.iter().map(|c| c.episode).collect();
        assert_eq!(episodes, vec![Some(30), Some(31)]);
    }

    #[tokio::test]
    async fn range_past_total_is_rejected() {
        let source = CannedSource::default()
            .page(release_url(DOMAIN, ANIME_ID, 1), release_page(45, 1..=30));
        let pahe = client(source);

        let err = pahe
            .resolve_series(
                ANIME_ID,
                EpisodeRange::Range { start: 40, end: 50 },
                &jp_highest(),
                |_| {},
            )
            .await
            .expect_err("range should be rejected");

        assert!(matches!(
            err,
            PaheError::Core(CoreError::InvalidRange {
                start: 40,
                end: 50,
                total: 45
            })
        ));
        assert_eq!(pahe.source().requests().len(), 1);
    }

    #[tokio::test]
    async fn episodes_without_mirrors_are_skipped() {
        let source = CannedSource::default()
            .page(release_url(DOMAIN, ANIME_ID, 1), release_page(3, 1..=3))
            .page(episode_url(1), mirror_page(&[("e1", 720, None)]))
            .page(episode_url(2), "<html>mirrors are down</html>")
            .page(episode_url(3), mirror_page(&[("e3", 720, None)]));
        let pahe = client(source);

        let report = pahe
            .resolve_series(ANIME_ID, EpisodeRange::All, &jp_highest(), |_| {})
            .await
            .expect("soft failures should not abort");

        assert_eq!(report.chosen.len(), 2);
        assert_eq!(
            report.skipped,
            vec![SkippedEpisode {
                episode: 2,
                reason: SkipReason::NoCandidates
            }]
        );
    }

    #[tokio::test]
    async fn items_without_session_keep_their_slot() {
        let page = json!({
            "total": 2,
            "data": [{ "episode": 1, "session": "" }, { "episode": 2, "session": session(2) }]
        });
        let source = CannedSource::default()
            .page(release_url(DOMAIN, ANIME_ID, 1), page.to_string())
            .page(episode_url(2), mirror_page(&[("e2", 720, None)]));
        let pahe = client(source);

        let report = pahe
            .resolve_series(ANIME_ID, EpisodeRange::All, &jp_highest(), |_| {})
            .await
            .expect("series should resolve");

        assert_eq!(picked_links(&report), vec![(Some(2), "https://pahe.win/e2".to_string())]);
        assert_eq!(report.skipped[0].reason, SkipReason::MissingSession);
    }

    #[tokio::test]
    async fn short_listing_reports_missing_episodes() {
        let source = CannedSource::default()
            .page(release_url(DOMAIN, ANIME_ID, 1), release_page(3, 1..=2))
            .page(episode_url(1), mirror_page(&[("e1", 720, None)]))
            .page(episode_url(2), mirror_page(&[("e2", 720, None)]));
        let pahe = client(source);

        let report = pahe
            .resolve_series(ANIME_ID, EpisodeRange::All, &jp_highest(), |_| {})
            .await
            .expect("series should resolve");

        assert_eq!(report.chosen.len(), 2);
        assert_eq!(
            report.skipped,
            vec![SkippedEpisode {
                episode: 3,
                reason: SkipReason::MissingListing
            }]
        );
    }

    #[tokio::test]
    async fn failing_play_page_aborts_the_run() {
        let source = CannedSource::default()
            .page(release_url(DOMAIN, ANIME_ID, 1), release_page(2, 1..=2))
            .failing(episode_url(1), StatusCode::BAD_GATEWAY);
        let pahe = client(source);

        let err = pahe
            .resolve_series(ANIME_ID, EpisodeRange::All, &jp_highest(), |_| {})
            .await
            .expect_err("http failure should abort");

        assert!(err.is_fetch_error());
        assert!(err.to_string().contains(&episode_url(1)));
    }

    #[tokio::test]
    async fn failing_release_count_aborts_before_planning() {
        let source = CannedSource::default()
            .failing(release_url(DOMAIN, ANIME_ID, 1), StatusCode::SERVICE_UNAVAILABLE);
        let pahe = client(source);

        let err = pahe
            .resolve_series(ANIME_ID, EpisodeRange::All, &jp_highest(), |_| {})
            .await
            .expect_err("count failure should abort");

        assert!(err.is_fetch_error());
        assert!(err.to_string().contains(&release_url(DOMAIN, ANIME_ID, 1)));
        assert_eq!(pahe.source().requests(), vec![release_url(DOMAIN, ANIME_ID, 1)]);
    }

    #[tokio::test]
    async fn failing_listing_page_aborts_before_play_pages() {
        let source = CannedSource::default()
            .page(release_url(DOMAIN, ANIME_ID, 1), release_page(45, 1..=30))
            .failing(release_url(DOMAIN, ANIME_ID, 2), StatusCode::INTERNAL_SERVER_ERROR)
            .page(episode_url(25), mirror_page(&[("e25", 720, None)]));
        let pahe = client(source);

        let err = pahe
            .resolve_series(
                ANIME_ID,
                EpisodeRange::Range { start: 25, end: 35 },
                &jp_highest(),
                |_| {},
            )
            .await
            .expect_err("listing failure should abort");

        assert!(err.is_fetch_error());
        assert!(err.to_string().contains(&release_url(DOMAIN, ANIME_ID, 2)));
        assert_eq!(
            pahe.source().requests(),
            vec![
                release_url(DOMAIN, ANIME_ID, 1),
                release_url(DOMAIN, ANIME_ID, 1),
                release_url(DOMAIN, ANIME_ID, 2),
            ]
        );
    }

    #[tokio::test]
    async fn missing_landing_page_fails_metadata() {
        let link = PaheLink::Series {
            anime_id: ANIME_ID.to_string(),
        };
        let pahe = client(CannedSource::default());

        let err = pahe
            .get_metadata(&link)
            .await
            .expect_err("404 should surface");

        assert!(matches!(
            err,
            PaheError::HttpStatus { status, .. } if status == StatusCode::NOT_FOUND
        ));
        assert!(err.to_string().contains(&link.url(DOMAIN)));
    }

    #[tokio::test]
    async fn play_page_is_fetched_once_for_heading_and_mirrors() {
        let url = episode_url(7);
        let source = CannedSource::default().page(url.clone(), PLAY_PAGE);
        let pahe = client(source);

        let (metadata, chosen) = pahe
            .resolve_episode_page(&url, &jp_highest())
            .await
            .expect("episode should resolve");

        assert_eq!(metadata.episode_label.as_deref(), Some("07"));
        assert_eq!(chosen.candidate.source_link, "https://pahe.win/Jq720");
        assert_eq!(pahe.source().requests(), vec![url]);
    }

    #[tokio::test]
    async fn empty_series_yields_empty_report() {
        let source = CannedSource::default()
            .page(release_url(DOMAIN, ANIME_ID, 1), json!({ "total": 0, "data": [] }).to_string());
        let pahe = client(source);

        let report = pahe
            .resolve_series(ANIME_ID, EpisodeRange::All, &jp_highest(), |_| {})
            .await
            .expect("empty series is not an error");

        assert!(report.is_empty());
        assert_eq!(pahe.source().requests().len(), 1);
    }

    #[tokio::test]
    async fn single_play_page_prefers_language_then_resolution() {
        let link = PaheLink::Episode {
            anime_id: ANIME_ID.to_string(),
            session: session(7),
        };
        let source = CannedSource::default().page(link.url(DOMAIN), PLAY_PAGE);
        let pahe = client(source);

        let highest = pahe
            .resolve(&link, EpisodeRange::All, &jp_highest(), |_| {})
            .await
            .expect("episode should resolve");
        assert_eq!(highest.chosen[0].candidate.source_link, "https://pahe.win/Jq720");
        assert_eq!(highest.chosen[0].episode, None);

        let exact = SelectionPolicy::new(QualityTarget::Exact(1080), AudioLanguage::Japanese);
        let fallback = pahe
            .resolve_episode(&link.url(DOMAIN), &exact)
            .await
            .expect("episode should resolve");
        assert_eq!(fallback.candidate.source_link, "https://pahe.win/Jq720");
        assert_eq!(fallback.candidate.resolution, 720);
    }

    #[tokio::test]
    async fn single_play_page_without_mirrors_fails() {
        let url = episode_url(1);
        let source = CannedSource::default().page(url.clone(), "<html></html>");
        let pahe = client(source);

        let err = pahe
            .resolve_episode(&url, &jp_highest())
            .await
            .expect_err("no mirrors should fail in single mode");
        assert!(matches!(err, PaheError::NoCandidates { .. }));
    }
}

use regex::Regex;
use tracing::debug;

use crate::rules::{
    EPISODE_HEADING_RE, SERIES_EPISODES_RE, SERIES_TITLE_RE, SERIES_TYPE_RE, decode_entities,
    normalize_line_breaks,
};

/// which kind of landing page a body came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// `/anime/<uuid>` series page.
    Series,
    /// `/play/<uuid>/<session>` episode page.
    Episode,
}

/// display metadata scraped from a landing page.
///
/// every field is best-effort; only `title` is used past display, as the
/// download directory name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: Option<String>,
    /// series pages only.
    pub content_type: Option<String>,
    /// series pages only, as printed on the page (may be `?` while airing).
    pub episode_count: Option<String>,
    /// episode pages only.
    pub episode_label: Option<String>,
}

/// extracts display metadata from a fetched landing page body.
///
/// unmatched rules leave their field empty, this never fails.
pub fn extract_metadata(content: &str, kind: PageKind) -> PageMetadata {
    let text = normalize_line_breaks(content);

    let metadata = match kind {
        PageKind::Series => {
            let title = SERIES_TITLE_RE
                .captures(&text)
                .and_then(|c| c.get(1))
                .and_then(|m| non_empty(m.as_str()));

            let type_match = SERIES_TYPE_RE.captures(&text);
            let content_type = type_match
                .as_ref()
                .and_then(|c| c.get(1))
                .and_then(|m| non_empty(m.as_str()));

            // the episodes row sits after the type row on the page
            let resume_at = type_match
                .and_then(|c| c.get(0))
                .map(|m| m.end())
                .unwrap_or(0);
            let episode_count = capture_from(&SERIES_EPISODES_RE, &text, resume_at);

            PageMetadata {
                title,
                content_type,
                episode_count,
                episode_label: None,
            }
        }
        PageKind::Episode => {
            let caps = EPISODE_HEADING_RE.captures(&text);
            let group = |i| {
                caps.as_ref()
                    .and_then(|c| c.get(i))
                    .and_then(|m| non_empty(m.as_str()))
            };

            PageMetadata {
                title: group(1),
                content_type: None,
                episode_count: None,
                episode_label: group(2),
            }
        }
    };

    debug!(?kind, title = ?metadata.title, "extracted page metadata");
    metadata
}

fn capture_from(rule: &Regex, text: &str, start: usize) -> Option<String> {
    rule.captures_at(text, start)
        .and_then(|c| c.get(1))
        .and_then(|m| non_empty(m.as_str()))
}

fn non_empty(raw: &str) -> Option<String> {
    let decoded = decode_entities(raw);
    let trimmed = decoded.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

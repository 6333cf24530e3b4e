use regex::Regex;
use tracing::debug;

use crate::errors::Result;
use crate::language::AudioLanguage;
use crate::rules::{
    RESOLUTION_RE, ROW_TEXT_RE, SPAN_RE, decode_entities, first_capture, mirror_row_rule,
    normalize_line_breaks,
};

pub const DEFAULT_MIRROR_DOMAIN: &str = "pahe.win";

/// one download mirror row parsed from a play page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeCandidate {
    /// intermediate mirror page that still has to be resolved into a file url.
    pub source_link: String,
    /// leading label of the row, e.g. `SubsPlease · 1080p (1.4GB)`.
    pub display_text: String,
    /// vertical resolution, `0` when the row does not mention one.
    pub resolution: u32,
    pub language: AudioLanguage,
    /// the row carried a `BD` badge.
    pub bluray: bool,
}

impl EpisodeCandidate {
    pub fn quality_label(&self) -> String {
        if self.resolution == 0 {
            "unknown".to_string()
        } else {
            format!("{}p", self.resolution)
        }
    }
}

/// extracts [`EpisodeCandidate`]s from play page markup.
///
/// parsing is pure: the same body always yields the same rows, in document
/// order.
#[derive(Debug, Clone)]
pub struct ListingParser {
    row_rule: Regex,
}

impl ListingParser {
    /// creates a parser matching mirror anchors hosted on `mirror_domain`.
    pub fn new(mirror_domain: &str) -> Result<Self> {
        Ok(Self {
            row_rule: mirror_row_rule(mirror_domain)?,
        })
    }

    pub fn parse(&self, content: &str) -> Vec<EpisodeCandidate> {
        let text = normalize_line_breaks(content);

        let candidates: Vec<EpisodeCandidate> = self
            .row_rule
            .captures_iter(&text)
            .filter_map(|caps| {
                let link = caps.get(1)?.as_str();
                let block = caps.get(2).map_or("", |m| m.as_str());
                Some(parse_row(link, block))
            })
            .collect();

        debug!(rows = candidates.len(), "parsed mirror rows");
        candidates
    }
}

impl Default for ListingParser {
    fn default() -> Self {
        Self {
            row_rule: mirror_row_rule(DEFAULT_MIRROR_DOMAIN)
                .expect("default mirror row regex must compile"),
        }
    }
}

fn parse_row(link: &str, block: &str) -> EpisodeCandidate {
    let display_text = first_capture(&ROW_TEXT_RE, block)
        .map(|text| text.trim().to_string())
        .unwrap_or_default();

    let resolution = RESOLUTION_RE
        .captures(block)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .unwrap_or(0);

    let mut language = AudioLanguage::default();
    let mut bluray = false;

    for caps in SPAN_RE.captures_iter(block) {
        let tag = caps
            .get(1)
            .map(|m| decode_entities(m.as_str()).trim().to_lowercase())
            .unwrap_or_default();

        if tag == "bd" {
            bluray = true;
            continue;
        }

        if let Some(found) = AudioLanguage::from_span_tag(&tag) {
            language = found;
            break;
        }
    }

    EpisodeCandidate {
        source_link: decode_entities(link),
        display_text,
        resolution,
        language,
        bluray,
    }
}

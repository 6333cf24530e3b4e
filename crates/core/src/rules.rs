//! named extraction rules for animepahe markup.
//!
//! every rule runs against text that went through [`normalize_line_breaks`]
//! first, so none of them need to deal with newlines.

use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;

/// series landing page: the anime title attribute next to the poster style.
pub static SERIES_TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"style=[^=]+title="([^"]+)""#).expect("series title regex must compile")
});

/// series landing page: the `Type:` info row (TV, Movie, OVA, ...).
pub static SERIES_TYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"Type:[^>]*title="[^"]*"[^>]*>([^<]+)</a>"#)
        .expect("series type regex must compile")
});

/// series landing page: the `Episodes:` info row.
pub static SERIES_EPISODES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"Episode[^>]*>\s*(\S*)</p"#).expect("series episodes regex must compile")
});

/// play page: the series title link followed by the episode number.
pub static EPISODE_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"title="[^>]*>([^<]*)</a>\D*(\d*)<span"#)
        .expect("episode heading regex must compile")
});

/// mirror row: leading text node of the anchor body.
pub static ROW_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([^<]*)").expect("row text regex must compile"));

/// mirror row: first `NNNp` token.
pub static RESOLUTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{3,4})p\b").expect("resolution regex must compile"));

/// mirror row: innermost `<span>` tags, in document order.
pub static SPAN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<span[^>]*>([^<]*)</span>").expect("span regex must compile")
});

/// builds the mirror row rule for anchors pointing at `mirror_domain`.
///
/// group 1 is the mirror link, group 2 the raw anchor body.
pub fn mirror_row_rule(mirror_domain: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r#"<a href="(https://{}/[^"\s]*)"[^>]*>(.*?)</a>"#,
        regex::escape(mirror_domain)
    ))
}

/// strips every `\r` and `\n` from fetched markup.
pub fn normalize_line_breaks(text: &str) -> String {
    text.replace(['\r', '\n'], "")
}

/// decodes html character references (`&amp;`, `&#039;`, ...).
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    Html::parse_fragment(text)
        .root_element()
        .text()
        .collect::<String>()
}

/// first capture group of `rule` in `text`, entity decoded.
pub fn first_capture(rule: &Regex, text: &str) -> Option<String> {
    rule.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| decode_entities(m.as_str()))
}

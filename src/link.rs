use std::sync::LazyLock;

use regex::Regex;

use crate::errors::{PaheError, Result};

static UUID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-f0-9-]{36}$").expect("uuid regex must compile"));

static ANIME_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://[^/\s]+/anime/([a-f0-9-]{36})(?:[/?#].*)?$")
        .expect("anime link regex must compile")
});

static PLAY_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://[^/\s]+/play/([a-f0-9-]{36})/([a-f0-9]{32,})(?:[/?#].*)?$")
        .expect("play link regex must compile")
});

/// user input pointing either at a whole series or at one episode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaheLink {
    Series { anime_id: String },
    Episode { anime_id: String, session: String },
}

impl PaheLink {
    /// accepts `/anime/<uuid>` and `/play/<uuid>/<session>` urls on any host,
    /// or a bare anime uuid.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        if UUID_RE.is_match(input) {
            return Ok(Self::Series {
                anime_id: input.to_string(),
            });
        }

        if let Some(caps) = ANIME_LINK_RE.captures(input)
            && let Some(anime_id) = caps.get(1)
        {
            return Ok(Self::Series {
                anime_id: anime_id.as_str().to_string(),
            });
        }

        if let Some(caps) = PLAY_LINK_RE.captures(input)
            && let (Some(anime_id), Some(session)) = (caps.get(1), caps.get(2))
        {
            return Ok(Self::Episode {
                anime_id: anime_id.as_str().to_string(),
                session: session.as_str().to_string(),
            });
        }

        Err(PaheError::InvalidAnimeLink {
            link: input.to_string(),
        })
    }

    pub fn anime_id(&self) -> &str {
        match self {
            Self::Series { anime_id } | Self::Episode { anime_id, .. } => anime_id,
        }
    }

    pub fn is_series(&self) -> bool {
        matches!(self, Self::Series { .. })
    }

    /// canonical url of this link on `base_domain`.
    pub fn url(&self, base_domain: &str) -> String {
        match self {
            Self::Series { anime_id } => series_url(base_domain, anime_id),
            Self::Episode { anime_id, session } => play_url(base_domain, anime_id, session),
        }
    }
}

pub fn series_url(base_domain: &str, anime_id: &str) -> String {
    format!("https://{base_domain}/anime/{anime_id}")
}

pub fn play_url(base_domain: &str, anime_id: &str, session: &str) -> String {
    format!("https://{base_domain}/play/{anime_id}/{session}")
}

pub fn release_url(base_domain: &str, anime_id: &str, page: u32) -> String {
    format!("https://{base_domain}/api?m=release&id={anime_id}&sort=episode_asc&page={page}")
}

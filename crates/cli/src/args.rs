use std::path::PathBuf;

use clap::Args;

use pahelink::DEFAULT_BASE_DOMAIN;
use pahelink_core::{AudioLanguage, DEFAULT_MIRROR_DOMAIN, EpisodeRange, QualityTarget};

#[derive(Debug, Clone, Args)]
pub struct AppArgs {
    /// Logging verbosity (error, warn, info, debug)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Use interactive prompts to edit arguments before execution
    #[arg(short, long)]
    pub interactive: bool,
}

#[derive(Debug, Clone, Args)]
pub struct ResolveArgs {
    /// AnimePahe anime/play url or anime uuid
    #[arg(short, long)]
    pub series: Option<String>,

    /// Cookie header used to pass DDoS-Guard
    #[arg(short, long, env = "PAHELINK_COOKIES")]
    pub cookies: Option<String>,

    /// Episodes to resolve: all, a number (e.g. 12) or a range (e.g. 1-12)
    #[arg(short, long, default_value = "all")]
    pub episodes: EpisodeRange,

    /// Quality to select (e.g. 1080p, 720p, highest, lowest)
    #[arg(short, long, default_value = "highest")]
    pub quality: QualityTarget,

    /// Audio language code to select (e.g. jp, en, zh)
    #[arg(short, long, default_value = "jp")]
    pub lang: AudioLanguage,

    /// AnimePahe domain
    #[arg(long, env = "PAHELINK_DOMAIN", default_value = DEFAULT_BASE_DOMAIN)]
    pub domain: String,

    /// Host of the download mirror links on play pages
    #[arg(long, default_value = DEFAULT_MIRROR_DOMAIN)]
    pub mirror_domain: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Attempts per request before giving up
    #[arg(long, default_value_t = 3)]
    pub retries: u32,

    #[command(flatten)]
    pub app_args: AppArgs,
}

#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    /// File the resolved links are written to, one per line
    #[arg(short, long, default_value = "links.txt")]
    pub output: PathBuf,

    #[command(flatten)]
    pub resolve: ResolveArgs,
}

/// values of a run after prompting.
#[derive(Debug, Clone)]
pub struct RuntimeArgs {
    pub series: String,
    pub cookies: Option<String>,
    pub episodes: EpisodeRange,
    pub quality: QualityTarget,
    pub lang: AudioLanguage,
}

impl RuntimeArgs {
    pub fn new(
        series: String,
        cookies: Option<String>,
        episodes: EpisodeRange,
        quality: QualityTarget,
        lang: AudioLanguage,
    ) -> Self {
        Self {
            series,
            cookies,
            episodes,
            quality,
            lang,
        }
    }
}

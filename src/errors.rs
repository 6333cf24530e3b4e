use thiserror::Error;

use pahelink_core::CoreError;

pub type Result<T> = std::result::Result<T, PaheError>;

#[derive(Debug, Error)]
pub enum PaheError {
    #[error("failed building reqwest client: {0}")]
    BuildClient(#[source] reqwest::Error),

    #[error("invalid request header value for {name}")]
    InvalidHeader { name: &'static str },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("invalid anime link; unable to parse anime id from {link}")]
    InvalidAnimeLink { link: String },

    #[error("HTTP request failed while {context}: {source}")]
    Request {
        context: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to decode JSON while {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read response body while {context}: {source}")]
    ResponseBody {
        context: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{context} returned 403 Forbidden (DDoS-Guard). {hint}")]
    DdosGuard { context: String, hint: String },

    #[error("{context} returned {status}\nresponse text:\n{body}")]
    HttpStatus {
        context: String,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("no download mirrors found in {link}")]
    NoCandidates { link: String },

    #[error("io error while {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Message(String),
}

impl PaheError {
    /// true for failures of the http exchange itself (status or transport).
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            Self::Request { .. } | Self::HttpStatus { .. } | Self::DdosGuard { .. }
        )
    }
}

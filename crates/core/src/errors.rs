use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("no candidates to select from")]
    NoCandidates,

    #[error("invalid episode range: {start}-{end} for series with {total} episodes")]
    InvalidRange { start: u32, end: u32, total: u32 },

    #[error("invalid episode range {input:?}; expected `all`, a number (e.g. 12) or a range (e.g. 1-12)")]
    MalformedRange { input: String },

    #[error("invalid extraction rule: {0}")]
    Regex(#[from] regex::Error),

    #[error("invalid quality {input:?}; expected highest, lowest or a resolution like 720p")]
    InvalidQuality { input: String },
}

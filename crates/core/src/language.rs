use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// audio track language of a mirror row.
///
/// rows without any language marker are japanese audio, which is what
/// animepahe serves by default.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum AudioLanguage {
    #[default]
    Japanese,
    English,
    Chinese,
    /// an unrecognized span tag, kept verbatim (lowercased).
    Other(String),
}

impl AudioLanguage {
    /// maps a language code (`jp`, `en`, `zh`, anything else) to a variant.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "jp" => Self::Japanese,
            "en" => Self::English,
            "zh" => Self::Chinese,
            other => Self::Other(other.to_string()),
        }
    }

    /// classifies the text of one `<span>` inside a mirror row.
    ///
    /// `None` means the tag carries no language and scanning should continue.
    pub fn from_span_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "" | "bd" => None,
            "dub" | "eng" => Some(Self::English),
            "chi" => Some(Self::Chinese),
            other => Some(Self::from_code(other)),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::Japanese => "jp",
            Self::English => "en",
            Self::Chinese => "zh",
            Self::Other(raw) => raw,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Japanese => "Japanese",
            Self::English => "English",
            Self::Chinese => "Chinese",
            Self::Other(raw) => raw,
        }
    }
}

impl FromStr for AudioLanguage {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_code(s))
    }
}

impl fmt::Display for AudioLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

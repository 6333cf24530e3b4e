use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;
use crate::language::AudioLanguage;

/// which resolution to pick out of a candidate set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QualityTarget {
    #[default]
    Highest,
    Lowest,
    /// exact resolution in lines, e.g. `720`. falls back to the highest
    /// available resolution when nothing matches.
    Exact(u32),
}

impl QualityTarget {
    /// converts the numeric convention `0` = highest, `-1` = lowest,
    /// `>0` = exact.
    ///
    /// other negative values select the highest resolution.
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            -1 => Self::Lowest,
            n if n > 0 => Self::Exact(n as u32),
            _ => Self::Highest,
        }
    }

    pub fn as_raw(&self) -> i32 {
        match self {
            Self::Highest => 0,
            Self::Lowest => -1,
            Self::Exact(n) => *n as i32,
        }
    }
}

impl FromStr for QualityTarget {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "highest" | "best" | "max" => Ok(Self::Highest),
            "lowest" | "worst" | "min" => Ok(Self::Lowest),
            other => other
                .trim_end_matches('p')
                .parse::<i32>()
                .map(Self::from_raw)
                .map_err(|_| CoreError::InvalidQuality {
                    input: s.to_string(),
                }),
        }
    }
}

impl fmt::Display for QualityTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Highest => f.write_str("highest"),
            Self::Lowest => f.write_str("lowest"),
            Self::Exact(n) => write!(f, "{n}p"),
        }
    }
}

/// immutable per-run selection settings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionPolicy {
    pub target: QualityTarget,
    pub language: AudioLanguage,
}

impl SelectionPolicy {
    pub fn new(target: QualityTarget, language: AudioLanguage) -> Self {
        Self { target, language }
    }
}

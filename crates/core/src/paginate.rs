use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::errors::{CoreError, Result};

/// items per page served by the release api.
pub const PAGE_SIZE: u32 = 30;

/// 1-based release api page holding the 1-based `episode` index.
pub fn page_of(episode: u32) -> u32 {
    episode.div_ceil(PAGE_SIZE)
}

/// every page covering episodes `start..=end`, in increasing order.
pub fn plan_pages(start: u32, end: u32) -> Vec<u32> {
    (page_of(start)..=page_of(end)).collect()
}

/// number of episodes that come before the first planned page.
pub fn compute_offset(pages: &[u32]) -> u32 {
    match pages.first() {
        Some(&first) if first > 1 => PAGE_SIZE * (first - 1),
        _ => 0,
    }
}

/// release api pages to fetch for a range, plus how to map fetched items
/// back to absolute episode numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    pub pages: Vec<u32>,
    pub offset: u32,
}

impl PageWindow {
    pub fn plan(episodes: &RangeInclusive<u32>) -> Self {
        if episodes.is_empty() {
            return Self {
                pages: Vec::new(),
                offset: 0,
            };
        }

        let pages = plan_pages(*episodes.start(), *episodes.end());
        let offset = compute_offset(&pages);
        Self { pages, offset }
    }

    /// index into the concatenated items of all fetched pages for the
    /// absolute `episode`.
    pub fn position_of(&self, episode: u32) -> Option<usize> {
        episode
            .checked_sub(1 + self.offset)
            .map(|position| position as usize)
    }
}

/// requested episodes of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EpisodeRange {
    #[default]
    All,
    /// inclusive, 1-based.
    Range { start: u32, end: u32 },
}

impl EpisodeRange {
    pub fn single(episode: u32) -> Self {
        Self::Range {
            start: episode,
            end: episode,
        }
    }

    /// validates the range against the series' reported episode count.
    ///
    /// `All` on a series with zero episodes yields an empty range.
    pub fn bounds(&self, total: u32) -> Result<RangeInclusive<u32>> {
        match *self {
            Self::All => Ok(1..=total),
            Self::Range { start, end } if start == 0 || start > end => {
                Err(CoreError::MalformedRange {
                    input: self.to_string(),
                })
            }
            Self::Range { start, end } if start <= total && end <= total => Ok(start..=end),
            Self::Range { start, end } => Err(CoreError::InvalidRange { start, end, total }),
        }
    }
}

impl FromStr for EpisodeRange {
    type Err = CoreError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let input = s.trim();
        let malformed = || CoreError::MalformedRange {
            input: s.to_string(),
        };
        let number = |raw: &str| raw.trim().parse::<u32>().ok().filter(|n| *n > 0);

        if input.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }

        let (start, end) = match input.split_once('-') {
            Some((start, end)) => (
                number(start).ok_or_else(malformed)?,
                number(end).ok_or_else(malformed)?,
            ),
            None => {
                let value = number(input).ok_or_else(malformed)?;
                (value, value)
            }
        };

        if start > end {
            return Err(malformed());
        }

        Ok(Self::Range { start, end })
    }
}

impl fmt::Display for EpisodeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Range { start, end } if start == end => write!(f, "{start}"),
            Self::Range { start, end } => write!(f, "{start}-{end}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_cover_requested_range() {
        assert_eq!(plan_pages(1, 30), vec![1]);
        assert_eq!(plan_pages(1, 31), vec![1, 2]);
        assert_eq!(plan_pages(31, 45), vec![2]);
        assert_eq!(plan_pages(29, 91), vec![1, 2, 3, 4]);
    }

    #[test]
    fn offset_counts_episodes_before_first_page() {
        assert_eq!(compute_offset(&[1, 2]), 0);
        assert_eq!(compute_offset(&plan_pages(31, 45)), 30);
        assert_eq!(compute_offset(&[4]), 90);
        assert_eq!(compute_offset(&[]), 0);
    }

    #[test]
    fn window_maps_episodes_to_fetched_positions() {
        let window = PageWindow::plan(&(31..=45));
        assert_eq!(window.pages, vec![2]);
        assert_eq!(window.offset, 30);
        assert_eq!(window.position_of(31), Some(0));
        assert_eq!(window.position_of(45), Some(14));
        assert_eq!(window.position_of(30), None);
    }

    #[test]
    fn empty_range_plans_nothing() {
        let window = PageWindow::plan(&RangeInclusive::new(1, 0));
        assert!(window.pages.is_empty());
    }

    #[test]
    fn range_beyond_total_is_rejected() {
        let err = EpisodeRange::Range { start: 40, end: 50 }
            .bounds(45)
            .expect_err("range past the last episode should fail");
        assert_eq!(
            err,
            CoreError::InvalidRange {
                start: 40,
                end: 50,
                total: 45
            }
        );
        assert!(err.to_string().contains("40-50"));
        assert!(err.to_string().contains("45 episodes"));
    }

    #[test]
    fn all_spans_every_episode() {
        assert_eq!(EpisodeRange::All.bounds(12), Ok(1..=12));
        assert!(EpisodeRange::All.bounds(0).expect("zero total is valid").is_empty());
    }

    #[test]
    fn parses_cli_ranges() {
        assert_eq!("all".parse::<EpisodeRange>(), Ok(EpisodeRange::All));
        assert_eq!("7".parse::<EpisodeRange>(), Ok(EpisodeRange::single(7)));
        assert_eq!("3-12".parse::<EpisodeRange>(), Ok(EpisodeRange::Range { start: 3, end: 12 }));
        assert!("12-3".parse::<EpisodeRange>().is_err());
        assert!("0".parse::<EpisodeRange>().is_err());
        assert!("x-2".parse::<EpisodeRange>().is_err());
    }

    #[test]
    fn display_matches_cli_syntax() {
        assert_eq!(EpisodeRange::single(4).to_string(), "4");
        assert_eq!(EpisodeRange::Range { start: 1, end: 24 }.to_string(), "1-24");
        assert_eq!(EpisodeRange::All.to_string(), "all");
    }
}

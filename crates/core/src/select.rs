use std::ops::ControlFlow;

use tracing::debug;

use crate::errors::{CoreError, Result};
use crate::listing::EpisodeCandidate;
use crate::policy::{QualityTarget, SelectionPolicy};

/// result of a single pass over a candidate pool.
///
/// `highest` and `lowest` keep the first candidate holding the extreme
/// resolution. when an exact target is found the pass stops there, so both
/// only reflect the candidates seen up to and including the match.
#[derive(Debug, Clone, Copy)]
pub struct SelectionScan<'a> {
    pub exact: Option<&'a EpisodeCandidate>,
    pub highest: &'a EpisodeCandidate,
    pub lowest: &'a EpisodeCandidate,
}

impl<'a> SelectionScan<'a> {
    fn start(first: &'a EpisodeCandidate) -> Self {
        Self {
            exact: None,
            highest: first,
            lowest: first,
        }
    }

    fn observe(self, candidate: &'a EpisodeCandidate) -> Self {
        Self {
            exact: self.exact,
            highest: if candidate.resolution > self.highest.resolution {
                candidate
            } else {
                self.highest
            },
            lowest: if candidate.resolution < self.lowest.resolution {
                candidate
            } else {
                self.lowest
            },
        }
    }

    /// picks the final candidate for `target`.
    ///
    /// an exact match wins; a missing exact match falls back to the highest.
    pub fn resolve(&self, target: QualityTarget) -> &'a EpisodeCandidate {
        match (self.exact, target) {
            (Some(exact), _) => exact,
            (None, QualityTarget::Lowest) => self.lowest,
            (None, QualityTarget::Highest | QualityTarget::Exact(_)) => self.highest,
        }
    }
}

/// scans `candidates` in order, returning `None` for an empty pool.
pub fn scan<'a, I>(candidates: I, target: QualityTarget) -> Option<SelectionScan<'a>>
where
    I: IntoIterator<Item = &'a EpisodeCandidate>,
{
    let wanted = match target {
        QualityTarget::Exact(resolution) => Some(resolution),
        QualityTarget::Highest | QualityTarget::Lowest => None,
    };

    let mut iter = candidates.into_iter().peekable();
    let first = *iter.peek()?;

    let outcome = iter.try_fold(SelectionScan::start(first), |tally, candidate| {
        let tally = tally.observe(candidate);
        if wanted == Some(candidate.resolution) {
            ControlFlow::Break(SelectionScan {
                exact: Some(candidate),
                ..tally
            })
        } else {
            ControlFlow::Continue(tally)
        }
    });

    match outcome {
        ControlFlow::Break(tally) | ControlFlow::Continue(tally) => Some(tally),
    }
}

/// selects exactly one candidate according to `policy`.
///
/// candidates in the preferred language are considered first; when none
/// exist the whole set is used instead.
pub fn select(candidates: &[EpisodeCandidate], policy: &SelectionPolicy) -> Result<EpisodeCandidate> {
    let preferred: Vec<&EpisodeCandidate> = candidates
        .iter()
        .filter(|candidate| candidate.language == policy.language)
        .collect();

    let pool = if preferred.is_empty() {
        debug!(
            lang = %policy.language,
            "no candidate in preferred language; using all candidates"
        );
        candidates.iter().collect()
    } else {
        preferred
    };

    debug!(
        pool = pool.len(),
        target = %policy.target,
        lang = %policy.language,
        "selecting candidate"
    );

    let tally = scan(pool, policy.target).ok_or(CoreError::NoCandidates)?;
    Ok(tally.resolve(policy.target).clone())
}

//! Ordered model candidates with a shared selection cursor.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Price/capability class of a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelTier {
    Pro,
    Flash,
    FlashLite,
}

impl fmt::Display for ModelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pro => "pro",
            Self::Flash => "flash",
            Self::FlashLite => "flash-lite",
        })
    }
}

/// Requests per day the candidate's quota allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DailyLimit {
    Unlimited,
    Requests(u32),
}

impl fmt::Display for DailyLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unlimited => f.write_str("unlimited"),
            Self::Requests(n) => write!(f, "{n}/day"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStatus {
    #[default]
    Available,
    /// Known to be close to its limit; kept as a last resort.
    Degraded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCandidate {
    pub identifier: String,
    pub tier: ModelTier,
    pub daily_limit: DailyLimit,
    #[serde(default)]
    pub status: CandidateStatus,
}

impl ModelCandidate {
    pub fn new(identifier: impl Into<String>, tier: ModelTier, daily_limit: DailyLimit) -> Self {
        Self {
            identifier: identifier.into(),
            tier,
            daily_limit,
            status: CandidateStatus::Available,
        }
    }

    pub fn degraded(mut self) -> Self {
        self.status = CandidateStatus::Degraded;
        self
    }
}

/// Candidates in preference order and a cursor naming the current one.
///
/// The cursor is process-wide: one request's quota failure moves every
/// concurrent request to the next candidate. It only moves forward until
/// [`reset`](Self::reset) is called.
#[derive(Debug)]
pub struct ModelRoster {
    candidates: Vec<ModelCandidate>,
    cursor: AtomicUsize,
}

impl ModelRoster {
    /// Returns `None` for an empty candidate list.
    pub fn new(candidates: Vec<ModelCandidate>) -> Option<Self> {
        if candidates.is_empty() {
            return None;
        }
        Some(Self {
            candidates,
            cursor: AtomicUsize::new(0),
        })
    }

    /// The Gemini models the concierge falls through, best first.
    pub fn default_gemini() -> Self {
        use DailyLimit::{Requests, Unlimited};
        Self {
            candidates: vec![
                ModelCandidate::new("gemini-2.5-pro", ModelTier::Pro, Unlimited),
                ModelCandidate::new("gemini-2.0-flash", ModelTier::Flash, Unlimited),
                ModelCandidate::new("gemini-2.0-flash-lite", ModelTier::FlashLite, Unlimited),
                ModelCandidate::new("gemini-2.5-flash-lite", ModelTier::FlashLite, Requests(250_000)),
                ModelCandidate::new("gemini-3-flash", ModelTier::Flash, Requests(20)),
                ModelCandidate::new("gemini-2.5-flash", ModelTier::Flash, Requests(20)).degraded(),
            ],
            cursor: AtomicUsize::new(0),
        }
    }

    /// The currently selected candidate.
    pub fn current(&self) -> &ModelCandidate {
        &self.candidates[self.cursor()]
    }

    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::Acquire)
    }

    /// Move past the candidate at `from`.
    ///
    /// Returns `true` if a candidate other than `from` is now selected,
    /// whether this call moved the cursor or a concurrent advance or
    /// [`reset`](Self::reset) already did. Returns `false` only when `from`
    /// is the last candidate and still selected.
    pub fn advance_from(&self, from: usize) -> bool {
        if from + 1 >= self.candidates.len() {
            return self.cursor() != from;
        }
        match self
            .cursor
            .compare_exchange(from, from + 1, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {
                tracing::warn!(
                    from = %self.candidates[from].identifier,
                    to = %self.candidates[from + 1].identifier,
                    "switched model"
                );
                true
            }
            Err(now) => now != from,
        }
    }

    /// Move past the current candidate.
    pub fn advance(&self) -> bool {
        self.advance_from(self.cursor())
    }

    /// Select the primary candidate again.
    pub fn reset(&self) {
        self.cursor.store(0, Ordering::Release);
        tracing::info!(model = %self.candidates[0].identifier, "model roster reset to primary");
    }

    pub fn candidates(&self) -> &[ModelCandidate] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

impl Default for ModelRoster {
    fn default() -> Self {
        Self::default_gemini()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn default_order() {
        let roster = ModelRoster::default_gemini();
        let ids: Vec<_> = roster.candidates().iter().map(|c| c.identifier.as_str()).collect();
        assert_eq!(
            ids,
            [
                "gemini-2.5-pro",
                "gemini-2.0-flash",
                "gemini-2.0-flash-lite",
                "gemini-2.5-flash-lite",
                "gemini-3-flash",
                "gemini-2.5-flash",
            ]
        );
        assert_eq!(roster.candidates()[5].status, CandidateStatus::Degraded);
        assert_eq!(roster.current().identifier, "gemini-2.5-pro");
    }

    #[test]
    fn advance_is_monotonic_and_stops_at_the_end() {
        let roster = ModelRoster::default_gemini();
        let mut previous = roster.cursor();
        while roster.advance() {
            assert!(roster.cursor() > previous);
            previous = roster.cursor();
        }
        assert_eq!(roster.cursor(), roster.len() - 1);
        // Exhausted: no wrap-around.
        assert!(!roster.advance());
        assert_eq!(roster.cursor(), roster.len() - 1);
    }

    #[test]
    fn reset_returns_to_primary() {
        let roster = ModelRoster::default_gemini();
        roster.advance();
        roster.advance();
        roster.reset();
        assert_eq!(roster.cursor(), 0);
        assert_eq!(roster.current().identifier, "gemini-2.5-pro");
    }

    #[test]
    fn stale_advance_does_not_skip() {
        let roster = ModelRoster::default_gemini();
        // Two requests both fail on candidate 0.
        assert!(roster.advance_from(0));
        assert!(roster.advance_from(0));
        assert_eq!(roster.cursor(), 1);
    }

    #[test]
    fn advance_after_reset_retries_selected_candidate() {
        let roster = ModelRoster::default_gemini();
        roster.advance();
        roster.advance();
        // A request observed candidate 2, then an operator reset the roster.
        roster.reset();
        assert!(roster.advance_from(2));
        assert_eq!(roster.cursor(), 0);

        let last = roster.len() - 1;
        for _ in 0..last {
            roster.advance();
        }
        roster.reset();
        assert!(roster.advance_from(last));
        assert_eq!(roster.cursor(), 0);
    }

    #[test]
    fn concurrent_failures_advance_once() {
        let roster = Arc::new(ModelRoster::default_gemini());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let roster = roster.clone();
                std::thread::spawn(move || roster.advance_from(0))
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert_eq!(roster.cursor(), 1);
    }

    #[test]
    fn empty_roster_is_rejected() {
        assert!(ModelRoster::new(Vec::new()).is_none());
    }

    #[test]
    fn single_candidate_cannot_advance() {
        let roster = ModelRoster::new(vec![ModelCandidate::new(
            "only",
            ModelTier::Flash,
            DailyLimit::Unlimited,
        )])
        .unwrap();
        assert!(!roster.advance());
        assert_eq!(roster.current().identifier, "only");
    }
}

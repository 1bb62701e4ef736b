/// Run phase definitions for a single crawl invocation
///
/// A run moves `idle → seeding → crawling → (fallback-probing) → emitting`
/// and ends in `done` or `failed`.
use serde::Serialize;
use std::fmt;

/// Represents the current phase of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunPhase {
    // ===== Active Phases =====
    /// Run created, nothing queued yet
    Idle,

    /// Seed URLs are being inserted into the frontier
    Seeding,

    /// Batched breadth-first crawl of the frontier
    Crawling,

    /// Pattern-guessed URLs are being probed
    FallbackProbing,

    /// Sitemap documents are being generated and uploaded
    Emitting,

    // ===== Terminal Phases =====
    /// Both documents were uploaded
    Done,

    /// The run was aborted (upload failure or unexpected error)
    Failed,
}

impl RunPhase {
    /// Returns true if moving from `self` to `next` is a legal transition
    ///
    /// Every active phase after `Idle` may fail. Fallback probing is optional,
    /// so crawling may go straight to emitting.
    pub fn can_transition_to(&self, next: RunPhase) -> bool {
        use RunPhase::*;

        matches!(
            (*self, next),
            (Idle, Seeding)
                | (Seeding, Crawling)
                | (Crawling, FallbackProbing)
                | (Crawling, Emitting)
                | (FallbackProbing, Emitting)
                | (Emitting, Done)
                | (Seeding | Crawling | FallbackProbing | Emitting, Failed)
        )
    }

    /// Converts the phase to its wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Seeding => "seeding",
            Self::Crawling => "crawling",
            Self::FallbackProbing => "fallback-probing",
            Self::Emitting => "emitting",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

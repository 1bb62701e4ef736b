use crate::state::RunPhase;
use serde::Serialize;

/// Run-scoped counters, refreshed after every batch and after fallback probing
///
/// Purely observational: nothing in the crawl reads these to make decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub discovered: usize,
    pub processed: usize,
    pub valid: usize,
    pub redirects_resolved: usize,
    pub current_depth: u32,
    pub phase: RunPhase,
    pub status: String,
}

impl Progress {
    pub fn new() -> Self {
        Self {
            discovered: 0,
            processed: 0,
            valid: 0,
            redirects_resolved: 0,
            current_depth: 0,
            phase: RunPhase::Idle,
            status: "Idle".to_string(),
        }
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `RunPhase`: the lifecycle of a single crawl run (seeding, crawling, fallback, emitting)
//! - `Progress`: run-scoped counters reported back to the caller

mod progress;
mod run_phase;

// Re-export main types
pub use progress::Progress;
pub use run_phase::RunPhase;

//! Learner progress aggregation and resume resolution.
//!
//! Everything here is synchronous and side-effect free apart from `tracing`
//! diagnostics. Fetching trees and persisting the last viewed marker live in
//! the `services` and `storage` crates.

#![forbid(unsafe_code)]

pub mod error;
pub mod iframe;
pub mod kv;
pub mod model;
pub mod resume;
pub mod scoring;
pub mod stats;
pub mod time;
pub mod traverse;
pub mod trim;

pub use error::ModelError;
pub use iframe::{IframeScore, resolve_iframe_score};
pub use kv::{InMemoryStore, KeyValueStore, LAST_VIEWED_KEY};
pub use resume::{
    ResumeReason, ResumeTarget, get_initial_subconcept, resolve_from_store, resolve_with_reason,
};
pub use scoring::{attempt_score, get_score};
pub use stats::{LearnerStats, StageProgress, calculate_learner_stats, stage_progress};
pub use time::Clock;
pub use traverse::{ResumePoint, SubconceptRef, walk};
pub use trim::{MAX_RECENT_ATTEMPTS, process_learner_progress, trim_attempts};

//! Core orchestration and domain logic for careerwatch.
//!
//! This crate ties together fetching, extraction, relevance filtering, the
//! seen-job store and notifications into a single run, and schedules runs
//! for `watch`.

pub mod filter;
pub mod pipeline;
pub mod schedule;

pub use filter::{Relevance, RelevanceFilter};
pub use pipeline::{
    AbortReason, Candidate, Pipeline, ProgressReporter, RunOutcome, RunReport, SilentProgress,
};
pub use schedule::{next_run_after, parse_time, run_with_timeout, watch};

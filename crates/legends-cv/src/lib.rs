//! Perception primitives: template matching, anchor cataloging and frame
//! classification, and frame differencing for staleness detection.
//!
//! Everything here is pure image-in, answer-out. Capturing frames and
//! mapping match positions to screen coordinates is the caller's job.

pub mod catalog;
pub mod classify;
pub mod diff;
pub mod matcher;

pub use catalog::Catalog;
pub use classify::{classify_best, find, find_with_threshold};
pub use diff::abs_diff_sum;
pub use matcher::{Match, Template, best_match};

pub type Result<T> = anyhow::Result<T>;

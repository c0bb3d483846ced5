//! Duplicate detection for postings gathered from forums, job boards and
//! social feeds.
//!
//! [`DuplicateDetector::dedupe`] splits one collection batch into unique
//! postings and duplicates; [`DuplicateDetector::check_existing`] asks whether a
//! posting is already in a [`PostingStore`].

pub mod config;
pub mod dedup;
pub mod error;
pub mod model;
pub mod store;
pub mod util;

pub use dedup::{DuplicateDetector, Thresholds, DEFAULT_GENERAL_THRESHOLD, DEFAULT_TITLE_THRESHOLD};
pub use error::{StoreError, ThresholdError};
pub use model::{
    DedupeResult, DuplicateMatch, DuplicateRecord, ExistingCheck, IngestPlan, MatchReason, Posting,
    StoredMatch,
};
pub use store::{JsonFileStore, PostingStore};
pub use util::{fingerprint::fingerprint, text::similarity, text::tokenize};

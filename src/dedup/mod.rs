//! Duplicate detection over collected postings.
//!
//! Two postings are duplicates when the first of these tiers holds:
//!
//! 1. both carry the same non-empty `url`;
//! 2. they come from the same source and their titles overlap at least
//!    `title_threshold`;
//! 3. their `title + " " + text` overlap at least `general_threshold`.
//!
//! Overlap is the Jaccard index of the word sets produced by
//! [`tokenize`](crate::util::text::tokenize).

mod existing;

use std::collections::{BTreeSet, HashSet};

use tracing::{debug, info, warn};

use crate::{
    config::DedupConfig,
    error::ThresholdError,
    model::{DedupeResult, DuplicateMatch, DuplicateRecord, MatchReason, Posting},
    util::{
        text::{jaccard_similarity, token_set},
        url_norm::same_url,
    },
};

pub const DEFAULT_TITLE_THRESHOLD: f64 = 0.9;
pub const DEFAULT_GENERAL_THRESHOLD: f64 = 0.85;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    title: f64,
    general: f64,
}

impl Thresholds {
    pub fn new(title: f64, general: f64) -> Result<Self, ThresholdError> {
        Ok(Self {
            title: check_threshold("title", title)?,
            general: check_threshold("general", general)?,
        })
    }

    pub fn title(&self) -> f64 {
        self.title
    }

    pub fn general(&self) -> f64 {
        self.general
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE_THRESHOLD,
            general: DEFAULT_GENERAL_THRESHOLD,
        }
    }
}

fn check_threshold(name: &'static str, value: f64) -> Result<f64, ThresholdError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ThresholdError::OutOfRange { name, value })
    }
}

/// Token sets of one posting, computed once per batch entry.
struct Signature {
    title: BTreeSet<String>,
    content: BTreeSet<String>,
}

impl Signature {
    fn of(posting: &Posting) -> Self {
        Self {
            title: token_set(posting.title()),
            content: token_set(&posting.combined_text()),
        }
    }
}

/// Stateless duplicate detector. Holds only its configuration, so one instance
/// can be shared by reference across pipelines.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DuplicateDetector {
    thresholds: Thresholds,
    normalize_urls: bool,
}

impl DuplicateDetector {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            normalize_urls: false,
        }
    }

    pub fn with_thresholds(title: f64, general: f64) -> Result<Self, ThresholdError> {
        Ok(Self::new(Thresholds::new(title, general)?))
    }

    pub fn from_config(config: &DedupConfig) -> Result<Self, ThresholdError> {
        Ok(Self::with_thresholds(config.title_threshold, config.general_threshold)?
            .normalize_urls(config.normalize_urls))
    }

    /// Compare links in canonical form (tracking params, fragments and trailing
    /// slashes removed) instead of verbatim.
    pub fn normalize_urls(mut self, enabled: bool) -> Self {
        self.normalize_urls = enabled;
        self
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    pub fn is_duplicate(&self, a: &Posting, b: &Posting) -> bool {
        self.classify(a, b).is_some()
    }

    /// Decide whether `a` and `b` are the same posting and, if so, which tier said so.
    pub fn classify(&self, a: &Posting, b: &Posting) -> Option<DuplicateMatch> {
        self.url_match(a, b)
            .or_else(|| self.classify_content(a, &Signature::of(a), b, &Signature::of(b)))
    }

    fn url_match(&self, a: &Posting, b: &Posting) -> Option<DuplicateMatch> {
        same_url(a.url(), b.url(), self.normalize_urls).then_some(DuplicateMatch {
            reason: MatchReason::Url,
            score: 1.0,
        })
    }

    fn classify_prepared(
        &self,
        a: &Posting,
        sig_a: &Signature,
        b: &Posting,
        sig_b: &Signature,
    ) -> Option<DuplicateMatch> {
        self.url_match(a, b)
            .or_else(|| self.classify_content(a, sig_a, b, sig_b))
    }

    fn classify_content(
        &self,
        a: &Posting,
        sig_a: &Signature,
        b: &Posting,
        sig_b: &Signature,
    ) -> Option<DuplicateMatch> {
        if a.source == b.source {
            let score = jaccard_similarity(&sig_a.title, &sig_b.title);
            if score >= self.thresholds.title {
                return Some(DuplicateMatch {
                    reason: MatchReason::SourceTitle,
                    score,
                });
            }
        }

        let score = jaccard_similarity(&sig_a.content, &sig_b.content);
        (score >= self.thresholds.general).then_some(DuplicateMatch {
            reason: MatchReason::Content,
            score,
        })
    }

    /// Split a batch into unique postings and duplicates, in one pass.
    ///
    /// Each posting is compared with the unique postings accepted so far, in
    /// acceptance order; the first match wins. Postings without an id get their
    /// fingerprint before comparison.
    pub fn dedupe<I>(&self, postings: I) -> DedupeResult
    where
        I: IntoIterator<Item = Posting>,
    {
        let mut result = DedupeResult::default();
        let mut signatures: Vec<Signature> = Vec::new();
        let mut taken_ids: HashSet<String> = HashSet::new();
        let mut total = 0usize;

        for mut posting in postings {
            total += 1;
            posting.ensure_id();
            let signature = Signature::of(&posting);

            let matched = result
                .unique
                .iter()
                .zip(&signatures)
                .find_map(|(kept, kept_sig)| {
                    self.classify_prepared(&posting, &signature, kept, kept_sig)
                        .map(|found| (kept.effective_id(), found))
                });

            if let Some((duplicate_of, found)) = matched {
                debug!(
                    id = posting.id.as_deref().unwrap_or_default(),
                    duplicate_of = %duplicate_of,
                    reason = found.reason.as_str(),
                    score = found.score,
                    "posting is a duplicate within batch"
                );
                result.duplicates.push(DuplicateRecord {
                    posting,
                    duplicate_of,
                    reason: found.reason,
                    score: found.score,
                });
                continue;
            }

            let id = claim_id(&mut taken_ids, posting.ensure_id());
            if posting.id.as_deref() != Some(id.as_str()) {
                warn!(
                    original = posting.id.as_deref().unwrap_or_default(),
                    assigned = %id,
                    "id already used in batch; assigned a new one"
                );
                posting.id = Some(id);
            }

            result.unique.push(posting);
            signatures.push(signature);
        }

        info!(
            total,
            unique = result.unique.len(),
            duplicates = result.duplicates.len(),
            "batch deduplicated"
        );

        result
    }
}

/// Reserve `id` in `taken`, suffixing `-2`, `-3`, ... when it is already used.
fn claim_id(taken: &mut HashSet<String>, id: &str) -> String {
    if taken.insert(id.to_string()) {
        return id.to_string();
    }

    let mut n = 2usize;
    loop {
        let candidate = format!("{id}-{n}");
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

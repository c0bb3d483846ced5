use tracing::{debug, info};

use crate::{
    dedup::DuplicateDetector,
    model::{ExistingCheck, IngestPlan, Posting, StoredMatch},
    store::PostingStore,
};

impl DuplicateDetector {
    /// Look for `posting` among already stored postings.
    ///
    /// An exact id hit returns straight away. Otherwise every stored posting is
    /// classified against `posting`, in the order the store returns them, and the
    /// first duplicate is reported. Store errors are returned as they are.
    pub fn check_existing<S>(&self, posting: &Posting, store: &S) -> Result<ExistingCheck, S::Error>
    where
        S: PostingStore + ?Sized,
    {
        let id = posting.effective_id();
        if let Some(stored) = store.get_by_id(&id)? {
            debug!(id = %id, "posting already stored under the same id");
            return Ok(ExistingCheck::by_id(stored));
        }

        for stored in store.get_all()? {
            if let Some(found) = self.classify(posting, &stored) {
                debug!(
                    id = %id,
                    stored_id = stored.id.as_deref().unwrap_or_default(),
                    reason = found.reason.as_str(),
                    score = found.score,
                    "posting matches a stored posting"
                );
                return Ok(ExistingCheck::by_similarity(stored));
            }
        }

        Ok(ExistingCheck::not_found())
    }

    /// Dedupe a batch, then drop the unique postings the store already holds.
    ///
    /// `fresh` is what should be persisted. The store is consulted once per
    /// unique posting and is not updated.
    pub fn plan_ingest<I, S>(&self, postings: I, store: &S) -> Result<IngestPlan, S::Error>
    where
        I: IntoIterator<Item = Posting>,
        S: PostingStore + ?Sized,
    {
        let batch = self.dedupe(postings);
        let mut plan = IngestPlan {
            batch_duplicates: batch.duplicates,
            ..IngestPlan::default()
        };

        for posting in batch.unique {
            let check = self.check_existing(&posting, store)?;
            let via_similarity = check.via_similarity();
            match check.matched_posting {
                Some(stored) if check.exists => plan.already_stored.push(StoredMatch {
                    posting,
                    stored,
                    via_similarity,
                }),
                _ => plan.fresh.push(posting),
            }
        }

        info!(
            fresh = plan.fresh.len(),
            batch_duplicates = plan.batch_duplicates.len(),
            already_stored = plan.already_stored.len(),
            "ingest planned"
        );

        Ok(plan)
    }
}

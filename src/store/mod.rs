pub mod json_file;

use crate::model::Posting;

pub use json_file::JsonFileStore;

/// Read access to postings persisted by earlier collection runs.
///
/// Errors are the store's own and reach callers of
/// [`check_existing`](crate::DuplicateDetector::check_existing) unchanged.
pub trait PostingStore {
    type Error;

    fn get_by_id(&self, id: &str) -> Result<Option<Posting>, Self::Error>;

    fn get_all(&self) -> Result<Vec<Posting>, Self::Error>;
}

impl PostingStore for [Posting] {
    type Error = std::convert::Infallible;

    fn get_by_id(&self, id: &str) -> Result<Option<Posting>, Self::Error> {
        Ok(self
            .iter()
            .find(|posting| posting.id.as_deref() == Some(id))
            .cloned())
    }

    fn get_all(&self) -> Result<Vec<Posting>, Self::Error> {
        Ok(self.to_vec())
    }
}

impl PostingStore for Vec<Posting> {
    type Error = std::convert::Infallible;

    fn get_by_id(&self, id: &str) -> Result<Option<Posting>, Self::Error> {
        self.as_slice().get_by_id(id)
    }

    fn get_all(&self) -> Result<Vec<Posting>, Self::Error> {
        self.as_slice().get_all()
    }
}

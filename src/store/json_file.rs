use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{error::StoreError, model::Posting, store::PostingStore};

/// Postings kept as one JSON array in a flat file.
///
/// Every call reads the file again, so postings appended by another run are
/// visible to the next lookup. A missing file is an empty store.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<Posting>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&bytes).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Add postings to the end of the stored array and write the file back.
    pub fn append(&self, postings: &[Posting]) -> Result<usize, StoreError> {
        if postings.is_empty() {
            return Ok(0);
        }

        let mut stored = self.load()?;
        stored.extend_from_slice(postings);

        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let encoded = serde_json::to_vec_pretty(&stored).map_err(|err| write_err(err.into()))?;
        fs::write(&self.path, encoded).map_err(write_err)?;

        debug!(
            path = %self.path.display(),
            appended = postings.len(),
            total = stored.len(),
            "store file updated"
        );
        Ok(postings.len())
    }
}

impl PostingStore for JsonFileStore {
    type Error = StoreError;

    fn get_by_id(&self, id: &str) -> Result<Option<Posting>, Self::Error> {
        Ok(self
            .load()?
            .into_iter()
            .find(|posting| posting.id.as_deref() == Some(id)))
    }

    fn get_all(&self) -> Result<Vec<Posting>, Self::Error> {
        self.load()
    }
}

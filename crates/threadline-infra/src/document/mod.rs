//! File-backed document collection with merge writes.
//!
//! Each document is a JSON object stored at `{dir}/{id}.json`. Writes go
//! through [`DocumentCollection::merge_if`], which reads the current
//! document, lets the caller decide on a set of field updates, applies them
//! and atomically replaces the file (write to a temp file, then rename). A
//! per-document async mutex makes the read-decide-write cycle atomic for
//! concurrent writers in this process. A lock is evicted once no writer holds
//! or waits on it.
//!
//! Field updates follow merge semantics: fields not named are left alone.

pub mod conversation;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::Mutex;

pub use conversation::DocumentConversationStore;

pub type Document = Map<String, Value>;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("document i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("document is not valid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid document id: '{0}'")]
    InvalidId(String),

    #[error("document {0} is not a json object")]
    NotAnObject(String),
}

/// One field write inside a merge.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    /// Overwrite the field.
    Set(String, Value),
    /// Write the field only if it is missing.
    SetIfAbsent(String, Value),
    /// Append each element not already present (by full JSON equality) to
    /// the array field, creating it if missing.
    ArrayUnion(String, Vec<Value>),
}

/// What a merge changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOutcome {
    pub created: bool,
    /// Elements actually appended by `ArrayUnion` updates.
    pub appended: usize,
}

pub struct DocumentCollection {
    dir: PathBuf,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl DocumentCollection {
    /// Open the collection rooted at `dir`, creating the directory.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, DocumentError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            locks: DashMap::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read a document. `Ok(None)` when it does not exist.
    pub async fn get(&self, id: &str) -> Result<Option<Document>, DocumentError> {
        let path = self.path_for(id)?;
        read_document(id, &path).await
    }

    /// Atomically read, decide and merge.
    ///
    /// `decide` sees the current document (or `None`) and returns the updates
    /// to apply, or `None` to leave the document untouched. Returns `None` if
    /// nothing was written.
    pub async fn merge_if<F>(
        &self,
        id: &str,
        decide: F,
    ) -> Result<Option<MergeOutcome>, DocumentError>
    where
        F: FnOnce(Option<&Document>) -> Option<Vec<FieldUpdate>>,
    {
        let path = self.path_for(id)?;

        // Clone the Arc out so the DashMap shard lock is released before awaiting.
        let lock = self
            .locks
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let outcome = {
            let _guard = lock.lock().await;
            merge_locked(id, &path, decide).await
        };
        drop(lock);

        // Only the map still holds the Arc: nobody is writing or queued.
        // The check runs under the shard lock that `entry` clones under.
        self.locks
            .remove_if(id, |_, lock| Arc::strong_count(lock) == 1);

        outcome
    }

    pub async fn merge(
        &self,
        id: &str,
        updates: Vec<FieldUpdate>,
    ) -> Result<MergeOutcome, DocumentError> {
        let outcome = self.merge_if(id, |_| Some(updates)).await?;
        Ok(outcome.unwrap_or(MergeOutcome {
            created: false,
            appended: 0,
        }))
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, DocumentError> {
        let valid = !id.is_empty()
            && !id.starts_with('.')
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
        if !valid {
            return Err(DocumentError::InvalidId(id.to_string()));
        }
        Ok(self.dir.join(format!("{id}.json")))
    }
}

async fn merge_locked<F>(
    id: &str,
    path: &Path,
    decide: F,
) -> Result<Option<MergeOutcome>, DocumentError>
where
    F: FnOnce(Option<&Document>) -> Option<Vec<FieldUpdate>>,
{
    let current = read_document(id, path).await?;
    let Some(updates) = decide(current.as_ref()) else {
        return Ok(None);
    };

    let created = current.is_none();
    let mut doc = current.unwrap_or_default();
    let appended = apply_updates(&mut doc, updates);

    let tmp = path.with_extension("json.tmp");
    let bytes = serde_json::to_vec_pretty(&Value::Object(doc))?;
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;

    Ok(Some(MergeOutcome { created, appended }))
}

async fn read_document(id: &str, path: &Path) -> Result<Option<Document>, DocumentError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    match serde_json::from_slice::<Value>(&bytes)? {
        Value::Object(doc) => Ok(Some(doc)),
        _ => Err(DocumentError::NotAnObject(id.to_string())),
    }
}

fn apply_updates(doc: &mut Document, updates: Vec<FieldUpdate>) -> usize {
    let mut appended = 0;
    for update in updates {
        match update {
            FieldUpdate::Set(field, value) => {
                doc.insert(field, value);
            }
            FieldUpdate::SetIfAbsent(field, value) => {
                doc.entry(field).or_insert(value);
            }
            FieldUpdate::ArrayUnion(field, values) => {
                let slot = doc
                    .entry(field)
                    .or_insert_with(|| Value::Array(Vec::new()));
                if !slot.is_array() {
                    *slot = Value::Array(Vec::new());
                }
                if let Value::Array(items) = slot {
                    for v in values {
                        if !items.contains(&v) {
                            items.push(v);
                            appended += 1;
                        }
                    }
                }
            }
        }
    }
    appended
}

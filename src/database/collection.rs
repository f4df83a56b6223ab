use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use super::DatabaseError;
use crate::filter::Filter;

/// A record stored as one JSON document keyed by its id.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Table or map name.
    const COLLECTION: &'static str;

    /// Top-level string fields that must be unique, compared case-insensitively.
    const UNIQUE_FIELDS: &'static [&'static str] = &[];

    fn id(&self) -> Uuid;

    /// Bump `updated_at` before a replace.
    fn touch(&mut self);

    fn conflict_message(field: &str) -> String {
        format!("Duplicate value for {}", field)
    }
}

#[async_trait]
pub trait Collection<T: Document>: Send + Sync {
    async fn find(&self, filter: &Filter) -> Result<Vec<T>, DatabaseError>;

    async fn find_one(&self, filter: &Filter) -> Result<Option<T>, DatabaseError> {
        let first = filter.clone().limit(1, None)?;
        Ok(self.find(&first).await?.into_iter().next())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, DatabaseError>;

    async fn count(&self, filter: &Filter) -> Result<u64, DatabaseError>;

    /// Fails with `Conflict` on a unique field collision.
    async fn insert(&self, doc: T) -> Result<T, DatabaseError>;

    /// Whole-document replace; `NotFound` when the id is absent.
    async fn replace(&self, doc: T) -> Result<T, DatabaseError>;

    /// Returns whether a document was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

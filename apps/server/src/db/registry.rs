//! Typed context over a [`RegistryStore`]

use serde_json::Value as JsonValue;
use std::sync::Arc;

use super::schema::Id;
use super::traits::{Record, RegistryStore};
use super::unit_of_work::{CommitOutcome, UnitOfWork};
use crate::{Error, Result};

#[derive(Clone)]
pub struct Registry {
    store: Arc<dyn RegistryStore>,
}

impl Registry {
    pub fn new(store: Arc<dyn RegistryStore>) -> Self {
        Self { store }
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    pub async fn all<R: Record>(&self) -> Result<Vec<R>> {
        decode_all(self.store.fetch_all(R::TABLE).await?)
    }

    pub async fn find<R: Record>(&self, id: Id) -> Result<Option<R>> {
        self.store
            .fetch_by_id(R::TABLE, id)
            .await?
            .map(decode)
            .transpose()
    }

    /// Like [`Registry::find`] but a missing row is `NotFound`.
    pub async fn get<R: Record>(&self, id: Id) -> Result<R> {
        self.find(id)
            .await?
            .ok_or_else(|| Error::not_found(R::ENTITY, id))
    }

    pub async fn exists<R: Record>(&self, id: Id) -> Result<bool> {
        Ok(self.store.fetch_by_id(R::TABLE, id).await?.is_some())
    }

    /// Rows whose `column` holds one of `ids`.
    pub async fn find_by<R: Record>(&self, column: &str, ids: &[Id]) -> Result<Vec<R>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        decode_all(self.store.fetch_where_in(R::TABLE, column, ids).await?)
    }

    /// Keyword search. A missing or blank keyword yields no rows without touching storage.
    pub async fn search<R: Record>(&self, keyword: Option<&str>, limit: usize) -> Result<Vec<R>> {
        let Some(keyword) = keyword.map(str::trim).filter(|k| !k.is_empty()) else {
            return Ok(Vec::new());
        };
        decode_all(self.store.search(R::TABLE, keyword, limit).await?)
    }

    pub fn work(&self) -> UnitOfWork {
        UnitOfWork::new()
    }

    pub async fn commit(&self, work: UnitOfWork) -> Result<CommitOutcome> {
        if work.is_empty() {
            return Ok(CommitOutcome::default());
        }
        self.store.commit(work).await
    }
}

fn decode<R: Record>(row: JsonValue) -> Result<R> {
    serde_json::from_value(row)
        .map_err(|e| Error::Storage(format!("malformed {} row: {e}", R::TABLE)))
}

fn decode_all<R: Record>(rows: Vec<JsonValue>) -> Result<Vec<R>> {
    rows.into_iter().map(decode).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryRegistryStore;
    use crate::models::entities::ElementSet;

    #[tokio::test]
    async fn blank_keyword_returns_nothing() {
        let registry = Registry::new(Arc::new(MemoryRegistryStore::new()));
        let mut work = registry.work();
        work.add(&ElementSet {
            name: "Anything".into(),
            ..Default::default()
        })
        .unwrap();
        registry.commit(work).await.unwrap();

        for keyword in [None, Some(""), Some("   ")] {
            assert!(registry
                .search::<ElementSet>(keyword, 10)
                .await
                .unwrap()
                .is_empty());
        }
        assert_eq!(
            registry
                .search::<ElementSet>(Some(" any "), 10)
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn get_reports_entity_name() {
        let registry = Registry::new(Arc::new(MemoryRegistryStore::new()));
        let err = registry.get::<ElementSet>(3).await.unwrap_err();
        assert_eq!(err.to_string(), "ElementSet 3 not found");
    }
}

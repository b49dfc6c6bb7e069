//! Multi-flush operations stop at the first failed flush and keep what was
//! already committed.

#[allow(unused)]
mod support;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cde_registry::config::RegistrySettings;
use cde_registry::db::{
    CommitOutcome, Id, MemoryRegistryStore, Registry, RegistryStore, Table, UnitOfWork,
};
use cde_registry::models::{Element, ElementSet, ElementSetRef, ElementValue};
use cde_registry::services::{ElementSetService, ModuleService};
use cde_registry::{Error, Result};
use serde_json::Value as JsonValue;
use support::LUNG_NODULE_MODULE;

/// Memory store whose commits start failing once an armed budget runs out.
struct FlakyStore {
    inner: MemoryRegistryStore,
    commits_left: Mutex<Option<usize>>,
}

impl FlakyStore {
    fn new() -> Self {
        Self {
            inner: MemoryRegistryStore::new(),
            commits_left: Mutex::new(None),
        }
    }

    /// Let `successes` more commits through, then fail every later one.
    fn fail_after(&self, successes: usize) {
        *self.commits_left.lock().unwrap() = Some(successes);
    }
}

#[async_trait]
impl RegistryStore for FlakyStore {
    fn backend(&self) -> &'static str {
        "flaky"
    }

    async fn fetch_all(&self, table: Table) -> Result<Vec<JsonValue>> {
        self.inner.fetch_all(table).await
    }

    async fn fetch_by_id(&self, table: Table, id: Id) -> Result<Option<JsonValue>> {
        self.inner.fetch_by_id(table, id).await
    }

    async fn fetch_where_in(
        &self,
        table: Table,
        column: &str,
        ids: &[Id],
    ) -> Result<Vec<JsonValue>> {
        self.inner.fetch_where_in(table, column, ids).await
    }

    async fn search(&self, table: Table, keyword: &str, limit: usize) -> Result<Vec<JsonValue>> {
        self.inner.search(table, keyword, limit).await
    }

    async fn commit(&self, work: UnitOfWork) -> Result<CommitOutcome> {
        {
            let mut left = self.commits_left.lock().unwrap();
            match left.as_mut() {
                Some(0) => return Err(Error::Storage("connection reset".into())),
                Some(n) => *n -= 1,
                None => {}
            }
        }
        self.inner.commit(work).await
    }
}

struct Harness {
    store: Arc<FlakyStore>,
    registry: Registry,
    sets: ElementSetService,
    modules: ModuleService,
}

fn harness() -> Harness {
    let store = Arc::new(FlakyStore::new());
    let registry = Registry::new(store.clone());
    let settings = Arc::new(RegistrySettings::default());
    Harness {
        sets: ElementSetService::new(registry.clone(), settings.clone()),
        modules: ModuleService::new(registry.clone(), settings, None),
        store,
        registry,
    }
}

#[tokio::test]
async fn set_delete_keeps_elements_removed_before_a_failed_flush() -> anyhow::Result<()> {
    let h = harness();
    let import = h.modules.create_module(LUNG_NODULE_MODULE).await?;
    assert_eq!(import.element_ids.len(), 2);
    let (first, second) = (import.element_ids[0], import.element_ids[1]);

    h.store.fail_after(1);
    let err = h.sets.delete(import.set_id).await.unwrap_err();
    assert_eq!(err.kind(), "storage_failure");

    assert!(h.registry.find::<Element>(first).await?.is_none());
    assert!(h
        .registry
        .find_by::<ElementValue>("element_id", &[first])
        .await?
        .is_empty());

    assert!(h.registry.find::<Element>(second).await?.is_some());
    assert!(h.registry.find::<ElementSet>(import.set_id).await?.is_some());
    let links: Vec<Id> = h
        .registry
        .find_by::<ElementSetRef>("element_set_id", &[import.set_id])
        .await?
        .iter()
        .map(|r| r.element_id)
        .collect();
    assert_eq!(links, vec![second]);
    Ok(())
}

#[tokio::test]
async fn module_import_keeps_elements_when_the_set_flush_fails() -> anyhow::Result<()> {
    let h = harness();

    h.store.fail_after(2);
    let err = h
        .modules
        .create_module(LUNG_NODULE_MODULE)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "storage_failure");

    assert_eq!(h.registry.all::<Element>().await?.len(), 2);
    assert!(h.registry.all::<ElementSet>().await?.is_empty());
    assert!(h.registry.all::<ElementSetRef>().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn module_import_stops_at_the_first_failed_element() -> anyhow::Result<()> {
    let h = harness();

    h.store.fail_after(1);
    let err = h
        .modules
        .create_module(LUNG_NODULE_MODULE)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "storage_failure");

    assert_eq!(h.registry.all::<Element>().await?.len(), 1);
    assert!(h.registry.all::<ElementSet>().await?.is_empty());
    Ok(())
}

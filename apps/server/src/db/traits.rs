//! Storage contract shared by the Postgres and in-memory backends

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value as JsonValue;

use super::schema::{Id, Table};
use super::unit_of_work::{CommitOutcome, UnitOfWork};
use crate::Result;

/// An entity persisted as one row of [`Record::TABLE`].
///
/// The serde representation is the row: field names are column names.
pub trait Record: Serialize + DeserializeOwned + Send + Sync + 'static {
    const TABLE: Table;
    /// Name used in not-found errors.
    const ENTITY: &'static str;

    fn id(&self) -> Id;
}

/// Row-level storage backend.
///
/// Reads return rows ordered by id. Soft-deleted rows are never returned.
#[async_trait]
pub trait RegistryStore: Send + Sync {
    /// Short name used in logs and metrics.
    fn backend(&self) -> &'static str;

    async fn fetch_all(&self, table: Table) -> Result<Vec<JsonValue>>;

    async fn fetch_by_id(&self, table: Table, id: Id) -> Result<Option<JsonValue>>;

    /// Rows whose `column` is one of `ids`.
    async fn fetch_where_in(&self, table: Table, column: &str, ids: &[Id])
        -> Result<Vec<JsonValue>>;

    /// Case-insensitive substring match of `keyword` over the table's searchable columns.
    async fn search(&self, table: Table, keyword: &str, limit: usize) -> Result<Vec<JsonValue>>;

    /// Flush every change of `work` as one atomic batch.
    async fn commit(&self, work: UnitOfWork) -> Result<CommitOutcome>;
}

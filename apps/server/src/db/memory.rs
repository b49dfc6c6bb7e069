//! In-process backend
//!
//! Holds every table in ordered maps and enforces the same foreign keys as the SQL
//! schema, so constraint failures surface exactly where Postgres would raise them.

use async_trait::async_trait;
use serde_json::{Map, Value as JsonValue};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use super::schema::{Id, Table};
use super::seed;
use super::traits::RegistryStore;
use super::unit_of_work::{resolve_links, Change, CommitOutcome, UnitOfWork};
use crate::{metrics, Error, Result};

#[derive(Debug, Clone, Default)]
struct Tables {
    rows: HashMap<Table, BTreeMap<Id, JsonValue>>,
    last_ids: HashMap<Table, Id>,
}

#[derive(Default)]
pub struct MemoryRegistryStore {
    tables: RwLock<Tables>,
}

impl MemoryRegistryStore {
    /// Empty store without reference data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with the reference rows the SQL migrations seed.
    pub fn seeded() -> Self {
        let mut tables = Tables::default();
        for (abbreviation, name, url) in seed::INDEX_CODE_SYSTEMS {
            tables.insert_seed(
                Table::IndexCodeSystem,
                &[
                    ("abbreviation", *abbreviation),
                    ("name", *name),
                    ("system_url", *url),
                ],
            );
        }
        for (code, short_name, name) in seed::SPECIALTIES {
            tables.insert_seed(
                Table::Specialty,
                &[("code", *code), ("short_name", *short_name), ("name", *name)],
            );
        }
        Self {
            tables: RwLock::new(tables),
        }
    }

    /// Number of rows currently stored in `table`, soft-deleted rows included.
    pub async fn count(&self, table: Table) -> usize {
        self.tables
            .read()
            .await
            .rows
            .get(&table)
            .map_or(0, BTreeMap::len)
    }
}

fn is_visible(table: Table, row: &JsonValue) -> bool {
    match table.soft_delete_column() {
        Some(column) => row.get(column).map_or(true, JsonValue::is_null),
        None => true,
    }
}

fn matches_keyword(table: Table, row: &JsonValue, needle: &str) -> bool {
    table.searchable().iter().any(|column| {
        row.get(*column)
            .and_then(JsonValue::as_str)
            .is_some_and(|text| text.to_lowercase().contains(needle))
    })
}

fn column_id(row: &JsonValue, column: &str) -> Option<Id> {
    row.get(column)
        .and_then(JsonValue::as_i64)
        .and_then(|v| Id::try_from(v).ok())
}

impl Tables {
    fn table(&self, table: Table) -> impl Iterator<Item = &JsonValue> {
        self.rows
            .get(&table)
            .into_iter()
            .flat_map(|rows| rows.values())
            .filter(move |row| is_visible(table, row))
    }

    fn contains(&self, table: Table, id: Id) -> bool {
        self.rows.get(&table).is_some_and(|rows| rows.contains_key(&id))
    }

    fn insert_seed(&mut self, table: Table, values: &[(&str, &str)]) {
        let mut row = Map::new();
        for (column, value) in values {
            row.insert(column.to_string(), JsonValue::from(*value));
        }
        let id = self.next_id(table);
        self.rows
            .entry(table)
            .or_default()
            .insert(id, shape(table, id, &JsonValue::Object(row)));
    }

    fn next_id(&mut self, table: Table) -> Id {
        let last = self.last_ids.entry(table).or_insert(0);
        *last += 1;
        *last
    }

    fn check_outgoing(&self, table: Table, row: &JsonValue) -> Result<()> {
        for key in table.foreign_keys() {
            if let Some(target_id) = column_id(row, key.column) {
                if !self.contains(key.target, target_id) {
                    return Err(Error::Storage(format!(
                        "insert or update on table \"{table}\" violates foreign key constraint: \
                         {}={target_id} is not present in table \"{}\"",
                        key.column, key.target
                    )));
                }
            }
        }
        Ok(())
    }

    fn check_incoming(&self, table: Table, removed: &[Id]) -> Result<()> {
        if removed.is_empty() {
            return Ok(());
        }
        for referencing in Table::ALL {
            for key in referencing.foreign_keys().iter().filter(|k| k.target == table) {
                let Some(rows) = self.rows.get(&referencing) else {
                    continue;
                };
                if let Some(id) = rows
                    .values()
                    .filter_map(|row| column_id(row, key.column))
                    .find(|id| removed.contains(id))
                {
                    return Err(Error::Storage(format!(
                        "delete on table \"{table}\" violates foreign key constraint: \
                         {id} is still referenced from table \"{referencing}\" ({})",
                        key.column
                    )));
                }
            }
        }
        Ok(())
    }

    fn apply(&mut self, change: Change, outcome: &mut CommitOutcome) -> Result<()> {
        match change {
            Change::Insert { table, row, links } => {
                let row = resolve_links(&row, &links, &outcome.inserted_ids)?;
                let id = self.next_id(table);
                let row = shape(table, id, &row);
                self.check_outgoing(table, &row)?;
                self.rows.entry(table).or_default().insert(id, row);
                outcome.inserted_ids.push(id);
                outcome.affected += 1;
            }
            Change::Update { table, id, row } => {
                if self.contains(table, id) {
                    let row = shape(table, id, &row);
                    self.check_outgoing(table, &row)?;
                    self.rows.entry(table).or_default().insert(id, row);
                    outcome.affected += 1;
                }
            }
            Change::Delete { table, id } => {
                let removed = self
                    .rows
                    .get_mut(&table)
                    .and_then(|rows| rows.remove(&id))
                    .is_some();
                if removed {
                    self.check_incoming(table, &[id])?;
                    outcome.affected += 1;
                }
            }
            Change::DeleteWhere { table, column, ids } => {
                if !table.has_column(column) {
                    return Err(Error::Internal(format!("{table} has no column {column}")));
                }
                let mut removed = Vec::new();
                if let Some(rows) = self.rows.get_mut(&table) {
                    rows.retain(|id, row| {
                        let hit = column_id(row, column).is_some_and(|v| ids.contains(&v));
                        if hit {
                            removed.push(*id);
                        }
                        !hit
                    });
                }
                self.check_incoming(table, &removed)?;
                outcome.affected += removed.len() as u64;
            }
        }
        Ok(())
    }
}

/// Project `row` onto the table's columns, filling absent ones with null.
fn shape(table: Table, id: Id, row: &JsonValue) -> JsonValue {
    let mut object = Map::new();
    object.insert("id".to_string(), JsonValue::from(id));
    for column in table.columns() {
        let value = row.get(*column).cloned().unwrap_or(JsonValue::Null);
        object.insert(column.to_string(), value);
    }
    JsonValue::Object(object)
}

#[async_trait]
impl RegistryStore for MemoryRegistryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn fetch_all(&self, table: Table) -> Result<Vec<JsonValue>> {
        let tables = self.tables.read().await;
        Ok(tables.table(table).cloned().collect())
    }

    async fn fetch_by_id(&self, table: Table, id: Id) -> Result<Option<JsonValue>> {
        let tables = self.tables.read().await;
        Ok(tables
            .rows
            .get(&table)
            .and_then(|rows| rows.get(&id))
            .filter(|row| is_visible(table, row))
            .cloned())
    }

    async fn fetch_where_in(
        &self,
        table: Table,
        column: &str,
        ids: &[Id],
    ) -> Result<Vec<JsonValue>> {
        if !table.has_column(column) {
            return Err(Error::Internal(format!("{table} has no column {column}")));
        }
        let tables = self.tables.read().await;
        Ok(tables
            .table(table)
            .filter(|row| column_id(row, column).is_some_and(|v| ids.contains(&v)))
            .cloned()
            .collect())
    }

    async fn search(&self, table: Table, keyword: &str, limit: usize) -> Result<Vec<JsonValue>> {
        if table.searchable().is_empty() {
            return Err(Error::Internal(format!("{table} is not searchable")));
        }
        let needle = keyword.to_lowercase();
        let tables = self.tables.read().await;
        Ok(tables
            .table(table)
            .filter(|row| matches_keyword(table, row, &needle))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn commit(&self, work: UnitOfWork) -> Result<CommitOutcome> {
        let mut tables = self.tables.write().await;
        // Changes land on a copy so a failing flush leaves nothing behind.
        let mut staged = tables.clone();
        let mut outcome = CommitOutcome::default();

        let result = work
            .into_changes()
            .into_iter()
            .try_for_each(|change| staged.apply(change, &mut outcome));

        let label = match &result {
            Ok(()) if outcome.applied() => "committed",
            Ok(()) => "empty",
            Err(_) => "failed",
        };
        metrics::STORE_COMMITS_TOTAL
            .with_label_values(&[self.backend(), label])
            .inc();

        result?;
        *tables = staged;
        Ok(outcome)
    }
}

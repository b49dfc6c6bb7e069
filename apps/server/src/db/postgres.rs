//! PostgreSQL backend
//!
//! Rows travel as JSONB: reads use `to_jsonb(t)`, writes use `jsonb_populate_record` so
//! column typing stays with the schema. Each [`UnitOfWork`] runs in one transaction.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use std::time::Instant;

use super::schema::{Id, Table};
use super::traits::RegistryStore;
use super::unit_of_work::{resolve_links, Change, CommitOutcome, UnitOfWork};
use crate::{metrics, Error, Result};

#[derive(Clone)]
pub struct PostgresRegistryStore {
    pool: PgPool,
}

impl PostgresRegistryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn quote(ident: &str) -> String {
    format!("\"{ident}\"")
}

fn column_list(table: Table) -> String {
    table
        .columns()
        .iter()
        .map(|c| quote(c))
        .collect::<Vec<_>>()
        .join(", ")
}

fn checked_column(table: Table, column: &str) -> Result<String> {
    if table.has_column(column) {
        Ok(quote(column))
    } else {
        Err(Error::Internal(format!("{table} has no column {column}")))
    }
}

/// `AND ... IS NULL` filter hiding soft-deleted rows.
fn visible(table: Table) -> String {
    table
        .soft_delete_column()
        .map(|c| format!(" AND t.{} IS NULL", quote(c)))
        .unwrap_or_default()
}

/// Escape LIKE wildcards so the keyword matches literally.
pub(crate) fn escape_like(keyword: &str) -> String {
    let mut out = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[async_trait]
impl RegistryStore for PostgresRegistryStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn fetch_all(&self, table: Table) -> Result<Vec<JsonValue>> {
        let sql = format!(
            "SELECT to_jsonb(t) FROM {} t WHERE TRUE{} ORDER BY t.id",
            quote(table.name()),
            visible(table)
        );
        Ok(sqlx::query_scalar::<_, JsonValue>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn fetch_by_id(&self, table: Table, id: Id) -> Result<Option<JsonValue>> {
        let sql = format!(
            "SELECT to_jsonb(t) FROM {} t WHERE t.id = $1{}",
            quote(table.name()),
            visible(table)
        );
        Ok(sqlx::query_scalar::<_, JsonValue>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn fetch_where_in(
        &self,
        table: Table,
        column: &str,
        ids: &[Id],
    ) -> Result<Vec<JsonValue>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT to_jsonb(t) FROM {} t WHERE t.{} = ANY($1){} ORDER BY t.id",
            quote(table.name()),
            checked_column(table, column)?,
            visible(table)
        );
        Ok(sqlx::query_scalar::<_, JsonValue>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn search(&self, table: Table, keyword: &str, limit: usize) -> Result<Vec<JsonValue>> {
        let columns = table.searchable();
        if columns.is_empty() {
            return Err(Error::Internal(format!("{table} is not searchable")));
        }
        let predicate = columns
            .iter()
            .map(|c| format!("t.{} ILIKE $1", quote(c)))
            .collect::<Vec<_>>()
            .join(" OR ");
        let sql = format!(
            "SELECT to_jsonb(t) FROM {} t WHERE ({predicate}){} ORDER BY t.id LIMIT $2",
            quote(table.name()),
            visible(table)
        );
        let pattern = format!("%{}%", escape_like(keyword));
        Ok(sqlx::query_scalar::<_, JsonValue>(&sql)
            .bind(pattern)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn commit(&self, work: UnitOfWork) -> Result<CommitOutcome> {
        let start = Instant::now();
        let result = self.flush(work).await;

        let outcome_label = match &result {
            Ok(outcome) if outcome.applied() => "committed",
            Ok(_) => "empty",
            Err(_) => "failed",
        };
        metrics::STORE_COMMITS_TOTAL
            .with_label_values(&[self.backend(), outcome_label])
            .inc();
        metrics::STORE_COMMIT_DURATION_SECONDS
            .with_label_values(&[self.backend()])
            .observe(start.elapsed().as_secs_f64());

        result
    }
}

impl PostgresRegistryStore {
    async fn flush(&self, work: UnitOfWork) -> Result<CommitOutcome> {
        let mut tx = self.pool.begin().await?;
        let mut outcome = CommitOutcome::default();

        for change in work.into_changes() {
            match change {
                Change::Insert { table, row, links } => {
                    let row = resolve_links(&row, &links, &outcome.inserted_ids)?;
                    let columns = column_list(table);
                    let name = quote(table.name());
                    let sql = format!(
                        "INSERT INTO {name} ({columns}) SELECT {columns} FROM jsonb_populate_record(NULL::{name}, $1) RETURNING id"
                    );
                    let id: Id = sqlx::query_scalar(&sql)
                        .bind(&row)
                        .fetch_one(&mut *tx)
                        .await?;
                    outcome.inserted_ids.push(id);
                    outcome.affected += 1;
                }
                Change::Update { table, id, row } => {
                    let assignments = table
                        .columns()
                        .iter()
                        .map(|c| format!("{col} = r.{col}", col = quote(c)))
                        .collect::<Vec<_>>()
                        .join(", ");
                    let name = quote(table.name());
                    let sql = format!(
                        "UPDATE {name} AS t SET {assignments} FROM jsonb_populate_record(NULL::{name}, $1) AS r WHERE t.id = $2"
                    );
                    let result = sqlx::query(&sql)
                        .bind(&row)
                        .bind(id)
                        .execute(&mut *tx)
                        .await?;
                    outcome.affected += result.rows_affected();
                }
                Change::Delete { table, id } => {
                    let sql = format!("DELETE FROM {} WHERE id = $1", quote(table.name()));
                    let result = sqlx::query(&sql).bind(id).execute(&mut *tx).await?;
                    outcome.affected += result.rows_affected();
                }
                Change::DeleteWhere { table, column, ids } => {
                    let sql = format!(
                        "DELETE FROM {} WHERE {} = ANY($1)",
                        quote(table.name()),
                        checked_column(table, column)?
                    );
                    let result = sqlx::query(&sql).bind(&ids).execute(&mut *tx).await?;
                    outcome.affected += result.rows_affected();
                }
            }
        }

        tx.commit().await?;

        tracing::debug!(
            affected = outcome.affected,
            inserted = outcome.inserted_ids.len(),
            "Unit of work committed"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_like_wildcards() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("brain"), "brain");
    }

    #[test]
    fn rejects_unknown_columns() {
        assert!(checked_column(Table::Element, "element_id").is_err());
        assert_eq!(
            checked_column(Table::ElementValue, "element_id").unwrap(),
            "\"element_id\""
        );
    }

    #[test]
    fn soft_delete_filter_only_for_specialties() {
        assert_eq!(visible(Table::Specialty), " AND t.\"deleted_at\" IS NULL");
        assert_eq!(visible(Table::Element), "");
    }
}

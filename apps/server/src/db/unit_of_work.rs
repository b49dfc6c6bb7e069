//! Explicit unit of work
//!
//! Services list every change they intend to flush. Nothing is tracked implicitly: a
//! mutated entity only reaches storage through [`UnitOfWork::update`].

use serde_json::Value as JsonValue;

use super::schema::{Id, Table};
use super::traits::Record;
use crate::{Error, Result};

/// Handle to a row staged with [`UnitOfWork::add`], resolved to its id at flush time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pending(pub(crate) usize);

/// Value written into a foreign-key column of a staged insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    /// Id of a row that already exists.
    Existing(Id),
    /// Id of a row inserted earlier in the same unit of work.
    Pending(Pending),
}

impl From<Id> for Link {
    fn from(id: Id) -> Self {
        Link::Existing(id)
    }
}

impl From<Pending> for Link {
    fn from(pending: Pending) -> Self {
        Link::Pending(pending)
    }
}

#[derive(Debug, Clone)]
pub enum Change {
    Insert {
        table: Table,
        row: JsonValue,
        links: Vec<(&'static str, Link)>,
    },
    Update {
        table: Table,
        id: Id,
        row: JsonValue,
    },
    Delete {
        table: Table,
        id: Id,
    },
    DeleteWhere {
        table: Table,
        column: &'static str,
        ids: Vec<Id>,
    },
}

/// Result of flushing a unit of work.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitOutcome {
    /// Rows inserted, updated or deleted.
    pub affected: u64,
    /// Ids of inserted rows, indexed by [`Pending`].
    pub inserted_ids: Vec<Id>,
}

impl CommitOutcome {
    pub fn id_of(&self, pending: Pending) -> Result<Id> {
        self.inserted_ids.get(pending.0).copied().ok_or_else(|| {
            Error::Internal(format!("no inserted id for pending row #{}", pending.0))
        })
    }

    pub fn applied(&self) -> bool {
        self.affected > 0
    }
}

#[derive(Debug, Default)]
pub struct UnitOfWork {
    changes: Vec<Change>,
    inserts: usize,
}

impl UnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage an insert. The record's own `id` is ignored.
    pub fn add<R: Record>(&mut self, record: &R) -> Result<Pending> {
        self.add_linked(record, &[])
    }

    /// Stage an insert whose foreign-key columns are filled from `links` at flush time.
    pub fn add_linked<R: Record>(
        &mut self,
        record: &R,
        links: &[(&'static str, Link)],
    ) -> Result<Pending> {
        let row = to_row(record)?;
        let pending = Pending(self.inserts);
        self.inserts += 1;
        self.changes.push(Change::Insert {
            table: R::TABLE,
            row,
            links: links.to_vec(),
        });
        Ok(pending)
    }

    pub fn update<R: Record>(&mut self, record: &R) -> Result<()> {
        let row = to_row(record)?;
        self.changes.push(Change::Update {
            table: R::TABLE,
            id: record.id(),
            row,
        });
        Ok(())
    }

    pub fn remove<R: Record>(&mut self, record: &R) {
        self.remove_id(R::TABLE, record.id());
    }

    pub fn remove_range<'a, R: Record + 'a>(&mut self, records: impl IntoIterator<Item = &'a R>) {
        for record in records {
            self.remove(record);
        }
    }

    pub fn remove_id(&mut self, table: Table, id: Id) {
        self.changes.push(Change::Delete { table, id });
    }

    /// Stage removal of every row of `table` whose `column` is one of `ids`.
    pub fn remove_where(&mut self, table: Table, column: &'static str, ids: &[Id]) {
        if ids.is_empty() {
            return;
        }
        self.changes.push(Change::DeleteWhere {
            table,
            column,
            ids: ids.to_vec(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn into_changes(self) -> Vec<Change> {
        self.changes
    }
}

fn to_row<R: Record>(record: &R) -> Result<JsonValue> {
    let mut row = serde_json::to_value(record)
        .map_err(|e| Error::Internal(format!("cannot serialize {} row: {e}", R::TABLE)))?;
    match row.as_object_mut() {
        Some(object) => {
            object.remove("id");
        }
        None => {
            return Err(Error::Internal(format!(
                "{} rows must serialize to JSON objects",
                R::TABLE
            )))
        }
    }
    Ok(row)
}

/// Fill the linked foreign-key columns of a staged insert.
pub(crate) fn resolve_links(
    row: &JsonValue,
    links: &[(&'static str, Link)],
    inserted: &[Id],
) -> Result<JsonValue> {
    let mut row = row.clone();
    for (column, link) in links {
        let id = match link {
            Link::Existing(id) => *id,
            Link::Pending(pending) => *inserted.get(pending.0).ok_or_else(|| {
                Error::Internal(format!(
                    "column {column} links to pending row #{} which is not yet inserted",
                    pending.0
                ))
            })?,
        };
        row[*column] = JsonValue::from(id);
    }
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::entities::ElementSetRef;
    use serde_json::json;

    #[test]
    fn staged_inserts_are_numbered_in_order() {
        let mut work = UnitOfWork::new();
        let first = work.add(&ElementSetRef::new(1, 2)).unwrap();
        work.remove_id(Table::Element, 9);
        let second = work.add(&ElementSetRef::new(1, 3)).unwrap();
        assert_eq!(first, Pending(0));
        assert_eq!(second, Pending(1));
        assert_eq!(work.len(), 3);
    }

    #[test]
    fn insert_rows_drop_the_id_column() {
        let mut work = UnitOfWork::new();
        work.add(&ElementSetRef::new(4, 5)).unwrap();
        match &work.changes()[0] {
            Change::Insert { row, .. } => {
                assert_eq!(row, &json!({"element_set_id": 4, "element_id": 5}))
            }
            other => panic!("unexpected change {other:?}"),
        }
    }

    #[test]
    fn empty_remove_where_is_skipped() {
        let mut work = UnitOfWork::new();
        work.remove_where(Table::ElementValue, "element_id", &[]);
        assert!(work.is_empty());
    }

    #[test]
    fn links_resolve_against_inserted_ids() {
        let row = json!({"element_set_id": 0, "element_id": 0});
        let resolved = resolve_links(
            &row,
            &[
                ("element_set_id", Link::Existing(7)),
                ("element_id", Link::Pending(Pending(1))),
            ],
            &[10, 11],
        )
        .unwrap();
        assert_eq!(resolved, json!({"element_set_id": 7, "element_id": 11}));

        assert!(resolve_links(&row, &[("element_id", Link::Pending(Pending(3)))], &[]).is_err());
    }
}

//! Explicit cascade staging
//!
//! Foreign keys carry no `ON DELETE CASCADE`; dependent rows are staged here in an
//! order that keeps every statement of a flush valid.

use crate::db::{Id, Registry, Table, UnitOfWork};
use crate::models::ElementValue;
use crate::Result;

/// Join rows pointing at an element value.
const VALUE_JOINS: &[(Table, &str)] = &[
    (Table::IndexCodeElementValueRef, "element_value_id"),
    (Table::ReferenceElementValueRef, "element_value_id"),
    (Table::ImageElementValueRef, "element_value_id"),
    (Table::CodeRef, "element_value_id"),
];

/// Join rows pointing at an element.
const ELEMENT_JOINS: &[(Table, &str)] = &[
    (Table::ElementSetRef, "element_id"),
    (Table::PersonRoleElementRef, "element_id"),
    (Table::OrganizationRoleElementRef, "element_id"),
    (Table::IndexCodeElementRef, "element_id"),
    (Table::ReferenceElementRef, "element_id"),
    (Table::ImageElementRef, "element_id"),
    (Table::SpecialtyElementRef, "element_id"),
    (Table::CodeRef, "element_id"),
];

/// Join rows pointing at a set.
const SET_JOINS: &[(Table, &str)] = &[
    (Table::PersonRoleElementSetRef, "element_set_id"),
    (Table::OrganizationRoleElementSetRef, "element_set_id"),
    (Table::IndexCodeElementSetRef, "element_set_id"),
    (Table::CodeRef, "element_set_id"),
    (Table::ElementSetRef, "element_set_id"),
];

/// Stage removal of element values together with every row referencing them.
pub(crate) fn stage_value_removal(work: &mut UnitOfWork, value_ids: &[Id]) {
    for (table, column) in VALUE_JOINS {
        work.remove_where(*table, column, value_ids);
    }
    work.remove_where(Table::ElementValue, "id", value_ids);
}

/// Stage removal of an element, its values and all join rows. Returns the value count.
pub(crate) async fn stage_element_removal(
    registry: &Registry,
    work: &mut UnitOfWork,
    element_id: Id,
) -> Result<usize> {
    let value_ids: Vec<Id> = registry
        .find_by::<ElementValue>("element_id", &[element_id])
        .await?
        .iter()
        .map(|v| v.id)
        .collect();

    stage_value_removal(work, &value_ids);
    for (table, column) in ELEMENT_JOINS {
        work.remove_where(*table, column, &[element_id]);
    }
    work.remove_id(Table::Element, element_id);
    Ok(value_ids.len())
}

/// Stage removal of the join rows owned by a set. The set row itself is not staged.
pub(crate) fn stage_set_joins(work: &mut UnitOfWork, set_id: Id) {
    for (table, column) in SET_JOINS {
        work.remove_where(*table, column, &[set_id]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::unit_of_work::Change;

    #[test]
    fn value_refs_go_before_values() {
        let mut work = UnitOfWork::new();
        stage_value_removal(&mut work, &[4, 5]);
        let tables: Vec<Table> = work
            .changes()
            .iter()
            .map(|c| match c {
                Change::DeleteWhere { table, .. } => *table,
                other => panic!("unexpected change {other:?}"),
            })
            .collect();
        assert_eq!(tables.last(), Some(&Table::ElementValue));
        assert_eq!(tables.len(), VALUE_JOINS.len() + 1);
    }

    #[test]
    fn no_values_stages_nothing() {
        let mut work = UnitOfWork::new();
        stage_value_removal(&mut work, &[]);
        assert!(work.is_empty());
    }

    #[test]
    fn set_joins_cover_every_table_pointing_at_sets() {
        for table in Table::ALL {
            for fk in table.foreign_keys() {
                if fk.target == Table::ElementSet && table != Table::ElementSet {
                    assert!(
                        SET_JOINS.iter().any(|(t, c)| *t == table && *c == fk.column),
                        "{table}.{} is not cascaded",
                        fk.column
                    );
                }
            }
        }
    }

    #[test]
    fn element_joins_cover_every_table_pointing_at_elements() {
        for table in Table::ALL {
            for fk in table.foreign_keys() {
                if fk.target == Table::Element && table != Table::ElementValue {
                    assert!(
                        ELEMENT_JOINS.iter().any(|(t, c)| *t == table && *c == fk.column),
                        "{table}.{} is not cascaded",
                        fk.column
                    );
                }
            }
        }
    }
}

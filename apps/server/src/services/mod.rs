//! Domain services, one per entity family
//!
//! Every mutating call follows the same shape: validate the input, read what the
//! change depends on, stage a [`UnitOfWork`](crate::db::UnitOfWork), commit, then map
//! the result to its DTO.

pub mod cascade;
pub mod element;
pub mod element_set;
pub mod image;
pub mod index_code;
pub mod module;
pub mod organization;
pub mod person;
pub mod reference;
pub mod specialty;

pub use element::ElementService;
pub use element_set::ElementSetService;
pub use image::ImageService;
pub use index_code::IndexCodeService;
pub use module::ModuleService;
pub use organization::OrganizationService;
pub use person::PersonService;
pub use reference::ReferenceService;
pub use specialty::SpecialtyService;

use std::collections::{BTreeMap, HashMap};

use crate::db::{Id, Record, Registry};
use crate::{Error, Result};

/// Fail with `NotFound` on the first id that has no row.
pub(crate) async fn ensure_exist<R: Record>(registry: &Registry, ids: &[Id]) -> Result<()> {
    if ids.is_empty() {
        return Ok(());
    }
    let found: Vec<Id> = registry
        .find_by::<R>("id", ids)
        .await?
        .iter()
        .map(Record::id)
        .collect();
    match ids.iter().find(|id| !found.contains(id)) {
        Some(missing) => Err(Error::not_found(R::ENTITY, missing)),
        None => Ok(()),
    }
}

/// Group join rows by owner, keeping target ids sorted and unique.
pub(crate) fn group_ids<T>(
    rows: &[T],
    owner: impl Fn(&T) -> Id,
    target: impl Fn(&T) -> Id,
) -> HashMap<Id, Vec<Id>> {
    let mut grouped: HashMap<Id, Vec<Id>> = HashMap::new();
    for row in rows {
        grouped.entry(owner(row)).or_default().push(target(row));
    }
    for ids in grouped.values_mut() {
        ids.sort_unstable();
        ids.dedup();
    }
    grouped
}

/// Roles per owner for one target, in first-seen order, owners ordered by id.
pub(crate) fn group_roles<T>(
    rows: &[T],
    owner: impl Fn(&T) -> Id,
    role: impl Fn(&T) -> &str,
) -> BTreeMap<Id, Vec<String>> {
    let mut grouped: BTreeMap<Id, Vec<String>> = BTreeMap::new();
    for row in rows {
        let roles = grouped.entry(owner(row)).or_default();
        let role = role(row);
        if !roles.iter().any(|r| r == role) {
            roles.push(role.to_string());
        }
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryRegistryStore;
    use crate::models::ElementSet;
    use std::sync::Arc;

    #[test]
    fn group_ids_sorts_and_dedups() {
        let rows = [(1, 9), (2, 4), (1, 3), (1, 9)];
        let grouped = group_ids(&rows, |r| r.0, |r| r.1);
        assert_eq!(grouped[&1], vec![3, 9]);
        assert_eq!(grouped[&2], vec![4]);
    }

    #[test]
    fn group_roles_keeps_first_seen_order() {
        let rows = [(5, "editor"), (5, "author"), (5, "editor"), (2, "sponsor")];
        let grouped = group_roles(&rows, |r| r.0, |r| r.1);
        assert_eq!(grouped.keys().copied().collect::<Vec<_>>(), vec![2, 5]);
        assert_eq!(grouped[&5], vec!["editor", "author"]);
    }

    #[tokio::test]
    async fn ensure_exist_names_the_missing_id() {
        let registry = Registry::new(Arc::new(MemoryRegistryStore::new()));
        let mut work = registry.work();
        work.add(&ElementSet {
            name: "Present".into(),
            ..Default::default()
        })
        .unwrap();
        registry.commit(work).await.unwrap();

        ensure_exist::<ElementSet>(&registry, &[1]).await.unwrap();
        let err = ensure_exist::<ElementSet>(&registry, &[1, 4]).await.unwrap_err();
        assert_eq!(err.to_string(), "ElementSet 4 not found");
    }
}

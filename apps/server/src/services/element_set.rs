//! Element set service and the set delete cascade

use std::collections::HashSet;
use std::sync::Arc;

use super::cascade::{stage_element_removal, stage_set_joins};
use super::group_ids;
use crate::config::RegistrySettings;
use crate::db::{Id, Registry};
use crate::metrics::CASCADE_ROWS_REMOVED_TOTAL;
use crate::models::{
    clean, CreateUpdateSet, Element, ElementSet, ElementSetDto, ElementSetRef, SetDeletion,
};
use crate::{Error, Result};

pub struct ElementSetService {
    registry: Registry,
    settings: Arc<RegistrySettings>,
}

impl ElementSetService {
    pub fn new(registry: Registry, settings: Arc<RegistrySettings>) -> Self {
        Self { registry, settings }
    }

    pub async fn get_all(&self) -> Result<Vec<ElementSetDto>> {
        let sets = self.registry.all::<ElementSet>().await?;
        let refs = self.registry.all::<ElementSetRef>().await?;
        Ok(with_element_ids(sets, &refs))
    }

    pub async fn get_by_id(&self, id: Id) -> Result<ElementSetDto> {
        let set = self.registry.get::<ElementSet>(id).await?;
        self.hydrate(vec![set])
            .await?
            .pop()
            .ok_or_else(|| Error::not_found("ElementSet", id))
    }

    pub async fn search(&self, keyword: Option<&str>) -> Result<Vec<ElementSetDto>> {
        let sets = self
            .registry
            .search::<ElementSet>(keyword, self.settings.max_search_results)
            .await?;
        self.hydrate(sets).await
    }

    /// Sets an element is linked to.
    pub async fn sets_for_element(&self, element_id: Id) -> Result<Vec<ElementSetDto>> {
        self.registry.get::<Element>(element_id).await?;
        let set_ids: Vec<Id> = self
            .registry
            .find_by::<ElementSetRef>("element_id", &[element_id])
            .await?
            .iter()
            .map(|r| r.element_set_id)
            .collect();
        let sets = self.registry.find_by::<ElementSet>("id", &set_ids).await?;
        self.hydrate(sets).await
    }

    pub async fn create(&self, input: &CreateUpdateSet) -> Result<ElementSetDto> {
        input.check()?;
        if let Some(parent_id) = input.parent_id {
            self.registry.get::<ElementSet>(parent_id).await?;
        }

        let mut set = ElementSet::default();
        apply_input(&mut set, input);

        let mut work = self.registry.work();
        let pending = work.add(&set)?;
        let outcome = self.registry.commit(work).await?;
        let id = outcome.id_of(pending)?;

        tracing::info!(set_id = id, name = %set.name, "Element set created");
        self.get_by_id(id).await
    }

    pub async fn update(&self, id: Id, input: &CreateUpdateSet) -> Result<ElementSetDto> {
        input.check()?;
        if input.parent_id == Some(id) {
            return Err(Error::invalid("parentId", "a set cannot be its own parent"));
        }
        let mut set = self.registry.get::<ElementSet>(id).await?;
        if let Some(parent_id) = input.parent_id {
            if self.is_descendant(parent_id, id).await? {
                return Err(Error::invalid(
                    "parentId",
                    "a set cannot be nested under one of its own descendants",
                ));
            }
        }
        apply_input(&mut set, input);

        let mut work = self.registry.work();
        work.update(&set)?;
        if !self.registry.commit(work).await?.applied() {
            return Err(Error::not_found("ElementSet", id));
        }

        tracing::info!(set_id = id, "Element set updated");
        self.get_by_id(id).await
    }

    /// Delete a set with the elements it owns.
    ///
    /// Each owned element is removed in its own flush, then the set's join rows and
    /// the set row go in a final flush. A failure stops the cascade; flushes already
    /// committed stay committed. Elements also linked from another set are only
    /// unlinked.
    pub async fn delete(&self, id: Id) -> Result<SetDeletion> {
        let set = self.registry.get::<ElementSet>(id).await?;
        let mut element_ids: Vec<Id> = self
            .registry
            .find_by::<ElementSetRef>("element_set_id", &[id])
            .await?
            .iter()
            .map(|r| r.element_id)
            .collect();
        element_ids.sort_unstable();
        element_ids.dedup();

        let links = self
            .registry
            .find_by::<ElementSetRef>("element_id", &element_ids)
            .await?;

        let mut report = SetDeletion::default();
        let mut rows_removed = 0;
        for element_id in element_ids {
            let shared = links
                .iter()
                .any(|r| r.element_id == element_id && r.element_set_id != id);
            if shared {
                report.elements_unlinked += 1;
                continue;
            }

            let mut work = self.registry.work();
            let values = stage_element_removal(&self.registry, &mut work, element_id).await?;
            let outcome = self.registry.commit(work).await?;
            rows_removed += outcome.affected;
            report.elements_removed += 1;
            report.values_removed += values;
            tracing::debug!(set_id = id, element_id, values, "Removed element with its set");
        }

        let mut work = self.registry.work();
        for mut child in self.registry.find_by::<ElementSet>("parent_id", &[id]).await? {
            child.parent_id = None;
            work.update(&child)?;
        }
        stage_set_joins(&mut work, id);
        work.remove(&set);
        let outcome = self.registry.commit(work).await?;
        rows_removed += outcome.affected;

        CASCADE_ROWS_REMOVED_TOTAL
            .with_label_values(&["set"])
            .inc_by(rows_removed);
        tracing::info!(
            set_id = id,
            elements_removed = report.elements_removed,
            values_removed = report.values_removed,
            elements_unlinked = report.elements_unlinked,
            "Element set deleted"
        );
        Ok(report)
    }

    /// Whether `ancestor` appears on the parent chain starting at `set_id` (inclusive).
    /// NotFound when `set_id` itself does not exist.
    async fn is_descendant(&self, set_id: Id, ancestor: Id) -> Result<bool> {
        let mut seen = HashSet::new();
        let mut current = Some(self.registry.get::<ElementSet>(set_id).await?);
        while let Some(set) = current {
            if set.id == ancestor {
                return Ok(true);
            }
            if !seen.insert(set.id) {
                break;
            }
            current = match set.parent_id {
                Some(parent_id) => self.registry.find::<ElementSet>(parent_id).await?,
                None => None,
            };
        }
        Ok(false)
    }

    async fn hydrate(&self, sets: Vec<ElementSet>) -> Result<Vec<ElementSetDto>> {
        let ids: Vec<Id> = sets.iter().map(|s| s.id).collect();
        let refs = self
            .registry
            .find_by::<ElementSetRef>("element_set_id", &ids)
            .await?;
        Ok(with_element_ids(sets, &refs))
    }
}

fn apply_input(set: &mut ElementSet, input: &CreateUpdateSet) {
    set.name = input.module_name.trim().to_string();
    set.description = clean(&input.description);
    set.contact_name = clean(&input.contact_name);
    set.parent_id = input.parent_id;
}

fn with_element_ids(sets: Vec<ElementSet>, refs: &[ElementSetRef]) -> Vec<ElementSetDto> {
    let mut element_ids = group_ids(refs, |r| r.element_set_id, |r| r.element_id);
    sets.into_iter()
        .map(|set| {
            let id = set.id;
            let mut dto = ElementSetDto::from(set);
            dto.element_ids = element_ids.remove(&id).unwrap_or_default();
            dto
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_ids_are_grouped_per_set() {
        let sets = vec![
            ElementSet {
                id: 1,
                name: "A".into(),
                ..Default::default()
            },
            ElementSet {
                id: 2,
                name: "B".into(),
                ..Default::default()
            },
        ];
        let refs = [ElementSetRef::new(1, 8), ElementSetRef::new(1, 3)];
        let dtos = with_element_ids(sets, &refs);
        assert_eq!(dtos[0].element_ids, vec![3, 8]);
        assert!(dtos[1].element_ids.is_empty());
    }

    #[test]
    fn input_is_trimmed() {
        let mut set = ElementSet::default();
        apply_input(
            &mut set,
            &CreateUpdateSet {
                module_name: "  Lung RADS ".into(),
                description: Some("   ".into()),
                contact_name: Some(" Jane ".into()),
                parent_id: None,
            },
        );
        assert_eq!(set.name, "Lung RADS");
        assert_eq!(set.description, None);
        assert_eq!(set.contact_name.as_deref(), Some("Jane"));
    }
}

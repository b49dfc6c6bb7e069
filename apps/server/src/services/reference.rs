//! Literature reference service

use std::sync::Arc;

use super::{ensure_exist, group_ids};
use crate::config::RegistrySettings;
use crate::db::{Id, Link, Registry, Table, UnitOfWork};
use crate::models::{
    clean, CreateUpdateReference, Element, ElementValue, Reference, ReferenceDto,
    ReferenceElementRef, ReferenceElementValueRef, TargetLinks,
};
use crate::{Error, Result};

pub struct ReferenceService {
    registry: Registry,
    settings: Arc<RegistrySettings>,
}

impl ReferenceService {
    pub fn new(registry: Registry, settings: Arc<RegistrySettings>) -> Self {
        Self { registry, settings }
    }

    pub async fn get_all(&self) -> Result<Vec<ReferenceDto>> {
        let references = self.registry.all::<Reference>().await?;
        self.hydrate(references).await
    }

    pub async fn get_by_id(&self, id: Id) -> Result<ReferenceDto> {
        let reference = self.registry.get::<Reference>(id).await?;
        self.hydrate(vec![reference])
            .await?
            .pop()
            .ok_or_else(|| Error::not_found("Reference", id))
    }

    pub async fn search(&self, keyword: Option<&str>) -> Result<Vec<ReferenceDto>> {
        let references = self
            .registry
            .search::<Reference>(keyword, self.settings.max_search_results)
            .await?;
        self.hydrate(references).await
    }

    pub async fn create(&self, input: &CreateUpdateReference) -> Result<ReferenceDto> {
        let links = input.check()?;
        self.ensure_targets(&links).await?;

        let mut reference = Reference::default();
        apply_input(&mut reference, input);

        let mut work = self.registry.work();
        let pending = work.add(&reference)?;
        stage_links(&mut work, Link::from(pending), &links)?;
        let id = self.registry.commit(work).await?.id_of(pending)?;

        tracing::info!(reference_id = id, "Reference created");
        self.get_by_id(id).await
    }

    pub async fn update(&self, id: Id, input: &CreateUpdateReference) -> Result<ReferenceDto> {
        let links = input.check()?;
        let mut reference = self.registry.get::<Reference>(id).await?;
        self.ensure_targets(&links).await?;
        apply_input(&mut reference, input);

        let mut work = self.registry.work();
        work.update(&reference)?;
        if !links.is_empty() {
            stage_unlink(&mut work, id);
            stage_links(&mut work, Link::from(id), &links)?;
        }
        if !self.registry.commit(work).await?.applied() {
            return Err(Error::not_found("Reference", id));
        }

        tracing::info!(reference_id = id, "Reference updated");
        self.get_by_id(id).await
    }

    pub async fn delete(&self, id: Id) -> Result<()> {
        let reference = self.registry.get::<Reference>(id).await?;
        let mut work = self.registry.work();
        stage_unlink(&mut work, id);
        work.remove(&reference);
        self.registry.commit(work).await?;
        tracing::info!(reference_id = id, "Reference deleted");
        Ok(())
    }

    async fn ensure_targets(&self, links: &TargetLinks) -> Result<()> {
        ensure_exist::<Element>(&self.registry, &links.element_ids).await?;
        ensure_exist::<ElementValue>(&self.registry, &links.element_value_ids).await
    }

    async fn hydrate(&self, references: Vec<Reference>) -> Result<Vec<ReferenceDto>> {
        let ids: Vec<Id> = references.iter().map(|r| r.id).collect();
        let element_refs = self
            .registry
            .find_by::<ReferenceElementRef>("reference_id", &ids)
            .await?;
        let value_refs = self
            .registry
            .find_by::<ReferenceElementValueRef>("reference_id", &ids)
            .await?;
        let mut element_ids = group_ids(&element_refs, |r| r.reference_id, |r| r.element_id);
        let mut value_ids = group_ids(&value_refs, |r| r.reference_id, |r| r.element_value_id);

        Ok(references
            .into_iter()
            .map(|reference| {
                let id = reference.id;
                let mut dto = ReferenceDto::from(reference);
                dto.element_ids = element_ids.remove(&id).unwrap_or_default();
                dto.element_value_ids = value_ids.remove(&id).unwrap_or_default();
                dto
            })
            .collect())
    }
}

fn apply_input(reference: &mut Reference, input: &CreateUpdateReference) {
    reference.citation = input.citation.trim().to_string();
    reference.doi_uri = clean(&input.doi_uri);
    reference.pubmed_id = clean(&input.pubmed_id);
    reference.url = clean(&input.url);
}

fn stage_unlink(work: &mut UnitOfWork, reference_id: Id) {
    work.remove_where(Table::ReferenceElementRef, "reference_id", &[reference_id]);
    work.remove_where(Table::ReferenceElementValueRef, "reference_id", &[reference_id]);
}

fn stage_links(work: &mut UnitOfWork, reference: Link, links: &TargetLinks) -> Result<()> {
    let owner = [("reference_id", reference)];
    for element_id in &links.element_ids {
        work.add_linked(
            &ReferenceElementRef {
                element_id: *element_id,
                ..Default::default()
            },
            &owner,
        )?;
    }
    for value_id in &links.element_value_ids {
        work.add_linked(
            &ReferenceElementValueRef {
                element_value_id: *value_id,
                ..Default::default()
            },
            &owner,
        )?;
    }
    Ok(())
}

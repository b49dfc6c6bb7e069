//! Specialty lookups (read only)
//!
//! Soft-deleted specialties never leave the store, so nothing here filters
//! `deleted_at` itself.

use std::sync::Arc;

use super::element::hydrate_elements;
use crate::config::RegistrySettings;
use crate::db::{Id, Registry};
use crate::models::{Element, ElementDto, Specialty, SpecialtyDto, SpecialtyElementRef};
use crate::Result;

pub struct SpecialtyService {
    registry: Registry,
    settings: Arc<RegistrySettings>,
}

impl SpecialtyService {
    pub fn new(registry: Registry, settings: Arc<RegistrySettings>) -> Self {
        Self { registry, settings }
    }

    pub async fn get_all(&self) -> Result<Vec<SpecialtyDto>> {
        let specialties = self.registry.all::<Specialty>().await?;
        Ok(specialties.into_iter().map(Into::into).collect())
    }

    pub async fn get_by_id(&self, id: Id) -> Result<SpecialtyDto> {
        Ok(self.registry.get::<Specialty>(id).await?.into())
    }

    pub async fn search(&self, keyword: Option<&str>) -> Result<Vec<SpecialtyDto>> {
        let specialties = self
            .registry
            .search::<Specialty>(keyword, self.settings.max_search_results)
            .await?;
        Ok(specialties.into_iter().map(Into::into).collect())
    }

    pub async fn elements_for_specialty(&self, id: Id) -> Result<Vec<ElementDto>> {
        self.registry.get::<Specialty>(id).await?;
        let element_ids: Vec<Id> = self
            .registry
            .find_by::<SpecialtyElementRef>("specialty_id", &[id])
            .await?
            .iter()
            .map(|r| r.element_id)
            .collect();
        let elements = self.registry.find_by::<Element>("id", &element_ids).await?;
        hydrate_elements(&self.registry, elements).await
    }
}

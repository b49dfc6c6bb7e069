//! Organization service
//!
//! Organizations link to sets and elements through role rows, one per
//! (target, role) pair.

use std::sync::Arc;

use super::{ensure_exist, group_roles};
use crate::config::RegistrySettings;
use crate::db::{Id, Link, Registry, Table, UnitOfWork};
use crate::models::{
    clean, CreateUpdateOrganization, Element, ElementSet, Organization, OrganizationDto,
    OrganizationRole, OrganizationRoleElementRef, OrganizationRoleElementSetRef, RoleLinks,
};
use crate::{Error, Result};

pub struct OrganizationService {
    registry: Registry,
    settings: Arc<RegistrySettings>,
}

impl OrganizationService {
    pub fn new(registry: Registry, settings: Arc<RegistrySettings>) -> Self {
        Self { registry, settings }
    }

    pub async fn get_all(&self) -> Result<Vec<OrganizationDto>> {
        let orgs = self.registry.all::<Organization>().await?;
        Ok(orgs.into_iter().map(Into::into).collect())
    }

    pub async fn get_by_id(&self, id: Id) -> Result<OrganizationDto> {
        Ok(self.registry.get::<Organization>(id).await?.into())
    }

    pub async fn search(&self, keyword: Option<&str>) -> Result<Vec<OrganizationDto>> {
        let orgs = self
            .registry
            .search::<Organization>(keyword, self.settings.max_search_results)
            .await?;
        Ok(orgs.into_iter().map(Into::into).collect())
    }

    pub async fn create(&self, input: &CreateUpdateOrganization) -> Result<OrganizationDto> {
        let links = input.check()?;
        self.ensure_targets(&links).await?;

        let mut org = Organization::default();
        apply_input(&mut org, input);

        let mut work = self.registry.work();
        let pending = work.add(&org)?;
        stage_links(&mut work, Link::from(pending), &links)?;
        let outcome = self.registry.commit(work).await?;
        let id = outcome.id_of(pending)?;

        tracing::info!(
            organization_id = id,
            set_id = ?links.set_id,
            elements = links.element_ids.len(),
            "Organization created"
        );
        self.get_by_id(id).await
    }

    /// Update the row; when links are given, replace its roles on those targets.
    pub async fn update(
        &self,
        id: Id,
        input: &CreateUpdateOrganization,
    ) -> Result<OrganizationDto> {
        let links = input.check()?;
        let mut org = self.registry.get::<Organization>(id).await?;
        self.ensure_targets(&links).await?;
        apply_input(&mut org, input);

        let mut work = self.registry.work();
        work.update(&org)?;
        if !links.is_empty() {
            let element_refs = self
                .registry
                .find_by::<OrganizationRoleElementRef>("organization_id", &[id])
                .await?;
            work.remove_range(
                element_refs
                    .iter()
                    .filter(|r| links.element_ids.contains(&r.element_id)),
            );
            let set_refs = self
                .registry
                .find_by::<OrganizationRoleElementSetRef>("organization_id", &[id])
                .await?;
            work.remove_range(
                set_refs
                    .iter()
                    .filter(|r| Some(r.element_set_id) == links.set_id),
            );
            stage_links(&mut work, Link::from(id), &links)?;
        }

        if !self.registry.commit(work).await?.applied() {
            return Err(Error::not_found("Organization", id));
        }
        tracing::info!(organization_id = id, "Organization updated");
        self.get_by_id(id).await
    }

    pub async fn delete(&self, id: Id) -> Result<()> {
        let org = self.registry.get::<Organization>(id).await?;
        let mut work = self.registry.work();
        work.remove_where(Table::OrganizationRoleElementRef, "organization_id", &[id]);
        work.remove_where(Table::OrganizationRoleElementSetRef, "organization_id", &[id]);
        work.remove(&org);
        self.registry.commit(work).await?;
        tracing::info!(organization_id = id, "Organization deleted");
        Ok(())
    }

    /// Organizations linked to a set, each with the roles it holds there.
    pub async fn organizations_for_set(&self, set_id: Id) -> Result<Vec<OrganizationDto>> {
        self.registry.get::<ElementSet>(set_id).await?;
        let refs = self
            .registry
            .find_by::<OrganizationRoleElementSetRef>("element_set_id", &[set_id])
            .await?;
        let roles = group_roles(&refs, |r| r.organization_id, |r| r.role.as_str());
        self.with_roles(roles).await
    }

    /// Organizations linked to an element, each with the roles it holds there.
    pub async fn organizations_for_element(&self, element_id: Id) -> Result<Vec<OrganizationDto>> {
        self.registry.get::<Element>(element_id).await?;
        let refs = self
            .registry
            .find_by::<OrganizationRoleElementRef>("element_id", &[element_id])
            .await?;
        let roles = group_roles(&refs, |r| r.organization_id, |r| r.role.as_str());
        self.with_roles(roles).await
    }

    async fn with_roles(
        &self,
        mut roles: std::collections::BTreeMap<Id, Vec<String>>,
    ) -> Result<Vec<OrganizationDto>> {
        let ids: Vec<Id> = roles.keys().copied().collect();
        let orgs = self.registry.find_by::<Organization>("id", &ids).await?;
        Ok(orgs
            .into_iter()
            .map(|org| {
                let id = org.id;
                let mut dto = OrganizationDto::from(org);
                dto.roles = roles.remove(&id).unwrap_or_default();
                dto
            })
            .collect())
    }

    async fn ensure_targets(&self, links: &RoleLinks<OrganizationRole>) -> Result<()> {
        if let Some(set_id) = links.set_id {
            self.registry.get::<ElementSet>(set_id).await?;
        }
        ensure_exist::<Element>(&self.registry, &links.element_ids).await
    }
}

fn apply_input(org: &mut Organization, input: &CreateUpdateOrganization) {
    org.name = input.name.trim().to_string();
    org.abbreviation = clean(&input.abbreviation);
    org.url = clean(&input.url);
    org.comment = clean(&input.comment);
    org.email = clean(&input.email);
    org.twitter_handle = clean(&input.twitter_handle);
}

fn stage_links(
    work: &mut UnitOfWork,
    organization: Link,
    links: &RoleLinks<OrganizationRole>,
) -> Result<()> {
    let owner = [("organization_id", organization)];
    for role in &links.roles {
        if let Some(set_id) = links.set_id {
            work.add_linked(
                &OrganizationRoleElementSetRef {
                    element_set_id: set_id,
                    role: role.as_str().to_string(),
                    ..Default::default()
                },
                &owner,
            )?;
        }
        for element_id in &links.element_ids {
            work.add_linked(
                &OrganizationRoleElementRef {
                    element_id: *element_id,
                    role: role.as_str().to_string(),
                    ..Default::default()
                },
                &owner,
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_row_per_target_and_role() {
        let links = RoleLinks {
            set_id: Some(1),
            element_ids: vec![4, 5],
            roles: vec![OrganizationRole::Author, OrganizationRole::Sponsor],
        };
        let mut work = UnitOfWork::new();
        stage_links(&mut work, Link::from(9), &links).unwrap();
        assert_eq!(work.len(), 6);
    }
}

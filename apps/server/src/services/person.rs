//! Person service

use std::sync::Arc;

use super::{ensure_exist, group_roles};
use crate::config::RegistrySettings;
use crate::db::{Id, Link, Registry, Table, UnitOfWork};
use crate::models::{
    clean, CreateUpdatePerson, Element, ElementSet, Person, PersonDto, PersonRole,
    PersonRoleElementRef, PersonRoleElementSetRef, RoleLinks,
};
use crate::{Error, Result};

pub struct PersonService {
    registry: Registry,
    settings: Arc<RegistrySettings>,
}

impl PersonService {
    pub fn new(registry: Registry, settings: Arc<RegistrySettings>) -> Self {
        Self { registry, settings }
    }

    pub async fn get_all(&self) -> Result<Vec<PersonDto>> {
        let people = self.registry.all::<Person>().await?;
        Ok(people.into_iter().map(Into::into).collect())
    }

    pub async fn get_by_id(&self, id: Id) -> Result<PersonDto> {
        Ok(self.registry.get::<Person>(id).await?.into())
    }

    pub async fn search(&self, keyword: Option<&str>) -> Result<Vec<PersonDto>> {
        let people = self
            .registry
            .search::<Person>(keyword, self.settings.max_search_results)
            .await?;
        Ok(people.into_iter().map(Into::into).collect())
    }

    pub async fn create(&self, input: &CreateUpdatePerson) -> Result<PersonDto> {
        let links = input.check()?;
        self.ensure_targets(&links).await?;

        let mut person = Person::default();
        apply_input(&mut person, input);

        let mut work = self.registry.work();
        let pending = work.add(&person)?;
        stage_links(&mut work, Link::from(pending), &links)?;
        let outcome = self.registry.commit(work).await?;
        let id = outcome.id_of(pending)?;

        tracing::info!(
            person_id = id,
            set_id = ?links.set_id,
            elements = links.element_ids.len(),
            "Person created"
        );
        self.get_by_id(id).await
    }

    /// Update the row; when links are given, replace its roles on those targets.
    pub async fn update(&self, id: Id, input: &CreateUpdatePerson) -> Result<PersonDto> {
        let links = input.check()?;
        let mut person = self.registry.get::<Person>(id).await?;
        self.ensure_targets(&links).await?;
        apply_input(&mut person, input);

        let mut work = self.registry.work();
        work.update(&person)?;
        if !links.is_empty() {
            let element_refs = self
                .registry
                .find_by::<PersonRoleElementRef>("person_id", &[id])
                .await?;
            work.remove_range(
                element_refs
                    .iter()
                    .filter(|r| links.element_ids.contains(&r.element_id)),
            );
            let set_refs = self
                .registry
                .find_by::<PersonRoleElementSetRef>("person_id", &[id])
                .await?;
            work.remove_range(
                set_refs
                    .iter()
                    .filter(|r| Some(r.element_set_id) == links.set_id),
            );
            stage_links(&mut work, Link::from(id), &links)?;
        }

        if !self.registry.commit(work).await?.applied() {
            return Err(Error::not_found("Person", id));
        }
        tracing::info!(person_id = id, "Person updated");
        self.get_by_id(id).await
    }

    pub async fn delete(&self, id: Id) -> Result<()> {
        let person = self.registry.get::<Person>(id).await?;
        let mut work = self.registry.work();
        work.remove_where(Table::PersonRoleElementRef, "person_id", &[id]);
        work.remove_where(Table::PersonRoleElementSetRef, "person_id", &[id]);
        work.remove(&person);
        self.registry.commit(work).await?;
        tracing::info!(person_id = id, "Person deleted");
        Ok(())
    }

    /// Persons linked to a set, each with the roles it holds there.
    pub async fn persons_for_set(&self, set_id: Id) -> Result<Vec<PersonDto>> {
        self.registry.get::<ElementSet>(set_id).await?;
        let refs = self
            .registry
            .find_by::<PersonRoleElementSetRef>("element_set_id", &[set_id])
            .await?;
        let roles = group_roles(&refs, |r| r.person_id, |r| r.role.as_str());
        self.with_roles(roles).await
    }

    /// Persons linked to an element, each with the roles it holds there.
    pub async fn persons_for_element(&self, element_id: Id) -> Result<Vec<PersonDto>> {
        self.registry.get::<Element>(element_id).await?;
        let refs = self
            .registry
            .find_by::<PersonRoleElementRef>("element_id", &[element_id])
            .await?;
        let roles = group_roles(&refs, |r| r.person_id, |r| r.role.as_str());
        self.with_roles(roles).await
    }

    async fn with_roles(
        &self,
        mut roles: std::collections::BTreeMap<Id, Vec<String>>,
    ) -> Result<Vec<PersonDto>> {
        let ids: Vec<Id> = roles.keys().copied().collect();
        let people = self.registry.find_by::<Person>("id", &ids).await?;
        Ok(people
            .into_iter()
            .map(|person| {
                let id = person.id;
                let mut dto = PersonDto::from(person);
                dto.roles = roles.remove(&id).unwrap_or_default();
                dto
            })
            .collect())
    }

    async fn ensure_targets(&self, links: &RoleLinks<PersonRole>) -> Result<()> {
        if let Some(set_id) = links.set_id {
            self.registry.get::<ElementSet>(set_id).await?;
        }
        ensure_exist::<Element>(&self.registry, &links.element_ids).await
    }
}

fn apply_input(person: &mut Person, input: &CreateUpdatePerson) {
    person.name = input.name.trim().to_string();
    person.orcid = clean(&input.orcid);
    person.url = clean(&input.url);
    person.twitter_handle = clean(&input.twitter_handle);
}

fn stage_links(work: &mut UnitOfWork, person: Link, links: &RoleLinks<PersonRole>) -> Result<()> {
    let owner = [("person_id", person)];
    for role in &links.roles {
        if let Some(set_id) = links.set_id {
            work.add_linked(
                &PersonRoleElementSetRef {
                    element_set_id: set_id,
                    role: role.as_str().to_string(),
                    ..Default::default()
                },
                &owner,
            )?;
        }
        for element_id in &links.element_ids {
            work.add_linked(
                &PersonRoleElementRef {
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
    use crate::db::unit_of_work::Change;

    #[test]
    fn element_only_links_skip_set_rows() {
        let links = RoleLinks {
            set_id: None,
            element_ids: vec![4],
            roles: vec![PersonRole::Editor, PersonRole::Reviewer],
        };
        let mut work = UnitOfWork::new();
        stage_links(&mut work, Link::from(2), &links).unwrap();
        let roles: Vec<String> = work
            .changes()
            .iter()
            .map(|c| match c {
                Change::Insert { table, row, .. } => {
                    assert_eq!(*table, Table::PersonRoleElementRef);
                    row["role"].as_str().unwrap_or_default().to_string()
                }
                other => panic!("unexpected change {other:?}"),
            })
            .collect();
        assert_eq!(roles, vec!["editor", "reviewer"]);
    }
}

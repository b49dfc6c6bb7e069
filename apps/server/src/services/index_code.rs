//! Index code service
//!
//! Codes come from a registered index code system and may point at sets,
//! elements and element values.

use std::sync::Arc;

use super::{ensure_exist, group_ids};
use crate::config::RegistrySettings;
use crate::db::{Id, Link, Registry, Table, UnitOfWork};
use crate::models::{
    clean, CreateUpdateIndexCode, Element, ElementSet, ElementValue, IndexCode, IndexCodeDto,
    IndexCodeElementRef, IndexCodeElementSetRef, IndexCodeElementValueRef, IndexCodeSystem,
    IndexCodeSystemDto, TargetLinks,
};
use crate::{Error, Result};

const LINK_TABLES: [Table; 3] = [
    Table::IndexCodeElementRef,
    Table::IndexCodeElementSetRef,
    Table::IndexCodeElementValueRef,
];

pub struct IndexCodeService {
    registry: Registry,
    settings: Arc<RegistrySettings>,
}

impl IndexCodeService {
    pub fn new(registry: Registry, settings: Arc<RegistrySettings>) -> Self {
        Self { registry, settings }
    }

    pub async fn systems(&self) -> Result<Vec<IndexCodeSystemDto>> {
        let systems = self.registry.all::<IndexCodeSystem>().await?;
        Ok(systems.into_iter().map(Into::into).collect())
    }

    pub async fn get_all(&self) -> Result<Vec<IndexCodeDto>> {
        let codes = self.registry.all::<IndexCode>().await?;
        self.hydrate(codes).await
    }

    pub async fn get_by_id(&self, id: Id) -> Result<IndexCodeDto> {
        let code = self.registry.get::<IndexCode>(id).await?;
        self.hydrate(vec![code])
            .await?
            .pop()
            .ok_or_else(|| Error::not_found("IndexCode", id))
    }

    pub async fn search(&self, keyword: Option<&str>) -> Result<Vec<IndexCodeDto>> {
        let codes = self
            .registry
            .search::<IndexCode>(keyword, self.settings.max_search_results)
            .await?;
        self.hydrate(codes).await
    }

    pub async fn create(&self, input: &CreateUpdateIndexCode) -> Result<IndexCodeDto> {
        let links = input.check()?;
        let system = self.resolve_system(&input.system).await?;
        self.ensure_targets(&links).await?;

        let mut code = IndexCode::default();
        apply_input(&mut code, input, system);

        let mut work = self.registry.work();
        let pending = work.add(&code)?;
        stage_links(&mut work, Link::from(pending), &links)?;
        let outcome = self.registry.commit(work).await?;
        let id = outcome.id_of(pending)?;

        tracing::info!(
            code_id = id,
            system = %code.system,
            code = %code.code,
            "Index code created"
        );
        self.get_by_id(id).await
    }

    /// Update the row; when any link is given, the code's links are replaced wholesale.
    pub async fn update(&self, id: Id, input: &CreateUpdateIndexCode) -> Result<IndexCodeDto> {
        let links = input.check()?;
        let mut code = self.registry.get::<IndexCode>(id).await?;
        let system = self.resolve_system(&input.system).await?;
        self.ensure_targets(&links).await?;
        apply_input(&mut code, input, system);

        let mut work = self.registry.work();
        work.update(&code)?;
        if !links.is_empty() {
            stage_unlink(&mut work, id);
            stage_links(&mut work, Link::from(id), &links)?;
        }
        if !self.registry.commit(work).await?.applied() {
            return Err(Error::not_found("IndexCode", id));
        }

        tracing::info!(code_id = id, "Index code updated");
        self.get_by_id(id).await
    }

    pub async fn delete(&self, id: Id) -> Result<()> {
        let code = self.registry.get::<IndexCode>(id).await?;
        let mut work = self.registry.work();
        stage_unlink(&mut work, id);
        work.remove(&code);
        self.registry.commit(work).await?;
        tracing::info!(code_id = id, "Index code deleted");
        Ok(())
    }

    /// Canonical abbreviation of a registered system, matched case-insensitively.
    async fn resolve_system(&self, system: &str) -> Result<String> {
        let wanted = system.trim();
        self.registry
            .all::<IndexCodeSystem>()
            .await?
            .into_iter()
            .find(|s| s.abbreviation.eq_ignore_ascii_case(wanted))
            .map(|s| s.abbreviation)
            .ok_or_else(|| {
                Error::invalid("system", format!("unknown index code system '{wanted}'"))
            })
    }

    async fn ensure_targets(&self, links: &TargetLinks) -> Result<()> {
        if let Some(set_id) = links.set_id {
            self.registry.get::<ElementSet>(set_id).await?;
        }
        ensure_exist::<Element>(&self.registry, &links.element_ids).await?;
        ensure_exist::<ElementValue>(&self.registry, &links.element_value_ids).await
    }

    async fn hydrate(&self, codes: Vec<IndexCode>) -> Result<Vec<IndexCodeDto>> {
        let ids: Vec<Id> = codes.iter().map(|c| c.id).collect();
        let set_refs = self
            .registry
            .find_by::<IndexCodeElementSetRef>("code_id", &ids)
            .await?;
        let element_refs = self
            .registry
            .find_by::<IndexCodeElementRef>("code_id", &ids)
            .await?;
        let value_refs = self
            .registry
            .find_by::<IndexCodeElementValueRef>("code_id", &ids)
            .await?;

        let mut set_ids = group_ids(&set_refs, |r| r.code_id, |r| r.element_set_id);
        let mut element_ids = group_ids(&element_refs, |r| r.code_id, |r| r.element_id);
        let mut value_ids = group_ids(&value_refs, |r| r.code_id, |r| r.element_value_id);

        Ok(codes
            .into_iter()
            .map(|code| {
                let id = code.id;
                let mut dto = IndexCodeDto::from(code);
                dto.set_ids = set_ids.remove(&id).unwrap_or_default();
                dto.element_ids = element_ids.remove(&id).unwrap_or_default();
                dto.element_value_ids = value_ids.remove(&id).unwrap_or_default();
                dto
            })
            .collect())
    }
}

fn apply_input(code: &mut IndexCode, input: &CreateUpdateIndexCode, system: String) {
    code.system = system;
    code.code = input.code.trim().to_string();
    code.display = input.display.trim().to_string();
    code.href = clean(&input.href);
}

fn stage_unlink(work: &mut UnitOfWork, code_id: Id) {
    for table in LINK_TABLES {
        work.remove_where(table, "code_id", &[code_id]);
    }
}

fn stage_links(work: &mut UnitOfWork, code: Link, links: &TargetLinks) -> Result<()> {
    let owner = [("code_id", code)];
    if let Some(set_id) = links.set_id {
        work.add_linked(
            &IndexCodeElementSetRef {
                element_set_id: set_id,
                ..Default::default()
            },
            &owner,
        )?;
    }
    for element_id in &links.element_ids {
        work.add_linked(
            &IndexCodeElementRef {
                element_id: *element_id,
                ..Default::default()
            },
            &owner,
        )?;
    }
    for value_id in &links.element_value_ids {
        work.add_linked(
            &IndexCodeElementValueRef {
                element_value_id: *value_id,
                ..Default::default()
            },
            &owner,
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlink_covers_every_code_link_table() {
        for table in Table::ALL {
            let points_at_codes = table
                .foreign_keys()
                .iter()
                .any(|fk| fk.target == Table::IndexCode);
            assert_eq!(points_at_codes, LINK_TABLES.contains(&table), "{table}");
        }
    }

    #[test]
    fn links_stage_one_row_per_target() {
        let links = TargetLinks {
            set_id: Some(2),
            element_ids: vec![3, 4],
            element_value_ids: vec![9],
        };
        let mut work = UnitOfWork::new();
        stage_links(&mut work, Link::from(1), &links).unwrap();
        assert_eq!(work.len(), 4);
    }
}

//! Element service
//!
//! An element's value type, step and cardinality are derived from the
//! data-element-type discriminator of the request; choice elements own one
//! `element_value` row per option.

use chrono::Utc;
use cde_module::DataElementType;
use std::sync::Arc;

use super::cascade::{stage_element_removal, stage_value_removal};
use super::group_ids;
use crate::config::RegistrySettings;
use crate::db::{Id, Link, Pending, Registry, UnitOfWork};
use crate::metrics::CASCADE_ROWS_REMOVED_TOTAL;
use crate::models::{
    clean, CreateUpdateElement, Element, ElementDto, ElementOption, ElementSet, ElementSetRef,
    ElementValue,
};
use crate::{Error, Result};

pub const VALUE_TYPE_INTEGER: &str = "integer";
pub const VALUE_TYPE_FLOAT: &str = "float";
pub const VALUE_TYPE_VALUE_SET: &str = "valueSet";
pub const VALUE_TYPE_MULTI_VALUE_SET: &str = "multiValueSet";

pub struct ElementService {
    registry: Registry,
    settings: Arc<RegistrySettings>,
}

impl ElementService {
    pub fn new(registry: Registry, settings: Arc<RegistrySettings>) -> Self {
        Self { registry, settings }
    }

    pub async fn get_all(&self) -> Result<Vec<ElementDto>> {
        let elements = self.registry.all::<Element>().await?;
        hydrate_elements(&self.registry, elements).await
    }

    pub async fn get_by_id(&self, id: Id) -> Result<ElementDto> {
        let element = self.registry.get::<Element>(id).await?;
        hydrate_elements(&self.registry, vec![element])
            .await?
            .pop()
            .ok_or_else(|| Error::not_found("Element", id))
    }

    pub async fn get_by_set(&self, set_id: Id) -> Result<Vec<ElementDto>> {
        self.registry.get::<ElementSet>(set_id).await?;
        let element_ids: Vec<Id> = self
            .registry
            .find_by::<ElementSetRef>("element_set_id", &[set_id])
            .await?
            .iter()
            .map(|r| r.element_id)
            .collect();
        let elements = self.registry.find_by::<Element>("id", &element_ids).await?;
        hydrate_elements(&self.registry, elements).await
    }

    pub async fn search(&self, keyword: Option<&str>) -> Result<Vec<ElementDto>> {
        let elements = self
            .registry
            .search::<Element>(keyword, self.settings.max_search_results)
            .await?;
        hydrate_elements(&self.registry, elements).await
    }

    /// Create an element with its values and link it to `set_id`, all in one flush.
    pub async fn create(&self, set_id: Id, input: &CreateUpdateElement) -> Result<ElementDto> {
        let kind = input.check()?;
        self.registry.get::<ElementSet>(set_id).await?;

        let element = new_element(&self.settings, input, kind)?;
        let mut work = self.registry.work();
        let pending = stage_element(&mut work, &element, &input.options)?;
        work.add_linked(
            &ElementSetRef::new(set_id, 0),
            &[("element_id", Link::from(pending))],
        )?;

        let outcome = self.registry.commit(work).await?;
        let id = outcome.id_of(pending)?;
        tracing::info!(
            element_id = id,
            set_id,
            value_type = %element.value_type,
            values = input.options.len(),
            "Element created"
        );
        self.get_by_id(id).await
    }

    /// Overwrite an element in place and replace all of its values.
    pub async fn update(
        &self,
        set_id: Id,
        element_id: Id,
        input: &CreateUpdateElement,
    ) -> Result<ElementDto> {
        let kind = input.check()?;
        let mut element = self.member_of_set(set_id, element_id).await?;
        apply_input(&mut element, input, kind)?;

        let old_value_ids: Vec<Id> = self
            .registry
            .find_by::<ElementValue>("element_id", &[element_id])
            .await?
            .iter()
            .map(|v| v.id)
            .collect();

        let mut work = self.registry.work();
        work.update(&element)?;
        stage_value_removal(&mut work, &old_value_ids);
        for option in &input.options {
            work.add(&element_value(element_id, option))?;
        }

        let outcome = self.registry.commit(work).await?;
        if !outcome.applied() {
            return Err(Error::not_found("Element", element_id));
        }
        tracing::info!(
            element_id,
            set_id,
            values_replaced = old_value_ids.len(),
            values = input.options.len(),
            "Element updated"
        );
        self.get_by_id(element_id).await
    }

    /// Unlink an element from a set; remove it entirely when no other set uses it.
    pub async fn delete(&self, set_id: Id, element_id: Id) -> Result<()> {
        self.member_of_set(set_id, element_id).await?;
        let refs = self
            .registry
            .find_by::<ElementSetRef>("element_id", &[element_id])
            .await?;
        let shared = refs.iter().any(|r| r.element_set_id != set_id);

        let mut work = self.registry.work();
        if shared {
            work.remove_range(refs.iter().filter(|r| r.element_set_id == set_id));
            self.registry.commit(work).await?;
            tracing::info!(element_id, set_id, "Shared element unlinked from set");
            return Ok(());
        }

        let values = stage_element_removal(&self.registry, &mut work, element_id).await?;
        let outcome = self.registry.commit(work).await?;
        CASCADE_ROWS_REMOVED_TOTAL
            .with_label_values(&["element"])
            .inc_by(outcome.affected);
        tracing::info!(element_id, set_id, values, "Element deleted");
        Ok(())
    }

    /// The element, provided it is linked to the set. Both must exist.
    async fn member_of_set(&self, set_id: Id, element_id: Id) -> Result<Element> {
        self.registry.get::<ElementSet>(set_id).await?;
        let element = self.registry.get::<Element>(element_id).await?;
        let linked = self
            .registry
            .find_by::<ElementSetRef>("element_id", &[element_id])
            .await?
            .iter()
            .any(|r| r.element_set_id == set_id);
        if !linked {
            return Err(Error::NotFound {
                entity: "Element",
                id: format!("{element_id} in set {set_id}"),
            });
        }
        Ok(element)
    }
}

/// A fresh element row with registry defaults for status and version.
pub(crate) fn new_element(
    settings: &RegistrySettings,
    input: &CreateUpdateElement,
    kind: DataElementType,
) -> Result<Element> {
    let now = Utc::now();
    let mut element = Element {
        status: Some(settings.default_element_status.clone()),
        status_date: Some(now),
        version: Some(settings.default_element_version.clone()),
        version_date: Some(now),
        ..Default::default()
    };
    apply_input(&mut element, input, kind)?;
    Ok(element)
}

/// Copy the descriptive fields of `input` onto `element` and derive the typed ones.
pub(crate) fn apply_input(
    element: &mut Element,
    input: &CreateUpdateElement,
    kind: DataElementType,
) -> Result<()> {
    element.name = input.label.trim().to_string();
    element.short_name = clean(&input.short_name);
    element.definition = clean(&input.definition);
    element.question = clean(&input.question);
    element.instructions = clean(&input.instructions);
    element.references = clean(&input.references);
    element.synonyms = clean(&input.synonyms);
    element.source = clean(&input.source);
    element.editor = clean(&input.editor);
    element.unit = clean(&input.unit);
    element.modality = clean(&input.modality);
    element.biological_sex = clean(&input.biological_sex).map(|s| s.to_ascii_lowercase());
    element.age_lower_bound = input.age_lower_bound;
    element.age_upper_bound = input.age_upper_bound;

    apply_type(element, kind, input.value_min, input.value_max, input.options.len())
}

/// Derive value type, step, bounds and cardinality from the element type.
pub(crate) fn apply_type(
    element: &mut Element,
    kind: DataElementType,
    value_min: Option<f64>,
    value_max: Option<f64>,
    option_count: usize,
) -> Result<()> {
    let (value_type, step) = match kind {
        DataElementType::Integer => (VALUE_TYPE_INTEGER, Some(1.0)),
        DataElementType::Numeric => (VALUE_TYPE_FLOAT, Some(0.1)),
        DataElementType::Choice => (VALUE_TYPE_VALUE_SET, None),
        DataElementType::MultiChoice => (VALUE_TYPE_MULTI_VALUE_SET, None),
        DataElementType::Global => {
            return Err(Error::invalid(
                "dataElementType",
                "global values belong to modules and are not stored as elements",
            ))
        }
    };

    element.value_type = value_type.to_string();
    element.step_value = step;
    if kind.has_bounds() {
        element.value_min = value_min;
        element.value_max = value_max;
    } else {
        element.value_min = None;
        element.value_max = None;
    }
    element.min_cardinality = 1;
    element.max_cardinality = match kind {
        DataElementType::MultiChoice => i32::try_from(option_count.max(1))
            .map_err(|_| Error::invalid("options", "too many options"))?,
        _ => 1,
    };
    Ok(())
}

fn element_value(element_id: Id, option: &ElementOption) -> ElementValue {
    ElementValue {
        element_id,
        value: option.value.trim().to_string(),
        name: option.name.trim().to_string(),
        definition: clean(&option.definition),
        images: clean(&option.images),
        ..Default::default()
    }
}

/// Stage an element insert followed by its values, linked through the pending id.
pub(crate) fn stage_element(
    work: &mut UnitOfWork,
    element: &Element,
    options: &[ElementOption],
) -> Result<Pending> {
    let pending = work.add(element)?;
    for option in options {
        work.add_linked(
            &element_value(0, option),
            &[("element_id", Link::from(pending))],
        )?;
    }
    Ok(pending)
}

/// Attach values and set ids to each element, preserving input order.
pub(crate) async fn hydrate_elements(
    registry: &Registry,
    elements: Vec<Element>,
) -> Result<Vec<ElementDto>> {
    if elements.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Id> = elements.iter().map(|e| e.id).collect();
    let mut values = registry.find_by::<ElementValue>("element_id", &ids).await?;
    values.sort_by_key(|v| v.id);
    let refs = registry.find_by::<ElementSetRef>("element_id", &ids).await?;
    let mut set_ids = group_ids(&refs, |r| r.element_id, |r| r.element_set_id);

    Ok(elements
        .into_iter()
        .map(|element| {
            let id = element.id;
            let mut dto = ElementDto::from(element);
            dto.values = values
                .iter()
                .filter(|v| v.element_id == id)
                .cloned()
                .map(Into::into)
                .collect();
            dto.set_ids = set_ids.remove(&id).unwrap_or_default();
            dto
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(value: &str) -> ElementOption {
        ElementOption {
            value: format!(" {value} "),
            name: value.to_uppercase(),
            ..Default::default()
        }
    }

    #[test]
    fn integer_gets_step_one_and_keeps_bounds() {
        let mut element = Element::default();
        apply_type(&mut element, DataElementType::Integer, Some(0.0), Some(10.0), 0).unwrap();
        assert_eq!(element.value_type, "integer");
        assert_eq!(element.step_value, Some(1.0));
        assert_eq!((element.value_min, element.value_max), (Some(0.0), Some(10.0)));
        assert_eq!((element.min_cardinality, element.max_cardinality), (1, 1));
    }

    #[test]
    fn numeric_maps_to_float() {
        let mut element = Element::default();
        apply_type(&mut element, DataElementType::Numeric, None, Some(2.5), 0).unwrap();
        assert_eq!(element.value_type, "float");
        assert_eq!(element.step_value, Some(0.1));
        assert_eq!(element.value_max, Some(2.5));
    }

    #[test]
    fn multi_choice_cardinality_follows_option_count() {
        let mut element = Element {
            value_min: Some(3.0),
            step_value: Some(1.0),
            ..Default::default()
        };
        apply_type(&mut element, DataElementType::MultiChoice, None, None, 4).unwrap();
        assert_eq!(element.value_type, "multiValueSet");
        assert_eq!(element.step_value, None);
        assert_eq!(element.value_min, None);
        assert_eq!((element.min_cardinality, element.max_cardinality), (1, 4));
    }

    #[test]
    fn global_is_rejected() {
        let mut element = Element::default();
        let err = apply_type(&mut element, DataElementType::Global, None, None, 0).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn staged_values_link_to_the_pending_element() {
        let mut work = UnitOfWork::new();
        let pending = stage_element(
            &mut work,
            &Element::default(),
            &[option("a"), option("b")],
        )
        .unwrap();
        assert_eq!(work.len(), 3);
        match &work.changes()[2] {
            crate::db::unit_of_work::Change::Insert { row, links, .. } => {
                assert_eq!(row["value"], "b");
                assert_eq!(row["name"], "B");
                assert_eq!(links, &vec![("element_id", Link::Pending(pending))]);
            }
            other => panic!("unexpected change {other:?}"),
        }
    }

    #[test]
    fn new_element_takes_registry_defaults() {
        let input = CreateUpdateElement {
            data_element_type: Some("choice".into()),
            label: "  Laterality ".into(),
            biological_sex: Some("Female".into()),
            options: vec![option("left"), option("right")],
            ..Default::default()
        };
        let element =
            new_element(&RegistrySettings::default(), &input, DataElementType::Choice).unwrap();
        assert_eq!(element.name, "Laterality");
        assert_eq!(element.status.as_deref(), Some("Proposed"));
        assert_eq!(element.version.as_deref(), Some("1"));
        assert!(element.version_date.is_some());
        assert_eq!(element.biological_sex.as_deref(), Some("female"));
    }
}

//! Reporting module import and export
//!
//! Imports parse the whole document before anything is written. Each element is
//! then flushed on its own, followed by one flush for the set and its links, so a
//! failure partway leaves the elements already written in place.

use cde_module::{
    parse_module, write_module, Choice, DataElement, DataElementKind, DataElementType,
    ModuleDescription,
};
use cde_module_source::ModuleSource;
use std::collections::HashSet;
use std::sync::Arc;

use super::element::{
    new_element, stage_element, VALUE_TYPE_FLOAT, VALUE_TYPE_INTEGER, VALUE_TYPE_MULTI_VALUE_SET,
    VALUE_TYPE_VALUE_SET,
};
use crate::config::RegistrySettings;
use crate::db::{Id, Link, Registry};
use crate::metrics::record_module_import;
use crate::models::{
    CreateUpdateElement, Element, ElementOption, ElementSet, ElementSetRef, ElementValue,
    ModuleImport,
};
use crate::{Error, Result};

pub struct ModuleService {
    registry: Registry,
    settings: Arc<RegistrySettings>,
    source: Option<Arc<dyn ModuleSource>>,
}

impl ModuleService {
    pub fn new(
        registry: Registry,
        settings: Arc<RegistrySettings>,
        source: Option<Arc<dyn ModuleSource>>,
    ) -> Self {
        Self {
            registry,
            settings,
            source,
        }
    }

    /// Create a new set with one element per non-global data element.
    pub async fn create_module(&self, xml: &str) -> Result<ModuleImport> {
        let result = self.import(xml, None).await;
        record_module_import("create", result.is_ok());
        result
    }

    /// Refresh set metadata and add the document's elements to an existing set.
    ///
    /// Elements already linked to the set are kept even when the document no longer
    /// lists them.
    pub async fn update_module(&self, set_id: Id, xml: &str) -> Result<ModuleImport> {
        let result = self.import(xml, Some(set_id)).await;
        record_module_import("update", result.is_ok());
        result
    }

    /// Fetch a module through the configured source and import it as a new set.
    pub async fn import_from_source(
        &self,
        module_id: &str,
        requester: &str,
    ) -> Result<ModuleImport> {
        let result = self.fetch_and_import(module_id, requester).await;
        record_module_import("source", result.is_ok());
        result
    }

    /// Rebuild the module document of a stored set.
    pub async fn export_module(&self, set_id: Id) -> Result<String> {
        let set = self.registry.get::<ElementSet>(set_id).await?;
        let mut refs = self
            .registry
            .find_by::<ElementSetRef>("element_set_id", &[set_id])
            .await?;
        refs.sort_by_key(|r| r.id);
        let element_ids: Vec<Id> = refs.iter().map(|r| r.element_id).collect();

        let elements = self.registry.find_by::<Element>("id", &element_ids).await?;
        let mut values = self
            .registry
            .find_by::<ElementValue>("element_id", &element_ids)
            .await?;
        values.sort_by_key(|v| v.id);

        let mut used_ids = HashSet::new();
        let mut data_elements = Vec::new();
        for element_id in &element_ids {
            let Some(element) = elements.iter().find(|e| e.id == *element_id) else {
                continue;
            };
            let element_values: Vec<&ElementValue> =
                values.iter().filter(|v| v.element_id == element.id).collect();
            match to_data_element(element, &element_values, &mut used_ids) {
                Some(data_element) => data_elements.push(data_element),
                None => tracing::debug!(
                    set_id,
                    element_id = element.id,
                    value_type = %element.value_type,
                    "Element has no module representation; left out of export"
                ),
            }
        }

        let module = ModuleDescription {
            id: None,
            name: set.name,
            description: set.description,
            contact_name: set.contact_name,
            contact_email: None,
            data_elements,
        };
        Ok(write_module(&module)?)
    }

    async fn fetch_and_import(&self, module_id: &str, requester: &str) -> Result<ModuleImport> {
        let source = self
            .source
            .as_ref()
            .ok_or(cde_module_source::Error::NotConfigured)?;
        let xml = source
            .fetch_module(module_id, requester)
            .await?
            .ok_or_else(|| Error::not_found("Module", module_id))?;
        tracing::info!(module_id, requester, bytes = xml.len(), "Fetched module from source");
        self.import(&xml, None).await
    }

    async fn import(&self, xml: &str, set_id: Option<Id>) -> Result<ModuleImport> {
        let module = parse_module(xml)?;
        let existing = match set_id {
            Some(id) => Some(self.registry.get::<ElementSet>(id).await?),
            None => None,
        };

        let mut element_ids = Vec::new();
        for data_element in module.materialized_elements() {
            let (input, kind) = element_input(data_element);
            let element = new_element(&self.settings, &input, kind)?;
            let mut work = self.registry.work();
            let pending = stage_element(&mut work, &element, &input.options)?;
            let id = self.registry.commit(work).await?.id_of(pending)?;
            tracing::debug!(
                element_id = id,
                module_element = %data_element.id,
                "Module element created"
            );
            element_ids.push(id);
        }

        let mut work = self.registry.work();
        let set_link = match existing {
            Some(mut set) => {
                apply_metadata(&mut set, &module);
                work.update(&set)?;
                Link::from(set.id)
            }
            None => {
                let mut set = ElementSet::default();
                apply_metadata(&mut set, &module);
                Link::from(work.add(&set)?)
            }
        };
        for element_id in &element_ids {
            work.add_linked(
                &ElementSetRef::new(0, *element_id),
                &[("element_set_id", set_link)],
            )?;
        }
        let outcome = self.registry.commit(work).await?;

        let set_id = match set_link {
            Link::Existing(id) => id,
            Link::Pending(pending) => outcome.id_of(pending)?,
        };
        let skipped_globals = module.global_count();
        tracing::info!(
            set_id,
            elements = element_ids.len(),
            skipped_globals,
            "Module imported"
        );
        Ok(ModuleImport {
            set_id,
            element_ids,
            skipped_globals,
        })
    }
}

fn apply_metadata(set: &mut ElementSet, module: &ModuleDescription) {
    set.name = module.name.clone();
    set.description = module.description.clone();
    set.contact_name = module.contact_name.clone();
}

/// Element input equivalent to a module data element.
fn element_input(data_element: &DataElement) -> (CreateUpdateElement, DataElementType) {
    let (value_min, value_max) = match &data_element.kind {
        DataElementKind::Integer { minimum, maximum } => {
            (minimum.map(|v| v as f64), maximum.map(|v| v as f64))
        }
        DataElementKind::Numeric { minimum, maximum } => (*minimum, *maximum),
        _ => (None, None),
    };
    let options = data_element
        .kind
        .choices()
        .iter()
        .map(|choice| ElementOption {
            value: choice.value.clone(),
            name: choice.label.clone(),
            ..Default::default()
        })
        .collect();

    let kind = data_element.element_type();
    let input = CreateUpdateElement {
        data_element_type: Some(kind.as_str().to_string()),
        label: data_element.label.clone(),
        short_name: Some(data_element.id.clone()),
        instructions: data_element.hint_text.clone(),
        value_min,
        value_max,
        options,
        ..Default::default()
    };
    (input, kind)
}

/// Module data element for a stored element, or `None` for value types modules cannot carry.
fn to_data_element(
    element: &Element,
    values: &[&ElementValue],
    used_ids: &mut HashSet<String>,
) -> Option<DataElement> {
    let kind = match element.value_type.as_str() {
        VALUE_TYPE_INTEGER => DataElementKind::Integer {
            minimum: element.value_min.map(|v| v.round() as i64),
            maximum: element.value_max.map(|v| v.round() as i64),
        },
        VALUE_TYPE_FLOAT => DataElementKind::Numeric {
            minimum: element.value_min,
            maximum: element.value_max,
        },
        VALUE_TYPE_VALUE_SET | VALUE_TYPE_MULTI_VALUE_SET if !values.is_empty() => {
            let choices = values
                .iter()
                .map(|v| Choice {
                    value: v.value.clone(),
                    label: v.name.clone(),
                })
                .collect();
            // rows from other registry tools may flag multi-choice through cardinality only
            if element.value_type == VALUE_TYPE_MULTI_VALUE_SET || element.max_cardinality > 1 {
                DataElementKind::MultiChoice { choices }
            } else {
                DataElementKind::Choice { choices }
            }
        }
        _ => return None,
    };

    let id = element
        .short_name
        .clone()
        .filter(|name| !used_ids.contains(name))
        .unwrap_or_else(|| format!("element-{}", element.id));
    used_ids.insert(id.clone());

    Some(DataElement {
        id,
        label: element.name.clone(),
        hint_text: element.instructions.clone(),
        kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(id: Id, value_type: &str, short_name: Option<&str>) -> Element {
        Element {
            id,
            name: format!("Element {id}"),
            short_name: short_name.map(str::to_string),
            value_type: value_type.into(),
            min_cardinality: 1,
            max_cardinality: 1,
            ..Default::default()
        }
    }

    fn value(element_id: Id, value: &str) -> ElementValue {
        ElementValue {
            element_id,
            value: value.into(),
            name: value.to_uppercase(),
            ..Default::default()
        }
    }

    #[test]
    fn hint_text_becomes_instructions() {
        let data_element = DataElement {
            id: "size".into(),
            label: "Size".into(),
            hint_text: Some("Longest axis".into()),
            kind: DataElementKind::Integer {
                minimum: Some(0),
                maximum: Some(30),
            },
        };
        let (input, kind) = element_input(&data_element);
        assert_eq!(kind, DataElementType::Integer);
        assert_eq!(input.short_name.as_deref(), Some("size"));
        assert_eq!(input.instructions.as_deref(), Some("Longest axis"));
        assert_eq!((input.value_min, input.value_max), (Some(0.0), Some(30.0)));
    }

    #[test]
    fn choice_labels_become_value_names() {
        let data_element = DataElement {
            id: "side".into(),
            label: "Side".into(),
            hint_text: None,
            kind: DataElementKind::MultiChoice {
                choices: vec![Choice {
                    value: "l".into(),
                    label: "Left".into(),
                }],
            },
        };
        let (input, _) = element_input(&data_element);
        assert_eq!(input.options[0].value, "l");
        assert_eq!(input.options[0].name, "Left");
    }

    #[test]
    fn value_sets_export_by_cardinality() {
        let mut used = HashSet::new();
        let a = value(1, "a");
        let single = to_data_element(&element(1, "valueSet", None), &[&a], &mut used).unwrap();
        assert_eq!(single.element_type(), DataElementType::Choice);

        let mut multi = element(2, "valueSet", None);
        multi.max_cardinality = 3;
        let multi = to_data_element(&multi, &[&a], &mut used).unwrap();
        assert_eq!(multi.element_type(), DataElementType::MultiChoice);
    }

    #[test]
    fn single_option_multi_value_sets_stay_multi_choice() {
        let mut used = HashSet::new();
        let a = value(1, "a");
        let exported =
            to_data_element(&element(1, "multiValueSet", None), &[&a], &mut used).unwrap();
        assert_eq!(exported.element_type(), DataElementType::MultiChoice);
    }

    #[test]
    fn unsupported_value_types_are_left_out() {
        let mut used = HashSet::new();
        assert!(to_data_element(&element(1, "string", None), &[], &mut used).is_none());
        assert!(to_data_element(&element(2, "valueSet", None), &[], &mut used).is_none());
    }

    #[test]
    fn duplicate_short_names_fall_back_to_element_ids() {
        let mut used = HashSet::new();
        let first = to_data_element(&element(1, "float", Some("dup")), &[], &mut used).unwrap();
        let second = to_data_element(&element(2, "float", Some("dup")), &[], &mut used).unwrap();
        let unnamed = to_data_element(&element(3, "integer", None), &[], &mut used).unwrap();
        assert_eq!(first.id, "dup");
        assert_eq!(second.id, "element-2");
        assert_eq!(unnamed.id, "element-3");
    }
}

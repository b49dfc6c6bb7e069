//! API representations and the explicit entity → DTO mappings

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::entities::{
    Element, ElementSet, ElementValue, Image, IndexCode, IndexCodeSystem, Organization, Person,
    Reference, Specialty,
};
use crate::db::Id;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSetDto {
    pub id: Id,
    pub name: String,
    pub description: Option<String>,
    pub contact_name: Option<String>,
    pub parent_id: Option<Id>,
    pub element_ids: Vec<Id>,
}

impl From<ElementSet> for ElementSetDto {
    fn from(set: ElementSet) -> Self {
        Self {
            id: set.id,
            name: set.name,
            description: set.description,
            contact_name: set.contact_name,
            parent_id: set.parent_id,
            element_ids: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementValueDto {
    pub id: Id,
    pub element_id: Id,
    pub value: String,
    pub name: String,
    pub definition: Option<String>,
    pub images: Option<String>,
}

impl From<ElementValue> for ElementValueDto {
    fn from(value: ElementValue) -> Self {
        Self {
            id: value.id,
            element_id: value.element_id,
            value: value.value,
            name: value.name,
            definition: value.definition,
            images: value.images,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementDto {
    pub id: Id,
    pub name: String,
    pub short_name: Option<String>,
    pub definition: Option<String>,
    pub value_type: String,
    pub value_min: Option<f64>,
    pub value_max: Option<f64>,
    pub step_value: Option<f64>,
    pub min_cardinality: i32,
    pub max_cardinality: i32,
    pub unit: Option<String>,
    pub question: Option<String>,
    pub instructions: Option<String>,
    pub references: Option<String>,
    pub version: Option<String>,
    pub version_date: Option<DateTime<Utc>>,
    pub synonyms: Option<String>,
    pub source: Option<String>,
    pub status: Option<String>,
    pub status_date: Option<DateTime<Utc>>,
    pub editor: Option<String>,
    pub modality: Option<String>,
    pub biological_sex: Option<String>,
    pub age_upper_bound: Option<i32>,
    pub age_lower_bound: Option<i32>,
    pub values: Vec<ElementValueDto>,
    pub set_ids: Vec<Id>,
}

impl From<Element> for ElementDto {
    fn from(element: Element) -> Self {
        Self {
            id: element.id,
            name: element.name,
            short_name: element.short_name,
            definition: element.definition,
            value_type: element.value_type,
            value_min: element.value_min,
            value_max: element.value_max,
            step_value: element.step_value,
            min_cardinality: element.min_cardinality,
            max_cardinality: element.max_cardinality,
            unit: element.unit,
            question: element.question,
            instructions: element.instructions,
            references: element.references,
            version: element.version,
            version_date: element.version_date,
            synonyms: element.synonyms,
            source: element.source,
            status: element.status,
            status_date: element.status_date,
            editor: element.editor,
            modality: element.modality,
            biological_sex: element.biological_sex,
            age_upper_bound: element.age_upper_bound,
            age_lower_bound: element.age_lower_bound,
            values: Vec::new(),
            set_ids: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationDto {
    pub id: Id,
    pub name: String,
    pub abbreviation: Option<String>,
    pub url: Option<String>,
    pub comment: Option<String>,
    pub email: Option<String>,
    pub twitter_handle: Option<String>,
    /// Roles held on the set or element the lookup was made for.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
}

impl From<Organization> for OrganizationDto {
    fn from(org: Organization) -> Self {
        Self {
            id: org.id,
            name: org.name,
            abbreviation: org.abbreviation,
            url: org.url,
            comment: org.comment,
            email: org.email,
            twitter_handle: org.twitter_handle,
            roles: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonDto {
    pub id: Id,
    pub name: String,
    pub orcid: Option<String>,
    pub url: Option<String>,
    pub twitter_handle: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
}

impl From<Person> for PersonDto {
    fn from(person: Person) -> Self {
        Self {
            id: person.id,
            name: person.name,
            orcid: person.orcid,
            url: person.url,
            twitter_handle: person.twitter_handle,
            roles: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexCodeSystemDto {
    pub id: Id,
    pub abbreviation: String,
    pub name: Option<String>,
    pub system_url: Option<String>,
}

impl From<IndexCodeSystem> for IndexCodeSystemDto {
    fn from(system: IndexCodeSystem) -> Self {
        Self {
            id: system.id,
            abbreviation: system.abbreviation,
            name: system.name,
            system_url: system.system_url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexCodeDto {
    pub id: Id,
    pub system: String,
    pub code: String,
    pub display: String,
    pub href: Option<String>,
    pub set_ids: Vec<Id>,
    pub element_ids: Vec<Id>,
    pub element_value_ids: Vec<Id>,
}

impl From<IndexCode> for IndexCodeDto {
    fn from(code: IndexCode) -> Self {
        Self {
            id: code.id,
            system: code.system,
            code: code.code,
            display: code.display,
            href: code.href,
            set_ids: Vec::new(),
            element_ids: Vec::new(),
            element_value_ids: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceDto {
    pub id: Id,
    pub citation: String,
    pub doi_uri: Option<String>,
    pub pubmed_id: Option<String>,
    pub url: Option<String>,
    pub element_ids: Vec<Id>,
    pub element_value_ids: Vec<Id>,
}

impl From<Reference> for ReferenceDto {
    fn from(reference: Reference) -> Self {
        Self {
            id: reference.id,
            citation: reference.citation,
            doi_uri: reference.doi_uri,
            pubmed_id: reference.pubmed_id,
            url: reference.url,
            element_ids: Vec::new(),
            element_value_ids: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDto {
    pub id: Id,
    pub caption: Option<String>,
    pub rights: Option<String>,
    pub source_url: String,
    pub local_url: Option<String>,
    pub element_ids: Vec<Id>,
    pub element_value_ids: Vec<Id>,
}

impl From<Image> for ImageDto {
    fn from(image: Image) -> Self {
        Self {
            id: image.id,
            caption: image.caption,
            rights: image.rights,
            source_url: image.source_url,
            local_url: image.local_url,
            element_ids: Vec::new(),
            element_value_ids: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialtyDto {
    pub id: Id,
    pub code: String,
    pub short_name: Option<String>,
    pub name: String,
    pub radlex_id: Option<String>,
}

impl From<Specialty> for SpecialtyDto {
    fn from(specialty: Specialty) -> Self {
        Self {
            id: specialty.id,
            code: specialty.code,
            short_name: specialty.short_name,
            name: specialty.name,
            radlex_id: specialty.radlex_id,
        }
    }
}

/// Rows removed by a set delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetDeletion {
    pub elements_removed: usize,
    pub values_removed: usize,
    /// Elements shared with another set, unlinked but kept.
    pub elements_unlinked: usize,
}

/// Outcome of a module import or update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleImport {
    pub set_id: Id,
    pub element_ids: Vec<Id>,
    pub skipped_globals: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn element_dto_keeps_mapped_fields() {
        let element = Element {
            id: 7,
            name: "Size".into(),
            value_type: "integer".into(),
            value_min: Some(0.0),
            value_max: Some(10.0),
            step_value: Some(1.0),
            min_cardinality: 1,
            max_cardinality: 1,
            ..Default::default()
        };
        let json = serde_json::to_value(ElementDto::from(element)).unwrap();
        assert_eq!(json["valueType"], "integer");
        assert_eq!(json["stepValue"], 1.0);
        assert_eq!(json["maxCardinality"], 1);
        assert_eq!(json["values"], json!([]));
    }

    #[test]
    fn roles_are_omitted_when_empty() {
        let dto = PersonDto::from(Person {
            id: 1,
            name: "Jane".into(),
            ..Default::default()
        });
        let json = serde_json::to_value(&dto).unwrap();
        assert!(json.get("roles").is_none());
        assert_eq!(json["twitterHandle"], serde_json::Value::Null);
    }
}

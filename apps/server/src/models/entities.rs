//! Row types, one per persisted table
//!
//! Field names are column names. `id` defaults to 0 on staged inserts; the store
//! assigns the real value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::{Id, Record, Table};

macro_rules! record {
    ($ty:ident, $table:expr) => {
        impl Record for $ty {
            const TABLE: Table = $table;
            const ENTITY: &'static str = stringify!($ty);

            fn id(&self) -> Id {
                self.id
            }
        }
    };
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementSet {
    #[serde(default)]
    pub id: Id,
    pub name: String,
    pub description: Option<String>,
    pub contact_name: Option<String>,
    pub parent_id: Option<Id>,
}
record!(ElementSet, Table::ElementSet);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(default)]
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
}
record!(Element, Table::Element);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementValue {
    #[serde(default)]
    pub id: Id,
    pub element_id: Id,
    pub value: String,
    pub name: String,
    pub definition: Option<String>,
    pub images: Option<String>,
}
record!(ElementValue, Table::ElementValue);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementSetRef {
    #[serde(default)]
    pub id: Id,
    pub element_set_id: Id,
    pub element_id: Id,
}
record!(ElementSetRef, Table::ElementSetRef);

impl ElementSetRef {
    pub fn new(element_set_id: Id, element_id: Id) -> Self {
        Self {
            id: 0,
            element_set_id,
            element_id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    #[serde(default)]
    pub id: Id,
    pub name: String,
    pub abbreviation: Option<String>,
    pub url: Option<String>,
    pub comment: Option<String>,
    pub email: Option<String>,
    pub twitter_handle: Option<String>,
}
record!(Organization, Table::Organization);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationRoleElementRef {
    #[serde(default)]
    pub id: Id,
    pub organization_id: Id,
    pub element_id: Id,
    pub role: String,
}
record!(OrganizationRoleElementRef, Table::OrganizationRoleElementRef);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationRoleElementSetRef {
    #[serde(default)]
    pub id: Id,
    pub organization_id: Id,
    pub element_set_id: Id,
    pub role: String,
}
record!(
    OrganizationRoleElementSetRef,
    Table::OrganizationRoleElementSetRef
);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Person {
    #[serde(default)]
    pub id: Id,
    pub name: String,
    pub orcid: Option<String>,
    pub url: Option<String>,
    pub twitter_handle: Option<String>,
}
record!(Person, Table::Person);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRoleElementRef {
    #[serde(default)]
    pub id: Id,
    pub person_id: Id,
    pub element_id: Id,
    pub role: String,
}
record!(PersonRoleElementRef, Table::PersonRoleElementRef);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRoleElementSetRef {
    #[serde(default)]
    pub id: Id,
    pub person_id: Id,
    pub element_set_id: Id,
    pub role: String,
}
record!(PersonRoleElementSetRef, Table::PersonRoleElementSetRef);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexCodeSystem {
    #[serde(default)]
    pub id: Id,
    pub abbreviation: String,
    pub name: Option<String>,
    pub system_url: Option<String>,
}
record!(IndexCodeSystem, Table::IndexCodeSystem);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexCode {
    #[serde(default)]
    pub id: Id,
    pub system: String,
    pub code: String,
    pub display: String,
    pub href: Option<String>,
}
record!(IndexCode, Table::IndexCode);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexCodeElementRef {
    #[serde(default)]
    pub id: Id,
    pub code_id: Id,
    pub element_id: Id,
}
record!(IndexCodeElementRef, Table::IndexCodeElementRef);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexCodeElementSetRef {
    #[serde(default)]
    pub id: Id,
    pub code_id: Id,
    pub element_set_id: Id,
}
record!(IndexCodeElementSetRef, Table::IndexCodeElementSetRef);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexCodeElementValueRef {
    #[serde(default)]
    pub id: Id,
    pub code_id: Id,
    pub element_value_id: Id,
}
record!(IndexCodeElementValueRef, Table::IndexCodeElementValueRef);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(default)]
    pub id: Id,
    pub citation: String,
    pub doi_uri: Option<String>,
    pub pubmed_id: Option<String>,
    pub url: Option<String>,
}
record!(Reference, Table::Reference);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceElementRef {
    #[serde(default)]
    pub id: Id,
    pub reference_id: Id,
    pub element_id: Id,
}
record!(ReferenceElementRef, Table::ReferenceElementRef);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceElementValueRef {
    #[serde(default)]
    pub id: Id,
    pub reference_id: Id,
    pub element_value_id: Id,
}
record!(ReferenceElementValueRef, Table::ReferenceElementValueRef);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    #[serde(default)]
    pub id: Id,
    pub caption: Option<String>,
    pub rights: Option<String>,
    pub source_url: String,
    pub local_url: Option<String>,
}
record!(Image, Table::Image);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageElementRef {
    #[serde(default)]
    pub id: Id,
    pub image_id: Id,
    pub element_id: Id,
}
record!(ImageElementRef, Table::ImageElementRef);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageElementValueRef {
    #[serde(default)]
    pub id: Id,
    pub image_id: Id,
    pub element_value_id: Id,
}
record!(ImageElementValueRef, Table::ImageElementValueRef);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specialty {
    #[serde(default)]
    pub id: Id,
    pub code: String,
    pub short_name: Option<String>,
    pub name: String,
    pub radlex_id: Option<String>,
    pub deleted_at: Option<DateTime<Utc>>,
}
record!(Specialty, Table::Specialty);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialtyElementRef {
    #[serde(default)]
    pub id: Id,
    pub specialty_id: Id,
    pub element_id: Id,
}
record!(SpecialtyElementRef, Table::SpecialtyElementRef);

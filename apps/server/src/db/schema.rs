//! Persisted tables and their column contracts
//!
//! Every table has an integer `id` primary key. Column lists exclude `id`; rows are
//! exchanged with the store as JSON objects keyed by these column names.

use std::fmt;

/// Primary key type shared by every table.
pub type Id = i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    ElementSet,
    Element,
    ElementValue,
    ElementSetRef,
    Organization,
    OrganizationRoleElementRef,
    OrganizationRoleElementSetRef,
    Person,
    PersonRoleElementRef,
    PersonRoleElementSetRef,
    IndexCodeSystem,
    IndexCode,
    IndexCodeElementRef,
    IndexCodeElementSetRef,
    IndexCodeElementValueRef,
    Reference,
    ReferenceElementRef,
    ReferenceElementValueRef,
    Image,
    ImageElementRef,
    ImageElementValueRef,
    Specialty,
    SpecialtyElementRef,
    CodeSystem,
    Code,
    CodeRef,
}

/// `column` holds the id of a row in `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub column: &'static str,
    pub target: Table,
}

const fn fk(column: &'static str, target: Table) -> ForeignKey {
    ForeignKey { column, target }
}

impl Table {
    pub const ALL: [Table; 26] = [
        Table::ElementSet,
        Table::Element,
        Table::ElementValue,
        Table::ElementSetRef,
        Table::Organization,
        Table::OrganizationRoleElementRef,
        Table::OrganizationRoleElementSetRef,
        Table::Person,
        Table::PersonRoleElementRef,
        Table::PersonRoleElementSetRef,
        Table::IndexCodeSystem,
        Table::IndexCode,
        Table::IndexCodeElementRef,
        Table::IndexCodeElementSetRef,
        Table::IndexCodeElementValueRef,
        Table::Reference,
        Table::ReferenceElementRef,
        Table::ReferenceElementValueRef,
        Table::Image,
        Table::ImageElementRef,
        Table::ImageElementValueRef,
        Table::Specialty,
        Table::SpecialtyElementRef,
        Table::CodeSystem,
        Table::Code,
        Table::CodeRef,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Table::ElementSet => "element_set",
            Table::Element => "element",
            Table::ElementValue => "element_value",
            Table::ElementSetRef => "element_set_ref",
            Table::Organization => "organization",
            Table::OrganizationRoleElementRef => "organization_role_element_ref",
            Table::OrganizationRoleElementSetRef => "organization_role_element_set_ref",
            Table::Person => "person",
            Table::PersonRoleElementRef => "person_role_element_ref",
            Table::PersonRoleElementSetRef => "person_role_element_set_ref",
            Table::IndexCodeSystem => "index_code_system",
            Table::IndexCode => "index_code",
            Table::IndexCodeElementRef => "index_code_element_ref",
            Table::IndexCodeElementSetRef => "index_code_element_set_ref",
            Table::IndexCodeElementValueRef => "index_code_element_value_ref",
            Table::Reference => "reference",
            Table::ReferenceElementRef => "reference_element_ref",
            Table::ReferenceElementValueRef => "reference_element_value_ref",
            Table::Image => "image",
            Table::ImageElementRef => "image_element_ref",
            Table::ImageElementValueRef => "image_element_value_ref",
            Table::Specialty => "specialty",
            Table::SpecialtyElementRef => "specialty_element_ref",
            Table::CodeSystem => "code_system",
            Table::Code => "code",
            Table::CodeRef => "code_ref",
        }
    }

    /// Columns other than `id`, in schema order.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Table::ElementSet => &["name", "description", "contact_name", "parent_id"],
            Table::Element => &[
                "name",
                "short_name",
                "definition",
                "value_type",
                "value_min",
                "value_max",
                "step_value",
                "min_cardinality",
                "max_cardinality",
                "unit",
                "question",
                "instructions",
                "references",
                "version",
                "version_date",
                "synonyms",
                "source",
                "status",
                "status_date",
                "editor",
                "modality",
                "biological_sex",
                "age_upper_bound",
                "age_lower_bound",
            ],
            Table::ElementValue => &["element_id", "value", "name", "definition", "images"],
            Table::ElementSetRef => &["element_set_id", "element_id"],
            Table::Organization => &[
                "name",
                "abbreviation",
                "url",
                "comment",
                "email",
                "twitter_handle",
            ],
            Table::OrganizationRoleElementRef => &["organization_id", "element_id", "role"],
            Table::OrganizationRoleElementSetRef => {
                &["organization_id", "element_set_id", "role"]
            }
            Table::Person => &["name", "orcid", "url", "twitter_handle"],
            Table::PersonRoleElementRef => &["person_id", "element_id", "role"],
            Table::PersonRoleElementSetRef => &["person_id", "element_set_id", "role"],
            Table::IndexCodeSystem => &["abbreviation", "name", "system_url"],
            Table::IndexCode => &["system", "code", "display", "href"],
            Table::IndexCodeElementRef => &["code_id", "element_id"],
            Table::IndexCodeElementSetRef => &["code_id", "element_set_id"],
            Table::IndexCodeElementValueRef => &["code_id", "element_value_id"],
            Table::Reference => &["citation", "doi_uri", "pubmed_id", "url"],
            Table::ReferenceElementRef => &["reference_id", "element_id"],
            Table::ReferenceElementValueRef => &["reference_id", "element_value_id"],
            Table::Image => &["caption", "rights", "source_url", "local_url"],
            Table::ImageElementRef => &["image_id", "element_id"],
            Table::ImageElementValueRef => &["image_id", "element_value_id"],
            Table::Specialty => &["code", "short_name", "name", "radlex_id", "deleted_at"],
            Table::SpecialtyElementRef => &["specialty_id", "element_id"],
            Table::CodeSystem => &["abbreviation", "name", "system_url"],
            Table::Code => &["system", "code", "display", "url"],
            Table::CodeRef => &["code_id", "element_id", "element_set_id", "element_value_id"],
        }
    }

    /// Text columns matched by keyword search. Empty for tables that are not searchable.
    pub fn searchable(&self) -> &'static [&'static str] {
        match self {
            Table::ElementSet => &["name", "description", "contact_name"],
            Table::Element => &[
                "name",
                "short_name",
                "definition",
                "editor",
                "instructions",
                "question",
                "references",
                "synonyms",
                "source",
            ],
            Table::Organization => &[
                "name",
                "abbreviation",
                "url",
                "comment",
                "email",
                "twitter_handle",
            ],
            Table::Person => &["name", "orcid", "url", "twitter_handle"],
            Table::IndexCode => &["system", "code", "display"],
            Table::Reference => &["citation", "doi_uri", "url"],
            Table::Image => &["caption", "source_url", "local_url", "rights"],
            Table::Specialty => &["code", "short_name", "name"],
            _ => &[],
        }
    }

    pub fn foreign_keys(&self) -> &'static [ForeignKey] {
        const ELEMENT_SET: &[ForeignKey] = &[fk("parent_id", Table::ElementSet)];
        const ELEMENT_VALUE: &[ForeignKey] = &[fk("element_id", Table::Element)];
        const ELEMENT_SET_REF: &[ForeignKey] = &[
            fk("element_set_id", Table::ElementSet),
            fk("element_id", Table::Element),
        ];
        const ORG_ELEMENT: &[ForeignKey] = &[
            fk("organization_id", Table::Organization),
            fk("element_id", Table::Element),
        ];
        const ORG_SET: &[ForeignKey] = &[
            fk("organization_id", Table::Organization),
            fk("element_set_id", Table::ElementSet),
        ];
        const PERSON_ELEMENT: &[ForeignKey] = &[
            fk("person_id", Table::Person),
            fk("element_id", Table::Element),
        ];
        const PERSON_SET: &[ForeignKey] = &[
            fk("person_id", Table::Person),
            fk("element_set_id", Table::ElementSet),
        ];
        const CODE_ELEMENT: &[ForeignKey] = &[
            fk("code_id", Table::IndexCode),
            fk("element_id", Table::Element),
        ];
        const CODE_SET: &[ForeignKey] = &[
            fk("code_id", Table::IndexCode),
            fk("element_set_id", Table::ElementSet),
        ];
        const CODE_VALUE: &[ForeignKey] = &[
            fk("code_id", Table::IndexCode),
            fk("element_value_id", Table::ElementValue),
        ];
        const REFERENCE_ELEMENT: &[ForeignKey] = &[
            fk("reference_id", Table::Reference),
            fk("element_id", Table::Element),
        ];
        const REFERENCE_VALUE: &[ForeignKey] = &[
            fk("reference_id", Table::Reference),
            fk("element_value_id", Table::ElementValue),
        ];
        const IMAGE_ELEMENT: &[ForeignKey] = &[
            fk("image_id", Table::Image),
            fk("element_id", Table::Element),
        ];
        const IMAGE_VALUE: &[ForeignKey] = &[
            fk("image_id", Table::Image),
            fk("element_value_id", Table::ElementValue),
        ];
        const SPECIALTY_ELEMENT: &[ForeignKey] = &[
            fk("specialty_id", Table::Specialty),
            fk("element_id", Table::Element),
        ];
        const CODE_REF: &[ForeignKey] = &[
            fk("code_id", Table::Code),
            fk("element_id", Table::Element),
            fk("element_set_id", Table::ElementSet),
            fk("element_value_id", Table::ElementValue),
        ];

        match self {
            Table::ElementSet => ELEMENT_SET,
            Table::ElementValue => ELEMENT_VALUE,
            Table::ElementSetRef => ELEMENT_SET_REF,
            Table::OrganizationRoleElementRef => ORG_ELEMENT,
            Table::OrganizationRoleElementSetRef => ORG_SET,
            Table::PersonRoleElementRef => PERSON_ELEMENT,
            Table::PersonRoleElementSetRef => PERSON_SET,
            Table::IndexCodeElementRef => CODE_ELEMENT,
            Table::IndexCodeElementSetRef => CODE_SET,
            Table::IndexCodeElementValueRef => CODE_VALUE,
            Table::ReferenceElementRef => REFERENCE_ELEMENT,
            Table::ReferenceElementValueRef => REFERENCE_VALUE,
            Table::ImageElementRef => IMAGE_ELEMENT,
            Table::ImageElementValueRef => IMAGE_VALUE,
            Table::SpecialtyElementRef => SPECIALTY_ELEMENT,
            Table::CodeRef => CODE_REF,
            _ => &[],
        }
    }

    /// Column marking soft-deleted rows; such rows are invisible to every read.
    pub fn soft_delete_column(&self) -> Option<&'static str> {
        match self {
            Table::Specialty => Some("deleted_at"),
            _ => None,
        }
    }

    pub fn has_column(&self, column: &str) -> bool {
        column == "id" || self.columns().contains(&column)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

//! Create/update request bodies and their validation
//!
//! Every input is checked in full before a service touches storage; all field
//! messages are reported together.

use cde_module::DataElementType;
use serde::Deserialize;
use std::collections::HashSet;
use std::str::FromStr;
use validator::{Validate, ValidateEmail, ValidateUrl, ValidationError};

use crate::db::Id;
use crate::error::{FieldErrors, Result};

const REQUIRED: &str = "is required";

fn require(fields: &mut FieldErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        fields.add(field, REQUIRED);
    }
}

fn derived(input: &impl Validate) -> FieldErrors {
    match input.validate() {
        Ok(()) => FieldErrors::default(),
        Err(errors) => errors.into(),
    }
}

/// Trimmed copy of an optional text field; blank becomes `None`.
pub fn clean(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Blank values are cleared on save, so only non-blank ones must parse.
fn blank_or_url(value: &str) -> std::result::Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() || value.validate_url() {
        Ok(())
    } else {
        Err(ValidationError::new("url"))
    }
}

fn blank_or_email(value: &str) -> std::result::Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() || value.validate_email() {
        Ok(())
    } else {
        Err(ValidationError::new("email"))
    }
}

fn dedup(ids: &[Id]) -> Vec<Id> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateUpdateSet {
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub module_name: String,
    pub description: Option<String>,
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub contact_name: Option<String>,
    pub parent_id: Option<Id>,
}

impl CreateUpdateSet {
    pub fn check(&self) -> Result<()> {
        let mut fields = derived(self);
        require(&mut fields, "moduleName", &self.module_name);
        fields.into_result()
    }
}

/// One permissible answer of a choice element.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementOption {
    pub value: String,
    pub name: String,
    pub definition: Option<String>,
    pub images: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateUpdateElement {
    /// integer, numeric, choice, multiChoice or global
    pub data_element_type: Option<String>,
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub label: String,
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub short_name: Option<String>,
    pub definition: Option<String>,
    pub question: Option<String>,
    pub instructions: Option<String>,
    pub references: Option<String>,
    pub synonyms: Option<String>,
    pub source: Option<String>,
    pub editor: Option<String>,
    #[validate(length(max = 50, message = "must be at most 50 characters"))]
    pub unit: Option<String>,
    pub modality: Option<String>,
    pub biological_sex: Option<String>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub age_lower_bound: Option<i32>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub age_upper_bound: Option<i32>,
    pub value_min: Option<f64>,
    pub value_max: Option<f64>,
    pub options: Vec<ElementOption>,
}

const BIOLOGICAL_SEXES: [&str; 3] = ["male", "female", "both"];

impl CreateUpdateElement {
    /// Validate and return the element type the row is derived from.
    pub fn check(&self) -> Result<DataElementType> {
        let mut fields = derived(self);
        require(&mut fields, "label", &self.label);

        let kind = match self.data_element_type.as_deref().map(DataElementType::from_str) {
            None => {
                fields.add("dataElementType", REQUIRED);
                None
            }
            Some(Err(message)) => {
                fields.add("dataElementType", message);
                None
            }
            Some(Ok(DataElementType::Global)) => {
                fields.add(
                    "dataElementType",
                    "global values belong to modules and are not stored as elements",
                );
                None
            }
            Some(Ok(kind)) => Some(kind),
        };

        if let Some(sex) = clean(&self.biological_sex) {
            if !BIOLOGICAL_SEXES.iter().any(|s| s.eq_ignore_ascii_case(&sex)) {
                fields.add("biologicalSex", "must be one of male, female, both");
            }
        }

        if let (Some(lower), Some(upper)) = (self.age_lower_bound, self.age_upper_bound) {
            if lower > upper {
                fields.add("ageLowerBound", "must not exceed ageUpperBound");
            }
        }

        if let Some(kind) = kind {
            self.check_bounds(kind, &mut fields);
            self.check_options(kind, &mut fields);
        }

        fields.into_result()?;
        kind.ok_or_else(|| crate::Error::Internal("element type missing after validation".into()))
    }

    fn check_bounds(&self, kind: DataElementType, fields: &mut FieldErrors) {
        let bounds = [("valueMin", self.value_min), ("valueMax", self.value_max)];

        if !kind.has_bounds() {
            for (field, value) in bounds {
                if value.is_some() {
                    fields.add(field, format!("{kind} elements do not take bounds"));
                }
            }
            return;
        }

        for (field, value) in bounds {
            match value {
                Some(v) if !v.is_finite() => fields.add(field, "must be a finite number"),
                Some(v) if kind == DataElementType::Integer && v.fract() != 0.0 => {
                    fields.add(field, "must be a whole number for integer elements")
                }
                _ => {}
            }
        }

        if let (Some(min), Some(max)) = (self.value_min, self.value_max) {
            if min > max {
                fields.add("valueMin", "must not exceed valueMax");
            }
        }
    }

    fn check_options(&self, kind: DataElementType, fields: &mut FieldErrors) {
        if !kind.has_options() {
            if !self.options.is_empty() {
                fields.add("options", format!("{kind} elements do not take options"));
            }
            return;
        }

        if self.options.is_empty() {
            fields.add("options", format!("{kind} elements need at least one option"));
            return;
        }

        let mut values = HashSet::new();
        for (i, option) in self.options.iter().enumerate() {
            require(fields, &format!("options[{i}].value"), &option.value);
            require(fields, &format!("options[{i}].name"), &option.name);
            if !values.insert(option.value.trim()) {
                fields.add(
                    &format!("options[{i}].value"),
                    format!("duplicate option value '{}'", option.value.trim()),
                );
            }
        }
    }
}

/// Targets a person or organization is linked to, with the roles held on each.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleLinks<R> {
    pub set_id: Option<Id>,
    pub element_ids: Vec<Id>,
    pub roles: Vec<R>,
}

impl<R> RoleLinks<R> {
    pub fn is_empty(&self) -> bool {
        self.set_id.is_none() && self.element_ids.is_empty()
    }
}

fn role_links<R>(
    set_id: Option<Id>,
    element_ids: &[Id],
    roles: &[String],
    fields: &mut FieldErrors,
) -> RoleLinks<R>
where
    R: FromStr<Err = String> + PartialEq,
{
    let mut parsed: Vec<R> = Vec::new();
    for role in roles {
        match role.parse::<R>() {
            Ok(role) if !parsed.contains(&role) => parsed.push(role),
            Ok(_) => {}
            Err(message) => fields.add("roles", message),
        }
    }

    let has_targets = set_id.is_some() || !element_ids.is_empty();
    if has_targets && roles.is_empty() {
        fields.add("roles", "at least one role is required when linking to a set or elements");
    }
    if !has_targets && !roles.is_empty() {
        fields.add("roles", "roles need a setId or elementIds to apply to");
    }

    RoleLinks {
        set_id,
        element_ids: dedup(element_ids),
        roles: parsed,
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateUpdateOrganization {
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub name: String,
    #[validate(length(max = 50, message = "must be at most 50 characters"))]
    pub abbreviation: Option<String>,
    #[validate(custom(function = "blank_or_url", message = "must be a valid URL"))]
    pub url: Option<String>,
    pub comment: Option<String>,
    #[validate(custom(function = "blank_or_email", message = "must be a valid email address"))]
    pub email: Option<String>,
    pub twitter_handle: Option<String>,
    pub set_id: Option<Id>,
    pub element_ids: Vec<Id>,
    pub roles: Vec<String>,
}

impl CreateUpdateOrganization {
    pub fn check(&self) -> Result<RoleLinks<crate::models::OrganizationRole>> {
        let mut fields = derived(self);
        require(&mut fields, "name", &self.name);
        let links = role_links(self.set_id, &self.element_ids, &self.roles, &mut fields);
        fields.into_result()?;
        Ok(links)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateUpdatePerson {
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub name: String,
    #[validate(length(max = 50, message = "must be at most 50 characters"))]
    pub orcid: Option<String>,
    #[validate(custom(function = "blank_or_url", message = "must be a valid URL"))]
    pub url: Option<String>,
    pub twitter_handle: Option<String>,
    pub set_id: Option<Id>,
    pub element_ids: Vec<Id>,
    pub roles: Vec<String>,
}

impl CreateUpdatePerson {
    pub fn check(&self) -> Result<RoleLinks<crate::models::PersonRole>> {
        let mut fields = derived(self);
        require(&mut fields, "name", &self.name);
        let links = role_links(self.set_id, &self.element_ids, &self.roles, &mut fields);
        fields.into_result()?;
        Ok(links)
    }
}

/// Sets, elements and element values an index code, reference or image points at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetLinks {
    pub set_id: Option<Id>,
    pub element_ids: Vec<Id>,
    pub element_value_ids: Vec<Id>,
}

impl TargetLinks {
    pub fn is_empty(&self) -> bool {
        self.set_id.is_none() && self.element_ids.is_empty() && self.element_value_ids.is_empty()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateUpdateIndexCode {
    pub system: String,
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub code: String,
    pub display: String,
    #[validate(custom(function = "blank_or_url", message = "must be a valid URL"))]
    pub href: Option<String>,
    pub set_id: Option<Id>,
    pub element_ids: Vec<Id>,
    pub element_value_ids: Vec<Id>,
}

impl CreateUpdateIndexCode {
    pub fn check(&self) -> Result<TargetLinks> {
        let mut fields = derived(self);
        require(&mut fields, "system", &self.system);
        require(&mut fields, "code", &self.code);
        require(&mut fields, "display", &self.display);
        fields.into_result()?;
        Ok(TargetLinks {
            set_id: self.set_id,
            element_ids: dedup(&self.element_ids),
            element_value_ids: dedup(&self.element_value_ids),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateUpdateReference {
    pub citation: String,
    pub doi_uri: Option<String>,
    #[validate(length(max = 20, message = "must be at most 20 characters"))]
    pub pubmed_id: Option<String>,
    #[validate(custom(function = "blank_or_url", message = "must be a valid URL"))]
    pub url: Option<String>,
    pub element_ids: Vec<Id>,
    pub element_value_ids: Vec<Id>,
}

impl CreateUpdateReference {
    pub fn check(&self) -> Result<TargetLinks> {
        let mut fields = derived(self);
        require(&mut fields, "citation", &self.citation);
        if let Some(pubmed) = clean(&self.pubmed_id) {
            if !pubmed.bytes().all(|b| b.is_ascii_digit()) {
                fields.add("pubmedId", "must be numeric");
            }
        }
        fields.into_result()?;
        Ok(TargetLinks {
            set_id: None,
            element_ids: dedup(&self.element_ids),
            element_value_ids: dedup(&self.element_value_ids),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateUpdateImage {
    #[validate(url(message = "must be a valid URL"))]
    pub source_url: String,
    #[validate(custom(function = "blank_or_url", message = "must be a valid URL"))]
    pub local_url: Option<String>,
    pub caption: Option<String>,
    pub rights: Option<String>,
    pub element_ids: Vec<Id>,
    pub element_value_ids: Vec<Id>,
}

impl CreateUpdateImage {
    pub fn check(&self) -> Result<TargetLinks> {
        // a blank source URL would also fail the url rule; report it as missing only
        let fields = if self.source_url.trim().is_empty() {
            let mut fields = FieldErrors::default();
            fields.add("sourceUrl", REQUIRED);
            fields
        } else {
            derived(self)
        };
        fields.into_result()?;
        Ok(TargetLinks {
            set_id: None,
            element_ids: dedup(&self.element_ids),
            element_value_ids: dedup(&self.element_value_ids),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OrganizationRole, PersonRole};
    use crate::Error;

    fn fields_of(result: Result<impl std::fmt::Debug>) -> FieldErrors {
        match result {
            Err(Error::Validation(fields)) => fields,
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    fn element(kind: &str) -> CreateUpdateElement {
        CreateUpdateElement {
            data_element_type: Some(kind.into()),
            label: "Nodule size".into(),
            ..Default::default()
        }
    }

    fn option(value: &str) -> ElementOption {
        ElementOption {
            value: value.into(),
            name: value.to_uppercase(),
            ..Default::default()
        }
    }

    #[test]
    fn blank_optional_links_pass_and_bad_ones_fail() {
        let blank = CreateUpdateOrganization {
            name: "ACR".into(),
            url: Some(String::new()),
            email: Some(" ".into()),
            ..Default::default()
        };
        assert!(blank.check().is_ok());

        let bad = CreateUpdateOrganization {
            name: "ACR".into(),
            url: Some("acr dot org".into()),
            email: Some("info-at-acr".into()),
            ..Default::default()
        };
        let fields = fields_of(bad.check());
        assert_eq!(fields.get("url").unwrap(), ["must be a valid URL"]);
        assert_eq!(
            fields.get("email").unwrap(),
            ["must be a valid email address"]
        );
    }

    #[test]
    fn set_requires_module_name() {
        let fields = fields_of(CreateUpdateSet::default().check());
        assert_eq!(fields.get("moduleName").unwrap(), ["is required"]);
    }

    #[test]
    fn element_reports_every_invalid_field() {
        let input = CreateUpdateElement {
            data_element_type: Some("integer".into()),
            label: " ".into(),
            value_min: Some(5.0),
            value_max: Some(1.5),
            age_lower_bound: Some(-1),
            biological_sex: Some("other".into()),
            ..Default::default()
        };
        let fields = fields_of(input.check());
        assert!(fields.get("label").is_some());
        assert!(fields.get("valueMin").is_some());
        assert!(fields.get("valueMax").is_some());
        assert!(fields.get("ageLowerBound").is_some());
        assert!(fields.get("biologicalSex").is_some());
    }

    #[test]
    fn element_type_is_required_and_global_is_rejected() {
        let mut input = element("integer");
        input.data_element_type = None;
        assert!(fields_of(input.check()).get("dataElementType").is_some());
        assert!(fields_of(element("global").check())
            .get("dataElementType")
            .is_some());
        assert!(fields_of(element("date").check())
            .get("dataElementType")
            .is_some());
    }

    #[test]
    fn options_only_for_choice_types() {
        let mut numeric = element("numeric");
        numeric.options = vec![option("a")];
        assert!(fields_of(numeric.check()).get("options").is_some());

        assert!(fields_of(element("choice").check()).get("options").is_some());

        let mut choice = element("multiChoice");
        choice.options = vec![option("a"), option("a")];
        assert!(fields_of(choice.check()).get("options[1].value").is_some());

        choice.options = vec![option("a"), option("b")];
        assert_eq!(choice.check().unwrap(), DataElementType::MultiChoice);
    }

    #[test]
    fn roles_require_targets_and_known_values() {
        let input = CreatePersonFixture::with(&["author"], None, &[]);
        assert!(fields_of(input.check()).get("roles").is_some());

        let input = CreatePersonFixture::with(&[], Some(1), &[]);
        assert!(fields_of(input.check()).get("roles").is_some());

        let input = CreatePersonFixture::with(&["sponsor"], Some(1), &[]);
        let fields = fields_of(input.check());
        assert!(fields.get("roles").unwrap()[0].contains("sponsor"));

        let input = CreatePersonFixture::with(&["Author", "author", "EDITOR"], None, &[3, 3]);
        let links = input.check().unwrap();
        assert_eq!(links.roles, vec![PersonRole::Author, PersonRole::Editor]);
        assert_eq!(links.element_ids, vec![3]);
    }

    #[test]
    fn organization_checks_email_and_url() {
        let input = CreateUpdateOrganization {
            name: "ACR".into(),
            email: Some("not-an-email".into()),
            url: Some("nope".into()),
            ..Default::default()
        };
        let fields = fields_of(input.check());
        assert!(fields.get("email").is_some());
        assert!(fields.get("url").is_some());

        let input = CreateUpdateOrganization {
            name: "ACR".into(),
            email: Some("info@acr.org".into()),
            set_id: Some(2),
            roles: vec!["Sponsor".into()],
            ..Default::default()
        };
        assert_eq!(input.check().unwrap().roles, vec![OrganizationRole::Sponsor]);
    }

    #[test]
    fn image_without_source_url_is_reported_once() {
        let fields = fields_of(CreateUpdateImage::default().check());
        assert_eq!(fields.get("sourceUrl").unwrap(), ["is required"]);
    }

    struct CreatePersonFixture;

    impl CreatePersonFixture {
        fn with(roles: &[&str], set_id: Option<Id>, element_ids: &[Id]) -> CreateUpdatePerson {
            CreateUpdatePerson {
                name: "Jane Roe".into(),
                set_id,
                element_ids: element_ids.to_vec(),
                roles: roles.iter().map(|r| r.to_string()).collect(),
                ..Default::default()
            }
        }
    }
}

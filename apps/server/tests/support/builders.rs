use axum::body::Bytes;
use serde_json::{json, Value};

/// Converts a JSON value to request body bytes
pub fn to_json_body(value: &Value) -> anyhow::Result<Bytes> {
    Ok(Bytes::from(serde_json::to_vec(value)?))
}

pub fn set_body(name: &str) -> Value {
    json!({ "moduleName": name, "description": format!("{name} findings") })
}

pub fn integer_element(label: &str, min: i64, max: i64) -> Value {
    json!({
        "dataElementType": "integer",
        "label": label,
        "valueMin": min,
        "valueMax": max,
    })
}

pub fn numeric_element(label: &str) -> Value {
    json!({ "dataElementType": "numeric", "label": label })
}

/// Choice element whose option names are the upper-cased values.
pub fn choice_element(label: &str, values: &[&str]) -> Value {
    json!({
        "dataElementType": "choice",
        "label": label,
        "options": options(values),
    })
}

pub fn options(values: &[&str]) -> Value {
    values
        .iter()
        .map(|v| json!({ "value": v, "name": v.to_uppercase() }))
        .collect()
}

/// Builder for person and organization bodies
pub struct ContributorBuilder {
    body: Value,
}

impl ContributorBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            body: json!({ "name": name }),
        }
    }

    pub fn field(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.body[field] = value.into();
        self
    }

    pub fn set(self, set_id: i64) -> Self {
        self.field("setId", set_id)
    }

    pub fn elements(self, element_ids: &[i64]) -> Self {
        self.field("elementIds", json!(element_ids))
    }

    pub fn roles(self, roles: &[&str]) -> Self {
        self.field("roles", json!(roles))
    }

    pub fn build(self) -> Value {
        self.body
    }
}

pub const LUNG_NODULE_MODULE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ReportingModule id="lung-nodule">
  <Metadata>
    <Label>Lung Nodule</Label>
    <Info>
      <Description>Incidental pulmonary nodule</Description>
      <Contact><Name>Thoracic Panel</Name></Contact>
    </Info>
  </Metadata>
  <DataElements>
    <IntegerDataElement Id="nodule_count">
      <Label>Number of nodules</Label>
      <HintText>Solid nodules only</HintText>
      <Minimum>0</Minimum>
      <Maximum>10</Maximum>
    </IntegerDataElement>
    <ChoiceDataElement Id="composition">
      <Label>Composition</Label>
      <ChoiceInfo>
        <Choice><Value>solid</Value><Label>Solid</Label></Choice>
        <Choice><Value>ground_glass</Value><Label>Ground glass</Label></Choice>
      </ChoiceInfo>
    </ChoiceDataElement>
    <GlobalValue Id="follow_up">
      <Label>Follow-up</Label>
      <Value>12 months</Value>
    </GlobalValue>
  </DataElements>
</ReportingModule>"#;

pub const INTEGER_AND_GLOBAL_MODULE: &str = r#"<ReportingModule>
  <Metadata><Label>Adrenal</Label></Metadata>
  <DataElements>
    <IntegerDataElement Id="size">
      <Label>Size</Label>
    </IntegerDataElement>
    <GlobalValue Id="version">
      <Label>Version</Label>
      <Value>2</Value>
    </GlobalValue>
  </DataElements>
</ReportingModule>"#;

//! Typed module-description graph

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A parsed reporting module: set-level metadata plus its data elements in document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDescription {
    /// Identifier from the `id` attribute of the root element, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub data_elements: Vec<DataElement>,
}

impl ModuleDescription {
    /// Data elements that materialize as registry elements (everything except globals).
    pub fn materialized_elements(&self) -> impl Iterator<Item = &DataElement> {
        self.data_elements
            .iter()
            .filter(|e| e.element_type() != DataElementType::Global)
    }

    pub fn global_count(&self) -> usize {
        self.data_elements
            .iter()
            .filter(|e| e.element_type() == DataElementType::Global)
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataElement {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint_text: Option<String>,
    #[serde(flatten)]
    pub kind: DataElementKind,
}

impl DataElement {
    pub fn element_type(&self) -> DataElementType {
        self.kind.element_type()
    }
}

/// Type-specific payload of a data element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DataElementKind {
    Integer {
        minimum: Option<i64>,
        maximum: Option<i64>,
    },
    Numeric {
        minimum: Option<f64>,
        maximum: Option<f64>,
    },
    Choice {
        choices: Vec<Choice>,
    },
    MultiChoice {
        choices: Vec<Choice>,
    },
    Global {
        value: Option<String>,
    },
}

impl DataElementKind {
    pub fn element_type(&self) -> DataElementType {
        match self {
            Self::Integer { .. } => DataElementType::Integer,
            Self::Numeric { .. } => DataElementType::Numeric,
            Self::Choice { .. } => DataElementType::Choice,
            Self::MultiChoice { .. } => DataElementType::MultiChoice,
            Self::Global { .. } => DataElementType::Global,
        }
    }

    pub fn choices(&self) -> &[Choice] {
        match self {
            Self::Choice { choices } | Self::MultiChoice { choices } => choices,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

/// Element-type discriminator shared by module documents and element create/update input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataElementType {
    Integer,
    Numeric,
    Choice,
    MultiChoice,
    Global,
}

impl DataElementType {
    pub const ALL: [DataElementType; 5] = [
        Self::Integer,
        Self::Numeric,
        Self::Choice,
        Self::MultiChoice,
        Self::Global,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Numeric => "numeric",
            Self::Choice => "choice",
            Self::MultiChoice => "multiChoice",
            Self::Global => "global",
        }
    }

    /// XML tag used for this type inside `<DataElements>`.
    pub fn xml_tag(&self) -> &'static str {
        match self {
            Self::Integer => "IntegerDataElement",
            Self::Numeric => "NumericDataElement",
            Self::Choice => "ChoiceDataElement",
            Self::MultiChoice => "MultiChoiceDataElement",
            Self::Global => "GlobalValue",
        }
    }

    pub fn from_xml_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.xml_tag() == tag)
    }

    pub fn has_options(&self) -> bool {
        matches!(self, Self::Choice | Self::MultiChoice)
    }

    pub fn has_bounds(&self) -> bool {
        matches!(self, Self::Integer | Self::Numeric)
    }
}

impl fmt::Display for DataElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataElementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("unknown data element type '{trimmed}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_type_parses_case_insensitively() {
        assert_eq!(
            "MultiChoice".parse::<DataElementType>().unwrap(),
            DataElementType::MultiChoice
        );
        assert_eq!(
            " integer ".parse::<DataElementType>().unwrap(),
            DataElementType::Integer
        );
        assert!("date".parse::<DataElementType>().is_err());
    }

    #[test]
    fn xml_tags_map_back_to_types() {
        for t in DataElementType::ALL {
            assert_eq!(DataElementType::from_xml_tag(t.xml_tag()), Some(t));
        }
        assert_eq!(DataElementType::from_xml_tag("ComputedDataElement"), None);
    }

    #[test]
    fn element_type_serializes_camel_case() {
        let json = serde_json::to_string(&DataElementType::MultiChoice).unwrap();
        assert_eq!(json, "\"multiChoice\"");
    }
}

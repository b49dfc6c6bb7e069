//! Schema-driven reader for reporting module XML.
//!
//! The document is walked once with `roxmltree`; every structural rule is checked
//! while building the typed graph, so a returned [`ModuleDescription`] is always
//! safe to materialize.

use std::collections::HashSet;

use roxmltree::{Document, Node};

use crate::error::{ModuleError, Result};
use crate::model::{Choice, DataElement, DataElementKind, DataElementType, ModuleDescription};

const ROOT: &str = "ReportingModule";

/// Parse and validate a reporting module document.
pub fn parse_module(input: &str) -> Result<ModuleDescription> {
    let doc = Document::parse(input)?;
    let root = doc.root_element();

    if root.tag_name().name() != ROOT {
        return Err(ModuleError::UnexpectedRoot(
            root.tag_name().name().to_string(),
        ));
    }

    let metadata =
        child(root, "Metadata").ok_or_else(|| ModuleError::MissingElement("Metadata".into()))?;
    let name = child_text(metadata, "Label")
        .ok_or_else(|| ModuleError::MissingElement("Metadata/Label".into()))?;

    let info = child(metadata, "Info");
    let description = info.and_then(|i| child_text(i, "Description"));
    let contact = info.and_then(|i| child(i, "Contact"));
    let contact_name = contact.and_then(|c| child_text(c, "Name"));
    let contact_email = contact.and_then(|c| child_text(c, "Email"));

    let elements_node = child(root, "DataElements")
        .ok_or_else(|| ModuleError::MissingElement("DataElements".into()))?;

    let mut seen_ids = HashSet::new();
    let mut data_elements = Vec::new();
    for node in elements_node.children().filter(Node::is_element) {
        let element = parse_data_element(node)?;
        if !seen_ids.insert(element.id.clone()) {
            return Err(ModuleError::Invalid(format!(
                "duplicate data element id '{}'",
                element.id
            )));
        }
        data_elements.push(element);
    }

    Ok(ModuleDescription {
        id: attribute(root, "id"),
        name,
        description,
        contact_name,
        contact_email,
        data_elements,
    })
}

fn parse_data_element(node: Node) -> Result<DataElement> {
    let tag = node.tag_name().name();
    let element_type = DataElementType::from_xml_tag(tag)
        .ok_or_else(|| ModuleError::UnsupportedElementType(tag.to_string()))?;

    let id = attribute(node, "Id").ok_or_else(|| {
        ModuleError::Invalid(format!("<{tag}> is missing its Id attribute"))
    })?;
    let label = child_text(node, "Label")
        .ok_or_else(|| ModuleError::element(&id, "Label is required"))?;
    let hint_text = child_text(node, "HintText");

    let kind = match element_type {
        DataElementType::Integer => {
            let minimum = parse_bound::<i64>(node, &id, "Minimum", "an integer")?;
            let maximum = parse_bound::<i64>(node, &id, "Maximum", "an integer")?;
            check_range(&id, minimum.map(|v| v as f64), maximum.map(|v| v as f64))?;
            DataElementKind::Integer { minimum, maximum }
        }
        DataElementType::Numeric => {
            let minimum = parse_bound::<f64>(node, &id, "Minimum", "a number")?;
            let maximum = parse_bound::<f64>(node, &id, "Maximum", "a number")?;
            if minimum.is_some_and(|v| !v.is_finite()) || maximum.is_some_and(|v| !v.is_finite())
            {
                return Err(ModuleError::element(&id, "bounds must be finite numbers"));
            }
            check_range(&id, minimum, maximum)?;
            DataElementKind::Numeric { minimum, maximum }
        }
        DataElementType::Choice => DataElementKind::Choice {
            choices: parse_choices(node, &id)?,
        },
        DataElementType::MultiChoice => DataElementKind::MultiChoice {
            choices: parse_choices(node, &id)?,
        },
        DataElementType::Global => DataElementKind::Global {
            value: child_text(node, "Value"),
        },
    };

    Ok(DataElement {
        id,
        label,
        hint_text,
        kind,
    })
}

fn parse_choices(node: Node, id: &str) -> Result<Vec<Choice>> {
    let info = child(node, "ChoiceInfo")
        .ok_or_else(|| ModuleError::element(id, "ChoiceInfo is required"))?;

    let mut values = HashSet::new();
    let mut choices = Vec::new();
    for choice in info
        .children()
        .filter(|c| c.is_element() && c.tag_name().name() == "Choice")
    {
        let value = child_text(choice, "Value")
            .ok_or_else(|| ModuleError::element(id, "every Choice needs a Value"))?;
        let label = child_text(choice, "Label")
            .ok_or_else(|| ModuleError::element(id, format!("choice '{value}' needs a Label")))?;
        if !values.insert(value.clone()) {
            return Err(ModuleError::element(
                id,
                format!("duplicate choice value '{value}'"),
            ));
        }
        choices.push(Choice { value, label });
    }

    if choices.is_empty() {
        return Err(ModuleError::element(id, "at least one Choice is required"));
    }
    Ok(choices)
}

fn parse_bound<T: std::str::FromStr>(
    node: Node,
    id: &str,
    name: &str,
    expected: &str,
) -> Result<Option<T>> {
    match child_text(node, name) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| ModuleError::element(id, format!("{name} must be {expected}, got '{raw}'"))),
    }
}

fn check_range(id: &str, minimum: Option<f64>, maximum: Option<f64>) -> Result<()> {
    if let (Some(min), Some(max)) = (minimum, maximum) {
        if min > max {
            return Err(ModuleError::element(
                id,
                format!("Minimum ({min}) is greater than Maximum ({max})"),
            ));
        }
    }
    Ok(())
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|c| c.is_element() && c.tag_name().name() == name)
}

/// Trimmed text content of a named child; `None` when absent or blank.
fn child_text(node: Node, name: &str) -> Option<String> {
    child(node, name).and_then(text_content)
}

fn text_content(node: Node) -> Option<String> {
    let text: String = node
        .descendants()
        .filter(Node::is_text)
        .filter_map(|n| n.text())
        .collect();
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn attribute(node: Node, name: &str) -> Option<String> {
    node.attribute(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module_with(elements: &str) -> String {
        format!(
            "<ReportingModule id=\"m1\"><Metadata><Label>Module</Label></Metadata><DataElements>{elements}</DataElements></ReportingModule>"
        )
    }

    #[test]
    fn rejects_unexpected_root() {
        let err = parse_module("<Module/>").unwrap_err();
        assert!(matches!(err, ModuleError::UnexpectedRoot(ref r) if r == "Module"));
    }

    #[test]
    fn rejects_missing_label() {
        let err = parse_module(
            "<ReportingModule><Metadata><Label>  </Label></Metadata><DataElements/></ReportingModule>",
        )
        .unwrap_err();
        assert!(matches!(err, ModuleError::MissingElement(ref e) if e == "Metadata/Label"));
    }

    #[test]
    fn rejects_unsupported_element_type() {
        let xml = module_with("<ComputedDataElement Id=\"c\"><Label>C</Label></ComputedDataElement>");
        let err = parse_module(&xml).unwrap_err();
        assert!(
            matches!(err, ModuleError::UnsupportedElementType(ref t) if t == "ComputedDataElement")
        );
    }

    #[test]
    fn rejects_non_integer_bounds_on_integer_elements() {
        let xml = module_with(
            "<IntegerDataElement Id=\"i\"><Label>I</Label><Minimum>0.5</Minimum></IntegerDataElement>",
        );
        assert!(matches!(
            parse_module(&xml).unwrap_err(),
            ModuleError::InvalidElement { .. }
        ));
    }

    #[test]
    fn rejects_inverted_range() {
        let xml = module_with(
            "<NumericDataElement Id=\"n\"><Label>N</Label><Minimum>5</Minimum><Maximum>1</Maximum></NumericDataElement>",
        );
        let err = parse_module(&xml).unwrap_err();
        assert!(err.to_string().contains("greater than"));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let xml = module_with(
            "<GlobalValue Id=\"g\"><Label>G</Label></GlobalValue><GlobalValue Id=\"g\"><Label>H</Label></GlobalValue>",
        );
        assert!(matches!(parse_module(&xml).unwrap_err(), ModuleError::Invalid(_)));
    }

    #[test]
    fn rejects_choice_without_options() {
        let xml = module_with(
            "<ChoiceDataElement Id=\"c\"><Label>C</Label><ChoiceInfo/></ChoiceDataElement>",
        );
        assert!(parse_module(&xml)
            .unwrap_err()
            .to_string()
            .contains("at least one Choice"));
    }

    #[test]
    fn trims_text_content() {
        let xml = module_with(
            "<ChoiceDataElement Id=\" c1 \"><Label>\n  Lesion  \n</Label><ChoiceInfo><Choice><Value> a </Value><Label> A </Label></Choice></ChoiceInfo></ChoiceDataElement>",
        );
        let module = parse_module(&xml).unwrap();
        let element = &module.data_elements[0];
        assert_eq!(element.id, "c1");
        assert_eq!(element.label, "Lesion");
        assert_eq!(
            element.kind.choices(),
            &[Choice {
                value: "a".into(),
                label: "A".into()
            }]
        );
    }
}

//! Module description → reporting module XML.

use std::io::Cursor;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{ModuleError, Result};
use crate::model::{Choice, DataElement, DataElementKind, ModuleDescription};

type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// Serialize a module description using the layout accepted by [`crate::parse_module`].
pub fn write_module(module: &ModuleDescription) -> Result<String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    emit(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;

    let mut root = BytesStart::new("ReportingModule");
    if let Some(id) = &module.id {
        root.push_attribute(("id", id.as_str()));
    }
    emit(&mut writer, Event::Start(root))?;

    start(&mut writer, "Metadata")?;
    text_element(&mut writer, "Label", &module.name)?;
    if module.description.is_some() || module.contact_name.is_some() || module.contact_email.is_some()
    {
        start(&mut writer, "Info")?;
        if let Some(description) = &module.description {
            text_element(&mut writer, "Description", description)?;
        }
        if module.contact_name.is_some() || module.contact_email.is_some() {
            start(&mut writer, "Contact")?;
            if let Some(name) = &module.contact_name {
                text_element(&mut writer, "Name", name)?;
            }
            if let Some(email) = &module.contact_email {
                text_element(&mut writer, "Email", email)?;
            }
            end(&mut writer, "Contact")?;
        }
        end(&mut writer, "Info")?;
    }
    end(&mut writer, "Metadata")?;

    start(&mut writer, "DataElements")?;
    for element in &module.data_elements {
        write_data_element(&mut writer, element)?;
    }
    end(&mut writer, "DataElements")?;

    end(&mut writer, "ReportingModule")?;

    let bytes = writer.into_inner().into_inner();
    Ok(String::from_utf8(bytes)?)
}

fn write_data_element(writer: &mut XmlWriter, element: &DataElement) -> Result<()> {
    let tag = element.element_type().xml_tag();
    let mut node = BytesStart::new(tag);
    node.push_attribute(("Id", element.id.as_str()));
    emit(writer, Event::Start(node))?;

    text_element(writer, "Label", &element.label)?;
    if let Some(hint) = &element.hint_text {
        text_element(writer, "HintText", hint)?;
    }

    match &element.kind {
        DataElementKind::Integer { minimum, maximum } => {
            if let Some(min) = minimum {
                text_element(writer, "Minimum", &min.to_string())?;
            }
            if let Some(max) = maximum {
                text_element(writer, "Maximum", &max.to_string())?;
            }
        }
        DataElementKind::Numeric { minimum, maximum } => {
            if let Some(min) = minimum {
                text_element(writer, "Minimum", &min.to_string())?;
            }
            if let Some(max) = maximum {
                text_element(writer, "Maximum", &max.to_string())?;
            }
        }
        DataElementKind::Choice { choices } | DataElementKind::MultiChoice { choices } => {
            write_choices(writer, choices)?;
        }
        DataElementKind::Global { value } => {
            if let Some(value) = value {
                text_element(writer, "Value", value)?;
            }
        }
    }

    end(writer, tag)
}

fn write_choices(writer: &mut XmlWriter, choices: &[Choice]) -> Result<()> {
    start(writer, "ChoiceInfo")?;
    for choice in choices {
        start(writer, "Choice")?;
        text_element(writer, "Value", &choice.value)?;
        text_element(writer, "Label", &choice.label)?;
        end(writer, "Choice")?;
    }
    end(writer, "ChoiceInfo")
}

fn text_element(writer: &mut XmlWriter, name: &str, text: &str) -> Result<()> {
    start(writer, name)?;
    emit(writer, Event::Text(BytesText::new(text)))?;
    end(writer, name)
}

fn start(writer: &mut XmlWriter, name: &str) -> Result<()> {
    emit(writer, Event::Start(BytesStart::new(name)))
}

fn end(writer: &mut XmlWriter, name: &str) -> Result<()> {
    emit(writer, Event::End(BytesEnd::new(name)))
}

fn emit(writer: &mut XmlWriter, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| ModuleError::XmlWrite(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_module;

    #[test]
    fn escapes_markup_in_text() {
        let module = ModuleDescription {
            id: None,
            name: "Size < 5 & growing".into(),
            description: None,
            contact_name: None,
            contact_email: None,
            data_elements: vec![],
        };
        let xml = write_module(&module).unwrap();
        assert!(xml.contains("Size &lt; 5 &amp; growing"));
        assert_eq!(parse_module(&xml).unwrap().name, "Size < 5 & growing");
    }

    #[test]
    fn writes_contact_only_when_present() {
        let mut module = ModuleDescription {
            id: Some("m".into()),
            name: "M".into(),
            description: Some("d".into()),
            contact_name: None,
            contact_email: None,
            data_elements: vec![],
        };
        let xml = write_module(&module).unwrap();
        assert!(xml.contains("<Description>d</Description>"));
        assert!(!xml.contains("<Contact>"));

        module.contact_name = Some("Dr. Who".into());
        let xml = write_module(&module).unwrap();
        assert!(xml.contains("<Name>Dr. Who</Name>"));
    }
}

//! XML decoding into a structural map
//!
//! A document is read into a generic element tree, then converted into a
//! `serde_json::Value`: text-only elements become strings, repeated children
//! become arrays, everything else an object. Because a single child and a
//! list of one child look the same in that map, [`normalize_project`]
//! coerces the known list positions of a project descriptor into arrays
//! before typed decoding.

use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::{Map, Value};

#[derive(Debug, Default)]
struct Element {
    name: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn into_value(self) -> Value {
        if self.children.is_empty() {
            return Value::String(self.text.trim().to_string());
        }

        let mut map = Map::new();
        for child in self.children {
            let name = child.name.clone();
            let value = child.into_value();
            match map.get_mut(&name) {
                Some(Value::Array(items)) => items.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
                None => {
                    map.insert(name, value);
                }
            }
        }
        Value::Object(map)
    }
}

/// Decode an XML document into its root element name and structural map
pub fn parse_document(xml: &str) -> Result<(String, Value), String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("{} at position {}", e, reader.buffer_position()))?;

        match event {
            Event::Start(e) => stack.push(Element {
                name: String::from_utf8_lossy(e.local_name().as_ref()).to_string(),
                ..Element::default()
            }),
            Event::Empty(e) => {
                let element = Element {
                    name: String::from_utf8_lossy(e.local_name().as_ref()).to_string(),
                    ..Element::default()
                };
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(e) => {
                if let Some(current) = stack.last_mut() {
                    let text = e.unescape().map_err(|e| e.to_string())?;
                    current.text.push_str(&text);
                }
            }
            Event::CData(e) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| "unexpected closing tag".to_string())?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(format!("unclosed element <{}>", open.name));
    }

    let root = root.ok_or_else(|| "document has no root element".to_string())?;
    let name = root.name.clone();
    Ok((name, root.into_value()))
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), String> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(format!("second root element <{}>", element.name)),
    }
}

// Parents come before their children
const OBJECT_POSITIONS: &[&[&str]] = &[
    &["parent"],
    &["properties"],
    &["dependencies"],
    &["dependencyManagement"],
    &["dependencyManagement", "dependencies"],
    &["build"],
    &["build", "plugins"],
    &["build", "pluginManagement"],
    &["build", "pluginManagement", "plugins"],
    &["modules"],
];

const OBJECT_LISTS: &[(&[&str], &str)] = &[
    (&["dependencies"], "dependency"),
    (&["dependencyManagement", "dependencies"], "dependency"),
    (&["build", "plugins"], "plugin"),
    (&["build", "pluginManagement", "plugins"], "plugin"),
];

const TEXT_LISTS: &[(&[&str], &str)] = &[(&["modules"], "module")];

/// Coerce the list and object positions of a project map into their
/// expected shapes
pub fn normalize_project(project: &mut Value) {
    if !project.is_object() {
        *project = Value::Object(Map::new());
    }

    for path in OBJECT_POSITIONS {
        if let Some(value) = lookup_mut(project, path) {
            if !value.is_object() {
                *value = Value::Object(Map::new());
            }
        }
    }

    for (path, item) in OBJECT_LISTS {
        if let Some(items) = list_at(project, path, item) {
            for entry in items.iter_mut().filter(|e| !e.is_object()) {
                *entry = Value::Object(Map::new());
            }
        }
    }

    for (path, item) in TEXT_LISTS {
        if let Some(items) = list_at(project, path, item) {
            items.retain(Value::is_string);
        }
    }

    // Properties are flat key/value text
    if let Some(Value::Object(properties)) = project.get_mut("properties") {
        properties.retain(|_, value| value.is_string());
    }
}

fn lookup_mut<'a>(value: &'a mut Value, path: &[&str]) -> Option<&'a mut Value> {
    path.iter().try_fold(value, |current, key| current.get_mut(*key))
}

fn list_at<'a>(project: &'a mut Value, path: &[&str], item: &str) -> Option<&'a mut Vec<Value>> {
    let slot = lookup_mut(project, path)?.get_mut(item)?;
    if !slot.is_array() {
        let single = slot.take();
        *slot = Value::Array(vec![single]);
    }
    slot.as_array_mut()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_text_and_nesting() {
        let (name, value) =
            parse_document("<project><groupId>org.acme</groupId><parent><version>1</version></parent></project>")
                .unwrap();
        assert_eq!(name, "project");
        assert_eq!(value, json!({"groupId": "org.acme", "parent": {"version": "1"}}));
    }

    #[test]
    fn test_repeated_children_become_arrays() {
        let (_, value) =
            parse_document("<modules><module>a</module><module>b</module></modules>").unwrap();
        assert_eq!(value, json!({"module": ["a", "b"]}));
    }

    #[test]
    fn test_declaration_namespaces_and_comments_ignored() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- header -->
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <artifactId>app</artifactId>
  <description><![CDATA[A & B]]></description>
  <name>Tom &amp; Jerry</name>
  <packaging/>
</project>"#;
        let (name, value) = parse_document(xml).unwrap();
        assert_eq!(name, "project");
        assert_eq!(value["artifactId"], "app");
        assert_eq!(value["description"], "A & B");
        assert_eq!(value["name"], "Tom & Jerry");
        assert_eq!(value["packaging"], "");
    }

    #[test]
    fn test_malformed_documents() {
        assert!(parse_document("<project><a></b></project>").is_err());
        assert!(parse_document("<project><a>").is_err());
        assert!(parse_document("").is_err());
    }

    #[test]
    fn test_normalize_single_dependency_to_list() {
        let mut value = json!({
            "dependencies": {"dependency": {"artifactId": "a"}},
            "build": {"plugins": {"plugin": {"artifactId": "p"}}},
            "modules": {"module": "core"}
        });
        normalize_project(&mut value);
        assert_eq!(value["dependencies"]["dependency"], json!([{"artifactId": "a"}]));
        assert_eq!(value["build"]["plugins"]["plugin"], json!([{"artifactId": "p"}]));
        assert_eq!(value["modules"]["module"], json!(["core"]));
    }

    #[test]
    fn test_normalize_empty_sections() {
        let mut value = json!({
            "dependencies": "",
            "properties": {"a": "1", "nested": {"b": "2"}},
            "dependencyManagement": {"dependencies": {"dependency": ""}}
        });
        normalize_project(&mut value);
        assert_eq!(value["dependencies"], json!({}));
        assert_eq!(value["properties"], json!({"a": "1"}));
        assert_eq!(
            value["dependencyManagement"]["dependencies"]["dependency"],
            json!([{}])
        );
    }
}

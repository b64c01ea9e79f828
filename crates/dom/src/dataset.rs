//! `Element.dataset`: `data-*` attributes under camelCase names

use crate::element::is_xml_name_char;
use crate::error::{DomError, DomResult};
use crate::node::NodeId;
use crate::tree::DomTree;

/// `fooBar` -> `data-foo-bar`, for lookups. Never fails.
fn attribute_name(property: &str) -> String {
    let mut name = String::from("data-");
    for c in property.chars() {
        if c.is_ascii_uppercase() {
            name.push('-');
            name.push(c.to_ascii_lowercase());
        } else {
            name.push(c);
        }
    }
    name
}

/// `fooBar` -> `data-foo-bar`, for writes
fn checked_attribute_name(property: &str) -> DomResult<String> {
    let mut name = String::from("data-");
    let mut prev = None;
    for c in property.chars() {
        if prev == Some('-') && c.is_ascii_lowercase() {
            return Err(DomError::InvalidCharacter(
                "An invalid or illegal string was specified",
            ));
        }
        if !is_xml_name_char(c) {
            return Err(DomError::InvalidCharacter("String contains an invalid character"));
        }
        if c.is_ascii_uppercase() {
            name.push('-');
        }
        name.push(c.to_ascii_lowercase());
        prev = Some(c);
    }
    Ok(name)
}

/// `data-foo-bar` -> `fooBar`
fn property_name(attribute: &str) -> String {
    let rest = attribute.strip_prefix("data-").unwrap_or(attribute);
    let mut property = String::with_capacity(rest.len());
    let mut prev: Option<char> = None;
    for c in rest.chars() {
        if prev == Some('-') && c.is_ascii_lowercase() {
            property.push(c.to_ascii_uppercase());
            prev = None;
        } else {
            property.extend(prev);
            prev = Some(c);
        }
    }
    property.extend(prev);
    property
}

fn keys_of(tree: &DomTree, element: NodeId) -> Vec<String> {
    tree.attributes(element)
        .map(|map| {
            map.names()
                .filter(|name| name.starts_with("data-"))
                .map(property_name)
                .collect()
        })
        .unwrap_or_default()
}

/// Read-only `dataset` view of one element
pub struct Dataset<'a> {
    tree: &'a DomTree,
    element: NodeId,
}

impl<'a> Dataset<'a> {
    pub fn get(&self, property: &str) -> Option<&'a str> {
        self.tree
            .attributes(self.element)
            .ok()?
            .get(&attribute_name(property))
    }

    pub fn has(&self, property: &str) -> bool {
        self.get(property).is_some()
    }

    /// Property names of every `data-*` attribute, in attribute order
    pub fn keys(&self) -> Vec<String> {
        keys_of(self.tree, self.element)
    }
}

/// Writable `dataset` view of one element
pub struct DatasetMut<'a> {
    tree: &'a mut DomTree,
    element: NodeId,
}

impl DatasetMut<'_> {
    pub fn get(&self, property: &str) -> Option<&str> {
        self.tree
            .attributes(self.element)
            .ok()?
            .get(&attribute_name(property))
    }

    pub fn has(&self, property: &str) -> bool {
        self.get(property).is_some()
    }

    pub fn keys(&self) -> Vec<String> {
        keys_of(self.tree, self.element)
    }

    /// `dataset[property] = value`
    pub fn set(&mut self, property: &str, value: &str) -> DomResult<()> {
        let name = checked_attribute_name(property)?;
        self.tree.set_attribute(self.element, &name, value)
    }

    /// `delete dataset[property]`
    pub fn delete(&mut self, property: &str) -> DomResult<()> {
        self.tree.remove_attribute(self.element, &attribute_name(property))
    }
}

impl DomTree {
    pub fn dataset(&self, element: NodeId) -> DomResult<Dataset<'_>> {
        self.attributes(element)?;
        Ok(Dataset {
            tree: self,
            element,
        })
    }

    pub fn dataset_mut(&mut self, element: NodeId) -> DomResult<DatasetMut<'_>> {
        self.attributes(element)?;
        Ok(DatasetMut {
            tree: self,
            element,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_transcoding() {
        assert_eq!(attribute_name("fooBar"), "data-foo-bar");
        assert_eq!(attribute_name("x"), "data-x");
        assert_eq!(property_name("data-foo-bar"), "fooBar");
        assert_eq!(property_name("data-foo--bar"), "foo-Bar");
        assert_eq!(property_name("data-a-1"), "a-1");
    }

    #[test]
    fn test_invalid_property_names() {
        assert_eq!(
            checked_attribute_name("foo-bar"),
            Err(DomError::InvalidCharacter("An invalid or illegal string was specified"))
        );
        assert_eq!(
            checked_attribute_name("foo bar"),
            Err(DomError::InvalidCharacter("String contains an invalid character"))
        );
        assert_eq!(checked_attribute_name("foo-Bar").unwrap(), "data-foo--bar");
    }

    #[test]
    fn test_dataset_round_trip() {
        let mut tree = DomTree::new();
        let doc = tree.document_id();
        let el = tree.create_element(doc, "div").unwrap();

        tree.dataset_mut(el).unwrap().set("fooBar", "1").unwrap();
        assert_eq!(tree.get_attribute(el, "data-foo-bar").unwrap(), Some("1"));

        tree.set_attribute(el, "data-foo-bar", "2").unwrap();
        assert_eq!(tree.dataset(el).unwrap().get("fooBar"), Some("2"));

        tree.set_attribute(el, "title", "t").unwrap();
        tree.set_attribute(el, "data-x", "3").unwrap();
        assert_eq!(tree.dataset(el).unwrap().keys(), vec!["fooBar", "x"]);

        let mut dataset = tree.dataset_mut(el).unwrap();
        dataset.delete("fooBar").unwrap();
        assert!(!dataset.has("fooBar"));
        assert!(dataset.has("x"));
    }
}

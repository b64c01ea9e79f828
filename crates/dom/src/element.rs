//! Elements: tag identity, attributes, markup access and selector queries

use crate::attr::NamedNodeMap;
use crate::error::{DomError, DomResult};
use crate::node::NodeId;
use crate::token_list::DomTokenList;
use crate::tree::DomTree;

/// Element-specific data
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Uppercase tag name
    pub(crate) tag_name: String,
    /// Lowercase tag name
    pub(crate) local_name: String,
    pub(crate) attributes: NamedNodeMap,
    pub(crate) class_list: DomTokenList,
    /// Mirror of the `id` attribute
    pub(crate) current_id: String,
    /// Content fragment of a `<template>`
    pub(crate) template_content: Option<NodeId>,
}

impl ElementData {
    pub(crate) fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_ascii_uppercase(),
            local_name: tag_name.to_ascii_lowercase(),
            attributes: NamedNodeMap::new(),
            class_list: DomTokenList::new(),
            current_id: String::new(),
            template_content: None,
        }
    }

    /// Element with attributes taken as they are, as the parser produced them
    pub(crate) fn with_attributes<'a>(
        tag_name: &str,
        attributes: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        let mut data = Self::new(tag_name);
        for (name, value) in attributes {
            let name = name.to_ascii_lowercase();
            data.attributes.set_value(&name, value);
            match name.as_str() {
                "id" => data.current_id = value.to_string(),
                "class" => data.class_list.set_value(value),
                _ => {}
            }
        }
        data
    }

    /// Copy of the element without its children or template content
    pub(crate) fn clone_without_content(&self) -> Self {
        let mut data = Self::new(&self.local_name);
        data.attributes = self.attributes.clone_values();
        data.current_id = self.current_id.clone();
        data.class_list.set_value(self.attributes.get("class").unwrap_or(""));
        data
    }

    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    pub fn attributes(&self) -> &NamedNodeMap {
        &self.attributes
    }

    pub fn class_list(&self) -> &DomTokenList {
        &self.class_list
    }

    pub fn id(&self) -> &str {
        &self.current_id
    }

    /// Get an attribute value; the name is matched case-insensitively
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(&name.to_ascii_lowercase())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.class_list.contains(class)
    }

    pub fn is_template(&self) -> bool {
        self.local_name == "template"
    }

    pub fn template_content(&self) -> Option<NodeId> {
        self.template_content
    }
}

fn is_xml_name_start_char(c: char) -> bool {
    matches!(c,
        ':' | 'A'..='Z' | '_' | 'a'..='z'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

pub(crate) fn is_xml_name_char(c: char) -> bool {
    is_xml_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}'
            | '\u{300}'..='\u{36F}'
            | '\u{203F}'..='\u{2040}')
}

/// Validate a tag or attribute name against the XML `Name` production
pub(crate) fn validate_name(name: &str) -> DomResult<()> {
    let mut chars = name.chars();
    let valid = chars.next().is_some_and(is_xml_name_start_char) && chars.all(is_xml_name_char);
    if valid {
        Ok(())
    } else {
        Err(DomError::InvalidCharacter("String contains an invalid character"))
    }
}

impl DomTree {
    fn element(&self, element: NodeId) -> DomResult<&ElementData> {
        self.node(element)?
            .as_element()
            .ok_or(DomError::InvalidArgument("Node is not an element"))
    }

    /// Uppercase tag name
    pub fn tag_name(&self, element: NodeId) -> DomResult<&str> {
        Ok(self.element(element)?.tag_name())
    }

    /// Lowercase tag name
    pub fn local_name(&self, element: NodeId) -> DomResult<&str> {
        Ok(self.element(element)?.local_name())
    }

    pub fn id(&self, element: NodeId) -> DomResult<&str> {
        Ok(self.element(element)?.id())
    }

    pub fn set_id(&mut self, element: NodeId, id: &str) -> DomResult<()> {
        self.set_attribute(element, "id", id)
    }

    pub fn get_attribute(&self, element: NodeId, name: &str) -> DomResult<Option<&str>> {
        Ok(self.element(element)?.get_attribute(name))
    }

    /// `element.setAttribute(name, value)`; the name is lowercased
    pub fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) -> DomResult<()> {
        validate_name(name)?;
        self.element(element)?;
        let name = name.to_ascii_lowercase();
        self.set_named_value(element, &name, value, true)
    }

    /// `element.removeAttribute(name)`; removing `class` empties the class list
    pub fn remove_attribute(&mut self, element: NodeId, name: &str) -> DomResult<()> {
        let name = name.to_ascii_lowercase();
        self.remove_named_value(element, &name)?;
        Ok(())
    }

    pub fn has_attribute(&self, element: NodeId, name: &str) -> DomResult<bool> {
        Ok(self.element(element)?.get_attribute(name).is_some())
    }

    pub fn has_attributes(&self, element: NodeId) -> DomResult<bool> {
        Ok(!self.element(element)?.attributes.is_empty())
    }

    pub fn get_attribute_names(&self, element: NodeId) -> DomResult<Vec<String>> {
        Ok(self
            .element(element)?
            .attributes
            .names()
            .map(str::to_string)
            .collect())
    }

    /// `element.toggleAttribute(name, force)`; returns whether it is now present
    pub fn toggle_attribute(
        &mut self,
        element: NodeId,
        name: &str,
        force: Option<bool>,
    ) -> DomResult<bool> {
        validate_name(name)?;
        let present = self.has_attribute(element, name)?;
        match (present, force) {
            (false, None | Some(true)) => {
                self.set_attribute(element, name, "")?;
                Ok(true)
            }
            (true, None | Some(false)) => {
                self.remove_attribute(element, name)?;
                Ok(false)
            }
            (present, _) => Ok(present),
        }
    }

    /// Namespaces are not modelled; the local name is looked up directly
    pub fn get_attribute_ns(
        &self,
        element: NodeId,
        _namespace: Option<&str>,
        local_name: &str,
    ) -> DomResult<Option<&str>> {
        self.get_attribute(element, local_name)
    }

    pub fn has_attribute_ns(
        &self,
        element: NodeId,
        _namespace: Option<&str>,
        local_name: &str,
    ) -> DomResult<bool> {
        self.has_attribute(element, local_name)
    }

    /// `element.getAttributeNode(name)`
    pub fn get_attribute_node(&mut self, element: NodeId, name: &str) -> DomResult<Option<NodeId>> {
        self.get_named_item(element, &name.to_ascii_lowercase())
    }

    /// `element.setAttributeNode(attr)`
    pub fn set_attribute_node(&mut self, element: NodeId, attr: NodeId) -> DomResult<Option<NodeId>> {
        self.set_named_item(element, attr)
    }

    /// `element.removeAttributeNode(attr)`
    pub fn remove_attribute_node(&mut self, element: NodeId, attr: NodeId) -> DomResult<NodeId> {
        let data = self
            .node(attr)?
            .as_attr()
            .ok_or(DomError::InvalidArgument("Node is not an attribute"))?;
        if data.owner_element != Some(element) {
            return Err(DomError::NotFound("Node was not found"));
        }
        let name = data.name.clone();
        self.remove_named_item(element, &name)
    }

    pub fn child_element_count(&self, parent: NodeId) -> usize {
        self.get(parent).map_or(0, |n| n.child_nodes.elements().len())
    }

    pub fn first_element_child(&self, parent: NodeId) -> Option<NodeId> {
        self.get(parent)?.child_nodes.elements().first()
    }

    pub fn last_element_child(&self, parent: NodeId) -> Option<NodeId> {
        self.get(parent)?.child_nodes.elements().last()
    }

    /// `element.innerText`, the same as its text content
    pub fn inner_text(&self, element: NodeId) -> DomResult<String> {
        self.element(element)?;
        Ok(self.text_content(element).unwrap_or_default())
    }

    pub fn set_inner_text(&mut self, element: NodeId, text: &str) -> DomResult<()> {
        self.element(element)?;
        self.set_text_content(element, text)
    }

    /// The `content` fragment of a `<template>`
    pub fn template_content(&self, element: NodeId) -> DomResult<Option<NodeId>> {
        Ok(self.element(element)?.template_content)
    }

    /// `element.innerHTML`
    pub fn inner_html(&self, element: NodeId) -> DomResult<String> {
        self.element(element)?;
        self.outer_or_inner_html(element, false)
    }

    /// `element.outerHTML`
    pub fn outer_html(&self, element: NodeId) -> DomResult<String> {
        self.element(element)?;
        self.outer_or_inner_html(element, true)
    }

    /// `element.innerHTML = html`
    ///
    /// The markup is parsed with the element as context and replaces all
    /// children (for a template, the children of its content).
    pub fn set_inner_html(&mut self, element: NodeId, html: &str) -> DomResult<()> {
        let data = self.element(element)?;
        let context = data.local_name.clone();
        let target = data.template_content.unwrap_or(element);
        let parser = self.markup_parser()?;

        log::debug!("replacing children of <{}> from {} bytes of markup", context, html.len());
        self.take_children(target)?;
        if html.is_empty() {
            return Ok(());
        }
        let parsed = parser.parse_fragment(html, &context);
        let owner = self.owner_for_child(target)?;
        let fragment = self.build_fragment(parsed, owner)?;
        self.append_child(target, fragment)?;
        Ok(())
    }

    /// `element.outerHTML = html`
    ///
    /// A detached element is left alone. Under a document this fails; under
    /// a fragment the markup is parsed in `body` context.
    pub fn set_outer_html(&mut self, element: NodeId, html: &str) -> DomResult<()> {
        self.element(element)?;
        let Some(parent) = self.parent_node(element) else {
            return Ok(());
        };
        let parent_node = self.node(parent)?;
        if parent_node.is_document() {
            return Err(DomError::NoModificationAllowed(
                "Modifications are not allowed for this document",
            ));
        }
        let context = if parent_node.is_fragment() {
            "body".to_string()
        } else {
            parent_node.local_name().unwrap_or("body").to_string()
        };
        let parser = self.markup_parser()?;

        let parsed = parser.parse_fragment(html, &context);
        let owner = self.owner_for_child(parent)?;
        let fragment = self.build_fragment(parsed, owner)?;
        self.insert_before(parent, fragment, Some(element))?;
        self.unlink(element)
    }

    /// Document whose selector engine serves queries scoped at `node`
    fn query_document(&self, node: NodeId) -> DomResult<NodeId> {
        let target = self.node(node)?;
        if target.is_document() {
            return Ok(node);
        }
        target
            .owner_document
            .ok_or(DomError::InvalidState("Element must have an owner document"))
    }

    /// First descendant of `scope` matching `selectors`
    pub fn query_selector(&self, scope: NodeId, selectors: &str) -> DomResult<Option<NodeId>> {
        let engine = self.selector_engine(self.query_document(scope)?)?;
        engine.first(self, selectors, scope)
    }

    /// Every descendant of `scope` matching `selectors`, in tree order
    pub fn query_selector_all(&self, scope: NodeId, selectors: &str) -> DomResult<Vec<NodeId>> {
        let engine = self.selector_engine(self.query_document(scope)?)?;
        engine.select(self, selectors, scope)
    }

    /// `element.matches(selectors)`
    pub fn matches(&self, element: NodeId, selectors: &str) -> DomResult<bool> {
        self.element(element)?;
        let engine = self.selector_engine(self.query_document(element)?)?;
        engine.matches(self, selectors, element)
    }

    /// `element.closest(selectors)`: the element itself or its nearest
    /// ancestor element that matches
    pub fn closest(&self, element: NodeId, selectors: &str) -> DomResult<Option<NodeId>> {
        self.element(element)?;
        let engine = self.selector_engine(self.query_document(element)?)?;
        let mut current = Some(element);
        while let Some(id) = current {
            if engine.matches(self, selectors, id)? {
                return Ok(Some(id));
            }
            current = self.parent_element(id);
        }
        Ok(None)
    }
}

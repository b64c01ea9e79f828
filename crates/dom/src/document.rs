//! Document, DocumentType and the DOMImplementation factories

use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;

use crate::collab::SelectorEngine;
use crate::element::{validate_name, ElementData};
use crate::error::{DomError, DomResult};
use crate::fragment::FragmentData;
use crate::node::{NodeData, NodeId};
use crate::tree::DomTree;

/// Namespace accepted by `createElementNS` and `getElementsByTagNameNS`
pub const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Document-specific data
pub struct DocumentData {
    pub(crate) head: Option<NodeId>,
    pub(crate) body: Option<NodeId>,
    /// Built on the first selector query against this document
    pub(crate) selector_engine: OnceCell<Rc<dyn SelectorEngine>>,
}

impl DocumentData {
    pub(crate) fn new() -> Self {
        Self {
            head: None,
            body: None,
            selector_engine: OnceCell::new(),
        }
    }

    pub fn head(&self) -> Option<NodeId> {
        self.head
    }

    pub fn body(&self) -> Option<NodeId> {
        self.body
    }
}

impl fmt::Debug for DocumentData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentData")
            .field("head", &self.head)
            .field("body", &self.body)
            .field("selector_engine", &self.selector_engine.get().is_some())
            .finish()
    }
}

/// `<!DOCTYPE name PUBLIC "public_id" "system_id">`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTypeData {
    pub(crate) name: String,
    pub(crate) public_id: String,
    pub(crate) system_id: String,
}

impl DocumentTypeData {
    pub(crate) fn new(name: &str, public_id: &str, system_id: &str) -> Self {
        Self {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn public_id(&self) -> &str {
        &self.public_id
    }

    pub fn system_id(&self) -> &str {
        &self.system_id
    }
}

impl DomTree {
    /// Owner stamped on nodes a document's factories create
    pub(crate) fn owner_for_factory(&self, document: NodeId) -> DomResult<Option<NodeId>> {
        if self.node(document)?.is_document() {
            Ok(Some(document))
        } else {
            Err(DomError::InvalidArgument("Node is not a document"))
        }
    }

    fn document_data(&self, document: NodeId) -> DomResult<&DocumentData> {
        self.node(document)?
            .as_document()
            .ok_or(DomError::InvalidArgument("Node is not a document"))
    }

    /// Add a new, empty document to the tree
    pub fn create_document(&mut self) -> NodeId {
        let id = self.alloc(NodeData::Document(DocumentData::new()), None);
        log::debug!("created document {}", id);
        id
    }

    /// `document.createElement(tag)`
    ///
    /// The name is validated and lowercased. A `template` gets its content
    /// fragment right away, owned by the same document.
    pub fn create_element(&mut self, document: NodeId, tag: &str) -> DomResult<NodeId> {
        validate_name(tag)?;
        let owner = self.owner_for_factory(document)?;
        let mut data = ElementData::new(tag);
        if data.is_template() {
            let content = self.alloc(NodeData::DocumentFragment(FragmentData::default()), owner);
            data.template_content = Some(content);
        }
        Ok(self.alloc(NodeData::Element(data), owner))
    }

    /// `document.createElementNS(namespace, name)`; only XHTML is supported
    pub fn create_element_ns(&mut self, document: NodeId, namespace: &str, name: &str) -> DomResult<NodeId> {
        if namespace != XHTML_NAMESPACE {
            return Err(DomError::Unsupported(format!(
                "createElementNS: \"{}\" namespace unimplemented",
                namespace
            )));
        }
        self.create_element(document, name)
    }

    pub fn create_text_node(&mut self, document: NodeId, data: &str) -> DomResult<NodeId> {
        let owner = self.owner_for_factory(document)?;
        Ok(self.alloc(NodeData::Text(data.to_string()), owner))
    }

    pub fn create_comment(&mut self, document: NodeId, data: &str) -> DomResult<NodeId> {
        let owner = self.owner_for_factory(document)?;
        Ok(self.alloc(NodeData::Comment(data.to_string()), owner))
    }

    pub fn create_document_fragment(&mut self, document: NodeId) -> DomResult<NodeId> {
        let owner = self.owner_for_factory(document)?;
        Ok(self.alloc(NodeData::DocumentFragment(FragmentData::default()), owner))
    }

    /// `implementation.createDocumentType(name, publicId, systemId)`
    pub fn create_document_type(
        &mut self,
        document: NodeId,
        name: &str,
        public_id: &str,
        system_id: &str,
    ) -> DomResult<NodeId> {
        let owner = self.owner_for_factory(document)?;
        let data = DocumentTypeData::new(name, public_id, system_id);
        Ok(self.alloc(NodeData::DocumentType(data), owner))
    }

    /// `implementation.createHTMLDocument(title)`
    ///
    /// Builds `<!DOCTYPE html><html><head><title>title</title></head><body></body></html>`
    /// in a new document and records its head and body.
    pub fn create_html_document(&mut self, title: &str) -> DomResult<NodeId> {
        let doc = self.create_document();
        let doctype = self.create_document_type(doc, "html", "", "")?;
        let html = self.create_element(doc, "html")?;
        let head = self.create_element(doc, "head")?;
        let body = self.create_element(doc, "body")?;
        let title_element = self.create_element(doc, "title")?;
        let title_text = self.create_text_node(doc, title)?;

        self.append_child(doc, doctype)?;
        self.append_child(doc, html)?;
        self.append_child(html, head)?;
        self.append_child(html, body)?;
        self.append_child(head, title_element)?;
        self.append_child(title_element, title_text)?;

        self.set_head(doc, Some(head))?;
        self.set_body(doc, Some(body))?;
        Ok(doc)
    }

    /// `implementation.createDocument()` is not supported
    pub fn create_document_ns(&mut self, _namespace: &str, _qualified_name: &str) -> DomResult<NodeId> {
        Err(DomError::Unsupported("Unimplemented".to_string()))
    }

    /// `document.importNode(node, deep)`: a copy owned by `document`
    pub fn import_node(&mut self, document: NodeId, node: NodeId, deep: bool) -> DomResult<NodeId> {
        let owner = self.owner_for_factory(document)?;
        let copy = self.clone_node(node, deep)?;
        self.propagate_owner(copy, owner);
        Ok(copy)
    }

    /// `document.adoptNode(node)`: detach `node` and move it to `document`
    pub fn adopt_node(&mut self, document: NodeId, node: NodeId) -> DomResult<NodeId> {
        let owner = self.owner_for_factory(document)?;
        if self.node(node)?.is_document() {
            return Err(DomError::Unsupported(
                "Adopting a Document node is not supported.".to_string(),
            ));
        }
        self.unlink(node)?;
        self.propagate_owner(node, owner);
        Ok(node)
    }

    /// `document.documentElement`, the first element child
    pub fn document_element(&self, document: NodeId) -> Option<NodeId> {
        self.get(document)?.child_nodes.elements().first()
    }

    /// `document.doctype`, the first doctype child
    pub fn doctype(&self, document: NodeId) -> Option<NodeId> {
        let node = self.get(document)?;
        node.child_nodes
            .iter()
            .find(|&id| self.get(id).is_some_and(|child| child.is_doctype()))
    }

    pub fn head(&self, document: NodeId) -> DomResult<Option<NodeId>> {
        Ok(self.document_data(document)?.head)
    }

    pub fn body(&self, document: NodeId) -> DomResult<Option<NodeId>> {
        Ok(self.document_data(document)?.body)
    }

    pub(crate) fn set_head(&mut self, document: NodeId, head: Option<NodeId>) -> DomResult<()> {
        self.node_mut(document)?
            .as_document_mut()
            .ok_or(DomError::InvalidArgument("Node is not a document"))?
            .head = head;
        Ok(())
    }

    pub(crate) fn set_body(&mut self, document: NodeId, body: Option<NodeId>) -> DomResult<()> {
        self.node_mut(document)?
            .as_document_mut()
            .ok_or(DomError::InvalidArgument("Node is not a document"))?
            .body = body;
        Ok(())
    }

    /// `document.title`: text of the first `title` element with whitespace
    /// runs collapsed and the ends trimmed
    pub fn title(&self, document: NodeId) -> DomResult<String> {
        self.document_data(document)?;
        let title = self
            .descendants(document)
            .into_iter()
            .find(|&id| self.get(id).and_then(|n| n.local_name()) == Some("title"));
        let text = title
            .and_then(|id| self.text_content(id))
            .unwrap_or_default();
        Ok(text.split_ascii_whitespace().collect::<Vec<_>>().join(" "))
    }

    pub fn document_uri(&self, document: NodeId) -> DomResult<&'static str> {
        self.document_data(document)?;
        Ok("about:blank")
    }

    /// `document.URL`, the same as `documentURI`
    pub fn url(&self, document: NodeId) -> DomResult<&'static str> {
        self.document_uri(document)
    }

    pub fn compat_mode(&self, document: NodeId) -> DomResult<&'static str> {
        self.document_data(document)?;
        Ok("CSS1Compat")
    }

    pub fn character_set(&self, document: NodeId) -> DomResult<&'static str> {
        self.document_data(document)?;
        Ok("UTF-8")
    }

    pub fn content_type(&self, document: NodeId) -> DomResult<&'static str> {
        self.document_data(document)?;
        Ok("text/html")
    }
}

//! DOMParser: whole documents from markup

use crate::error::{DomError, DomResult};
use crate::node::NodeId;
use crate::tree::DomTree;

impl DomTree {
    /// `new DOMParser().parseFromString(source, mime_type)`
    ///
    /// Only `text/html` is supported. The parsed top-level nodes move into a
    /// new document, which gets `<!DOCTYPE html>` in front when the source
    /// has no doctype. `head` and `body` are taken from the children of the
    /// `html` element.
    pub fn parse_from_string(&mut self, source: &str, mime_type: &str) -> DomResult<NodeId> {
        if mime_type != "text/html" {
            return Err(DomError::Unsupported(format!(
                "DOMParser: \"{}\" unimplemented",
                mime_type
            )));
        }
        let parser = self.markup_parser()?;

        let doc = self.create_document();
        let parsed = parser.parse(source);
        let staging = self.build_fragment(parsed, Some(doc))?;
        let nodes = self.take_children(staging)?;

        let mut has_doctype = false;
        let mut html = None;
        for &id in &nodes {
            let node = self.node(id)?;
            if node.is_doctype() {
                has_doctype = true;
            } else if node.node_name() == "HTML" {
                html = Some(id);
            }
        }
        self.link_at(doc, 0, &nodes)?;

        if !has_doctype {
            let doctype = self.create_document_type(doc, "html", "", "")?;
            self.link_at(doc, 0, &[doctype])?;
        }

        if let Some(html) = html {
            for child in self.children(html) {
                let name = self.get(child).map(|n| n.node_name().to_string());
                match name.as_deref() {
                    Some("HEAD") => self.set_head(doc, Some(child))?,
                    Some("BODY") => self.set_body(doc, Some(child))?,
                    _ => {}
                }
            }
        }

        log::debug!(
            "parsed {} bytes of markup into {} with {} top-level nodes",
            source.len(),
            doc,
            nodes.len()
        );
        Ok(doc)
    }
}

//! Markup serialization for innerHTML, outerHTML and whole documents
//!
//! The walker keeps its own stack of open child lists, so arbitrarily deep
//! trees serialize without recursion.

use crate::element::ElementData;
use crate::error::{DomError, DomResult};
use crate::node::{NodeData, NodeId};
use crate::node_list::NodeList;
use crate::tree::DomTree;

/// Elements that never have content or a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose text children are written without escaping
const RAW_TEXT_PARENTS: &[&str] = &[
    "style", "script", "xmp", "iframe", "noembed", "noframes", "plaintext",
];

pub(crate) fn is_void_element(local_name: &str) -> bool {
    VOID_ELEMENTS.contains(&local_name)
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{A0}' => out.push_str("&nbsp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn escape_attribute(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{A0}' => out.push_str("&nbsp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

fn write_opening_tag(element: &ElementData, out: &mut String) {
    out.push('<');
    out.push_str(&element.local_name);
    for (name, value) in element.attributes.iter() {
        out.push(' ');
        out.push_str(&name.to_ascii_lowercase());
        out.push_str("=\"");
        escape_attribute(value, out);
        out.push('"');
    }
    out.push('>');
}

/// One open child list
struct Frame<'a> {
    children: &'a NodeList,
    index: usize,
    /// Local name to close once the list is exhausted
    closing: Option<&'a str>,
}

impl DomTree {
    /// The list whose markup makes up `node`'s content: a template's content
    /// fragment, otherwise its own children
    fn content_children(&self, node: NodeId) -> DomResult<&NodeList> {
        let target = self.node(node)?;
        match target.as_element().and_then(ElementData::template_content) {
            Some(content) => Ok(&self.node(content)?.child_nodes),
            None => Ok(&target.child_nodes),
        }
    }

    /// Serialize the content of `root`, then close it with `closing`
    fn write_content(&self, root: NodeId, closing: Option<&str>, out: &mut String) -> DomResult<()> {
        let mut frames = vec![Frame {
            children: self.content_children(root)?,
            index: 0,
            closing,
        }];

        while let Some(frame) = frames.last_mut() {
            let Some(child) = frame.children.item(frame.index) else {
                if let Some(name) = frame.closing {
                    out.push_str("</");
                    out.push_str(name);
                    out.push('>');
                }
                frames.pop();
                continue;
            };
            frame.index += 1;

            let node = self.node(child)?;
            match &node.data {
                NodeData::Element(element) => {
                    write_opening_tag(element, out);
                    if !is_void_element(&element.local_name) {
                        frames.push(Frame {
                            children: self.content_children(child)?,
                            index: 0,
                            closing: Some(element.local_name.as_str()),
                        });
                    }
                }
                NodeData::Text(data) => {
                    let raw = node
                        .parent
                        .and_then(|parent| self.get(parent))
                        .and_then(|parent| parent.local_name())
                        .is_some_and(|name| RAW_TEXT_PARENTS.contains(&name));
                    if raw {
                        out.push_str(data);
                    } else {
                        escape_text(data, out);
                    }
                }
                NodeData::Comment(data) => {
                    out.push_str("<!--");
                    out.push_str(data);
                    out.push_str("-->");
                }
                NodeData::DocumentType(doctype) => {
                    out.push_str("<!DOCTYPE ");
                    out.push_str(&doctype.name);
                    out.push('>');
                }
                NodeData::Document(_) | NodeData::DocumentFragment(_) | NodeData::Attr(_) => {}
            }
        }
        Ok(())
    }

    /// Markup of an element's content, or of the element itself when
    /// `as_outer` is set. Void elements serialize as their opening tag only.
    pub(crate) fn outer_or_inner_html(&self, element: NodeId, as_outer: bool) -> DomResult<String> {
        let data = self
            .node(element)?
            .as_element()
            .ok_or(DomError::InvalidArgument("Node is not an element"))?;
        let mut out = String::new();
        let mut closing = None;
        if as_outer {
            write_opening_tag(data, &mut out);
            if is_void_element(&data.local_name) {
                return Ok(out);
            }
            closing = Some(data.local_name.as_str());
        }
        self.write_content(element, closing, &mut out)?;
        Ok(out)
    }

    /// Markup of a whole document, doctype and top-level comments included
    pub fn serialize_document(&self, document: NodeId) -> DomResult<String> {
        if !self.node(document)?.is_document() {
            return Err(DomError::InvalidArgument("Node is not a document"));
        }
        let mut out = String::new();
        self.write_content(document, None, &mut out)?;
        log::trace!("serialized {} into {} bytes", document, out.len());
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inner_and_outer() {
        let mut tree = DomTree::new();
        let doc = tree.document_id();
        let div = tree.create_element(doc, "div").unwrap();
        tree.set_attribute(div, "id", "main").unwrap();
        let b = tree.create_element(doc, "b").unwrap();
        tree.append(b, vec!["bold".into()]).unwrap();
        tree.append(div, vec!["Hi ".into(), b.into()]).unwrap();

        assert_eq!(tree.inner_html(div).unwrap(), "Hi <b>bold</b>");
        assert_eq!(tree.outer_html(div).unwrap(), "<div id=\"main\">Hi <b>bold</b></div>");
    }

    #[test]
    fn test_void_elements() {
        let mut tree = DomTree::new();
        let doc = tree.document_id();
        let p = tree.create_element(doc, "p").unwrap();
        let br = tree.create_element(doc, "br").unwrap();
        let img = tree.create_element(doc, "img").unwrap();
        tree.set_attribute(img, "src", "a.png").unwrap();
        tree.append(p, vec!["a".into(), br.into(), img.into()]).unwrap();

        assert_eq!(tree.inner_html(p).unwrap(), "a<br><img src=\"a.png\">");
        assert_eq!(tree.outer_html(br).unwrap(), "<br>");
    }

    #[test]
    fn test_escaping() {
        let mut tree = DomTree::new();
        let doc = tree.document_id();
        let p = tree.create_element(doc, "p").unwrap();
        tree.set_attribute(p, "title", "a \"q\" & b\u{A0}").unwrap();
        tree.append(p, vec!["1 < 2 & 3 > 0\u{A0}".into()]).unwrap();
        assert_eq!(
            tree.outer_html(p).unwrap(),
            "<p title=\"a &quot;q&quot; &amp; b&nbsp;\">1 &lt; 2 &amp; 3 &gt; 0&nbsp;</p>"
        );
    }

    #[test]
    fn test_raw_text_parents() {
        let mut tree = DomTree::new();
        let doc = tree.document_id();
        let script = tree.create_element(doc, "script").unwrap();
        tree.append(script, vec!["if (a < b && c) {}".into()]).unwrap();
        assert_eq!(tree.inner_html(script).unwrap(), "if (a < b && c) {}");
    }

    #[test]
    fn test_comments_and_templates() {
        let mut tree = DomTree::new();
        let doc = tree.document_id();
        let template = tree.create_element(doc, "template").unwrap();
        let content = tree.template_content(template).unwrap().unwrap();
        let comment = tree.create_comment(doc, " note ").unwrap();
        let span = tree.create_element(doc, "span").unwrap();
        tree.append(content, vec![comment.into(), span.into()]).unwrap();

        assert_eq!(tree.inner_html(template).unwrap(), "<!-- note --><span></span>");
        assert_eq!(
            tree.outer_html(template).unwrap(),
            "<template><!-- note --><span></span></template>"
        );
    }

    #[test]
    fn test_serialize_document() {
        let mut tree = DomTree::new();
        let doc = tree.create_html_document("T").unwrap();
        let comment = tree.create_comment(doc, "c").unwrap();
        tree.append_child(doc, comment).unwrap();
        assert_eq!(
            tree.serialize_document(doc).unwrap(),
            "<!DOCTYPE html><html><head><title>T</title></head><body></body></html><!--c-->"
        );
        let html = tree.document_element(doc).unwrap();
        assert!(tree.serialize_document(html).is_err());
    }

    /// Depth is bounded by the O(depth²) ancestor sets, not by the walk
    #[test]
    fn test_deep_tree_on_small_stack() {
        let handle = std::thread::Builder::new()
            .stack_size(128 * 1024)
            .spawn(|| {
                let mut tree = DomTree::new();
                let doc = tree.document_id();
                let root = tree.create_element(doc, "div").unwrap();
                let mut current = root;
                for _ in 0..2_000 {
                    let child = tree.create_element(doc, "div").unwrap();
                    tree.append_child(current, child).unwrap();
                    current = child;
                }
                tree.inner_html(root).unwrap()
            })
            .unwrap();
        let html = handle.join().unwrap();
        assert!(html.starts_with("<div><div>"));
        assert_eq!(html.len(), 2_000 * "<div></div>".len());
    }
}

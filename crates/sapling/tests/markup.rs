//! innerHTML, outerHTML and DOMParser against the real HTML parser

use sapling::{DomError, DomParser, DomTree, NodeId, ParserConfig, Queryable};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn parse(tree: &mut DomTree, html: &str) -> NodeId {
    DomParser::new(tree).parse_from_string(html, "text/html").unwrap()
}

#[test]
fn test_parse_from_string_builds_document() {
    init_logging();
    let mut tree = sapling::new_tree();
    let doc = parse(&mut tree, "<title> My   page </title><p class='intro'>Hello <b>world</b></p>");

    assert!(tree.doctype(doc).is_some());
    assert_eq!(tree.title(doc).unwrap(), "My page");
    let head = tree.head(doc).unwrap().unwrap();
    let body = tree.body(doc).unwrap().unwrap();
    assert_eq!(tree.local_name(head).unwrap(), "head");
    assert_eq!(tree.inner_html(body).unwrap(), "<p class=\"intro\">Hello <b>world</b></p>");
    assert_eq!(
        tree.serialize_document(doc).unwrap(),
        "<!DOCTYPE html><html><head><title> My   page </title></head>\
         <body><p class=\"intro\">Hello <b>world</b></p></body></html>"
    );
}

#[test]
fn test_parse_from_string_keeps_source_doctype() {
    init_logging();
    let mut tree = sapling::new_tree();
    let doc = parse(&mut tree, "<!DOCTYPE html><html><body></body></html>");
    let doctypes: Vec<NodeId> = tree
        .children(doc)
        .into_iter()
        .filter(|&id| tree.get(id).is_some_and(|n| n.is_doctype()))
        .collect();
    assert_eq!(doctypes.len(), 1);
}

#[test]
fn test_parse_from_string_rejects_other_mime_types() {
    let mut tree = sapling::new_tree();
    let err = DomParser::new(&mut tree)
        .parse_from_string("<a/>", "application/xml")
        .unwrap_err();
    assert_eq!(err.name(), "NotSupportedError");
    assert_eq!(err.to_string(), "DOMParser: \"application/xml\" unimplemented");
}

#[test]
fn test_documents_are_independent() {
    let mut tree = sapling::new_tree();
    let first = parse(&mut tree, "<p id='x'>one</p>");
    let second = parse(&mut tree, "<p id='x'>two</p>");
    let a = tree.get_element_by_id(first, "x").unwrap();
    let b = tree.get_element_by_id(second, "x").unwrap();
    assert_ne!(a, b);
    assert_eq!(tree.owner_document(a), Some(first));
    assert_eq!(tree.owner_document(b), Some(second));
}

#[test]
fn test_inner_html_round_trip() {
    init_logging();
    let mut tree = sapling::new_tree();
    let doc = tree.document_id();
    let div = tree.create_element(doc, "div").unwrap();

    let markup = "<ul><li>a &amp; b</li><li title=\"say &quot;hi&quot;\">c</li></ul><br><!--note-->";
    tree.set_inner_html(div, markup).unwrap();
    assert_eq!(tree.inner_html(div).unwrap(), markup);
    assert_eq!(tree.element_children(div).len(), 2);

    let li = tree.get_elements_by_tag_name(div, "li");
    assert_eq!(tree.text_content(li[0]).as_deref(), Some("a & b"));
    assert_eq!(tree.get_attribute(li[1], "title").unwrap(), Some("say \"hi\""));
    for id in tree.descendants(div) {
        assert_eq!(tree.owner_document(id), Some(doc));
    }
}

#[test]
fn test_inner_html_replaces_children() {
    let mut tree = sapling::new_tree();
    let doc = tree.document_id();
    let div = tree.create_element(doc, "div").unwrap();
    tree.set_inner_html(div, "<p>old</p>").unwrap();
    let old = tree.element_children(div)[0];

    tree.set_inner_html(div, "new <i>text</i>").unwrap();
    assert_eq!(tree.inner_html(div).unwrap(), "new <i>text</i>");
    assert_eq!(tree.parent_node(old), None);

    tree.set_inner_html(div, "").unwrap();
    assert!(tree.children(div).is_empty());
}

#[test]
fn test_inner_html_uses_element_as_context() {
    let mut tree = sapling::new_tree();
    let doc = tree.document_id();
    let script = tree.create_element(doc, "script").unwrap();
    tree.set_inner_html(script, "if (a < b && c) {}").unwrap();
    assert_eq!(tree.children(script).len(), 1);
    assert_eq!(tree.inner_html(script).unwrap(), "if (a < b && c) {}");

    let title = tree.create_element(doc, "title").unwrap();
    tree.set_inner_html(title, "<b>&lt;</b>").unwrap();
    assert_eq!(tree.text_content(title).as_deref(), Some("<b><</b>"));
}

#[test]
fn test_template_inner_html_goes_to_content() {
    let mut tree = sapling::new_tree();
    let doc = tree.document_id();
    let div = tree.create_element(doc, "div").unwrap();
    tree.set_inner_html(div, "<template><span>x</span></template>").unwrap();

    let template = tree.element_children(div)[0];
    assert!(tree.children(template).is_empty());
    let content = tree.template_content(template).unwrap().unwrap();
    assert_eq!(tree.element_children(content).len(), 1);
    assert_eq!(tree.inner_html(template).unwrap(), "<span>x</span>");
    assert_eq!(tree.outer_html(template).unwrap(), "<template><span>x</span></template>");
}

#[test]
fn test_outer_html_replaces_element() {
    init_logging();
    let mut tree = sapling::new_tree();
    let doc = parse(&mut tree, "<div id='box'><span id='old'>old</span><i>keep</i></div>");
    let old = tree.get_element_by_id(doc, "old").unwrap();
    tree.set_outer_html(old, "<em>one</em>two<em>three</em>").unwrap();

    let div = tree.get_element_by_id(doc, "box").unwrap();
    assert_eq!(
        tree.outer_html(div).unwrap(),
        "<div id=\"box\"><em>one</em>two<em>three</em><i>keep</i></div>"
    );
    assert_eq!(tree.parent_node(old), None);
}

#[test]
fn test_outer_html_edge_cases() {
    let mut tree = sapling::new_tree();
    let doc = parse(&mut tree, "<p>x</p>");

    // Detached: nothing happens
    let loose = tree.create_element(doc, "div").unwrap();
    tree.set_outer_html(loose, "<p>ignored</p>").unwrap();
    assert_eq!(tree.outer_html(loose).unwrap(), "<div></div>");

    // Document element: not allowed
    let html = tree.document_element(doc).unwrap();
    let err = tree.set_outer_html(html, "<html></html>").unwrap_err();
    assert!(matches!(err, DomError::NoModificationAllowed(_)));

    // Under a fragment the markup is parsed as body content
    let frag = tree.create_document_fragment(doc).unwrap();
    let span = tree.create_element(doc, "span").unwrap();
    tree.append_child(frag, span).unwrap();
    tree.set_outer_html(span, "<li>a</li><li>b</li>").unwrap();
    assert_eq!(tree.element_children(frag).len(), 2);
}

#[test]
fn test_whitespace_text_can_be_dropped() {
    let mut tree = sapling::new_tree_with(ParserConfig {
        drop_whitespace_text: true,
        ..ParserConfig::default()
    });
    let doc = tree.document_id();
    let ul = tree.create_element(doc, "ul").unwrap();
    tree.set_inner_html(ul, "\n  <li>a</li>\n  <li>b</li>\n").unwrap();
    assert_eq!(tree.children(ul).len(), 2);
    assert_eq!(tree.inner_html(ul).unwrap(), "<li>a</li><li>b</li>");
}

#[test]
fn test_missing_parser_is_reported() {
    let mut tree = DomTree::new();
    let doc = tree.document_id();
    let div = tree.create_element(doc, "div").unwrap();
    let err = tree.set_inner_html(div, "<p></p>").unwrap_err();
    assert!(matches!(err, DomError::MissingCollaborator(_)));
    assert_eq!(err.name(), "NotSupportedError");
}

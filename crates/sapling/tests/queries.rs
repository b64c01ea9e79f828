//! querySelector, matches and closest through the installed selector engine

use sapling::{DomError, DomParser, DomTree, NodeId, Queryable};

const PAGE: &str = "\
<div id='app' class='shell'>\
  <nav><a id='home' href='/' class='link active'>Home</a><a id='about' href='/about' class='link'>About</a></nav>\
  <main>\
    <article id='post' data-kind='news'><h2>Title</h2><p id='p1'>one</p><p id='p2' class='note'>two</p></article>\
    <ul id='list'><li>1</li><li>2</li><li>3</li><li>4</li></ul>\
  </main>\
</div>";

fn setup() -> (DomTree, NodeId) {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut tree = sapling::new_tree();
    let doc = DomParser::new(&mut tree).parse_from_string(PAGE, "text/html").unwrap();
    (tree, doc)
}

fn id_of(tree: &DomTree, node: NodeId) -> String {
    tree.id(node).unwrap().to_string()
}

#[test]
fn test_query_selector_on_document() {
    let (tree, doc) = setup();
    let home = tree.get_element_by_id(doc, "home").unwrap();
    assert_eq!(tree.query_selector(doc, "nav a").unwrap(), Some(home));
    let about = tree.query_selector(doc, "a.link:not(.active)").unwrap();
    assert_eq!(about.map(|n| id_of(&tree, n)).as_deref(), Some("about"));
    assert_eq!(tree.query_selector(doc, "table").unwrap(), None);
}

#[test]
fn test_query_selector_all_in_tree_order() {
    let (tree, doc) = setup();
    let found: Vec<String> = tree
        .query_selector_all(doc, "p, #post, h2")
        .unwrap()
        .into_iter()
        .map(|id| tree.local_name(id).unwrap().to_string())
        .collect();
    assert_eq!(found, vec!["article", "h2", "p", "p"]);

    let list = tree.get_element_by_id(doc, "list").unwrap();
    let odd = tree.query_selector_all(list, "li:nth-child(odd)").unwrap();
    let texts: Vec<String> = odd.iter().filter_map(|&id| tree.text_content(id)).collect();
    assert_eq!(texts, vec!["1", "3"]);
}

#[test]
fn test_element_scoped_queries() {
    let (tree, doc) = setup();
    let post = tree.get_element_by_id(doc, "post").unwrap();
    let all_p = tree.query_selector_all(post, "p").unwrap();
    assert_eq!(all_p.len(), 2);
    // The scope element itself is never a result
    assert!(tree.query_selector_all(post, "article").unwrap().is_empty());
    // But the selector may match ancestors outside the scope
    assert_eq!(tree.query_selector_all(post, "main p").unwrap(), all_p);
    assert_eq!(tree.query_selector_all(post, ":scope > .note").unwrap().len(), 1);
}

#[test]
fn test_attribute_queries() {
    let (tree, doc) = setup();
    let post = tree.get_element_by_id(doc, "post").unwrap();
    assert_eq!(tree.query_selector(doc, "[data-kind=news]").unwrap(), Some(post));
    assert_eq!(tree.query_selector_all(doc, "a[href^='/']").unwrap().len(), 2);
    assert_eq!(tree.query_selector_all(doc, "[class~=link]").unwrap().len(), 2);
}

#[test]
fn test_matches_and_closest() {
    let (tree, doc) = setup();
    let p2 = tree.get_element_by_id(doc, "p2").unwrap();
    let post = tree.get_element_by_id(doc, "post").unwrap();
    let app = tree.get_element_by_id(doc, "app").unwrap();

    assert!(tree.matches(p2, "article > p.note").unwrap());
    assert!(tree.matches(p2, "p:last-child").unwrap());
    assert!(!tree.matches(p2, "p:first-of-type").unwrap());

    assert_eq!(tree.closest(p2, "p").unwrap(), Some(p2));
    assert_eq!(tree.closest(p2, "article").unwrap(), Some(post));
    assert_eq!(tree.closest(p2, ".shell").unwrap(), Some(app));
    assert_eq!(tree.closest(p2, "section").unwrap(), None);
}

#[test]
fn test_queries_follow_mutations() {
    let (mut tree, doc) = setup();
    let list = tree.get_element_by_id(doc, "list").unwrap();
    assert_eq!(tree.query_selector_all(list, "li").unwrap().len(), 4);

    let li = tree.create_element(doc, "li").unwrap();
    tree.class_list_mut(li).unwrap().add(&["fresh"]).unwrap();
    tree.append_child(list, li).unwrap();
    assert_eq!(tree.query_selector_all(list, "li").unwrap().len(), 5);
    assert_eq!(tree.query_selector(doc, "li:last-child").unwrap(), Some(li));
    assert!(tree.matches(li, "#list > .fresh").unwrap());

    tree.remove(li).unwrap();
    assert_eq!(tree.query_selector(doc, ".fresh").unwrap(), None);
}

#[test]
fn test_fragment_queries_use_owner_document() {
    let (mut tree, doc) = setup();
    let frag = tree.create_document_fragment(doc).unwrap();
    let span = tree.create_element(doc, "span").unwrap();
    tree.set_attribute(span, "id", "inside").unwrap();
    tree.append_child(frag, span).unwrap();

    assert_eq!(tree.query_selector(frag, "span").unwrap(), Some(span));
    assert_eq!(tree.get_element_by_id(frag, "inside"), Some(span));
    // The fragment is a parent but not a parent element
    assert!(tree.matches(span, "span:first-child").unwrap());
    assert!(!tree.matches(span, "* > span").unwrap());
}

#[test]
fn test_invalid_selectors_are_syntax_errors() {
    let (tree, doc) = setup();
    for selector in ["", "div >", "[data-kind", "p:unknown", "::", "a,,b"] {
        let err = tree.query_selector_all(doc, selector).unwrap_err();
        assert!(matches!(err, DomError::Syntax(_)), "{:?}", selector);
        assert_eq!(err.name(), "SyntaxError");
    }
    let p1 = tree.get_element_by_id(doc, "p1").unwrap();
    assert!(tree.closest(p1, "!").is_err());
}

#[test]
fn test_engine_is_required() {
    let mut tree = DomTree::new();
    let doc = tree.document_id();
    let div = tree.create_element(doc, "div").unwrap();
    tree.append_child(doc, div).unwrap();
    let err = tree.query_selector(doc, "div").unwrap_err();
    assert!(matches!(err, DomError::MissingCollaborator(_)));
}

//! Deep trees must not be bounded by the call stack

use sapling::{NodeOrText, ParserConfig};

/// Every node caches its full ancestor set, so a chain costs O(depth²)
/// memory; the depth is kept where that cost stays modest and the walks
/// still run on the small stack below.
const DEPTH: usize = 2_000;
const SMALL_STACK: usize = 256 * 1024;

fn on_small_stack<T: Send + 'static>(f: impl FnOnce() -> T + Send + 'static) -> T {
    std::thread::Builder::new()
        .stack_size(SMALL_STACK)
        .spawn(f)
        .unwrap()
        .join()
        .unwrap()
}

#[test]
fn test_deep_chain_serializes_and_reparses() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (markup, reparsed) = on_small_stack(|| {
        let mut tree = sapling::new_tree_with(ParserConfig {
            max_depth: DEPTH * 2,
            ..ParserConfig::default()
        });
        let doc = tree.document_id();
        let root = tree.create_element(doc, "section").unwrap();
        let mut current = root;
        for _ in 0..DEPTH {
            let child = tree.create_element(doc, "div").unwrap();
            tree.append_child(current, child).unwrap();
            current = child;
        }
        tree.append(current, vec![NodeOrText::from("leaf")]).unwrap();

        let markup = tree.inner_html(root).unwrap();
        let copy = tree.create_element(doc, "section").unwrap();
        tree.set_inner_html(copy, &markup).unwrap();
        (markup, tree.descendants(copy).len())
    });

    assert!(markup.starts_with("<div><div>"));
    assert!(markup.contains("leaf"));
    assert_eq!(markup.len(), DEPTH * "<div></div>".len() + "leaf".len());
    assert_eq!(reparsed, DEPTH + 1);
}

#[test]
fn test_deep_chain_clone_and_move() {
    let (cloned, contained) = on_small_stack(|| {
        let mut tree = sapling::new_tree();
        let doc = tree.document_id();
        let root = tree.create_element(doc, "div").unwrap();
        let mut current = root;
        for _ in 0..DEPTH {
            let child = tree.create_element(doc, "div").unwrap();
            tree.append_child(current, child).unwrap();
            current = child;
        }
        let deepest = current;

        let clone = tree.clone_node(root, true).unwrap();
        let cloned = tree.descendants(clone).len();

        // Moving the chain under a new parent updates every ancestor link
        let holder = tree.create_element(doc, "main").unwrap();
        tree.append_child(holder, root).unwrap();
        (cloned, tree.contains(holder, deepest))
    });
    assert_eq!(cloned, DEPTH);
    assert!(contained);
}

#[test]
fn test_default_depth_limit_flattens_parsed_markup() {
    let mut tree = sapling::new_tree();
    let doc = tree.document_id();
    let div = tree.create_element(doc, "div").unwrap();
    let markup = "<span>".repeat(1_000);
    tree.set_inner_html(div, &markup).unwrap();

    // Every element is kept, but nesting stops at the configured depth
    assert_eq!(tree.descendants(div).len(), 1_000);
    let max_depth = ParserConfig::default().max_depth;
    let mut depth = 0;
    let mut current = div;
    while let Some(&first) = tree.element_children(current).first() {
        depth += 1;
        current = first;
    }
    assert!(depth <= max_depth);
    assert!(depth > 1);
}

//! Selector Matching
//!
//! Matches compiled selectors against elements of a [`DomTree`], right to
//! left. Combinators backtrack: when a descendant or sibling candidate fails
//! on the rest of the selector, the next candidate is tried.

use sapling_dom::{DomTree, ElementData, NodeId};

use crate::selector::{AttributeOp, Combinator, PseudoClass, Selector, SelectorPart};

/// Context for the pseudo-classes that depend on the query, not the tree
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchingContext {
    /// Element `:scope` refers to. `None` makes `:scope` behave as `:root`.
    pub scope: Option<NodeId>,
}

impl MatchingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scope(scope: NodeId) -> Self {
        Self { scope: Some(scope) }
    }
}

/// Check if a selector matches a specific element in the DOM tree
pub fn matches_selector(
    tree: &DomTree,
    element_id: NodeId,
    selector: &Selector,
    context: &MatchingContext,
) -> bool {
    if selector.parts.is_empty() {
        return false;
    }
    matches_complex(tree, element_id, &selector.parts, context)
}

/// Check if any selector of a list matches
pub fn matches_any(
    tree: &DomTree,
    element_id: NodeId,
    selectors: &[Selector],
    context: &MatchingContext,
) -> bool {
    selectors
        .iter()
        .any(|selector| matches_selector(tree, element_id, selector, context))
}

/// Match `parts`, whose last compound applies to `element_id`
fn matches_complex(
    tree: &DomTree,
    element_id: NodeId,
    parts: &[SelectorPart],
    context: &MatchingContext,
) -> bool {
    let compound_start = parts
        .iter()
        .rposition(|part| matches!(part, SelectorPart::Combinator(_)))
        .map_or(0, |i| i + 1);

    if !matches_compound(tree, element_id, &parts[compound_start..], context) {
        return false;
    }
    if compound_start == 0 {
        return true;
    }

    let SelectorPart::Combinator(combinator) = parts[compound_start - 1] else {
        return false;
    };
    let rest = &parts[..compound_start - 1];

    match combinator {
        Combinator::Descendant => {
            let mut current = tree.parent_element(element_id);
            while let Some(ancestor) = current {
                if matches_complex(tree, ancestor, rest, context) {
                    return true;
                }
                current = tree.parent_element(ancestor);
            }
            false
        }
        Combinator::Child => tree
            .parent_element(element_id)
            .is_some_and(|parent| matches_complex(tree, parent, rest, context)),
        Combinator::NextSibling => tree
            .previous_element_sibling(element_id)
            .is_some_and(|sibling| matches_complex(tree, sibling, rest, context)),
        Combinator::SubsequentSibling => {
            let mut current = tree.previous_element_sibling(element_id);
            while let Some(sibling) = current {
                if matches_complex(tree, sibling, rest, context) {
                    return true;
                }
                current = tree.previous_element_sibling(sibling);
            }
            false
        }
    }
}

/// Match a compound selector (consecutive simple selectors) against an element
fn matches_compound(
    tree: &DomTree,
    element_id: NodeId,
    parts: &[SelectorPart],
    context: &MatchingContext,
) -> bool {
    let Some(element) = tree.get(element_id).and_then(|n| n.as_element()) else {
        return false;
    };
    parts
        .iter()
        .all(|part| matches_simple_selector(tree, element_id, element, part, context))
}

fn matches_simple_selector(
    tree: &DomTree,
    element_id: NodeId,
    element: &ElementData,
    part: &SelectorPart,
    context: &MatchingContext,
) -> bool {
    match part {
        SelectorPart::Universal => true,
        SelectorPart::Type(tag) => element.local_name().eq_ignore_ascii_case(tag),
        SelectorPart::Class(class) => element.has_class(class),
        SelectorPart::Id(id) => !id.is_empty() && element.id() == id.as_str(),
        SelectorPart::Attribute {
            name,
            op,
            value,
            case_insensitive,
        } => matches_attribute(element, name, *op, value.as_deref(), *case_insensitive),
        SelectorPart::PseudoClass(pseudo) => {
            matches_pseudo_class(tree, element_id, element, pseudo, context)
        }
        // Pseudo-elements are never elements of the tree
        SelectorPart::PseudoElement(_) => false,
        SelectorPart::Combinator(_) => false,
    }
}

/// Match an attribute selector
fn matches_attribute(
    element: &ElementData,
    name: &str,
    op: Option<AttributeOp>,
    expected: Option<&str>,
    case_insensitive: bool,
) -> bool {
    let Some(actual) = element.get_attribute(name) else {
        return false;
    };
    let Some(op) = op else {
        return true; // [attr] just checks existence
    };
    let Some(expected) = expected else {
        return false;
    };

    let (actual, expected) = if case_insensitive {
        (actual.to_ascii_lowercase(), expected.to_ascii_lowercase())
    } else {
        (actual.to_string(), expected.to_string())
    };

    match op {
        AttributeOp::Equals => actual == expected,
        AttributeOp::Includes => {
            !expected.is_empty()
                && !expected.contains(char::is_whitespace)
                && actual.split_ascii_whitespace().any(|word| word == expected)
        }
        AttributeOp::DashMatch => {
            actual == expected
                || actual
                    .strip_prefix(expected.as_str())
                    .is_some_and(|rest| rest.starts_with('-'))
        }
        // An empty value never matches the substring operators
        AttributeOp::PrefixMatch => !expected.is_empty() && actual.starts_with(&expected),
        AttributeOp::SuffixMatch => !expected.is_empty() && actual.ends_with(&expected),
        AttributeOp::SubstringMatch => !expected.is_empty() && actual.contains(&expected),
    }
}

fn matches_pseudo_class(
    tree: &DomTree,
    element_id: NodeId,
    element: &ElementData,
    pseudo: &PseudoClass,
    context: &MatchingContext,
) -> bool {
    match pseudo {
        PseudoClass::Root => is_root(tree, element_id),
        PseudoClass::Scope => match context.scope {
            Some(scope) => scope == element_id,
            None => is_root(tree, element_id),
        },
        PseudoClass::Empty => is_empty(tree, element_id),
        PseudoClass::FirstChild => sibling_index(tree, element_id, None, false) == Some(1),
        PseudoClass::LastChild => sibling_index(tree, element_id, None, true) == Some(1),
        PseudoClass::OnlyChild => {
            sibling_index(tree, element_id, None, false) == Some(1)
                && sibling_index(tree, element_id, None, true) == Some(1)
        }
        PseudoClass::FirstOfType => {
            sibling_index(tree, element_id, Some(element.local_name()), false) == Some(1)
        }
        PseudoClass::LastOfType => {
            sibling_index(tree, element_id, Some(element.local_name()), true) == Some(1)
        }
        PseudoClass::OnlyOfType => {
            let of_type = Some(element.local_name());
            sibling_index(tree, element_id, of_type, false) == Some(1)
                && sibling_index(tree, element_id, of_type, true) == Some(1)
        }
        PseudoClass::Nth {
            a,
            b,
            of_type,
            from_end,
        } => {
            let of_type = of_type.then(|| element.local_name());
            sibling_index(tree, element_id, of_type, *from_end)
                .and_then(|index| i32::try_from(index).ok())
                .is_some_and(|index| matches_an_plus_b(index, *a, *b))
        }
        PseudoClass::Not(selectors) => !matches_any(tree, element_id, selectors, context),
        PseudoClass::Is(selectors) => matches_any(tree, element_id, selectors, context),
        PseudoClass::Checked => match element.local_name() {
            "input" => element.get_attribute("checked").is_some(),
            "option" => element.get_attribute("selected").is_some(),
            _ => false,
        },
        PseudoClass::Disabled => is_form_control(element) && element.get_attribute("disabled").is_some(),
        PseudoClass::Enabled => is_form_control(element) && element.get_attribute("disabled").is_none(),
        PseudoClass::Link => {
            matches!(element.local_name(), "a" | "area" | "link") && element.get_attribute("href").is_some()
        }
    }
}

fn is_form_control(element: &ElementData) -> bool {
    matches!(
        element.local_name(),
        "button" | "input" | "select" | "textarea" | "optgroup" | "option" | "fieldset"
    )
}

/// The document element: an element whose parent is a document
fn is_root(tree: &DomTree, element_id: NodeId) -> bool {
    tree.parent_node(element_id)
        .and_then(|parent| tree.get(parent))
        .is_some_and(|parent| parent.is_document())
}

/// No element or text children; comments are allowed
fn is_empty(tree: &DomTree, element_id: NodeId) -> bool {
    let Some(node) = tree.get(element_id) else {
        return false;
    };
    node.child_nodes().iter().all(|child| {
        tree.get(child).is_some_and(|child| {
            !child.is_element() && child.as_text().map_or(true, |text| text.is_empty())
        })
    })
}

/// 1-based position among the element siblings, optionally only those with
/// the local name `of_type`. `None` for an element without a parent.
fn sibling_index(
    tree: &DomTree,
    element_id: NodeId,
    of_type: Option<&str>,
    from_end: bool,
) -> Option<usize> {
    let parent = tree.get(tree.parent_node(element_id)?)?;
    let counted = |id: &NodeId| {
        tree.get(*id)
            .and_then(|n| n.as_element())
            .is_some_and(|e| of_type.map_or(true, |name| e.local_name() == name))
    };

    let children = parent.child_nodes();
    let position = if from_end {
        children.iter().rev().filter(counted).position(|id| id == element_id)
    } else {
        children.iter().filter(counted).position(|id| id == element_id)
    };
    position.map(|i| i + 1)
}

/// Check if index matches an+b formula
fn matches_an_plus_b(index: i32, a: i32, b: i32) -> bool {
    if a == 0 {
        return index == b;
    }

    let diff = index - b;
    if a > 0 {
        diff >= 0 && diff % a == 0
    } else {
        diff <= 0 && diff % a == 0
    }
}

//! `DOMTokenList` backing `Element.classList`

use smallvec::SmallVec;

use crate::error::{DomError, DomResult};
use crate::node::NodeId;
use crate::tree::DomTree;

/// An ordered set of class tokens plus the string it was read from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomTokenList {
    value: String,
    tokens: SmallVec<[String; 4]>,
}

fn is_token_whitespace(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\x0C' | '\r' | ' ')
}

fn check_token(token: &str, operation: &'static str) -> DomResult<()> {
    if token.is_empty() || token.contains(is_token_whitespace) {
        return Err(DomError::InvalidToken { operation });
    }
    Ok(())
}

impl DomTokenList {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// The class string as last assigned or as rebuilt by the last mutation
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn item(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(String::as_str)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    /// Replace the whole list, keeping `input` verbatim as the value
    pub(crate) fn set_value(&mut self, input: &str) {
        self.value = input.to_string();
        self.tokens.clear();
        for token in input.split(is_token_whitespace).filter(|t| !t.is_empty()) {
            if !self.contains(token) {
                self.tokens.push(token.to_string());
            }
        }
    }

    fn rebuild_value(&mut self) {
        self.value = self.tokens.join(" ");
    }

    pub(crate) fn add(&mut self, tokens: &[&str]) -> DomResult<()> {
        for token in tokens {
            check_token(token, "add")?;
        }
        for token in tokens {
            if !self.contains(token) {
                self.tokens.push(token.to_string());
            }
        }
        self.rebuild_value();
        Ok(())
    }

    pub(crate) fn remove(&mut self, tokens: &[&str]) -> DomResult<()> {
        for token in tokens {
            check_token(token, "remove")?;
        }
        self.tokens.retain(|t| !tokens.contains(&t.as_str()));
        self.rebuild_value();
        Ok(())
    }

    pub(crate) fn replace(&mut self, old: &str, new: &str) -> DomResult<bool> {
        check_token(old, "replace")?;
        check_token(new, "replace")?;
        let Some(position) = self.tokens.iter().position(|t| t == old) else {
            return Ok(false);
        };
        if self.contains(new) {
            self.remove(&[old])?;
        } else {
            self.tokens[position] = new.to_string();
            self.rebuild_value();
        }
        Ok(true)
    }

    /// With `force` the token is added or removed unconditionally and the
    /// result is `false`; without it, membership flips and the result says
    /// whether the token is now present
    pub(crate) fn toggle(&mut self, token: &str, force: Option<bool>) -> DomResult<bool> {
        match force {
            Some(true) => self.add(&[token]).map(|_| false),
            Some(false) => self.remove(&[token]).map(|_| false),
            None => {
                let contains = self.contains(token);
                if contains {
                    self.remove(&[token])?;
                } else {
                    self.add(&[token])?;
                }
                Ok(!contains)
            }
        }
    }
}

/// Mutable `classList` handle of one element
///
/// Every mutation writes the rebuilt class string back to the `class`
/// attribute, unless the attribute is absent and the list is empty.
pub struct ClassListMut<'a> {
    tree: &'a mut DomTree,
    element: NodeId,
}

impl ClassListMut<'_> {
    fn list_mut(&mut self) -> DomResult<&mut DomTokenList> {
        self.tree
            .node_mut(self.element)?
            .as_element_mut()
            .map(|e| &mut e.class_list)
            .ok_or(DomError::InvalidArgument("Node is not an element"))
    }

    fn sync(&mut self) -> DomResult<()> {
        let value = self.list_mut()?.value().to_string();
        let has_attribute = self.tree.attributes(self.element)?.contains("class");
        if has_attribute || !value.is_empty() {
            self.tree.set_named_value(self.element, "class", &value, false)?;
        }
        Ok(())
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tree
            .class_list(self.element)
            .is_ok_and(|list| list.contains(token))
    }

    pub fn add(&mut self, tokens: &[&str]) -> DomResult<()> {
        self.list_mut()?.add(tokens)?;
        self.sync()
    }

    pub fn remove(&mut self, tokens: &[&str]) -> DomResult<()> {
        self.list_mut()?.remove(tokens)?;
        self.sync()
    }

    /// The new token takes the position of `old`, as in browsers, rather
    /// than being appended after the remaining tokens
    pub fn replace(&mut self, old: &str, new: &str) -> DomResult<bool> {
        let replaced = self.list_mut()?.replace(old, new)?;
        if replaced {
            self.sync()?;
        }
        Ok(replaced)
    }

    pub fn toggle(&mut self, token: &str, force: Option<bool>) -> DomResult<bool> {
        let result = self.list_mut()?.toggle(token, force)?;
        self.sync()?;
        Ok(result)
    }

    /// `classList.value = input`
    pub fn set_value(&mut self, input: &str) -> DomResult<()> {
        self.list_mut()?.set_value(input);
        self.sync()
    }
}

impl DomTree {
    /// `element.classList`
    pub fn class_list(&self, element: NodeId) -> DomResult<&DomTokenList> {
        self.node(element)?
            .as_element()
            .map(|e| &e.class_list)
            .ok_or(DomError::InvalidArgument("Node is not an element"))
    }

    /// Mutable `element.classList`
    pub fn class_list_mut(&mut self, element: NodeId) -> DomResult<ClassListMut<'_>> {
        self.class_list(element)?;
        Ok(ClassListMut {
            tree: self,
            element,
        })
    }

    /// `element.className`
    pub fn class_name(&self, element: NodeId) -> DomResult<&str> {
        Ok(self.attributes(element)?.get("class").unwrap_or(""))
    }

    pub fn set_class_name(&mut self, element: NodeId, class_name: &str) -> DomResult<()> {
        self.set_attribute(element, "class", class_name)
    }
}

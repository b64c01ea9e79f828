//! DocumentFragment

use crate::error::{DomError, DomResult};
use crate::node::NodeId;
use crate::tree::DomTree;

/// Fragment-specific data
#[derive(Debug, Default, Clone)]
pub struct FragmentData {
    /// Element this fragment is attached to as a shadow root
    pub(crate) host: Option<NodeId>,
}

impl FragmentData {
    pub fn host(&self) -> Option<NodeId> {
        self.host
    }
}

impl DomTree {
    /// Attach `fragment` to `host` the way a shadow root is attached, so
    /// `get_root_node(.., true)` continues past the fragment
    pub fn attach_fragment_host(&mut self, fragment: NodeId, host: NodeId) -> DomResult<()> {
        if !self.node(host)?.is_element() {
            return Err(DomError::InvalidArgument("Fragment host must be an element"));
        }
        self.node_mut(fragment)?
            .as_fragment_mut()
            .ok_or(DomError::InvalidArgument("Node is not a DocumentFragment"))?
            .host = Some(host);
        Ok(())
    }

    pub fn fragment_host(&self, fragment: NodeId) -> Option<NodeId> {
        self.get(fragment)?.as_fragment()?.host
    }
}

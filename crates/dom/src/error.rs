//! DOM error types

use thiserror::Error;

use crate::node::NodeId;

/// DOM operation result type
pub type DomResult<T> = Result<T, DomError>;

/// DOM errors
///
/// Messages follow what browsers report for the same failure, and
/// [`DomError::name`] gives the matching `DOMException` name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// The argument is not a node of this tree, or not the kind of node required
    #[error("{0}")]
    InvalidArgument(&'static str),

    /// Inserting a node where it cannot go, including into its own subtree
    #[error("{0}")]
    HierarchyRequest(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("Attribute already in use")]
    InUseAttribute,

    #[error("Failed to execute '{operation}' on 'DOMTokenList': The token provided must not be empty.")]
    InvalidToken { operation: &'static str },

    #[error("{0}")]
    InvalidCharacter(&'static str),

    #[error("{0}")]
    Syntax(String),

    #[error("{0}")]
    IndexSize(&'static str),

    #[error("{0}")]
    InvalidState(&'static str),

    #[error("{0}")]
    NoModificationAllowed(&'static str),

    #[error("{0}")]
    Unsupported(String),

    #[error("No {0} is installed on this tree")]
    MissingCollaborator(&'static str),
}

impl DomError {
    /// The `DOMException` (or `TypeError`) name of this error
    pub fn name(&self) -> &'static str {
        match self {
            DomError::NodeNotFound(_) | DomError::InvalidArgument(_) => "TypeError",
            DomError::HierarchyRequest(_) => "HierarchyRequestError",
            DomError::NotFound(_) => "NotFoundError",
            DomError::InUseAttribute => "InUseAttributeError",
            DomError::InvalidToken { .. } | DomError::Syntax(_) => "SyntaxError",
            DomError::InvalidCharacter(_) => "InvalidCharacterError",
            DomError::IndexSize(_) => "IndexSizeError",
            DomError::InvalidState(_) => "InvalidStateError",
            DomError::NoModificationAllowed(_) => "NoModificationAllowedError",
            DomError::Unsupported(_) | DomError::MissingCollaborator(_) => "NotSupportedError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_match_browsers() {
        let err = DomError::InvalidToken { operation: "add" };
        assert_eq!(
            err.to_string(),
            "Failed to execute 'add' on 'DOMTokenList': The token provided must not be empty."
        );
        assert_eq!(err.name(), "SyntaxError");
        assert_eq!(DomError::InUseAttribute.to_string(), "Attribute already in use");
    }

    #[test]
    fn test_names() {
        assert_eq!(DomError::NotFound("x").name(), "NotFoundError");
        assert_eq!(DomError::HierarchyRequest("x").name(), "HierarchyRequestError");
        assert_eq!(DomError::Unsupported("x".into()).name(), "NotSupportedError");
    }
}

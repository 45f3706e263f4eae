use thiserror::Error;

use crate::node::NodeId;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    #[error("key not found")]
    KeyNotFound,
}

#[derive(Debug, Error)]
pub enum JitError {
    #[error("failed to map executable memory: {0}")]
    Map(#[from] std::io::Error),
    #[error("failed to finalize assembled code")]
    Finalize,
}

/// A structural invariant found broken by one of the tree checks.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InvariantError {
    #[error("root {root:?} has parent {parent:?}")]
    RootHasParent { root: NodeId, parent: NodeId },
    #[error("child {child:?} of {parent:?} points back at {back:?}")]
    BrokenParentLink {
        parent: NodeId,
        child: NodeId,
        back: Option<NodeId>,
    },
    #[error("node {node:?} is out of balance: {actual}")]
    OutOfBalance { node: NodeId, actual: i64 },
    #[error("node {node:?} stores balance {stored} but heights give {actual}")]
    StaleBalance { node: NodeId, stored: i8, actual: i64 },
}
